use std::fmt;

/// Runtime value. Literals carry one of these from the moment they are
/// parsed, and it is also what the evaluator stores in the environment.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Name of the runtime tag, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(n1), Self::Int(n2)) => n1 == n2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            // integers and floats compare by numeric value
            (Self::Int(n), Self::Float(f)) | (Self::Float(f), Self::Int(n)) => (*n as f64) == *f,
            (Self::Bool(b1), Self::Bool(b2)) => b1 == b2,
            (Self::Text(s1), Self::Text(s2)) => s1 == s2,
            (_, _) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}
