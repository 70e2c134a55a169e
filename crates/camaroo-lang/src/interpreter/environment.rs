use crate::interpreter::RuntimeErrorKind;
use camaroo_core::lexer::token::TypeKeyword;
use camaroo_core::value::Value;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub declared_type: TypeKeyword,
    pub value: Value,
}

/// The one global namespace. Owned by whoever drives the interpreter, so a
/// REPL can keep it alive between lines.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    values: BTreeMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, binding: Binding) {
        self.values.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.values.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).map(|binding| &binding.value)
    }

    /// Replaces the value of an existing binding. The declared type stays.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        match self.values.get_mut(name) {
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None => Err(RuntimeErrorKind::UndefinedVariable(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.values.iter().map(|(name, binding)| (name.as_str(), binding))
    }
}
