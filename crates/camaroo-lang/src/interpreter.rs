pub mod environment;

use crate::interpreter::environment::{Binding, Environment};
use camaroo_core::lexer::token::{Token, TokenType, TypeKeyword};
use camaroo_core::parser::ast::{Expr, ExprKind, Program, Statement, StatementKind};
use camaroo_core::span::Span;
use camaroo_core::value::Value;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("value {value} is out of range for `{declared}`")]
    OutOfRange { value: String, declared: TypeKeyword },
    #[error("integer overflow in {0}")]
    Overflow(String),
    #[error("program has {0} parse error(s) and cannot be evaluated")]
    InvalidProgram(usize),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct RuntimeError {
    pub span: Span,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    fn new(span: Span, kind: RuntimeErrorKind) -> Self {
        Self { span, kind }
    }
}

/// Tree-walking evaluator. Statements run in source order; the first runtime
/// error stops the program, and everything bound before it stays bound.
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn into_environment(self) -> Environment {
        self.env
    }

    pub fn evaluate_program<W: Write + ?Sized>(
        &mut self,
        program: &Program,
        out: &mut W,
    ) -> Result<(), RuntimeError> {
        if !program.is_ok() {
            let span = program.errors.first().map(|e| e.span).unwrap_or_default();
            return Err(RuntimeError::new(
                span,
                RuntimeErrorKind::InvalidProgram(program.errors.len()),
            ));
        }

        for statement in &program.statements {
            self.execute_statement(statement, out)?;
        }
        Ok(())
    }

    fn execute_statement<W: Write + ?Sized>(
        &mut self,
        statement: &Statement,
        out: &mut W,
    ) -> Result<(), RuntimeError> {
        match &statement.kind {
            StatementKind::Declare {
                type_keyword,
                name,
                value,
            } => {
                let name = binding_name(name)?;
                // build the whole value before touching the environment
                let value = self.evaluate_expression(value)?;
                let value = coerce(*type_keyword, value)
                    .map_err(|kind| RuntimeError::new(statement.span(), kind))?;
                debug!(name, declared_type = %type_keyword, value = %value, "declare");
                self.env.define(
                    name,
                    Binding {
                        declared_type: *type_keyword,
                        value,
                    },
                );
            }
            StatementKind::Assign { name: target, value } => {
                let name = binding_name(target)?;
                let declared_type = match self.env.get(name) {
                    Some(binding) => binding.declared_type,
                    None => {
                        return Err(RuntimeError::new(
                            target.span(),
                            RuntimeErrorKind::UndefinedVariable(name.to_string()),
                        ))
                    }
                };
                let value = self.evaluate_expression(value)?;
                let value = coerce(declared_type, value)
                    .map_err(|kind| RuntimeError::new(statement.span(), kind))?;
                debug!(name, value = %value, "assign");
                self.env
                    .assign(name, value)
                    .map_err(|kind| RuntimeError::new(target.span(), kind))?;
            }
            StatementKind::Print(value) => {
                let value = self.evaluate_expression(value)?;
                write!(out, "{}", value).map_err(|e| output_error(statement, e))?;
            }
            StatementKind::Println(value) => {
                let value = self.evaluate_expression(value)?;
                writeln!(out, "{}", value).map_err(|e| output_error(statement, e))?;
            }
        }
        Ok(())
    }

    fn evaluate_expression(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Identifier(name) => match self.env.value(name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::new(
                    expr.span(),
                    RuntimeErrorKind::UndefinedVariable(name.clone()),
                )),
            },
            ExprKind::Prefix { right } => {
                let operand = self.evaluate_expression(right)?;
                unary(&expr.token, operand).map_err(|kind| RuntimeError::new(expr.span(), kind))
            }
            ExprKind::Infix { left, right } => {
                let left_value = self.evaluate_expression(left)?;

                match (&expr.token.token_type, &left_value) {
                    // handle the short-circuit
                    (TokenType::And, Value::Bool(false)) => Ok(Value::Bool(false)),
                    (TokenType::Or, Value::Bool(true)) => Ok(Value::Bool(true)),
                    (TokenType::And | TokenType::Or, Value::Bool(_)) => {
                        let right_value = self.evaluate_expression(right)?;
                        match right_value {
                            Value::Bool(_) => Ok(right_value),
                            other => Err(RuntimeError::new(
                                expr.span(),
                                RuntimeErrorKind::TypeMismatch(format!(
                                    "`{}` needs boolean operands, got {}",
                                    expr.token.lexeme,
                                    other.type_name()
                                )),
                            )),
                        }
                    }
                    (TokenType::And | TokenType::Or, other) => Err(RuntimeError::new(
                        expr.span(),
                        RuntimeErrorKind::TypeMismatch(format!(
                            "`{}` needs boolean operands, got {}",
                            expr.token.lexeme,
                            other.type_name()
                        )),
                    )),
                    _ => {
                        let right_value = self.evaluate_expression(right)?;
                        binary(&expr.token, left_value, right_value)
                            .map_err(|kind| RuntimeError::new(expr.span(), kind))
                    }
                }
            }
        }
    }
}

fn binding_name(expr: &Expr) -> Result<&str, RuntimeError> {
    match &expr.kind {
        ExprKind::Identifier(name) => Ok(name),
        _ => Err(RuntimeError::new(
            expr.span(),
            RuntimeErrorKind::Internal(format!("`{}` is not an assignable name", expr)),
        )),
    }
}

fn output_error(statement: &Statement, error: std::io::Error) -> RuntimeError {
    RuntimeError::new(statement.span(), RuntimeErrorKind::Output(error.to_string()))
}

fn unary(operator: &Token, operand: Value) -> Result<Value, RuntimeErrorKind> {
    match (&operator.token_type, operand) {
        (TokenType::Minus, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| RuntimeErrorKind::Overflow(format!("-{}", n))),
        (TokenType::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
        (TokenType::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (TokenType::Minus | TokenType::Not, v) => Err(RuntimeErrorKind::TypeMismatch(format!(
            "cannot apply `{}` to {}",
            operator.lexeme,
            v.type_name()
        ))),
        (op, _) => Err(RuntimeErrorKind::Internal(format!(
            "no prefix evaluation for `{}`",
            op
        ))),
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeErrorKind> {
    let op = &operator.token_type;
    match (op, left, right) {
        // integer arithmetic stays integer, and checked
        (TokenType::Slash | TokenType::Percent, Value::Int(_), Value::Int(0)) => {
            Err(RuntimeErrorKind::DivisionByZero)
        }
        (
            TokenType::Plus | TokenType::Minus | TokenType::Star | TokenType::Slash | TokenType::Percent,
            Value::Int(a),
            Value::Int(b),
        ) => {
            let result = match op {
                TokenType::Plus => a.checked_add(b),
                TokenType::Minus => a.checked_sub(b),
                TokenType::Star => a.checked_mul(b),
                TokenType::Slash => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result
                .map(Value::Int)
                .ok_or_else(|| RuntimeErrorKind::Overflow(format!("{} {} {}", a, operator.lexeme, b)))
        }

        // weird String concat
        (TokenType::Plus, Value::Text(s1), Value::Text(s2)) => {
            let mut s = String::with_capacity(s1.len() + s2.len());
            s.push_str(&s1);
            s.push_str(&s2);
            Ok(Value::Text(s))
        }

        (TokenType::Equal, l, r) => Ok(Value::Bool(l == r)),

        (
            TokenType::Plus | TokenType::Minus | TokenType::Star | TokenType::Slash | TokenType::Percent,
            l,
            r,
        ) => match (as_float(&l), as_float(&r)) {
            // anything else numeric is a float operation
            (Some(a), Some(b)) => match op {
                TokenType::Plus => Ok(Value::Float(a + b)),
                TokenType::Minus => Ok(Value::Float(a - b)),
                TokenType::Star => Ok(Value::Float(a * b)),
                _ if b == 0.0 => Err(RuntimeErrorKind::DivisionByZero),
                TokenType::Slash => Ok(Value::Float(a / b)),
                _ => Ok(Value::Float(a % b)),
            },
            _ => Err(RuntimeErrorKind::TypeMismatch(format!(
                "cannot apply `{}` to {} and {}",
                operator.lexeme,
                l.type_name(),
                r.type_name()
            ))),
        },

        (op, _, _) => Err(RuntimeErrorKind::Internal(format!(
            "no infix evaluation for `{}`",
            op
        ))),
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Checks a value against a declared type, widening integers stored in float
/// variables.
fn coerce(declared: TypeKeyword, value: Value) -> Result<Value, RuntimeErrorKind> {
    match (declared, value) {
        (declared, Value::Int(n)) if declared.is_integer() => {
            if declared.holds_integer(n) {
                Ok(Value::Int(n))
            } else {
                Err(RuntimeErrorKind::OutOfRange {
                    value: n.to_string(),
                    declared,
                })
            }
        }
        (declared, Value::Int(n)) if declared.is_float() => {
            coerce(declared, Value::Float(n as f64))
        }
        (TypeKeyword::Fnum32, Value::Float(f)) if f.is_finite() && f.abs() > f32::MAX as f64 => {
            Err(RuntimeErrorKind::OutOfRange {
                value: f.to_string(),
                declared,
            })
        }
        // stored at the declared precision
        (TypeKeyword::Fnum32, Value::Float(f)) => Ok(Value::Float(f as f32 as f64)),
        (TypeKeyword::Fnum64, Value::Float(f)) => Ok(Value::Float(f)),
        (TypeKeyword::Toggle, Value::Bool(b)) => Ok(Value::Bool(b)),
        (TypeKeyword::Text, Value::Text(s)) => Ok(Value::Text(s)),
        (TypeKeyword::Letter, Value::Text(s)) => {
            if s.chars().count() <= 1 {
                Ok(Value::Text(s))
            } else {
                Err(RuntimeErrorKind::TypeMismatch(format!(
                    "`letter` holds a single character, got text of length {}",
                    s.chars().count()
                )))
            }
        }
        (declared, value) => Err(RuntimeErrorKind::TypeMismatch(format!(
            "cannot store {} in `{}`",
            value.type_name(),
            declared
        ))),
    }
}
