use crate::lexer::token::{Token, TokenType, TypeKeyword};
use crate::parser::ParseError;
use crate::span::Span;
use crate::value::Value;
use std::fmt;

/// The result of a parse: every statement that parsed cleanly, in source
/// order, plus every diagnostic recorded along the way.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub errors: Vec<ParseError>,
}

impl Program {
    /// The success flag. A program with errors must not be evaluated.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn diagnostics(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub token: Token, // type keyword, identifier or print keyword
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Declare {
        type_keyword: TypeKeyword,
        name: Expr, // always an identifier
        value: Expr,
    },
    Assign {
        name: Expr, // always an identifier
        value: Expr,
    },
    Print(Expr),
    Println(Expr),
}

impl Statement {
    pub fn token_type(&self) -> &TokenType {
        &self.token.token_type
    }

    pub fn span(&self) -> Span {
        self.token.span
    }

    /// The identifier being bound, for declarations and assignments.
    pub fn left(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Declare { name, .. } | StatementKind::Assign { name, .. } => Some(name),
            StatementKind::Print(_) | StatementKind::Println(_) => None,
        }
    }

    pub fn right(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Declare { value, .. } | StatementKind::Assign { value, .. } => {
                Some(value)
            }
            StatementKind::Print(value) | StatementKind::Println(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub token: Token, // for prefix and infix nodes this is the operator
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    Literal(Value),
    Prefix {
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn token_type(&self) -> &TokenType {
        &self.token.token_type
    }

    pub fn span(&self) -> Span {
        self.token.span
    }

    pub fn literal(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn left(&self) -> Option<&Expr> {
        match &self.kind {
            ExprKind::Infix { left, .. } => Some(left),
            _ => None,
        }
    }

    pub fn right(&self) -> Option<&Expr> {
        match &self.kind {
            ExprKind::Prefix { right } | ExprKind::Infix { right, .. } => Some(right),
            _ => None,
        }
    }
}

// Canonical rendering: every operator application is parenthesised, so the
// output re-parses to the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Literal(_) => write!(f, "{}", self.token.lexeme),
            ExprKind::Prefix { right } => {
                // `not` needs a space before its operand, `-` must not get one
                if self.token.lexeme.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    write!(f, "({} {})", self.token.lexeme, right)
                } else {
                    write!(f, "({}{})", self.token.lexeme, right)
                }
            }
            ExprKind::Infix { left, right } => {
                write!(f, "({} {} {})", left, self.token.lexeme, right)
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StatementKind::Declare { name, value, .. } => {
                write!(f, "{} {} = {};", self.token.lexeme, name, value)
            }
            StatementKind::Assign { name, value } => write!(f, "{} = {};", name, value),
            StatementKind::Print(value) | StatementKind::Println(value) => {
                write!(f, "{} {};", self.token.lexeme, value)
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
