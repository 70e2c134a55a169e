use crate::span::Span;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            token_type,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Declared types. Used both as declaration keywords and as the type tag a
/// variable keeps for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKeyword {
    Num8,
    Num16,
    Num32,
    Num64,
    Fnum32,
    Fnum64,
    Letter,
    Text,
    Toggle,
    Func,
}

impl TypeKeyword {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeKeyword::Num8 | TypeKeyword::Num16 | TypeKeyword::Num32 | TypeKeyword::Num64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, TypeKeyword::Fnum32 | TypeKeyword::Fnum64)
    }

    /// Whether `n` fits this integer width. Always false for non-integer types.
    pub fn holds_integer(self, n: i64) -> bool {
        match self {
            TypeKeyword::Num8 => i8::try_from(n).is_ok(),
            TypeKeyword::Num16 => i16::try_from(n).is_ok(),
            TypeKeyword::Num32 => i32::try_from(n).is_ok(),
            TypeKeyword::Num64 => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKeyword::Num8 => "num8",
            TypeKeyword::Num16 => "num16",
            TypeKeyword::Num32 => "num32",
            TypeKeyword::Num64 => "num64",
            TypeKeyword::Fnum32 => "fnum32",
            TypeKeyword::Fnum64 => "fnum64",
            TypeKeyword::Letter => "letter",
            TypeKeyword::Text => "text",
            TypeKeyword::Toggle => "toggle",
            TypeKeyword::Func => "func",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Literals
    Integer,      // 42
    Float,        // 5.6
    Letter,       // 'a', '\n'
    Text,         // "hello"
    Toggle(bool), // true, false

    // Type keywords
    Type(TypeKeyword), // num8 .. func

    // Operators
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Assign,  // =
    Equal,   // ==
    And,     // and
    Or,      // or
    Not,     // not

    // Punctuation
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Semicolon,    // ;

    Identifier,

    // Statement keywords
    Print,   // print
    Println, // println

    // Any single character the lexer does not recognise
    Unknown,
}

// How a token kind is named in diagnostics
impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Integer => write!(f, "integer literal"),
            TokenType::Float => write!(f, "float literal"),
            TokenType::Letter => write!(f, "letter literal"),
            TokenType::Text => write!(f, "text literal"),
            TokenType::Toggle(b) => write!(f, "{}", b),
            TokenType::Type(type_keyword) => write!(f, "{}", type_keyword),
            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Star => write!(f, "*"),
            TokenType::Slash => write!(f, "/"),
            TokenType::Percent => write!(f, "%"),
            TokenType::Assign => write!(f, "="),
            TokenType::Equal => write!(f, "=="),
            TokenType::And => write!(f, "and"),
            TokenType::Or => write!(f, "or"),
            TokenType::Not => write!(f, "not"),
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::LeftBracket => write!(f, "["),
            TokenType::RightBracket => write!(f, "]"),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::Identifier => write!(f, "identifier"),
            TokenType::Print => write!(f, "print"),
            TokenType::Println => write!(f, "println"),
            TokenType::Unknown => write!(f, "unknown"),
        }
    }
}
