pub mod keywords;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod value;
