pub mod diagnostics;
pub mod interpreter;
