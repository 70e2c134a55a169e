use crate::interpreter::{RuntimeError, RuntimeErrorKind};
use camaroo_core::parser::{ParseError, ParseErrorKind};
use camaroo_core::span::Span;

/// Renders one diagnostic as a labelled message, the offending source line
/// and a caret run under the span.
pub fn render(source: &str, kind: &str, span: Span, message: &str, hint: Option<&str>) -> String {
    let source_line = source.lines().nth(span.line.saturating_sub(1)).unwrap_or("");
    let gutter_width = span.line.to_string().len();
    let gutter = " ".repeat(gutter_width);

    let mut out = format!("error[{}]: {}\n", kind, message);
    out.push_str(&format!("{}--> line {}:{}\n", gutter, span.line, span.col));
    out.push_str(&format!("{} |\n", gutter));
    out.push_str(&format!("{} | {}\n", span.line, source_line));

    // keep tabs so the carets line up with the echoed line
    let padding: String = source_line
        .chars()
        .take(span.col.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    out.push_str(&format!(
        "{} | {}{}\n",
        gutter,
        padding,
        "^".repeat(span.length.max(1))
    ));

    if let Some(hint) = hint {
        out.push_str(&format!("{} |\n", gutter));
        out.push_str(&format!("{} = hint: {}\n", gutter, hint));
    }

    out
}

pub fn render_parse_error(source: &str, error: &ParseError) -> String {
    render(
        source,
        "parse",
        error.span,
        &error.to_string(),
        parse_hint(&error.kind),
    )
}

pub fn render_runtime_error(source: &str, error: &RuntimeError) -> String {
    render(
        source,
        "runtime",
        error.span,
        &error.to_string(),
        runtime_hint(&error.kind),
    )
}

pub fn parse_hint(kind: &ParseErrorKind) -> Option<&'static str> {
    match kind {
        ParseErrorKind::ExpectedToken { expected, .. } if expected.contains(';') => {
            Some("every statement ends with `;`")
        }
        ParseErrorKind::UnterminatedString(_) => Some("close the text with `\"`"),
        ParseErrorKind::MalformedLiteral(_) => {
            Some("a letter literal holds exactly one character, like 'a' or '\\n'")
        }
        ParseErrorKind::UnsupportedBlock => Some("write the statements without braces"),
        ParseErrorKind::NoDefaultValue(_) => Some("give the variable an initial value"),
        ParseErrorKind::LiteralOutOfRange { .. } => Some("declare the variable with a wider type"),
        ParseErrorKind::TooDeeplyNested(_) => {
            Some("split the expression across several variables")
        }
        _ => None,
    }
}

pub fn runtime_hint(kind: &RuntimeErrorKind) -> Option<&'static str> {
    match kind {
        RuntimeErrorKind::UndefinedVariable(_) => {
            Some("declare the variable with a type before using it")
        }
        RuntimeErrorKind::OutOfRange { .. } => Some("declare the variable with a wider type"),
        RuntimeErrorKind::Overflow(_) => Some("integers are 64-bit; use `fnum` for larger values"),
        _ => None,
    }
}
