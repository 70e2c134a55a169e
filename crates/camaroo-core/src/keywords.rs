use anyhow::Result;
use std::collections::HashMap;
use std::fs;

use crate::lexer::token::{TokenType, TypeKeyword};

/// Builds the spelling -> token table the lexer classifies identifiers with.
///
/// A keywords file is a JSON object mapping concept names to spellings, e.g.
/// `{ "int32": "bilangan", "print": "cetak" }`. Entries in the file override the
/// defaults; concepts it doesn't mention keep their default spelling.
pub fn load_keywords(path: Option<&str>) -> Result<HashMap<String, TokenType>> {
    let mut map = default_keywords();
    if let Some(p) = path {
        let contents = fs::read_to_string(p)?;
        let overrides: HashMap<String, String> = serde_json::from_str(&contents)?;
        map.extend(overrides);
    }

    Ok(keyword_table(map))
}

/// The table for the default spellings; never touches the filesystem.
pub fn default_keyword_table() -> HashMap<String, TokenType> {
    keyword_table(default_keywords())
}

fn keyword_table(concepts: HashMap<String, String>) -> HashMap<String, TokenType> {
    let mut keywords = HashMap::new();
    for (concept, spelling) in concepts {
        if let Some(token_type) = concept_to_token_type(&concept) {
            keywords.insert(spelling, token_type);
        }
    }
    keywords
}

pub fn default_keywords() -> HashMap<String, String> {
    // The default mapping, from "concept words" to "keywords".
    // "int64" is the concept, "num64" is what you type. "int" and "float" are
    // the short aliases for the 64-bit widths.
    HashMap::from([
        ("int8".into(), "num8".into()),
        ("int16".into(), "num16".into()),
        ("int32".into(), "num32".into()),
        ("int64".into(), "num64".into()),
        ("int".into(), "num".into()),
        ("float32".into(), "fnum32".into()),
        ("float64".into(), "fnum64".into()),
        ("float".into(), "fnum".into()),
        ("char".into(), "letter".into()),
        ("string".into(), "text".into()),
        ("bool".into(), "toggle".into()),
        ("function".into(), "func".into()),
        ("true".into(), "true".into()),
        ("false".into(), "false".into()),
        ("and".into(), "and".into()),
        ("or".into(), "or".into()),
        ("not".into(), "not".into()),
        ("print".into(), "print".into()),
        ("println".into(), "println".into()),
    ])
}

fn concept_to_token_type(s: &str) -> Option<TokenType> {
    match s {
        "int8" => Some(TokenType::Type(TypeKeyword::Num8)),
        "int16" => Some(TokenType::Type(TypeKeyword::Num16)),
        "int32" => Some(TokenType::Type(TypeKeyword::Num32)),
        "int64" | "int" => Some(TokenType::Type(TypeKeyword::Num64)),
        "float32" => Some(TokenType::Type(TypeKeyword::Fnum32)),
        "float64" | "float" => Some(TokenType::Type(TypeKeyword::Fnum64)),
        "char" => Some(TokenType::Type(TypeKeyword::Letter)),
        "string" => Some(TokenType::Type(TypeKeyword::Text)),
        "bool" => Some(TokenType::Type(TypeKeyword::Toggle)),
        "function" => Some(TokenType::Type(TypeKeyword::Func)),
        "true" => Some(TokenType::Toggle(true)),
        "false" => Some(TokenType::Toggle(false)),
        "and" => Some(TokenType::And),
        "or" => Some(TokenType::Or),
        "not" => Some(TokenType::Not),
        "print" => Some(TokenType::Print),
        "println" => Some(TokenType::Println),
        _ => None,
    }
}
