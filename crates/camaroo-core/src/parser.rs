pub mod ast;

use crate::lexer::token::{Token, TokenType, TypeKeyword};
use crate::lexer::Lexer;
use crate::parser::ast::{Expr, ExprKind, Program, Statement, StatementKind};
use crate::span::Span;
use crate::value::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

// Deepest operator tree a single expression may build. Evaluation walks the
// tree recursively, so this also bounds the evaluator's stack use.
const MAX_NESTING: usize = 256;

type PrefixRule = fn(&mut Parser) -> Result<Expr, ParseError>;
type InfixRule = fn(&mut Parser, Expr) -> Result<Expr, ParseError>;

/// Binding strength, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,      // or
    And,     // and
    Equals,  // ==
    Sum,     // + -
    Product, // * / %
    Prefix,  // -x, not x
    Call,    // f(x)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("expected next token to be {expected} but found `{found}`")]
    ExpectedToken { expected: String, found: String },
    #[error("couldn't parse `{0}`")]
    NoRuleForToken(String),
    #[error("literal `{literal}` is out of range for {target}")]
    LiteralOutOfRange { literal: String, target: String },
    #[error("unknown token `{0}`")]
    UnknownToken(String),
    #[error("malformed literal {0}")]
    MalformedLiteral(String),
    #[error("unterminated text literal {0}")]
    UnterminatedString(String),
    #[error("block statements are not supported")]
    UnsupportedBlock,
    #[error("type `{0}` has no default value")]
    NoDefaultValue(TypeKeyword),
    #[error("`{0}` cannot start a statement")]
    UnexpectedStatement(String),
    #[error("expression nests deeper than {0} levels")]
    TooDeeplyNested(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
}

/// Pratt parser over a `Lexer`.
///
/// `current` is the token being looked at; the token after it is held in the
/// lexer's lookahead slot. Prefix rules start with `current` on the first token
/// of their expression, infix rules start with `current` on the operator, and
/// both leave `current` on the last token they consumed.
pub struct Parser {
    lexer: Lexer,
    current: Option<Token>,
    previous_span: Span,
    depth: usize,
    prefix_rules: HashMap<TokenType, PrefixRule>,
    infix_rules: HashMap<TokenType, InfixRule>,
    precedences: HashMap<TokenType, Precedence>,
}

impl Parser {
    pub fn new(source: impl Into<String>, keywords: &HashMap<String, TokenType>) -> Self {
        let mut lexer = Lexer::new(source, keywords);
        let current = lexer.next_token();

        let mut parser = Self {
            lexer,
            current,
            previous_span: Span::default(),
            depth: 0,
            prefix_rules: HashMap::new(),
            infix_rules: HashMap::new(),
            precedences: HashMap::new(),
        };

        parser.register_prefix(TokenType::Identifier, Parser::parse_identifier);
        for literal in [
            TokenType::Integer,
            TokenType::Float,
            TokenType::Letter,
            TokenType::Text,
            TokenType::Toggle(true),
            TokenType::Toggle(false),
        ] {
            parser.register_prefix(literal, Parser::parse_literal);
        }
        parser.register_prefix(TokenType::LeftParen, Parser::parse_grouped);
        parser.register_prefix(TokenType::Minus, Parser::parse_prefix);
        parser.register_prefix(TokenType::Not, Parser::parse_prefix);

        parser.register_infix(TokenType::Or, Precedence::Or, Parser::parse_infix);
        parser.register_infix(TokenType::And, Precedence::And, Parser::parse_infix);
        parser.register_infix(TokenType::Equal, Precedence::Equals, Parser::parse_infix);
        parser.register_infix(TokenType::Plus, Precedence::Sum, Parser::parse_infix);
        parser.register_infix(TokenType::Minus, Precedence::Sum, Parser::parse_infix);
        parser.register_infix(TokenType::Star, Precedence::Product, Parser::parse_infix);
        parser.register_infix(TokenType::Slash, Precedence::Product, Parser::parse_infix);
        parser.register_infix(TokenType::Percent, Precedence::Product, Parser::parse_infix);

        parser
    }

    fn register_prefix(&mut self, token_type: TokenType, rule: PrefixRule) {
        self.prefix_rules.insert(token_type, rule);
    }

    fn register_infix(&mut self, token_type: TokenType, precedence: Precedence, rule: InfixRule) {
        self.precedences.insert(token_type.clone(), precedence);
        self.infix_rules.insert(token_type, rule);
    }

    // utility methods
    fn advance(&mut self) {
        if let Some(token) = &self.current {
            self.previous_span = token.span;
        }
        self.current = self.lexer.next_token();
    }

    fn peek_type(&mut self) -> Option<TokenType> {
        self.lexer
            .peek_next_token()
            .map(|token| token.token_type.clone())
    }

    fn precedence_of(&self, token_type: &TokenType) -> Precedence {
        self.precedences
            .get(token_type)
            .copied()
            .unwrap_or(Precedence::Lowest)
    }

    // Where to point when the input ran out: just past the last token we saw.
    fn end_span(&self) -> Span {
        let last = match &self.current {
            Some(token) => token.span,
            None => self.previous_span,
        };
        Span {
            line: last.line,
            col: last.col + last.length,
            length: 1,
        }
    }

    fn current_token(&self, expected: &str) -> Result<Token, ParseError> {
        match &self.current {
            Some(token) => Ok(token.clone()),
            None => Err(ParseError {
                span: self.end_span(),
                kind: ParseErrorKind::ExpectedToken {
                    expected: expected.to_string(),
                    found: "end of input".to_string(),
                },
            }),
        }
    }

    /// Steps onto the next token if it is one of `expected`, otherwise records
    /// what was there instead and leaves the window where it is.
    fn expect_peek(&mut self, expected: &[TokenType]) -> Result<(), ParseError> {
        let next = self
            .lexer
            .peek_next_token()
            .map(|token| (token.token_type.clone(), token.lexeme.clone(), token.span));

        let (found, span) = match next {
            Some((token_type, _, _)) if expected.contains(&token_type) => {
                self.advance();
                return Ok(());
            }
            Some((_, lexeme, span)) => (lexeme, span),
            None => ("end of input".to_string(), self.end_span()),
        };

        let expected = expected
            .iter()
            .map(|t| format!("`{}`", t))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(ParseError {
            span,
            kind: ParseErrorKind::ExpectedToken { expected, found },
        })
    }

    pub fn parse_program(mut self) -> Program {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while let Some(token) = self.current.clone() {
            let result = match &token.token_type {
                TokenType::Type(type_keyword) => self.parse_declaration(*type_keyword),
                TokenType::Identifier => self.parse_reassignment(),
                TokenType::Print | TokenType::Println => self.parse_print(),
                // Anything else leaves us with no idea where the next statement
                // starts, so the program is cut short here.
                TokenType::LeftBrace => {
                    errors.push(ParseError {
                        span: token.span,
                        kind: ParseErrorKind::UnsupportedBlock,
                    });
                    break;
                }
                TokenType::Unknown => {
                    errors.push(ParseError {
                        span: token.span,
                        kind: ParseErrorKind::UnknownToken(token.lexeme.clone()),
                    });
                    break;
                }
                _ => {
                    errors.push(ParseError {
                        span: token.span,
                        kind: ParseErrorKind::UnexpectedStatement(token.lexeme.clone()),
                    });
                    break;
                }
            };

            match result {
                Ok(statement) => {
                    debug!(statement = %statement, "parsed statement");
                    statements.push(statement);
                }
                Err(error) => {
                    warn!(line = error.span.line, col = error.span.col, %error, "parse error");
                    errors.push(error);
                    self.synchronize();
                }
            }

            // step off the statement's `;`
            self.advance();
        }

        Program { statements, errors }
    }

    // Skip to the `;` that ends the broken statement.
    fn synchronize(&mut self) {
        while let Some(token) = &self.current {
            if token.token_type == TokenType::Semicolon {
                return;
            }
            self.advance();
        }
    }

    // <type> <identifier> ( ";" | "=" <expression> ";" )
    fn parse_declaration(&mut self, type_keyword: TypeKeyword) -> Result<Statement, ParseError> {
        let type_token = self.current_token("type")?;

        self.expect_peek(&[TokenType::Identifier])?;
        let name = self.parse_identifier()?;

        self.expect_peek(&[TokenType::Assign, TokenType::Semicolon])?;
        let value = match &self.current {
            Some(token) if token.token_type == TokenType::Semicolon => {
                default_value(type_keyword, token.span)?
            }
            _ => {
                self.advance();
                let value = self.parse_expression(Precedence::Lowest)?;
                check_literal_width(type_keyword, &value)?;
                self.expect_peek(&[TokenType::Semicolon])?;
                value
            }
        };

        Ok(Statement {
            kind: StatementKind::Declare {
                type_keyword,
                name,
                value,
            },
            token: type_token,
        })
    }

    // <identifier> "=" <expression> ";"
    fn parse_reassignment(&mut self) -> Result<Statement, ParseError> {
        let name = self.parse_identifier()?;
        self.expect_peek(&[TokenType::Assign])?;
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(&[TokenType::Semicolon])?;

        Ok(Statement {
            token: name.token.clone(),
            kind: StatementKind::Assign { name, value },
        })
    }

    // ("print" | "println") <expression> ";"
    fn parse_print(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.current_token("print")?;
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(&[TokenType::Semicolon])?;

        let kind = if keyword.token_type == TokenType::Println {
            StatementKind::Println(value)
        } else {
            StatementKind::Print(value)
        };
        Ok(Statement {
            kind,
            token: keyword,
        })
    }

    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        let entered = self.depth;
        let result = self.parse_expression_at(precedence);
        self.depth = entered;
        result
    }

    // Every nested call and every operator folded into `left` deepens the
    // tree by one, so `depth` bounds the height of what is being built.
    fn nest(&mut self, span: Span) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError {
                span,
                kind: ParseErrorKind::TooDeeplyNested(MAX_NESTING),
            });
        }
        Ok(())
    }

    fn parse_expression_at(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        let token = self.current_token("expression")?;
        self.nest(token.span)?;
        let prefix = match self.prefix_rules.get(&token.token_type) {
            Some(rule) => *rule,
            None => {
                return Err(ParseError {
                    span: token.span,
                    kind: ParseErrorKind::NoRuleForToken(token.lexeme),
                })
            }
        };

        let mut left = prefix(self)?;

        // Strictly greater: equal precedence stops here and is picked up by
        // the caller's loop, which makes operators left-associative.
        while let Some(next_type) = self.peek_type() {
            if next_type == TokenType::Semicolon || self.precedence_of(&next_type) <= precedence {
                break;
            }
            let infix = match self.infix_rules.get(&next_type) {
                Some(rule) => *rule,
                None => break,
            };
            self.advance();
            let span = self.current.as_ref().map_or(self.previous_span, |t| t.span);
            self.nest(span)?;
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn parse_identifier(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token("identifier")?;
        Ok(Expr {
            kind: ExprKind::Identifier(token.lexeme.clone()),
            token,
        })
    }

    fn parse_literal(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token("literal")?;
        let value = literal_value(&token)?;
        Ok(Expr {
            kind: ExprKind::Literal(value),
            token,
        })
    }

    // "(" <expression> ")" -- the parentheses leave no node behind
    fn parse_grouped(&mut self) -> Result<Expr, ParseError> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(&[TokenType::RightParen])?;
        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let operator = self.current_token("operator")?;
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr {
            kind: ExprKind::Prefix {
                right: Box::new(right),
            },
            token: operator,
        })
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let operator = self.current_token("operator")?;
        let precedence = self.precedence_of(&operator.token_type);
        self.advance();
        let right = self.parse_expression(precedence)?;
        Ok(Expr {
            kind: ExprKind::Infix {
                left: Box::new(left),
                right: Box::new(right),
            },
            token: operator,
        })
    }
}

// An integer literal initialiser, possibly negated, has to fit the declared
// width. Computed values are range-checked when they are bound.
fn check_literal_width(type_keyword: TypeKeyword, value: &Expr) -> Result<(), ParseError> {
    if !type_keyword.is_integer() {
        return Ok(());
    }

    let (n, literal) = match &value.kind {
        ExprKind::Literal(Value::Int(n)) => (*n, value.token.lexeme.clone()),
        ExprKind::Prefix { right } if value.token.token_type == TokenType::Minus => {
            match &right.kind {
                // the lexer only produces non-negative literals
                ExprKind::Literal(Value::Int(n)) => (-*n, format!("-{}", right.token.lexeme)),
                _ => return Ok(()),
            }
        }
        _ => return Ok(()),
    };

    if type_keyword.holds_integer(n) {
        Ok(())
    } else {
        Err(ParseError {
            span: value.span(),
            kind: ParseErrorKind::LiteralOutOfRange {
                literal,
                target: format!("`{}`", type_keyword),
            },
        })
    }
}

fn literal_value(token: &Token) -> Result<Value, ParseError> {
    let malformed = || ParseError {
        span: token.span,
        kind: ParseErrorKind::MalformedLiteral(token.lexeme.clone()),
    };
    let out_of_range = |target: &str| ParseError {
        span: token.span,
        kind: ParseErrorKind::LiteralOutOfRange {
            literal: token.lexeme.clone(),
            target: target.to_string(),
        },
    };

    match &token.token_type {
        // The lexer only hands us digit runs, so a failed parse means overflow
        TokenType::Integer => token
            .lexeme
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| out_of_range("a 64-bit integer")),
        TokenType::Float => {
            let value = token.lexeme.parse::<f64>().map_err(|_| malformed())?;
            if value.is_finite() {
                Ok(Value::Float(value))
            } else {
                Err(out_of_range("a 64-bit float"))
            }
        }
        TokenType::Toggle(b) => Ok(Value::Bool(*b)),
        TokenType::Text => {
            let (text, closed) = unescape_text(&token.lexeme);
            if closed {
                Ok(Value::Text(text))
            } else {
                Err(ParseError {
                    span: token.span,
                    kind: ParseErrorKind::UnterminatedString(token.lexeme.clone()),
                })
            }
        }
        TokenType::Letter => {
            let chars: Vec<char> = token.lexeme.chars().collect();
            let letter = match chars.as_slice() {
                ['\'', '\\', c, '\''] => escaped(*c).ok_or_else(malformed)?,
                ['\'', c, '\''] if *c != '\\' => *c,
                _ => return Err(malformed()),
            };
            Ok(Value::Text(letter.to_string()))
        }
        _ => Err(malformed()),
    }
}

// Decodes a text lexeme; the flag says whether the closing quote was there.
fn unescape_text(lexeme: &str) -> (String, bool) {
    let mut text = String::new();
    let mut chars = lexeme.chars().skip(1);

    while let Some(c) = chars.next() {
        match c {
            '"' => return (text, true),
            '\\' => match chars.next() {
                Some(next) => match escaped(next) {
                    Some(decoded) => text.push(decoded),
                    None => {
                        text.push('\\');
                        text.push(next);
                    }
                },
                None => return (text, false),
            },
            _ => text.push(c),
        }
    }

    (text, false)
}

fn escaped(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

// `num x;` reads as `num x = 0;`
fn default_value(type_keyword: TypeKeyword, span: Span) -> Result<Expr, ParseError> {
    let (token_type, lexeme, value) = match type_keyword {
        TypeKeyword::Func => {
            return Err(ParseError {
                span,
                kind: ParseErrorKind::NoDefaultValue(type_keyword),
            })
        }
        TypeKeyword::Toggle => (TokenType::Toggle(false), "false", Value::Bool(false)),
        TypeKeyword::Text | TypeKeyword::Letter => {
            (TokenType::Text, "\"\"", Value::Text(String::new()))
        }
        t if t.is_float() => (TokenType::Float, "0.0", Value::Float(0.0)),
        _ => (TokenType::Integer, "0", Value::Int(0)),
    };

    Ok(Expr {
        kind: ExprKind::Literal(value),
        token: Token::new(token_type, lexeme, span),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::default_keyword_table;

    fn parse(source: &str) -> Program {
        Parser::new(source, &default_keyword_table()).parse_program()
    }

    fn parse_ok(source: &str) -> Program {
        let program = parse(source);
        assert!(program.is_ok(), "unexpected errors: {:?}", program.diagnostics());
        program
    }

    // the value expression of the first statement
    fn first_value(source: &str) -> Expr {
        let program = parse_ok(source);
        program.statements[0].right().cloned().unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = first_value("print 1 + 2 * 3;");
        assert_eq!(expr.token_type(), &TokenType::Plus);
        assert_eq!(expr.right().unwrap().token_type(), &TokenType::Star);
        assert_eq!(expr.to_string(), "(1 + (2 * 3))");

        let expr = first_value("print 1 * 2 + 3;");
        assert_eq!(expr.token_type(), &TokenType::Plus);
        assert_eq!(expr.left().unwrap().token_type(), &TokenType::Star);
        assert_eq!(expr.to_string(), "((1 * 2) + 3)");
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        assert_eq!(first_value("print 1 - 2 - 3;").to_string(), "((1 - 2) - 3)");
        assert_eq!(first_value("print 8 / 4 % 3;").to_string(), "((8 / 4) % 3)");
    }

    #[test]
    fn rendering_of_operator_mix() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("not true == false", "((not true) == false)"),
            ("a + b == c * d", "((a + b) == (c * d))"),
            ("a or b and c", "(a or (b and c))"),
            ("a == b and c == d", "((a == b) and (c == d))"),
            ("(1 + 2) * 3", "((1 + 2) * 3)"),
            ("--5", "(-(-5))"),
            ("1 - -2", "(1 - (-2))"),
        ];

        for (source, rendered) in cases {
            let expr = first_value(&format!("print {};", source));
            assert_eq!(expr.to_string(), rendered, "source {:?}", source);
        }
    }

    #[test]
    fn rendering_reparses_to_the_same_tree() {
        let sources = [
            "num x = 1 + 2 * 3;",
            "fnum y = -(4.5 - x) / 2;",
            "toggle t = not a == b or c and d;",
            "println \"a\" + 'b';",
            "x = x % 7 - 1;",
        ];

        for source in sources {
            let first = parse_ok(source).to_string();
            let second = parse_ok(&first).to_string();
            assert_eq!(first, second);

            // same token kinds once grouping parentheses are set aside
            let kinds = |s: &str| -> Vec<TokenType> {
                Lexer::new(s, &default_keyword_table())
                    .map(|t| t.token_type)
                    .filter(|t| *t != TokenType::LeftParen && *t != TokenType::RightParen)
                    .collect()
            };
            assert_eq!(kinds(source), kinds(&first), "source {:?}", source);
        }
    }

    #[test]
    fn parse_declarations() {
        let program = parse_ok("num x = 5; num y = x + 3;");
        assert_eq!(program.statements.len(), 2);

        let statement = &program.statements[1];
        assert_eq!(
            statement.token_type(),
            &TokenType::Type(TypeKeyword::Num64)
        );
        match &statement.kind {
            StatementKind::Declare {
                type_keyword,
                name,
                value,
            } => {
                assert_eq!(*type_keyword, TypeKeyword::Num64);
                assert_eq!(name.kind, ExprKind::Identifier("y".into()));
                assert_eq!(value.to_string(), "(x + 3)");
            }
            other => panic!("expected a declaration, got {:?}", other),
        }
    }

    #[test]
    fn declaration_without_value_gets_default() {
        let program = parse_ok("num8 a; fnum b; toggle c; text d; letter e;");
        let defaults: Vec<Value> = program
            .statements
            .iter()
            .map(|s| s.right().and_then(|e| e.literal()).cloned().unwrap())
            .collect();
        assert_eq!(
            defaults,
            vec![
                Value::Int(0),
                Value::Float(0.0),
                Value::Bool(false),
                Value::Text(String::new()),
                Value::Text(String::new()),
            ]
        );
        assert_eq!(program.statements[0].to_string(), "num8 a = 0;");
    }

    #[test]
    fn func_has_no_default() {
        let program = parse("func f;");
        assert!(!program.is_ok());
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::NoDefaultValue(TypeKeyword::Func)
        );
    }

    #[test]
    fn reassignment_and_print_statements() {
        let program = parse_ok("x = 10; print(x); println \"done\";");
        assert!(matches!(program.statements[0].kind, StatementKind::Assign { .. }));
        assert!(matches!(program.statements[1].kind, StatementKind::Print(_)));
        assert!(matches!(program.statements[2].kind, StatementKind::Println(_)));
        assert_eq!(program.statements[0].left().unwrap().to_string(), "x");
        assert_eq!(program.statements[1].to_string(), "print x;");
    }

    #[test]
    fn missing_assign_is_reported() {
        let program = parse("num x 5;");
        assert!(!program.is_ok());
        assert!(program.statements.is_empty());

        let diagnostics = program.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0],
            "expected next token to be `=` or `;` but found `5`"
        );
    }

    #[test]
    fn parsing_continues_after_a_broken_statement() {
        let program = parse("num x 5; num y = 2; print y + ; println y;");
        assert_eq!(program.errors.len(), 2);
        let rendered: Vec<String> = program.statements.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, vec!["num y = 2;", "println y;"]);
    }

    #[test]
    fn missing_semicolon_at_end_of_input() {
        let program = parse("num x = 5");
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::ExpectedToken {
                expected: "`;`".into(),
                found: "end of input".into(),
            }
        );
    }

    #[test]
    fn unclosed_group_is_reported() {
        let program = parse("print (1 + 2;");
        assert!(matches!(
            &program.errors[0].kind,
            ParseErrorKind::ExpectedToken { expected, found }
                if expected == "`)`" && found == ";"
        ));
    }

    #[test]
    fn token_without_prefix_rule() {
        let program = parse("num x = * 2;");
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::NoRuleForToken("*".into())
        );
        assert_eq!(program.diagnostics()[0], "couldn't parse `*`");
    }

    #[test]
    fn unknown_token_inside_expression() {
        let program = parse("num x = 5 $ 3;");
        assert!(matches!(
            &program.errors[0].kind,
            ParseErrorKind::ExpectedToken { found, .. } if found == "$"
        ));
    }

    #[test]
    fn unknown_token_stops_the_program() {
        let program = parse("num x = 1; @ num y = 2;");
        assert_eq!(program.statements.len(), 1);
        assert_eq!(
            program.errors,
            vec![ParseError {
                span: Span { line: 1, col: 12, length: 1 },
                kind: ParseErrorKind::UnknownToken("@".into()),
            }]
        );
    }

    #[test]
    fn block_statement_is_unsupported() {
        let program = parse("num x = 1; { num y = 2; }");
        assert_eq!(program.statements.len(), 1);
        assert_eq!(program.errors[0].kind, ParseErrorKind::UnsupportedBlock);
    }

    #[test]
    fn stray_token_cannot_start_a_statement() {
        let program = parse("5;");
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::UnexpectedStatement("5".into())
        );
    }

    #[test]
    fn literal_values() {
        let cases = [
            ("42", Value::Int(42)),
            ("5.6", Value::Float(5.6)),
            ("true", Value::Bool(true)),
            ("\"Hello world\"", Value::Text("Hello world".into())),
            ("\"tab\\tquote\\\"\"", Value::Text("tab\tquote\"".into())),
            ("\"keep \\q\"", Value::Text("keep \\q".into())),
            ("'l'", Value::Text("l".into())),
            ("'\\n'", Value::Text("\n".into())),
            ("'\\''", Value::Text("'".into())),
        ];

        for (source, value) in cases {
            let expr = first_value(&format!("print {};", source));
            assert_eq!(expr.literal(), Some(&value), "source {:?}", source);
        }
    }

    #[test]
    fn integer_literal_beyond_64_bits() {
        let program = parse("num x = 9223372036854775808;");
        assert!(matches!(
            &program.errors[0].kind,
            ParseErrorKind::LiteralOutOfRange { literal, .. } if literal == "9223372036854775808"
        ));
        assert!(parse("num x = 9223372036854775807;").is_ok());
    }

    #[test]
    fn unterminated_text_is_rejected() {
        let program = parse("print \"never closed;");
        assert!(matches!(
            program.errors[0].kind,
            ParseErrorKind::UnterminatedString(_)
        ));
    }

    #[test]
    fn malformed_letter_is_rejected() {
        let program = parse("letter c = 'ab';");
        assert!(matches!(
            program.errors[0].kind,
            ParseErrorKind::MalformedLiteral(_)
        ));
    }

    #[test]
    fn integer_literal_must_fit_declared_width() {
        let program = parse("num8 a = 200;");
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::LiteralOutOfRange {
                literal: "200".into(),
                target: "`num8`".into(),
            }
        );
        assert_eq!(program.errors[0].span, Span { line: 1, col: 10, length: 3 });

        let program = parse("num16 a = -40000;");
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::LiteralOutOfRange {
                literal: "-40000".into(),
                target: "`num16`".into(),
            }
        );

        parse_ok("num8 b = -128; num8 c = 127; num32 d = -2147483648; fnum32 e = 200;");
        // computed values are left to the evaluator
        parse_ok("num8 a = 100 + 100;");
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let source = format!("print {}1;\nprintln 2;", "-".repeat(100_000));
        let program = parse(&source);
        assert_eq!(
            program.errors[0].kind,
            ParseErrorKind::TooDeeplyNested(MAX_NESTING)
        );
        // recovery picks up after the `;`
        assert_eq!(program.statements.len(), 1);

        let chain = format!("print 1{};", " + 1".repeat(10_000));
        assert_eq!(
            parse(&chain).errors[0].kind,
            ParseErrorKind::TooDeeplyNested(MAX_NESTING)
        );

        let groups = format!("print {}1{};", "(".repeat(1_000), ")".repeat(1_000));
        assert_eq!(
            parse(&groups).errors[0].kind,
            ParseErrorKind::TooDeeplyNested(MAX_NESTING)
        );
    }

    #[test]
    fn moderate_nesting_is_fine() {
        let source = format!("print {}1{};", "(".repeat(50), ")".repeat(50));
        parse_ok(&source);
        parse_ok(&format!("print {}1;", "-".repeat(100)));
    }

    #[test]
    fn parse_uses_custom_keywords() {
        let mut keywords = default_keyword_table();
        keywords.remove("print");
        keywords.insert("cetak".into(), TokenType::Print);

        let program = Parser::new("cetak 1;", &keywords).parse_program();
        assert!(program.is_ok());
        assert_eq!(program.statements[0].to_string(), "cetak 1;");
    }
}
