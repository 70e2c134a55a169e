pub mod token;

use crate::lexer::token::{Token, TokenType};
use crate::span::Span;
use std::collections::HashMap;
use tracing::trace;

/// On-demand tokenizer with one token of lookahead.
///
/// The lexer never fails: characters it doesn't recognise come back as
/// `TokenType::Unknown` and it is up to the parser to complain about them.
/// Once the input is exhausted every further call returns `None`.
pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
    start_line: usize,
    start_col: usize,
    keywords: HashMap<String, TokenType>,
    peeked: Option<Option<Token>>,
}

impl Lexer {
    pub fn new(source: impl Into<String>, keywords: &HashMap<String, TokenType>) -> Self {
        Lexer {
            source: source.into().chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            start_line: 1,
            start_col: 1,
            keywords: keywords.clone(),
            peeked: None,
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.scan_token(),
        }
    }

    /// Looks at the next token without consuming it. The token is buffered and
    /// handed out again by the following `next_token`.
    pub fn peek_next_token(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            let token = self.scan_token();
            self.peeked = Some(token);
        }
        self.peeked.as_ref().and_then(|token| token.as_ref())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                return None;
            }

            self.start = self.current;
            self.start_line = self.line;
            self.start_col = self.current - self.line_start + 1;

            let c = self.advance()?;
            let token_type = match c {
                // Comments produce no token, go round again
                '/' if self.current_char() == Some('/') => {
                    self.skip_line_comment();
                    continue;
                }
                '#' => {
                    self.skip_block_comment();
                    continue;
                }

                '(' => TokenType::LeftParen,
                ')' => TokenType::RightParen,
                '{' => TokenType::LeftBrace,
                '}' => TokenType::RightBrace,
                '[' => TokenType::LeftBracket,
                ']' => TokenType::RightBracket,
                ';' => TokenType::Semicolon,
                '+' => TokenType::Plus,
                '-' => TokenType::Minus,
                '*' => TokenType::Star,
                '/' => TokenType::Slash,
                '%' => TokenType::Percent,
                '=' => {
                    if self.match_char('=') {
                        TokenType::Equal
                    } else {
                        TokenType::Assign
                    }
                }

                '\'' => self.handle_letter(),
                '"' => self.handle_text(),
                c if c.is_ascii_digit() => self.handle_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.handle_identifier(),

                _ => TokenType::Unknown,
            };

            let token = self.make_token(token_type);
            trace!(token_type = ?token.token_type, lexeme = %token.lexeme, "lexed token");
            return Some(token);
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.line_start = self.current;
        }
        Some(ch)
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        // the newline itself is left for skip_whitespace
        while self.current_char().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        // an unterminated block comment swallows the rest of the input
        while let Some(c) = self.advance() {
            if c == '#' {
                break;
            }
        }
    }

    fn handle_number(&mut self) -> TokenType {
        // First character is already consumed and is a digit
        let mut seen_dot = false;
        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if seen_dot {
            TokenType::Float
        } else {
            TokenType::Integer
        }
    }

    fn handle_letter(&mut self) -> TokenType {
        // opening quote already consumed: optional escape, payload, closing quote
        if self.current_char() == Some('\\') {
            self.advance();
        }
        self.advance();
        self.match_char('\'');
        TokenType::Letter
    }

    fn handle_text(&mut self) -> TokenType {
        // Runs to the first quote that isn't escaped. Running off the end of
        // the input is not our problem: the parser rejects the unclosed literal.
        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    self.advance();
                }
                '"' => break,
                _ => {}
            }
        }
        TokenType::Text
    }

    fn handle_identifier(&mut self) -> TokenType {
        while self
            .current_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        self.keywords
            .get(&text)
            .cloned()
            .unwrap_or(TokenType::Identifier)
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        let text: String = self.source[self.start..self.current].iter().collect();
        let span = Span {
            line: self.start_line,
            col: self.start_col,
            length: self.current - self.start,
        };
        Token::new(token_type, text, span)
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}
