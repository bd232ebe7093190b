//! Token model: the closed set of lexical categories.

use std::fmt;

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Special
    Eof,
    Ws,

    // Identifiers, type names and quoted values
    String,

    // Brackets
    OpenBracket,
    ClosedBracket,
    OpenParenthesis,
    ClosedParenthesis,
    OpenCurlyBracket,
    ClosedCurlyBracket,

    // Relationship markers
    Relationship,     // -
    ToRelationship,   // ->
    FromRelationship, // <-

    // Punctuation
    DoubleColon,
    Comma,
    Dot,

    // Keywords (WHERE / NOT are lexed but not part of the grammar yet)
    Match,
    Return,
    Where,
    Not,
}

impl Token {
    pub fn is_keyword(self) -> bool {
        matches!(self, Token::Match | Token::Return | Token::Where | Token::Not)
    }

    /// Map a single punctuation character to its token.
    pub(crate) fn punctuation(ch: char) -> Option<Token> {
        let tok = match ch {
            '(' => Token::OpenParenthesis,
            ')' => Token::ClosedParenthesis,
            '{' => Token::OpenCurlyBracket,
            '}' => Token::ClosedCurlyBracket,
            '[' => Token::OpenBracket,
            ']' => Token::ClosedBracket,
            ':' => Token::DoubleColon,
            ',' => Token::Comma,
            '.' => Token::Dot,
            _ => return None,
        };
        Some(tok)
    }

    /// Case-insensitive keyword lookup.
    pub(crate) fn keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "MATCH" => Some(Token::Match),
            "RETURN" => Some(Token::Return),
            "WHERE" => Some(Token::Where),
            "NOT" => Some(Token::Not),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::Eof => "EOF",
            Token::Ws => "WS",
            Token::String => "STRING",
            Token::OpenBracket => "[",
            Token::ClosedBracket => "]",
            Token::OpenParenthesis => "(",
            Token::ClosedParenthesis => ")",
            Token::OpenCurlyBracket => "{",
            Token::ClosedCurlyBracket => "}",
            Token::Relationship => "-",
            Token::ToRelationship => "->",
            Token::FromRelationship => "<-",
            Token::DoubleColon => ":",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Match => "MATCH",
            Token::Return => "RETURN",
            Token::Where => "WHERE",
            Token::Not => "NOT",
        };
        f.write_str(name)
    }
}

/// A scanned token with its literal text and byte offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub token: Token,
    pub literal: String,
    pub position: usize,
    /// Set for `STRING` tokens read between single quotes.
    pub quoted: bool,
}

impl TokenInfo {
    pub fn new(token: Token, literal: impl Into<String>, position: usize) -> Self {
        Self { token, literal: literal.into(), position, quoted: false }
    }

    /// A `STRING` token whose text was enclosed in single quotes.
    pub fn quoted(literal: impl Into<String>, position: usize) -> Self {
        Self { quoted: true, ..Self::new(Token::String, literal, position) }
    }
}
