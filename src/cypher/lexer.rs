//! Cypher lexer. Scans a query string one token at a time.
//!
//! The lexer never fails: anything it does not recognise as punctuation,
//! a relationship marker or whitespace is absorbed into a `STRING` token.
//! Rejection is left to the parser.

use std::iter::Peekable;
use std::str::CharIndices;

use super::token::{Token, TokenInfo};

/// Streaming scanner over a query string.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, chars: input.char_indices().peekable() }
    }

    /// Return the next token. Once the input is exhausted every call
    /// returns `EOF`.
    pub fn scan(&mut self) -> TokenInfo {
        let Some((pos, ch)) = self.chars.next() else {
            return TokenInfo::new(Token::Eof, "", self.input.len());
        };

        match ch {
            '-' => {
                if self.chars.next_if(|&(_, c)| c == '>').is_some() {
                    TokenInfo::new(Token::ToRelationship, "->", pos)
                } else {
                    TokenInfo::new(Token::Relationship, "-", pos)
                }
            }
            '<' => {
                if self.chars.next_if(|&(_, c)| c == '-').is_some() {
                    TokenInfo::new(Token::FromRelationship, "<-", pos)
                } else {
                    // A lone '<' is just the first character of a literal.
                    self.scan_literal(pos, ch)
                }
            }
            c if is_whitespace(c) => {
                while self.chars.next_if(|&(_, c)| is_whitespace(c)).is_some() {}
                TokenInfo::new(Token::Ws, "", pos)
            }
            c => match Token::punctuation(c) {
                Some(tok) => TokenInfo::new(tok, c.to_string(), pos),
                None => self.scan_literal(pos, c),
            },
        }
    }

    /// Scan a bare or single-quoted literal whose first character has
    /// already been consumed.
    fn scan_literal(&mut self, start: usize, first: char) -> TokenInfo {
        if first == '\'' {
            let mut lit = String::new();
            loop {
                match self.chars.next() {
                    Some((_, '\'')) => break,
                    Some((_, c)) => lit.push(c),
                    None => {
                        // Unterminated quote: keep everything up to EOF.
                        tracing::warn!(position = start, literal = %lit, "unterminated quoted literal");
                        break;
                    }
                }
            }
            // Quoted text is always a value, never a keyword.
            return TokenInfo::quoted(lit, start);
        }

        let mut lit = String::from(first);
        while let Some((_, c)) = self.chars.next_if(|&(_, c)| !is_delimiter(c)) {
            lit.push(c);
        }

        match Token::keyword(&lit) {
            Some(kw) => TokenInfo::new(kw, kw.to_string(), start),
            None => TokenInfo::new(Token::String, lit, start),
        }
    }
}

/// Scan the whole input, including the trailing `EOF` token.
pub fn tokenize(input: &str) -> Vec<TokenInfo> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.scan();
        let done = tok.token == Token::Eof;
        tokens.push(tok);
        if done {
            return tokens;
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

fn is_delimiter(ch: char) -> bool {
    is_whitespace(ch) || Token::punctuation(ch).is_some()
}
