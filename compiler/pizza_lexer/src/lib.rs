//! Lexer for Pizza using logos.
//!
//! Two layers, mirroring the raw/cooked split:
//!
//! - [`raw_token`]: the logos-derived tokenizer (identifiers, numeric
//!   lexemes, line comments, single punctuation characters)
//! - the cooking step here, which resolves keywords from identifier lexemes
//!   (case-sensitively) and parses numeric lexemes into `f64`
//!
//! The parser pulls tokens one at a time through [`TokenStream`], which
//! owns the character source and refills one line at a time. That keeps the
//! interactive REPL honest (stdin is only read when the parser actually
//! asks for another token) and is safe because no Pizza token can span a
//! newline.
//!
//! There is no lexer error state. A numeric lexeme `f64` parsing rejects
//! (such as `1.2.3`) cooks to `Number(NaN)`, and any character the grammar
//! does not know cooks to `Raw(c)` for the parser to deal with.

mod raw_token;

use std::collections::VecDeque;
use std::io::BufRead;

use logos::Logos;

use raw_token::RawToken;

/// A cooked token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// End of the character source. Never consumed past.
    Eof,
    Base,
    Sauce,
    Topping,
    If,
    Then,
    Else,
    For,
    In,
    Binary,
    Unary,
    Identifier(String),
    Number(f64),
    /// A single raw punctuation/operator character.
    Raw(char),
}

/// Resolve a keyword from an identifier lexeme. Case-sensitive.
fn keyword(text: &str) -> Option<Token> {
    match text {
        "base" => Some(Token::Base),
        "sauce" => Some(Token::Sauce),
        "topping" => Some(Token::Topping),
        "if" => Some(Token::If),
        "then" => Some(Token::Then),
        "else" => Some(Token::Else),
        "for" => Some(Token::For),
        "in" => Some(Token::In),
        "binary" => Some(Token::Binary),
        "unary" => Some(Token::Unary),
        _ => None,
    }
}

fn cook(raw: RawToken, slice: &str) -> Option<Token> {
    match raw {
        RawToken::LineComment => None,
        RawToken::Ident => {
            Some(keyword(slice).unwrap_or_else(|| Token::Identifier(slice.to_string())))
        }
        RawToken::Number => Some(Token::Number(slice.parse().unwrap_or(f64::NAN))),
        RawToken::Punct => slice.chars().next().map(Token::Raw),
    }
}

/// Tokenize one line of source.
pub fn lex_line(line: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut lexer = RawToken::lexer(line);
    while let Some(result) = lexer.next() {
        match result {
            Ok(raw) => out.extend(cook(raw, lexer.slice())),
            // Characters outside the printable ASCII range still surface as
            // raw tokens; the parser reports them.
            Err(()) => out.extend(lexer.slice().chars().next().map(Token::Raw)),
        }
    }
    out
}

/// Pull-driven token source over a character stream.
pub struct TokenStream {
    source: Box<dyn BufRead>,
    pending: VecDeque<Token>,
    eof: bool,
}

impl TokenStream {
    pub fn new(source: Box<dyn BufRead>) -> Self {
        TokenStream {
            source,
            pending: VecDeque::new(),
            eof: false,
        }
    }

    /// Token stream over in-memory source text.
    pub fn from_source(text: impl Into<String>) -> Self {
        TokenStream::new(Box::new(std::io::Cursor::new(text.into())))
    }

    /// The next token, reading more input on demand. Yields [`Token::Eof`]
    /// at end of stream, and keeps yielding it.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }
            if self.eof {
                return Token::Eof;
            }
            let mut line = String::new();
            match self.source.read_line(&mut line) {
                Ok(0) | Err(_) => self.eof = true,
                Ok(_) => self.pending.extend(lex_line(&line)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(source: &str) -> Vec<Token> {
        let mut stream = TokenStream::from_source(source);
        let mut out = Vec::new();
        loop {
            match stream.next_token() {
                Token::Eof => return out,
                token => out.push(token),
            }
        }
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(all("base"), vec![Token::Base]);
        assert_eq!(all("Base"), vec![Token::Identifier("Base".into())]);
        assert_eq!(
            all("sauce topping if then else for in binary unary"),
            vec![
                Token::Sauce,
                Token::Topping,
                Token::If,
                Token::Then,
                Token::Else,
                Token::For,
                Token::In,
                Token::Binary,
                Token::Unary,
            ]
        );
    }

    #[test]
    fn identifiers_may_contain_digits() {
        assert_eq!(
            all("x1 fib2"),
            vec![
                Token::Identifier("x1".into()),
                Token::Identifier("fib2".into()),
            ]
        );
    }

    #[test]
    fn numbers_parse_as_f64() {
        assert_eq!(all("42"), vec![Token::Number(42.0)]);
        assert_eq!(all("4.5"), vec![Token::Number(4.5)]);
        assert_eq!(all(".5"), vec![Token::Number(0.5)]);
    }

    #[test]
    fn malformed_number_cooks_to_nan() {
        let tokens = all("1.2.3");
        assert_eq!(tokens.len(), 1);
        match tokens[0] {
            Token::Number(v) => assert!(v.is_nan()),
            ref other => panic!("expected a number token, got {other:?}"),
        }
    }

    #[test]
    fn punctuation_comes_through_raw() {
        assert_eq!(
            all("(){},;=<+-*/"),
            vec![
                Token::Raw('('),
                Token::Raw(')'),
                Token::Raw('{'),
                Token::Raw('}'),
                Token::Raw(','),
                Token::Raw(';'),
                Token::Raw('='),
                Token::Raw('<'),
                Token::Raw('+'),
                Token::Raw('-'),
                Token::Raw('*'),
                Token::Raw('/'),
            ]
        );
    }

    #[test]
    fn comments_are_discarded_to_end_of_line() {
        assert_eq!(
            all("1 # ignored ; base\n2"),
            vec![Token::Number(1.0), Token::Number(2.0)]
        );
    }

    #[test]
    fn tokens_flow_across_lines() {
        assert_eq!(
            all("4 +\n5"),
            vec![Token::Number(4.0), Token::Raw('+'), Token::Number(5.0)]
        );
    }

    #[test]
    fn eof_is_sticky() {
        let mut stream = TokenStream::from_source("1");
        assert_eq!(stream.next_token(), Token::Number(1.0));
        assert_eq!(stream.next_token(), Token::Eof);
        assert_eq!(stream.next_token(), Token::Eof);
    }
}
