//! Tokenizer for the IMAP wire syntax.
//!
//! Breaks a complete response (line plus any embedded literals) into
//! tokens: atoms, quoted strings, `{n}`-prefixed literals, numbers,
//! parentheses, brackets, NIL, and the CRLF sentinel. Literal prefixes
//! commit the next `n` bytes regardless of line boundaries.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// Lexer over one complete response.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unconsumed input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Returns true at end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the current byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peeks at the byte at the given offset from the current position.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Consumes and returns one byte.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Skips n bytes.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        match byte {
            b'\r' => {
                if self.peek_at(1) == Some(b'\n') {
                    self.skip(2);
                    Ok(Token::Crlf)
                } else {
                    Err(self.error("expected LF after CR"))
                }
            }
            b' ' => {
                self.advance();
                Ok(Token::Space)
            }
            b'(' => {
                self.advance();
                Ok(Token::LParen)
            }
            b')' => {
                self.advance();
                Ok(Token::RParen)
            }
            b'[' => {
                self.advance();
                Ok(Token::LBracket)
            }
            b']' => {
                self.advance();
                Ok(Token::RBracket)
            }
            b'*' => {
                self.advance();
                Ok(Token::Asterisk)
            }
            b'+' => {
                self.advance();
                Ok(Token::Plus)
            }
            b'"' => self.read_quoted_string(),
            b'{' => self.read_literal(),
            b'0'..=b'9' => self.read_number_or_atom(),
            _ if is_atom_char(byte) => self.read_atom(),
            _ => Err(self.error(&format!("unexpected byte {byte:#04x}"))),
        }
    }

    fn read_quoted_string(&mut self) -> Result<Token<'a>> {
        self.advance(); // opening quote

        let mut result = Vec::new();
        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => result.push(c),
                    Some(c) => return Err(self.error(&format!("invalid escape: \\{c}"))),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(c) => result.push(c),
                None => return Err(self.error("unterminated quoted string")),
            }
        }

        let s =
            String::from_utf8(result).map_err(|_| self.error("invalid UTF-8 in quoted string"))?;
        Ok(Token::QuotedString(s))
    }

    /// Reads a `{n}` or `{n+}` prefix followed by the literal payload.
    fn read_literal(&mut self) -> Result<Token<'a>> {
        self.advance(); // {

        let start = self.pos;
        let mut non_sync = false;

        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {
                    self.advance();
                }
                b'+' => {
                    non_sync = true;
                    self.advance();
                }
                b'}' => break,
                _ => return Err(self.error("invalid character in literal size")),
            }
        }

        let digits = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid literal size"))?
            .trim_end_matches('+');
        let size: usize = digits
            .parse()
            .map_err(|_| self.error("literal size out of range"))?;

        if self.advance() != Some(b'}') {
            return Err(self.error("expected } after literal size"));
        }

        // A synchronizing literal is always followed by CRLF; a
        // non-synchronizing one may or may not be in the buffered form.
        if non_sync {
            if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
                self.skip(2);
            }
        } else if self.advance() != Some(b'\r') || self.advance() != Some(b'\n') {
            return Err(self.error("expected CRLF after literal size"));
        }

        if self.pos + size > self.input.len() {
            return Err(self.error("incomplete literal data"));
        }

        let data = self.input[self.pos..self.pos + size].to_vec();
        self.skip(size);
        Ok(Token::Literal(data))
    }

    fn read_number_or_atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        let mut all_digits = true;

        while let Some(b) = self.peek() {
            if is_atom_char(b) {
                if !b.is_ascii_digit() {
                    all_digits = false;
                }
                self.advance();
            } else {
                break;
            }
        }

        let s = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid UTF-8 in atom"))?;

        if all_digits {
            let n: u64 = s.parse().map_err(|_| self.error("number too large"))?;
            Ok(Token::Number(n))
        } else {
            Ok(Token::Atom(s))
        }
    }

    fn read_atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;

        while let Some(b) = self.peek() {
            if is_atom_char(b) {
                self.advance();
            } else {
                break;
            }
        }

        let s = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid UTF-8 in atom"))?;

        if s.eq_ignore_ascii_case("NIL") {
            Ok(Token::Nil)
        } else {
            Ok(Token::Atom(s))
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Expects and consumes a token of the given kind.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {expected:?}, got {token:?}")))
        }
    }

    /// Expects and consumes a space.
    pub fn expect_space(&mut self) -> Result<()> {
        self.expect(Token::Space)
    }

    /// Reads an astring (atom, quoted string, or literal).
    pub fn read_astring(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s.to_string()),
            Token::QuotedString(s) => Ok(s),
            Token::Literal(data) => {
                String::from_utf8(data).map_err(|_| self.error("invalid UTF-8 in literal"))
            }
            token => Err(self.error(&format!("expected astring, got {token:?}"))),
        }
    }

    /// Reads an nstring (NIL or string).
    pub fn read_nstring(&mut self) -> Result<Option<String>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::QuotedString(s) => Ok(Some(s)),
            Token::Atom(s) => Ok(Some(s.to_string())),
            Token::Literal(data) => {
                let s = String::from_utf8_lossy(&data).to_string();
                Ok(Some(s))
            }
            token => Err(self.error(&format!("expected nstring, got {token:?}"))),
        }
    }

    /// Reads a number no larger than `u32`.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => {
                u32::try_from(n).map_err(|_| self.error("number exceeds 32 bits"))
            }
            token => Err(self.error(&format!("expected number, got {token:?}"))),
        }
    }

    /// Reads a 64-bit number (MODSEQ, GMail identifiers).
    pub fn read_number64(&mut self) -> Result<u64> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(&format!("expected number, got {token:?}"))),
        }
    }

    /// Reads an atom and returns it borrowed.
    pub fn read_atom_str(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            token => Err(self.error(&format!("expected atom, got {token:?}"))),
        }
    }

    /// Skips any run of spaces.
    pub fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.advance();
        }
    }
}

/// Returns true if the byte may appear inside an atom.
///
/// `\` is included so flags like `\Seen` lex as single tokens, even though
/// RFC 3501 classes it as a quoted-special.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    matches!(b,
        0x21 | 0x23 | 0x24 | 0x26 | 0x27 |       // ! # $ & '
        0x2B..=0x5A |                            // + , - . / digits : ; < = > ? @ A-Z
        0x5C |                                   // \ (flags)
        0x5E..=0x7A |                            // ^ _ ` a-z
        0x7C | 0x7E                              // | ~
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn simple_tokens() {
        let mut lexer = Lexer::new(b"* OK");
        assert_eq!(lexer.next_token().unwrap(), Token::Asterisk);
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("OK"));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn tagged_line() {
        let mut lexer = Lexer::new(b"A0001 OK done\r\n");
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("A0001"));
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("OK"));
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("done"));
        assert_eq!(lexer.next_token().unwrap(), Token::Crlf);
    }

    #[test]
    fn numbers_are_wide() {
        let mut lexer = Lexer::new(b"1278455344230334865");
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Number(1_278_455_344_230_334_865)
        );
    }

    #[test]
    fn number_too_wide_for_u32_errors() {
        let mut lexer = Lexer::new(b"4294967296");
        assert!(lexer.read_number().is_err());
        let mut lexer = Lexer::new(b"4294967295");
        assert_eq!(lexer.read_number().unwrap(), u32::MAX);
    }

    #[test]
    fn quoted_string_with_escapes() {
        let mut lexer = Lexer::new(b"\"say \\\"hi\\\" \\\\now\"");
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::QuotedString("say \"hi\" \\now".to_string())
        );
    }

    #[test]
    fn nil_is_case_insensitive() {
        let mut lexer = Lexer::new(b"NIL nil Nil");
        assert_eq!(lexer.next_token().unwrap(), Token::Nil);
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Nil);
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Nil);
    }

    #[test]
    fn flag_atoms_keep_backslash() {
        let mut lexer = Lexer::new(b"(\\Seen \\Flagged)");
        assert_eq!(lexer.next_token().unwrap(), Token::LParen);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("\\Seen"));
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("\\Flagged"));
        assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    }

    #[test]
    fn literal() {
        let mut lexer = Lexer::new(b"{5}\r\nhello rest");
        match lexer.next_token().unwrap() {
            Token::Literal(data) => assert_eq!(data, b"hello"),
            other => panic!("expected literal, got {other:?}"),
        }
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("rest"));
    }

    #[test]
    fn non_synchronizing_literal() {
        let mut lexer = Lexer::new(b"{3+}\r\nabc");
        match lexer.next_token().unwrap() {
            Token::Literal(data) => assert_eq!(data, b"abc"),
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn truncated_literal_errors() {
        let mut lexer = Lexer::new(b"{10}\r\nabc");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn brackets() {
        let mut lexer = Lexer::new(b"[UIDNEXT 100]");
        assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("UIDNEXT"));
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Number(100));
        assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    }

    #[test]
    fn continuation_prefix() {
        let mut lexer = Lexer::new(b"+ Ready\r\n");
        assert_eq!(lexer.next_token().unwrap(), Token::Plus);
        assert_eq!(lexer.next_token().unwrap(), Token::Space);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("Ready"));
        assert_eq!(lexer.next_token().unwrap(), Token::Crlf);
    }

    #[test]
    fn atom_chars() {
        assert!(is_atom_char(b'A'));
        assert!(is_atom_char(b'z'));
        assert!(is_atom_char(b'0'));
        assert!(is_atom_char(b':'));
        assert!(is_atom_char(b'\\'));
        assert!(!is_atom_char(b' '));
        assert!(!is_atom_char(b'('));
        assert!(!is_atom_char(b'"'));
        assert!(!is_atom_char(b'%'));
        assert!(!is_atom_char(b'{'));
        assert!(!is_atom_char(b']'));
    }

    #[test]
    fn astring_accepts_all_string_forms() {
        let mut lexer = Lexer::new(b"INBOX");
        assert_eq!(lexer.read_astring().unwrap(), "INBOX");

        let mut lexer = Lexer::new(b"\"My Folder\"");
        assert_eq!(lexer.read_astring().unwrap(), "My Folder");

        let mut lexer = Lexer::new(b"{5}\r\nDepot");
        assert_eq!(lexer.read_astring().unwrap(), "Depot");
    }
}
