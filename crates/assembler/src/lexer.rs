//! Tokenizer for spending-script assembly text.
//!
//! Tokens are separated by whitespace. The lexer recognizes:
//!
//! - opcode mnemonics, case-insensitive, with an optional `OP_` prefix
//! - the structural keywords `IF`, `NOTIF`, `ELSE`, `ENDIF`, `CODESEPARATOR`
//! - `0x` hex literals, which become data pushes
//! - decimal integers of any size, with optional leading `-` signs
//! - `"..."`, `'...'` and `` `...` `` literals, pushed as written, quotes included
//! - `//` line comments and `/* */` block comments
//!
//! Malformed units are counted as errors and skipped; scanning continues so
//! the caller sees every error before deciding to give up.

use crate::error::LexError;
use num_bigint::BigInt;
use spendscript_common::{Opcode, Token, TokenSource};
use tracing::debug;

/// Callback invoked for every lexical error, in addition to counting it.
pub type ErrorHandler<'a> = Box<dyn FnMut(&LexError) + 'a>;

/// Tokenizes assembly text into the shared [`Token`] model.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    start: usize,
    error_count: usize,
    on_error: Option<ErrorHandler<'a>>,

    op: Option<Opcode>,
    data: Vec<u8>,
    number: Option<BigInt>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            start: 0,
            error_count: 0,
            on_error: None,
            op: None,
            data: Vec::new(),
            number: None,
        }
    }

    /// Create a lexer that also reports each error to `handler`.
    pub fn with_error_handler(src: &'a str, handler: impl FnMut(&LexError) + 'a) -> Self {
        let mut lexer = Self::new(src);
        lexer.on_error = Some(Box::new(handler));
        lexer
    }

    fn raise(&mut self, err: LexError) {
        self.error_count += 1;
        debug!(%err, "assembly lex error");
        if let Some(handler) = self.on_error.as_mut() {
            handler(&err);
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume characters while `pred` holds, returning the consumed slice.
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let from = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        let src = self.src;
        &src[from..self.pos]
    }

    /// Skip whitespace and comments. An unterminated block comment raises an
    /// error and runs to the end of the input.
    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            let rest = &self.src[self.pos..];
            if rest.starts_with("//") {
                self.eat_while(|c| c != '\n');
            } else if rest.starts_with("/*") {
                let at = self.pos;
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => {
                        self.pos = self.src.len();
                        self.raise(LexError::Unterminated { at });
                    }
                }
            } else {
                return;
            }
        }
    }

    /// Scan one unit. `None` means the unit was malformed and skipped.
    fn scan_unit(&mut self) -> Option<Token> {
        self.skip_trivia();
        self.start = self.pos;
        let Some(c) = self.peek() else {
            return Some(Token::EndOfScript);
        };

        match c {
            '-' => Some(self.negative()),
            '"' | '\'' | '`' => self.quoted(c),
            c if c.is_ascii_digit() => self.numeric(),
            c if c.is_alphabetic() || c == '_' => self.word(),
            _ => {
                self.bump();
                self.raise(LexError::UnexpectedChar { at: self.start, ch: c });
                None
            }
        }
    }

    fn word(&mut self) -> Option<Token> {
        let word = self.eat_while(is_word_char);
        self.classify_word(word)
    }

    fn classify_word(&mut self, word: &str) -> Option<Token> {
        let upper = word.to_ascii_uppercase();
        let keyword = match upper.strip_prefix("OP_").unwrap_or(&upper) {
            "IF" => Some(Token::If),
            "NOTIF" => Some(Token::NotIf),
            "ELSE" => Some(Token::Else),
            "ENDIF" => Some(Token::EndIf),
            "CODESEPARATOR" => Some(Token::CodeSeparator),
            _ => None,
        };
        if keyword.is_some() {
            return keyword;
        }

        match Opcode::from_mnemonic(word) {
            Some(op) => {
                self.op = Some(op);
                Some(Token::Operation)
            }
            None => {
                self.raise(LexError::UnknownOpcode {
                    at: self.start,
                    word: word.to_string(),
                });
                None
            }
        }
    }

    /// A unit starting with a digit: a hex literal, a decimal integer or a
    /// digit-led mnemonic such as `2DUP`.
    fn numeric(&mut self) -> Option<Token> {
        let at = self.start;
        let unit = self.eat_while(|c| is_word_char(c) || c == '.');

        if let Some(digits) = unit
            .strip_prefix("0x")
            .or_else(|| unit.strip_prefix("0X"))
        {
            return match hex::decode(digits) {
                Ok(bytes) => {
                    self.data = bytes;
                    Some(Token::Data)
                }
                Err(_) => {
                    self.raise(LexError::InvalidHex {
                        at,
                        literal: unit.to_string(),
                    });
                    None
                }
            };
        }

        if unit.bytes().all(|b| b.is_ascii_digit()) {
            // All-digit input always parses.
            self.number = BigInt::parse_bytes(unit.as_bytes(), 10);
            return Some(Token::Number);
        }

        if is_float(unit) {
            self.raise(LexError::FloatNotSupported {
                at,
                literal: unit.to_string(),
            });
            return None;
        }

        if !unit.contains('.') {
            if let Some(op) = Opcode::from_mnemonic(unit) {
                self.op = Some(op);
                return Some(Token::Operation);
            }
        }

        self.raise(LexError::InvalidNumber {
            at,
            literal: unit.to_string(),
        });
        None
    }

    /// A run of `-` signs negates the number that follows it, possibly after
    /// whitespace; each sign flips it once. Anything else after the signs
    /// yields [`Token::Invalid`] with a single error.
    fn negative(&mut self) -> Token {
        let at = self.start;
        let mut signs = 0usize;
        while self.peek() == Some('-') {
            self.bump();
            signs += 1;
            self.skip_trivia();
        }
        match (self.scan_unit(), self.number.take()) {
            (Some(Token::Number), Some(n)) => {
                self.start = at;
                self.number = Some(if signs % 2 == 1 { -n } else { n });
                Token::Number
            }
            _ => {
                self.op = None;
                self.data.clear();
                self.start = at;
                self.raise(LexError::DanglingMinus { at });
                Token::Invalid
            }
        }
    }

    /// A quoted literal up to the matching delimiter. The pushed text is the
    /// literal as written, delimiters included. `"` and `'` literals end at
    /// the line; backslash escapes the next character but is kept in the
    /// pushed text. Backquoted literals may span lines and have no escapes.
    fn quoted(&mut self, delim: char) -> Option<Token> {
        let at = self.start;
        self.bump();
        loop {
            match self.peek() {
                None => break,
                Some('\n') if delim != '`' => break,
                Some('\\') if delim != '`' => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some(c) if c == delim => {
                    self.bump();
                    self.data = self.src.as_bytes()[at..self.pos].to_vec();
                    return Some(Token::Data);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.raise(LexError::Unterminated { at });
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `1.5`, `2e10`, `3.0e-1` and the like.
fn is_float(unit: &str) -> bool {
    let mantissa = unit
        .split_once(|c: char| c == 'e' || c == 'E')
        .map_or(unit, |(mantissa, _)| mantissa);
    let has_exponent = mantissa.len() != unit.len();
    let digits_ok = !mantissa.is_empty()
        && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
        && mantissa.matches('.').count() <= 1;
    digits_ok && (unit.contains('.') || has_exponent)
}

impl TokenSource for Lexer<'_> {
    fn scan(&mut self) -> Token {
        loop {
            self.op = None;
            self.data.clear();
            self.number = None;
            if let Some(tok) = self.scan_unit() {
                return tok;
            }
        }
    }

    fn op(&self) -> Option<Opcode> {
        self.op
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn number(&self) -> Option<&BigInt> {
        self.number.as_ref()
    }

    fn pos(&self) -> usize {
        self.start
    }

    fn error_count(&self) -> usize {
        self.error_count
    }
}
