//! Binary tokenizer: decodes raw script bytes one instruction at a time.

use crate::error::ScanError;
use crate::opcode::{is_direct_push, Opcode};
use crate::token::{Token, TokenSource};
use num_bigint::BigInt;
use tracing::debug;

/// Callback invoked for every lexical error, in addition to counting it.
pub type ErrorHandler<'a> = Box<dyn FnMut(&ScanError) + 'a>;

/// Tokenizes script bytecode.
///
/// Malformed input never stops the scanner: underflowing pushes are
/// truncated to the bytes available and undefined bytes yield
/// [`Token::Invalid`], each raising one counted error.
pub struct Scanner<'a> {
    script: &'a [u8],
    /// Offset of the next unread byte.
    pos: usize,
    /// Offset of the current token's first byte.
    start: usize,
    error_count: usize,
    on_error: Option<ErrorHandler<'a>>,

    op: Option<Opcode>,
    data: &'a [u8],
    number: Option<BigInt>,
}

impl<'a> Scanner<'a> {
    pub fn new(script: &'a [u8]) -> Self {
        Self {
            script,
            pos: 0,
            start: 0,
            error_count: 0,
            on_error: None,
            op: None,
            data: &[],
            number: None,
        }
    }

    /// Create a scanner that also reports each error to `handler`.
    pub fn with_error_handler(script: &'a [u8], handler: impl FnMut(&ScanError) + 'a) -> Self {
        let mut scanner = Self::new(script);
        scanner.on_error = Some(Box::new(handler));
        scanner
    }

    /// Offset one past the last byte of the current token.
    pub fn end_pos(&self) -> usize {
        self.pos
    }

    /// The exact bytes of the current instruction, prefix included.
    pub fn raw(&self) -> &'a [u8] {
        let script = self.script;
        &script[self.start..self.pos]
    }

    fn raise(&mut self, err: ScanError) {
        self.error_count += 1;
        debug!(%err, "script scan error");
        if let Some(handler) = self.on_error.as_mut() {
            handler(&err);
        }
    }

    /// Take up to `wanted` bytes, raising an underflow if fewer remain.
    fn take(&mut self, wanted: usize) -> &'a [u8] {
        let available = self.script.len() - self.pos;
        let len = if wanted > available {
            self.raise(ScanError::Underflow {
                at: self.start,
                wanted,
                available,
            });
            available
        } else {
            wanted
        };
        let script = self.script;
        let bytes = &script[self.pos..self.pos + len];
        self.pos += len;
        bytes
    }

    /// Read a little-endian length prefix of `width` bytes.
    fn length_prefix(&mut self, width: usize) -> usize {
        let bytes = self.take(width);
        if bytes.len() < width {
            return 0;
        }
        bytes
            .iter()
            .rev()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize)
    }

    fn push(&mut self, len: usize) -> Token {
        self.data = self.take(len);
        Token::Data
    }
}

impl TokenSource for Scanner<'_> {
    fn scan(&mut self) -> Token {
        self.op = None;
        self.data = &[];
        self.number = None;

        if self.pos >= self.script.len() {
            self.start = self.script.len();
            return Token::EndOfScript;
        }

        self.start = self.pos;
        let byte = self.script[self.pos];
        self.pos += 1;

        match byte {
            0x00 => Token::Data,
            b if is_direct_push(b) => self.push(b as usize),
            0x4c => {
                let len = self.length_prefix(1);
                self.push(len)
            }
            0x4d => {
                let len = self.length_prefix(2);
                self.push(len)
            }
            0x4e => {
                let len = self.length_prefix(4);
                self.push(len)
            }
            0x4f => {
                self.number = Some(BigInt::from(-1));
                Token::Number
            }
            0x51..=0x60 => {
                self.number = Some(BigInt::from(byte - 0x50));
                Token::Number
            }
            0x63 => Token::If,
            0x64 => Token::NotIf,
            0x67 => Token::Else,
            0x68 => Token::EndIf,
            0xab => Token::CodeSeparator,
            _ => match Opcode::try_from(byte) {
                Ok(op) if op.is_valid() => {
                    self.op = Some(op);
                    Token::Operation
                }
                _ => {
                    self.raise(ScanError::InvalidOpcode {
                        at: self.start,
                        byte,
                    });
                    Token::Invalid
                }
            },
        }
    }

    fn op(&self) -> Option<Opcode> {
        self.op
    }

    fn data(&self) -> &[u8] {
        self.data
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn tokens(script: &[u8]) -> Vec<Token> {
        let mut s = Scanner::new(script);
        let mut out = Vec::new();
        loop {
            let tok = s.scan();
            if tok == Token::EndOfScript {
                return out;
            }
            out.push(tok);
        }
    }

    #[test]
    fn empty_script_is_end() {
        let mut s = Scanner::new(&[]);
        assert_eq!(s.scan(), Token::EndOfScript);
        assert_eq!(s.scan(), Token::EndOfScript);
        assert_eq!(s.error_count(), 0);
    }

    #[test]
    fn op_false_is_empty_data() {
        let mut s = Scanner::new(&[0x00]);
        assert_eq!(s.scan(), Token::Data);
        assert!(s.data().is_empty());
        assert_eq!(s.raw(), &[0x00]);
    }

    #[test]
    fn direct_push() {
        let script = [0x03, 0xaa, 0xbb, 0xcc, 0x76];
        let mut s = Scanner::new(&script);
        assert_eq!(s.scan(), Token::Data);
        assert_eq!(s.data(), &[0xaa, 0xbb, 0xcc]);
        assert_eq!(s.pos(), 0);
        assert_eq!(s.end_pos(), 4);
        assert_eq!(s.scan(), Token::Operation);
        assert_eq!(s.op(), Some(Opcode::Dup));
        assert_eq!(s.pos(), 4);
    }

    #[test]
    fn pushdata_prefixes() {
        let script = [
            0x4c, 0x02, 0x01, 0x02, // PUSHDATA1
            0x4d, 0x01, 0x00, 0x09, // PUSHDATA2
            0x4e, 0x02, 0x00, 0x00, 0x00, 0x07, 0x08, // PUSHDATA4
        ];
        let mut s = Scanner::new(&script);
        assert_eq!(s.scan(), Token::Data);
        assert_eq!(s.data(), &[0x01, 0x02]);
        assert_eq!(s.scan(), Token::Data);
        assert_eq!(s.data(), &[0x09]);
        assert_eq!(s.scan(), Token::Data);
        assert_eq!(s.data(), &[0x07, 0x08]);
        assert_eq!(s.raw(), &script[8..]);
        assert_eq!(s.scan(), Token::EndOfScript);
        assert_eq!(s.error_count(), 0);
    }

    #[test]
    fn small_numbers() {
        let mut s = Scanner::new(&[0x4f, 0x51, 0x60]);
        assert_eq!(s.scan(), Token::Number);
        assert_eq!(s.number(), Some(&BigInt::from(-1)));
        assert_eq!(s.scan(), Token::Number);
        assert_eq!(s.number(), Some(&BigInt::from(1)));
        assert_eq!(s.scan(), Token::Number);
        assert_eq!(s.number(), Some(&BigInt::from(16)));
    }

    #[test]
    fn reserved_is_an_operation() {
        let mut s = Scanner::new(&[0x50]);
        assert_eq!(s.scan(), Token::Operation);
        assert_eq!(s.op(), Some(Opcode::Reserved));
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            tokens(&[0x63, 0x64, 0x67, 0x68, 0xab]),
            vec![
                Token::If,
                Token::NotIf,
                Token::Else,
                Token::EndIf,
                Token::CodeSeparator
            ]
        );
    }

    #[test]
    fn underflow_truncates_and_counts() {
        let errors = RefCell::new(Vec::new());
        let script = [0x05, 0x01, 0x02];
        let mut s = Scanner::with_error_handler(&script, |e| errors.borrow_mut().push(e.clone()));
        assert_eq!(s.scan(), Token::Data);
        assert_eq!(s.data(), &[0x01, 0x02]);
        assert_eq!(s.scan(), Token::EndOfScript);
        assert_eq!(s.error_count(), 1);
        drop(s);
        assert_eq!(
            errors.into_inner(),
            vec![ScanError::Underflow {
                at: 0,
                wanted: 5,
                available: 2
            }]
        );
    }

    #[test]
    fn truncated_length_prefix() {
        let mut s = Scanner::new(&[0x4d, 0x01]);
        assert_eq!(s.scan(), Token::Data);
        assert!(s.data().is_empty());
        assert_eq!(s.scan(), Token::EndOfScript);
        assert_eq!(s.error_count(), 1);
    }

    #[test]
    fn invalid_bytes_keep_scanning() {
        let mut s = Scanner::new(&[0xba, 0x76, 0xff]);
        assert_eq!(s.scan(), Token::Invalid);
        assert_eq!(s.scan(), Token::Operation);
        assert_eq!(s.scan(), Token::Invalid);
        assert_eq!(s.scan(), Token::EndOfScript);
        assert_eq!(s.error_count(), 2);
    }

    #[test]
    fn every_byte_is_handled() {
        for byte in 0..=255u8 {
            let script = [byte];
            let mut s = Scanner::new(&script);
            let tok = s.scan();
            assert_ne!(tok, Token::EndOfScript, "byte {byte:#04x}");
            if tok == Token::Invalid {
                assert_eq!(s.error_count(), 1);
            }
            assert_eq!(s.scan(), Token::EndOfScript);
        }
    }
}
