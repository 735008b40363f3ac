//! Error types for the assembler.

use spendscript_common::{EncodeError, Token};
use thiserror::Error;

/// Lexical errors in assembly text.
///
/// The lexer counts these and skips the malformed unit instead of stopping.
/// `at` is the byte offset of the offending unit in the source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// An identifier that is neither a keyword nor an opcode mnemonic.
    #[error("byte {at}: unknown opcode '{word}'")]
    UnknownOpcode { at: usize, word: String },

    /// A `0x` literal whose digits are not an even-length hex string.
    #[error("byte {at}: invalid hex literal '{literal}'")]
    InvalidHex { at: usize, literal: String },

    /// A numeric literal that is not a decimal integer.
    #[error("byte {at}: invalid number '{literal}'")]
    InvalidNumber { at: usize, literal: String },

    /// Floating point literals have no script encoding.
    #[error("byte {at}: floating point not supported '{literal}'")]
    FloatNotSupported { at: usize, literal: String },

    /// A quoted literal or block comment missing its closing delimiter.
    #[error("byte {at}: unterminated literal")]
    Unterminated { at: usize },

    /// A unary minus not followed by a number.
    #[error("byte {at}: '-' must be followed by a number")]
    DanglingMinus { at: usize },

    /// A character that starts no token.
    #[error("byte {at}: unexpected character '{ch}'")]
    UnexpectedChar { at: usize, ch: char },
}

/// Errors produced while compiling a token stream to bytecode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The token source yielded [`Token::Invalid`].
    #[error("invalid token at byte {at}")]
    InvalidToken { at: usize },

    /// A token kind that carries no operand the compiler can encode.
    #[error("unrecognized {token} token at byte {at}")]
    UnrecognizedToken { at: usize, token: Token },

    /// The token source raised lexical errors while scanning.
    #[error("token source reported {count} error(s)")]
    SourceErrors { count: usize },

    /// A token's operand could not be encoded.
    #[error("byte {at}: {source}")]
    Encode { at: usize, source: EncodeError },
}

/// Errors from [`assemble`](crate::assemble) and
/// [`disassemble`](crate::disassemble).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = LexError::UnknownOpcode {
            at: 3,
            word: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "byte 3: unknown opcode 'FOO'");
    }

    #[test]
    fn error_display_invalid_hex() {
        let e = LexError::InvalidHex {
            at: 0,
            literal: "0xabc".to_string(),
        };
        assert_eq!(e.to_string(), "byte 0: invalid hex literal '0xabc'");
    }

    #[test]
    fn error_display_dangling_minus() {
        assert_eq!(
            LexError::DanglingMinus { at: 9 }.to_string(),
            "byte 9: '-' must be followed by a number"
        );
    }

    #[test]
    fn error_display_encode() {
        let e = CompileError::Encode {
            at: 2,
            source: EncodeError::PushTooLarge { len: 1 << 33 },
        };
        assert_eq!(
            e.to_string(),
            "byte 2: push of 8589934592 bytes exceeds the largest push-data length"
        );
    }

    #[test]
    fn error_display_compile() {
        assert_eq!(
            CompileError::InvalidToken { at: 4 }.to_string(),
            "invalid token at byte 4"
        );
        assert_eq!(
            CompileError::UnrecognizedToken {
                at: 1,
                token: Token::Number
            }
            .to_string(),
            "unrecognized NUMBER token at byte 1"
        );
        assert_eq!(
            CompileError::SourceErrors { count: 2 }.to_string(),
            "token source reported 2 error(s)"
        );
    }

    #[test]
    fn asm_error_is_transparent() {
        let e: AsmError = LexError::Unterminated { at: 5 }.into();
        assert_eq!(e.to_string(), "byte 5: unterminated literal");
    }
}
