//! Token stream to canonical bytecode.
//!
//! The compiler works directly on a [`TokenSource`], so the same code
//! canonicalizes assembly text and re-encodes existing bytecode.

use crate::error::CompileError;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use spendscript_common::opcode::Opcode;
use spendscript_common::pushdata::append_push_data;
use spendscript_common::{scriptint, EncodeError, Token, TokenSource};

/// Compile every token of `source` into bytecode.
///
/// Integers -1, 0 and 1..=16 use their dedicated opcode, every other
/// integer is pushed as a minimal script integer. Data uses the smallest
/// push-data form that fits.
///
/// # Errors
///
/// Fails on the first [`Token::Invalid`] or on a token with missing side
/// data, and with [`CompileError::SourceErrors`] if the source counted any
/// lexical errors by the end of the stream.
pub fn compile<S: TokenSource + ?Sized>(source: &mut S) -> Result<Vec<u8>, CompileError> {
    let mut out = Vec::new();

    loop {
        let token = source.scan();
        match token {
            Token::EndOfScript => break,
            Token::Invalid => {
                return Err(CompileError::InvalidToken { at: source.pos() });
            }
            Token::Data => {
                append_push_data(&mut out, source.data()).map_err(|source_err| {
                    CompileError::Encode {
                        at: source.pos(),
                        source: source_err,
                    }
                })?;
            }
            Token::Number => {
                let n = source
                    .number()
                    .ok_or(CompileError::UnrecognizedToken {
                        at: source.pos(),
                        token,
                    })?;
                append_number(&mut out, n).map_err(|source_err| CompileError::Encode {
                    at: source.pos(),
                    source: source_err,
                })?;
            }
            Token::Operation => {
                let op = source.op().ok_or(CompileError::UnrecognizedToken {
                    at: source.pos(),
                    token,
                })?;
                out.push(op.byte());
            }
            Token::CodeSeparator | Token::If | Token::NotIf | Token::Else | Token::EndIf => {
                let op = token
                    .structural_opcode()
                    .ok_or(CompileError::UnrecognizedToken {
                        at: source.pos(),
                        token,
                    })?;
                out.push(op.byte());
            }
        }
    }

    match source.error_count() {
        0 => Ok(out),
        count => Err(CompileError::SourceErrors { count }),
    }
}

/// Append the canonical encoding of one integer.
pub fn append_number(dst: &mut Vec<u8>, n: &BigInt) -> Result<(), EncodeError> {
    if n.is_zero() {
        dst.push(Opcode::False.byte());
    } else if n.is_negative() && n.abs().is_one() {
        dst.push(Opcode::OneNegate.byte());
    } else if let Some(small @ 1..=16) = n.to_u8() {
        dst.push(Opcode::Reserved.byte() + small);
    } else {
        append_push_data(dst, &scriptint::encode(n))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendscript_common::Scanner;

    fn num(n: i64) -> Vec<u8> {
        let mut out = Vec::new();
        append_number(&mut out, &BigInt::from(n)).unwrap();
        out
    }

    #[test]
    fn dedicated_number_opcodes() {
        assert_eq!(num(0), vec![0x00]);
        assert_eq!(num(-1), vec![0x4f]);
        assert_eq!(num(1), vec![0x51]);
        assert_eq!(num(16), vec![0x60]);
    }

    #[test]
    fn other_numbers_are_pushed() {
        assert_eq!(num(17), vec![0x01, 0x11]);
        assert_eq!(num(-2), vec![0x01, 0x82]);
        assert_eq!(num(128), vec![0x02, 0x80, 0x00]);
    }

    #[test]
    fn recompiles_bytecode() {
        let script = [0x76, 0xa9, 0x02, 0xab, 0xcd, 0x88, 0x63, 0x51, 0x67, 0x00, 0x68];
        let mut scanner = Scanner::new(&script);
        assert_eq!(compile(&mut scanner).unwrap(), script.to_vec());
    }

    #[test]
    fn non_minimal_push_is_canonicalized() {
        let script = [0x4c, 0x01, 0xff];
        assert_eq!(compile(&mut Scanner::new(&script)).unwrap(), vec![0x01, 0xff]);
    }

    #[test]
    fn invalid_token_fails() {
        let script = [0x76, 0xff];
        assert_eq!(
            compile(&mut Scanner::new(&script)),
            Err(CompileError::InvalidToken { at: 1 })
        );
    }

    #[test]
    fn source_errors_fail_at_end() {
        let script = [0x76, 0x05, 0x01];
        assert_eq!(
            compile(&mut Scanner::new(&script)),
            Err(CompileError::SourceErrors { count: 1 })
        );
    }
}
