//! Disassembler: bytecode → canonical assembly text.
//!
//! Output format is flat text, one token per line. No indentation, no
//! comments, no blank lines. Data renders as `0x` hex (the empty push as
//! `0`), small integers as decimal, everything else as its mnemonic.

use crate::error::CompileError;
use spendscript_common::{Scanner, Token, TokenSource};

/// Disassemble `script` into canonical assembly text.
///
/// Compiling the output reproduces `script` whenever `script` is itself
/// canonical. Non-minimal pushes come back in their minimal form.
pub fn disassemble(script: &[u8]) -> Result<String, CompileError> {
    let mut scanner = Scanner::new(script);
    let mut lines = Vec::new();

    loop {
        let token = scanner.scan();
        let line = match token {
            Token::EndOfScript => break,
            Token::Invalid => return Err(CompileError::InvalidToken { at: scanner.pos() }),
            Token::Data if scanner.data().is_empty() => "0".to_string(),
            Token::Data => format!("0x{}", hex::encode(scanner.data())),
            Token::Number => match scanner.number() {
                Some(n) => n.to_string(),
                None => {
                    return Err(CompileError::UnrecognizedToken {
                        at: scanner.pos(),
                        token,
                    })
                }
            },
            Token::Operation => match scanner.op() {
                Some(op) => op.mnemonic().to_string(),
                None => {
                    return Err(CompileError::UnrecognizedToken {
                        at: scanner.pos(),
                        token,
                    })
                }
            },
            Token::CodeSeparator | Token::If | Token::NotIf | Token::Else | Token::EndIf => {
                token.name().to_string()
            }
        };
        lines.push(line);
    }

    if scanner.error_count() > 0 {
        return Err(CompileError::SourceErrors {
            count: scanner.error_count(),
        });
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}
