//! Spending-script assembler: text ↔ bytecode translation.
//!
//! The assembler is a mechanical translation. Numbers and data are encoded
//! minimally, everything else maps 1:1 to its opcode byte.
//!
//! # Usage
//!
//! ```
//! use spendscript_assembler::{assemble, disassemble};
//!
//! let text = "DUP\nHASH160\n0x89abcdefabbaabbaabbaabbaabbaabbaabbaabba\nEQUALVERIFY\nCHECKSIG\n";
//! let script = assemble(text).unwrap();
//! assert_eq!(&script[..3], &[0x76u8, 0xa9, 0x14]);
//! assert_eq!(disassemble(&script).unwrap(), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(script)) == script` holds for all canonical
//! bytecode. The disassembler outputs canonical text; the assembler accepts
//! any spelling the [`Lexer`] understands.

pub mod compiler;
pub mod error;
pub mod lexer;

mod disassembler;

pub use compiler::compile;
pub use error::{AsmError, CompileError, LexError};
pub use lexer::Lexer;

use std::cell::RefCell;

/// Assemble text into bytecode.
///
/// Returns the first lexical error if any occurred, otherwise the first
/// compile error.
pub fn assemble(text: &str) -> Result<Vec<u8>, AsmError> {
    let errors = RefCell::new(Vec::new());
    let result = {
        let mut lexer = Lexer::with_error_handler(text, |e| errors.borrow_mut().push(e.clone()));
        compile(&mut lexer)
    };

    if let Some(first) = errors.into_inner().into_iter().next() {
        return Err(AsmError::Lex(first));
    }
    Ok(result?)
}

/// Disassemble bytecode into canonical assembly text.
///
/// The output is flat text: one token per line, no indentation, no
/// comments.
pub fn disassemble(script: &[u8]) -> Result<String, AsmError> {
    Ok(disassembler::disassemble(script)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_minimal() {
        assert_eq!(assemble("DUP HASH160").unwrap(), vec![0x76, 0xa9]);
    }

    #[test]
    fn assemble_empty() {
        assert_eq!(assemble("").unwrap(), Vec::<u8>::new());
        assert_eq!(assemble("// nothing\n").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn assemble_reports_first_lex_error() {
        let err = assemble("DUP FROB 0xabc").unwrap_err();
        assert_eq!(
            err,
            AsmError::Lex(LexError::UnknownOpcode {
                at: 4,
                word: "FROB".to_string()
            })
        );
    }

    #[test]
    fn dangling_minus_reports_lex_error() {
        let err = assemble("-DUP").unwrap_err();
        assert_eq!(err, AsmError::Lex(LexError::DanglingMinus { at: 0 }));
    }

    #[test]
    fn disassemble_invalid() {
        assert_eq!(
            disassemble(&[0xff]),
            Err(AsmError::Compile(CompileError::InvalidToken { at: 0 }))
        );
    }

    #[test]
    fn roundtrip_simple() {
        let text = "1\nIF\n0x02\nELSE\n0x03\nENDIF\n";
        let script = assemble(text).unwrap();
        assert_eq!(script, vec![0x51, 0x63, 0x01, 0x02, 0x67, 0x01, 0x03, 0x68]);
        assert_eq!(disassemble(&script).unwrap(), text);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use spendscript_common::opcode::ALL_OPCODES;
    use spendscript_common::pushdata::append_push_data;

    /// One canonical instruction: an operation, a small number or a push.
    fn instruction() -> impl Strategy<Value = Vec<u8>> {
        let ops: Vec<u8> = ALL_OPCODES
            .iter()
            .filter(|op| op.is_valid() && !op.is_constant())
            .map(|op| op.byte())
            .collect();
        prop_oneof![
            prop::sample::select(ops).prop_map(|b| vec![b]),
            prop::sample::select(vec![0x4fu8, 0x51, 0x55, 0x60]).prop_map(|b| vec![b]),
            prop::collection::vec(any::<u8>(), 0..300).prop_map(|payload| {
                let mut out = Vec::new();
                append_push_data(&mut out, &payload).unwrap();
                out
            }),
        ]
    }

    proptest! {
        /// Canonical bytecode survives disassemble → assemble unchanged.
        #[test]
        fn disassemble_assemble_roundtrip(parts in prop::collection::vec(instruction(), 0..20)) {
            let script: Vec<u8> = parts.concat();
            let text = disassemble(&script).unwrap();
            prop_assert_eq!(assemble(&text).unwrap(), script);
        }
    }
}
