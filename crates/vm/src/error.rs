//! Execution errors for the script VM.
//!
//! Every error raised while running an operation carries the byte offset
//! (`at`) of that operation in the executing script.

use crate::subscript::SubscriptError;
use num_bigint::BigInt;
use spendscript_ast::ParseError;
use spendscript_common::Opcode;
use thiserror::Error;

/// Errors that end an evaluation with an invalid verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// Pop or peek on a main stack with too few elements.
    #[error("stack underflow at byte {at}")]
    StackUnderflow { at: usize },

    /// FROMALTSTACK on an empty alt stack.
    #[error("alt stack underflow at byte {at}")]
    AltStackUnderflow { at: usize },

    /// PICK or ROLL with an index outside the stack.
    #[error("stack index {index} out of range at byte {at}")]
    InvalidStackIndex { at: usize, index: BigInt },

    /// VERIFY, or the verify step of a composite operation, saw false.
    #[error("verify failed at byte {at}")]
    VerifyFailed { at: usize },

    /// RETURN executed.
    #[error("RETURN executed at byte {at}")]
    OpReturn { at: usize },

    /// A legacy opcode that always fails.
    #[error("disabled opcode {op} at byte {at}")]
    DisabledOpcode { at: usize, op: Opcode },

    /// A reserved opcode was executed.
    #[error("reserved opcode {op} at byte {at}")]
    ReservedOpcode { at: usize, op: Opcode },

    /// An opcode with no operation semantics reached the dispatcher
    /// (push-data prefixes, structural markers, pseudo opcodes).
    #[error("opcode {op} cannot be executed as an operation at byte {at}")]
    UnexpectedOpcode { at: usize, op: Opcode },

    /// A signature opcode ran without a signature checker.
    #[error("no signature checker for signature operation at byte {at}")]
    NoSignatureChecker { at: usize },

    /// CHECKMULTISIG key count negative or above the configured maximum.
    #[error("invalid public key count {count} at byte {at}")]
    InvalidPubKeyCount { at: usize, count: BigInt },

    /// CHECKMULTISIG signature count negative or above the key count.
    #[error("invalid signature count {count} at byte {at}")]
    InvalidSignatureCount { at: usize, count: BigInt },

    /// The subscript for a signature check could not be built.
    #[error("cannot build subscript at byte {at}: {source}")]
    Subscript {
        at: usize,
        #[source]
        source: SubscriptError,
    },

    /// Main plus alt stack would exceed the configured depth.
    #[error("stack depth limit {limit} exceeded at byte {at}")]
    StackOverflow { at: usize, limit: usize },

    /// A pushed element exceeds the configured size.
    #[error("element of {size} bytes exceeds limit {limit} at byte {at}")]
    ElementTooLarge { at: usize, size: usize, limit: usize },

    /// More operations executed than the configured maximum.
    #[error("operation limit {limit} exceeded at byte {at}")]
    TooManyOperations { at: usize, limit: usize },

    /// The script is longer than the configured maximum.
    #[error("script of {size} bytes exceeds limit {limit}")]
    ScriptTooLarge { size: usize, limit: usize },

    /// Execution finished with an empty stack.
    #[error("script finished with an empty stack")]
    EmptyStack,

    /// Execution finished with false on top of the stack.
    #[error("script finished with false on top of the stack")]
    ResultFalse,
}

/// Failure of a full script run: the bytes did not parse, or the program
/// failed while running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Malformed(#[from] ParseError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        assert_eq!(
            ExecError::StackUnderflow { at: 5 }.to_string(),
            "stack underflow at byte 5"
        );
        assert_eq!(
            ExecError::DisabledOpcode {
                at: 2,
                op: Opcode::Cat
            }
            .to_string(),
            "disabled opcode CAT at byte 2"
        );
        assert_eq!(
            ExecError::InvalidStackIndex {
                at: 0,
                index: BigInt::from(-1)
            }
            .to_string(),
            "stack index -1 out of range at byte 0"
        );
        assert_eq!(
            ExecError::ResultFalse.to_string(),
            "script finished with false on top of the stack"
        );
    }

    #[test]
    fn script_error_is_transparent() {
        let e: ScriptError = ParseError::UnclosedIf { at: 1 }.into();
        assert_eq!(e.to_string(), "unclosed IF statement opened at byte 1");
        let e: ScriptError = ExecError::OpReturn { at: 3 }.into();
        assert_eq!(e.to_string(), "RETURN executed at byte 3");
    }
}
