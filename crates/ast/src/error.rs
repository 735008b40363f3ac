//! Errors raised while building a program tree.

use thiserror::Error;

/// Structural errors found by [`parse`](crate::parse).
///
/// All of these are fatal: the builder stops at the first one, except
/// [`ParseError::SourceErrors`], which is checked once the token source is
/// exhausted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token source yielded an invalid token.
    #[error("invalid token at byte {at}")]
    InvalidToken { at: usize },

    /// The input ended with this IF (or NOTIF) still open.
    #[error("unclosed IF statement opened at byte {at}")]
    UnclosedIf { at: usize },

    /// ELSE outside any IF.
    #[error("ELSE without IF at byte {at}")]
    UnexpectedElse { at: usize },

    /// A second ELSE on the same IF.
    #[error("duplicate ELSE at byte {at}")]
    DuplicateElse { at: usize },

    /// ENDIF outside any IF.
    #[error("ENDIF without IF at byte {at}")]
    UnexpectedEndIf { at: usize },

    /// The token source counted lexical errors.
    #[error("token source reported {count} error(s)")]
    SourceErrors { count: usize },
}
