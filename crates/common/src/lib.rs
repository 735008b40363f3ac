//! Shared types and byte encodings for spending scripts.
//!
//! This crate provides the leaf data of the script toolchain:
//!
//! - [`Opcode`]: the instruction table and its category predicates
//! - [`Token`] / [`TokenSource`]: the lexical model every front end produces
//! - [`Scanner`]: the binary tokenizer over raw bytecode
//! - [`scriptint`]: script integer and script boolean views of stack values
//! - [`pushdata`]: minimal push-data instruction encoding
//!
//! # Usage
//!
//! ```
//! use spendscript_common::{Opcode, Scanner, Token, TokenSource};
//!
//! let script = [0x76, 0xa9];
//! let mut scanner = Scanner::new(&script);
//! assert_eq!(scanner.scan(), Token::Operation);
//! assert_eq!(scanner.op(), Some(Opcode::Dup));
//! assert_eq!(scanner.scan(), Token::Operation);
//! assert_eq!(scanner.op(), Some(Opcode::Hash160));
//! assert_eq!(scanner.scan(), Token::EndOfScript);
//! ```

pub mod error;
pub mod opcode;
pub mod pushdata;
pub mod scanner;
pub mod scriptint;
pub mod token;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, EncodeError, ScanError};
pub use opcode::Opcode;
pub use scanner::Scanner;
pub use token::{Token, TokenSource};
