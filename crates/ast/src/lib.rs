//! Program tree for spending scripts.
//!
//! [`parse`] turns any [`TokenSource`](spendscript_common::TokenSource) into
//! a [`Program`]: an arena of nodes where IF/NOTIF/ELSE/ENDIF become nested
//! [`IfStmt`]s and each code separator owns the statements that follow it.
//!
//! # Usage
//!
//! ```
//! use spendscript_ast::{parse, NodeKind};
//! use spendscript_common::Scanner;
//!
//! // 1 IF 2 ELSE 3 ENDIF
//! let script = [0x51, 0x63, 0x52, 0x67, 0x53, 0x68];
//! let program = parse(&mut Scanner::new(&script)).unwrap();
//! let stmt = program.children(program.root())[1];
//! assert!(matches!(program.node(stmt).kind, NodeKind::If(_)));
//! assert_eq!(program.to_string(), "1\nIF\n2\nELSE\n3\nENDIF\n");
//! ```

pub mod error;
pub mod node;
pub mod parser;

pub use error::ParseError;
pub use node::{Builder, IfStmt, Node, NodeId, NodeKind, Program};
pub use parser::parse;
