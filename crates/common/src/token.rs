//! Lexical categories shared by the binary scanner and the textual lexer.

use crate::opcode::Opcode;
use num_bigint::BigInt;

/// The tag produced by one scan step.
///
/// Side data for the token (operand bytes, decoded integer, opcode) is read
/// from the [`TokenSource`] after the call to [`TokenSource::scan`] and is
/// overwritten by the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Malformed input. Always accompanied by a raised error.
    Invalid,
    /// No more input. Repeated scans keep returning this.
    EndOfScript,
    /// Literal bytes, available through [`TokenSource::data`].
    Data,
    /// A script integer, available through [`TokenSource::number`].
    Number,
    /// Any non-structural opcode, available through [`TokenSource::op`].
    Operation,
    CodeSeparator,
    If,
    NotIf,
    Else,
    EndIf,
}

impl Token {
    pub fn name(self) -> &'static str {
        match self {
            Token::Invalid => "INVALID",
            Token::EndOfScript => "ENDOFSCRIPT",
            Token::Data => "DATA",
            Token::Number => "NUMBER",
            Token::Operation => "OPERATION",
            Token::CodeSeparator => "CODESEPARATOR",
            Token::If => "IF",
            Token::NotIf => "NOTIF",
            Token::Else => "ELSE",
            Token::EndIf => "ENDIF",
        }
    }

    /// The opcode byte a structural token compiles to.
    pub fn structural_opcode(self) -> Option<Opcode> {
        match self {
            Token::CodeSeparator => Some(Opcode::CodeSeparator),
            Token::If => Some(Opcode::If),
            Token::NotIf => Some(Opcode::NotIf),
            Token::Else => Some(Opcode::Else),
            Token::EndIf => Some(Opcode::EndIf),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A front end that yields one [`Token`] per call.
///
/// Implemented by the binary [`Scanner`](crate::Scanner) and by the textual
/// lexer of the assembler crate. Consumers (tree builder, compiler,
/// subscript extractor) are written against this trait only.
pub trait TokenSource {
    /// Advance to the next token.
    fn scan(&mut self) -> Token;

    /// Opcode of the last [`Token::Operation`].
    fn op(&self) -> Option<Opcode>;

    /// Operand bytes of the last [`Token::Data`]. Empty otherwise.
    fn data(&self) -> &[u8];

    /// Integer of the last [`Token::Number`].
    fn number(&self) -> Option<&BigInt>;

    /// Byte offset in the source where the last token starts.
    fn pos(&self) -> usize;

    /// Number of lexical errors raised so far.
    fn error_count(&self) -> usize;
}
