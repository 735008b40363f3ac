//! Errors for opcode decoding and binary tokenizing.

use thiserror::Error;

/// Errors from resolving a single byte to a named [`Opcode`](crate::Opcode).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte is a direct-push length prefix (`0x01..=0x4b`), not a named opcode.
    #[error("direct push of {0} bytes is not a named opcode")]
    DirectPush(u8),

    /// Byte has no entry in the opcode table.
    #[error("undefined opcode: {0:#04x}")]
    UndefinedOpcode(u8),
}

/// Lexical errors raised by the binary [`Scanner`](crate::Scanner).
///
/// Scanning never aborts on these. They are counted and handed to the
/// scanner's error callback, and scanning continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A push claims more bytes than remain in the script.
    #[error("script underflow at byte {at}: push wants {wanted} bytes, {available} available")]
    Underflow {
        at: usize,
        wanted: usize,
        available: usize,
    },

    /// Byte is not a defined instruction.
    #[error("invalid opcode {byte:#04x} at byte {at}")]
    InvalidOpcode { at: usize, byte: u8 },
}

/// Errors from encoding instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// No push-data form can describe a payload this long.
    #[error("push of {len} bytes exceeds the largest push-data length")]
    PushTooLarge { len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_undefined_opcode() {
        assert_eq!(
            DecodeError::UndefinedOpcode(0xba).to_string(),
            "undefined opcode: 0xba"
        );
    }

    #[test]
    fn display_direct_push() {
        assert_eq!(
            DecodeError::DirectPush(20).to_string(),
            "direct push of 20 bytes is not a named opcode"
        );
    }

    #[test]
    fn display_underflow() {
        let e = ScanError::Underflow {
            at: 3,
            wanted: 20,
            available: 4,
        };
        assert_eq!(
            e.to_string(),
            "script underflow at byte 3: push wants 20 bytes, 4 available"
        );
    }

    #[test]
    fn display_push_too_large() {
        assert_eq!(
            EncodeError::PushTooLarge { len: 5_000_000_000 }.to_string(),
            "push of 5000000000 bytes exceeds the largest push-data length"
        );
    }

    #[test]
    fn display_invalid_opcode() {
        assert_eq!(
            ScanError::InvalidOpcode { at: 7, byte: 0xff }.to_string(),
            "invalid opcode 0xff at byte 7"
        );
    }
}
