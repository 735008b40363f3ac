//! Push-data instruction encoding.
//!
//! | payload length   | encoding                                  |
//! |------------------|-------------------------------------------|
//! | 0..=75           | one length byte                           |
//! | 76..=255         | `PUSHDATA1` + 1-byte length               |
//! | 256..=65535      | `PUSHDATA2` + 2-byte little-endian length |
//! | larger           | `PUSHDATA4` + 4-byte little-endian length |

use crate::error::EncodeError;
use crate::opcode::{Opcode, MAX_DIRECT_PUSH};

/// Append the length prefix of a minimal push of `len` bytes.
///
/// `dst` is left untouched on error.
pub fn append_push_prefix(dst: &mut Vec<u8>, len: usize) -> Result<(), EncodeError> {
    if len <= MAX_DIRECT_PUSH as usize {
        dst.push(len as u8);
    } else if let Ok(len) = u8::try_from(len) {
        dst.push(Opcode::PushData1.byte());
        dst.push(len);
    } else if let Ok(len) = u16::try_from(len) {
        dst.push(Opcode::PushData2.byte());
        dst.extend_from_slice(&len.to_le_bytes());
    } else {
        let len = u32::try_from(len).map_err(|_| EncodeError::PushTooLarge { len })?;
        dst.push(Opcode::PushData4.byte());
        dst.extend_from_slice(&len.to_le_bytes());
    }
    Ok(())
}

/// Append the minimal push-data instruction for `data` to `dst`.
///
/// # Errors
///
/// [`EncodeError::PushTooLarge`] if `data` is longer than `u32::MAX` bytes.
pub fn append_push_data(dst: &mut Vec<u8>, data: &[u8]) -> Result<(), EncodeError> {
    append_push_prefix(dst, data.len())?;
    dst.extend_from_slice(data);
    Ok(())
}

/// The minimal push-data instruction for `data`, as a fresh buffer.
pub fn push_data(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(data.len() + 5);
    append_push_data(&mut out, data)?;
    Ok(out)
}
