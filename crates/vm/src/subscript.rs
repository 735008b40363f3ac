//! Subscript extraction for signature checks.
//!
//! The subscript is the part of the program a signature commits to: the
//! bytes from the last executed code separator, minus every push of the
//! signature itself and minus every code separator. All other instructions
//! are copied byte for byte, non-minimal pushes included.

use spendscript_common::{Scanner, Token, TokenSource};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptError {
    #[error("invalid token at byte {at}")]
    InvalidToken { at: usize },

    #[error("scanner reported {count} error(s)")]
    ScanErrors { count: usize },
}

/// Remove pushes of `signature` and all code separators from `script`.
pub fn extract_subscript(script: &[u8], signature: &[u8]) -> Result<Vec<u8>, SubscriptError> {
    extract_subscript_multi(script, &[signature])
}

/// Remove pushes of any of `signatures` and all code separators from
/// `script`.
pub fn extract_subscript_multi<S: AsRef<[u8]>>(
    script: &[u8],
    signatures: &[S],
) -> Result<Vec<u8>, SubscriptError> {
    let mut scanner = Scanner::new(script);
    let mut out = Vec::with_capacity(script.len());

    loop {
        match scanner.scan() {
            Token::EndOfScript => break,
            Token::Invalid => return Err(SubscriptError::InvalidToken { at: scanner.pos() }),
            Token::CodeSeparator => {}
            Token::Data if signatures.iter().any(|s| s.as_ref() == scanner.data()) => {}
            _ => out.extend_from_slice(scanner.raw()),
        }
    }

    match scanner.error_count() {
        0 => Ok(out),
        count => Err(SubscriptError::ScanErrors { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_signature_and_separators() {
        // <sig> CODESEPARATOR DUP <sig> <other> CHECKSIG
        let script = [0x02, 0xaa, 0xbb, 0xab, 0x76, 0x02, 0xaa, 0xbb, 0x01, 0xcc, 0xac];
        let sub = extract_subscript(&script, &[0xaa, 0xbb]).unwrap();
        assert_eq!(sub, vec![0x76, 0x01, 0xcc, 0xac]);
    }

    #[test]
    fn partial_match_is_kept() {
        let script = [0x03, 0xaa, 0xbb, 0xcc];
        let sub = extract_subscript(&script, &[0xaa, 0xbb]).unwrap();
        assert_eq!(sub, script.to_vec());
    }

    #[test]
    fn non_minimal_push_is_copied_verbatim() {
        let script = [0x4c, 0x01, 0x07, 0x76];
        let sub = extract_subscript(&script, &[0xaa]).unwrap();
        assert_eq!(sub, script.to_vec());
    }

    #[test]
    fn non_minimal_signature_push_is_removed() {
        let script = [0x4c, 0x02, 0xaa, 0xbb, 0x76];
        let sub = extract_subscript(&script, &[0xaa, 0xbb]).unwrap();
        assert_eq!(sub, vec![0x76]);
    }

    #[test]
    fn several_signatures() {
        let script = [0x01, 0x01, 0x01, 0x02, 0x01, 0x03, 0xae];
        let sigs = [vec![0x01], vec![0x03]];
        let sub = extract_subscript_multi(&script, &sigs).unwrap();
        assert_eq!(sub, vec![0x01, 0x02, 0xae]);
    }

    #[test]
    fn invalid_byte_fails() {
        assert_eq!(
            extract_subscript(&[0x76, 0xba], &[0x01]),
            Err(SubscriptError::InvalidToken { at: 1 })
        );
    }

    #[test]
    fn truncated_push_fails() {
        assert_eq!(
            extract_subscript(&[0x76, 0x05, 0x01], &[0x01]),
            Err(SubscriptError::ScanErrors { count: 1 })
        );
    }
}
