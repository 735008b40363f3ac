//! Boundary to the external signature verifier.
//!
//! The executor never hashes transactions or verifies curve signatures
//! itself. It hands the public key, hash type, signature and subscript to a
//! [`SignatureChecker`] and pushes the outcome as a boolean.

use thiserror::Error;

/// Why a signature did not verify. Treated as "signature invalid", never
/// as a fatal execution error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature does not match")]
    Mismatch,

    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Verifies signatures on behalf of the executor.
pub trait SignatureChecker {
    /// Check one signature.
    ///
    /// `signature` is the payload without its trailing hash-type byte,
    /// which is passed separately as `hash_type`. `subscript` is the program
    /// from the last code separator with the signature push and all code
    /// separators removed.
    fn check_sig(
        &self,
        pub_key: &[u8],
        hash_type: u8,
        signature: &[u8],
        subscript: &[u8],
    ) -> Result<(), SignatureError>;

    /// Check `signatures` against `pub_keys` in order.
    ///
    /// Each signature, still carrying its hash-type byte, must match a key
    /// at or after the key that matched the previous signature. A key is
    /// consumed whether it matches or not, so no key is used twice. Fails
    /// as soon as more signatures remain than keys.
    fn check_multi_sig(&self, pub_keys: &[Vec<u8>], signatures: &[Vec<u8>], subscript: &[u8]) -> bool {
        let mut key_idx = 0;
        for (sig_idx, sig) in signatures.iter().enumerate() {
            let Some((&hash_type, payload)) = sig.split_last() else {
                return false;
            };
            loop {
                if signatures.len() - sig_idx > pub_keys.len() - key_idx {
                    return false;
                }
                let key = &pub_keys[key_idx];
                key_idx += 1;
                if self.check_sig(key, hash_type, payload, subscript).is_ok() {
                    break;
                }
            }
        }
        true
    }
}

impl<F> SignatureChecker for F
where
    F: Fn(&[u8], u8, &[u8], &[u8]) -> Result<(), SignatureError>,
{
    fn check_sig(
        &self,
        pub_key: &[u8],
        hash_type: u8,
        signature: &[u8],
        subscript: &[u8],
    ) -> Result<(), SignatureError> {
        self(pub_key, hash_type, signature, subscript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A signature is valid for a key when its payload equals the key.
    fn echo(pk: &[u8], _: u8, sig: &[u8], _: &[u8]) -> Result<(), SignatureError> {
        if pk == sig {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    fn sig(payload: &[u8]) -> Vec<u8> {
        let mut s = payload.to_vec();
        s.push(0x01);
        s
    }

    #[test]
    fn closure_is_a_checker() {
        assert!(echo.check_sig(b"k", 1, b"k", b"").is_ok());
        assert_eq!(echo.check_sig(b"k", 1, b"x", b""), Err(SignatureError::Mismatch));
    }

    #[test]
    fn multisig_in_order() {
        let keys = vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        assert!(echo.check_multi_sig(&keys, &[sig(b"a"), sig(b"c")], b""));
        assert!(echo.check_multi_sig(&keys, &[sig(b"b")], b""));
        assert!(echo.check_multi_sig(&keys, &[], b""));
    }

    #[test]
    fn multisig_out_of_order_fails() {
        let keys = vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        assert!(!echo.check_multi_sig(&keys, &[sig(b"c"), sig(b"a")], b""));
    }

    #[test]
    fn multisig_key_not_reused() {
        let keys = vec![b"a".to_vec(), b"b".to_vec()];
        assert!(!echo.check_multi_sig(&keys, &[sig(b"a"), sig(b"a")], b""));
    }

    #[test]
    fn multisig_empty_signature_fails() {
        let keys = vec![b"a".to_vec()];
        assert!(!echo.check_multi_sig(&keys, &[Vec::new()], b""));
    }
}
