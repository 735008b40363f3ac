//! Hash and signature operations.

use crate::context::Context;
use crate::error::ExecError;
use crate::signature::SignatureChecker;
use crate::subscript::{extract_subscript, extract_subscript_multi};
use num_traits::ToPrimitive;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HashKind {
    Ripemd160,
    Sha1,
    Sha256,
    /// RIPEMD-160 of SHA-256.
    Hash160,
    /// Double SHA-256.
    Hash256,
}

impl HashKind {
    pub(crate) fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashKind::Ripemd160 => Ripemd160::digest(data).to_vec(),
            HashKind::Sha1 => Sha1::digest(data).to_vec(),
            HashKind::Sha256 => Sha256::digest(data).to_vec(),
            HashKind::Hash160 => Ripemd160::digest(Sha256::digest(data)).to_vec(),
            HashKind::Hash256 => Sha256::digest(Sha256::digest(data)).to_vec(),
        }
    }
}

impl<'a> Context<'a> {
    pub(crate) fn op_hash(&mut self, kind: HashKind) -> Result<(), ExecError> {
        let data = self.pop()?;
        self.push(kind.digest(&data))
    }

    fn require_checker(&self) -> Result<&'a dyn SignatureChecker, ExecError> {
        self.checker
            .ok_or(ExecError::NoSignatureChecker { at: self.at })
    }

    /// Program bytes from the last executed code separator on.
    fn subscript_source(&self) -> &[u8] {
        self.script.get(self.code_separator_pos..).unwrap_or_default()
    }

    /// `<sig> <pubkey>` -> bool
    pub(crate) fn op_checksig(&mut self) -> Result<(), ExecError> {
        let checker = self.require_checker()?;
        let pub_key = self.pop()?;
        let sig = self.pop()?;

        let Some((&hash_type, payload)) = sig.split_last() else {
            debug!(at = self.at, "empty signature");
            return self.push_bool(false);
        };

        let subscript = extract_subscript(self.subscript_source(), &sig).map_err(|source| {
            ExecError::Subscript {
                at: self.at,
                source,
            }
        })?;

        let valid = match checker.check_sig(&pub_key, hash_type, payload, &subscript) {
            Ok(()) => true,
            Err(err) => {
                debug!(at = self.at, %err, "signature check failed");
                false
            }
        };
        self.push_bool(valid)
    }

    /// `<dummy> <sig>... <m> <pubkey>... <n>` -> bool
    pub(crate) fn op_checkmultisig(&mut self) -> Result<(), ExecError> {
        let checker = self.require_checker()?;

        let key_count = self.pop_number()?;
        let n = match key_count.to_usize() {
            Some(n) if n <= self.limits.max_pub_keys_per_multisig => n,
            _ => {
                return Err(ExecError::InvalidPubKeyCount {
                    at: self.at,
                    count: key_count,
                })
            }
        };
        self.count_ops(n)?;
        let mut pub_keys = self.pop_n(n)?;
        pub_keys.reverse();

        let sig_count = self.pop_number()?;
        let m = match sig_count.to_usize() {
            Some(m) if m <= n => m,
            _ => {
                return Err(ExecError::InvalidSignatureCount {
                    at: self.at,
                    count: sig_count,
                })
            }
        };
        let mut sigs = self.pop_n(m)?;
        sigs.reverse();

        // Consumed by the historical off-by-one; its value is ignored.
        self.pop()?;

        let committed: Vec<&[u8]> = sigs
            .iter()
            .filter(|s| !s.is_empty())
            .map(Vec::as_slice)
            .collect();
        let subscript =
            extract_subscript_multi(self.subscript_source(), &committed).map_err(|source| {
                ExecError::Subscript {
                    at: self.at,
                    source,
                }
            })?;

        let valid = checker.check_multi_sig(&pub_keys, &sigs, &subscript);
        if !valid {
            debug!(at = self.at, keys = n, sigs = m, "multisig check failed");
        }
        self.push_bool(valid)
    }
}
