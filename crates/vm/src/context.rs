//! Execution state: main stack, alt stack, script bytes and counters.

use crate::error::ExecError;
use crate::limits::Limits;
use crate::signature::SignatureChecker;
use num_bigint::BigInt;
use spendscript_common::scriptint;

/// The complete mutable state of one evaluation.
///
/// Stack values are plain byte strings; their numeric and boolean views are
/// computed on demand. Every accessor returns a `Result` so that running
/// out of elements ends the evaluation instead of panicking.
pub struct Context<'a> {
    pub(crate) stack: Vec<Vec<u8>>,
    pub(crate) alt_stack: Vec<Vec<u8>>,
    /// Bytes of the script being executed.
    pub(crate) script: Vec<u8>,
    /// Offset of the most recently executed code separator.
    pub(crate) code_separator_pos: usize,
    /// Offset of the operation being executed, reported in errors.
    pub(crate) at: usize,
    pub(crate) op_count: usize,
    pub(crate) limits: Limits,
    pub(crate) checker: Option<&'a dyn SignatureChecker>,
}

impl<'a> Context<'a> {
    pub fn new(checker: Option<&'a dyn SignatureChecker>, limits: Limits) -> Self {
        Self {
            stack: Vec::new(),
            alt_stack: Vec::new(),
            script: Vec::new(),
            code_separator_pos: 0,
            at: 0,
            op_count: 0,
            limits,
            checker,
        }
    }

    /// Clear all evaluation state, keeping the checker and limits.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.begin_script(&[]);
    }

    /// Prepare to run `script` on the current main stack.
    pub(crate) fn begin_script(&mut self, script: &[u8]) {
        self.alt_stack.clear();
        self.script = script.to_vec();
        self.code_separator_pos = 0;
        self.at = 0;
        self.op_count = 0;
    }

    /// Main stack, bottom first.
    pub fn stack(&self) -> &[Vec<u8>] {
        &self.stack
    }

    pub fn alt_stack(&self) -> &[Vec<u8>] {
        &self.alt_stack
    }

    pub fn code_separator_pos(&self) -> usize {
        self.code_separator_pos
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub(crate) fn underflow(&self) -> ExecError {
        ExecError::StackUnderflow { at: self.at }
    }

    /// Count one executed operation (or `n` for multisig keys) against the
    /// operation limit.
    pub(crate) fn count_ops(&mut self, n: usize) -> Result<(), ExecError> {
        self.op_count = self.op_count.saturating_add(n);
        if self.op_count > self.limits.max_operations {
            return Err(ExecError::TooManyOperations {
                at: self.at,
                limit: self.limits.max_operations,
            });
        }
        Ok(())
    }

    fn check_depth(&self) -> Result<(), ExecError> {
        if self.stack.len() + self.alt_stack.len() >= self.limits.max_stack_depth {
            return Err(ExecError::StackOverflow {
                at: self.at,
                limit: self.limits.max_stack_depth,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, value: Vec<u8>) -> Result<(), ExecError> {
        if value.len() > self.limits.max_element_size {
            return Err(ExecError::ElementTooLarge {
                at: self.at,
                size: value.len(),
                limit: self.limits.max_element_size,
            });
        }
        self.check_depth()?;
        self.stack.push(value);
        Ok(())
    }

    pub fn push_number(&mut self, n: &BigInt) -> Result<(), ExecError> {
        self.push(scriptint::encode(n))
    }

    pub fn push_bool(&mut self, value: bool) -> Result<(), ExecError> {
        self.push(scriptint::from_bool(value))
    }

    pub fn pop(&mut self) -> Result<Vec<u8>, ExecError> {
        self.stack.pop().ok_or_else(|| self.underflow())
    }

    pub fn pop_number(&mut self) -> Result<BigInt, ExecError> {
        Ok(scriptint::decode(&self.pop()?))
    }

    pub fn pop_bool(&mut self) -> Result<bool, ExecError> {
        Ok(scriptint::as_bool(&self.pop()?))
    }

    /// The element `depth` places below the top (0 is the top).
    pub fn peek(&self, depth: usize) -> Result<&[u8], ExecError> {
        self.stack
            .len()
            .checked_sub(depth + 1)
            .map(|idx| self.stack[idx].as_slice())
            .ok_or_else(|| self.underflow())
    }

    /// Remove and return the element `depth` places below the top.
    pub fn remove(&mut self, depth: usize) -> Result<Vec<u8>, ExecError> {
        let idx = self
            .stack
            .len()
            .checked_sub(depth + 1)
            .ok_or_else(|| self.underflow())?;
        Ok(self.stack.remove(idx))
    }

    /// Pop `n` elements, returned in pop order (top first).
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Vec<u8>>, ExecError> {
        if self.stack.len() < n {
            return Err(self.underflow());
        }
        Ok((0..n).filter_map(|_| self.stack.pop()).collect())
    }

    pub fn push_alt(&mut self, value: Vec<u8>) -> Result<(), ExecError> {
        self.check_depth()?;
        self.alt_stack.push(value);
        Ok(())
    }

    pub fn pop_alt(&mut self) -> Result<Vec<u8>, ExecError> {
        self.alt_stack
            .pop()
            .ok_or(ExecError::AltStackUnderflow { at: self.at })
    }

    /// Fail with [`ExecError::VerifyFailed`] unless the popped top is true.
    pub fn verify(&mut self) -> Result<(), ExecError> {
        if self.pop_bool()? {
            Ok(())
        } else {
            Err(ExecError::VerifyFailed { at: self.at })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context<'static> {
        Context::new(None, Limits::default())
    }

    #[test]
    fn push_pop() {
        let mut c = ctx();
        c.push(vec![1, 2]).unwrap();
        c.push_bool(true).unwrap();
        assert!(c.pop_bool().unwrap());
        assert_eq!(c.pop().unwrap(), vec![1, 2]);
        assert_eq!(c.pop(), Err(ExecError::StackUnderflow { at: 0 }));
    }

    #[test]
    fn numbers_roundtrip_through_stack() {
        let mut c = ctx();
        c.push_number(&BigInt::from(-300)).unwrap();
        assert_eq!(c.pop_number().unwrap(), BigInt::from(-300));
    }

    #[test]
    fn peek_and_remove_by_depth() {
        let mut c = ctx();
        for v in [1u8, 2, 3] {
            c.push(vec![v]).unwrap();
        }
        assert_eq!(c.peek(0).unwrap(), &[3]);
        assert_eq!(c.peek(2).unwrap(), &[1]);
        assert!(c.peek(3).is_err());
        assert_eq!(c.remove(1).unwrap(), vec![2]);
        assert_eq!(c.stack(), &[vec![1], vec![3]]);
    }

    #[test]
    fn pop_n_is_all_or_nothing() {
        let mut c = ctx();
        c.push(vec![1]).unwrap();
        c.push(vec![2]).unwrap();
        assert!(c.pop_n(3).is_err());
        assert_eq!(c.stack().len(), 2);
        assert_eq!(c.pop_n(2).unwrap(), vec![vec![2], vec![1]]);
    }

    #[test]
    fn alt_stack_underflow() {
        let mut c = ctx();
        c.at = 7;
        assert_eq!(c.pop_alt(), Err(ExecError::AltStackUnderflow { at: 7 }));
    }

    #[test]
    fn depth_counts_both_stacks() {
        let mut c = Context::new(
            None,
            Limits {
                max_stack_depth: 2,
                ..Limits::default()
            },
        );
        c.push(vec![]).unwrap();
        c.push_alt(vec![]).unwrap();
        assert_eq!(
            c.push(vec![]),
            Err(ExecError::StackOverflow { at: 0, limit: 2 })
        );
    }

    #[test]
    fn element_size_limit() {
        let mut c = ctx();
        assert!(c.push(vec![0; 520]).is_ok());
        assert_eq!(
            c.push(vec![0; 521]),
            Err(ExecError::ElementTooLarge {
                at: 0,
                size: 521,
                limit: 520
            })
        );
    }

    #[test]
    fn verify_pops_and_checks() {
        let mut c = ctx();
        c.push(vec![0x80]).unwrap();
        assert_eq!(c.verify(), Err(ExecError::VerifyFailed { at: 0 }));
        assert!(c.stack().is_empty());
        c.push(vec![1]).unwrap();
        assert!(c.verify().is_ok());
    }
}
