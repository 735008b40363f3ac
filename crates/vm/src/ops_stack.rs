//! Stack manipulation operations.

use crate::context::Context;
use crate::error::ExecError;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use spendscript_common::scriptint;

impl<'a> Context<'a> {
    /// Push copies of `count` elements, the deepest at `depth`, keeping
    /// their order.
    fn copy_to_top(&mut self, depth: usize, count: usize) -> Result<(), ExecError> {
        for _ in 0..count {
            let value = self.peek(depth)?.to_vec();
            self.push(value)?;
        }
        Ok(())
    }

    /// Move `count` elements, the deepest at `depth`, to the top.
    fn move_to_top(&mut self, depth: usize, count: usize) -> Result<(), ExecError> {
        for _ in 0..count {
            let value = self.remove(depth)?;
            self.push(value)?;
        }
        Ok(())
    }

    /// Pop a PICK/ROLL index and check that it addresses an element below it.
    fn pop_index(&mut self) -> Result<usize, ExecError> {
        let n: BigInt = self.pop_number()?;
        match n.to_usize() {
            Some(idx) if idx < self.stack.len() => Ok(idx),
            _ => Err(ExecError::InvalidStackIndex {
                at: self.at,
                index: n,
            }),
        }
    }

    pub(crate) fn op_to_alt_stack(&mut self) -> Result<(), ExecError> {
        let value = self.pop()?;
        self.push_alt(value)
    }

    pub(crate) fn op_from_alt_stack(&mut self) -> Result<(), ExecError> {
        let value = self.pop_alt()?;
        self.push(value)
    }

    pub(crate) fn op_2drop(&mut self) -> Result<(), ExecError> {
        self.pop_n(2).map(drop)
    }

    pub(crate) fn op_2dup(&mut self) -> Result<(), ExecError> {
        self.copy_to_top(1, 2)
    }

    pub(crate) fn op_3dup(&mut self) -> Result<(), ExecError> {
        self.copy_to_top(2, 3)
    }

    pub(crate) fn op_2over(&mut self) -> Result<(), ExecError> {
        self.copy_to_top(3, 2)
    }

    pub(crate) fn op_2rot(&mut self) -> Result<(), ExecError> {
        self.move_to_top(5, 2)
    }

    pub(crate) fn op_2swap(&mut self) -> Result<(), ExecError> {
        self.move_to_top(3, 2)
    }

    pub(crate) fn op_ifdup(&mut self) -> Result<(), ExecError> {
        let top = self.peek(0)?;
        if scriptint::as_bool(top) {
            let value = top.to_vec();
            self.push(value)?;
        }
        Ok(())
    }

    pub(crate) fn op_depth(&mut self) -> Result<(), ExecError> {
        let depth = BigInt::from(self.stack.len());
        self.push_number(&depth)
    }

    pub(crate) fn op_drop(&mut self) -> Result<(), ExecError> {
        self.pop().map(drop)
    }

    pub(crate) fn op_dup(&mut self) -> Result<(), ExecError> {
        self.copy_to_top(0, 1)
    }

    pub(crate) fn op_nip(&mut self) -> Result<(), ExecError> {
        self.remove(1).map(drop)
    }

    pub(crate) fn op_over(&mut self) -> Result<(), ExecError> {
        self.copy_to_top(1, 1)
    }

    pub(crate) fn op_pick(&mut self) -> Result<(), ExecError> {
        let idx = self.pop_index()?;
        self.copy_to_top(idx, 1)
    }

    pub(crate) fn op_roll(&mut self) -> Result<(), ExecError> {
        let idx = self.pop_index()?;
        self.move_to_top(idx, 1)
    }

    pub(crate) fn op_rot(&mut self) -> Result<(), ExecError> {
        self.move_to_top(2, 1)
    }

    pub(crate) fn op_swap(&mut self) -> Result<(), ExecError> {
        self.move_to_top(1, 1)
    }

    /// x1 x2 -> x2 x1 x2
    pub(crate) fn op_tuck(&mut self) -> Result<(), ExecError> {
        self.op_swap()?;
        self.op_over()
    }
}
