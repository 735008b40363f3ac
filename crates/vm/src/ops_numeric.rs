//! Arithmetic, comparison and equality operations.
//!
//! Operands are decoded as arbitrary-precision script integers, so no
//! operation overflows or truncates.

use crate::context::Context;
use crate::error::ExecError;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

impl<'a> Context<'a> {
    fn unary_num(&mut self, f: impl FnOnce(BigInt) -> BigInt) -> Result<(), ExecError> {
        let n = self.pop_number()?;
        self.push_number(&f(n))
    }

    /// Pops `b` then `a` and pushes `f(a, b)`.
    fn binary_num(
        &mut self,
        f: impl FnOnce(BigInt, BigInt) -> BigInt,
    ) -> Result<(), ExecError> {
        let b = self.pop_number()?;
        let a = self.pop_number()?;
        self.push_number(&f(a, b))
    }

    fn compare_num(
        &mut self,
        f: impl FnOnce(&BigInt, &BigInt) -> bool,
    ) -> Result<(), ExecError> {
        let b = self.pop_number()?;
        let a = self.pop_number()?;
        self.push_bool(f(&a, &b))
    }

    pub(crate) fn op_1add(&mut self) -> Result<(), ExecError> {
        self.unary_num(|n| n + 1)
    }

    pub(crate) fn op_1sub(&mut self) -> Result<(), ExecError> {
        self.unary_num(|n| n - 1)
    }

    pub(crate) fn op_negate(&mut self) -> Result<(), ExecError> {
        self.unary_num(|n| -n)
    }

    pub(crate) fn op_abs(&mut self) -> Result<(), ExecError> {
        self.unary_num(|n| n.abs())
    }

    pub(crate) fn op_not(&mut self) -> Result<(), ExecError> {
        self.unary_num(|n| BigInt::from(u8::from(n.is_zero())))
    }

    pub(crate) fn op_0notequal(&mut self) -> Result<(), ExecError> {
        self.unary_num(|n| BigInt::from(u8::from(!n.is_zero())))
    }

    pub(crate) fn op_add(&mut self) -> Result<(), ExecError> {
        self.binary_num(|a, b| a + b)
    }

    pub(crate) fn op_sub(&mut self) -> Result<(), ExecError> {
        self.binary_num(|a, b| a - b)
    }

    pub(crate) fn op_booland(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| !a.is_zero() && !b.is_zero())
    }

    pub(crate) fn op_boolor(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| !a.is_zero() || !b.is_zero())
    }

    pub(crate) fn op_numequal(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| a == b)
    }

    pub(crate) fn op_numnotequal(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| a != b)
    }

    pub(crate) fn op_lessthan(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| a < b)
    }

    pub(crate) fn op_greaterthan(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| a > b)
    }

    pub(crate) fn op_lessthanorequal(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| a <= b)
    }

    pub(crate) fn op_greaterthanorequal(&mut self) -> Result<(), ExecError> {
        self.compare_num(|a, b| a >= b)
    }

    pub(crate) fn op_min(&mut self) -> Result<(), ExecError> {
        self.binary_num(|a, b| a.min(b))
    }

    pub(crate) fn op_max(&mut self) -> Result<(), ExecError> {
        self.binary_num(|a, b| a.max(b))
    }

    /// x min max -> (min <= x < max)
    pub(crate) fn op_within(&mut self) -> Result<(), ExecError> {
        let max = self.pop_number()?;
        let min = self.pop_number()?;
        let x = self.pop_number()?;
        self.push_bool(min <= x && x < max)
    }

    /// Byte-wise equality, no numeric normalisation.
    pub(crate) fn op_equal(&mut self) -> Result<(), ExecError> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push_bool(a == b)
    }
}
