//! Tree-walking executor and opcode dispatch.

use crate::context::Context;
use crate::error::{ExecError, ScriptError};
use crate::limits::Limits;
use crate::ops_crypto::HashKind;
use crate::signature::SignatureChecker;
use spendscript_ast::{parse, NodeId, NodeKind, Program};
use spendscript_common::{scriptint, Opcode, Scanner};
use tracing::{debug, trace};

/// Runs scripts against one [`Context`].
///
/// The main stack survives between calls to [`Executor::execute`], which is
/// how an unlocking script hands its results to a locking script. The alt
/// stack, code-separator position and operation count start fresh for each
/// script.
pub struct Executor<'a> {
    ctx: Context<'a>,
}

impl<'a> Executor<'a> {
    pub fn new(checker: Option<&'a dyn SignatureChecker>) -> Self {
        Self::with_limits(checker, Limits::default())
    }

    pub fn with_limits(checker: Option<&'a dyn SignatureChecker>, limits: Limits) -> Self {
        Self {
            ctx: Context::new(checker, limits),
        }
    }

    pub fn context(&self) -> &Context<'a> {
        &self.ctx
    }

    /// Main stack, bottom first.
    pub fn stack(&self) -> &[Vec<u8>] {
        self.ctx.stack()
    }

    pub fn alt_stack(&self) -> &[Vec<u8>] {
        self.ctx.alt_stack()
    }

    /// Forget everything left over from earlier scripts.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// Parse and run one script on the current main stack.
    ///
    /// # Errors
    ///
    /// [`ScriptError::Malformed`] when the bytes do not form a program,
    /// [`ScriptError::Exec`] when an operation fails.
    pub fn execute(&mut self, script: &[u8]) -> Result<(), ScriptError> {
        let limit = self.ctx.limits.max_script_size;
        if script.len() > limit {
            return Err(ExecError::ScriptTooLarge {
                size: script.len(),
                limit,
            }
            .into());
        }

        let program = parse(&mut Scanner::new(script))?;
        self.ctx.begin_script(script);
        debug!(len = script.len(), nodes = program.len(), "executing script");
        self.walk(&program, program.root())?;
        Ok(())
    }

    /// Whether the finished run left a true value on top of the stack.
    pub fn result(&self) -> Result<(), ExecError> {
        match self.ctx.peek(0) {
            Err(_) => Err(ExecError::EmptyStack),
            Ok(top) if scriptint::as_bool(top) => Ok(()),
            Ok(_) => Err(ExecError::ResultFalse),
        }
    }

    /// Run the subtree `id` in source order.
    ///
    /// Untaken branches are not run, but their operations and the ELSE and
    /// ENDIF markers still count towards the operation limit.
    fn walk(&mut self, program: &Program, id: NodeId) -> Result<(), ExecError> {
        let mut pending = vec![Walk::Run(id)];
        while let Some(work) = pending.pop() {
            let id = match work {
                Walk::Run(id) => id,
                Walk::Skip(id) => {
                    self.ctx.at = program.node(id).pos;
                    self.ctx.count_ops(program.operation_count(id))?;
                    continue;
                }
                Walk::Marker(pos) => {
                    self.ctx.at = pos;
                    self.ctx.count_ops(1)?;
                    continue;
                }
            };

            let node = program.node(id);
            self.ctx.at = node.pos;
            match &node.kind {
                NodeKind::Block(children) => {
                    pending.extend(children.iter().rev().map(|&c| Walk::Run(c)));
                }
                NodeKind::CodeSeparator(children) => {
                    self.ctx.count_ops(1)?;
                    self.ctx.code_separator_pos = node.pos;
                    pending.extend(children.iter().rev().map(|&c| Walk::Run(c)));
                }
                NodeKind::Data(bytes) => self.ctx.push(bytes.clone())?,
                NodeKind::Number(n) => self.ctx.push_number(n)?,
                NodeKind::Operation(op) => {
                    self.ctx.count_ops(1)?;
                    trace!(at = node.pos, op = %op, depth = self.ctx.stack.len(), "op");
                    self.ctx.step(*op)?;
                }
                NodeKind::If(stmt) => {
                    self.ctx.count_ops(1)?;
                    let cond = self.ctx.pop_bool()? != stmt.negated;
                    let branch = |taken: bool, id: NodeId| {
                        if taken {
                            Walk::Run(id)
                        } else {
                            Walk::Skip(id)
                        }
                    };
                    pending.push(Walk::Marker(stmt.endif_pos));
                    if let (Some(else_pos), Some(else_block)) = (stmt.else_pos, stmt.else_block) {
                        pending.push(branch(!cond, else_block));
                        pending.push(Walk::Marker(else_pos));
                    }
                    pending.push(branch(cond, stmt.then_block));
                }
            }
        }
        Ok(())
    }
}

/// Pending work for [`Executor::walk`].
enum Walk {
    Run(NodeId),
    /// An untaken branch, charged for its operations only.
    Skip(NodeId),
    /// An ELSE or ENDIF at the given offset.
    Marker(usize),
}

impl<'a> Context<'a> {
    /// Execute a single operation.
    pub(crate) fn step(&mut self, op: Opcode) -> Result<(), ExecError> {
        let at = self.at;
        match op {
            // Flow control
            op if op.is_nop() => Ok(()),
            Opcode::Verify => self.verify(),
            Opcode::Return => Err(ExecError::OpReturn { at }),
            op if op.is_reserved() => Err(ExecError::ReservedOpcode { at, op }),
            op if op.is_disabled() => Err(ExecError::DisabledOpcode { at, op }),

            // Stack
            Opcode::ToAltStack => self.op_to_alt_stack(),
            Opcode::FromAltStack => self.op_from_alt_stack(),
            Opcode::TwoDrop => self.op_2drop(),
            Opcode::TwoDup => self.op_2dup(),
            Opcode::ThreeDup => self.op_3dup(),
            Opcode::TwoOver => self.op_2over(),
            Opcode::TwoRot => self.op_2rot(),
            Opcode::TwoSwap => self.op_2swap(),
            Opcode::IfDup => self.op_ifdup(),
            Opcode::Depth => self.op_depth(),
            Opcode::Drop => self.op_drop(),
            Opcode::Dup => self.op_dup(),
            Opcode::Nip => self.op_nip(),
            Opcode::Over => self.op_over(),
            Opcode::Pick => self.op_pick(),
            Opcode::Roll => self.op_roll(),
            Opcode::Rot => self.op_rot(),
            Opcode::Swap => self.op_swap(),
            Opcode::Tuck => self.op_tuck(),

            // Equality
            Opcode::Equal => self.op_equal(),
            Opcode::EqualVerify => {
                self.op_equal()?;
                self.verify()
            }

            // Arithmetic
            Opcode::OneAdd => self.op_1add(),
            Opcode::OneSub => self.op_1sub(),
            Opcode::Negate => self.op_negate(),
            Opcode::Abs => self.op_abs(),
            Opcode::Not => self.op_not(),
            Opcode::ZeroNotEqual => self.op_0notequal(),
            Opcode::Add => self.op_add(),
            Opcode::Sub => self.op_sub(),
            Opcode::BoolAnd => self.op_booland(),
            Opcode::BoolOr => self.op_boolor(),
            Opcode::NumEqual => self.op_numequal(),
            Opcode::NumEqualVerify => {
                self.op_numequal()?;
                self.verify()
            }
            Opcode::NumNotEqual => self.op_numnotequal(),
            Opcode::LessThan => self.op_lessthan(),
            Opcode::GreaterThan => self.op_greaterthan(),
            Opcode::LessThanOrEqual => self.op_lessthanorequal(),
            Opcode::GreaterThanOrEqual => self.op_greaterthanorequal(),
            Opcode::Min => self.op_min(),
            Opcode::Max => self.op_max(),
            Opcode::Within => self.op_within(),

            // Crypto
            Opcode::Ripemd160 => self.op_hash(HashKind::Ripemd160),
            Opcode::Sha1 => self.op_hash(HashKind::Sha1),
            Opcode::Sha256 => self.op_hash(HashKind::Sha256),
            Opcode::Hash160 => self.op_hash(HashKind::Hash160),
            Opcode::Hash256 => self.op_hash(HashKind::Hash256),
            Opcode::CheckSig => self.op_checksig(),
            Opcode::CheckSigVerify => {
                self.op_checksig()?;
                self.verify()
            }
            Opcode::CheckMultiSig => self.op_checkmultisig(),
            Opcode::CheckMultiSigVerify => {
                self.op_checkmultisig()?;
                self.verify()
            }

            // Push prefixes, structural markers and pseudo opcodes never
            // reach here from a parsed program.
            _ => Err(ExecError::UnexpectedOpcode { at, op }),
        }
    }
}
