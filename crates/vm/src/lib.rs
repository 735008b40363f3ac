//! Spending-script executor.
//!
//! The executor parses bytecode into a program tree and walks it against a
//! two-stack [`Context`]. Signature checks are delegated to a caller-supplied
//! [`SignatureChecker`]; everything else is computed here.
//!
//! # Usage
//!
//! ```
//! use spendscript_vm::{evaluate, Verdict};
//!
//! // 2 3 ADD 5 EQUAL
//! let script = [0x52, 0x53, 0x93, 0x55, 0x87];
//! assert_eq!(evaluate(&script, None), Verdict::Valid);
//! ```

pub mod context;
pub mod error;
pub mod execute;
pub mod limits;
mod ops_crypto;
mod ops_numeric;
mod ops_stack;
pub mod signature;
pub mod subscript;

pub use context::Context;
pub use error::{ExecError, ScriptError};
pub use execute::Executor;
pub use limits::Limits;
pub use signature::{SignatureChecker, SignatureError};
pub use subscript::{extract_subscript, extract_subscript_multi, SubscriptError};

use spendscript_ast::ParseError;
use tracing::debug;

/// Outcome of evaluating a script or a spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Ran to completion with true on top of the stack.
    Valid,
    /// Ran, but failed or finished without a true result.
    Invalid(ExecError),
    /// The bytes did not form a program and nothing was run.
    Malformed(ParseError),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl From<ScriptError> for Verdict {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::Malformed(e) => Verdict::Malformed(e),
            ScriptError::Exec(e) => Verdict::Invalid(e),
        }
    }
}

impl From<Result<(), ScriptError>> for Verdict {
    fn from(res: Result<(), ScriptError>) -> Self {
        match res {
            Ok(()) => Verdict::Valid,
            Err(e) => e.into(),
        }
    }
}

/// Run one script from an empty stack with default [`Limits`].
pub fn evaluate(script: &[u8], checker: Option<&dyn SignatureChecker>) -> Verdict {
    evaluate_with_limits(script, checker, Limits::default())
}

pub fn evaluate_with_limits(
    script: &[u8],
    checker: Option<&dyn SignatureChecker>,
    limits: Limits,
) -> Verdict {
    let mut exec = Executor::with_limits(checker, limits);
    let verdict = run_all(&mut exec, &[script]);
    debug!(?verdict, "script evaluated");
    verdict
}

/// Decide whether `unlocking` satisfies `locking`.
///
/// The unlocking script runs first; the locking script then runs on the
/// main stack it left behind. The spend is valid when neither fails and the
/// final top of stack is true.
pub fn verify_spend(
    unlocking: &[u8],
    locking: &[u8],
    checker: Option<&dyn SignatureChecker>,
) -> Verdict {
    verify_spend_with_limits(unlocking, locking, checker, Limits::default())
}

pub fn verify_spend_with_limits(
    unlocking: &[u8],
    locking: &[u8],
    checker: Option<&dyn SignatureChecker>,
    limits: Limits,
) -> Verdict {
    let mut exec = Executor::with_limits(checker, limits);
    let verdict = run_all(&mut exec, &[unlocking, locking]);
    debug!(?verdict, "spend verified");
    verdict
}

fn run_all(exec: &mut Executor<'_>, scripts: &[&[u8]]) -> Verdict {
    for script in scripts {
        if let Err(err) = exec.execute(script) {
            return err.into();
        }
    }
    match exec.result() {
        Ok(()) => Verdict::Valid,
        Err(err) => Verdict::Invalid(err),
    }
}
