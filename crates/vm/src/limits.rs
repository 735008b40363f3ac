//! Resource ceilings for script execution.
//!
//! Defaults follow the historical consensus values.

/// Maximum script size in bytes.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum combined depth of the main and alt stacks.
pub const MAX_STACK_DEPTH: usize = 1_000;

/// Maximum size of one stack element in bytes.
pub const MAX_ELEMENT_SIZE: usize = 520;

/// Maximum number of non-push operations passed over, whether run or in an
/// untaken branch. IF, ELSE, ENDIF and CODESEPARATOR each count as one.
pub const MAX_OPERATIONS: usize = 201;

/// Maximum public keys in one CHECKMULTISIG.
pub const MAX_PUB_KEYS_PER_MULTISIG: usize = 20;

/// Configurable ceilings applied by the executor.
///
/// Exceeding any of them ends the evaluation with a dedicated
/// [`ExecError`](crate::ExecError) variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_script_size: usize,
    pub max_stack_depth: usize,
    pub max_element_size: usize,
    pub max_operations: usize,
    pub max_pub_keys_per_multisig: usize,
}

impl Limits {
    /// No ceilings at all. Only finite input bounds the run.
    pub fn unbounded() -> Self {
        Self {
            max_script_size: usize::MAX,
            max_stack_depth: usize::MAX,
            max_element_size: usize::MAX,
            max_operations: usize::MAX,
            max_pub_keys_per_multisig: usize::MAX,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_script_size: MAX_SCRIPT_SIZE,
            max_stack_depth: MAX_STACK_DEPTH,
            max_element_size: MAX_ELEMENT_SIZE,
            max_operations: MAX_OPERATIONS,
            max_pub_keys_per_multisig: MAX_PUB_KEYS_PER_MULTISIG,
        }
    }
}
