//! Error types for workflow composition and execution.

use thiserror::Error;

use crate::payload::PayloadKind;

/// Errors that can occur while composing or running a workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// Workflow was built with no blocks.
    #[error("Workflow '{workflow}' has no blocks")]
    EmptyWorkflow { workflow: String },

    /// Two nested workflows under one parent share a name.
    #[error("Duplicate stage name '{stage}' in workflow '{workflow}'")]
    DuplicateStage { workflow: String, stage: String },

    /// Adjacent blocks have disjoint kind sets.
    #[error(
        "Block '{successor}' accepts {accepted:?}, not compatible with \
         {produced:?} produced by '{predecessor}'"
    )]
    IncompatibleBlocks {
        predecessor: String,
        successor: String,
        produced: Vec<PayloadKind>,
        accepted: Vec<PayloadKind>,
    },

    /// Under strict validation, a predecessor declares output kinds the
    /// successor does not accept.
    #[error(
        "Outputs {unconsumed:?} of '{predecessor}' are not accepted by \
         '{successor}' (strict validation)"
    )]
    UnconsumedOutputs {
        predecessor: String,
        successor: String,
        unconsumed: Vec<PayloadKind>,
    },

    /// A block returned a payload kind outside its declared output kinds.
    #[error("Block '{block}' returned {found:?}, declared outputs are {declared:?}")]
    ContractViolation {
        block: String,
        found: PayloadKind,
        declared: Vec<PayloadKind>,
    },

    /// A pass was handed a payload kind it does not accept.
    #[error("Pass '{pass}' cannot consume {found:?} (accepts {accepted:?})")]
    UnexpectedInput {
        pass: String,
        found: PayloadKind,
        accepted: Vec<PayloadKind>,
    },

    /// A lazy handle's key path could not be resolved against its root.
    #[error("Lookup failed: key '{key}' not found")]
    LookupFailed { key: String },

    /// An upstream workflow did not publish a quadratic program as its
    /// final output.
    #[error("Workflow '{workflow}' did not publish a quadratic program as its final output")]
    MissingProgram { workflow: String },

    /// The sampled distribution carried no nonzero-mass bitstrings.
    #[error("Pass '{pass}' received a distribution with no nonzero entries")]
    EmptyDistribution { pass: String },

    /// A sampled bitstring contained characters other than '0' and '1'.
    #[error("Invalid bitstring '{bitstring}'")]
    InvalidBitstring { bitstring: String },

    /// A variable index is outside the program's variable range.
    #[error("Variable index {index} out of range for program with {num_variables} variables")]
    VariableOutOfRange { index: usize, num_variables: usize },
}

impl WorkflowError {
    /// Build an [`WorkflowError::UnexpectedInput`] from a pass's declared contract.
    pub fn unexpected_input(pass: &str, found: PayloadKind, accepted: &[PayloadKind]) -> Self {
        Self::UnexpectedInput {
            pass: pass.to_string(),
            found,
            accepted: accepted.to_vec(),
        }
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
