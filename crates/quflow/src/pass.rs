//! Pass trait — the contract every transformation unit implements.

use crate::error::WorkflowResult;
use crate::payload::{Payload, PayloadKind};
use crate::property::PropertySet;

/// A transformation unit in a workflow.
///
/// A pass declares the payload kinds it accepts and produces; the workflow
/// checks adjacent declarations at construction time and verifies at run
/// time that the returned payload's kind is among the declared outputs.
///
/// The active [`PropertySet`] is passed explicitly into [`run`](Self::run).
/// Every pass invoked during one workflow run — including passes inside
/// nested workflows — receives the same set.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Payload kinds this pass accepts. Must be non-empty.
    fn input_kinds(&self) -> &[PayloadKind];

    /// Payload kinds this pass guarantees to produce.
    fn output_kinds(&self) -> &[PayloadKind];

    /// Run the pass, consuming the current payload and producing the next.
    fn run(&self, payload: Payload, properties: &mut PropertySet) -> WorkflowResult<Payload>;

    /// Map a downstream assignment back through this pass's forward
    /// transformation, into the variable space the pass consumed.
    ///
    /// Passes that do not change the variable space keep the default
    /// identity.
    fn interpret(&self, assignment: Vec<u8>) -> WorkflowResult<Vec<u8>> {
        Ok(assignment)
    }
}
