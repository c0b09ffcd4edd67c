//! Unrolling QUBO-space assignments back to original variables.

use std::sync::Arc;

use crate::error::{WorkflowError, WorkflowResult};
use crate::pass::Pass;
use crate::payload::{Payload, PayloadKind};
use crate::property::PropertySet;
use crate::workflow::Workflow;

/// Map an evaluated QUBO-space assignment back to the original variable
/// space by replaying the upstream converter workflow in reverse.
///
/// Each converter pass's [`Pass::interpret`] undoes that pass's forward
/// transformation; applying them last-to-first expresses the assignment in
/// the pre-conversion variable order. With no upstream converter the
/// assignment passes through unchanged.
pub struct UnrollVariables {
    converter: Option<Arc<Workflow>>,
}

impl UnrollVariables {
    /// Unroll through the given converter workflow.
    pub fn new(converter: Arc<Workflow>) -> Self {
        Self {
            converter: Some(converter),
        }
    }

    /// Unroll with no upstream conversion: the identity on the assignment.
    pub fn identity() -> Self {
        Self { converter: None }
    }
}

impl Pass for UnrollVariables {
    fn name(&self) -> &str {
        "UnrollVariables"
    }

    fn input_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Solution]
    }

    fn output_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Bits]
    }

    fn run(&self, payload: Payload, _properties: &mut PropertySet) -> WorkflowResult<Payload> {
        let solution = match payload {
            Payload::Solution(solution) => solution,
            other => {
                return Err(WorkflowError::unexpected_input(
                    self.name(),
                    other.kind(),
                    self.input_kinds(),
                ));
            }
        };

        let bits = match &self.converter {
            Some(converter) => converter.interpret(solution.assignment)?,
            None => solution.assignment,
        };
        Ok(Payload::Bits(bits))
    }
}
