//! Preset workflow assemblies for the QUBO pipeline.

use std::sync::Arc;

use crate::error::WorkflowResult;
use crate::passes::{EvaluateSolution, FixVariables, MaximizeToMinimize, UnrollVariables};
use crate::program::QuadraticProgram;
use crate::workflow::Workflow;

/// The forward conversion chain: bring a program into QUBO form and publish
/// the result under `"quadratic-converter"` for downstream consumers.
pub fn quadratic_converter() -> WorkflowResult<Workflow> {
    Workflow::builder("quadratic-converter")
        .add_pass(MaximizeToMinimize)
        .store_final_output(true)
        .build()
}

/// Conversion chain that additionally pins the given variables.
pub fn quadratic_converter_with_fixed(
    fixed: impl IntoIterator<Item = (usize, u8)>,
) -> WorkflowResult<Workflow> {
    Workflow::builder("quadratic-converter")
        .add_pass(MaximizeToMinimize)
        .add_pass(FixVariables::new(fixed))
        .store_final_output(true)
        .build()
}

/// Postprocess a sampled distribution against an explicitly supplied QUBO:
/// evaluate the best solution, then unroll it through the converter back to
/// original variable order.
pub fn quadratic_postprocess(
    qubo: QuadraticProgram,
    converter: Arc<Workflow>,
) -> WorkflowResult<Workflow> {
    Workflow::builder("quadratic-postprocess")
        .add_pass(EvaluateSolution::new(qubo))
        .add_pass(UnrollVariables::new(converter))
        .build()
}

/// Postprocess variant that resolves the QUBO lazily from the converter's
/// published final output instead of being handed it directly.
pub fn quadratic_postprocess_from_context(converter: Arc<Workflow>) -> WorkflowResult<Workflow> {
    Workflow::builder("quadratic-postprocess")
        .add_pass(EvaluateSolution::from_context(converter.name()))
        .add_pass(UnrollVariables::new(converter))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadKind;

    #[test]
    fn test_preset_chains_validate() {
        let converter = Arc::new(quadratic_converter().unwrap());
        assert_eq!(converter.input_kinds(), &[PayloadKind::Program]);
        assert_eq!(converter.output_kinds(), &[PayloadKind::Program]);

        let postprocess = quadratic_postprocess_from_context(converter).unwrap();
        assert_eq!(postprocess.input_kinds(), &[PayloadKind::Distribution]);
        assert_eq!(postprocess.output_kinds(), &[PayloadKind::Bits]);
    }
}
