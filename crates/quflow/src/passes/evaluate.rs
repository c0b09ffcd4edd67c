//! Solution evaluation over a sampled distribution.

use std::sync::OnceLock;

use crate::error::{WorkflowError, WorkflowResult};
use crate::lazy::LazyHandle;
use crate::pass::Pass;
use crate::payload::{Payload, PayloadKind, Solution};
use crate::program::QuadraticProgram;
use crate::property::{PropertySet, PropertyValue, FINAL_OUTPUT_KEY};

/// Where the evaluator finds the objective it scores against.
enum ObjectiveSource {
    /// Handed over directly at construction time.
    Inline(QuadraticProgram),
    /// Resolved lazily from the named workflow's published final output.
    Context { workflow: String },
}

/// Evaluate every sampled bitstring against a quadratic program and keep
/// the minimizing (value, assignment) pair.
///
/// Bitstrings arrive most-significant-bit first from the sampling layer and
/// are reversed so that position 0 of the assignment is variable 0. Zero-mass
/// entries are skipped; ties are broken by the distribution's iteration
/// order, which is its insertion order.
///
/// The objective can be given inline, or resolved once from the shared
/// property set under an upstream workflow's `final_output` entry (and cached
/// for subsequent runs).
pub struct EvaluateSolution {
    source: ObjectiveSource,
    resolved: OnceLock<QuadraticProgram>,
}

impl EvaluateSolution {
    /// Evaluate against a program handed over directly.
    pub fn new(program: QuadraticProgram) -> Self {
        Self {
            source: ObjectiveSource::Inline(program),
            resolved: OnceLock::new(),
        }
    }

    /// Evaluate against the program published by the named upstream
    /// workflow, resolved from the property set on first run.
    pub fn from_context(workflow: impl Into<String>) -> Self {
        Self {
            source: ObjectiveSource::Context {
                workflow: workflow.into(),
            },
            resolved: OnceLock::new(),
        }
    }

    fn objective(&self, properties: &PropertySet) -> WorkflowResult<&QuadraticProgram> {
        match &self.source {
            ObjectiveSource::Inline(program) => Ok(program),
            ObjectiveSource::Context { workflow } => {
                if let Some(program) = self.resolved.get() {
                    return Ok(program);
                }
                let root = properties.get(workflow);
                if root.is_null() {
                    return Err(WorkflowError::MissingProgram {
                        workflow: workflow.clone(),
                    });
                }
                let mut handle = LazyHandle::new(root.clone(), [FINAL_OUTPUT_KEY]);
                let program = match handle.force()? {
                    PropertyValue::Payload(Payload::Program(program)) => program.clone(),
                    _ => {
                        return Err(WorkflowError::MissingProgram {
                            workflow: workflow.clone(),
                        });
                    }
                };
                Ok(self.resolved.get_or_init(|| program))
            }
        }
    }
}

/// Decode an MSB-first bitstring so index 0 of the result is variable 0.
fn decode_bitstring(bitstring: &str) -> WorkflowResult<Vec<u8>> {
    bitstring
        .chars()
        .rev()
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            _ => Err(WorkflowError::InvalidBitstring {
                bitstring: bitstring.to_string(),
            }),
        })
        .collect()
}

impl Pass for EvaluateSolution {
    fn name(&self) -> &str {
        "EvaluateSolution"
    }

    fn input_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Distribution]
    }

    fn output_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Solution]
    }

    fn run(&self, payload: Payload, properties: &mut PropertySet) -> WorkflowResult<Payload> {
        let distribution = match payload {
            Payload::Distribution(distribution) => distribution,
            other => {
                return Err(WorkflowError::unexpected_input(
                    self.name(),
                    other.kind(),
                    self.input_kinds(),
                ));
            }
        };

        let program = self.objective(properties)?;

        let mut best_value = f64::INFINITY;
        let mut best_assignment: Option<Vec<u8>> = None;
        for (bitstring, probability) in distribution.iter() {
            if probability == 0.0 {
                continue;
            }
            let assignment = decode_bitstring(bitstring)?;
            let value = program.evaluate(&assignment);
            if value < best_value {
                best_value = value;
                best_assignment = Some(assignment);
            }
        }

        let Some(assignment) = best_assignment else {
            return Err(WorkflowError::EmptyDistribution {
                pass: self.name().to_string(),
            });
        };

        Ok(Payload::Solution(Solution {
            value: best_value,
            assignment,
        }))
    }
}
