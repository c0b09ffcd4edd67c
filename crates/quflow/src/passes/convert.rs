//! Forward converter passes bringing a quadratic program into QUBO form.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::{WorkflowError, WorkflowResult};
use crate::pass::Pass;
use crate::payload::{Payload, PayloadKind};
use crate::program::{ObjectiveSense, QuadraticProgram};
use crate::property::PropertySet;

/// Turn a maximization program into a minimization one by negating the
/// objective. Programs already minimizing pass through unchanged.
///
/// The variable space is untouched, so `interpret` keeps the default
/// identity.
pub struct MaximizeToMinimize;

impl Pass for MaximizeToMinimize {
    fn name(&self) -> &str {
        "MaximizeToMinimize"
    }

    fn input_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Program]
    }

    fn output_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Program]
    }

    fn run(&self, payload: Payload, _properties: &mut PropertySet) -> WorkflowResult<Payload> {
        let mut program = match payload {
            Payload::Program(program) => program,
            other => {
                return Err(WorkflowError::unexpected_input(
                    self.name(),
                    other.kind(),
                    self.input_kinds(),
                ));
            }
        };

        if program.sense == ObjectiveSense::Maximize {
            program.constant = -program.constant;
            for weight in program.linear.values_mut() {
                *weight = -*weight;
            }
            for weight in program.quadratic.values_mut() {
                *weight = -*weight;
            }
            program.sense = ObjectiveSense::Minimize;
        }

        Ok(Payload::Program(program))
    }
}

/// Pin a set of variables to fixed 0/1 values, folding their contributions
/// into the constant and linear terms and compacting the remaining variable
/// indices.
///
/// `interpret` re-inserts the pinned values at their original positions,
/// expanding a reduced-space assignment back to the full variable count.
pub struct FixVariables {
    /// Pinned values by original variable index.
    fixed: BTreeMap<usize, u8>,
}

impl FixVariables {
    /// Pin the given (index, value) pairs; values are 0 or 1.
    pub fn new(fixed: impl IntoIterator<Item = (usize, u8)>) -> Self {
        Self {
            fixed: fixed.into_iter().collect(),
        }
    }
}

impl Pass for FixVariables {
    fn name(&self) -> &str {
        "FixVariables"
    }

    fn input_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Program]
    }

    fn output_kinds(&self) -> &[PayloadKind] {
        &[PayloadKind::Program]
    }

    fn run(&self, payload: Payload, _properties: &mut PropertySet) -> WorkflowResult<Payload> {
        let program = match payload {
            Payload::Program(program) => program,
            other => {
                return Err(WorkflowError::unexpected_input(
                    self.name(),
                    other.kind(),
                    self.input_kinds(),
                ));
            }
        };

        for &index in self.fixed.keys() {
            if index >= program.num_variables {
                return Err(WorkflowError::VariableOutOfRange {
                    index,
                    num_variables: program.num_variables,
                });
            }
        }

        // Compact the surviving variables, keeping their relative order.
        let mut remap = FxHashMap::default();
        let mut next = 0usize;
        for old in 0..program.num_variables {
            if !self.fixed.contains_key(&old) {
                remap.insert(old, next);
                next += 1;
            }
        }
        let new_index = |index: usize| {
            remap.get(&index).copied().ok_or(WorkflowError::VariableOutOfRange {
                index,
                num_variables: program.num_variables,
            })
        };

        let mut reduced = QuadraticProgram::new(next).with_constant(program.constant);
        reduced.sense = program.sense;

        for (&i, &weight) in &program.linear {
            match self.fixed.get(&i) {
                Some(&value) => reduced.constant += weight * f64::from(value),
                None => reduced.add_linear(new_index(i)?, weight),
            }
        }
        for (&(i, j), &weight) in &program.quadratic {
            match (self.fixed.get(&i), self.fixed.get(&j)) {
                (Some(&vi), Some(&vj)) => {
                    reduced.constant += weight * f64::from(vi) * f64::from(vj);
                }
                (Some(&vi), None) => reduced.add_linear(new_index(j)?, weight * f64::from(vi)),
                (None, Some(&vj)) => reduced.add_linear(new_index(i)?, weight * f64::from(vj)),
                (None, None) => reduced.add_quadratic(new_index(i)?, new_index(j)?, weight),
            }
        }

        Ok(Payload::Program(reduced))
    }

    fn interpret(&self, assignment: Vec<u8>) -> WorkflowResult<Vec<u8>> {
        let total = assignment.len() + self.fixed.len();
        let mut reduced = assignment.into_iter();
        let mut expanded = Vec::with_capacity(total);
        for index in 0..total {
            match self.fixed.get(&index) {
                Some(&value) => expanded.push(value),
                None => expanded.push(reduced.next().ok_or(WorkflowError::VariableOutOfRange {
                    index,
                    num_variables: total,
                })?),
            }
        }
        Ok(expanded)
    }
}
