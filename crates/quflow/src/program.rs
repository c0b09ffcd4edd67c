//! Quadratic program objective over binary variables.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Direction of optimization for a quadratic program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// Smaller objective values are better.
    Minimize,
    /// Larger objective values are better.
    Maximize,
}

/// A quadratic objective over binary variables:
/// `constant + Σ linear[i]·x[i] + Σ quadratic[(i, j)]·x[i]·x[j]`.
///
/// In QUBO form the sense is [`ObjectiveSense::Minimize`] and there are no
/// constraints; converter passes are responsible for bringing a program into
/// that form.
///
/// # Example
///
/// ```
/// use quflow::QuadraticProgram;
///
/// let mut program = QuadraticProgram::new(2);
/// program.add_linear(0, 1.0);
/// program.add_linear(1, 1.0);
/// program.add_quadratic(0, 1, -2.0);
///
/// assert_eq!(program.evaluate(&[1, 1]), 0.0);
/// assert_eq!(program.evaluate(&[1, 0]), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticProgram {
    /// Direction of optimization.
    pub sense: ObjectiveSense,
    /// Constant offset of the objective.
    pub constant: f64,
    /// Linear terms keyed by variable index.
    pub linear: FxHashMap<usize, f64>,
    /// Quadratic terms keyed by ordered index pairs.
    pub quadratic: FxHashMap<(usize, usize), f64>,
    /// Number of decision variables.
    pub num_variables: usize,
}

impl QuadraticProgram {
    /// Create a minimization program with the given number of variables
    /// and an all-zero objective.
    pub fn new(num_variables: usize) -> Self {
        Self {
            sense: ObjectiveSense::Minimize,
            constant: 0.0,
            linear: FxHashMap::default(),
            quadratic: FxHashMap::default(),
            num_variables,
        }
    }

    /// Set the optimization sense.
    #[must_use]
    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = sense;
        self
    }

    /// Set the constant offset.
    #[must_use]
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Add a linear term, accumulating onto any existing weight for the
    /// same index.
    pub fn add_linear(&mut self, index: usize, weight: f64) {
        *self.linear.entry(index).or_insert(0.0) += weight;
    }

    /// Add a quadratic term, accumulating onto any existing weight for the
    /// same index pair.
    pub fn add_quadratic(&mut self, i: usize, j: usize, weight: f64) {
        *self.quadratic.entry((i, j)).or_insert(0.0) += weight;
    }

    /// Evaluate the objective for a 0/1 assignment, index 0 first.
    ///
    /// Indices beyond the assignment length read as 0.
    pub fn evaluate(&self, assignment: &[u8]) -> f64 {
        let bit = |i: usize| assignment.get(i).map_or(0.0, |&b| f64::from(b));

        let mut total = self.constant;
        for (&i, &weight) in &self.linear {
            total += bit(i) * weight;
        }
        for (&(i, j), &weight) in &self.quadratic {
            total += bit(i) * weight * bit(j);
        }
        total
    }
}
