//! Payload kinds and the tagged payload union threaded between blocks.
//!
//! Every block in a workflow declares which [`PayloadKind`]s it accepts and
//! produces; the workflow validates adjacent declarations at construction
//! time and enforces the declared output kinds at run time. The payload
//! itself is the closed [`Payload`] union, so a block can never smuggle an
//! undeclared representation through the chain.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::program::QuadraticProgram;

/// The kind of payload a block consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    /// A quadratic program objective.
    Program,
    /// A quasi-probability distribution over sampled bitstrings.
    Distribution,
    /// A (best value, best assignment) pair from solution evaluation.
    Solution,
    /// A raw 0/1 assignment in original variable order.
    Bits,
}

/// Check whether two kind sets share at least one kind.
pub(crate) fn kinds_overlap(a: &[PayloadKind], b: &[PayloadKind]) -> bool {
    a.iter().any(|kind| b.contains(kind))
}

/// Kinds of `a` that do not appear in `b`.
pub(crate) fn kinds_not_in(a: &[PayloadKind], b: &[PayloadKind]) -> Vec<PayloadKind> {
    a.iter().copied().filter(|kind| !b.contains(kind)).collect()
}

/// A quasi-probability distribution over measured bitstrings.
///
/// Bitstrings are most-significant-bit first, as emitted by the sampling
/// layer. Iteration follows insertion order, which makes downstream
/// tie-breaking deterministic.
///
/// # Example
///
/// ```
/// use quflow::QuasiDistribution;
///
/// let mut dist = QuasiDistribution::new();
/// dist.insert("00", 0.5);
/// dist.insert("11", 0.5);
///
/// assert_eq!(dist.get("11"), Some(0.5));
/// assert_eq!(dist.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuasiDistribution {
    probabilities: IndexMap<String, f64>,
}

impl QuasiDistribution {
    /// Create an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bitstring with its probability mass, replacing any
    /// previous mass for the same bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, probability: f64) {
        self.probabilities.insert(bitstring.into(), probability);
    }

    /// Get the probability mass of a bitstring.
    pub fn get(&self, bitstring: &str) -> Option<f64> {
        self.probabilities.get(bitstring).copied()
    }

    /// Iterate over (bitstring, mass) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.probabilities.iter().map(|(s, &p)| (s.as_str(), p))
    }

    /// Number of bitstrings in the distribution.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Check if the distribution is empty.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for QuasiDistribution {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut dist = Self::new();
        for (bitstring, probability) in iter {
            dist.insert(bitstring, probability);
        }
        dist
    }
}

/// The best objective value found and the assignment achieving it,
/// in QUBO variable order (index 0 is variable 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Objective value of the best assignment seen.
    pub value: f64,
    /// The best 0/1 assignment.
    pub assignment: Vec<u8>,
}

/// The payload threaded through a workflow, one variant per [`PayloadKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// A quadratic program objective.
    Program(QuadraticProgram),
    /// A quasi-probability distribution over bitstrings.
    Distribution(QuasiDistribution),
    /// An evaluated (value, assignment) pair.
    Solution(Solution),
    /// A raw 0/1 assignment.
    Bits(Vec<u8>),
}

impl Payload {
    /// The kind tag of this payload.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Program(_) => PayloadKind::Program,
            Payload::Distribution(_) => PayloadKind::Distribution,
            Payload::Solution(_) => PayloadKind::Solution,
            Payload::Bits(_) => PayloadKind::Bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind() {
        assert_eq!(Payload::Bits(vec![0, 1]).kind(), PayloadKind::Bits);
        assert_eq!(
            Payload::Distribution(QuasiDistribution::new()).kind(),
            PayloadKind::Distribution
        );
        assert_eq!(
            Payload::Solution(Solution {
                value: 0.0,
                assignment: vec![],
            })
            .kind(),
            PayloadKind::Solution
        );
    }

    #[test]
    fn test_kind_set_helpers() {
        use PayloadKind::{Bits, Distribution, Solution};

        assert!(kinds_overlap(&[Distribution, Solution], &[Solution]));
        assert!(!kinds_overlap(&[Distribution], &[Bits]));
        assert_eq!(
            kinds_not_in(&[Distribution, Solution], &[Solution]),
            vec![Distribution]
        );
        assert!(kinds_not_in(&[Solution], &[Solution, Bits]).is_empty());
    }

    #[test]
    fn test_distribution_insertion_order() {
        let dist: QuasiDistribution =
            [("10", 0.2), ("01", 0.3), ("00", 0.5)].into_iter().collect();

        let order: Vec<&str> = dist.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec!["10", "01", "00"]);
    }

    #[test]
    fn test_distribution_replaces_mass() {
        let mut dist = QuasiDistribution::new();
        dist.insert("0", 0.4);
        dist.insert("0", 0.6);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.get("0"), Some(0.6));
    }

    #[test]
    fn test_distribution_serde_roundtrip() {
        let dist: QuasiDistribution = [("00", 0.5), ("11", 0.5)].into_iter().collect();
        let json = serde_json::to_string(&dist).unwrap();
        let back: QuasiDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dist);
    }
}
