//! Built-in workflow passes.
//!
//! Two groups:
//! - [`convert`]: forward converters bringing a program into QUBO form
//! - [`evaluate`] / [`unroll`]: postprocessing of sampled distributions

pub mod convert;
pub mod evaluate;
pub mod unroll;

pub use convert::{FixVariables, MaximizeToMinimize};
pub use evaluate::EvaluateSolution;
pub use unroll::UnrollVariables;
