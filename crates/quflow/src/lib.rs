//! Staged workflow engine for QUBO conversion and postprocessing.
//!
//! This crate provides a validated, ordered pipeline of transformation
//! passes for driving a quadratic-program optimization flow: converting a
//! program to QUBO form, scoring sampled bitstring distributions against it,
//! and unrolling the winning assignment back to the original variable space.
//!
//! # Architecture
//!
//! ```text
//! Input Payload
//!       │
//!       ▼
//! ┌──────────────┐
//! │   Workflow   │ ──► PropertySet (shared by every pass of one run)
//! └──────────────┘
//!       │
//!       ├── MaximizeToMinimize / FixVariables   (conversion)
//!       ├── EvaluateSolution                    (scoring)
//!       └── UnrollVariables                     (reverse unrolling)
//!       │
//!       ▼
//! Output Payload (0/1 bits in original variable order)
//! ```
//!
//! A [`Workflow`] composes [`Pass`] implementations and nested workflows
//! into one chain. Kind compatibility between adjacent blocks is validated
//! when the workflow is built; at run time each block's returned payload is
//! checked against its declared output kinds. Blocks communicate through a
//! [`PropertySet`] threaded explicitly through the run, and a workflow can
//! publish its final payload there for downstream workflows to pick up —
//! eagerly or behind a [`LazyHandle`].
//!
//! # Example
//!
//! ```rust
//! use quflow::{Payload, PropertySet, QuadraticProgram, QuasiDistribution, Workflow};
//! use quflow::passes::{EvaluateSolution, UnrollVariables};
//!
//! // Minimize x0 + x1 over sampled assignments.
//! let mut program = QuadraticProgram::new(2);
//! program.add_linear(0, 1.0);
//! program.add_linear(1, 1.0);
//!
//! let workflow = Workflow::builder("postprocess")
//!     .add_pass(EvaluateSolution::new(program))
//!     .add_pass(UnrollVariables::identity())
//!     .build()
//!     .unwrap();
//!
//! let mut distribution = QuasiDistribution::new();
//! distribution.insert("00", 0.5);
//! distribution.insert("11", 0.5);
//!
//! let mut properties = PropertySet::new();
//! let output = workflow
//!     .run(&Payload::Distribution(distribution), &mut properties)
//!     .unwrap();
//!
//! assert_eq!(output, Payload::Bits(vec![0, 0]));
//! ```
//!
//! # Custom passes
//!
//! Implement the [`Pass`] trait to add a transformation unit:
//!
//! ```rust
//! use quflow::{Pass, Payload, PayloadKind, PropertySet, WorkflowResult};
//!
//! struct CountBits;
//!
//! impl Pass for CountBits {
//!     fn name(&self) -> &str { "CountBits" }
//!     fn input_kinds(&self) -> &[PayloadKind] { &[PayloadKind::Bits] }
//!     fn output_kinds(&self) -> &[PayloadKind] { &[PayloadKind::Bits] }
//!
//!     fn run(&self, payload: Payload, _props: &mut PropertySet) -> WorkflowResult<Payload> {
//!         // Your pass logic here
//!         Ok(payload)
//!     }
//! }
//! ```

pub mod error;
pub mod lazy;
pub mod pass;
pub mod passes;
pub mod payload;
pub mod presets;
pub mod program;
pub mod property;
pub mod workflow;

pub use error::{WorkflowError, WorkflowResult};
pub use lazy::LazyHandle;
pub use pass::Pass;
pub use payload::{Payload, PayloadKind, QuasiDistribution, Solution};
pub use program::{ObjectiveSense, QuadraticProgram};
pub use property::{PropertySet, PropertyValue, FINAL_OUTPUT_KEY};
pub use workflow::{Block, Workflow, WorkflowBuilder};
