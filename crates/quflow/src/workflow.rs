//! Workflow orchestrator: validated, ordered composition of blocks.

use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use crate::error::{WorkflowError, WorkflowResult};
use crate::pass::Pass;
use crate::payload::{kinds_not_in, kinds_overlap, Payload, PayloadKind};
use crate::property::PropertySet;

/// A stage of a workflow: a single pass or a nested workflow.
pub enum Block {
    /// A transformation unit.
    Pass(Box<dyn Pass>),
    /// A nested composite workflow.
    Workflow(Workflow),
}

impl Block {
    /// Name of the underlying pass or workflow.
    pub fn name(&self) -> &str {
        match self {
            Block::Pass(pass) => pass.name(),
            Block::Workflow(workflow) => workflow.name(),
        }
    }

    /// Payload kinds this block accepts.
    pub fn input_kinds(&self) -> &[PayloadKind] {
        match self {
            Block::Pass(pass) => pass.input_kinds(),
            Block::Workflow(workflow) => workflow.input_kinds(),
        }
    }

    /// Payload kinds this block produces.
    pub fn output_kinds(&self) -> &[PayloadKind] {
        match self {
            Block::Pass(pass) => pass.output_kinds(),
            Block::Workflow(workflow) => workflow.output_kinds(),
        }
    }

    fn run(&self, payload: Payload, properties: &mut PropertySet) -> WorkflowResult<Payload> {
        match self {
            Block::Pass(pass) => pass.run(payload, properties),
            Block::Workflow(workflow) => workflow.run(&payload, properties),
        }
    }

    fn interpret(&self, assignment: Vec<u8>) -> WorkflowResult<Vec<u8>> {
        match self {
            Block::Pass(pass) => pass.interpret(assignment),
            Block::Workflow(workflow) => workflow.interpret(assignment),
        }
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Block::Pass(pass) => f.debug_tuple("Pass").field(&pass.name()).finish(),
            Block::Workflow(workflow) => f.debug_tuple("Workflow").field(&workflow.name).finish(),
        }
    }
}

/// An ordered, validated composition of passes and nested workflows.
///
/// Kind compatibility across the chain is checked once, at build time; the
/// derived input kinds are the first block's and the derived output kinds are
/// the last block's, fixed for the lifetime of the workflow. Execution is
/// strictly sequential: each block's output becomes the next block's input,
/// and every block shares one [`PropertySet`] for the duration of a run.
///
/// # Example
///
/// ```
/// use quflow::{Payload, PropertySet, QuadraticProgram, QuasiDistribution, Workflow};
/// use quflow::passes::{EvaluateSolution, UnrollVariables};
///
/// let mut program = QuadraticProgram::new(1);
/// program.add_linear(0, 1.0);
///
/// let workflow = Workflow::builder("postprocess")
///     .add_pass(EvaluateSolution::new(program))
///     .add_pass(UnrollVariables::identity())
///     .build()
///     .unwrap();
///
/// let distribution: QuasiDistribution = [("0", 0.5), ("1", 0.5)].into_iter().collect();
/// let mut properties = PropertySet::new();
/// let output = workflow
///     .run(&Payload::Distribution(distribution), &mut properties)
///     .unwrap();
///
/// assert_eq!(output, Payload::Bits(vec![0]));
/// ```
pub struct Workflow {
    name: String,
    blocks: Vec<Block>,
    store_final_output: bool,
    /// Indices of nested workflows by name.
    stages: FxHashMap<String, usize>,
    input_kinds: Vec<PayloadKind>,
    output_kinds: Vec<PayloadKind>,
}

impl Workflow {
    /// Start building a workflow with the given name.
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder::new(name)
    }

    /// Get the name of this workflow.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derived input kinds: the first block's declared input kinds.
    pub fn input_kinds(&self) -> &[PayloadKind] {
        &self.input_kinds
    }

    /// Derived output kinds: the last block's declared output kinds.
    pub fn output_kinds(&self) -> &[PayloadKind] {
        &self.output_kinds
    }

    /// The blocks of this workflow, in execution order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the workflow has no blocks. Never true for a built
    /// workflow, which requires at least one block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether this workflow publishes its final output into the shared
    /// property set.
    pub fn stores_final_output(&self) -> bool {
        self.store_final_output
    }

    /// Look up a nested workflow by name.
    pub fn stage(&self, name: &str) -> Option<&Workflow> {
        self.stages.get(name).and_then(|&index| match &self.blocks[index] {
            Block::Workflow(workflow) => Some(workflow),
            Block::Pass(_) => None,
        })
    }

    /// Run every block in order, threading the payload and the shared
    /// property set.
    ///
    /// The caller's payload is cloned on entry and never mutated. After each
    /// block the returned payload's kind is checked against the block's
    /// declared output kinds; a mismatch aborts the run with
    /// [`WorkflowError::ContractViolation`]. Any block failure aborts the
    /// remainder of the run and propagates unmodified — property entries
    /// written by completed blocks are not rolled back.
    #[instrument(skip_all, fields(workflow = %self.name))]
    pub fn run(&self, input: &Payload, properties: &mut PropertySet) -> WorkflowResult<Payload> {
        info!(
            "Running workflow '{}' with {} blocks",
            self.name,
            self.blocks.len()
        );

        let mut payload = input.clone();
        for block in &self.blocks {
            debug!("Running block: {}", block.name());
            payload = block.run(payload, properties)?;
            if !block.output_kinds().contains(&payload.kind()) {
                return Err(WorkflowError::ContractViolation {
                    block: block.name().to_string(),
                    found: payload.kind(),
                    declared: block.output_kinds().to_vec(),
                });
            }
            debug!("Block {} completed, output: {:?}", block.name(), payload.kind());
        }

        if self.store_final_output {
            properties.set_final_output(&self.name, payload.clone());
        }

        Ok(payload)
    }

    /// Replay the blocks in reverse order, mapping an assignment back
    /// through each block's forward transformation via
    /// [`Pass::interpret`]. Nested workflows are replayed recursively.
    ///
    /// A workflow whose passes keep the default identity `interpret`
    /// returns the assignment unchanged.
    pub fn interpret(&self, mut assignment: Vec<u8>) -> WorkflowResult<Vec<u8>> {
        for block in self.blocks.iter().rev() {
            assignment = block.interpret(assignment)?;
        }
        Ok(assignment)
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("blocks", &self.blocks)
            .field("store_final_output", &self.store_final_output)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Workflow`], validating the chain on [`build`](Self::build).
pub struct WorkflowBuilder {
    name: String,
    blocks: Vec<Block>,
    store_final_output: bool,
    strict_validation: bool,
}

impl WorkflowBuilder {
    /// Create a builder with strict validation enabled and final-output
    /// storage disabled.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: vec![],
            store_final_output: false,
            strict_validation: true,
        }
    }

    /// Append a pass to the chain.
    #[must_use]
    pub fn add_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.blocks.push(Block::Pass(Box::new(pass)));
        self
    }

    /// Append a nested workflow to the chain.
    #[must_use]
    pub fn add_workflow(mut self, workflow: Workflow) -> Self {
        self.blocks.push(Block::Workflow(workflow));
        self
    }

    /// Publish the final payload into the shared property set under this
    /// workflow's name after each run.
    #[must_use]
    pub fn store_final_output(mut self, store: bool) -> Self {
        self.store_final_output = store;
        self
    }

    /// Toggle strict validation. When strict (the default), every declared
    /// output kind of a block must be accepted by its successor; when
    /// relaxed, a non-empty overlap suffices.
    #[must_use]
    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    /// Validate the chain and build the workflow.
    ///
    /// Fails with [`WorkflowError::EmptyWorkflow`],
    /// [`WorkflowError::DuplicateStage`],
    /// [`WorkflowError::IncompatibleBlocks`], or (under strict validation)
    /// [`WorkflowError::UnconsumedOutputs`].
    pub fn build(self) -> WorkflowResult<Workflow> {
        let Self {
            name,
            blocks,
            store_final_output,
            strict_validation,
        } = self;

        if blocks.is_empty() {
            return Err(WorkflowError::EmptyWorkflow { workflow: name });
        }

        let mut stages = FxHashMap::default();
        for (index, block) in blocks.iter().enumerate() {
            if let Block::Workflow(nested) = block {
                if stages.insert(nested.name.clone(), index).is_some() {
                    return Err(WorkflowError::DuplicateStage {
                        workflow: name,
                        stage: nested.name.clone(),
                    });
                }
            }
        }

        for pair in blocks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let produced = prev.output_kinds();
            let accepted = next.input_kinds();

            if !kinds_overlap(produced, accepted) {
                return Err(WorkflowError::IncompatibleBlocks {
                    predecessor: prev.name().to_string(),
                    successor: next.name().to_string(),
                    produced: produced.to_vec(),
                    accepted: accepted.to_vec(),
                });
            }
            if strict_validation {
                let unconsumed = kinds_not_in(produced, accepted);
                if !unconsumed.is_empty() {
                    return Err(WorkflowError::UnconsumedOutputs {
                        predecessor: prev.name().to_string(),
                        successor: next.name().to_string(),
                        unconsumed,
                    });
                }
            }
        }

        let input_kinds = blocks[0].input_kinds().to_vec();
        let output_kinds = blocks[blocks.len() - 1].output_kinds().to_vec();

        Ok(Workflow {
            name,
            blocks,
            store_final_output,
            stages,
            input_kinds,
            output_kinds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{QuasiDistribution, Solution};
    use crate::program::QuadraticProgram;

    /// Stub pass with configurable kind declarations, producing a payload
    /// of its first declared output kind.
    struct KindPass {
        name: &'static str,
        inputs: Vec<PayloadKind>,
        outputs: Vec<PayloadKind>,
    }

    impl KindPass {
        fn new(name: &'static str, inputs: &[PayloadKind], outputs: &[PayloadKind]) -> Self {
            Self {
                name,
                inputs: inputs.to_vec(),
                outputs: outputs.to_vec(),
            }
        }
    }

    fn sample(kind: PayloadKind) -> Payload {
        match kind {
            PayloadKind::Program => Payload::Program(QuadraticProgram::new(1)),
            PayloadKind::Distribution => {
                Payload::Distribution([("0", 1.0)].into_iter().collect::<QuasiDistribution>())
            }
            PayloadKind::Solution => Payload::Solution(Solution {
                value: 0.0,
                assignment: vec![0],
            }),
            PayloadKind::Bits => Payload::Bits(vec![0]),
        }
    }

    impl Pass for KindPass {
        fn name(&self) -> &str {
            self.name
        }

        fn input_kinds(&self) -> &[PayloadKind] {
            &self.inputs
        }

        fn output_kinds(&self) -> &[PayloadKind] {
            &self.outputs
        }

        fn run(&self, _payload: Payload, _properties: &mut PropertySet) -> WorkflowResult<Payload> {
            Ok(sample(self.outputs[0]))
        }
    }

    /// Pass that violates its declared output contract at run time.
    struct RoguePass;

    impl Pass for RoguePass {
        fn name(&self) -> &str {
            "rogue"
        }

        fn input_kinds(&self) -> &[PayloadKind] {
            &[PayloadKind::Bits]
        }

        fn output_kinds(&self) -> &[PayloadKind] {
            &[PayloadKind::Solution]
        }

        fn run(&self, payload: Payload, _properties: &mut PropertySet) -> WorkflowResult<Payload> {
            Ok(payload)
        }
    }

    fn bits_pass(name: &'static str) -> KindPass {
        KindPass::new(name, &[PayloadKind::Bits], &[PayloadKind::Bits])
    }

    fn bits_workflow(name: &str) -> Workflow {
        Workflow::builder(name).add_pass(bits_pass("inner")).build().unwrap()
    }

    #[test]
    fn test_derived_kinds_match_first_and_last_block() {
        let workflow = Workflow::builder("chain")
            .add_pass(KindPass::new(
                "a",
                &[PayloadKind::Distribution],
                &[PayloadKind::Solution],
            ))
            .add_pass(KindPass::new(
                "b",
                &[PayloadKind::Solution],
                &[PayloadKind::Bits],
            ))
            .build()
            .unwrap();

        assert_eq!(workflow.input_kinds(), &[PayloadKind::Distribution]);
        assert_eq!(workflow.output_kinds(), &[PayloadKind::Bits]);
        assert_eq!(workflow.len(), 2);
    }

    #[test]
    fn test_derived_kinds_through_nested_workflow() {
        let nested = bits_workflow("nested");
        let workflow = Workflow::builder("outer")
            .add_workflow(nested)
            .add_pass(bits_pass("tail"))
            .build()
            .unwrap();

        assert_eq!(workflow.input_kinds(), &[PayloadKind::Bits]);
        assert_eq!(workflow.output_kinds(), &[PayloadKind::Bits]);
        assert!(workflow.stage("nested").is_some());
        assert!(workflow.stage("tail").is_none());
    }

    #[test]
    fn test_disjoint_kinds_fail_at_any_position() {
        // Mismatch at the first boundary.
        let err = Workflow::builder("chain")
            .add_pass(KindPass::new("a", &[PayloadKind::Bits], &[PayloadKind::Bits]))
            .add_pass(KindPass::new(
                "b",
                &[PayloadKind::Distribution],
                &[PayloadKind::Solution],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IncompatibleBlocks { .. }));

        // Mismatch at the second boundary.
        let err = Workflow::builder("chain")
            .add_pass(KindPass::new("a", &[PayloadKind::Bits], &[PayloadKind::Bits]))
            .add_pass(KindPass::new("b", &[PayloadKind::Bits], &[PayloadKind::Bits]))
            .add_pass(KindPass::new(
                "c",
                &[PayloadKind::Program],
                &[PayloadKind::Program],
            ))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, WorkflowError::IncompatibleBlocks { ref predecessor, .. } if predecessor == "b")
        );
    }

    #[test]
    fn test_partial_overlap_strict_vs_relaxed() {
        let build = |strict| {
            Workflow::builder("chain")
                .strict_validation(strict)
                .add_pass(KindPass::new(
                    "a",
                    &[PayloadKind::Bits],
                    &[PayloadKind::Bits, PayloadKind::Solution],
                ))
                .add_pass(KindPass::new("b", &[PayloadKind::Bits], &[PayloadKind::Bits]))
                .build()
        };

        let err = build(true).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::UnconsumedOutputs { ref unconsumed, .. }
                if unconsumed == &[PayloadKind::Solution]
        ));
        assert!(build(false).is_ok());
    }

    #[test]
    fn test_duplicate_stage_name_fails_anywhere() {
        let err = Workflow::builder("outer")
            .add_workflow(bits_workflow("stage"))
            .add_workflow(bits_workflow("stage"))
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateStage { ref stage, .. } if stage == "stage"));

        let err = Workflow::builder("outer")
            .add_workflow(bits_workflow("stage"))
            .add_pass(bits_pass("between"))
            .add_workflow(bits_workflow("stage"))
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateStage { .. }));
    }

    #[test]
    fn test_empty_workflow_rejected() {
        let err = Workflow::builder("empty").build().unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyWorkflow { .. }));
    }

    #[test]
    fn test_run_does_not_mutate_input() {
        let workflow = Workflow::builder("chain")
            .add_pass(KindPass::new("a", &[PayloadKind::Bits], &[PayloadKind::Solution]))
            .build()
            .unwrap();

        let input = Payload::Bits(vec![1, 0, 1]);
        let snapshot = input.clone();
        let mut properties = PropertySet::new();
        let output = workflow.run(&input, &mut properties).unwrap();

        assert_eq!(input, snapshot);
        assert_eq!(output.kind(), PayloadKind::Solution);
    }

    #[test]
    fn test_contract_violation_aborts_run() {
        let workflow = Workflow::builder("chain")
            .add_pass(RoguePass)
            .build()
            .unwrap();

        let mut properties = PropertySet::new();
        let err = workflow
            .run(&Payload::Bits(vec![1]), &mut properties)
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::ContractViolation { found: PayloadKind::Bits, .. }
        ));
    }

    #[test]
    fn test_nested_workflow_stores_final_output() {
        let nested = Workflow::builder("inner-stage")
            .add_pass(bits_pass("p"))
            .store_final_output(true)
            .build()
            .unwrap();
        let workflow = Workflow::builder("outer")
            .add_workflow(nested)
            .add_pass(bits_pass("tail"))
            .store_final_output(true)
            .build()
            .unwrap();

        let mut properties = PropertySet::new();
        let output = workflow.run(&Payload::Bits(vec![1]), &mut properties).unwrap();

        for name in ["inner-stage", "outer"] {
            let stored = properties
                .get(name)
                .get(crate::property::FINAL_OUTPUT_KEY)
                .and_then(crate::property::PropertyValue::as_payload);
            assert_eq!(stored, Some(&output), "missing final output for {name}");
        }
    }

    #[test]
    fn test_interpret_identity_without_overrides() {
        let workflow = Workflow::builder("chain")
            .add_pass(bits_pass("a"))
            .add_pass(bits_pass("b"))
            .build()
            .unwrap();

        assert_eq!(workflow.interpret(vec![1, 0]).unwrap(), vec![1, 0]);
    }
}
