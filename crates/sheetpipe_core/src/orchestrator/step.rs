//! Pipeline stage trait definition.
//!
//! All pipeline stages implement this trait, providing a consistent
//! interface for validation and execution.

use std::path::PathBuf;

use super::errors::StepResult;
use super::types::{Context, JobState};
use crate::models::Stage;

/// Trait for pipeline stages.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Invoke the stage processor and locate its output
/// 3. `validate_output` - Verify the stage recorded valid output
///
/// `execute` returns the path of the produced artifact; the runner
/// records it in the stage result and hands it to the review hook.
/// Subsequent stages read their inputs from `JobState`.
pub trait PipelineStep: Send + Sync {
    /// Which pipeline stage this is.
    fn stage(&self) -> Stage;

    /// Get the stage name (for logging and error context).
    fn name(&self) -> &'static str {
        self.stage().name()
    }

    /// Validate inputs before execution.
    ///
    /// Should check that all required preconditions are met (files
    /// exist, previous stages recorded their outputs).
    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Execute the stage's work and return the produced artifact path.
    ///
    /// Should record results in `state` and use `ctx.logger` for
    /// logging.
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<PathBuf>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` succeeds. Should verify that the artifact
    /// actually exists on disk and the state was populated.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    struct MockStep;

    impl PipelineStep for MockStep {
        fn stage(&self) -> Stage {
            Stage::Recognize
        }

        fn validate_input(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<PathBuf> {
            Ok(PathBuf::from("/out/score.mxl"))
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep);
        assert_eq!(step.stage(), Stage::Recognize);
        assert_eq!(step.name(), "Recognize");
    }
}
