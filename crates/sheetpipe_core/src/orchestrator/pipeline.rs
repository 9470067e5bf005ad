//! Pipeline runner that executes stages in sequence.

use std::time::Instant;

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, JobState};
use crate::models::StageResult;

/// Pipeline that runs a sequence of stages.
///
/// The pipeline executes stages in order, running validation before and
/// after each stage, timing every attempt, and recording a
/// `StageResult` per attempt in the job state. The first failure stops
/// the run - no speculative continuation, since each stage's artifact
/// is the next stage's input.
pub struct Pipeline {
    /// Stages to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a stage to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a stage (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Get the number of stages in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get stage names in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Executes each stage in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute` (timed)
    /// 3. Run `validate_output`
    /// 4. Record the `StageResult`; fire the review hook on success
    ///
    /// Every attempted stage leaves a result in `state.stages`, so the
    /// caller can derive the job's final status even after an error.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<()> {
        let total_steps = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            let stage = step.stage();
            let stage_name = step.name();
            ctx.logger.phase(stage_name);
            ctx.logger
                .progress(((i as f64 / total_steps as f64) * 100.0) as u32);

            let started = Instant::now();

            ctx.logger
                .debug(&format!("Validating input for '{}'", stage_name));
            if let Err(e) = step.validate_input(ctx, state) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                state.stages.push(StageResult::failure(stage, None, 0));
                return Err(PipelineError::stage_failed(&ctx.job.name, stage_name, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", stage_name));
            let artifact = match step.execute(ctx, state) {
                Ok(artifact) => artifact,
                Err(e) => {
                    let elapsed = started.elapsed().as_millis() as u64;
                    ctx.logger.error(&format!("Execution failed: {}", e));
                    state
                        .stages
                        .push(StageResult::failure(stage, e.exit_code(), elapsed));
                    return Err(PipelineError::stage_failed(&ctx.job.name, stage_name, e));
                }
            };

            ctx.logger
                .debug(&format!("Validating output for '{}'", stage_name));
            if let Err(e) = step.validate_output(ctx, state) {
                let elapsed = started.elapsed().as_millis() as u64;
                ctx.logger.error(&format!("Output validation failed: {}", e));
                state
                    .stages
                    .push(StageResult::failure(stage, e.exit_code(), elapsed));
                return Err(PipelineError::stage_failed(&ctx.job.name, stage_name, e));
            }

            let elapsed = started.elapsed().as_millis() as u64;
            state
                .stages
                .push(StageResult::success(stage, artifact.clone(), elapsed));
            ctx.logger.success(&format!("{} completed", stage_name));

            // Side effect only; never touches pipeline state
            if let Some(ref hook) = ctx.review_hook {
                hook.open(&artifact, &ctx.logger);
            }
        }

        ctx.logger.progress(100);
        ctx.logger.success("Pipeline completed successfully");

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::jobs::Job;
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::Stage;
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::tools::ResolvedTools;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct CountingStep {
        stage: Stage,
        execute_count: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PipelineStep for CountingStep {
        fn stage(&self) -> Stage {
            self.stage
        }

        fn validate_input(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<PathBuf> {
            self.execute_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StepError::artifact_missing("symbolic score", "/work"))
            } else {
                Ok(PathBuf::from(format!("/out/{}", self.stage.name())))
            }
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    fn test_context(dir: &std::path::Path) -> Context {
        let job = Job::new(
            "job_test",
            "tune",
            dir.join("tune.pdf"),
            dir.join("out").join("tune"),
            false,
        );
        let logger =
            Arc::new(JobLogger::new("tune", dir, LogConfig::default(), None).unwrap());
        let tools = ResolvedTools {
            recognizer: PathBuf::from("/bin/true"),
            renderer: PathBuf::from("/bin/true"),
            synthesizer: PathBuf::from("/bin/true"),
            transcoder: PathBuf::from("/bin/true"),
            soundfont: PathBuf::from("/dev/null"),
        };
        Context::new(job, Settings::default(), tools, dir.join("work"), logger)
    }

    #[test]
    fn pipeline_builds_correctly() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                stage: Stage::Recognize,
                execute_count: count.clone(),
                fail: false,
            })
            .with_step(CountingStep {
                stage: Stage::RenderPdf,
                execute_count: count.clone(),
                fail: false,
            });

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.stage_names(), vec!["Recognize", "RenderPdf"]);
    }

    #[test]
    fn all_stages_run_and_record_results() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let mut state = JobState::new("job_test");

        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                stage: Stage::Recognize,
                execute_count: count.clone(),
                fail: false,
            })
            .with_step(CountingStep {
                stage: Stage::RenderPdf,
                execute_count: count.clone(),
                fail: false,
            });

        pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(state.stages.len(), 2);
        assert!(state.stages.iter().all(|s| s.is_success()));
    }

    #[test]
    fn first_failure_stops_the_run() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let mut state = JobState::new("job_test");

        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                stage: Stage::Recognize,
                execute_count: first.clone(),
                fail: true,
            })
            .with_step(CountingStep {
                stage: Stage::RenderPdf,
                execute_count: second.clone(),
                fail: false,
            });

        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert!(err.to_string().contains("Recognize"));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        // No speculative continuation
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(state.stages.len(), 1);
        assert!(!state.stages[0].is_success());
    }
}
