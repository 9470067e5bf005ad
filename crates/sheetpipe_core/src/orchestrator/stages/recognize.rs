//! Recognition stage - optical music recognition of the input image/PDF.
//!
//! Invokes the recognition engine in batch mode with an explicit export
//! directory, then searches the export tree for the symbolic score: the
//! engine's output naming and nesting vary by version (compressed
//! `.mxl` vs. plain `.xml`, flat vs. generated subfolder), so the
//! output is located, not assumed, and copied to the job's output
//! directory under its normalized name.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use crate::artifacts;
use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, ScoreOutput};
use crate::tools::run_tool;

/// Symbolic score extensions, preferred first (compressed beats plain).
const SCORE_EXTS: [&str; 2] = ["mxl", "xml"];

/// Recognition stage.
pub struct RecognizeStep;

impl RecognizeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecognizeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RecognizeStep {
    fn stage(&self) -> Stage {
        Stage::Recognize
    }

    fn validate_input(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        if !ctx.job.source.is_file() {
            return Err(StepError::invalid_input(format!(
                "Input file not found: {}",
                ctx.job.source.display()
            )));
        }
        fs::create_dir_all(&ctx.work_dir)
            .map_err(|e| StepError::io_error("creating work directory", e))?;
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<PathBuf> {
        let args = [
            OsString::from("-batch"),
            ctx.job.source.clone().into_os_string(),
            OsString::from("-export"),
            OsString::from("-output"),
            ctx.work_dir.clone().into_os_string(),
        ];
        run_tool(&ctx.tools.recognizer, &args, Some(&ctx.work_dir), &ctx.logger)?;

        let stem = ctx.job.source_stem();
        let max_depth = ctx.settings.locator.max_depth;
        let located = artifacts::locate(&ctx.work_dir, &[stem.as_str()], &SCORE_EXTS, max_depth)
            .ok_or_else(|| {
                StepError::artifact_missing("symbolic score", ctx.work_dir.clone())
            })?;

        ctx.logger
            .info(&format!("Located symbolic score: {}", located.display()));

        // Normalize: the extension is the only upstream-dependent bit
        let ext = located
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "xml".to_string());
        let normalized = ctx.output_path(&format!("{}.{}", Stage::ARTIFACT_BASE, ext));

        fs::create_dir_all(&ctx.job.output_dir)
            .map_err(|e| StepError::io_error("creating output directory", e))?;
        fs::copy(&located, &normalized)
            .map_err(|e| StepError::io_error("copying symbolic score", e))?;

        state.score = Some(ScoreOutput {
            located,
            normalized: normalized.clone(),
        });

        Ok(normalized)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let score = state
            .score
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Recognition results not recorded"))?;

        if !score.normalized.is_file() {
            return Err(StepError::invalid_output(format!(
                "Normalized score not created: {}",
                score.normalized.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognize_step_has_correct_stage() {
        let step = RecognizeStep::new();
        assert_eq!(step.stage(), Stage::Recognize);
        assert_eq!(step.name(), "Recognize");
    }

    #[test]
    fn compressed_extension_is_preferred() {
        assert_eq!(SCORE_EXTS[0], "mxl");
    }
}
