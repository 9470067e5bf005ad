//! PDF rendering stage - notation renderer converts the symbolic score
//! into a re-rendered PDF at a caller-specified path.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PdfOutput};
use crate::tools::run_tool;

/// PDF rendering stage.
pub struct RenderPdfStep;

impl RenderPdfStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RenderPdfStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RenderPdfStep {
    fn stage(&self) -> Stage {
        Stage::RenderPdf
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.score_path() {
            Some(score) if score.is_file() => Ok(()),
            Some(score) => Err(StepError::invalid_input(format!(
                "Symbolic score missing on disk: {}",
                score.display()
            ))),
            None => Err(StepError::invalid_input(
                "Recognition did not record a symbolic score",
            )),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<PathBuf> {
        // validate_input guarantees the score is present
        let score = state
            .score_path()
            .ok_or_else(|| StepError::invalid_input("Symbolic score not available"))?
            .to_path_buf();

        let ext = Stage::RenderPdf.standard_extension().unwrap_or("pdf");
        let output = ctx.output_path(&format!("{}.{}", Stage::ARTIFACT_BASE, ext));

        let args = [
            score.into_os_string(),
            OsString::from("-o"),
            output.clone().into_os_string(),
        ];
        run_tool(&ctx.tools.renderer, &args, Some(&ctx.work_dir), &ctx.logger)?;

        state.pdf = Some(PdfOutput {
            path: output.clone(),
        });

        Ok(output)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        let pdf = state
            .pdf
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Rendering results not recorded"))?;

        if !pdf.path.is_file() {
            // Clean exit but no file: the renderer silently failed
            return Err(StepError::artifact_missing(
                "rendered PDF",
                ctx.job.output_dir.clone(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pdf_step_has_correct_stage() {
        let step = RenderPdfStep::new();
        assert_eq!(step.stage(), Stage::RenderPdf);
        assert_eq!(step.name(), "RenderPdf");
    }
}
