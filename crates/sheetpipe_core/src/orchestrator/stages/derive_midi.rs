//! MIDI derivation stage - the notation renderer in a different output
//! mode: symbolic score in, MIDI performance file out.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, MidiOutput};
use crate::tools::run_tool;

/// MIDI derivation stage.
pub struct DeriveMidiStep;

impl DeriveMidiStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeriveMidiStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for DeriveMidiStep {
    fn stage(&self) -> Stage {
        Stage::DeriveMidi
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.score_path() {
            Some(score) if score.is_file() => Ok(()),
            _ => Err(StepError::invalid_input(
                "Symbolic score not available for MIDI derivation",
            )),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<PathBuf> {
        let score = state
            .score_path()
            .ok_or_else(|| StepError::invalid_input("Symbolic score not available"))?
            .to_path_buf();

        let ext = Stage::DeriveMidi.standard_extension().unwrap_or("mid");
        let output = ctx.output_path(&format!("{}.{}", Stage::ARTIFACT_BASE, ext));

        let args = [
            score.into_os_string(),
            OsString::from("-o"),
            output.clone().into_os_string(),
        ];
        run_tool(&ctx.tools.renderer, &args, Some(&ctx.work_dir), &ctx.logger)?;

        state.midi = Some(MidiOutput {
            path: output.clone(),
        });

        Ok(output)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        let midi = state
            .midi
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Derivation results not recorded"))?;

        if !midi.path.is_file() {
            return Err(StepError::artifact_missing(
                "derived MIDI file",
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
    fn derive_midi_step_has_correct_stage() {
        let step = DeriveMidiStep::new();
        assert_eq!(step.stage(), Stage::DeriveMidi);
        assert_eq!(step.name(), "DeriveMidi");
    }
}
