//! Audio rendering stage - soundfont playback of the MIDI file into a
//! waveform, then transcoding to MP3.
//!
//! Two processors run back to back: the synthesizer writes the
//! intermediate WAV into the work directory, the transcoder writes the
//! final MP3 into the job's output directory. Only the MP3 is a job
//! artifact.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{AudioOutput, Context, JobState};
use crate::tools::run_tool;

/// Sample rate for soundfont playback.
const SAMPLE_RATE: &str = "44100";

/// Audio rendering stage.
pub struct RenderAudioStep;

impl RenderAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RenderAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RenderAudioStep {
    fn stage(&self) -> Stage {
        Stage::RenderAudio
    }

    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.midi_path() {
            Some(midi) if midi.is_file() => {}
            _ => {
                return Err(StepError::invalid_input(
                    "MIDI file not available for audio rendering",
                ))
            }
        }
        if !ctx.tools.soundfont.is_file() {
            return Err(StepError::invalid_input(format!(
                "Soundfont not found: {}",
                ctx.tools.soundfont.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<PathBuf> {
        let midi = state
            .midi_path()
            .ok_or_else(|| StepError::invalid_input("MIDI file not available"))?
            .to_path_buf();

        let waveform = ctx
            .work_dir
            .join(format!("{}.wav", Stage::ARTIFACT_BASE));

        let synth_args = [
            OsString::from("-ni"),
            ctx.tools.soundfont.clone().into_os_string(),
            midi.into_os_string(),
            OsString::from("-F"),
            waveform.clone().into_os_string(),
            OsString::from("-r"),
            OsString::from(SAMPLE_RATE),
        ];
        run_tool(
            &ctx.tools.synthesizer,
            &synth_args,
            Some(&ctx.work_dir),
            &ctx.logger,
        )?;

        if !waveform.is_file() {
            return Err(StepError::artifact_missing(
                "synthesized waveform",
                ctx.work_dir.clone(),
            ));
        }

        let ext = Stage::RenderAudio.standard_extension().unwrap_or("mp3");
        let output = ctx.output_path(&format!("{}.{}", Stage::ARTIFACT_BASE, ext));

        let transcode_args = [
            OsString::from("-y"),
            OsString::from("-i"),
            waveform.clone().into_os_string(),
            OsString::from("-codec:a"),
            OsString::from("libmp3lame"),
            OsString::from("-qscale:a"),
            OsString::from("2"),
            output.clone().into_os_string(),
        ];
        run_tool(
            &ctx.tools.transcoder,
            &transcode_args,
            Some(&ctx.work_dir),
            &ctx.logger,
        )?;

        state.audio = Some(AudioOutput {
            waveform,
            path: output.clone(),
        });

        Ok(output)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        let audio = state
            .audio
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Audio results not recorded"))?;

        if !audio.path.is_file() {
            return Err(StepError::artifact_missing(
                "transcoded MP3",
                ctx.job.output_dir.clone(),
            ));
        }
        Ok(())
    }
}
