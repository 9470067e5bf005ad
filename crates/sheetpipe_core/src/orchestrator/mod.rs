//! Pipeline orchestrator for coordinating job execution.
//!
//! This module provides the infrastructure for running the four-stage
//! conversion pipeline. Each job is a sequence of stages that validate,
//! execute, and record their results; each stage's located artifact
//! becomes the next stage's input.
//!
//! # Architecture
//!
//! ```text
//! BatchDispatcher
//!     └── Pipeline (per job)
//!             ├── Stage: Recognize    image/PDF -> symbolic score
//!             ├── Stage: RenderPdf    score     -> PDF
//!             ├── Stage: DeriveMidi   score     -> MIDI
//!             └── Stage: RenderAudio  MIDI      -> MP3
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sheetpipe_core::orchestrator::{BatchDispatcher, create_standard_pipeline};
//!
//! let tools = resolve_tools(&settings.tools)?;   // fatal if anything is missing
//! let jobs = expand_input(&input, &output_root, false)?;
//! let summary = BatchDispatcher::new(settings, tools).run(&jobs);
//! println!("{}/{} succeeded", summary.succeeded_count(), summary.job_count());
//! ```

mod batch;
mod errors;
mod pipeline;
mod review;
pub mod stages;
mod step;
mod types;

pub use batch::{BatchDispatcher, LogCallbackFactory};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::Pipeline;
pub use review::ReviewHook;
pub use stages::{DeriveMidiStep, RecognizeStep, RenderAudioStep, RenderPdfStep};
pub use step::PipelineStep;
pub use types::{AudioOutput, Context, JobState, MidiOutput, PdfOutput, ScoreOutput};

/// Create the standard pipeline with all four stages in order.
///
/// 1. Recognize - optical music recognition of the input image/PDF
/// 2. RenderPdf - re-render the symbolic score as PDF
/// 3. DeriveMidi - derive a MIDI performance from the score
/// 4. RenderAudio - synthesize and transcode the MIDI to MP3
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(RecognizeStep::new())
        .with_step(RenderPdfStep::new())
        .with_step(DeriveMidiStep::new())
        .with_step(RenderAudioStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_has_four_ordered_stages() {
        let pipeline = create_standard_pipeline();
        assert_eq!(pipeline.step_count(), 4);
        assert_eq!(
            pipeline.stage_names(),
            vec!["Recognize", "RenderPdf", "DeriveMidi", "RenderAudio"]
        );
    }
}
