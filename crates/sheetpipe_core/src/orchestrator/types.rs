//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::review::ReviewHook;
use crate::config::Settings;
use crate::jobs::Job;
use crate::logging::JobLogger;
use crate::models::StageResult;
use crate::tools::ResolvedTools;

/// Read-only context passed to pipeline stages.
///
/// Contains the job, configuration, and resolved tool paths that stages
/// can read but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// The job being processed.
    pub job: Job,
    /// Application settings.
    pub settings: Settings,
    /// Resolved stage processor paths (explicit, never ambient).
    pub tools: ResolvedTools,
    /// Job-specific working directory (under the work root).
    pub work_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Optional review hook, fired once per produced artifact.
    pub review_hook: Option<ReviewHook>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        job: Job,
        settings: Settings,
        tools: ResolvedTools,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        Self {
            job,
            settings,
            tools,
            work_dir,
            logger,
            review_hook: None,
        }
    }

    /// Attach a review hook.
    pub fn with_review_hook(mut self, hook: ReviewHook) -> Self {
        self.review_hook = Some(hook);
        self
    }

    /// Path of a normalized artifact in the job's output directory.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.job.output_dir.join(file_name)
    }
}

/// Mutable job state that accumulates results from pipeline stages.
///
/// This is the write-once manifest: stages add new data but do not
/// overwrite existing values. Each stage's output is stored in its own
/// section, and every attempt is recorded in `stages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Ordered per-stage results, one per attempted stage.
    #[serde(default)]
    pub stages: Vec<StageResult>,
    /// Recognition output (located + normalized symbolic score).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreOutput>,
    /// Notation rendering output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<PdfOutput>,
    /// MIDI derivation output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi: Option<MidiOutput>,
    /// Audio synthesis output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioOutput>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Check if recognition has completed.
    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }

    /// The normalized symbolic score path (if recognition completed).
    pub fn score_path(&self) -> Option<&Path> {
        self.score.as_ref().map(|s| s.normalized.as_path())
    }

    /// The derived MIDI path (if derivation completed).
    pub fn midi_path(&self) -> Option<&Path> {
        self.midi.as_ref().map(|m| m.path.as_path())
    }
}

/// Output from the recognition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreOutput {
    /// Where the engine actually left the score (ambiguous naming).
    pub located: PathBuf,
    /// The normalized copy in the job's output directory.
    pub normalized: PathBuf,
}

/// Output from the notation rendering stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfOutput {
    /// Path to the rendered PDF.
    pub path: PathBuf,
}

/// Output from the MIDI derivation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiOutput {
    /// Path to the derived MIDI file.
    pub path: PathBuf,
}

/// Output from the audio synthesis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioOutput {
    /// Intermediate waveform in the work directory.
    pub waveform: PathBuf,
    /// Path to the final MP3.
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    #[test]
    fn job_state_tracks_completion() {
        let mut state = JobState::new("job_1");
        assert!(!state.has_score());
        assert!(state.score_path().is_none());

        state.score = Some(ScoreOutput {
            located: PathBuf::from("/work/export/tune.mxl"),
            normalized: PathBuf::from("/out/tune/score.mxl"),
        });

        assert!(state.has_score());
        assert_eq!(
            state.score_path().unwrap(),
            Path::new("/out/tune/score.mxl")
        );
    }

    #[test]
    fn job_state_serializes() {
        let mut state = JobState::new("job_2");
        state
            .stages
            .push(StageResult::failure(Stage::Recognize, Some(1), 42));

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"job_id\":\"job_2\""));
        assert!(json.contains("\"recognize\""));
    }
}
