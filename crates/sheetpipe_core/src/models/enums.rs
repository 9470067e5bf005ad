//! Core enums used throughout the pipeline.

use serde::{Deserialize, Serialize};

/// One stage of the conversion pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Optical music recognition: image/PDF -> symbolic score.
    Recognize,
    /// Notation rendering: symbolic score -> PDF.
    RenderPdf,
    /// MIDI derivation: symbolic score -> MIDI file.
    DeriveMidi,
    /// Audio synthesis: MIDI -> MP3 (soundfont playback + transcode).
    RenderAudio,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Recognize,
        Stage::RenderPdf,
        Stage::DeriveMidi,
        Stage::RenderAudio,
    ];

    /// Get the stage name (for logging and error context).
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Recognize => "Recognize",
            Stage::RenderPdf => "RenderPdf",
            Stage::DeriveMidi => "DeriveMidi",
            Stage::RenderAudio => "RenderAudio",
        }
    }

    /// Standard extension of this stage's normalized output artifact.
    ///
    /// `None` for recognition: its extension depends on whether the
    /// engine exported a compressed (`.mxl`) or plain (`.xml`) score.
    pub fn standard_extension(&self) -> Option<&'static str> {
        match self {
            Stage::Recognize => None,
            Stage::RenderPdf => Some("pdf"),
            Stage::DeriveMidi => Some("mid"),
            Stage::RenderAudio => Some("mp3"),
        }
    }

    /// Base name shared by all normalized artifacts in a job's output
    /// directory (`score.mxl`, `score.pdf`, ...).
    pub const ARTIFACT_BASE: &'static str = "score";
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Final status of one job's pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Every stage produced a located artifact.
    Success,
    /// At least one stage succeeded before the first failure.
    Partial,
    /// The first stage failed (or the job never ran a stage).
    #[default]
    Failed,
}

impl JobStatus {
    /// Get display string for summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert_eq!(Stage::ALL[0], Stage::Recognize);
        assert_eq!(Stage::ALL[3], Stage::RenderAudio);
    }

    #[test]
    fn derived_stages_have_fixed_extensions() {
        assert_eq!(Stage::Recognize.standard_extension(), None);
        assert_eq!(Stage::RenderPdf.standard_extension(), Some("pdf"));
        assert_eq!(Stage::DeriveMidi.standard_extension(), Some("mid"));
        assert_eq!(Stage::RenderAudio.standard_extension(), Some("mp3"));
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::RenderPdf).unwrap();
        assert_eq!(json, "\"render_pdf\"");
    }
}
