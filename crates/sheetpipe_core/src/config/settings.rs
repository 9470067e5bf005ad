//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Everything has a serde default so a partial config file still loads.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool overrides.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Artifact locator configuration.
    #[serde(default)]
    pub locator: LocatorSettings,
}

/// Path configuration for output, work, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for converted artifacts.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-job working files (recognizer export trees,
    /// synthesis intermediates).
    #[serde(default = "default_work_root")]
    pub work_root: String,

    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_work_root() -> String {
    ".work".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            work_root: default_work_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// External tool configuration.
///
/// Every stage processor can be overridden with an explicit binary path
/// for environments where it is not on the default search path. An empty
/// string means "resolve from PATH".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Optical music recognition engine (Audiveris).
    #[serde(default)]
    pub recognizer: String,

    /// Notation renderer (MuseScore). Also used for MIDI derivation and
    /// the review hook's direct-display mode.
    #[serde(default)]
    pub renderer: String,

    /// Soundfont synthesizer (FluidSynth).
    #[serde(default)]
    pub synthesizer: String,

    /// Audio transcoder (FFmpeg).
    #[serde(default)]
    pub transcoder: String,

    /// Soundfont used for wavetable playback.
    #[serde(default = "default_soundfont")]
    pub soundfont: String,
}

fn default_soundfont() -> String {
    "/usr/share/sounds/sf2/FluidR3_GM.sf2".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            recognizer: String::new(),
            renderer: String::new(),
            synthesizer: String::new(),
            transcoder: String::new(),
            soundfont: default_soundfont(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (filter tool output, show tail on error).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool-output lines to keep for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in per-job log files.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

/// Artifact locator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorSettings {
    /// Maximum directory depth to search for stage output. Depth 0 is
    /// the working directory itself.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_max_depth() -> u32 {
    3
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}
