//! Stage processor resolution on the execution search path.
//!
//! All required external binaries are resolved once, before any job
//! runs. A missing binary is an environment failure, fatal to the whole
//! invocation, and must be distinguishable from a stage's own non-zero
//! exit later on.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ToolSettings;

/// The external stage processors the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Optical music recognition engine.
    Recognizer,
    /// Notation renderer (also derives MIDI and backs the review hook).
    Renderer,
    /// Soundfont synthesizer.
    Synthesizer,
    /// Audio transcoder.
    Transcoder,
}

impl ToolKind {
    /// All required tools.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Recognizer,
        ToolKind::Renderer,
        ToolKind::Synthesizer,
        ToolKind::Transcoder,
    ];

    /// Human-readable role of the tool.
    pub fn role(&self) -> &'static str {
        match self {
            ToolKind::Recognizer => "music recognition engine",
            ToolKind::Renderer => "notation renderer",
            ToolKind::Synthesizer => "soundfont synthesizer",
            ToolKind::Transcoder => "audio transcoder",
        }
    }

    /// Binary name candidates on PATH, in precedence order.
    ///
    /// The renderer ships under different names depending on the
    /// MuseScore version and packaging.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Recognizer => &["audiveris"],
            ToolKind::Renderer => &["mscore", "musescore", "mscore3"],
            ToolKind::Synthesizer => &["fluidsynth"],
            ToolKind::Transcoder => &["ffmpeg"],
        }
    }

    /// The configured override for this tool, if any.
    fn override_path<'a>(&self, settings: &'a ToolSettings) -> &'a str {
        match self {
            ToolKind::Recognizer => &settings.recognizer,
            ToolKind::Renderer => &settings.renderer,
            ToolKind::Synthesizer => &settings.synthesizer,
            ToolKind::Transcoder => &settings.transcoder,
        }
    }
}

/// Environment failure: a required external dependency is unresolvable.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error(
        "{role} not found on PATH (tried: {candidates}). \
         Install it and verify with: command -v {first}"
    )]
    ToolNotFound {
        role: &'static str,
        candidates: String,
        first: &'static str,
    },

    #[error("Configured {role} binary does not exist: {path}")]
    OverrideNotFound { role: &'static str, path: PathBuf },

    #[error("Soundfont not found: {path}")]
    SoundfontNotFound { path: PathBuf },
}

/// Absolute paths of all resolved stage processors.
#[derive(Debug, Clone)]
pub struct ResolvedTools {
    pub recognizer: PathBuf,
    pub renderer: PathBuf,
    pub synthesizer: PathBuf,
    pub transcoder: PathBuf,
    pub soundfont: PathBuf,
}

impl ResolvedTools {
    /// Path for the given tool kind.
    pub fn path(&self, kind: ToolKind) -> &Path {
        match kind {
            ToolKind::Recognizer => &self.recognizer,
            ToolKind::Renderer => &self.renderer,
            ToolKind::Synthesizer => &self.synthesizer,
            ToolKind::Transcoder => &self.transcoder,
        }
    }
}

/// Find an executable on the PATH environment variable.
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let full = dir.join(tool);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{tool}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Resolve one tool: configured override first, then PATH candidates.
fn resolve_tool(kind: ToolKind, settings: &ToolSettings) -> Result<PathBuf, EnvironmentError> {
    let configured = kind.override_path(settings);
    if !configured.is_empty() {
        let path = PathBuf::from(configured);
        if path.is_file() {
            return Ok(path);
        }
        return Err(EnvironmentError::OverrideNotFound {
            role: kind.role(),
            path,
        });
    }

    for candidate in kind.candidates() {
        if let Some(path) = find_in_path(candidate) {
            return Ok(path);
        }
    }

    Err(EnvironmentError::ToolNotFound {
        role: kind.role(),
        candidates: kind.candidates().join(", "),
        first: kind.candidates()[0],
    })
}

/// Resolve every required stage processor and the soundfont.
///
/// Called once at startup; failure aborts before any job is created.
pub fn resolve_tools(settings: &ToolSettings) -> Result<ResolvedTools, EnvironmentError> {
    let recognizer = resolve_tool(ToolKind::Recognizer, settings)?;
    let renderer = resolve_tool(ToolKind::Renderer, settings)?;
    let synthesizer = resolve_tool(ToolKind::Synthesizer, settings)?;
    let transcoder = resolve_tool(ToolKind::Transcoder, settings)?;

    let soundfont = PathBuf::from(&settings.soundfont);
    if !soundfont.is_file() {
        return Err(EnvironmentError::SoundfontNotFound { path: soundfont });
    }

    tracing::debug!(
        "Resolved tools: recognizer={}, renderer={}, synthesizer={}, transcoder={}",
        recognizer.display(),
        renderer.display(),
        synthesizer.display(),
        transcoder.display()
    );

    Ok(ResolvedTools {
        recognizer,
        renderer,
        synthesizer,
        transcoder,
        soundfont,
    })
}
