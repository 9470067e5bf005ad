//! Optional post-stage review hook.
//!
//! Opens each produced artifact in an external viewer, strictly as a
//! side effect after the stage transition. The hook is fire-and-forget:
//! the viewer is spawned and never waited on, and every failure is
//! logged and swallowed so it can never alter the pipeline's recorded
//! state.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::logging::JobLogger;

/// Extensions the notation renderer can display directly.
const RENDERER_VIEWABLE: [&str; 4] = ["mxl", "xml", "musicxml", "mid"];

/// Fire-and-forget artifact viewer.
pub struct ReviewHook {
    /// Notation renderer binary, used for its direct-display mode.
    renderer: PathBuf,
}

impl ReviewHook {
    /// Create a hook backed by the resolved notation renderer.
    pub fn new(renderer: PathBuf) -> Self {
        Self { renderer }
    }

    /// Open an artifact in an external viewer.
    ///
    /// Never fails: errors are logged to the job log and discarded.
    pub fn open(&self, artifact: &Path, logger: &JobLogger) {
        match self.spawn_viewer(artifact) {
            Ok(()) => {
                logger.info(&format!("Review: opened {}", artifact.display()));
            }
            Err(e) => {
                logger.warn(&format!(
                    "Review hook failed for {}: {}",
                    artifact.display(),
                    e
                ));
                tracing::warn!("Review hook failed for {}: {}", artifact.display(), e);
            }
        }
    }

    /// Spawn the viewer without waiting for it.
    fn spawn_viewer(&self, artifact: &Path) -> io::Result<()> {
        let ext = artifact
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut cmd = if RENDERER_VIEWABLE.contains(&ext.as_str()) {
            // Score-like artifacts go to the renderer's direct-display mode
            Command::new(&self.renderer)
        } else {
            Command::new(system_opener())
        };

        cmd.arg(artifact)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

/// Platform file opener for artifacts the renderer cannot display.
fn system_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use tempfile::tempdir;

    #[test]
    fn failure_is_swallowed() {
        let dir = tempdir().unwrap();
        let logger =
            JobLogger::new("review_test", dir.path(), LogConfig::default(), None).unwrap();

        let hook = ReviewHook::new(PathBuf::from("/nonexistent/renderer"));
        // Must not panic or propagate
        hook.open(Path::new("/tmp/score.mxl"), &logger);

        logger.flush();
        let content = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("Review hook failed"));
    }

    #[test]
    fn score_artifacts_use_renderer() {
        assert!(RENDERER_VIEWABLE.contains(&"mxl"));
        assert!(RENDERER_VIEWABLE.contains(&"mid"));
        assert!(!RENDERER_VIEWABLE.contains(&"mp3"));
    }
}
