//! Job types and data structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One input file to be processed.
///
/// Created by input expansion; immutable once created. Each job owns a
/// distinct output subdirectory so two jobs can never collide on
/// artifact names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Display name (derived from the source filename, deduplicated
    /// within the batch).
    pub name: String,
    /// Input image/PDF path.
    pub source: PathBuf,
    /// Per-job output directory for normalized artifacts.
    pub output_dir: PathBuf,
    /// Open each produced artifact in an external viewer.
    pub review: bool,
}

impl Job {
    /// Create a new job.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: PathBuf,
        output_dir: PathBuf,
        review: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source,
            output_dir,
            review,
        }
    }

    /// File stem of the source input.
    pub fn source_stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}
