//! Job discovery from the input path.
//!
//! Expands a single file or a directory into an ordered list of jobs,
//! one per accepted input file, each with a distinct output
//! subdirectory under the output root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use super::types::Job;

/// Input extensions accepted when expanding a directory.
pub const SUPPORTED_EXTS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "tif", "tiff"];

/// Errors from job discovery.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Input path not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No supported input files (pdf/png/jpg/jpeg/tif/tiff) in directory: {0}")]
    NoInputs(PathBuf),

    #[error("Failed to read input directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check whether a path has an accepted input extension.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let ext = e.to_string_lossy().to_lowercase();
            SUPPORTED_EXTS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Generate a unique job ID.
fn generate_job_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let suffix: u32 = rand::random::<u32>() % 10000;
    format!("job_{}_{:04}", timestamp, suffix)
}

/// Simple random number generator for job IDs (no external dependency).
mod rand {
    use std::cell::Cell;
    use std::time::{SystemTime, UNIX_EPOCH};

    thread_local! {
        static SEED: Cell<u64> = Cell::new(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(12345)
        );
    }

    pub fn random<T: From<u32>>() -> T {
        SEED.with(|seed| {
            // xorshift
            let mut x = seed.get();
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            seed.set(x);
            T::from((x & 0xFFFFFFFF) as u32)
        })
    }
}

/// Allocate a job name that is unique within this batch.
///
/// Inputs differing only by extension (`a.pdf` and `a.png`) would
/// otherwise share an output subdirectory; the later one gets a numeric
/// suffix.
fn allocate_name(stem: &str, used: &mut HashSet<String>) -> String {
    if used.insert(stem.to_string()) {
        return stem.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Expand the input path into an ordered list of jobs.
///
/// - A directory becomes one job per regular file with an accepted
///   extension, sorted by file name for deterministic ordering.
/// - A single file becomes exactly one job (the stage processors decide
///   whether they can read it).
///
/// Each job's output directory is `<output_root>/<name>`; directories
/// are not created here.
pub fn expand_input(
    input: &Path,
    output_root: &Path,
    review: bool,
) -> Result<Vec<Job>, DiscoveryError> {
    if !input.exists() {
        return Err(DiscoveryError::InputNotFound(input.to_path_buf()));
    }

    let sources: Vec<PathBuf> = if input.is_dir() {
        let entries = std::fs::read_dir(input).map_err(|e| DiscoveryError::ReadDir {
            path: input.to_path_buf(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_supported_input(p))
            .collect();
        files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        if files.is_empty() {
            return Err(DiscoveryError::NoInputs(input.to_path_buf()));
        }
        files
    } else {
        vec![input.to_path_buf()]
    };

    let mut used_names = HashSet::new();
    let jobs: Vec<Job> = sources
        .into_iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let name = allocate_name(&stem, &mut used_names);
            let output_dir = output_root.join(&name);
            Job::new(generate_job_id(), name, source, output_dir, review)
        })
        .collect();

    tracing::info!("Expanded input into {} job(s)", jobs.len());

    Ok(jobs)
}
