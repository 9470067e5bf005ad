//! Bounded search for stage output artifacts.
//!
//! The recognition engine's output naming and nesting are
//! version-dependent: compressed vs. uncompressed extension, placed
//! directly in the export directory or inside a generated subfolder.
//! Rather than hard-coding a path per engine version, stages ask this
//! locator to find the output under a deterministic precedence policy.
//! The policy lives only here - never per stage.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One file seen while scanning a directory level.
struct Candidate {
    path: PathBuf,
    file_name: String,
    modified: SystemTime,
}

/// Search `work_dir` for a stage output file, breadth-first, up to
/// `max_depth` levels below the directory itself (depth 0).
///
/// Precedence at each depth level:
/// 1. extension candidates in the given order (preferred before fallback)
/// 2. within an extension, exact base-name match before case-insensitive
///
/// The first match at the shallowest depth wins. If several files at one
/// depth match the same candidate class, the most recently modified one
/// is returned, which keeps the search deterministic on an unchanged
/// tree.
///
/// Returns `None` when nothing matches anywhere in the search space -
/// callers decide whether that is fatal.
pub fn locate(
    work_dir: &Path,
    base_candidates: &[&str],
    ext_candidates: &[&str],
    max_depth: u32,
) -> Option<PathBuf> {
    let mut current_dirs = vec![work_dir.to_path_buf()];

    for _depth in 0..=max_depth {
        if current_dirs.is_empty() {
            return None;
        }

        let mut files = Vec::new();
        let mut next_dirs = Vec::new();

        for dir in &current_dirs {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if path.is_dir() {
                    next_dirs.push(path);
                } else if path.is_file() {
                    let modified = entry
                        .metadata()
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    files.push(Candidate {
                        file_name: entry.file_name().to_string_lossy().to_string(),
                        path,
                        modified,
                    });
                }
            }
        }

        if let Some(found) = match_level(&files, base_candidates, ext_candidates) {
            return Some(found);
        }

        // Deterministic descent order
        next_dirs.sort();
        current_dirs = next_dirs;
    }

    None
}

/// Apply the candidate precedence to one depth level.
fn match_level(
    files: &[Candidate],
    base_candidates: &[&str],
    ext_candidates: &[&str],
) -> Option<PathBuf> {
    for ext in ext_candidates {
        for base in base_candidates {
            let wanted = format!("{}.{}", base, ext);

            if let Some(path) = newest_match(files, |name| name == wanted) {
                return Some(path);
            }
        }
        for base in base_candidates {
            let wanted = format!("{}.{}", base, ext).to_lowercase();

            if let Some(path) = newest_match(files, |name| name.to_lowercase() == wanted) {
                return Some(path);
            }
        }
    }
    None
}

/// Most recently modified file whose name satisfies the predicate.
fn newest_match(files: &[Candidate], matches: impl Fn(&str) -> bool) -> Option<PathBuf> {
    files
        .iter()
        .filter(|c| matches(&c.file_name))
        .max_by_key(|c| c.modified)
        .map(|c| c.path.clone())
}
