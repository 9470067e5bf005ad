//! Low-level external tool invocation.
//!
//! Runs one stage processor with a given working directory, blocks until
//! it terminates, and reports the exit status. Output is captured and
//! fed to the job logger's tail buffer so failures carry the last lines
//! of the tool's diagnostics.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::logging::JobLogger;

/// Errors from invoking an external tool.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The binary could not be spawned because it does not exist.
    ///
    /// Environment failure, distinct from the tool's own non-zero exit.
    #[error("Stage binary not found: {program}")]
    BinaryMissing { program: String },

    /// The binary exists but spawning failed.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited non-zero.
    #[error("{tool} failed with exit code {exit_code}:\n{tail}")]
    ToolFailed {
        tool: String,
        exit_code: i32,
        tail: String,
    },
}

impl InvokeError {
    /// The tool's exit code, when it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            InvokeError::ToolFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Display name of a program for logs and errors.
fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

/// Run one external stage processor and wait for it to terminate.
///
/// Captured stdout/stderr lines go to the logger (tail buffer in compact
/// mode). A clean exit returns `Ok(0)`; anything else is an error - the
/// caller never sees an exit status paired with success.
pub fn run_tool(
    program: &Path,
    args: &[OsString],
    cwd: Option<&Path>,
    logger: &JobLogger,
) -> Result<i32, InvokeError> {
    let name = program_name(program);

    logger.clear_tail();
    logger.command(&format!(
        "{} {}",
        program.display(),
        args.iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    ));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    tracing::debug!("Running {} with {} arg(s)", name, args.len());

    let output = cmd.output().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            InvokeError::BinaryMissing {
                program: program.display().to_string(),
            }
        } else {
            InvokeError::Spawn {
                program: program.display().to_string(),
                source: e,
            }
        }
    })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        logger.output_line(line, false);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        logger.output_line(line, true);
    }

    let exit_code = output.status.code().unwrap_or(-1);
    if !output.status.success() {
        logger.show_tail(&name);
        return Err(InvokeError::ToolFailed {
            tool: name,
            exit_code,
            tail: logger.get_tail().join("\n"),
        });
    }

    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn test_logger(dir: &Path) -> JobLogger {
        JobLogger::new("invoker_test", dir, LogConfig::default(), None).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn clean_exit_returns_zero() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let sh = crate::tools::find_in_path("sh").unwrap();

        let code = run_tool(
            &sh,
            &[OsString::from("-c"), OsString::from("echo hello")],
            None,
            &logger,
        )
        .unwrap();
        assert_eq!(code, 0);
        assert!(logger.get_tail().iter().any(|l| l.contains("hello")));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_carries_code_and_tail() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let sh = crate::tools::find_in_path("sh").unwrap();

        let err = run_tool(
            &sh,
            &[
                OsString::from("-c"),
                OsString::from("echo broken >&2; exit 3"),
            ],
            None,
            &logger,
        )
        .unwrap_err();

        match err {
            InvokeError::ToolFailed {
                tool,
                exit_code,
                tail,
            } => {
                assert_eq!(tool, "sh");
                assert_eq!(exit_code, 3);
                assert!(tail.contains("broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_distinct_error() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());

        let err = run_tool(
            &PathBuf::from("/nonexistent/stage-processor"),
            &[],
            None,
            &logger,
        )
        .unwrap_err();

        assert!(matches!(err, InvokeError::BinaryMissing { .. }));
        assert_eq!(err.exit_code(), None);
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_working_directory() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let sh = crate::tools::find_in_path("sh").unwrap();
        let work = tempdir().unwrap();

        run_tool(
            &sh,
            &[OsString::from("-c"), OsString::from("touch marker.txt")],
            Some(work.path()),
            &logger,
        )
        .unwrap();

        assert!(work.path().join("marker.txt").exists());
    }
}
