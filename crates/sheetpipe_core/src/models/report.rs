//! Per-stage, per-job, and per-batch outcome records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{JobStatus, Stage};

/// Outcome of one stage invocation.
///
/// A result never pairs a located artifact with a failed exit status:
/// the only constructors are `success` (artifact, exit 0) and `failure`
/// (no artifact).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Which stage ran.
    pub stage: Stage,
    /// Located artifact path; absent on failure.
    artifact: Option<PathBuf>,
    /// Exit status of the stage processor. `None` when the processor
    /// never ran to completion (spawn failure, missing output).
    pub exit_code: Option<i32>,
    /// Wall-clock time spent in the stage, in milliseconds.
    pub elapsed_ms: u64,
}

impl StageResult {
    /// Record a successful stage: the artifact was produced and located.
    pub fn success(stage: Stage, artifact: PathBuf, elapsed_ms: u64) -> Self {
        Self {
            stage,
            artifact: Some(artifact),
            exit_code: Some(0),
            elapsed_ms,
        }
    }

    /// Record a failed stage.
    pub fn failure(stage: Stage, exit_code: Option<i32>, elapsed_ms: u64) -> Self {
        Self {
            stage,
            artifact: None,
            exit_code,
            elapsed_ms,
        }
    }

    /// Whether the stage produced a located artifact.
    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }

    /// The located artifact path, if any.
    pub fn artifact(&self) -> Option<&PathBuf> {
        self.artifact.as_ref()
    }
}

/// Per-job outcome: the ordered stage results and the derived status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Job name (derived from the input file).
    pub job_name: String,
    /// Source file the job was created for.
    pub source: PathBuf,
    /// Ordered results for every stage that was attempted.
    pub stages: Vec<StageResult>,
    /// Final status derived from the stage results.
    pub status: JobStatus,
    /// Paths of all produced artifacts, in stage order.
    pub artifacts: Vec<PathBuf>,
    /// Explicit failure reason for incomplete jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl PipelineReport {
    /// Build a report from the stages that were attempted.
    ///
    /// Status rules:
    /// - `Success` iff every pipeline stage produced a located artifact
    /// - `Failed` iff the first stage failed (or no stage ran at all)
    /// - `Partial` otherwise
    pub fn from_stages(
        job_name: impl Into<String>,
        source: PathBuf,
        stages: Vec<StageResult>,
        failure_reason: Option<String>,
    ) -> Self {
        let succeeded = stages.iter().filter(|s| s.is_success()).count();
        let status = if succeeded == Stage::ALL.len() {
            JobStatus::Success
        } else if succeeded == 0 {
            JobStatus::Failed
        } else {
            JobStatus::Partial
        };

        let artifacts = stages
            .iter()
            .filter_map(|s| s.artifact().cloned())
            .collect();

        Self {
            job_name: job_name.into(),
            source,
            stages,
            status,
            artifacts,
            failure_reason,
        }
    }

    /// Whether every stage completed.
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Success
    }
}

/// Aggregate over all jobs in one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Per-job reports, in processing order.
    pub reports: Vec<PipelineReport>,
}

impl BatchSummary {
    /// Number of jobs in the batch.
    pub fn job_count(&self) -> usize {
        self.reports.len()
    }

    /// Number of fully succeeded jobs.
    pub fn succeeded_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    /// Number of jobs that did not fully succeed (partial or failed).
    pub fn failed_count(&self) -> usize {
        self.job_count() - self.succeeded_count()
    }

    /// Whether the invocation as a whole succeeded: at least one job
    /// fully completed.
    pub fn any_succeeded(&self) -> bool {
        self.succeeded_count() > 0
    }
}
