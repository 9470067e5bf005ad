//! Batch dispatcher for running jobs through the pipeline.
//!
//! Each job is run independently: a failure in one job's pipeline is
//! caught, recorded in that job's report, and does not stop the
//! remaining jobs. Jobs run one at a time in the order they were
//! expanded - stage processors are resource-heavy and assume exclusive
//! use of external tool state.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::jobs::Job;
use crate::logging::{JobLogger, LogCallback, LogConfig};
use crate::models::{BatchSummary, PipelineReport};
use crate::tools::ResolvedTools;

use super::create_standard_pipeline;
use super::errors::PipelineError;
use super::review::ReviewHook;
use super::types::{Context, JobState};

/// Factory producing an optional per-job log mirror callback.
pub type LogCallbackFactory = Box<dyn Fn(&str) -> Option<LogCallback>>;

/// Dispatcher that runs each job through the standard pipeline.
pub struct BatchDispatcher {
    /// Application settings.
    settings: Settings,
    /// Resolved stage processors, shared by every job.
    tools: ResolvedTools,
    /// Optional factory for per-job log mirror callbacks.
    log_callback_factory: Option<LogCallbackFactory>,
}

impl BatchDispatcher {
    /// Create a new dispatcher.
    ///
    /// `tools` must already be resolved: environment failures abort
    /// before any job exists, never inside the batch.
    pub fn new(settings: Settings, tools: ResolvedTools) -> Self {
        Self {
            settings,
            tools,
            log_callback_factory: None,
        }
    }

    /// Set a factory creating a log mirror callback per job name.
    pub fn with_log_callback_factory(mut self, factory: LogCallbackFactory) -> Self {
        self.log_callback_factory = Some(factory);
        self
    }

    /// Run every job, in order, and aggregate the summary.
    pub fn run(&self, jobs: &[Job]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (i, job) in jobs.iter().enumerate() {
            tracing::info!("Processing job {}/{}: {}", i + 1, jobs.len(), job.name);
            summary.reports.push(self.run_job(job));
        }

        tracing::info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded_count(),
            summary.failed_count()
        );

        summary
    }

    /// Run a single job through the pipeline.
    ///
    /// All pipeline errors are downgraded to the report's status; this
    /// never propagates an error to the batch loop.
    pub fn run_job(&self, job: &Job) -> PipelineReport {
        let work_dir = PathBuf::from(&self.settings.paths.work_root).join(&job.id);
        if let Err(e) = fs::create_dir_all(&work_dir) {
            let err = PipelineError::setup_failed(
                &job.name,
                format!("Failed to create work directory: {}", e),
            );
            return PipelineReport::from_stages(
                &job.name,
                job.source.clone(),
                Vec::new(),
                Some(err.to_string()),
            );
        }

        let callback = self
            .log_callback_factory
            .as_ref()
            .and_then(|factory| factory(&job.name));

        let logger = match JobLogger::new(
            &job.name,
            &self.settings.paths.logs_folder,
            LogConfig::from_settings(&self.settings.logging),
            callback,
        ) {
            Ok(logger) => Arc::new(logger),
            Err(e) => {
                let err = PipelineError::setup_failed(
                    &job.name,
                    format!("Failed to create logger: {}", e),
                );
                return PipelineReport::from_stages(
                    &job.name,
                    job.source.clone(),
                    Vec::new(),
                    Some(err.to_string()),
                );
            }
        };

        let mut ctx = Context::new(
            job.clone(),
            self.settings.clone(),
            self.tools.clone(),
            work_dir,
            logger,
        );
        if job.review {
            ctx = ctx.with_review_hook(ReviewHook::new(self.tools.renderer.clone()));
        }

        let mut state = JobState::new(&job.id);
        let pipeline = create_standard_pipeline();

        ctx.logger.info(&format!(
            "Starting job: {} ({})",
            job.name,
            job.source.display()
        ));

        let failure_reason = match pipeline.run(&ctx, &mut state) {
            Ok(()) => None,
            Err(e) => {
                ctx.logger.error(&e.to_string());
                Some(e.to_string())
            }
        };

        ctx.logger.flush();

        PipelineReport::from_stages(&job.name, job.source.clone(), state.stages, failure_reason)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::jobs::expand_input;
    use crate::models::{JobStatus, Stage};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Stub recognizer honoring the real argument contract:
    /// `-batch <input> -export -output <dir>`. Inputs whose stem is
    /// "bad" exit cleanly without producing any score.
    fn stub_recognizer(dir: &Path) -> PathBuf {
        write_script(
            dir,
            "audiveris",
            r#"input="$2"
outdir="$5"
mkdir -p "$outdir"
base=$(basename "$input")
stem="${base%.*}"
[ "$stem" = "bad" ] && exit 0
mkdir -p "$outdir/$stem"
echo score > "$outdir/$stem/$stem.mxl""#,
        )
    }

    /// Stub renderer: `<score> -o <out>`.
    fn stub_renderer(dir: &Path) -> PathBuf {
        write_script(dir, "mscore", r#"echo rendered > "$3""#)
    }

    /// Stub synthesizer: `-ni <sf2> <mid> -F <wav> -r <rate>`.
    fn stub_synthesizer(dir: &Path) -> PathBuf {
        write_script(dir, "fluidsynth", r#"echo waveform > "$5""#)
    }

    /// Stub transcoder: output path is the last argument.
    fn stub_transcoder(dir: &Path) -> PathBuf {
        write_script(
            dir,
            "ffmpeg",
            r#"for last; do :; done
echo audio > "$last""#,
        )
    }

    struct Fixture {
        root: TempDir,
        settings: Settings,
        tools: ResolvedTools,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempdir().unwrap();
            let bin = root.path().join("bin");
            fs::create_dir_all(&bin).unwrap();

            let soundfont = root.path().join("font.sf2");
            fs::write(&soundfont, b"sf2").unwrap();

            let tools = ResolvedTools {
                recognizer: stub_recognizer(&bin),
                renderer: stub_renderer(&bin),
                synthesizer: stub_synthesizer(&bin),
                transcoder: stub_transcoder(&bin),
                soundfont,
            };

            let mut settings = Settings::default();
            settings.paths.output_folder =
                root.path().join("output").to_string_lossy().to_string();
            settings.paths.work_root = root.path().join("work").to_string_lossy().to_string();
            settings.paths.logs_folder = root.path().join("logs").to_string_lossy().to_string();

            Self {
                root,
                settings,
                tools,
            }
        }

        fn add_input(&self, name: &str) {
            let input_dir = self.root.path().join("input");
            fs::create_dir_all(&input_dir).unwrap();
            fs::write(input_dir.join(name), b"input").unwrap();
        }

        fn jobs(&self) -> Vec<Job> {
            expand_input(
                &self.root.path().join("input"),
                &PathBuf::from(&self.settings.paths.output_folder),
                false,
            )
            .unwrap()
        }

        fn dispatcher(&self) -> BatchDispatcher {
            BatchDispatcher::new(self.settings.clone(), self.tools.clone())
        }

        fn output_dir(&self, name: &str) -> PathBuf {
            self.root.path().join("output").join(name)
        }
    }

    #[test]
    fn end_to_end_batch_with_one_failure() {
        let fx = Fixture::new();
        fx.add_input("a.pdf");
        fx.add_input("bad.pdf");

        let jobs = fx.jobs();
        assert_eq!(jobs.len(), 2);

        let summary = fx.dispatcher().run(&jobs);

        assert_eq!(summary.succeeded_count(), 1);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(
            summary.succeeded_count() + summary.failed_count(),
            summary.job_count()
        );

        // a: all four normalized artifacts
        let a_out = fx.output_dir("a");
        assert!(a_out.join("score.mxl").is_file());
        assert!(a_out.join("score.pdf").is_file());
        assert!(a_out.join("score.mid").is_file());
        assert!(a_out.join("score.mp3").is_file());

        // bad: recognition found no artifact, nothing was produced
        assert!(!fx.output_dir("bad").exists());

        let bad_report = summary
            .reports
            .iter()
            .find(|r| r.job_name == "bad")
            .unwrap();
        assert_eq!(bad_report.status, JobStatus::Failed);
        assert!(bad_report.failure_reason.is_some());
        assert_eq!(bad_report.stages.len(), 1);
        assert_eq!(bad_report.stages[0].stage, Stage::Recognize);
    }

    #[test]
    fn failed_job_does_not_stop_the_batch() {
        let fx = Fixture::new();
        // Sorted order puts the failing input first
        fx.add_input("bad.pdf");
        fx.add_input("good.pdf");

        let jobs = fx.jobs();
        assert_eq!(jobs[0].name, "bad");

        let summary = fx.dispatcher().run(&jobs);

        assert_eq!(summary.reports[0].status, JobStatus::Failed);
        assert_eq!(summary.reports[1].status, JobStatus::Success);
        assert!(fx.output_dir("good").join("score.mp3").is_file());
    }

    #[test]
    fn later_stage_failure_yields_partial_status() {
        let fx = Fixture::new();
        fx.add_input("a.pdf");

        let mut tools = fx.tools.clone();
        tools.renderer = write_script(
            &fx.root.path().join("bin"),
            "mscore-broken",
            "echo render error >&2; exit 4",
        );

        let dispatcher = BatchDispatcher::new(fx.settings.clone(), tools);
        let summary = dispatcher.run(&fx.jobs());

        let report = &summary.reports[0];
        assert_eq!(report.status, JobStatus::Partial);
        assert_eq!(report.stages.len(), 2);
        assert!(report.stages[0].is_success());
        assert!(!report.stages[1].is_success());
        assert_eq!(report.stages[1].exit_code, Some(4));
        assert!(report.failure_reason.as_deref().unwrap().contains("RenderPdf"));
    }

    #[test]
    fn per_job_log_files_are_written() {
        let fx = Fixture::new();
        fx.add_input("a.pdf");

        fx.dispatcher().run(&fx.jobs());

        let log = fx.root.path().join("logs").join("a.log");
        let content = fs::read_to_string(log).unwrap();
        assert!(content.contains("=== Recognize ==="));
        assert!(content.contains("Pipeline completed successfully"));
    }
}
