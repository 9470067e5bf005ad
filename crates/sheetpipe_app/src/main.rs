//! sheetpipe - convert scanned piano sheet music into MusicXML, PDF,
//! MIDI, and MP3.
//!
//! Usage:
//!   sheetpipe input.pdf -o converted
//!   sheetpipe scores/ --review

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sheetpipe_core::config::ConfigManager;
use sheetpipe_core::jobs::expand_input;
use sheetpipe_core::logging::{init_tracing, LogCallback, LogLevel};
use sheetpipe_core::models::BatchSummary;
use sheetpipe_core::orchestrator::BatchDispatcher;
use sheetpipe_core::tools::resolve_tools;

/// Command-line arguments for sheetpipe.
#[derive(Parser, Debug)]
#[command(name = "sheetpipe")]
#[command(about = "Convert sheet music images/PDFs into MusicXML, PDF, MIDI, and MP3")]
#[command(version)]
struct Args {
    /// Input image/PDF file or directory of files
    input: PathBuf,

    /// Directory for generated artifacts
    #[arg(short, long, env = "SHEETPIPE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Open each produced artifact in an external viewer
    #[arg(long)]
    review: bool,

    /// Config file path
    #[arg(short, long, default_value = "sheetpipe.toml", env = "SHEETPIPE_CONFIG")]
    config: PathBuf,

    /// Override the notation renderer binary (MuseScore)
    #[arg(long, env = "SHEETPIPE_RENDERER")]
    renderer: Option<PathBuf>,

    /// Override the soundfont used for audio synthesis
    #[arg(long, env = "SHEETPIPE_SOUNDFONT")]
    soundfont: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    match run(args) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("sheetpipe: {}", message);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode, String> {
    let mut config = ConfigManager::new(&args.config);
    config
        .load_or_create()
        .map_err(|e| format!("config: {}", e))?;

    // CLI overrides beat the config file
    if let Some(dir) = &args.output_dir {
        config.settings_mut().paths.output_folder = dir.to_string_lossy().to_string();
    }
    if let Some(renderer) = &args.renderer {
        config.settings_mut().tools.renderer = renderer.to_string_lossy().to_string();
    }
    if let Some(soundfont) = &args.soundfont {
        config.settings_mut().tools.soundfont = soundfont.to_string_lossy().to_string();
    }

    config
        .ensure_dirs_exist()
        .map_err(|e| format!("config: {}", e))?;

    let settings = config.settings().clone();

    // Environment gate: every stage binary must resolve before any job
    // is created.
    let tools = resolve_tools(&settings.tools).map_err(|e| e.to_string())?;

    let output_root = PathBuf::from(&settings.paths.output_folder);
    let jobs = expand_input(&args.input, &output_root, args.review)
        .map_err(|e| e.to_string())?;

    println!(
        "Converting {} input file(s) into {}",
        jobs.len(),
        output_root.display()
    );

    let dispatcher = BatchDispatcher::new(settings, tools).with_log_callback_factory(
        Box::new(|job_name: &str| -> Option<LogCallback> {
            let prefix = format!("[{}]", job_name);
            Some(Box::new(move |line| println!("{} {}", prefix, line)))
        }),
    );

    let summary = dispatcher.run(&jobs);
    print_summary(&summary);

    if summary.any_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Print the per-job outcome listing: completed stages, artifact paths,
/// and an explicit failure reason for incomplete jobs.
fn print_summary(summary: &BatchSummary) {
    println!();
    println!(
        "Batch summary: {} succeeded, {} failed ({} total)",
        summary.succeeded_count(),
        summary.failed_count(),
        summary.job_count()
    );

    for report in &summary.reports {
        println!();
        println!("  {} [{}]", report.job_name, report.status);

        for stage in &report.stages {
            let mark = if stage.is_success() { "ok" } else { "FAILED" };
            println!("    {:<12} {}", stage.stage.name(), mark);
        }
        for artifact in &report.artifacts {
            println!("    -> {}", artifact.display());
        }
        if let Some(reason) = &report.failure_reason {
            println!("    reason: {}", reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_minimal() {
        let args = Args::try_parse_from(["sheetpipe", "score.pdf"]).unwrap();
        assert_eq!(args.input, PathBuf::from("score.pdf"));
        assert!(!args.review);
        assert_eq!(args.config, PathBuf::from("sheetpipe.toml"));
    }

    #[test]
    fn args_parse_full() {
        let args = Args::try_parse_from([
            "sheetpipe",
            "scores/",
            "-o",
            "converted",
            "--review",
            "--renderer",
            "/opt/mscore",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(args.output_dir, Some(PathBuf::from("converted")));
        assert!(args.review);
        assert_eq!(args.renderer, Some(PathBuf::from("/opt/mscore")));
        assert!(args.verbose);
    }

    #[test]
    fn args_require_input() {
        assert!(Args::try_parse_from(["sheetpipe"]).is_err());
    }
}
