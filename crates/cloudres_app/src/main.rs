use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cloudres_app::logging::{self, LogDestination};
use cloudres_app::{render, AppConfig, RunOrchestrator, DEFAULT_CONFIG_FILENAME};
use cloudres_core::{FileDescriptor, PhaseKind};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "cloudres",
    version,
    about = "Upload sequencing reads to the CloudRes analysis service and fetch the results"
)]
struct Cli {
    /// RON configuration file; missing means defaults
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Base URL of the analysis service (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Seconds between status checks (overrides the config file)
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Give up after this many seconds without a final result
    #[arg(long)]
    timeout: Option<u64>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload files, follow the pipeline and print its results
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Fetch the results of an existing run
    Lookup { run_id: String },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval_secs = secs;
    }
    let settings = config
        .service_settings()
        .context("invalid service settings")?;

    let mut orchestrator = RunOrchestrator::new(settings.clone());
    let mut last_line = String::new();
    orchestrator.subscribe(move |view| {
        let line = render::status_line(view);
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
    });

    match cli.command {
        Command::Upload { files } => {
            let candidates = describe_files(&files)?;
            let (selection, rejected) = config.selection.screen(candidates);
            for line in render::format_rejected(&rejected) {
                eprintln!("{line}");
            }
            if selection.is_empty() {
                bail!("no acceptable files to upload");
            }
            orchestrator.select_files(selection);
            for line in render::format_selection(&orchestrator.view()) {
                println!("{line}");
            }
            orchestrator.submit();
        }
        Command::Lookup { run_id } => {
            orchestrator.lookup(&run_id);
            if orchestrator.state().pending_lookup().is_none() {
                bail!("{}", orchestrator.state().message());
            }
        }
    }

    if !orchestrator.run_until_settled(cli.timeout.map(Duration::from_secs)) {
        bail!("timed out waiting for the run to finish");
    }

    let view = orchestrator.view();
    if let Some(summary) = render::summary(&view) {
        print!("{summary}");
    }
    for link in render::report_links(&settings, &view) {
        println!("{link}");
    }

    Ok(if view.phase == PhaseKind::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn describe_files(paths: &[PathBuf]) -> Result<Vec<FileDescriptor>> {
    paths
        .iter()
        .map(|path| {
            let metadata = fs::metadata(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            if !metadata.is_file() {
                bail!("{} is not a file", path.display());
            }
            Ok(FileDescriptor::new(path.clone(), metadata.len()))
        })
        .collect()
}
