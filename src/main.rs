//! CLI entry point for the vikdir tool.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use vikdir_core::{
    DirectoryError, DirectoryPipeline, ErrorKind, FetchSettings, HttpFetcher, JsonLinesSink,
    PipelineSettings, RunMode, TextSink, TftpClient, TftpSettings, WalkSummary,
};

mod cli;

use cli::{Args, OutputFormat};

/// Process outcome mapped onto the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
    Usage,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
            ProcessExit::Usage => ExitCode::from(2),
        }
    }
}

fn exit_for(error: &anyhow::Error) -> ProcessExit {
    match error.downcast_ref::<DirectoryError>().map(DirectoryError::kind) {
        Some(ErrorKind::Configuration) => ProcessExit::Usage,
        _ => ProcessExit::Failure,
    }
}

fn init_tracing(default_level: &str) {
    // RUST_LOG wins over the verbose/quiet flags
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(args.default_log_level());
    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(summary) => {
            info!(
                pages = summary.pages,
                entries = summary.entries,
                truncated = summary.truncated,
                "Directory dump complete"
            );
            ProcessExit::Success.into()
        }
        Err(error) => {
            eprintln!("Error: {error}");
            exit_for(&error).into()
        }
    }
}

async fn run(args: &Args) -> Result<WalkSummary> {
    // Validated before any socket is opened
    let mode = RunMode::from_inputs(&args.mode_inputs())?;

    if matches!(mode, RunMode::Bootstrap { .. }) && !args.download_dir.exists() {
        std::fs::create_dir_all(&args.download_dir).with_context(|| {
            format!(
                "cannot create download directory {}",
                args.download_dir.display()
            )
        })?;
        info!(dir = %args.download_dir.display(), "Created download directory");
    }

    let fetch_settings = FetchSettings {
        connect_timeout: Duration::from_secs(args.connect_timeout),
        read_timeout: Duration::from_secs(args.timeout),
        ..FetchSettings::default()
    };
    let fetcher = Arc::new(HttpFetcher::new(&fetch_settings)?);

    let settings = PipelineSettings {
        config_page_path: args.config_path.clone(),
        directory_label: args.directory_label.clone(),
        max_pages: args
            .max_pages
            .map(|pages| usize::try_from(pages).unwrap_or(usize::MAX)),
        download_dir: args.download_dir.clone(),
    };
    let transfer = TftpClient::new(TftpSettings {
        timeout: Duration::from_secs(args.tftp_timeout),
        ..TftpSettings::default()
    });
    let pipeline = DirectoryPipeline::new(fetcher, settings);

    let stdout = io::stdout();
    let summary = match args.format {
        OutputFormat::Text => {
            let mut sink = TextSink::new(stdout.lock());
            pipeline.run(&mode, &transfer, &mut sink).await?
        }
        OutputFormat::Json => {
            let mut sink = JsonLinesSink::new(stdout.lock());
            pipeline.run(&mode, &transfer, &mut sink).await?
        }
    };
    Ok(summary)
}
