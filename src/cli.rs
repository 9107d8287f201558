//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use vikdir_core::ModeInputs;
use vikdir_core::directory::{
    CORPORATE_DIRECTORY_LABEL, DEFAULT_CONFIG_PAGE_PATH, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_READ_TIMEOUT_SECS,
};
use vikdir_core::transfer::DEFAULT_TFTP_TIMEOUT_SECS;

/// Dump the corporate directory behind a Cisco IP phone.
///
/// Web-crawl mode:  vikdir --phone <phone-address>
///
/// Bootstrap mode:  vikdir --hostname <SEP...> --server <tftp-server> [--port <port>]
#[derive(Parser, Debug)]
#[command(name = "vikdir")]
#[command(author, version, about)]
pub struct Args {
    /// IP address or hostname of a phone's web interface (web-crawl mode)
    #[arg(long, help_heading = "Web-crawl mode")]
    pub phone: Option<String>,

    /// Phone hostname, e.g. SEP001122334455 (bootstrap mode)
    #[arg(long, help_heading = "Bootstrap mode")]
    pub hostname: Option<String>,

    /// IP address or hostname of the TFTP server (bootstrap mode)
    #[arg(long, help_heading = "Bootstrap mode")]
    pub server: Option<String>,

    /// TFTP server port [default: 69] (bootstrap mode)
    #[arg(long, help_heading = "Bootstrap mode")]
    pub port: Option<u16>,

    /// Directory the bootstrap file is downloaded into
    #[arg(long, default_value = ".", help_heading = "Bootstrap mode")]
    pub download_dir: PathBuf,

    /// Seconds to wait for each TFTP packet (1-60)
    #[arg(long, default_value_t = DEFAULT_TFTP_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=60), help_heading = "Bootstrap mode")]
    pub tftp_timeout: u64,

    /// Path of the phone's network configuration page
    #[arg(long, default_value = DEFAULT_CONFIG_PAGE_PATH)]
    pub config_path: String,

    /// Menu label of the corporate directory service
    #[arg(long, default_value = CORPORATE_DIRECTORY_LABEL)]
    pub directory_label: String,

    /// Stop after this many directory pages (default: follow every page)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: Option<u64>,

    /// TCP connect timeout in seconds (1-300)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Output format for directory entries
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// How resolved entries are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Labeled multi-line records
    Text,
    /// One JSON object per line
    Json,
}

impl Args {
    /// Mode-selection inputs, validated later by `RunMode::from_inputs`.
    pub fn mode_inputs(&self) -> ModeInputs {
        ModeInputs {
            phone: self.phone.clone(),
            hostname: self.hostname.clone(),
            server: self.server.clone(),
            port: self.port,
        }
    }

    /// Default log level derived from the verbose/quiet flags.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
