//! Run mode selection and pipeline settings.
//!
//! Mode inputs are validated here, before any socket is opened, so a bad
//! invocation never touches the network.

use std::path::PathBuf;

use crate::directory::{CORPORATE_DIRECTORY_LABEL, DEFAULT_CONFIG_PAGE_PATH, DirectoryError};
use crate::transfer::DEFAULT_TFTP_PORT;

const MODE_SUGGESTION: &str = "Use --phone <address> for web-crawl mode, or --hostname <SEP...> --server <tftp-server> [--port <port>] for bootstrap mode";

/// Raw mode inputs as supplied by the caller; empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct ModeInputs {
    pub phone: Option<String>,
    pub hostname: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
}

/// Validated start state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Scrape the phone's own web interface.
    WebCrawl { phone: String },
    /// Pull `<hostname>.cnf.xml` from a TFTP server.
    Bootstrap {
        hostname: String,
        server: String,
        port: u16,
    },
}

impl RunMode {
    /// Chooses the run mode from `inputs`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Configuration`] when inputs for both modes
    /// are given, when neither mode is selected, or when bootstrap mode is
    /// missing its hostname or server.
    pub fn from_inputs(inputs: &ModeInputs) -> Result<Self, DirectoryError> {
        let phone = present(inputs.phone.as_deref());
        let hostname = present(inputs.hostname.as_deref());
        let server = present(inputs.server.as_deref());

        if let Some(phone) = phone {
            if hostname.is_some() || server.is_some() || inputs.port.is_some() {
                return Err(DirectoryError::configuration(
                    "cannot run in both web-crawl and bootstrap modes at the same time",
                    MODE_SUGGESTION,
                ));
            }
            return Ok(Self::WebCrawl {
                phone: phone.to_string(),
            });
        }

        match (hostname, server) {
            (Some(hostname), Some(server)) => Ok(Self::Bootstrap {
                hostname: hostname.to_string(),
                server: server.to_string(),
                port: inputs.port.unwrap_or(DEFAULT_TFTP_PORT),
            }),
            (None, None) if inputs.port.is_none() => Err(DirectoryError::configuration(
                "no mode selected",
                MODE_SUGGESTION,
            )),
            _ => Err(DirectoryError::configuration(
                "bootstrap mode needs both a phone hostname and a TFTP server",
                MODE_SUGGESTION,
            )),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Settings shared by both modes once the start hop has run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Path of the phone's network configuration page (web-crawl mode).
    pub config_page_path: String,
    /// Menu label that names the corporate directory service.
    pub directory_label: String,
    /// Page cap for the listing walk; `None` follows every "Next" link.
    pub max_pages: Option<usize>,
    /// Where the bootstrap file is stored (bootstrap mode).
    pub download_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            config_page_path: DEFAULT_CONFIG_PAGE_PATH.to_string(),
            directory_label: CORPORATE_DIRECTORY_LABEL.to_string(),
            max_pages: None,
            download_dir: PathBuf::from("."),
        }
    }
}
