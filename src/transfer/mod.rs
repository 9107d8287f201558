//! Retrieval of a phone's bootstrap configuration file.
//!
//! Bootstrap mode starts from `<hostname>.cnf.xml` on the call manager's
//! TFTP server. The pipeline only needs a [`ConfigTransfer`] that puts that
//! file on local disk; [`TftpClient`] is the network implementation.

mod tftp;

pub use tftp::{DEFAULT_TFTP_RETRANSMITS, DEFAULT_TFTP_TIMEOUT_SECS, TftpClient, TftpSettings};

use std::path::PathBuf;

use async_trait::async_trait;

use crate::directory::DirectoryError;

/// Well-known TFTP server port.
pub const DEFAULT_TFTP_PORT: u16 = 69;

/// TFTP transfer mode named in the read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// Text with network line endings, converted on receipt.
    Netascii,
    /// Raw bytes.
    #[default]
    Octet,
}

impl TransferMode {
    /// Returns the mode string sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Netascii => "netascii",
            Self::Octet => "octet",
        }
    }
}

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub server: String,
    pub port: u16,
    pub filename: String,
    pub destination: PathBuf,
    pub mode: TransferMode,
}

/// Downloads a remote file to local storage.
#[async_trait]
pub trait ConfigTransfer: Send + Sync {
    /// Retrieves `request.filename` into `request.destination`, returning
    /// the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Transfer`] when the file cannot be retrieved
    /// or written.
    async fn download(&self, request: &TransferRequest) -> Result<u64, DirectoryError>;
}

/// Name of the bootstrap file the call manager serves for `hostname`.
#[must_use]
pub fn bootstrap_filename(hostname: &str) -> String {
    format!("{}.cnf.xml", hostname.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_filename_appends_cnf_suffix() {
        assert_eq!(bootstrap_filename("SEP001122334455"), "SEP001122334455.cnf.xml");
    }

    #[test]
    fn test_transfer_mode_wire_names() {
        assert_eq!(TransferMode::Octet.as_str(), "octet");
        assert_eq!(TransferMode::Netascii.as_str(), "netascii");
        assert_eq!(TransferMode::default(), TransferMode::Octet);
    }
}
