//! Error types for directory resolution.
//!
//! Every variant names the URL or file that was in flight when the failure
//! happened, following the What/Why/Fix message pattern used across the
//! project. All of them are fatal to a run.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse failure class used for exit codes and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Conflicting or missing mode inputs, reported before any I/O.
    Configuration,
    /// Bootstrap file retrieval or a response body that could not be read.
    Transfer,
    /// Any HTTP fetch failure: connect, timeout, non-success status.
    Network,
    /// A document that is not well-formed XML.
    Decode,
    /// A well-formed document that lacks the expected field or entry.
    NotFound,
    /// Writing resolved entries to the output failed.
    Output,
}

/// Errors that can occur while resolving a phone directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Mode inputs are conflicting, incomplete, or unusable
    #[error("invalid configuration: {reason}\n  Suggestion: {suggestion}")]
    Configuration {
        /// Why the configuration was rejected
        reason: String,
        /// How to fix the invocation
        suggestion: String,
    },

    /// The bootstrap transfer or a response body read failed
    #[error("transfer failed for '{target}': {reason}")]
    Transfer {
        /// File name or URL being transferred
        target: String,
        /// Why the transfer failed
        reason: String,
    },

    /// The downloaded bootstrap file could not be read back
    #[error("cannot read bootstrap file {path}: {source}")]
    LocalFile {
        /// Local path of the bootstrap file
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A hop produced something that is not a usable URL
    #[error("invalid URL '{url}'\n  Suggestion: Check the URL the previous document pointed to")]
    InvalidUrl {
        /// The unusable URL string
        url: String,
    },

    /// Connection-level failure, including timeouts
    #[error("network error fetching {url}{}: {source}", timeout_note(.timed_out))]
    Network {
        /// The URL that failed
        url: String,
        /// Whether the client gave up waiting
        timed_out: bool,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the status
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// The document is not well-formed XML
    #[error("malformed XML in {target}: {source}")]
    Decode {
        /// URL or file the document came from
        target: String,
        /// The underlying decoder error
        #[source]
        source: quick_xml::DeError,
    },

    /// The document lacks the field or entry the next hop needs
    #[error("{what} not found in {target}")]
    NotFound {
        /// URL or file that was searched
        target: String,
        /// What was expected
        what: String,
    },

    /// Writing an entry to the output failed
    #[error("cannot write directory entry: {source}")]
    Output {
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl DirectoryError {
    /// Creates a `Configuration` error.
    #[must_use]
    pub fn configuration(reason: &str, suggestion: &str) -> Self {
        Self::Configuration {
            reason: reason.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `Transfer` error.
    #[must_use]
    pub fn transfer(target: &str, reason: &str) -> Self {
        Self::Transfer {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `LocalFile` error.
    pub fn local_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalFile {
            path: path.into(),
            source,
        }
    }

    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
        }
    }

    /// Creates a `Network` error from a client error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            timed_out: source.is_timeout(),
            source,
        }
    }

    /// Creates an `HttpStatus` error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a `Decode` error.
    pub fn decode(target: impl Into<String>, source: quick_xml::DeError) -> Self {
        Self::Decode {
            target: target.into(),
            source,
        }
    }

    /// Creates an `Output` error for a failed sink write.
    #[must_use]
    pub fn output(source: std::io::Error) -> Self {
        Self::Output { source }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(target: &str, what: &str) -> Self {
        Self::NotFound {
            target: target.to_string(),
            what: what.to_string(),
        }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Transfer { .. } | Self::LocalFile { .. } => ErrorKind::Transfer,
            Self::InvalidUrl { .. } | Self::Network { .. } | Self::HttpStatus { .. } => {
                ErrorKind::Network
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Output { .. } => ErrorKind::Output,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn timeout_note(timed_out: &bool) -> &'static str {
    if *timed_out { " (timed out)" } else { "" }
}
