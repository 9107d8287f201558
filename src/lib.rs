//! Vikdir Core Library
//!
//! This library resolves a Cisco IP phone's corporate directory by walking
//! the chain of XML documents that starts at the phone (or at its bootstrap
//! configuration file) and ends at the paginated directory listing.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Run mode validation and pipeline settings
//! - [`directory`] - XML schemas, the single-hop fetcher, hops and the listing walker
//! - [`orchestrator`] - Start-state dispatch and the shared hop continuation
//! - [`output`] - Sinks that receive resolved directory entries
//! - [`transfer`] - Bootstrap file retrieval over TFTP

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod directory;
pub mod orchestrator;
pub mod output;
#[cfg(test)]
pub mod test_support;
pub mod transfer;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{ModeInputs, PipelineSettings, RunMode};
pub use directory::{
    DirectoryEntry, DirectoryError, ErrorKind, Fetch, FetchSettings, Hop, HttpFetcher,
    ListingWalker, WalkSummary,
};
pub use orchestrator::DirectoryPipeline;
pub use output::{EntrySink, JsonLinesSink, TextSink};
pub use transfer::{
    ConfigTransfer, DEFAULT_TFTP_PORT, TftpClient, TftpSettings, TransferMode, TransferRequest,
};
