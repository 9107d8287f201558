//! Hop-by-hop resolution of a phone's corporate directory.
//!
//! Every stage fetches one document, decodes it into a narrow schema and
//! extracts the single URL the next stage needs. The chain ends in the
//! [`ListingWalker`], which emits entries and follows pagination links.
//!
//! # Architecture
//!
//! - [`Hop`] - Async trait that every resolution stage implements
//! - [`PhoneConfigHop`] - Web-crawl start: scrape the phone's config page
//! - [`BootstrapFileHop`] - Bootstrap start: read a downloaded `.cnf.xml`
//! - [`MenuHop`] - Pick the "Corporate Directory" service from the menu
//! - [`ListingPointerHop`] - Follow the input-page indirection
//! - [`ListingWalker`] - Emit entries page by page
//! - [`Fetch`] / [`HttpFetcher`] - Single GET per hop, certificate checks off
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vikdir_core::directory::{FetchSettings, Hop, HttpFetcher, ListingPointerHop, MenuHop};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::new(&FetchSettings::default())?);
//! let input_url = MenuHop::new(fetcher.clone())
//!     .resolve("https://cm:8443/ccmcip/xmldirectory.jsp")
//!     .await?;
//! let first_page = ListingPointerHop::new(fetcher).resolve(&input_url).await?;
//! println!("Listing starts at: {first_page}");
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod error;
mod http_client;
mod listing;
mod menu;
mod phone_config;
pub mod schema;
mod utils;
mod walker;

pub use bootstrap::BootstrapFileHop;
pub use error::{DirectoryError, ErrorKind};
pub use http_client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, Fetch, FetchSettings, HttpFetcher,
};
pub use listing::ListingPointerHop;
pub use menu::{CORPORATE_DIRECTORY_LABEL, MenuHop};
pub use phone_config::{DEFAULT_CONFIG_PAGE_PATH, PhoneConfigHop, extract_directory_url};
pub use schema::DirectoryEntry;
pub use walker::{ListingPage, ListingWalker, WalkSummary};

use async_trait::async_trait;

/// A single fetch-decode-extract step of the chain.
///
/// Implementations must be `Send + Sync` so they can be held as boxed trait
/// objects by the pipeline.
#[async_trait]
pub trait Hop: Send + Sync {
    /// Returns the hop name used in logs.
    fn name(&self) -> &str;

    /// Resolves this hop's input (a URL, or a phone address or local path
    /// for the start hops) into the URL the next hop consumes.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the document cannot be fetched or
    /// decoded, or lacks the field this hop extracts.
    async fn resolve(&self, input: &str) -> Result<String, DirectoryError>;
}
