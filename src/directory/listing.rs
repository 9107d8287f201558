//! Listing pointer hop: follow the `CiscoIPPhoneInput` indirection to the
//! first page of directory results.

use std::sync::Arc;

use async_trait::async_trait;

use super::schema::{DirectoryListPointer, decode};
use super::utils::absolutize_url;
use super::{DirectoryError, Fetch, Hop};

/// Fetches the list pointer document and returns its `URL` unfiltered.
pub struct ListingPointerHop {
    fetcher: Arc<dyn Fetch>,
}

impl ListingPointerHop {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }
}

impl std::fmt::Debug for ListingPointerHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingPointerHop").finish_non_exhaustive()
    }
}

#[async_trait]
impl Hop for ListingPointerHop {
    fn name(&self) -> &'static str {
        "listing-pointer"
    }

    #[tracing::instrument(skip(self), fields(hop = "listing-pointer"))]
    async fn resolve(&self, source_url: &str) -> Result<String, DirectoryError> {
        let body = self.fetcher.fetch(source_url).await?;
        let pointer: DirectoryListPointer = decode(&body, source_url)?;
        let link = pointer.url.trim();
        if link.is_empty() {
            return Err(DirectoryError::not_found(source_url, "listing URL"));
        }
        absolutize_url(link, source_url)
    }
}
