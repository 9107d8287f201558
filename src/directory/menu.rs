//! Menu hop: pick the corporate directory service out of the directory menu.

use std::sync::Arc;

use async_trait::async_trait;

use super::schema::{MenuListing, decode};
use super::utils::absolutize_url;
use super::{DirectoryError, Fetch, Hop};

/// Menu label of the corporate directory service.
pub const CORPORATE_DIRECTORY_LABEL: &str = "Corporate Directory";

/// Fetches a `CiscoIPPhoneMenu` and returns the URL of the labeled item.
pub struct MenuHop {
    fetcher: Arc<dyn Fetch>,
    label: String,
}

impl MenuHop {
    /// Creates a hop that looks for [`CORPORATE_DIRECTORY_LABEL`].
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self::with_label(fetcher, CORPORATE_DIRECTORY_LABEL)
    }

    /// Creates a hop that looks for a custom menu label.
    #[must_use]
    pub fn with_label(fetcher: Arc<dyn Fetch>, label: impl Into<String>) -> Self {
        Self {
            fetcher,
            label: label.into(),
        }
    }
}

impl std::fmt::Debug for MenuHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuHop")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Hop for MenuHop {
    fn name(&self) -> &'static str {
        "menu"
    }

    #[tracing::instrument(skip(self), fields(hop = "menu", label = %self.label))]
    async fn resolve(&self, source_url: &str) -> Result<String, DirectoryError> {
        let body = self.fetcher.fetch(source_url).await?;
        let menu: MenuListing = decode(&body, source_url)?;
        let link = menu
            .find(&self.label)
            .map(|item| item.url.trim())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DirectoryError::not_found(source_url, &format!("'{}' menu item", self.label))
            })?;
        absolutize_url(link, source_url)
    }
}
