//! Web-crawl start hop: scrape the directory service URL off the phone's
//! network configuration page.

use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use super::utils::compile_static_regex;
use super::{DirectoryError, Fetch, Hop};

/// Page on the phone's embedded web server that lists its service URLs.
pub const DEFAULT_CONFIG_PAGE_PATH: &str = "/NetworkConfiguration";

static DIRECTORY_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"[^>]+/ccmcip/xmldirectory\.jsp"));

/// Reads the directory service URL from a phone's web interface.
pub struct PhoneConfigHop {
    fetcher: Arc<dyn Fetch>,
    page_path: String,
}

impl PhoneConfigHop {
    /// Creates the hop for the default configuration page.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self::with_page_path(fetcher, DEFAULT_CONFIG_PAGE_PATH)
    }

    /// Creates the hop for a custom configuration page path.
    #[must_use]
    pub fn with_page_path(fetcher: Arc<dyn Fetch>, page_path: impl Into<String>) -> Self {
        Self {
            fetcher,
            page_path: page_path.into(),
        }
    }

    /// Builds the configuration page URL for `phone`.
    ///
    /// A bare address gets `http://`; an address with a scheme is used as is.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Configuration`] when no URL can be formed.
    pub fn config_page_url(&self, phone: &str) -> Result<String, DirectoryError> {
        let phone = phone.trim();
        let base = if phone.contains("://") {
            phone.to_string()
        } else {
            format!("http://{phone}")
        };
        Url::parse(&base)
            .ok()
            .filter(|url| url.host_str().is_some_and(|host| !host.is_empty()))
            .and_then(|url| url.join(&self.page_path).ok())
            .map(|url| url.to_string())
            .ok_or_else(|| {
                DirectoryError::configuration(
                    &format!("cannot form a URL from phone address '{phone}'"),
                    "Pass the phone's IP address or hostname, e.g. --phone 10.1.2.3",
                )
            })
    }
}

impl std::fmt::Debug for PhoneConfigHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhoneConfigHop")
            .field("page_path", &self.page_path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Hop for PhoneConfigHop {
    fn name(&self) -> &'static str {
        "phone-config"
    }

    #[tracing::instrument(skip(self), fields(hop = "phone-config"))]
    async fn resolve(&self, phone: &str) -> Result<String, DirectoryError> {
        let page_url = self.config_page_url(phone)?;
        let body = self.fetcher.fetch(&page_url).await?;
        let page = String::from_utf8_lossy(&body);
        extract_directory_url(&page).ok_or_else(|| {
            DirectoryError::not_found(&page_url, "directory URL ending in /ccmcip/xmldirectory.jsp")
        })
    }
}

/// Returns the first directory service URL mentioned in `page`.
#[must_use]
pub fn extract_directory_url(page: &str) -> Option<String> {
    DIRECTORY_URL_RE
        .find(page)
        .map(|found| found.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::ErrorKind;
    use crate::test_support::StaticFetcher;

    const CONFIG_PAGE: &str = "<html><body><table>\
        <tr><td><b>Host Name</b></td><td><b>SEP001122334455</b></td></tr>\
        <tr><td><b>Directories URL</b></td><td><b>http://10.0.0.5:8080/ccmcip/xmldirectory.jsp</b></td></tr>\
        <tr><td><b>Services URL</b></td><td><b>http://10.0.0.5:8080/ccmcip/getservicesmenu.jsp</b></td></tr>\
        </table></body></html>";

    #[test]
    fn test_extract_directory_url_from_table_cell() {
        assert_eq!(
            extract_directory_url(CONFIG_PAGE).as_deref(),
            Some("http://10.0.0.5:8080/ccmcip/xmldirectory.jsp")
        );
    }

    #[test]
    fn test_extract_directory_url_none_without_match() {
        assert_eq!(extract_directory_url("<html><b>No URLs here</b></html>"), None);
    }

    #[test]
    fn test_config_page_url_adds_scheme_and_path() {
        let hop = PhoneConfigHop::new(Arc::new(StaticFetcher::default()));
        assert_eq!(
            hop.config_page_url("10.1.2.3").unwrap(),
            "http://10.1.2.3/NetworkConfiguration"
        );
        assert_eq!(
            hop.config_page_url("http://127.0.0.1:8080").unwrap(),
            "http://127.0.0.1:8080/NetworkConfiguration"
        );
    }

    #[test]
    fn test_config_page_url_rejects_unusable_address() {
        let hop = PhoneConfigHop::new(Arc::new(StaticFetcher::default()));
        let err = hop.config_page_url("bad host name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_resolve_returns_scraped_url() {
        let fetcher = StaticFetcher::default()
            .with_page("http://10.1.2.3/NetworkConfiguration", CONFIG_PAGE);
        let hop = PhoneConfigHop::new(Arc::new(fetcher));
        let url = hop.resolve("10.1.2.3").await.unwrap();
        assert_eq!(url, "http://10.0.0.5:8080/ccmcip/xmldirectory.jsp");
    }

    #[tokio::test]
    async fn test_resolve_without_match_is_not_found() {
        let fetcher = StaticFetcher::default()
            .with_page("http://10.1.2.3/NetworkConfiguration", "<html>nothing</html>");
        let hop = PhoneConfigHop::new(Arc::new(fetcher));
        let err = hop.resolve("10.1.2.3").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("http://10.1.2.3/NetworkConfiguration"));
    }
}
