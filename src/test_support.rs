//! In-memory fetcher and document builders for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::directory::{DirectoryError, Fetch};

/// Serves fixed bodies by exact URL and records every request.
///
/// Unknown URLs answer like a 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DirectoryError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| DirectoryError::http_status(url, 404))
    }
}

/// Builds a `CiscoIPPhoneDirectory` page with an optional "Next" soft key.
pub fn directory_page(entries: &[(&str, &str)], next: Option<&str>) -> String {
    let mut xml = String::from("<CiscoIPPhoneDirectory><Title>Corporate Directory</Title>");
    for (name, telephone) in entries {
        xml.push_str(&format!(
            "<DirectoryEntry><Name>{name}</Name><Telephone>{telephone}</Telephone></DirectoryEntry>"
        ));
    }
    xml.push_str("<SoftKeyItem><Name>Dial</Name><URL>SoftKey:Dial</URL></SoftKeyItem>");
    if let Some(next) = next {
        xml.push_str(&format!(
            "<SoftKeyItem><Name>Next</Name><URL>{next}</URL></SoftKeyItem>"
        ));
    }
    xml.push_str("</CiscoIPPhoneDirectory>");
    xml
}
