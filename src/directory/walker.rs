//! Terminal stage: emit directory entries page by page, following the
//! "Next" soft key until a page has none.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::output::EntrySink;

use super::schema::{DirectoryEntry, EntryList, PaginationControl, decode};
use super::utils::absolutize_url;
use super::{DirectoryError, Fetch};

/// One decoded page of directory results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Entries in document order.
    pub entries: Vec<DirectoryEntry>,
    /// Absolute URL of the following page, if the page links one.
    pub next: Option<String>,
}

/// Totals of a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: usize,
    pub entries: usize,
    /// The page cap stopped the walk while a "Next" link was still pending.
    pub truncated: bool,
}

/// Walks a paginated `CiscoIPPhoneDirectory` listing.
///
/// The pagination chain is followed without revisit detection. A server that
/// links pages in a cycle keeps the walk going unless `max_pages` is set.
pub struct ListingWalker {
    fetcher: Arc<dyn Fetch>,
    max_pages: Option<usize>,
}

impl ListingWalker {
    /// Creates an unbounded walker.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            max_pages: None,
        }
    }

    /// Caps the number of pages read; `None` follows every link.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetches one page and projects it into entries and the next link.
    ///
    /// The body is decoded twice, once per projection.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the fetch fails, the body is not
    /// well-formed XML, or the next link cannot be made absolute.
    #[tracing::instrument(skip(self))]
    pub async fn read_page(&self, page_url: &str) -> Result<ListingPage, DirectoryError> {
        let body = self.fetcher.fetch(page_url).await?;
        let entries: EntryList = decode(&body, page_url)?;
        let control: PaginationControl = decode(&body, page_url)?;
        let next = control
            .next_url()
            .map(|link| absolutize_url(link, page_url))
            .transpose()?;
        Ok(ListingPage {
            entries: entries.entries,
            next,
        })
    }

    /// Emits every entry reachable from `first_page` into `sink`, in order.
    ///
    /// Entries of a page are emitted before the next page is fetched, so a
    /// failure on a later page leaves earlier output in place.
    ///
    /// # Errors
    ///
    /// Returns the first [`DirectoryError`] from any page or from the sink.
    pub async fn walk(
        &self,
        first_page: &str,
        sink: &mut dyn EntrySink,
    ) -> Result<WalkSummary, DirectoryError> {
        let mut summary = WalkSummary::default();
        let mut page_url = first_page.to_string();

        loop {
            let page = self.read_page(&page_url).await?;
            summary.pages += 1;
            debug!(
                page = summary.pages,
                url = %page_url,
                entries = page.entries.len(),
                "Read directory page"
            );

            for entry in &page.entries {
                sink.emit(entry).map_err(DirectoryError::output)?;
                summary.entries += 1;
            }

            let Some(next) = page.next else {
                break;
            };
            if self.max_pages.is_some_and(|max| summary.pages >= max) {
                warn!(
                    pages = summary.pages,
                    next = %next,
                    "Page limit reached; not following further pages"
                );
                summary.truncated = true;
                break;
            }
            page_url = next;
        }

        info!(
            pages = summary.pages,
            entries = summary.entries,
            "Directory walk complete"
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for ListingWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingWalker")
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::ErrorKind;
    use crate::test_support::{StaticFetcher, directory_page};

    #[tokio::test]
    async fn test_walk_without_next_emits_all_and_stops() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(
            "https://cm/page1",
            &directory_page(&[("Alice", "1000"), ("Carol", "3000")], None),
        ));
        let mut out: Vec<DirectoryEntry> = Vec::new();

        let summary = ListingWalker::new(fetcher.clone())
            .walk("https://cm/page1", &mut out)
            .await
            .unwrap();

        assert_eq!(
            out,
            vec![
                DirectoryEntry::new("Alice", "1000"),
                DirectoryEntry::new("Carol", "3000"),
            ]
        );
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.entries, 2);
        assert!(!summary.truncated);
        assert_eq!(fetcher.requests(), vec!["https://cm/page1"]);
    }

    #[tokio::test]
    async fn test_walk_follows_single_next_exactly_once() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with_page(
                    "https://cm/page1",
                    &directory_page(&[("Alice", "1000")], Some("https://cm/page2")),
                )
                .with_page("https://cm/page2", &directory_page(&[("Bob", "2000")], None)),
        );
        let mut out: Vec<DirectoryEntry> = Vec::new();

        let summary = ListingWalker::new(fetcher.clone())
            .walk("https://cm/page1", &mut out)
            .await
            .unwrap();

        assert_eq!(
            out,
            vec![
                DirectoryEntry::new("Alice", "1000"),
                DirectoryEntry::new("Bob", "2000"),
            ]
        );
        assert_eq!(summary.pages, 2);
        assert_eq!(
            fetcher.requests(),
            vec!["https://cm/page1", "https://cm/page2"]
        );
    }

    #[tokio::test]
    async fn test_walk_ignores_later_next_items() {
        let page1 = "<CiscoIPPhoneDirectory>\
            <DirectoryEntry><Name>Alice</Name><Telephone>1000</Telephone></DirectoryEntry>\
            <SoftKeyItem><Name>Next</Name><URL>https://cm/page2</URL></SoftKeyItem>\
            <SoftKeyItem><Name>Next</Name><URL>https://cm/elsewhere</URL></SoftKeyItem>\
            </CiscoIPPhoneDirectory>";
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with_page("https://cm/page1", page1)
                .with_page("https://cm/page2", &directory_page(&[], None)),
        );
        let mut out: Vec<DirectoryEntry> = Vec::new();

        ListingWalker::new(fetcher.clone())
            .walk("https://cm/page1", &mut out)
            .await
            .unwrap();

        assert_eq!(
            fetcher.requests(),
            vec!["https://cm/page1", "https://cm/page2"]
        );
    }

    #[tokio::test]
    async fn test_walk_keeps_earlier_entries_when_later_page_fails() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(
            "https://cm/page1",
            &directory_page(&[("Alice", "1000")], Some("https://cm/missing")),
        ));
        let mut out: Vec<DirectoryEntry> = Vec::new();

        let err = ListingWalker::new(fetcher)
            .walk("https://cm/page1", &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(out, vec![DirectoryEntry::new("Alice", "1000")]);
    }

    /// Accepts `capacity` entries, then fails like a closed pipe.
    struct ClosingSink {
        written: Vec<DirectoryEntry>,
        capacity: usize,
    }

    impl EntrySink for ClosingSink {
        fn emit(&mut self, entry: &DirectoryEntry) -> std::io::Result<()> {
            if self.written.len() == self.capacity {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "stdout closed",
                ));
            }
            self.written.push(entry.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_walk_sink_failure_is_output_error_and_keeps_written() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with_page(
                    "https://cm/page1",
                    &directory_page(&[("Alice", "1000")], Some("https://cm/page2")),
                )
                .with_page(
                    "https://cm/page2",
                    &directory_page(&[("Bob", "2000"), ("Carol", "3000")], None),
                ),
        );
        let mut sink = ClosingSink {
            written: Vec::new(),
            capacity: 2,
        };

        let err = ListingWalker::new(fetcher)
            .walk("https://cm/page1", &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Output);
        assert_eq!(
            sink.written,
            vec![
                DirectoryEntry::new("Alice", "1000"),
                DirectoryEntry::new("Bob", "2000"),
            ]
        );
    }

    #[tokio::test]
    async fn test_walk_page_cap_truncates_cycle() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(
            "https://cm/page1",
            &directory_page(&[("Alice", "1000")], Some("https://cm/page1")),
        ));
        let mut out: Vec<DirectoryEntry> = Vec::new();

        let summary = ListingWalker::new(fetcher.clone())
            .with_max_pages(Some(3))
            .walk("https://cm/page1", &mut out)
            .await
            .unwrap();

        assert!(summary.truncated);
        assert_eq!(summary.pages, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_read_page_resolves_relative_next_link() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(
            "https://cm/ccmcip/xmldirectorylist.jsp?start=1",
            &directory_page(&[], Some("xmldirectorylist.jsp?start=33")),
        ));
        let page = ListingWalker::new(fetcher)
            .read_page("https://cm/ccmcip/xmldirectorylist.jsp?start=1")
            .await
            .unwrap();
        assert_eq!(
            page.next.as_deref(),
            Some("https://cm/ccmcip/xmldirectorylist.jsp?start=33")
        );
    }

    #[tokio::test]
    async fn test_read_page_malformed_is_decode_error() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(
            "https://cm/page1",
            "<CiscoIPPhoneDirectory><DirectoryEntry><Name>A</Name></CiscoIPPhoneDirectory>",
        ));
        let err = ListingWalker::new(fetcher)
            .read_page("https://cm/page1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
