//! Entry point selection and the shared continuation of both run modes.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{PipelineSettings, RunMode};
use crate::directory::{
    BootstrapFileHop, DirectoryError, Fetch, Hop, ListingPointerHop, ListingWalker, MenuHop,
    PhoneConfigHop, WalkSummary,
};
use crate::output::EntrySink;
use crate::transfer::{ConfigTransfer, TransferMode, TransferRequest, bootstrap_filename};

/// Runs the whole chain from a [`RunMode`] to emitted entries.
pub struct DirectoryPipeline {
    fetcher: Arc<dyn Fetch>,
    settings: PipelineSettings,
}

impl DirectoryPipeline {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>, settings: PipelineSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Resolves the directory for `mode` and writes its entries to `sink`.
    ///
    /// Web-crawl mode starts at the phone's configuration page; bootstrap
    /// mode first downloads the phone's `.cnf.xml` through `transfer`. Both
    /// continue through the menu hop, the listing pointer hop and the walk.
    ///
    /// # Errors
    ///
    /// Returns the first [`DirectoryError`] of any stage. Entries emitted
    /// before the failure stay emitted.
    pub async fn run(
        &self,
        mode: &RunMode,
        transfer: &dyn ConfigTransfer,
        sink: &mut dyn EntrySink,
    ) -> Result<WalkSummary, DirectoryError> {
        let directory_url = self.resolve_start(mode, transfer).await?;
        info!(url = %directory_url, "Found directory service URL");

        let chain: [Box<dyn Hop>; 2] = [
            Box::new(MenuHop::with_label(
                Arc::clone(&self.fetcher),
                self.settings.directory_label.clone(),
            )),
            Box::new(ListingPointerHop::new(Arc::clone(&self.fetcher))),
        ];

        let mut url = directory_url;
        for hop in &chain {
            debug!(hop = hop.name(), input = %url, "Resolving hop");
            url = hop.resolve(&url).await?;
            info!(hop = hop.name(), url = %url, "Hop resolved");
        }

        ListingWalker::new(Arc::clone(&self.fetcher))
            .with_max_pages(self.settings.max_pages)
            .walk(&url, sink)
            .await
    }

    async fn resolve_start(
        &self,
        mode: &RunMode,
        transfer: &dyn ConfigTransfer,
    ) -> Result<String, DirectoryError> {
        match mode {
            RunMode::WebCrawl { phone } => {
                info!(phone = %phone, "Starting in web-crawl mode");
                PhoneConfigHop::with_page_path(
                    Arc::clone(&self.fetcher),
                    self.settings.config_page_path.clone(),
                )
                .resolve(phone)
                .await
            }
            RunMode::Bootstrap {
                hostname,
                server,
                port,
            } => {
                info!(hostname = %hostname, server = %server, port, "Starting in bootstrap mode");
                let filename = bootstrap_filename(hostname);
                let request = TransferRequest {
                    server: server.clone(),
                    port: *port,
                    destination: self.settings.download_dir.join(&filename),
                    filename,
                    mode: TransferMode::Octet,
                };
                transfer.download(&request).await?;
                BootstrapFileHop::new()
                    .read_pointer(&request.destination)
                    .await
            }
        }
    }
}

impl std::fmt::Debug for DirectoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryPipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
