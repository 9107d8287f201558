//! Bootstrap start hop: read the directory service URL from a downloaded
//! `<hostname>.cnf.xml` file.

use std::path::Path;

use async_trait::async_trait;

use super::schema::{BootstrapPointer, decode};
use super::{DirectoryError, Hop};

/// Reads a local bootstrap file and returns its `directoryURL`.
#[derive(Debug, Default)]
pub struct BootstrapFileHop;

impl BootstrapFileHop {
    /// Creates a new `BootstrapFileHop`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads `path` and returns the `directoryURL` it points to.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::LocalFile`] when the file cannot be read,
    /// `Decode` when it is not XML, and `NotFound` when it has no URL.
    pub async fn read_pointer(&self, path: &Path) -> Result<String, DirectoryError> {
        let target = path.display().to_string();
        let body = tokio::fs::read(path)
            .await
            .map_err(|source| DirectoryError::local_file(path, source))?;
        let pointer: BootstrapPointer = decode(&body, &target)?;
        let url = pointer.directory_url.trim();
        if url.is_empty() {
            return Err(DirectoryError::not_found(&target, "directoryURL"));
        }
        Ok(url.to_string())
    }
}

#[async_trait]
impl Hop for BootstrapFileHop {
    fn name(&self) -> &'static str {
        "bootstrap-file"
    }

    #[tracing::instrument(skip(self), fields(hop = "bootstrap-file"))]
    async fn resolve(&self, path: &str) -> Result<String, DirectoryError> {
        self.read_pointer(Path::new(path)).await
    }
}
