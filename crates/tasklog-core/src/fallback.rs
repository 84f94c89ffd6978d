use crate::error::SourceError;
use crate::ports::{LocalFileStore, RemoteArchive};
use crate::router::Fetched;
use crate::task::LINE_SEPARATOR;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Recovers a log from the remote archive once the producing node no longer has it.
///
/// Each recovery materializes the archived object at the log path, reads
/// it, then deletes the local copy so repeated requests leave nothing behind.
/// A file already present at the log path is never touched.
pub struct RemoteFallbackReader {
    archive: Arc<dyn RemoteArchive>,
    files: Arc<dyn LocalFileStore>,
}

impl RemoteFallbackReader {
    pub fn new(archive: Arc<dyn RemoteArchive>, files: Arc<dyn LocalFileStore>) -> Self {
        Self { archive, files }
    }

    pub fn is_enabled(&self) -> bool {
        self.archive.is_enabled()
    }

    /// True when a file already sits at `log_path`. On a host that also runs
    /// tasks this is the live log, and the archive must not replace it.
    async fn has_local_copy(&self, log_path: &str) -> Result<bool, SourceError> {
        let present = self.files.exists(Path::new(log_path)).await?;
        if present {
            info!("{} exists locally, skipping remote target", log_path);
        }
        Ok(present)
    }

    pub async fn recover_page(&self, log_path: &str, skip: usize, limit: usize) -> Fetched<String> {
        match self.has_local_copy(log_path).await {
            Ok(true) => return Fetched::Empty,
            Ok(false) => {}
            Err(e) => return Fetched::Failed(e.to_string()),
        }
        let path = Path::new(log_path);
        let result = self
            .with_materialized(log_path, async {
                let lines = self.files.read_lines(path, skip, limit).await?;
                Ok(lines.join(LINE_SEPARATOR))
            })
            .await;
        match result {
            Ok(text) if text.is_empty() => Fetched::Empty,
            Ok(text) => Fetched::Content(text),
            Err(e) => {
                error!("Error while getting log {} from remote target: {}", log_path, e);
                Fetched::Failed(e.to_string())
            }
        }
    }

    pub async fn recover_whole(&self, log_path: &str) -> Fetched<Vec<u8>> {
        match self.has_local_copy(log_path).await {
            Ok(true) => return Fetched::Empty,
            Ok(false) => {}
            Err(e) => return Fetched::Failed(e.to_string()),
        }
        let path = Path::new(log_path);
        let result = self
            .with_materialized(log_path, self.files.read_all(path))
            .await;
        match result {
            Ok(bytes) if bytes.is_empty() => Fetched::Empty,
            Ok(bytes) => Fetched::Content(bytes),
            Err(e) => {
                error!("Error while getting log {} from remote target: {}", log_path, e);
                Fetched::Failed(e.to_string())
            }
        }
    }

    /// Materialize, run `read`, then delete the local copy whatever `read` returned.
    async fn with_materialized<T, F>(&self, log_path: &str, read: F) -> Result<T, SourceError>
    where
        F: std::future::Future<Output = Result<T, SourceError>>,
    {
        info!("Get log {} from remote target", log_path);
        self.archive.materialize(log_path).await?;
        let result = read.await;
        match self.files.delete(Path::new(log_path)).await {
            Ok(()) => debug!("Removed local copy of {}", log_path),
            Err(e) => warn!("Failed to remove local copy of {}: {}", log_path, e),
        }
        result
    }
}
