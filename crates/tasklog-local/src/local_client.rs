use crate::local_store::FsLocalStore;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tasklog_core::error::SourceError;
use tasklog_core::ports::{LocalFileStore, LogClientProvider, LogServiceClient};
use tasklog_core::task::{
    LogDownloadRequest, LogDownloadResult, LogQueryRequest, LogQueryResult, LogServiceKind,
    LINE_SEPARATOR,
};
use tracing::debug;

/// Log service answering from this machine's disk, for deployments where
/// the master, the workers and this process share one host.
#[derive(Debug, Clone, Default)]
pub struct LocalLogClient {
    store: FsLocalStore,
}

impl LocalLogClient {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_is_empty<T: Default>(result: Result<T, SourceError>) -> Result<T, SourceError> {
    match result {
        Err(SourceError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        other => other,
    }
}

#[async_trait::async_trait]
impl LogServiceClient for LocalLogClient {
    async fn page_query_log(
        &self,
        request: LogQueryRequest,
    ) -> Result<LogQueryResult, SourceError> {
        let lines = missing_is_empty(
            self.store
                .read_lines(
                    Path::new(&request.log_path),
                    request.skip_line_num,
                    request.limit,
                )
                .await,
        )?;
        Ok(LogQueryResult {
            content: lines.join(LINE_SEPARATOR),
        })
    }

    async fn download_whole_log(
        &self,
        request: LogDownloadRequest,
    ) -> Result<LogDownloadResult, SourceError> {
        let bytes = missing_is_empty(self.store.read_all(Path::new(&request.log_path)).await)?;
        Ok(LogDownloadResult { bytes })
    }
}

/// Hands out the same local client for every host and service.
#[derive(Debug, Clone, Default)]
pub struct LocalClientProvider {
    client: Arc<LocalLogClient>,
}

impl LocalClientProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogClientProvider for LocalClientProvider {
    fn client(
        &self,
        host: &str,
        service: LogServiceKind,
    ) -> Result<Arc<dyn LogServiceClient>, SourceError> {
        debug!("Serving {} for {} from local disk", service, host);
        Ok(self.client.clone())
    }
}
