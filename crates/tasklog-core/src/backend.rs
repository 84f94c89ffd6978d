use crate::error::SourceError;
use crate::ports::LogClientProvider;
use crate::task::{
    LogDownloadRequest, LogQueryRequest, LogServiceKind, TaskInstanceRef, TaskKind,
};
use std::sync::Arc;
use tracing::debug;

/// A place task logs can be queried from. Every backend variant implements this.
#[async_trait::async_trait]
pub trait LogBackend: Send + Sync {
    /// Task kind this backend serves.
    fn kind(&self) -> TaskKind;

    /// Fetch lines `[skip, skip + limit)` of the task's log.
    async fn page_query(
        &self,
        task: &TaskInstanceRef,
        skip: usize,
        limit: usize,
    ) -> Result<String, SourceError>;

    /// Fetch the whole log file.
    async fn download_whole(&self, task: &TaskInstanceRef) -> Result<Vec<u8>, SourceError>;
}

/// One log service reached through a [`LogClientProvider`]. The master
/// service holds logs of logic tasks, the worker service everything else.
pub struct ServiceLogBackend {
    service: LogServiceKind,
    kind: TaskKind,
    provider: Arc<dyn LogClientProvider>,
}

impl ServiceLogBackend {
    pub fn master(provider: Arc<dyn LogClientProvider>) -> Self {
        Self {
            service: LogServiceKind::Master,
            kind: TaskKind::Logic,
            provider,
        }
    }

    pub fn worker(provider: Arc<dyn LogClientProvider>) -> Self {
        Self {
            service: LogServiceKind::Worker,
            kind: TaskKind::Worker,
            provider,
        }
    }

    pub fn service(&self) -> LogServiceKind {
        self.service
    }
}

#[async_trait::async_trait]
impl LogBackend for ServiceLogBackend {
    fn kind(&self) -> TaskKind {
        self.kind
    }

    async fn page_query(
        &self,
        task: &TaskInstanceRef,
        skip: usize,
        limit: usize,
    ) -> Result<String, SourceError> {
        let client = self.provider.client(&task.host, self.service)?;
        debug!("Page query of {} task {} on {} {}", self.kind, task.id, self.service, task.host);
        let response = client
            .page_query_log(LogQueryRequest {
                task_instance_id: task.id,
                log_path: task.log_path.clone(),
                skip_line_num: skip,
                limit,
            })
            .await?;
        Ok(response.content)
    }

    async fn download_whole(&self, task: &TaskInstanceRef) -> Result<Vec<u8>, SourceError> {
        let client = self.provider.client(&task.host, self.service)?;
        debug!("Whole log of {} task {} from {} {}", self.kind, task.id, self.service, task.host);
        let response = client
            .download_whole_log(LogDownloadRequest {
                task_instance_id: task.id,
                log_path: task.log_path.clone(),
            })
            .await?;
        Ok(response.bytes)
    }
}
