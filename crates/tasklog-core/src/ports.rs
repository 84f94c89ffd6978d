//! Collaborators the retrieval pipeline talks to. Every trait here is
//! implemented outside the pipeline: by the `Catalog`, by the transport
//! crates, or by test fakes.

use crate::error::{LogError, SourceError};
use crate::task::{
    Capability, LogDownloadRequest, LogDownloadResult, LogQueryRequest, LogQueryResult,
    LogServiceKind, Project, TaskDefinitionRef, TaskInstanceId, TaskInstanceRef, User,
};
use std::path::Path;
use std::sync::Arc;

/// Checks a caller's capability on a project.
#[async_trait::async_trait]
pub trait AccessControl: Send + Sync {
    async fn authorize(
        &self,
        user: &User,
        project: &Project,
        capability: Capability,
    ) -> Result<(), LogError>;

    async fn authorize_code(
        &self,
        user: &User,
        project_code: i64,
        capability: Capability,
    ) -> Result<(), LogError>;
}

#[async_trait::async_trait]
pub trait TaskInstanceStore: Send + Sync {
    async fn query_by_id(&self, id: TaskInstanceId) -> Result<Option<TaskInstanceRef>, LogError>;

    async fn query_project_by_task_instance_id(
        &self,
        id: TaskInstanceId,
    ) -> Result<Option<Project>, LogError>;
}

#[async_trait::async_trait]
pub trait TaskDefinitionStore: Send + Sync {
    async fn query_by_code(&self, task_code: i64) -> Result<Option<TaskDefinitionRef>, LogError>;
}

/// Decides whether a task type runs in-process on the master.
pub trait TaskKindClassifier: Send + Sync {
    fn is_logic_task(&self, task_type: &str) -> bool;
}

/// RPC stub for one log service on one host.
#[async_trait::async_trait]
pub trait LogServiceClient: Send + Sync {
    async fn page_query_log(&self, request: LogQueryRequest)
        -> Result<LogQueryResult, SourceError>;

    async fn download_whole_log(
        &self,
        request: LogDownloadRequest,
    ) -> Result<LogDownloadResult, SourceError>;
}

/// Resolves a literal host string to a stub for the given service.
/// Implementations own the stubs' lifecycle; the pipeline never caches them.
pub trait LogClientProvider: Send + Sync {
    fn client(
        &self,
        host: &str,
        service: LogServiceKind,
    ) -> Result<Arc<dyn LogServiceClient>, SourceError>;
}

/// Long-term storage that local task logs are uploaded to.
#[async_trait::async_trait]
pub trait RemoteArchive: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Fetch the archived copy of `log_path` back to `log_path` on local disk.
    async fn materialize(&self, log_path: &str) -> Result<(), SourceError>;
}

#[async_trait::async_trait]
pub trait LocalFileStore: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool, SourceError>;

    /// Lines `[skip, skip + limit)` of the file, without separators.
    async fn read_lines(
        &self,
        path: &Path,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<String>, SourceError>;

    async fn read_all(&self, path: &Path) -> Result<Vec<u8>, SourceError>;

    async fn delete(&self, path: &Path) -> Result<(), SourceError>;
}
