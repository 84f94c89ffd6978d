use crate::assembler::{assemble_download, assemble_page};
use crate::error::LogError;
use crate::fallback::RemoteFallbackReader;
use crate::locator::LogLocator;
use crate::ports::AccessControl;
use crate::router::{Fetched, LogSourceRouter};
use crate::task::{AssembledLog, Capability, DownloadedLog, TaskInstanceId, TaskInstanceRef, User};
use std::sync::Arc;
use tracing::info;

/// Public entry points for viewing and downloading task instance logs.
///
/// Authorization and lookup failures abort before any log source is
/// contacted. Past that point a call always succeeds, possibly with an
/// empty body.
pub struct LogRetrievalService {
    access: Arc<dyn AccessControl>,
    locator: LogLocator,
    router: LogSourceRouter,
    fallback: RemoteFallbackReader,
}

impl LogRetrievalService {
    pub fn new(
        access: Arc<dyn AccessControl>,
        locator: LogLocator,
        router: LogSourceRouter,
        fallback: RemoteFallbackReader,
    ) -> Self {
        Self {
            access,
            locator,
            router,
            fallback,
        }
    }

    /// View a page of the log, authorizing against the project that owns the instance.
    pub async fn view_log(
        &self,
        user: &User,
        task_instance_id: TaskInstanceId,
        skip: usize,
        limit: usize,
    ) -> Result<AssembledLog, LogError> {
        let task = self.locator.locate(task_instance_id).await?;
        let project = self.locator.owning_project(task_instance_id).await?;
        self.access
            .authorize(user, &project, Capability::ViewLog)
            .await?;
        Ok(self.read_page(&task, skip, limit).await)
    }

    /// Download the whole log, authorizing against the project that owns the instance.
    pub async fn download_log(
        &self,
        user: &User,
        task_instance_id: TaskInstanceId,
    ) -> Result<DownloadedLog, LogError> {
        let task = self.locator.locate(task_instance_id).await?;
        let project = self.locator.owning_project(task_instance_id).await?;
        self.access
            .authorize(user, &project, Capability::DownloadLog)
            .await?;
        Ok(self.read_whole(&task).await)
    }

    /// View a page of the log of an instance the caller claims belongs to `project_code`.
    pub async fn view_project_log(
        &self,
        user: &User,
        project_code: i64,
        task_instance_id: TaskInstanceId,
        skip: usize,
        limit: usize,
    ) -> Result<AssembledLog, LogError> {
        self.access
            .authorize_code(user, project_code, Capability::ViewLog)
            .await?;
        let task = self
            .locator
            .locate_and_verify_project(task_instance_id, project_code)
            .await?;
        Ok(self.read_page(&task, skip, limit).await)
    }

    /// Download the log of an instance the caller claims belongs to `project_code`.
    pub async fn download_project_log(
        &self,
        user: &User,
        project_code: i64,
        task_instance_id: TaskInstanceId,
    ) -> Result<DownloadedLog, LogError> {
        self.access
            .authorize_code(user, project_code, Capability::DownloadLog)
            .await?;
        let task = self
            .locator
            .locate_and_verify_project(task_instance_id, project_code)
            .await?;
        Ok(self.read_whole(&task).await)
    }

    async fn read_page(&self, task: &TaskInstanceRef, skip: usize, limit: usize) -> AssembledLog {
        info!(
            "Query task instance log, taskInstanceId: {}, taskInstanceName: {}, host: {}, logPath: {}",
            task.id, task.name, task.host, task.log_path
        );
        let backend = self.router.fetch_page(task, skip, limit).await;
        let archive = if !backend.has_content() && self.fallback.is_enabled() {
            Some(self.fallback.recover_page(&task.log_path, skip, limit).await)
        } else {
            None
        };
        assemble_page(task, skip, backend, archive)
    }

    async fn read_whole(&self, task: &TaskInstanceRef) -> DownloadedLog {
        info!(
            "Download task instance log, taskInstanceId: {}, taskInstanceName: {}, host: {}, logPath: {}",
            task.id, task.name, task.host, task.log_path
        );
        let backend = self.router.fetch_whole(task).await;
        let archive: Option<Fetched<Vec<u8>>> =
            if !backend.has_content() && self.fallback.is_enabled() {
                Some(self.fallback.recover_whole(&task.log_path).await)
            } else {
                None
            };
        assemble_download(task, backend, archive)
    }
}
