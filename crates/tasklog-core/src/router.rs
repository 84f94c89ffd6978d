use crate::backend::{LogBackend, ServiceLogBackend};
use crate::ports::{LogClientProvider, TaskKindClassifier};
use crate::task::{TaskInstanceRef, TaskKind};
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of asking one source for a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Content(T),
    /// The source answered but had nothing.
    Empty,
    /// The source could not be reached or raised an error.
    Failed(String),
}

impl<T> Fetched<T> {
    pub fn has_content(&self) -> bool {
        matches!(self, Fetched::Content(_))
    }

    pub fn failure(&self) -> Option<String> {
        match self {
            Fetched::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

/// Picks the backend for a task instance and issues one query against it.
pub struct LogSourceRouter {
    classifier: Arc<dyn TaskKindClassifier>,
    master: Arc<dyn LogBackend>,
    worker: Arc<dyn LogBackend>,
}

impl LogSourceRouter {
    pub fn new(
        classifier: Arc<dyn TaskKindClassifier>,
        master: Arc<dyn LogBackend>,
        worker: Arc<dyn LogBackend>,
    ) -> Self {
        Self {
            classifier,
            master,
            worker,
        }
    }

    /// Router over the master and worker log services of one provider.
    pub fn with_provider(
        classifier: Arc<dyn TaskKindClassifier>,
        provider: Arc<dyn LogClientProvider>,
    ) -> Self {
        Self::new(
            classifier,
            Arc::new(ServiceLogBackend::master(provider.clone())),
            Arc::new(ServiceLogBackend::worker(provider)),
        )
    }

    pub fn classify(&self, task: &TaskInstanceRef) -> TaskKind {
        if self.classifier.is_logic_task(&task.task_type) {
            TaskKind::Logic
        } else {
            TaskKind::Worker
        }
    }

    fn backend_for(&self, task: &TaskInstanceRef) -> &dyn LogBackend {
        match self.classify(task) {
            TaskKind::Logic => self.master.as_ref(),
            TaskKind::Worker => self.worker.as_ref(),
        }
    }

    pub async fn fetch_page(
        &self,
        task: &TaskInstanceRef,
        skip: usize,
        limit: usize,
    ) -> Fetched<String> {
        let backend = self.backend_for(task);
        match backend.page_query(task, skip, limit).await {
            Ok(content) if content.is_empty() => {
                debug!("{} backend has no log for task {}", backend.kind(), task.id);
                Fetched::Empty
            }
            Ok(content) => Fetched::Content(content),
            Err(e) => {
                error!(
                    "Query {} task instance log error, taskInstanceId: {}, host: {}: {}",
                    backend.kind(),
                    task.id,
                    task.host,
                    e
                );
                Fetched::Failed(e.to_string())
            }
        }
    }

    pub async fn fetch_whole(&self, task: &TaskInstanceRef) -> Fetched<Vec<u8>> {
        let backend = self.backend_for(task);
        match backend.download_whole(task).await {
            Ok(bytes) if bytes.is_empty() => {
                debug!("{} backend has no log file for task {}", backend.kind(), task.id);
                Fetched::Empty
            }
            Ok(bytes) => Fetched::Content(bytes),
            Err(e) => {
                error!(
                    "Download {} task instance log error, taskInstanceId: {}, host: {}: {}",
                    backend.kind(),
                    task.id,
                    task.host,
                    e
                );
                Fetched::Failed(e.to_string())
            }
        }
    }
}
