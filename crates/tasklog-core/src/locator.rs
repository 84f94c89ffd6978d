use crate::error::LogError;
use crate::ports::{TaskDefinitionStore, TaskInstanceStore};
use crate::task::{Project, TaskInstanceId, TaskInstanceRef};
use std::sync::Arc;
use tracing::error;

/// Resolves a task instance id into the host and path its log lives at.
pub struct LogLocator {
    instances: Arc<dyn TaskInstanceStore>,
    definitions: Arc<dyn TaskDefinitionStore>,
}

impl LogLocator {
    pub fn new(
        instances: Arc<dyn TaskInstanceStore>,
        definitions: Arc<dyn TaskDefinitionStore>,
    ) -> Self {
        Self {
            instances,
            definitions,
        }
    }

    pub async fn locate(&self, id: TaskInstanceId) -> Result<TaskInstanceRef, LogError> {
        let Some(task) = self.instances.query_by_id(id).await? else {
            error!("Task instance does not exist, taskInstanceId: {}", id);
            return Err(LogError::TaskInstanceNotFound(id));
        };
        if !task.has_host() {
            error!("Host of task instance is empty, taskInstanceId: {}", id);
            return Err(LogError::HostMissing(id));
        }
        if !task.has_log_path() {
            error!("Log path of task instance is empty, taskInstanceId: {}", id);
            return Err(LogError::LogPathMissing(id));
        }
        Ok(task)
    }

    /// Like [`locate`](Self::locate), but an instance whose task definition
    /// belongs to another project is reported as not found.
    pub async fn locate_and_verify_project(
        &self,
        id: TaskInstanceId,
        project_code: i64,
    ) -> Result<TaskInstanceRef, LogError> {
        let task = self.locate(id).await?;
        if let Some(definition) = self.definitions.query_by_code(task.task_code).await? {
            if definition.project_code != project_code {
                error!(
                    "Task instance {} belongs to project {}, not {}",
                    id, definition.project_code, project_code
                );
                return Err(LogError::TaskInstanceNotFound(id));
            }
        }
        Ok(task)
    }

    /// Project owning the task instance, for callers that did not name one.
    pub async fn owning_project(&self, id: TaskInstanceId) -> Result<Project, LogError> {
        self.instances
            .query_project_by_task_instance_id(id)
            .await?
            .ok_or(LogError::TaskInstanceNotFound(id))
    }
}
