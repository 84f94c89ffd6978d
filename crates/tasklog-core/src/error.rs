use crate::task::{Capability, TaskInstanceId};
use thiserror::Error;

/// Failures that abort a retrieval before any log source is touched.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("User {user} has no {capability} permission on project {project_code}")]
    Unauthorized {
        user: String,
        project_code: i64,
        capability: Capability,
    },

    #[error("Project not found: {0}")]
    ProjectNotFound(i64),

    #[error("Task instance not found: {0}")]
    TaskInstanceNotFound(TaskInstanceId),

    #[error("Host of task instance is empty: {0}")]
    HostMissing(TaskInstanceId),

    #[error("Log path of task instance is empty: {0}")]
    LogPathMissing(TaskInstanceId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure of a single log source. Never surfaced to callers of the
/// retrieval service; it degrades to "no content from this source".
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("Timed out talking to {0}")]
    Timeout(String),

    #[error("Remote log service error: {0}")]
    Remote(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
