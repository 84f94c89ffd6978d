use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used to split and rejoin log lines and to terminate the header.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskInstanceId(pub i64);

impl fmt::Display for TaskInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskInstanceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One execution attempt of a task definition, as recorded by the orchestration store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInstanceRef {
    pub id: TaskInstanceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub log_path: String,
    pub task_type: String,
    pub task_code: i64,
}

impl TaskInstanceRef {
    /// A log can only exist once the instance was dispatched to a host.
    pub fn has_host(&self) -> bool {
        !self.host.trim().is_empty()
    }

    pub fn has_log_path(&self) -> bool {
        !self.log_path.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDefinitionRef {
    pub code: i64,
    pub project_code: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub code: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub admin: bool,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    ViewLog,
    DownloadLog,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ViewLog => write!(f, "VIEW_LOG"),
            Capability::DownloadLog => write!(f, "DOWNLOAD_LOG"),
        }
    }
}

/// Where a task kind runs, and therefore which log service holds its log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Executed in-process by the master.
    Logic,
    /// Dispatched to a worker node.
    Worker,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Logic => write!(f, "logic"),
            TaskKind::Worker => write!(f, "worker"),
        }
    }
}

/// Remote capability a stub is bound to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogServiceKind {
    Master,
    Worker,
}

impl fmt::Display for LogServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogServiceKind::Master => write!(f, "master log service"),
            LogServiceKind::Worker => write!(f, "worker log service"),
        }
    }
}

/// Page query sent to a log service. `limit == 0` asks for zero lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogQueryRequest {
    pub task_instance_id: TaskInstanceId,
    pub log_path: String,
    pub skip_line_num: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogDownloadRequest {
    pub task_instance_id: TaskInstanceId,
    pub log_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogQueryResult {
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogDownloadResult {
    pub bytes: Vec<u8>,
}

/// Which source produced the body of an assembled log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogOrigin {
    Backend,
    Archive,
    /// Neither source had content; the body is empty.
    Empty,
}

impl fmt::Display for LogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOrigin::Backend => write!(f, "backend"),
            LogOrigin::Archive => write!(f, "archive"),
            LogOrigin::Empty => write!(f, "empty"),
        }
    }
}

/// Observability record for one retrieval: where the body came from and
/// which sources failed on the way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrievalDiagnostics {
    pub origin: LogOrigin,
    pub backend_failure: Option<String>,
    pub archive_failure: Option<String>,
}

impl RetrievalDiagnostics {
    /// True when the body is empty because a source failed, not because the log is empty.
    pub fn degraded(&self) -> bool {
        self.origin == LogOrigin::Empty
            && (self.backend_failure.is_some() || self.archive_failure.is_some())
    }
}

/// Paginated text view of a task log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssembledLog {
    pub line_count: usize,
    pub text: String,
    pub diagnostics: RetrievalDiagnostics,
}

impl AssembledLog {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "line_count": self.line_count,
            "message": self.text,
            "origin": self.diagnostics.origin,
            "backend_failure": self.diagnostics.backend_failure,
            "archive_failure": self.diagnostics.archive_failure,
        })
    }
}

/// Whole-file download of a task log, header included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadedLog {
    pub bytes: Vec<u8>,
    pub diagnostics: RetrievalDiagnostics,
}
