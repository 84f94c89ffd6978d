use std::path::{Path, PathBuf};
use tasklog_core::error::SourceError;
use tasklog_core::ports::RemoteArchive;
use tokio::process::Command;
use tracing::{debug, info};

/// Object key of a local log path: the path without its leading `/`.
pub fn archive_key(log_path: &str) -> &str {
    log_path.trim_start_matches('/')
}

async fn ensure_parent(log_path: &str) -> Result<(), SourceError> {
    if let Some(parent) = Path::new(log_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Archive that is switched off. Fallback is never attempted.
#[derive(Debug, Clone, Default)]
pub struct DisabledArchive;

#[async_trait::async_trait]
impl RemoteArchive for DisabledArchive {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn materialize(&self, log_path: &str) -> Result<(), SourceError> {
        Err(SourceError::Archive(format!(
            "remote archive disabled, cannot fetch {}",
            log_path
        )))
    }
}

/// Archive mounted as a directory (NFS, a bucket mount, ...).
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn object_path(&self, log_path: &str) -> PathBuf {
        self.root.join(archive_key(log_path))
    }
}

#[async_trait::async_trait]
impl RemoteArchive for DirectoryArchive {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn materialize(&self, log_path: &str) -> Result<(), SourceError> {
        let object = self.object_path(log_path);
        if !tokio::fs::try_exists(&object).await? {
            return Err(SourceError::Archive(format!(
                "{} not found in archive",
                object.display()
            )));
        }
        ensure_parent(log_path).await?;
        let copied = tokio::fs::copy(&object, log_path).await?;
        debug!("Copied {} bytes from {}", copied, object.display());
        Ok(())
    }
}

/// Archive fetched by an external command, e.g. an object-store CLI.
/// `{remote}` and `{local}` in the arguments are replaced per call.
#[derive(Debug, Clone)]
pub struct CommandArchive {
    program: String,
    args: Vec<String>,
    prefix: String,
}

impl CommandArchive {
    pub fn new(program: impl Into<String>, args: Vec<String>, prefix: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            prefix: prefix.into(),
        }
    }

    pub fn remote_uri(&self, log_path: &str) -> String {
        let key = archive_key(log_path);
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix.trim_end_matches('/'), key)
        }
    }

    pub fn command_args(&self, log_path: &str) -> Vec<String> {
        let remote = self.remote_uri(log_path);
        self.args
            .iter()
            .map(|a| a.replace("{remote}", &remote).replace("{local}", log_path))
            .collect()
    }
}

#[async_trait::async_trait]
impl RemoteArchive for CommandArchive {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn materialize(&self, log_path: &str) -> Result<(), SourceError> {
        ensure_parent(log_path).await?;
        let args = self.command_args(log_path);
        debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| SourceError::Archive(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Archive(format!(
                "{} failed for {}: {}",
                self.program,
                log_path,
                stderr.trim()
            )));
        }

        info!("Fetched {} from {}", log_path, self.remote_uri(log_path));
        Ok(())
    }
}
