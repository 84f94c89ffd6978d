use std::io::ErrorKind;
use std::path::Path;
use tasklog_core::error::SourceError;
use tasklog_core::ports::LocalFileStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// LocalFileStore on the machine this process runs on.
#[derive(Debug, Clone, Default)]
pub struct FsLocalStore;

impl FsLocalStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl LocalFileStore for FsLocalStore {
    async fn exists(&self, path: &Path) -> Result<bool, SourceError> {
        Ok(tokio::fs::try_exists(path).await?)
    }

    /// Invalid UTF-8 is replaced rather than rejected, so one bad byte
    /// does not hide the rest of the log.
    async fn read_lines(
        &self,
        path: &Path,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<String>, SourceError> {
        let file = tokio::fs::File::open(path).await?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        let mut index = 0usize;

        while out.len() < limit {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            if index >= skip {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                out.push(String::from_utf8_lossy(&buf).into_owned());
            }
            index += 1;
        }

        Ok(out)
    }

    async fn read_all(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        Ok(tokio::fs::read(path).await?)
    }

    async fn delete(&self, path: &Path) -> Result<(), SourceError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            // Another request may have removed it first.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} already removed", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_lines_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        std::fs::write(&path, "L0\nL1\nL2\nL3\nL4\n").unwrap();

        let store = FsLocalStore::new();
        assert_eq!(store.read_lines(&path, 1, 2).await.unwrap(), vec!["L1", "L2"]);
        assert_eq!(store.read_lines(&path, 3, 10).await.unwrap(), vec!["L3", "L4"]);
        assert!(store.read_lines(&path, 0, 0).await.unwrap().is_empty());
        assert!(store.read_lines(&path, 9, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_lines_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        std::fs::write(&path, b"L0\nL1 \xff\nL2\n").unwrap();

        let store = FsLocalStore::new();
        assert_eq!(
            store.read_lines(&path, 0, 10).await.unwrap(),
            vec!["L0", "L1 \u{FFFD}", "L2"]
        );
        assert_eq!(store.read_lines(&path, 2, 10).await.unwrap(), vec!["L2"]);
    }

    #[tokio::test]
    async fn test_read_lines_strips_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        std::fs::write(&path, "L0\r\nL1").unwrap();

        let store = FsLocalStore::new();
        assert_eq!(store.read_lines(&path, 0, 10).await.unwrap(), vec!["L0", "L1"]);
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        let store = FsLocalStore::new();
        assert!(!store.exists(&path).await.unwrap());
        std::fs::write(&path, "x").unwrap();
        assert!(store.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLocalStore::new();
        assert!(store.read_all(&dir.path().join("gone.log")).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_twice_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        std::fs::write(&path, "x").unwrap();

        let store = FsLocalStore::new();
        store.delete(&path).await.unwrap();
        store.delete(&path).await.unwrap();
        assert!(!path.exists());
    }
}
