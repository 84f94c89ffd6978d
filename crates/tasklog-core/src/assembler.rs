use crate::router::Fetched;
use crate::task::{
    AssembledLog, DownloadedLog, LogOrigin, RetrievalDiagnostics, TaskInstanceRef,
    LINE_SEPARATOR,
};

/// Header line placed before the first page and before every download.
pub fn log_header(log_path: &str, host: &str) -> String {
    format!("[LOG-PATH]: {}, [HOST]:  {}{}", log_path, host, LINE_SEPARATOR)
}

/// Number of separator-delimited segments in `text`. Trailing empty
/// segments are not counted; the empty string counts as one segment.
pub fn count_lines(text: &str) -> usize {
    let mut segments: Vec<&str> = text.split(LINE_SEPARATOR).collect();
    if segments.len() > 1 {
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
    }
    segments.len()
}

fn diagnostics<T>(backend: &Fetched<T>, archive: Option<&Fetched<T>>) -> RetrievalDiagnostics {
    let origin = if backend.has_content() {
        LogOrigin::Backend
    } else if archive.is_some_and(Fetched::has_content) {
        LogOrigin::Archive
    } else {
        LogOrigin::Empty
    };
    RetrievalDiagnostics {
        origin,
        backend_failure: backend.failure(),
        archive_failure: archive.and_then(Fetched::failure),
    }
}

/// Builds the paginated view. The header is emitted only when `skip == 0`.
pub fn assemble_page(
    task: &TaskInstanceRef,
    skip: usize,
    backend: Fetched<String>,
    archive: Option<Fetched<String>>,
) -> AssembledLog {
    let diagnostics = diagnostics(&backend, archive.as_ref());
    let mut text = String::new();
    if skip == 0 {
        text.push_str(&log_header(&task.log_path, &task.host));
    }
    match (backend, archive) {
        (Fetched::Content(body), _) | (_, Some(Fetched::Content(body))) => text.push_str(&body),
        _ => {}
    }
    AssembledLog {
        line_count: count_lines(&text),
        text,
        diagnostics,
    }
}

/// Builds the download: header bytes followed by the body bytes.
pub fn assemble_download(
    task: &TaskInstanceRef,
    backend: Fetched<Vec<u8>>,
    archive: Option<Fetched<Vec<u8>>>,
) -> DownloadedLog {
    let diagnostics = diagnostics(&backend, archive.as_ref());
    let mut bytes = log_header(&task.log_path, &task.host).into_bytes();
    match (backend, archive) {
        (Fetched::Content(body), _) | (_, Some(Fetched::Content(body))) => {
            bytes.extend_from_slice(&body)
        }
        _ => {}
    }
    DownloadedLog { bytes, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskInstanceId;

    fn task() -> TaskInstanceRef {
        TaskInstanceRef {
            id: TaskInstanceId(42),
            name: "extract".to_string(),
            host: "worker-1".to_string(),
            log_path: "/logs/42.log".to_string(),
            task_type: "SHELL".to_string(),
            task_code: 7,
        }
    }

    #[test]
    fn test_header_format() {
        assert_eq!(
            log_header("/logs/42.log", "worker-1"),
            format!("[LOG-PATH]: /logs/42.log, [HOST]:  worker-1{}", LINE_SEPARATOR)
        );
    }

    #[test]
    fn test_count_lines() {
        let sep = LINE_SEPARATOR;
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines(&format!("a{sep}b{sep}c")), 3);
        assert_eq!(count_lines(&format!("a{sep}b{sep}")), 2);
    }

    #[test]
    fn test_first_page_has_header() {
        let body = format!("line1{}line2", LINE_SEPARATOR);
        let log = assemble_page(&task(), 0, Fetched::Content(body.clone()), None);
        assert_eq!(log.text, format!("{}{}", log_header("/logs/42.log", "worker-1"), body));
        assert_eq!(log.line_count, 3);
        assert_eq!(log.diagnostics.origin, LogOrigin::Backend);
    }

    #[test]
    fn test_later_page_has_no_header() {
        let log = assemble_page(&task(), 5, Fetched::Content("line6".to_string()), None);
        assert_eq!(log.text, "line6");
        assert!(!log.text.contains("[LOG-PATH]"));
    }

    #[test]
    fn test_archive_body_used_when_backend_failed() {
        let log = assemble_page(
            &task(),
            3,
            Fetched::Failed("connection refused".to_string()),
            Some(Fetched::Content("archived".to_string())),
        );
        assert_eq!(log.text, "archived");
        assert_eq!(log.diagnostics.origin, LogOrigin::Archive);
        assert_eq!(
            log.diagnostics.backend_failure.as_deref(),
            Some("connection refused")
        );
        assert!(!log.diagnostics.degraded());
    }

    #[test]
    fn test_nothing_found_is_header_only() {
        let log = assemble_page(&task(), 0, Fetched::Failed("boom".to_string()), None);
        assert_eq!(log.text, log_header("/logs/42.log", "worker-1"));
        assert_eq!(log.line_count, 1);
        assert!(log.diagnostics.degraded());
    }

    #[test]
    fn test_download_concatenates_bytes() {
        let log = assemble_download(&task(), Fetched::Content(vec![0xff, 0x00, b'x']), None);
        let mut expected = log_header("/logs/42.log", "worker-1").into_bytes();
        expected.extend_from_slice(&[0xff, 0x00, b'x']);
        assert_eq!(log.bytes, expected);
    }
}
