use std::io::Write;
use std::path::Path;
use tasklog_core::{LogRetrievalService, TaskInstanceId, User};
use tracing::{info, warn};

pub async fn run(
    service: &LogRetrievalService,
    user: &User,
    task_instance_id: i64,
    project: Option<i64>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let id = TaskInstanceId(task_instance_id);
    let log = match project {
        Some(code) => service.download_project_log(user, code, id).await?,
        None => service.download_log(user, id).await?,
    };

    if log.diagnostics.degraded() {
        warn!(
            "Log sources failed for task instance {}: backend={:?}, archive={:?}",
            id, log.diagnostics.backend_failure, log.diagnostics.archive_failure
        );
    }

    match output {
        Some(path) => {
            std::fs::write(path, &log.bytes)?;
            info!("Wrote {} bytes to {}", log.bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&log.bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
