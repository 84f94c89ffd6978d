use tasklog_core::{LogRetrievalService, TaskInstanceId, User};
use tracing::warn;

pub async fn run(
    service: &LogRetrievalService,
    user: &User,
    task_instance_id: i64,
    project: Option<i64>,
    skip: usize,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let id = TaskInstanceId(task_instance_id);
    let log = match project {
        Some(code) => service.view_project_log(user, code, id, skip, limit).await?,
        None => service.view_log(user, id, skip, limit).await?,
    };

    if log.diagnostics.degraded() {
        warn!(
            "Log sources failed for task instance {}: backend={:?}, archive={:?}",
            id, log.diagnostics.backend_failure, log.diagnostics.archive_failure
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&log.to_json())?);
    } else {
        println!("{}", log.text);
    }

    Ok(())
}
