use std::path::Path;
use tasklog_core::Config;

const SAMPLE_CONFIG: &str = r#"# tasklog configuration

# ssh: reach master/worker hosts over SSH; local: every host is this machine
transport: ssh

services:
  master:
    user: dolphinscheduler
    port: 22
    timeout_secs: 10
  worker:
    user: dolphinscheduler
    key_path: ~/.ssh/id_ed25519
    timeout_secs: 10

logic_task_types:
  - SUB_PROCESS
  - DEPENDENT
  - CONDITIONS
  - SWITCH
  - DYNAMIC

archive:
  type: command
  root: s3://ds-logs
  program: aws
  args: ["s3", "cp", "{remote}", "{local}"]

catalog: catalog.yaml
"#;

const SAMPLE_CATALOG: &str = r#"projects:
  - { code: 1, name: etl }
task_definitions:
  - { code: 100, project_code: 1 }
task_instances:
  - { id: 42, name: extract, host: "worker-1:1234", log_path: /var/log/ds/42.log, task_type: SHELL, task_code: 100 }
users:
  - { name: admin, admin: true }
  - { name: analyst }
grants:
  - { user: analyst, project_code: 1, capabilities: [VIEW_LOG] }
"#;

pub async fn run(config_path: &Path, path: bool, init: bool) -> anyhow::Result<()> {
    if path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config already exists at: {}", config_path.display());
            println!("Remove it first if you want to reinitialize.");
            return Ok(());
        }

        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        std::fs::write(config_path, SAMPLE_CONFIG)?;
        let catalog_path = dir.join("catalog.yaml");
        if !catalog_path.exists() {
            std::fs::write(&catalog_path, SAMPLE_CATALOG)?;
        }
        println!("Sample config written to: {}", config_path.display());
        return Ok(());
    }

    println!("Config path: {}", config_path.display());
    if config_path.exists() {
        let config = Config::load_from(config_path)?;
        println!("Transport:   {}", config.transport);
        println!("Archive:     {}", config.archive.archive_type);
        println!("Logic tasks: {}", config.logic_task_types.join(", "));
        match config.catalog_path(config_path) {
            Some(catalog) => println!("Catalog:     {}", catalog.display()),
            None => println!("Catalog:     not configured"),
        }
    } else {
        println!("Status:      not found");
        println!("Run `tasklog config --init` to create one.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklog_core::Catalog;

    #[test]
    fn test_samples_parse() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let catalog_path = dir.path().join("catalog.yaml");
        std::fs::write(&config_path, SAMPLE_CONFIG).unwrap();
        std::fs::write(&catalog_path, SAMPLE_CATALOG).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.logic_task_types.len(), 5);
        assert_eq!(config.catalog_path(&config_path), Some(catalog_path.clone()));

        let catalog = Catalog::load_from(&catalog_path).unwrap();
        assert_eq!(catalog.task_instances.len(), 1);
        assert!(catalog.user("admin").is_some_and(|u| u.admin));
    }

    #[tokio::test]
    async fn test_init_writes_config_and_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasklog/config.yaml");
        run(&path, false, true).await.unwrap();
        assert!(path.exists());
        assert!(dir.path().join("tasklog/catalog.yaml").exists());
    }
}
