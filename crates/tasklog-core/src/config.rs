use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
/// Loaded from ~/.config/tasklog/config.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub services: Services,
    #[serde(default = "default_logic_task_types")]
    pub logic_task_types: Vec<String>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Catalog of projects, task definitions, task instances and grants.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

/// How log services on task hosts are reached.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    #[default]
    Ssh,
    /// Every host is this machine; logs are read straight from disk.
    Local,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Ssh => write!(f, "ssh"),
            Transport::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Services {
    #[serde(default)]
    pub master: ServiceEndpoint,
    #[serde(default)]
    pub worker: ServiceEndpoint,
}

/// SSH login used to reach one kind of log service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServiceEndpoint {
    /// Get the SSH port, falling back to 22.
    pub fn ssh_port(&self) -> u16 {
        self.port.unwrap_or(22)
    }

    /// Get the SSH timeout in milliseconds, falling back to 10 seconds.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_secs
            .map(|s| u32::try_from(s.saturating_mul(1000)).unwrap_or(u32::MAX))
            .unwrap_or(10_000)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveType {
    #[default]
    Disabled,
    /// Archive mounted as a local directory.
    Directory,
    /// Archive reached by running a fetch command.
    Command,
}

impl std::fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveType::Disabled => write!(f, "disabled"),
            ArchiveType::Directory => write!(f, "directory"),
            ArchiveType::Command => write!(f, "command"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(rename = "type", default)]
    pub archive_type: ArchiveType,
    /// Directory root, or object key prefix for the command archive.
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    /// Command arguments; `{remote}` and `{local}` are substituted.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_logic_task_types() -> Vec<String> {
    ["SUB_PROCESS", "DEPENDENT", "CONDITIONS", "SWITCH", "DYNAMIC"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            services: Services::default(),
            logic_task_types: default_logic_task_types(),
            archive: ArchiveConfig::default(),
            catalog: None,
        }
    }
}

impl Config {
    /// Load config from the default path (~/.config/tasklog/config.yaml).
    pub fn load_default() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("tasklog")
            .join("config.yaml")
    }

    /// Catalog path, relative paths resolved against the config file's directory.
    pub fn catalog_path(&self, config_path: &Path) -> Option<PathBuf> {
        let catalog = self.catalog.as_ref()?;
        if catalog.is_absolute() {
            return Some(catalog.clone());
        }
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(catalog))
    }
}
