use std::path::{Path, PathBuf};
use std::sync::Arc;
use tasklog_archive::{CommandArchive, DirectoryArchive, DisabledArchive};
use tasklog_core::config::{ArchiveConfig, ArchiveType, Config, Transport};
use tasklog_core::error::LogError;
use tasklog_core::ports::{LogClientProvider, RemoteArchive};
use tasklog_core::{
    Catalog, LogLocator, LogRetrievalService, LogSourceRouter, LogicTaskTypes,
    RemoteFallbackReader, User,
};
use tasklog_local::{FsLocalStore, LocalClientProvider};
use tasklog_ssh::SshClientProvider;

/// Load the config at `path`, or the default one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<(Config, PathBuf)> {
    match path {
        Some(path) => Ok((Config::load_from(path)?, path.to_path_buf())),
        None => Ok((Config::load_default()?, Config::default_path())),
    }
}

/// Create the log client provider for the configured transport.
pub fn create_provider(config: &Config) -> Arc<dyn LogClientProvider> {
    match config.transport {
        Transport::Ssh => Arc::new(SshClientProvider::new(config.services.clone())),
        Transport::Local => Arc::new(LocalClientProvider::new()),
    }
}

/// Create the remote archive from its config section.
pub fn create_archive(config: &ArchiveConfig) -> Result<Arc<dyn RemoteArchive>, LogError> {
    match config.archive_type {
        ArchiveType::Disabled => Ok(Arc::new(DisabledArchive)),
        ArchiveType::Directory => {
            let root = config
                .root
                .as_deref()
                .ok_or_else(|| LogError::Config("directory archive requires 'root'".into()))?;
            Ok(Arc::new(DirectoryArchive::new(root)))
        }
        ArchiveType::Command => {
            let program = config
                .program
                .as_deref()
                .ok_or_else(|| LogError::Config("command archive requires 'program'".into()))?;
            Ok(Arc::new(CommandArchive::new(
                program,
                config.args.clone(),
                config.root.clone().unwrap_or_default(),
            )))
        }
    }
}

pub fn load_catalog(config: &Config, config_path: &Path) -> anyhow::Result<Arc<Catalog>> {
    let path = config.catalog_path(config_path).ok_or_else(|| {
        LogError::Config(format!("no 'catalog' configured in {}", config_path.display()))
    })?;
    Ok(Arc::new(Catalog::load_from(&path)?))
}

/// Wire the retrieval service from config.
pub fn create_service(config: &Config, catalog: Arc<Catalog>) -> anyhow::Result<LogRetrievalService> {
    let classifier = Arc::new(LogicTaskTypes::new(&config.logic_task_types));
    let router = LogSourceRouter::with_provider(classifier, create_provider(config));
    let fallback = RemoteFallbackReader::new(
        create_archive(&config.archive)?,
        Arc::new(FsLocalStore::new()),
    );
    Ok(LogRetrievalService::new(
        catalog.clone(),
        LogLocator::new(catalog.clone(), catalog),
        router,
        fallback,
    ))
}

/// Catalog entry for `name`, or an unprivileged user.
pub fn resolve_user(catalog: &Catalog, name: &str) -> User {
    catalog
        .user(name)
        .cloned()
        .unwrap_or_else(|| User::new(name))
}
