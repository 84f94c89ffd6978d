pub mod assembler;
pub mod backend;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fallback;
pub mod locator;
pub mod ports;
pub mod router;
pub mod service;
pub mod task;

pub use backend::{LogBackend, ServiceLogBackend};
pub use catalog::Catalog;
pub use classifier::LogicTaskTypes;
pub use config::Config;
pub use error::{LogError, SourceError};
pub use fallback::RemoteFallbackReader;
pub use locator::LogLocator;
pub use router::{Fetched, LogSourceRouter};
pub use service::LogRetrievalService;
pub use task::{AssembledLog, DownloadedLog, TaskInstanceId, TaskInstanceRef, User};
