pub mod local_client;
pub mod local_store;

pub use local_client::{LocalClientProvider, LocalLogClient};
pub use local_store::FsLocalStore;
