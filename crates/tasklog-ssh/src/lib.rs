pub mod provider;
pub mod ssh_client;

pub use provider::SshClientProvider;
pub use ssh_client::SshLogClient;
