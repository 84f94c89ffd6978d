use crate::ssh_client::SshLogClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tasklog_core::config::Services;
use tasklog_core::error::SourceError;
use tasklog_core::ports::{LogClientProvider, LogServiceClient};
use tasklog_core::task::LogServiceKind;
use tracing::{debug, info};

/// Keeps one SSH client per (host, service), keyed by the literal host
/// string of the task instance. Sessions stay open until closed here.
pub struct SshClientProvider {
    services: Services,
    clients: Mutex<HashMap<(String, LogServiceKind), Arc<SshLogClient>>>,
}

impl SshClientProvider {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, LogServiceKind), Arc<SshLogClient>>>, SourceError>
    {
        self.clients
            .lock()
            .map_err(|_| SourceError::Remote("SSH client cache poisoned".to_string()))
    }

    /// Number of cached clients.
    pub fn len(&self) -> usize {
        self.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close and forget every client for `host`.
    pub fn close(&self, host: &str) {
        if let Ok(mut clients) = self.lock() {
            clients.retain(|(h, _), client| {
                if h == host {
                    client.close();
                    false
                } else {
                    true
                }
            });
        }
    }

    pub fn close_all(&self) {
        if let Ok(mut clients) = self.lock() {
            for client in clients.values() {
                client.close();
            }
            info!("Closed {} SSH log clients", clients.len());
            clients.clear();
        }
    }
}

impl LogClientProvider for SshClientProvider {
    fn client(
        &self,
        host: &str,
        service: LogServiceKind,
    ) -> Result<Arc<dyn LogServiceClient>, SourceError> {
        let mut clients = self.lock()?;
        let client = clients
            .entry((host.to_string(), service))
            .or_insert_with(|| {
                debug!("New SSH client for {} on {}", service, host);
                let endpoint = match service {
                    LogServiceKind::Master => self.services.master.clone(),
                    LogServiceKind::Worker => self.services.worker.clone(),
                };
                Arc::new(SshLogClient::new(host, service, endpoint))
            })
            .clone();
        Ok(client)
    }
}

impl Drop for SshClientProvider {
    fn drop(&mut self) {
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_cached_per_host_and_service() {
        let provider = SshClientProvider::new(Services::default());
        let a = provider.client("worker-1:1234", LogServiceKind::Worker).unwrap();
        let b = provider.client("worker-1:1234", LogServiceKind::Worker).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        provider.client("worker-1:1234", LogServiceKind::Master).unwrap();
        provider.client("worker-2:1234", LogServiceKind::Worker).unwrap();
        assert_eq!(provider.len(), 3);
    }

    #[test]
    fn test_close_host() {
        let provider = SshClientProvider::new(Services::default());
        provider.client("worker-1", LogServiceKind::Worker).unwrap();
        provider.client("worker-1", LogServiceKind::Master).unwrap();
        provider.client("worker-2", LogServiceKind::Worker).unwrap();

        provider.close("worker-1");
        assert_eq!(provider.len(), 1);

        provider.close_all();
        assert!(provider.is_empty());
    }
}
