use ssh2::Session;
use std::io::{ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;
use tasklog_core::config::ServiceEndpoint;
use tasklog_core::error::SourceError;
use tasklog_core::ports::LogServiceClient;
use tasklog_core::task::{
    LogDownloadRequest, LogDownloadResult, LogQueryRequest, LogQueryResult, LogServiceKind,
    LINE_SEPARATOR,
};
use tracing::{debug, info, warn};

/// Log service on one host, reached over SSH. The session is opened on
/// first use and kept until [`close`](Self::close) or a failed call.
pub struct SshLogClient {
    host: String,
    service: LogServiceKind,
    endpoint: ServiceEndpoint,
    session: Mutex<Option<Session>>,
}

impl SshLogClient {
    pub fn new(host: &str, service: LogServiceKind, endpoint: ServiceEndpoint) -> Self {
        Self {
            host: host.to_string(),
            service,
            endpoint,
            session: Mutex::new(None),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_open(&self) -> bool {
        self.session.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Drop the session, if any.
    pub fn close(&self) {
        if let Ok(mut session) = self.session.lock() {
            if session.take().is_some() {
                debug!("Closed SSH session to {} ({})", self.host, self.service);
            }
        }
    }

    fn connection_error(&self, reason: impl std::fmt::Display) -> SourceError {
        SourceError::Connection {
            host: self.host.clone(),
            reason: reason.to_string(),
        }
    }

    /// Establish an SSH session to the task host.
    fn connect(&self) -> Result<Session, SourceError> {
        let host = ssh_host(&self.host);
        let user = self
            .endpoint
            .user
            .as_deref()
            .ok_or_else(|| self.connection_error(format!("no SSH user configured for {}", self.service)))?;
        let port = self.endpoint.ssh_port();
        let timeout = Duration::from_millis(u64::from(self.endpoint.timeout_ms()));

        debug!("Connecting to {}@{}:{}", user, host, port);
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| self.connection_error(format!("resolve {}: {}", host, e)))?
            .next()
            .ok_or_else(|| self.connection_error(format!("no address for {}", host)))?;
        let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
            if e.kind() == ErrorKind::TimedOut {
                SourceError::Timeout(self.host.clone())
            } else {
                self.connection_error(format!("TCP connect to {}:{}: {}", host, port, e))
            }
        })?;

        let mut sess = Session::new().map_err(|e| self.connection_error(format!("Session::new: {}", e)))?;
        sess.set_tcp_stream(tcp);
        sess.set_timeout(self.endpoint.timeout_ms());
        sess.handshake()
            .map_err(|e| self.connection_error(format!("Handshake: {}", e)))?;

        if let Some(key_path) = &self.endpoint.key_path {
            sess.userauth_pubkey_file(user, None, std::path::Path::new(key_path), None)
                .map_err(|e| self.connection_error(format!("Pubkey auth: {}", e)))?;
        } else {
            sess.userauth_agent(user)
                .map_err(|e| self.connection_error(format!("Agent auth: {}", e)))?;
        }

        if !sess.authenticated() {
            return Err(self.connection_error("Authentication failed"));
        }

        info!("SSH connected to {}@{}:{} for {}", user, host, port, self.service);
        Ok(sess)
    }

    /// Execute a command on the task host and return stdout.
    fn exec_remote(&self, cmd: &str) -> Result<Vec<u8>, SourceError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| self.connection_error("session lock poisoned"))?;
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let Some(sess) = guard.as_ref() else {
            return Err(self.connection_error("no session"));
        };

        let result = run_channel(sess, cmd);
        if result.is_err() {
            // Reconnect on the next call.
            warn!("Dropping SSH session to {} after failed command", self.host);
            guard.take();
        }
        result
    }
}

fn run_channel(sess: &Session, cmd: &str) -> Result<Vec<u8>, SourceError> {
    debug!("Remote exec: {}", cmd);
    let mut channel = sess
        .channel_session()
        .map_err(|e| SourceError::Remote(format!("Channel: {}", e)))?;
    channel
        .exec(cmd)
        .map_err(|e| SourceError::Remote(format!("Exec '{}': {}", cmd, e)))?;

    let mut output = Vec::new();
    channel.read_to_end(&mut output).map_err(|e| {
        if e.kind() == ErrorKind::TimedOut {
            SourceError::Timeout(format!("reading output of '{}'", cmd))
        } else {
            SourceError::Remote(format!("Read output: {}", e))
        }
    })?;

    let mut stderr = String::new();
    channel
        .stderr()
        .read_to_string(&mut stderr)
        .map_err(|e| SourceError::Remote(format!("Read stderr: {}", e)))?;

    channel.wait_close().ok();
    let exit_status = channel.exit_status().unwrap_or(-1);
    if exit_status != 0 {
        return Err(SourceError::Remote(format!(
            "'{}' exited with {}: {}",
            cmd,
            exit_status,
            stderr.trim()
        )));
    }

    Ok(output)
}

#[async_trait::async_trait]
impl LogServiceClient for SshLogClient {
    async fn page_query_log(
        &self,
        request: LogQueryRequest,
    ) -> Result<LogQueryResult, SourceError> {
        if request.limit == 0 {
            return Ok(LogQueryResult::default());
        }
        let output = self.exec_remote(&page_command(
            &request.log_path,
            request.skip_line_num,
            request.limit,
        ))?;
        Ok(LogQueryResult {
            content: rejoin_lines(&output),
        })
    }

    async fn download_whole_log(
        &self,
        request: LogDownloadRequest,
    ) -> Result<LogDownloadResult, SourceError> {
        let bytes = self.exec_remote(&whole_command(&request.log_path))?;
        Ok(LogDownloadResult { bytes })
    }
}

/// Task hosts are recorded as `name:rpcPort`; SSH needs just the name.
pub fn ssh_host(host: &str) -> &str {
    let host = host.trim();
    if let Some(inner) = host.strip_prefix('[') {
        return inner.split(']').next().unwrap_or(inner);
    }
    match host.rsplit_once(':') {
        Some((name, port))
            if !name.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}

/// Prints lines `[skip, skip + limit)`; prints nothing if the file is gone.
fn page_command(log_path: &str, skip: usize, limit: usize) -> String {
    let path = shell_escape(log_path);
    format!(
        "if [ -f {path} ]; then tail -n +{} {path} | head -n {}; fi",
        skip.saturating_add(1),
        limit,
    )
}

fn whole_command(log_path: &str) -> String {
    let path = shell_escape(log_path);
    format!("if [ -f {path} ]; then cat {path}; fi")
}

fn rejoin_lines(output: &[u8]) -> String {
    String::from_utf8_lossy(output)
        .lines()
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Shell-escape a string for safe use in remote commands.
fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
