//! Cache server probe speaking raw RESP over TCP.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::probe::{FailureKind, Probe, ServiceStatus};

const PING_FRAME: &[u8] = b"*1\r\n$4\r\nPING\r\n";
const PONG_MARKER: &str = "+PONG";
const READ_BUFFER: usize = 1024;

pub const DEFAULT_NAME: &str = "Redis Cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("connect to {addr} failed: {source}")]
    Connect { addr: String, source: std::io::Error },

    #[error("connect to {0} timed out")]
    ConnectTimeout(String),

    #[error("unexpected reply: {0:?}")]
    NoPong(String),

    #[error("PING not accepted within {0:?}")]
    WriteTimeout(Duration),

    #[error("no reply within {0:?}")]
    ReadTimeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CacheError::Connect { .. } | CacheError::ConnectTimeout(_) => FailureKind::Unreachable,
            CacheError::NoPong(_) | CacheError::WriteTimeout(_) | CacheError::ReadTimeout(_) => {
                FailureKind::ProtocolMismatch
            }
            CacheError::Io(_) => FailureKind::ApplicationError,
        }
    }
}

pub struct CacheProbe {
    name: String,
    host: String,
    port: u16,
    timeout: Duration,
}

impl CacheProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect, PING and wait for PONG. The stream is dropped (closed) on every return.
    async fn ping(&self) -> Result<(), CacheError> {
        let addr = self.addr();
        let mut stream = match timeout(self.timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(CacheError::Connect { addr, source }),
            Err(_) => return Err(CacheError::ConnectTimeout(addr)),
        };
        exchange(&mut stream, self.timeout).await
    }

    fn not_responding(&self) -> String {
        format!("Service not responding on port {}", self.port)
    }
}

/// One PING/PONG round trip on an open stream. Write and read each get `ceiling`.
async fn exchange<S>(stream: &mut S, ceiling: Duration) -> Result<(), CacheError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(ceiling, stream.write_all(PING_FRAME)).await {
        Ok(written) => written?,
        Err(_) => return Err(CacheError::WriteTimeout(ceiling)),
    }

    let mut buf = [0u8; READ_BUFFER];
    let n = match timeout(ceiling, stream.read(&mut buf)).await {
        Ok(read) => read?,
        Err(_) => return Err(CacheError::ReadTimeout(ceiling)),
    };
    let reply = String::from_utf8_lossy(&buf[..n]);

    if reply.contains(PONG_MARKER) {
        let _ = stream.shutdown().await;
        Ok(())
    } else {
        Err(CacheError::NoPong(reply.trim_end().to_string()))
    }
}

#[async_trait]
impl Probe for CacheProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ServiceStatus {
        let start = Instant::now();
        let status = match self.ping().await {
            Ok(()) => ServiceStatus::connected(&self.name, "Redis container responding")
                .with_details("Cache service ready"),
            Err(e) => {
                tracing::warn!(addr = %self.addr(), error = %e, "Cache probe failed");
                match e.kind() {
                    FailureKind::ApplicationError => {
                        ServiceStatus::failed(&self.name, e.kind(), "Redis container check failed")
                            .with_error(&e)
                    }
                    kind => ServiceStatus::failed(&self.name, kind, "Redis container unavailable")
                        .with_details(self.not_responding())
                        .with_error(&e),
                }
            }
        };
        status.with_elapsed(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Severity;
    use tokio::net::TcpListener;

    async fn serve_once(reply: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 64];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(reply).await;
            }
        });
        port
    }

    #[tokio::test]
    async fn test_pong_is_connected() {
        let port = serve_once(b"+PONG\r\n").await;
        let status = CacheProbe::new("127.0.0.1", port, Duration::from_secs(3)).check().await;
        assert!(status.connected);
        assert_eq!(status.severity, Severity::Ok);
        assert_eq!(status.details.as_deref(), Some("Cache service ready"));
    }

    #[tokio::test]
    async fn test_wrong_reply_mentions_port() {
        let port = serve_once(b"-ERR unknown command\r\n").await;
        let status = CacheProbe::new("127.0.0.1", port, Duration::from_secs(3)).check().await;
        assert!(!status.connected);
        assert_eq!(status.severity, Severity::Error);
        assert_eq!(status.failure, Some(FailureKind::ProtocolMismatch));
        assert!(status.details.unwrap().contains(&port.to_string()));
    }

    #[tokio::test]
    async fn test_refused_is_unreachable() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let status = CacheProbe::new("127.0.0.1", port, Duration::from_secs(3)).check().await;
        assert!(!status.connected);
        assert_eq!(status.failure, Some(FailureKind::Unreachable));
        assert_eq!(
            status.details,
            Some(format!("Service not responding on port {}", port))
        );
    }

    #[tokio::test]
    async fn test_silent_server_hits_ceiling() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let start = Instant::now();
        let status = CacheProbe::new("127.0.0.1", port, Duration::from_millis(200)).check().await;
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(!status.connected);
        assert_eq!(status.failure, Some(FailureKind::ProtocolMismatch));
    }

    #[tokio::test]
    async fn test_stalled_write_hits_ceiling() {
        // One-byte pipe whose peer never reads: the PING frame cannot be flushed.
        let (mut client, _peer) = tokio::io::duplex(1);

        let start = Instant::now();
        let err = exchange(&mut client, Duration::from_millis(100)).await.unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(matches!(err, CacheError::WriteTimeout(_)));
        assert_eq!(err.kind(), FailureKind::ProtocolMismatch);
    }

    #[tokio::test]
    async fn test_exchange_over_pipe() {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let n = server.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], PING_FRAME);
            server.write_all(b"+PONG\r\n").await.unwrap();
        });

        exchange(&mut client, Duration::from_secs(1)).await.unwrap();
    }
}
