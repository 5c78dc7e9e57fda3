//! Mail-testing service probe over its REST API.
//!
//! # Design Decisions
//! - A non-200 reply is an answer, not a transport failure: the status code
//!   goes into `details` and no error text is captured
//! - Transport failures keep the client's error text verbatim
//! - The client is shared and injected; the timeout is applied per request

use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::probe::{FailureKind, Probe, ServiceStatus};

pub const DEFAULT_NAME: &str = "Mailhog SMTP";
const MESSAGES_PATH: &str = "/api/v1/messages";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Status: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("response is not a JSON array: {0}")]
    Decode(#[from] serde_json::Error),
}

impl MailError {
    pub fn kind(&self) -> FailureKind {
        match self {
            MailError::Transport(_) => FailureKind::Unreachable,
            MailError::Status(_) => FailureKind::ApplicationError,
            MailError::Decode(_) => FailureKind::ProtocolMismatch,
        }
    }
}

pub struct HttpServiceProbe {
    name: String,
    client: Client,
    base_url: String,
    limit: u32,
    timeout: Duration,
}

impl HttpServiceProbe {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            client,
            base_url: base_url.into(),
            limit: 1,
            timeout,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), MESSAGES_PATH)
    }

    /// Fetch the message listing and return its length.
    async fn count_messages(&self) -> Result<usize, MailError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("limit", self.limit)])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(MailError::Status(status));
        }

        let body = response.text().await?;
        let messages: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        Ok(messages.len())
    }
}

#[async_trait]
impl Probe for HttpServiceProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ServiceStatus {
        let start = Instant::now();
        let status = match self.count_messages().await {
            Ok(count) => ServiceStatus::connected(&self.name, "Mailhog container responding")
                .with_details(format!("Mail testing ready ({} messages)", count)),
            Err(MailError::Status(code)) => {
                tracing::warn!(url = %self.endpoint(), status = %code, "Mail API returned non-200");
                ServiceStatus::failed(&self.name, FailureKind::ApplicationError, "Mailhog API error")
                    .with_details(format!("Status: {}", code.as_u16()))
            }
            Err(e) => {
                tracing::warn!(url = %self.endpoint(), error = %e, "Mail probe failed");
                ServiceStatus::failed(&self.name, e.kind(), "Mailhog container unavailable")
                    .with_error(&e)
            }
        };
        status.with_elapsed(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let probe = HttpServiceProbe::new(Client::new(), "http://mailhog:8025/", Duration::from_secs(3));
        assert_eq!(probe.endpoint(), "http://mailhog:8025/api/v1/messages");
    }

    #[test]
    fn test_status_error_display() {
        let err = MailError::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "Status: 503");
        assert_eq!(err.kind(), FailureKind::ApplicationError);
    }

    #[tokio::test]
    async fn test_invalid_url_is_captured() {
        let probe = HttpServiceProbe::new(Client::new(), "not a url", Duration::from_secs(1));
        let status = probe.check().await;
        assert!(!status.connected);
        assert!(status.error.is_some());
        assert_eq!(status.failure, Some(FailureKind::Unreachable));
    }
}
