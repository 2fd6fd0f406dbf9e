use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use domain::{ConfigError, ConnectionState, Transport, TransportError, TransportKind};

/// Request transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Base URL the per-button suffixes are appended to at config load
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Request transport: one-shot HTTP GET per operation.
///
/// No connection is held between calls. Payloads are full URLs, prebuilt
/// when the device config is loaded. `send` issues the request and buffers
/// the response body so a following `receive` can apply the expected-length
/// contract to it.
pub struct HttpTransport {
    config: HttpConfig,
    client: reqwest::Client,
    response: Option<Vec<u8>>,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidField(format!("http client: {e}")))?;

        Ok(Self {
            config,
            client,
            response: None,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        // Nothing to open until a request is issued
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.response = None;

        let url = std::str::from_utf8(payload)
            .map_err(|_| TransportError::Request("payload is not a valid URL".to_string()))?;

        tracing::debug!(url = %url, "Issuing request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        tracing::debug!(len = body.len(), "Received response body");
        self.response = Some(body.to_vec());
        Ok(())
    }

    async fn receive(&mut self, expected_len: usize) -> Result<Vec<u8>, TransportError> {
        let body = self.response.take().ok_or(TransportError::NotConnected)?;

        if expected_len == 0 {
            // Line-terminated read: everything through the first newline,
            // or the whole body when there is none.
            return Ok(match body.iter().position(|b| *b == b'\n') {
                Some(pos) => body[..=pos].to_vec(),
                None => body,
            });
        }

        if body.len() < expected_len {
            return Err(TransportError::ShortResponse {
                got: body.len(),
                expected: expected_len,
            });
        }

        Ok(body[..expected_len].to_vec())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn connection_state(&self) -> ConnectionState {
        ConnectionState::Connected
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Request
    }
}
