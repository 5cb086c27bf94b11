//! HTTP collaborators: the session/log/contact backend and public IP lookup.
//!
//! Both sit behind `async_trait` traits so the interpreter can run against
//! mocks in tests.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ApiConfig, IpLookupConfig};
use crate::contact::ContactRequest;

/// Errors from backend and lookup calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("all lookup endpoints failed")]
    Exhausted,
}

/// Body of a successful `POST /session/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTicket {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// One logged command, as sent to `POST /log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub session_id: String,
    pub command: String,
    pub timestamp: String,
}

/// Acknowledgement of a stored contact request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReceipt {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ContactResponse {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Backend endpoints the terminal depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn start_session(&self) -> Result<SessionTicket, ApiError>;

    async fn log_command(&self, entry: &LogEntry) -> Result<(), ApiError>;

    async fn submit_contact(&self, request: &ContactRequest) -> Result<ContactReceipt, ApiError>;
}

/// Resolves the visitor's public IP address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn lookup(&self) -> Result<String, ApiError>;
}

/// `BackendApi` over HTTP.
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("webterm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        info!(base_url = %config.base_url, "backend client ready");
        Ok(Self { client, config })
    }
}

/// Turn a non-2xx response into `ApiError::Status`, preferring the
/// `{ "error": ... }` message when the body carries one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or(body);
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn start_session(&self) -> Result<SessionTicket, ApiError> {
        let url = self.config.endpoint(&self.config.session_path);
        let response = check_status(self.client.post(&url).send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn log_command(&self, entry: &LogEntry) -> Result<(), ApiError> {
        let url = self.config.endpoint(&self.config.log_path);
        check_status(self.client.post(&url).json(entry).send().await?).await?;
        Ok(())
    }

    async fn submit_contact(&self, request: &ContactRequest) -> Result<ContactReceipt, ApiError> {
        let url = self.config.endpoint(&self.config.contact_path);
        let response = check_status(self.client.post(&url).json(request).send().await?).await?;
        let body = response.text().await?;
        let parsed: ContactResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;

        match (parsed.success, parsed.id) {
            (true, Some(id)) => Ok(ContactReceipt { id }),
            _ => Err(ApiError::Malformed(
                parsed
                    .error
                    .unwrap_or_else(|| "submission not acknowledged".to_string()),
            )),
        }
    }
}

/// `IpLookup` that tries each configured endpoint in order.
pub struct HttpIpLookup {
    client: Client,
    endpoints: Vec<String>,
}

impl HttpIpLookup {
    pub fn new(config: &IpLookupConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("webterm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, ApiError> {
        let response = check_status(self.client.get(url).send().await?).await?;
        let body = response.text().await?;
        let parsed: IpResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(parsed.ip)
    }
}

#[async_trait]
impl IpLookup for HttpIpLookup {
    async fn lookup(&self) -> Result<String, ApiError> {
        for url in &self.endpoints {
            match self.fetch(url).await {
                Ok(ip) => return Ok(ip),
                Err(e) => debug!(endpoint = %url, error = %e, "ip lookup failed, trying next"),
            }
        }
        Err(ApiError::Exhausted)
    }
}
