//! HTTP transport abstraction.

use backdrop_error::{FetchError, FetchErrorKind};
use tracing::{debug, instrument};

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a URL.
///
/// A returned response may carry any status; only failures to get a response
/// at all are errors. Dropping the future must cancel the request.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request and read the whole body.
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        (**self).get(url).await
    }
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport using a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::Transport(format!("{}: {}", url, e))))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::Transport(format!("{}: {}", url, e))))?;

        debug!(status, size = body.len(), "Received response");
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
