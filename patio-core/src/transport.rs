//! Remote record endpoints behind a trait seam.
//!
//! The record store only ever talks to a `RecordTransport`, so tests can
//! script outcomes without a network. `HttpTransport` is the production
//! implementation over the yard service's REST API.

use crate::models::{RemoteMotorcycle, RemotePayload};
use async_trait::async_trait;
use serde::Deserialize;

/// What a remote call can report back, before classification: either no
/// response at all, or an HTTP status with an optional server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    NoResponse(String),
    Status { code: u16, message: Option<String> },
}

#[async_trait]
pub trait RecordTransport: Send + Sync {
    async fn fetch_all(&self, token: &str) -> Result<Vec<RemoteMotorcycle>, TransportFailure>;

    async fn create(
        &self,
        token: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMotorcycle, TransportFailure>;

    async fn update(
        &self,
        token: &str,
        id: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMotorcycle, TransportFailure>;

    async fn delete(&self, token: &str, id: &str) -> Result<(), TransportFailure>;
}

/// Error body shape the service uses for 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, TransportFailure> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportFailure::NoResponse(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Collapses a reqwest outcome into the two-arm failure shape: transport
    /// errors become `NoResponse`, non-2xx statuses keep their code plus the
    /// server message when the body decodes.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<RemoteErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        Err(TransportFailure::Status {
            code: status.as_u16(),
            message,
        })
    }

    fn no_response(error: reqwest::Error) -> TransportFailure {
        TransportFailure::NoResponse(error.to_string())
    }
}

#[async_trait]
impl RecordTransport for HttpTransport {
    async fn fetch_all(&self, token: &str) -> Result<Vec<RemoteMotorcycle>, TransportFailure> {
        let response = self
            .client
            .get(self.url("/motorcycles"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(Self::no_response)?;
        Self::check(response)
            .await?
            .json::<Vec<RemoteMotorcycle>>()
            .await
            .map_err(Self::no_response)
    }

    async fn create(
        &self,
        token: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMotorcycle, TransportFailure> {
        let response = self
            .client
            .post(self.url("/motorcycles"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(Self::no_response)?;
        Self::check(response)
            .await?
            .json::<RemoteMotorcycle>()
            .await
            .map_err(Self::no_response)
    }

    async fn update(
        &self,
        token: &str,
        id: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMotorcycle, TransportFailure> {
        let response = self
            .client
            .put(self.url(&format!("/motorcycles/{id}")))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(Self::no_response)?;
        Self::check(response)
            .await?
            .json::<RemoteMotorcycle>()
            .await
            .map_err(Self::no_response)
    }

    async fn delete(&self, token: &str, id: &str) -> Result<(), TransportFailure> {
        let response = self
            .client
            .delete(self.url(&format!("/motorcycles/{id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(Self::no_response)?;
        Self::check(response).await.map(|_| ())
    }
}
