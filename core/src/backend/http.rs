use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Backend, BackendError};
use crate::dataset::{Dataset, DetailBlock, DetailResponse, EntityId};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const DATA_ENDPOINT: &str = "/api/data";
const PAUSE_ENDPOINT: &str = "/api/pause";
const CLEAR_ENDPOINT: &str = "/api/clear";

#[derive(Debug, Serialize, Deserialize)]
struct PauseState {
    paused: Option<bool>,
}

/// REST client for the collector backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str) -> Result<Response, BackendError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|source| BackendError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;
        check_status(endpoint, response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, BackendError> {
        self.get(endpoint)
            .await?
            .json::<T>()
            .await
            .map_err(|source| BackendError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

fn check_status(endpoint: &str, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::Status {
            endpoint: endpoint.to_string(),
            status,
        })
    }
}

/// WebSocket-style addresses are accepted and mapped to their HTTP equivalents.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    let url = if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else {
        url.to_string()
    };
    url.trim_end_matches('/').to_string()
}

impl Backend for HttpBackend {
    async fn pull(&self) -> Result<Dataset, BackendError> {
        self.get_json(DATA_ENDPOINT).await
    }

    async fn fetch_detail(&self, id: EntityId) -> Result<DetailBlock, BackendError> {
        let endpoint = format!("/api/skill/{id}");
        let response: DetailResponse = self.get_json(&endpoint).await?;
        Ok(response.data.unwrap_or_default())
    }

    async fn set_paused(&self, paused: bool) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(PAUSE_ENDPOINT))
            .json(&PauseState {
                paused: Some(paused),
            })
            .send()
            .await
            .map_err(|source| BackendError::Request {
                endpoint: PAUSE_ENDPOINT.to_string(),
                source,
            })?;
        check_status(PAUSE_ENDPOINT, response)?;
        Ok(())
    }

    async fn is_paused(&self) -> Result<bool, BackendError> {
        let state: PauseState = self.get_json(PAUSE_ENDPOINT).await?;
        state.paused.ok_or_else(|| BackendError::MissingField {
            endpoint: PAUSE_ENDPOINT.to_string(),
            field: "paused",
        })
    }

    async fn reset(&self) -> Result<(), BackendError> {
        self.get(CLEAR_ENDPOINT).await?;
        Ok(())
    }

    async fn is_reachable(&self) -> bool {
        self.get(PAUSE_ENDPOINT).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("ws://localhost:8989"), "http://localhost:8989");
        assert_eq!(normalize_base_url("wss://example.org/"), "https://example.org");
        assert_eq!(normalize_base_url(" http://10.0.0.2:8989/ "), "http://10.0.0.2:8989");
    }

    #[test]
    fn test_pause_body_shape() {
        let body = serde_json::to_string(&PauseState { paused: Some(true) }).unwrap();
        assert_eq!(body, r#"{"paused":true}"#);
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_request_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        assert!(!backend.is_reachable().await);
        assert!(backend.pull().await.is_err());
    }
}
