//! HTTP client for the BI server API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use drill_core::{ApiError, DrillConfig, EntityId, Segment};

use crate::segments::SegmentsApi;
use crate::writeback::{ActionsApi, DeleteRowRequest, DeleteRowResponse};

const SESSION_HEADER: &str = "X-Metabase-Session";

/// Endpoint of the delete-row writeback action.
pub const DELETE_ROW_ENDPOINT: &str = "/api/action/row/delete";
pub const SEGMENT_ENDPOINT: &str = "/api/segment";

/// Session-authenticated JSON client.
pub struct HttpClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpClient {
    pub fn from_config(config: &DrillConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.site_url.trim_end_matches('/').to_string(),
            session_token: config.session_token.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(endpoint));
        match &self.session_token {
            Some(token) => builder.header(SESSION_HEADER, token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(endpoint, "Sending API request");
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ActionsApi for HttpClient {
    async fn delete_row(&self, request: &DeleteRowRequest) -> Result<DeleteRowResponse, ApiError> {
        let builder = self.request(Method::POST, DELETE_ROW_ENDPOINT).json(request);
        self.send(DELETE_ROW_ENDPOINT, builder).await
    }
}

#[async_trait]
impl SegmentsApi for HttpClient {
    async fn list_segments(&self) -> Result<Vec<Segment>, ApiError> {
        let builder = self.request(Method::GET, SEGMENT_ENDPOINT);
        self.send(SEGMENT_ENDPOINT, builder).await
    }

    async fn set_archived(&self, id: EntityId, archived: bool) -> Result<Segment, ApiError> {
        let endpoint = format!("{}/{}", SEGMENT_ENDPOINT, id);
        let builder = self
            .request(Method::PUT, &endpoint)
            .json(&json!({ "archived": archived }));
        self.send(&endpoint, builder).await
    }
}
