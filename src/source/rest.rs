use super::backend::{
    ArchiveBackend, DeleteAllResponse, ListArchivedResponse, PageRequest,
    PermanentDeleteResponse, RestoreResponse,
};
use crate::core::{ArchiveError, EntityType, Result, validate_native_id};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{Level, event};

/// `ArchiveBackend` over the CRM REST API.
///
/// Routes, relative to `base_url`:
/// - `GET    {resource}/archived?page=&limit=`
/// - `PATCH  {resource}/{id}/restore`
/// - `DELETE {resource}/{id}/permanent`
/// - `DELETE {resource}/archived` (404/405 means no bulk wipe)
#[derive(Clone)]
pub struct RestArchiveBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestArchiveBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Transport-level timeout; the aggregator applies its own per-source limit on top.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ArchiveError::Config(format!(
                "backend url '{}' must start with http:// or https://",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ArchiveError::Config(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, entity_type: EntityType, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, entity_type.resource(), path)
    }

    async fn send(&self, entity_type: EntityType, request: RequestBuilder) -> Result<Response> {
        let request = match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request.send().await.map_err(|err| {
            event!(
                Level::WARN,
                entity_type = %entity_type,
                error = %err,
                "archive backend unreachable"
            );
            ArchiveError::unavailable(entity_type, err.to_string())
        })
    }

    async fn decode<T: DeserializeOwned + Default>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// A 2xx on a mutation means the backend applied it; an unreadable body
    /// only loses the optional details.
    async fn decode_acknowledgement<T: DeserializeOwned + Default>(
        entity_type: EntityType,
        response: Response,
    ) -> Result<T> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            event!(
                Level::DEBUG,
                entity_type = %entity_type,
                error = %err,
                "acknowledgement body is not JSON, treating as plain success"
            );
            T::default()
        }))
    }

    async fn backend_error(response: Response) -> ArchiveError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .ok()
            .filter(|body| !body.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));
        ArchiveError::Backend { status, message }
    }

    async fn single_record<T: DeserializeOwned + Default>(
        &self,
        entity_type: EntityType,
        native_id: &str,
        response: Response,
    ) -> Result<T> {
        match response.status() {
            status if status.is_success() => {
                Self::decode_acknowledgement(entity_type, response).await
            }
            StatusCode::NOT_FOUND => Err(ArchiveError::not_found(entity_type, native_id)),
            _ => Err(Self::backend_error(response).await),
        }
    }
}

#[async_trait]
impl ArchiveBackend for RestArchiveBackend {
    async fn list_archived(
        &self,
        entity_type: EntityType,
        request: PageRequest,
    ) -> Result<ListArchivedResponse> {
        let builder = self
            .client
            .get(self.url(entity_type, "archived"))
            .query(&[("page", request.page), ("limit", request.limit)]);
        let response = self.send(entity_type, builder).await?;
        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }
        Self::decode(response).await
    }

    async fn restore(&self, entity_type: EntityType, native_id: &str) -> Result<RestoreResponse> {
        validate_native_id(native_id)?;
        let builder = self
            .client
            .patch(self.url(entity_type, &format!("{}/restore", native_id)));
        let response = self.send(entity_type, builder).await?;
        self.single_record(entity_type, native_id, response).await
    }

    async fn permanent_delete(
        &self,
        entity_type: EntityType,
        native_id: &str,
    ) -> Result<PermanentDeleteResponse> {
        validate_native_id(native_id)?;
        let builder = self
            .client
            .delete(self.url(entity_type, &format!("{}/permanent", native_id)));
        let response = self.send(entity_type, builder).await?;
        self.single_record(entity_type, native_id, response).await
    }

    async fn permanent_delete_all(
        &self,
        entity_type: EntityType,
    ) -> Result<Option<DeleteAllResponse>> {
        let builder = self.client.delete(self.url(entity_type, "archived"));
        let response = self.send(entity_type, builder).await?;
        match response.status() {
            status if status.is_success() => Self::decode(response).await.map(Some),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
                event!(
                    Level::DEBUG,
                    entity_type = %entity_type,
                    "bulk wipe not supported by backend"
                );
                Ok(None)
            }
            _ => Err(Self::backend_error(response).await),
        }
    }
}
