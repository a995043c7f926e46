//! Resolver Backend API
//!
//! Wire types and transport for the four resolver endpoints. The rest of the
//! crate talks to the backend through the `ResolverApi` trait so the HTTP
//! transport can be swapped out (tests use an in-memory implementation).

use crate::error::{ResolveError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Request body for `POST /v1/resolver/getObjectSchemas`.
#[derive(Debug, Clone, Serialize)]
pub struct GetObjectSchemasRequest {
    pub type_url: String,
}

/// Request body for `POST /v1/resolver/search` (free-text strategy).
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub want: String,
    pub query: String,
    pub limit: u32,
}

/// Request body for `POST /v1/resolver/resolve` (per-field strategy).
#[derive(Debug, Clone, Serialize)]
pub struct ResolveRequest {
    pub want: String,
    pub have: HashMap<String, String>,
    pub limit: u32,
}

/// Request body for `POST /v1/resolver/autocomplete`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRequest {
    pub want: String,
    pub search: String,
    pub case_sensitive: bool,
}

/// One independently-failed sub-query from a batch resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

/// Response shape shared by the search and resolve endpoints. Backends may
/// omit either array entirely; both default to empty so downstream code
/// never sees an absent field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResolution {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub partial_failures: Vec<FailureMessage>,
}

/// Response from the autocomplete endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Response from the schema endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetObjectSchemasResponse {
    #[serde(default)]
    pub schemas: Vec<WireSchema>,
}

/// Search capability flags attached to a schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSearchCapability {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub autocomplete_enabled: bool,
}

/// Metadata selecting the plain-text field kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStringMetadata {
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// One enumerated choice for an option field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOption {
    pub display_name: String,
    pub string_value: String,
}

/// Metadata selecting the enumerated-option field kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireOptionMetadata {
    #[serde(default)]
    pub options: Vec<WireOption>,
}

/// One input field as returned by the schema service. Exactly one of
/// `string_metadata` / `option_metadata` must be present; the schema decoder
/// enforces this.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireField {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub string_metadata: Option<WireStringMetadata>,
    #[serde(default)]
    pub option_metadata: Option<WireOptionMetadata>,
}

/// One schema registered for a resource type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSchema {
    pub type_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub search: Option<WireSearchCapability>,
    #[serde(default)]
    pub fields: Vec<WireField>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transport seam for the resolver backend.
#[async_trait]
pub trait ResolverApi: Send + Sync {
    async fn get_object_schemas(
        &self,
        request: &GetObjectSchemasRequest,
    ) -> Result<GetObjectSchemasResponse>;

    async fn search(&self, request: &SearchRequest) -> Result<WireResolution>;

    async fn resolve(&self, request: &ResolveRequest) -> Result<WireResolution>;

    async fn autocomplete(&self, request: &AutocompleteRequest) -> Result<AutocompleteResponse>;
}

/// JSON-over-HTTP implementation of `ResolverApi`.
#[derive(Clone)]
pub struct HttpResolverApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResolverApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "resolver request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ResolveError::internal)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ResolveError::internal(format!(
                "resolver backend returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(ResolveError::internal)
    }
}

#[async_trait]
impl ResolverApi for HttpResolverApi {
    async fn get_object_schemas(
        &self,
        request: &GetObjectSchemasRequest,
    ) -> Result<GetObjectSchemasResponse> {
        self.post_json("/v1/resolver/getObjectSchemas", request).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<WireResolution> {
        self.post_json("/v1/resolver/search", request).await
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<WireResolution> {
        self.post_json("/v1/resolver/resolve", request).await
    }

    async fn autocomplete(&self, request: &AutocompleteRequest) -> Result<AutocompleteResponse> {
        self.post_json("/v1/resolver/autocomplete", request).await
    }
}
