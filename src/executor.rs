//! Query Executors
//!
//! Two interchangeable resolution strategies sharing a result contract:
//! free-text search and structured per-field search. Strategy dispatch lives
//! in the façade, not here, so new modes extend the dispatch predicate rather
//! than these functions.

use crate::api::{FailureMessage, ResolveRequest, ResolverApi, SearchRequest, WireResolution};
use crate::error::{ResolveError, Result};
use crate::schema::ResourceType;
use std::collections::HashMap;
use tracing::debug;

/// User input for one resolution, one variant per strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionInput {
    /// Free-text query.
    Query(String),
    /// Structured per-field values keyed by field name.
    Fields(HashMap<String, String>),
}

/// Outcome of one resolution. `results` and `partial_failures` are
/// independent: both may be non-empty at once, and neither is ever absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionResult {
    pub results: Vec<serde_json::Value>,
    pub partial_failures: Vec<FailureMessage>,
}

impl From<WireResolution> for ResolutionResult {
    fn from(wire: WireResolution) -> Self {
        Self {
            results: wire.results,
            partial_failures: wire.partial_failures,
        }
    }
}

/// Resolve via the free-text search endpoint. The backend returns results
/// directly; no client-side filtering is applied.
pub async fn search_by_text(
    api: &dyn ResolverApi,
    resource_type: &ResourceType,
    limit: u32,
    query: &str,
) -> Result<ResolutionResult> {
    let request = SearchRequest {
        want: resource_type.type_url(),
        query: query.to_string(),
        limit,
    };
    debug!(resource_type = %resource_type, query, "search by text");
    let response = api
        .search(&request)
        .await
        .map_err(|err| ResolveError::Resolve(err.to_string()))?;
    Ok(response.into())
}

/// Resolve via the structured per-field endpoint.
pub async fn search_by_fields(
    api: &dyn ResolverApi,
    resource_type: &ResourceType,
    limit: u32,
    fields: &HashMap<String, String>,
) -> Result<ResolutionResult> {
    let request = ResolveRequest {
        want: resource_type.type_url(),
        have: fields.clone(),
        limit,
    };
    debug!(resource_type = %resource_type, field_count = fields.len(), "search by fields");
    let response = api
        .resolve(&request)
        .await
        .map_err(|err| ResolveError::Resolve(err.to_string()))?;
    Ok(response.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WireResolution;

    #[test]
    fn wire_resolution_converts_with_missing_arrays() {
        let wire: WireResolution = serde_json::from_str("{}").unwrap();
        let result: ResolutionResult = wire.into();
        assert!(result.results.is_empty());
        assert!(result.partial_failures.is_empty());
    }

    #[test]
    fn results_and_failures_coexist() {
        let wire: WireResolution = serde_json::from_str(
            r#"{"results":[{"id":"i-1"}],"partialFailures":[{"message":"cluster-a: timeout"}]}"#,
        )
        .unwrap();
        let result: ResolutionResult = wire.into();
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.partial_failures[0].message, "cluster-a: timeout");
    }

    struct FailingApi;

    #[async_trait::async_trait]
    impl ResolverApi for FailingApi {
        async fn get_object_schemas(
            &self,
            _: &crate::api::GetObjectSchemasRequest,
        ) -> Result<crate::api::GetObjectSchemasResponse> {
            panic!("unexpected schema fetch");
        }
        async fn search(&self, _: &SearchRequest) -> Result<WireResolution> {
            Err(ResolveError::internal("connection refused"))
        }
        async fn resolve(&self, _: &ResolveRequest) -> Result<WireResolution> {
            Err(ResolveError::internal("connection refused"))
        }
        async fn autocomplete(
            &self,
            _: &crate::api::AutocompleteRequest,
        ) -> Result<crate::api::AutocompleteResponse> {
            panic!("unexpected autocomplete");
        }
    }

    #[tokio::test]
    async fn transport_failures_surface_as_resolve_errors() {
        let rt = ResourceType::new("pkg.compute.v1.Instance");

        let err = search_by_text(&FailingApi, &rt, 20, "i-1234")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Resolve(_)));

        let err = search_by_fields(&FailingApi, &rt, 20, &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Resolve(_)));
    }
}
