//! Resolution State Machine
//!
//! Single source of truth for loading/error state across the two error
//! domains: schema fetches (fatal for the current resource type until
//! retried) and resolves (non-fatal, user may resubmit). `Action` is a closed
//! enum and `reduce` matches it exhaustively, so an unhandled transition is a
//! compile error rather than silent state corruption.
//!
//! Schema responses carry the generation they were issued under; a response
//! arriving after a newer `SchemasLoading` reset is discarded, so a fast
//! resource-type switch can never let a stale schema list overwrite the
//! fresh one.

use crate::error::ResolveError;
use crate::schema::{ResourceType, SchemaDescriptor};
use tracing::{debug, warn};

/// Error as held in resolver state: a status-like code plus display message.
#[derive(Debug, Clone, PartialEq)]
pub struct StateError {
    pub code: u16,
    pub message: String,
}

impl StateError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: 404,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
        }
    }
}

impl From<&ResolveError> for StateError {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::SchemasNotFound(_) => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

/// Working state for one façade mount.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverState {
    pub resource_type: ResourceType,
    /// Advances on every `SchemasLoading`; stale schema responses are
    /// identified by comparing against it.
    pub generation: u64,
    pub schemas_loading: bool,
    pub all_schemas: Vec<SchemaDescriptor>,
    /// Derived subset: `searchable == true || search.enabled == true`.
    pub searchable_schemas: Vec<SchemaDescriptor>,
    pub schema_fetch_error: Option<StateError>,
    pub resolver_loading: bool,
    pub resolver_fetch_error: Option<StateError>,
}

impl ResolverState {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            generation: 0,
            schemas_loading: true,
            all_schemas: Vec::new(),
            searchable_schemas: Vec::new(),
            schema_fetch_error: None,
            resolver_loading: false,
            resolver_fetch_error: None,
        }
    }
}

/// Closed set of state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Wholesale reset, used on mount and on resource-type change.
    SchemasLoading { resource_type: ResourceType },
    SchemasSuccess {
        generation: u64,
        all_schemas: Vec<SchemaDescriptor>,
    },
    SchemasError {
        generation: u64,
        error: StateError,
    },
    Resolving,
    ResolveError { error: StateError },
    ResolveSuccess,
}

/// Apply one transition. Exhaustive over `Action`.
pub fn reduce(state: &mut ResolverState, action: Action) {
    match action {
        Action::SchemasLoading { resource_type } => {
            let generation = state.generation + 1;
            *state = ResolverState::new(resource_type);
            state.generation = generation;
        }
        Action::SchemasSuccess {
            generation,
            all_schemas,
        } => {
            if generation != state.generation {
                warn!(
                    generation,
                    current = state.generation,
                    "discarding stale schema response"
                );
                return;
            }
            if all_schemas.is_empty() {
                // 404-equivalent: the backend answered but knows no schemas
                // for this type.
                state.schemas_loading = false;
                state.all_schemas = Vec::new();
                state.searchable_schemas = Vec::new();
                state.schema_fetch_error = Some(StateError::from(&ResolveError::SchemasNotFound(
                    state.resource_type.name().to_string(),
                )));
                return;
            }
            state.searchable_schemas = all_schemas
                .iter()
                .filter(|s| s.is_searchable())
                .cloned()
                .collect();
            state.all_schemas = all_schemas;
            state.schema_fetch_error = None;
            state.schemas_loading = false;
            debug!(
                total = state.all_schemas.len(),
                searchable = state.searchable_schemas.len(),
                "schemas ready"
            );
        }
        Action::SchemasError { generation, error } => {
            if generation != state.generation {
                warn!(
                    generation,
                    current = state.generation,
                    "discarding stale schema error"
                );
                return;
            }
            state.schema_fetch_error = Some(error);
            state.schemas_loading = false;
        }
        Action::Resolving => {
            state.resolver_loading = true;
            state.resolver_fetch_error = None;
        }
        Action::ResolveError { error } => {
            state.resolver_loading = false;
            state.resolver_fetch_error = Some(error);
        }
        Action::ResolveSuccess => {
            state.resolver_loading = false;
            state.resolver_fetch_error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SearchCapability;

    fn schema(type_name: &str, searchable: bool, search_enabled: bool) -> SchemaDescriptor {
        SchemaDescriptor {
            type_name: type_name.to_string(),
            display_name: type_name.to_string(),
            fields: Vec::new(),
            searchable,
            search: SearchCapability {
                enabled: search_enabled,
                autocomplete_enabled: false,
            },
            error: None,
        }
    }

    fn loading_state() -> ResolverState {
        let mut state = ResolverState::new(ResourceType::new("pkg.compute.v1.Instance"));
        reduce(
            &mut state,
            Action::SchemasLoading {
                resource_type: ResourceType::new("pkg.compute.v1.Instance"),
            },
        );
        state
    }

    #[test]
    fn schemas_loading_resets_wholesale() {
        let mut state = loading_state();
        let generation = state.generation;
        reduce(
            &mut state,
            Action::SchemasSuccess {
                generation,
                all_schemas: vec![schema("a", true, false)],
            },
        );
        reduce(
            &mut state,
            Action::ResolveError {
                error: StateError::internal("boom"),
            },
        );

        reduce(
            &mut state,
            Action::SchemasLoading {
                resource_type: ResourceType::new("pkg.storage.v1.Bucket"),
            },
        );

        assert!(state.schemas_loading);
        assert!(state.all_schemas.is_empty());
        assert!(state.schema_fetch_error.is_none());
        assert!(state.resolver_fetch_error.is_none());
        assert_eq!(state.resource_type.name(), "pkg.storage.v1.Bucket");
    }

    #[test]
    fn searchable_subset_is_derived_and_idempotent() {
        let mut state = loading_state();
        let schemas = vec![
            schema("flagged", true, false),
            schema("nested", false, true),
            schema("neither", false, false),
        ];

        for _ in 0..2 {
            let generation = state.generation;
            reduce(
                &mut state,
                Action::SchemasSuccess {
                    generation,
                    all_schemas: schemas.clone(),
                },
            );
            let searchable: Vec<&str> = state
                .searchable_schemas
                .iter()
                .map(|s| s.type_name.as_str())
                .collect();
            assert_eq!(searchable, vec!["flagged", "nested"]);
            assert_eq!(state.all_schemas.len(), 3);
        }
    }

    #[test]
    fn empty_schema_list_becomes_not_found_error() {
        let mut state = loading_state();
        let generation = state.generation;
        reduce(
            &mut state,
            Action::SchemasSuccess {
                generation,
                all_schemas: Vec::new(),
            },
        );

        let error = state.schema_fetch_error.expect("expected not-found error");
        assert_eq!(error.code, 404);
        assert!(error.message.contains("pkg.compute.v1.Instance"));
        assert!(!state.schemas_loading);
        assert!(state.all_schemas.is_empty());
    }

    #[test]
    fn stale_schema_response_is_discarded() {
        let mut state = loading_state();
        let stale_generation = state.generation;

        // Resource type switches before the first response lands.
        reduce(
            &mut state,
            Action::SchemasLoading {
                resource_type: ResourceType::new("pkg.storage.v1.Bucket"),
            },
        );

        reduce(
            &mut state,
            Action::SchemasSuccess {
                generation: stale_generation,
                all_schemas: vec![schema("stale", true, false)],
            },
        );

        assert!(state.schemas_loading);
        assert!(state.all_schemas.is_empty());

        reduce(
            &mut state,
            Action::SchemasError {
                generation: stale_generation,
                error: StateError::internal("stale failure"),
            },
        );
        assert!(state.schema_fetch_error.is_none());
    }

    #[test]
    fn resolving_clears_previous_resolve_error() {
        let mut state = loading_state();
        reduce(
            &mut state,
            Action::ResolveError {
                error: StateError::internal("transport down"),
            },
        );
        assert!(state.resolver_fetch_error.is_some());
        assert!(!state.resolver_loading);

        reduce(&mut state, Action::Resolving);
        assert!(state.resolver_loading);
        assert!(state.resolver_fetch_error.is_none());

        reduce(&mut state, Action::ResolveSuccess);
        assert!(!state.resolver_loading);
        assert!(state.resolver_fetch_error.is_none());
    }

    #[test]
    fn state_error_codes_follow_the_error_domain() {
        let not_found =
            StateError::from(&ResolveError::SchemasNotFound("pkg.compute.v1.Instance".into()));
        assert_eq!(not_found.code, 404);
        assert!(not_found.message.contains("pkg.compute.v1.Instance"));

        let fetch = StateError::from(&ResolveError::SchemaFetch("backend returned 503".into()));
        assert_eq!(fetch.code, 500);
        assert!(fetch.message.contains("backend returned 503"));

        let resolve = StateError::from(&ResolveError::Resolve("connection refused".into()));
        assert_eq!(resolve.code, 500);
    }

    #[test]
    fn resolve_error_keeps_schemas_valid() {
        let mut state = loading_state();
        let generation = state.generation;
        reduce(
            &mut state,
            Action::SchemasSuccess {
                generation,
                all_schemas: vec![schema("a", true, false)],
            },
        );

        reduce(
            &mut state,
            Action::ResolveError {
                error: StateError::internal("transport down"),
            },
        );

        assert_eq!(state.all_schemas.len(), 1);
        assert!(state.schema_fetch_error.is_none());
        assert!(state.resolver_fetch_error.is_some());
    }
}
