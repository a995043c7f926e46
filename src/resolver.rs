//! Resolver Façade
//!
//! Entry point wiring schema loading, strategy dispatch, URL persistence of
//! the last free-text query, and result/warning delivery together. Owns the
//! state machine for the lifetime of one mount.

use crate::api::ResolverApi;
use crate::autocomplete::{self, Debouncer};
use crate::error::{ResolveError, Result};
use crate::executor::{search_by_fields, search_by_text, ResolutionInput};
use crate::schema::{self, ResourceType, SchemaDescriptor};
use crate::session_cache::SessionCache;
use crate::state::{reduce, Action, ResolverState, StateError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Which submission paths the caller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Both free-text and per-field forms.
    Dual,
    /// Free-text only.
    QueryOnly,
    /// Per-field only.
    SchemaOnly,
}

/// Delivered to the caller on every successful resolution: the decoded
/// results plus the input that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOutcome {
    pub results: Vec<serde_json::Value>,
    pub input: ResolutionInput,
}

pub type ResolveHandler = Box<dyn FnMut(ResolveOutcome) + Send>;

/// Collaborator receiving partial-failure warnings. Partial failures are
/// data, not errors: they never suppress delivery of successful results.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: String);
}

/// Default sink: structured log warnings.
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn warn(&self, message: String) {
        warn!(%message, "partial failure");
    }
}

pub struct ResolverConfig {
    pub resource_type: ResourceType,
    pub search_limit: u32,
    pub mode: SearchMode,
    /// Workflow-level autocomplete override. `Some(false)` always wins over
    /// schema-level capability.
    pub enable_autocomplete: Option<bool>,
    /// The navigable URL; its `q` parameter is read on mount and written on
    /// every free-text submission.
    pub url: Url,
}

pub struct Resolver {
    api: Arc<dyn ResolverApi>,
    resource_type: ResourceType,
    search_limit: u32,
    mode: SearchMode,
    enable_autocomplete: Option<bool>,
    url: Url,
    state: ResolverState,
    on_resolve: ResolveHandler,
    warnings: Arc<dyn WarningSink>,
    cache: SessionCache,
    debouncer: Debouncer,
    initial_query_submitted: bool,
}

impl Resolver {
    pub fn new(
        config: ResolverConfig,
        api: Arc<dyn ResolverApi>,
        on_resolve: ResolveHandler,
        warnings: Arc<dyn WarningSink>,
    ) -> Self {
        let state = ResolverState::new(config.resource_type.clone());
        Self {
            api,
            resource_type: config.resource_type,
            search_limit: config.search_limit,
            mode: config.mode,
            enable_autocomplete: config.enable_autocomplete,
            url: config.url,
            state,
            on_resolve,
            warnings,
            cache: SessionCache::default(),
            debouncer: Debouncer::default(),
            initial_query_submitted: false,
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Load schemas and, exactly once, re-run a free-text query carried in
    /// the URL's `q` parameter.
    pub async fn mount(&mut self) {
        self.load_schemas().await;

        if self.initial_query_submitted || self.mode == SearchMode::SchemaOnly {
            return;
        }
        if let Some(q) = self.query_param() {
            self.initial_query_submitted = true;
            info!(query = %q, "re-running query from url");
            if let Err(err) = self.submit_query(&q).await {
                warn!(error = %err, "initial query from url failed");
            }
        }
    }

    /// Switch resource type, discarding the previous mount's schemas.
    pub async fn set_resource_type(&mut self, resource_type: ResourceType) {
        self.resource_type = resource_type;
        self.load_schemas().await;
    }

    /// Re-run only the schema fetch, e.g. from a retry affordance.
    pub async fn retry_schemas(&mut self) {
        self.load_schemas().await;
    }

    async fn load_schemas(&mut self) {
        reduce(
            &mut self.state,
            Action::SchemasLoading {
                resource_type: self.resource_type.clone(),
            },
        );
        self.cache.clear();
        let generation = self.state.generation;

        match schema::fetch_schemas(self.api.as_ref(), &self.resource_type).await {
            Ok(all_schemas) => reduce(
                &mut self.state,
                Action::SchemasSuccess {
                    generation,
                    all_schemas,
                },
            ),
            Err(err) => reduce(
                &mut self.state,
                Action::SchemasError {
                    generation,
                    error: StateError::from(&err),
                },
            ),
        }
    }

    /// Submit a free-text query, persisting it to the URL first.
    pub async fn submit_query(&mut self, query: &str) -> Result<()> {
        if self.mode == SearchMode::SchemaOnly {
            return Err(ResolveError::Validation(
                "free-text search is not enabled for this workflow".to_string(),
            ));
        }
        let query = query.trim().to_string();
        self.set_query_param(&query);
        self.submit(ResolutionInput::Query(query)).await
    }

    /// Submit structured per-field values.
    pub async fn submit_fields(&mut self, fields: HashMap<String, String>) -> Result<()> {
        if self.mode == SearchMode::QueryOnly {
            return Err(ResolveError::Validation(
                "per-field search is not enabled for this workflow".to_string(),
            ));
        }
        let fields = fields
            .into_iter()
            .map(|(name, value)| (name, value.trim().to_string()))
            .collect();
        self.submit(ResolutionInput::Fields(fields)).await
    }

    /// Strategy dispatch: a query input goes to the text executor, a fields
    /// input to the per-field executor. New modes extend this predicate.
    async fn submit(&mut self, input: ResolutionInput) -> Result<()> {
        // Loading state flips before the request starts, so an observer can
        // never see loading=false with its own request outstanding.
        reduce(&mut self.state, Action::Resolving);

        let outcome = match &input {
            ResolutionInput::Query(query) => {
                search_by_text(self.api.as_ref(), &self.resource_type, self.search_limit, query)
                    .await
            }
            ResolutionInput::Fields(fields) => {
                search_by_fields(
                    self.api.as_ref(),
                    &self.resource_type,
                    self.search_limit,
                    fields,
                )
                .await
            }
        };

        match outcome {
            Ok(resolution) => {
                for failure in &resolution.partial_failures {
                    self.warnings.warn(failure.message.clone());
                }
                reduce(&mut self.state, Action::ResolveSuccess);
                (self.on_resolve)(ResolveOutcome {
                    results: resolution.results,
                    input,
                });
                Ok(())
            }
            Err(err) => {
                reduce(
                    &mut self.state,
                    Action::ResolveError {
                        error: StateError::from(&err),
                    },
                );
                Err(err)
            }
        }
    }

    /// Whether autocomplete is active for the loaded schemas, memoized in the
    /// session cache until the next schema load or explicit invalidation.
    pub fn autocomplete_enabled(&self) -> bool {
        let key = format!("autocomplete:{}", self.resource_type);
        self.cache.get_or_insert_with(&key, || {
            autocomplete::autocomplete_enabled(&self.state.all_schemas, self.enable_autocomplete)
        })
    }

    /// Debounced suggestion lookup for one field's text. Returns no
    /// suggestions when autocomplete is gated off or the call was superseded
    /// by a newer keystroke.
    pub async fn suggest(&self, search_text: &str) -> Result<Vec<serde_json::Value>> {
        if !self.autocomplete_enabled() {
            return Ok(Vec::new());
        }
        let api = Arc::clone(&self.api);
        let resource_type = self.resource_type.clone();
        let text = search_text.to_string();
        match self
            .debouncer
            .run(|| async move { autocomplete::suggest(api.as_ref(), &resource_type, &text).await })
            .await
        {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }

    /// Schemas eligible for the per-field form.
    pub fn searchable_schemas(&self) -> &[SchemaDescriptor] {
        &self.state.searchable_schemas
    }

    fn query_param(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(name, _)| name == "q")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    fn set_query_param(&mut self, query: &str) {
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(name, _)| name != "q")
            .map(|(n, v)| (n.into_owned(), v.into_owned()))
            .collect();
        let mut pairs = self.url.query_pairs_mut();
        pairs.clear();
        for (name, value) in &others {
            pairs.append_pair(name, value);
        }
        pairs.append_pair("q", query);
    }
}
