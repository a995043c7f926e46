//! Autocomplete Bridge
//!
//! Optional per-field suggestion fetching, gated by schema capability and a
//! caller-level override, debounced with a generation counter so only the
//! latest pending lookup fires.

use crate::api::{AutocompleteRequest, ResolverApi};
use crate::error::Result;
use crate::schema::{ResourceType, SchemaDescriptor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Whether autocomplete is available for this set of schemas.
///
/// Requires at least one schema with `search.autocomplete_enabled` AND a
/// caller override that is not `false`. A workflow-level `false` always wins
/// over a schema-level `true`.
pub fn autocomplete_enabled(
    schemas: &[SchemaDescriptor],
    caller_override: Option<bool>,
) -> bool {
    if caller_override == Some(false) {
        return false;
    }
    schemas.iter().any(|s| s.search.autocomplete_enabled)
}

/// Fetch suggestions for one field's current text.
///
/// Empty or whitespace-only text short-circuits to no suggestions without a
/// network call, so clearing a field never fires a request.
pub async fn suggest(
    api: &dyn ResolverApi,
    resource_type: &ResourceType,
    search_text: &str,
) -> Result<Vec<serde_json::Value>> {
    if search_text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let request = AutocompleteRequest {
        want: resource_type.type_url(),
        search: search_text.to_string(),
        case_sensitive: false,
    };
    debug!(resource_type = %resource_type, search_text, "autocomplete lookup");
    let response = api.autocomplete(&request).await?;
    Ok(response.results)
}

/// Latest-wins debouncer. Each call advances a generation counter, waits out
/// the delay, and runs its future only if no newer call arrived meanwhile.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `work` after the debounce delay, unless superseded. Returns `None`
    /// when a newer call took over.
    pub async fn run<T, F, Fut>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != my_generation {
            return None;
        }
        Some(work().await)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
