//! Schema Client
//!
//! Fetches the field schemas registered for a resource type and decodes the
//! wire objects into typed descriptors. Field kind is decided once here, at
//! decode time: a wire field carrying zero or both kind metadata bags is a
//! validation error, never a silent first-match pick.

use crate::api::{GetObjectSchemasRequest, ResolverApi, WireField, WireSchema};
use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fully-qualified domain type being searched for,
/// e.g. `pkg.compute.v1.Instance`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType(pub String);

impl ResourceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The `want`/`type_url` form used on every wire request.
    pub fn type_url(&self) -> String {
        format!("type.googleapis.com/{}", self.0)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One enumerated choice for an option field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub display_name: String,
    pub string_value: String,
}

/// The kind of input a field takes, decided at schema-decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Text {
        placeholder: Option<String>,
        default_value: Option<String>,
    },
    Choice {
        options: Vec<FieldOption>,
    },
}

/// One input field belonging to a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub display_name: String,
    pub required: bool,
    pub kind: FieldKind,
}

/// Searchability flags attached to a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCapability {
    pub enabled: bool,
    pub autocomplete_enabled: bool,
}

/// Typed description of the searchable/fillable fields for a resource type.
/// Immutable after decode; owned by the state machine for one mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub type_name: String,
    pub display_name: String,
    pub fields: Vec<FieldDescriptor>,
    pub searchable: bool,
    pub search: SearchCapability,
    pub error: Option<String>,
}

impl SchemaDescriptor {
    /// Whether this schema participates in per-field search.
    pub fn is_searchable(&self) -> bool {
        self.searchable || self.search.enabled
    }
}

fn decode_field(wire: WireField) -> Result<FieldDescriptor> {
    let kind = match (wire.string_metadata, wire.option_metadata) {
        (Some(meta), None) => FieldKind::Text {
            placeholder: meta.placeholder,
            default_value: meta.default_value,
        },
        (None, Some(meta)) => FieldKind::Choice {
            options: wire_options(meta.options),
        },
        (Some(_), Some(_)) => {
            return Err(ResolveError::MalformedField {
                field: wire.name,
                reason: "both string and option metadata present".to_string(),
            })
        }
        (None, None) => {
            return Err(ResolveError::MalformedField {
                field: wire.name,
                reason: "no field kind metadata present".to_string(),
            })
        }
    };

    Ok(FieldDescriptor {
        display_name: wire.display_name.unwrap_or_else(|| wire.name.clone()),
        name: wire.name,
        required: wire.required,
        kind,
    })
}

fn wire_options(options: Vec<crate::api::WireOption>) -> Vec<FieldOption> {
    options
        .into_iter()
        .map(|o| FieldOption {
            display_name: o.display_name,
            string_value: o.string_value,
        })
        .collect()
}

/// Decode one wire schema into a typed descriptor.
pub fn decode_schema(wire: WireSchema) -> Result<SchemaDescriptor> {
    let fields = wire
        .fields
        .into_iter()
        .map(decode_field)
        .collect::<Result<Vec<_>>>()?;

    Ok(SchemaDescriptor {
        display_name: wire.display_name.unwrap_or_else(|| wire.type_name.clone()),
        type_name: wire.type_name,
        fields,
        searchable: wire.searchable,
        search: wire
            .search
            .map(|s| SearchCapability {
                enabled: s.enabled,
                autocomplete_enabled: s.autocomplete_enabled,
            })
            .unwrap_or_default(),
        error: wire.error,
    })
}

/// Fetch and decode every schema registered for `resource_type`.
///
/// An empty backend list returns `Ok(vec![])`; the state machine treats that
/// as the not-found condition. Transport failures reject normally.
pub async fn fetch_schemas(
    api: &dyn ResolverApi,
    resource_type: &ResourceType,
) -> Result<Vec<SchemaDescriptor>> {
    let request = GetObjectSchemasRequest {
        type_url: resource_type.type_url(),
    };
    let response = api
        .get_object_schemas(&request)
        .await
        .map_err(|err| ResolveError::SchemaFetch(err.to_string()))?;

    let schemas = response
        .schemas
        .into_iter()
        .map(decode_schema)
        .collect::<Result<Vec<_>>>()?;

    info!(
        resource_type = %resource_type,
        count = schemas.len(),
        "fetched object schemas"
    );
    Ok(schemas)
}
