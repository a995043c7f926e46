pub mod api;
pub mod autocomplete;
pub mod error;
pub mod executor;
pub mod hydrator;
pub mod resolver;
pub mod schema;
pub mod session_cache;
pub mod state;

pub use api::{HttpResolverApi, ResolverApi};
pub use error::{ResolveError, Result};
pub use executor::{ResolutionInput, ResolutionResult};
pub use resolver::{ResolveOutcome, Resolver, ResolverConfig, SearchMode, WarningSink};
pub use schema::{FieldDescriptor, FieldKind, ResourceType, SchemaDescriptor};
