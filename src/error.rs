use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Schema fetch error: {0}")]
    SchemaFetch(String),

    #[error("no schemas found for type '{0}'")]
    SchemasNotFound(String),

    #[error("Resolve error: {0}")]
    Resolve(String),

    #[error("Malformed field '{field}': {reason}")]
    MalformedField { field: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal Client Error: '{0}'. Please contact the workflow developer.")]
    Internal(String),
}

impl ResolveError {
    /// Normalize a transport failure with no structured response into the
    /// generic internal-client-error message shown to workflow users.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ResolveError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
