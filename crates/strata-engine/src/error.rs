use std::fmt;

use strata_docs::DocError;
use strata_registry::RegistryError;

/// A submitted value that cannot be coerced to its declared type. Scoped to
/// one field so the caller can attach it to the right input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field `{}`: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// A required fixed field with no submitted value and no default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionError {
    pub entity: String,
    pub field: String,
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entity `{}`: required field `{}` has no value and no default",
            self.entity, self.field
        )
    }
}

impl std::error::Error for ProjectionError {}

#[derive(Debug)]
pub enum EngineError {
    Validation(ValidationError),
    Projection(ProjectionError),
    Registry(RegistryError),
    Doc(DocError),
    /// A service response was missing something the flow depends on, such as
    /// the id of a freshly created record.
    Response(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(e) => write!(f, "validation failed: {e}"),
            EngineError::Projection(e) => write!(f, "projection failed: {e}"),
            EngineError::Registry(e) => write!(f, "schema load failed: {e}"),
            EngineError::Doc(e) => write!(f, "document write failed: {e}"),
            EngineError::Response(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::Validation(e)
    }
}

impl From<ProjectionError> for EngineError {
    fn from(e: ProjectionError) -> Self {
        EngineError::Projection(e)
    }
}

impl From<RegistryError> for EngineError {
    fn from(e: RegistryError) -> Self {
        EngineError::Registry(e)
    }
}

impl From<DocError> for EngineError {
    fn from(e: DocError) -> Self {
        EngineError::Doc(e)
    }
}
