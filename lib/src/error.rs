//! Error taxonomy for loading shapes and running validation.
//!
//! Non-conformance is never an error: it is reported through
//! [`ValidationResult`](crate::report::ValidationResult)s. Every variant here
//! aborts the whole validation call.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A shape definition violates the structural rules for shapes.
    #[error("Failed to load shape {shape}: {message}")]
    ShapeLoad { shape: String, message: String },

    /// A constraint parameter on a shape is missing, repeated or mistyped.
    #[error("Failed to load {component} on shape {shape}: {message}")]
    ConstraintLoad {
        component: String,
        shape: String,
        message: String,
    },

    /// A property path expression is structurally invalid.
    #[error("Malformed property path {node}: {message}")]
    MalformedPath { node: String, message: String },

    /// Nested path expressions exceeded the structural recursion bound.
    #[error("Path traversal depth is too much ({depth} levels)")]
    PathTooDeep { depth: usize },

    /// A constraint referenced something that does not resolve at evaluation time.
    #[error("Validation failed at runtime: {0}")]
    Runtime(String),

    /// The query collaborator failed, or none was configured when one was needed.
    #[error("Query engine error: {0}")]
    QueryEngine(String),

    /// The report could not be serialized.
    #[error("Report serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    pub(crate) fn shape_load(shape: impl ToString, message: impl Into<String>) -> Self {
        EngineError::ShapeLoad {
            shape: shape.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn constraint_load(
        component: &str,
        shape: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        EngineError::ConstraintLoad {
            component: component.to_string(),
            shape: shape.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed_path(node: impl ToString, message: impl Into<String>) -> Self {
        EngineError::MalformedPath {
            node: node.to_string(),
            message: message.into(),
        }
    }

    /// True for the load-time family (shape, constraint and path structure errors).
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            EngineError::ShapeLoad { .. }
                | EngineError::ConstraintLoad { .. }
                | EngineError::MalformedPath { .. }
                | EngineError::PathTooDeep { .. }
        )
    }
}
