use thiserror::Error;

/// Result alias used for untyped tree decoding.
pub type NodeResult<T> = Result<T, NodeError>;

/// Errors produced while decoding Micheline JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The document is not valid JSON, or an object matches neither the literal nor the primitive shape.
    #[error("invalid micheline JSON: {0}")]
    InvalidJson(String),
}
