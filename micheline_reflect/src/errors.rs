use micheline_forge::ForgeError;
use micheline_types::NodeError;
use thiserror::Error;

/// Result alias used across the typed tree crate.
pub type AstResult<T> = Result<T, AstError>;

/// Errors produced while typing, settling and projecting Micheline trees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AstError {
    /// A value (or type) node has the wrong primitive or literal shape.
    #[error("invalid primitive: expected {expected}, got {got}")]
    InvalidPrim { expected: String, got: String },

    /// A type primitive received the wrong number of arguments.
    #[error("{prim} expects {expected} argument(s), got {got}")]
    InvalidArgsCount {
        prim: String,
        expected: String,
        got: usize,
    },

    /// The primitive is not part of the registry.
    #[error("unknown primitive '{0}'")]
    UnknownPrim(String),

    /// Type and value trees do not line up.
    #[error("type and value trees are different: {0}")]
    TreesAreDifferent(String),

    /// A derived operation was attempted before a value was settled.
    #[error("tree is not settled")]
    TreeIsNotSettled,

    /// Compare or diff across different concrete types, or on a non-comparable type.
    #[error("type '{left}' is not comparable with '{right}'")]
    TypeIsNotComparable { left: String, right: String },

    /// The operation has no meaning for this primitive.
    #[error("{op} is not supported for '{prim}'")]
    Unsupported { prim: String, op: &'static str },

    /// A JSON Schema form submission does not fit the type.
    #[error("invalid schema data: {0}")]
    InvalidSchemaData(String),

    /// A literal failed its format validator.
    #[error("invalid {kind}: {reason}")]
    Validation { kind: &'static str, reason: String },

    /// A contract script lacks a required section.
    #[error("script section '{0}' is missing")]
    MissingSection(&'static str),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Forge(#[from] ForgeError),
}

impl AstError {
    pub(crate) fn invalid_prim(expected: impl Into<String>, got: impl Into<String>) -> Self {
        AstError::InvalidPrim {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub(crate) fn not_comparable(left: impl Into<String>, right: impl Into<String>) -> Self {
        AstError::TypeIsNotComparable {
            left: left.into(),
            right: right.into(),
        }
    }
}
