use thiserror::Error;

/// Result alias used throughout the binary codec and domain encoders.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Errors raised while forging, unforging or converting chain identifiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeError {
    #[error("too few bytes: needed {needed}, {available} available")]
    TooFewBytes { needed: usize, available: usize },

    #[error("invalid primitive keyword code 0x{0:02x}")]
    InvalidKeyword(u8),

    #[error("unknown primitive {0:?}")]
    UnknownPrim(String),

    #[error("unknown type code 0x{0:02x}")]
    UnknownTypeCode(u8),

    #[error("string is not valid UTF-8")]
    InvalidString,

    #[error("invalid pack prefix 0x{0:02x}, expected 0x05")]
    InvalidPackPrefix(u8),

    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("base58 checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("unknown base58 prefix: {0}")]
    UnknownPrefix(String),

    #[error("invalid {kind}: {reason}")]
    Validation { kind: &'static str, reason: String },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("length does not fit into a 4-byte prefix")]
    LengthOverflow,
}

impl ForgeError {
    pub(crate) fn validation(kind: &'static str, reason: impl Into<String>) -> Self {
        ForgeError::Validation {
            kind,
            reason: reason.into(),
        }
    }
}
