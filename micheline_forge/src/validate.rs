//! Format validators for textual literals, used before values are forged or
//! accepted from form submissions.

use chrono::DateTime;

use crate::encoding::{
    forge_address, forge_chain_id, forge_key_hash, forge_l2_address, forge_public_key,
    forge_signature,
};
use crate::errors::{ForgeError, ForgeResult};

fn wrap<T, E: std::fmt::Display>(
    kind: &'static str,
    text: &str,
    result: Result<T, E>,
) -> ForgeResult<()> {
    result
        .map(|_| ())
        .map_err(|e| ForgeError::validation(kind, format!("{:?}: {}", text, e)))
}

pub fn validate_address(text: &str) -> ForgeResult<()> {
    wrap("address", text, forge_address(text))
}

pub fn validate_key_hash(text: &str) -> ForgeResult<()> {
    wrap("key_hash", text, forge_key_hash(text))
}

pub fn validate_public_key(text: &str) -> ForgeResult<()> {
    wrap("key", text, forge_public_key(text))
}

pub fn validate_signature(text: &str) -> ForgeResult<()> {
    wrap("signature", text, forge_signature(text))
}

pub fn validate_chain_id(text: &str) -> ForgeResult<()> {
    wrap("chain_id", text, forge_chain_id(text))
}

pub fn validate_l2_address(text: &str) -> ForgeResult<()> {
    wrap("tx_rollup_l2_address", text, forge_l2_address(text))
}

/// Even-length hex, optionally `0x`-prefixed.
pub fn validate_bytes(text: &str) -> ForgeResult<()> {
    let raw = text.strip_prefix("0x").unwrap_or(text);
    wrap("bytes", text, hex::decode(raw))
}

/// RFC 3339 text or integer seconds since the epoch.
pub fn validate_timestamp(text: &str) -> ForgeResult<()> {
    if text.parse::<i64>().is_ok() {
        return Ok(());
    }
    wrap("timestamp", text, DateTime::parse_from_rfc3339(text))
}
