//! Binary forms of addresses, keys, signatures and chain ids.
//!
//! These are the "optimized" literal encodings the chain uses inside forged
//! values: the textual base58check form maps to a compact tagged byte string.

use tracing::debug;

use crate::base58::{decode_kind, decode_prefixed, encode_prefixed, PrefixKind};
use crate::errors::{ForgeError, ForgeResult};

pub const ADDRESS_LEN: usize = 22;
pub const KEY_HASH_LEN: usize = 21;
pub const HASH_LEN: usize = 20;
pub const CHAIN_ID_LEN: usize = 4;
pub const DEFAULT_ENTRYPOINT: &str = "default";

const IMPLICIT_TAG: u8 = 0x00;
const ORIGINATED_TAG: u8 = 0x01;
const TX_ROLLUP_TAG: u8 = 0x02;
const SMART_ROLLUP_TAG: u8 = 0x03;

/// Curve tags shared by implicit addresses, key hashes and public keys.
const IMPLICIT_KINDS: [PrefixKind; 4] = [
    PrefixKind::Ed25519PublicKeyHash,
    PrefixKind::Secp256k1PublicKeyHash,
    PrefixKind::P256PublicKeyHash,
    PrefixKind::Bls12381PublicKeyHash,
];

const PUBLIC_KEY_KINDS: [PrefixKind; 4] = [
    PrefixKind::Ed25519PublicKey,
    PrefixKind::Secp256k1PublicKey,
    PrefixKind::P256PublicKey,
    PrefixKind::Bls12381PublicKey,
];

/// Splits `KT1...%entrypoint` into the address and its entrypoint.
pub fn split_entrypoint(text: &str) -> (&str, Option<&str>) {
    match text.split_once('%') {
        Some((address, entrypoint)) => (address, Some(entrypoint)),
        None => (text, None),
    }
}

fn curve_tag(kind: PrefixKind) -> Option<u8> {
    IMPLICIT_KINDS
        .iter()
        .position(|k| *k == kind)
        .map(|tag| tag as u8)
}

/// Forges a textual address, with an optional `%entrypoint` suffix, to its tagged binary form.
pub fn forge_address(text: &str) -> ForgeResult<Vec<u8>> {
    let (address, entrypoint) = split_entrypoint(text);
    let (prefix, payload) =
        decode_prefixed(address).map_err(|e| ForgeError::InvalidAddress(format!("{}: {}", text, e)))?;

    let mut out = Vec::with_capacity(ADDRESS_LEN);
    if let Some(curve) = curve_tag(prefix.kind) {
        out.push(IMPLICIT_TAG);
        out.push(curve);
        out.extend_from_slice(&payload);
    } else {
        let tag = match prefix.kind {
            PrefixKind::ContractHash => ORIGINATED_TAG,
            PrefixKind::TxRollupHash => TX_ROLLUP_TAG,
            PrefixKind::SmartRollupHash => SMART_ROLLUP_TAG,
            _ => {
                return Err(ForgeError::InvalidAddress(format!(
                    "{} is a {} identifier, not an address",
                    text, prefix.textual
                )))
            }
        };
        out.push(tag);
        out.extend_from_slice(&payload);
        out.push(0x00);
    }

    match entrypoint {
        Some(name) if !name.is_empty() && name != DEFAULT_ENTRYPOINT => {
            out.extend_from_slice(name.as_bytes())
        }
        _ => {}
    }
    Ok(out)
}

/// Inverse of [`forge_address`]; a non-default entrypoint suffix is rendered as `%name`.
pub fn unforge_address(data: &[u8]) -> ForgeResult<String> {
    if data.len() < ADDRESS_LEN {
        return Err(ForgeError::InvalidAddress(format!(
            "expected at least {} bytes, got {}",
            ADDRESS_LEN,
            data.len()
        )));
    }
    let (body, suffix) = data.split_at(ADDRESS_LEN);
    let address = match body[0] {
        IMPLICIT_TAG => {
            let kind = IMPLICIT_KINDS.get(body[1] as usize).ok_or_else(|| {
                ForgeError::InvalidAddress(format!("unknown curve tag {}", body[1]))
            })?;
            encode_prefixed(*kind, &body[2..])?
        }
        tag @ (ORIGINATED_TAG | TX_ROLLUP_TAG | SMART_ROLLUP_TAG) => {
            if body[ADDRESS_LEN - 1] != 0x00 {
                return Err(ForgeError::InvalidAddress(
                    "missing zero padding byte".to_string(),
                ));
            }
            let kind = match tag {
                ORIGINATED_TAG => PrefixKind::ContractHash,
                TX_ROLLUP_TAG => PrefixKind::TxRollupHash,
                _ => PrefixKind::SmartRollupHash,
            };
            encode_prefixed(kind, &body[1..ADDRESS_LEN - 1])?
        }
        other => {
            return Err(ForgeError::InvalidAddress(format!(
                "unknown address tag {}",
                other
            )))
        }
    };

    if suffix.is_empty() {
        return Ok(address);
    }
    let entrypoint = std::str::from_utf8(suffix).map_err(|_| ForgeError::InvalidString)?;
    debug!(address = %address, entrypoint, "unforged address with entrypoint");
    if entrypoint == DEFAULT_ENTRYPOINT {
        Ok(address)
    } else {
        Ok(format!("{}%{}", address, entrypoint))
    }
}

pub fn forge_key_hash(text: &str) -> ForgeResult<Vec<u8>> {
    let (prefix, payload) = decode_prefixed(text)?;
    let curve = curve_tag(prefix.kind).ok_or_else(|| {
        ForgeError::validation("key_hash", format!("{} is not a public key hash", text))
    })?;
    let mut out = Vec::with_capacity(KEY_HASH_LEN);
    out.push(curve);
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn unforge_key_hash(data: &[u8]) -> ForgeResult<String> {
    if data.len() != KEY_HASH_LEN {
        return Err(ForgeError::validation(
            "key_hash",
            format!("expected {} bytes, got {}", KEY_HASH_LEN, data.len()),
        ));
    }
    let kind = IMPLICIT_KINDS
        .get(data[0] as usize)
        .ok_or_else(|| ForgeError::validation("key_hash", format!("unknown tag {}", data[0])))?;
    encode_prefixed(*kind, &data[1..])
}

pub fn forge_public_key(text: &str) -> ForgeResult<Vec<u8>> {
    let (prefix, payload) = decode_prefixed(text)?;
    let tag = PUBLIC_KEY_KINDS
        .iter()
        .position(|k| *k == prefix.kind)
        .ok_or_else(|| ForgeError::validation("key", format!("{} is not a public key", text)))?;
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(tag as u8);
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn unforge_public_key(data: &[u8]) -> ForgeResult<String> {
    let (tag, key) = data
        .split_first()
        .ok_or_else(|| ForgeError::validation("key", "empty input"))?;
    let kind = PUBLIC_KEY_KINDS
        .get(*tag as usize)
        .ok_or_else(|| ForgeError::validation("key", format!("unknown tag {}", tag)))?;
    encode_prefixed(*kind, key)
}

/// Signatures forge to their raw bytes whatever the curve.
pub fn forge_signature(text: &str) -> ForgeResult<Vec<u8>> {
    let (prefix, payload) = decode_prefixed(text)?;
    match prefix.kind {
        PrefixKind::Ed25519Signature
        | PrefixKind::Secp256k1Signature
        | PrefixKind::P256Signature
        | PrefixKind::GenericSignature
        | PrefixKind::Bls12381Signature => Ok(payload),
        _ => Err(ForgeError::validation(
            "signature",
            format!("{} is not a signature", text),
        )),
    }
}

/// The curve is not recoverable from 64 raw bytes, so those become a generic `sig`.
pub fn unforge_signature(data: &[u8]) -> ForgeResult<String> {
    match data.len() {
        64 => encode_prefixed(PrefixKind::GenericSignature, data),
        96 => encode_prefixed(PrefixKind::Bls12381Signature, data),
        other => Err(ForgeError::validation(
            "signature",
            format!("unexpected length {}", other),
        )),
    }
}

pub fn forge_chain_id(text: &str) -> ForgeResult<Vec<u8>> {
    decode_kind(PrefixKind::ChainId, text)
}

pub fn unforge_chain_id(data: &[u8]) -> ForgeResult<String> {
    encode_prefixed(PrefixKind::ChainId, data)
}

/// `tx_rollup_l2_address` values are tz4 hashes stored as 20 raw bytes.
pub fn forge_l2_address(text: &str) -> ForgeResult<Vec<u8>> {
    decode_kind(PrefixKind::Bls12381PublicKeyHash, text)
}

pub fn unforge_l2_address(data: &[u8]) -> ForgeResult<String> {
    if data.len() != HASH_LEN {
        return Err(ForgeError::validation(
            "tx_rollup_l2_address",
            format!("expected {} bytes, got {}", HASH_LEN, data.len()),
        ));
    }
    encode_prefixed(PrefixKind::Bls12381PublicKeyHash, data)
}
