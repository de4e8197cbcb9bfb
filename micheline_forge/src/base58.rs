//! Base58check encoding with versioned prefixes for chain identifiers.

use sha2::{Digest, Sha256};

use crate::errors::{ForgeError, ForgeResult};

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const CHECKSUM_LEN: usize = 4;

/// Identifier families that share a base58 prefix table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixKind {
    BlockHash,
    OperationHash,
    OperationListHash,
    OperationListListHash,
    ProtocolHash,
    ContextHash,
    Ed25519PublicKeyHash,
    Secp256k1PublicKeyHash,
    P256PublicKeyHash,
    Bls12381PublicKeyHash,
    ContractHash,
    TxRollupHash,
    SmartRollupHash,
    Ed25519PublicKey,
    Secp256k1PublicKey,
    P256PublicKey,
    Bls12381PublicKey,
    Ed25519Signature,
    Secp256k1Signature,
    P256Signature,
    GenericSignature,
    Bls12381Signature,
    ChainId,
    ScriptExpr,
    BakerHash,
}

/// One row of the prefix table: the raw version bytes, the textual prefix they
/// produce and the payload length that follows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base58Prefix {
    pub kind: PrefixKind,
    pub textual: &'static str,
    pub bytes: &'static [u8],
    pub payload_len: usize,
}

macro_rules! prefix {
    ($kind:ident, $textual:expr, [$($byte:expr),*], $len:expr) => {
        Base58Prefix {
            kind: PrefixKind::$kind,
            textual: $textual,
            bytes: &[$($byte),*],
            payload_len: $len,
        }
    };
}

pub const PREFIXES: [Base58Prefix; 25] = [
    prefix!(BlockHash, "B", [1, 52], 32),
    prefix!(OperationHash, "o", [5, 116], 32),
    prefix!(OperationListHash, "Lo", [133, 233], 32),
    prefix!(OperationListListHash, "LLo", [29, 159, 109], 32),
    prefix!(ProtocolHash, "P", [2, 170], 32),
    prefix!(ContextHash, "Co", [79, 199], 32),
    prefix!(Ed25519PublicKeyHash, "tz1", [6, 161, 159], 20),
    prefix!(Secp256k1PublicKeyHash, "tz2", [6, 161, 161], 20),
    prefix!(P256PublicKeyHash, "tz3", [6, 161, 164], 20),
    prefix!(Bls12381PublicKeyHash, "tz4", [6, 161, 166], 20),
    prefix!(ContractHash, "KT1", [2, 90, 121], 20),
    prefix!(TxRollupHash, "txr1", [1, 128, 120, 31], 20),
    prefix!(SmartRollupHash, "sr1", [6, 124, 117], 20),
    prefix!(Ed25519PublicKey, "edpk", [13, 15, 37, 217], 32),
    prefix!(Secp256k1PublicKey, "sppk", [3, 254, 226, 86], 33),
    prefix!(P256PublicKey, "p2pk", [3, 178, 139, 127], 33),
    prefix!(Bls12381PublicKey, "BLpk", [6, 149, 135, 204], 48),
    prefix!(Ed25519Signature, "edsig", [9, 245, 205, 134, 18], 64),
    prefix!(Secp256k1Signature, "spsig1", [13, 115, 101, 19, 63], 64),
    prefix!(P256Signature, "p2sig", [54, 240, 44, 52], 64),
    prefix!(GenericSignature, "sig", [4, 130, 43], 64),
    prefix!(Bls12381Signature, "BLsig", [40, 171, 64, 207], 96),
    prefix!(ChainId, "Net", [87, 82, 0], 4),
    prefix!(ScriptExpr, "expr", [13, 44, 64, 27], 32),
    prefix!(BakerHash, "SG1", [3, 56, 226], 20),
];

/// Table row for `kind`.
pub fn prefix_of(kind: PrefixKind) -> &'static Base58Prefix {
    PREFIXES
        .iter()
        .find(|p| p.kind == kind)
        .unwrap_or(&PREFIXES[0])
}

/// Plain base58 without checksum.
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|b| **b == 0).count();
    /* base58 digits, least significant first */
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in &data[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(digits.iter().rev().map(|d| ALPHABET[*d as usize] as char));
    out
}

pub fn decode(text: &str) -> ForgeResult<Vec<u8>> {
    let mut inverse = [0xffu8; 128];
    for (i, &c) in ALPHABET.iter().enumerate() {
        inverse[c as usize] = i as u8;
    }

    let zeros = text.bytes().take_while(|c| *c == b'1').count();
    /* bytes, least significant first */
    let mut bytes: Vec<u8> = Vec::with_capacity(text.len());
    for c in text.bytes() {
        let value = inverse.get(c as usize).copied().unwrap_or(0xff);
        if value == 0xff {
            return Err(ForgeError::InvalidBase58(format!(
                "invalid character {:?} in {}",
                c as char, text
            )));
        }
        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let once = Sha256::digest(data);
    let twice = Sha256::digest(once);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&twice[..CHECKSUM_LEN]);
    out
}

/// Appends the double-SHA256 checksum and encodes.
pub fn encode_check(payload: &[u8]) -> String {
    let mut data = payload.to_vec();
    data.extend_from_slice(&checksum(payload));
    encode(&data)
}

/// Decodes and verifies the checksum, returning the data without it.
pub fn decode_check(text: &str) -> ForgeResult<Vec<u8>> {
    let raw = decode(text)?;
    if raw.len() < CHECKSUM_LEN {
        return Err(ForgeError::InvalidBase58(format!("{} is too short", text)));
    }
    let (data, check) = raw.split_at(raw.len() - CHECKSUM_LEN);
    if checksum(data) != check {
        return Err(ForgeError::ChecksumMismatch(text.to_string()));
    }
    Ok(data.to_vec())
}

/// Decodes a prefixed identifier, selecting the table row by version bytes and length.
pub fn decode_prefixed(text: &str) -> ForgeResult<(&'static Base58Prefix, Vec<u8>)> {
    let data = decode_check(text)?;
    let prefix = PREFIXES
        .iter()
        .find(|p| data.starts_with(p.bytes) && data.len() == p.bytes.len() + p.payload_len)
        .ok_or_else(|| ForgeError::UnknownPrefix(text.to_string()))?;
    Ok((prefix, data[prefix.bytes.len()..].to_vec()))
}

/// Decodes `text` and requires it to be of `kind`.
pub fn decode_kind(kind: PrefixKind, text: &str) -> ForgeResult<Vec<u8>> {
    let (prefix, payload) = decode_prefixed(text)?;
    if prefix.kind != kind {
        return Err(ForgeError::UnknownPrefix(format!(
            "{}: expected {}, got {}",
            text,
            prefix_of(kind).textual,
            prefix.textual
        )));
    }
    Ok(payload)
}

pub fn encode_prefixed(kind: PrefixKind, payload: &[u8]) -> ForgeResult<String> {
    let prefix = prefix_of(kind);
    if payload.len() != prefix.payload_len {
        return Err(ForgeError::validation(
            prefix.textual,
            format!(
                "expected {} payload bytes, got {}",
                prefix.payload_len,
                payload.len()
            ),
        ));
    }
    let mut data = prefix.bytes.to_vec();
    data.extend_from_slice(payload);
    Ok(encode_check(&data))
}
