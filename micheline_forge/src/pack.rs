//! PACK/UNPACK framing: a forged value behind a one-byte marker.

use micheline_types::Node;

use crate::errors::{ForgeError, ForgeResult};
use crate::forge::forge;
use crate::unforge::unforge_one;

pub const PACK_PREFIX: u8 = 0x05;

pub fn pack(node: &Node) -> ForgeResult<Vec<u8>> {
    let body = forge(node)?;
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(PACK_PREFIX);
    out.extend(body);
    Ok(out)
}

pub fn unpack(data: &[u8]) -> ForgeResult<Node> {
    match data.split_first() {
        Some((&PACK_PREFIX, body)) => unpack_body(body),
        Some((&other, _)) => Err(ForgeError::InvalidPackPrefix(other)),
        None => Err(ForgeError::TooFewBytes {
            needed: 1,
            available: 0,
        }),
    }
}

fn unpack_body(body: &[u8]) -> ForgeResult<Node> {
    unforge_one(body)
}

/// Unpacks a hex string, with or without a `0x` prefix.
pub fn unpack_string(text: &str) -> ForgeResult<Node> {
    let data = hex::decode(text.trim_start_matches("0x"))?;
    unpack(&data)
}
