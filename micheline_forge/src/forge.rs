//! Forging: untyped Micheline to the chain's binary encoding.

use micheline_types::{keyword_code, Node, PrimNode};

use crate::errors::{ForgeError, ForgeResult};
use crate::zarith;

pub const TAG_INT: u8 = 0x00;
pub const TAG_STRING: u8 = 0x01;
pub const TAG_SEQ: u8 = 0x02;
pub const TAG_PRIM_0: u8 = 0x03;
pub const TAG_PRIM_0_ANNOTS: u8 = 0x04;
pub const TAG_PRIM_1: u8 = 0x05;
pub const TAG_PRIM_1_ANNOTS: u8 = 0x06;
pub const TAG_PRIM_2: u8 = 0x07;
pub const TAG_PRIM_2_ANNOTS: u8 = 0x08;
pub const TAG_PRIM_GENERIC: u8 = 0x09;
pub const TAG_BYTES: u8 = 0x0a;

/// Appends a 4-byte big-endian length prefix followed by `body`.
pub(crate) fn write_length_prefixed(out: &mut Vec<u8>, body: &[u8]) -> ForgeResult<()> {
    let len = u32::try_from(body.len()).map_err(|_| ForgeError::LengthOverflow)?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(body);
    Ok(())
}

/// Forges a single node.
pub fn forge(node: &Node) -> ForgeResult<Vec<u8>> {
    let mut out = Vec::new();
    write_node(&mut out, node)?;
    Ok(out)
}

/// Forges a document: one node as itself, several as a sequence.
pub fn forge_nodes(nodes: &[Node]) -> ForgeResult<Vec<u8>> {
    match nodes {
        [single] => forge(single),
        many => {
            let mut out = Vec::new();
            write_seq(&mut out, many)?;
            Ok(out)
        }
    }
}

pub fn forge_hex(node: &Node) -> ForgeResult<String> {
    forge(node).map(hex::encode)
}

fn write_node(out: &mut Vec<u8>, node: &Node) -> ForgeResult<()> {
    match node {
        Node::Int(value) => {
            out.push(TAG_INT);
            out.extend(zarith::encode_int(value));
        }
        Node::String(value) => {
            out.push(TAG_STRING);
            write_length_prefixed(out, value.as_bytes())?;
        }
        Node::Bytes(value) => {
            out.push(TAG_BYTES);
            write_length_prefixed(out, value)?;
        }
        Node::Seq(items) => write_seq(out, items)?,
        Node::Prim(prim) => write_prim(out, prim)?,
    }
    Ok(())
}

fn write_seq(out: &mut Vec<u8>, items: &[Node]) -> ForgeResult<()> {
    let mut body = Vec::new();
    for item in items {
        write_node(&mut body, item)?;
    }
    out.push(TAG_SEQ);
    write_length_prefixed(out, &body)
}

fn write_prim(out: &mut Vec<u8>, prim: &PrimNode) -> ForgeResult<()> {
    let code =
        keyword_code(&prim.prim).ok_or_else(|| ForgeError::UnknownPrim(prim.prim.clone()))?;
    let has_annots = !prim.annots.is_empty();
    let annots = prim.annots.join(" ");

    if prim.args.len() <= 2 {
        let tag = TAG_PRIM_0 + 2 * prim.args.len() as u8 + u8::from(has_annots);
        out.push(tag);
        out.push(code);
        for arg in &prim.args {
            write_node(out, arg)?;
        }
        if has_annots {
            write_length_prefixed(out, annots.as_bytes())?;
        }
    } else {
        /* generic form: byte-length-prefixed args, annotation blob always present */
        out.push(TAG_PRIM_GENERIC);
        out.push(code);
        let mut body = Vec::new();
        for arg in &prim.args {
            write_node(&mut body, arg)?;
        }
        write_length_prefixed(out, &body)?;
        write_length_prefixed(out, annots.as_bytes())?;
    }
    Ok(())
}
