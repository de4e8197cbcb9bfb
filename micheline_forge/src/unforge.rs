//! Unforging: the chain's binary encoding back to untyped Micheline.

use micheline_types::{keyword_name, Node, PrimNode};

use crate::errors::{ForgeError, ForgeResult};
use crate::forge::*;
use crate::zarith;

/// Deepest nesting of sequences and primitives accepted from a byte stream.
pub const MAX_DEPTH: usize = 1000;

/// Cursor over a forged byte stream.
pub struct Unforger<'a> {
    data: &'a [u8],
    offset: usize,
    depth: usize,
}

impl<'a> Unforger<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::nested(data, 0)
    }

    fn nested(data: &'a [u8], depth: usize) -> Self {
        Self {
            data,
            offset: 0,
            depth,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read_u8(&mut self) -> ForgeResult<u8> {
        let byte = *self.data.get(self.offset).ok_or(ForgeError::TooFewBytes {
            needed: 1,
            available: 0,
        })?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_exact(&mut self, len: usize) -> ForgeResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ForgeError::TooFewBytes {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_length_prefixed(&mut self) -> ForgeResult<&'a [u8]> {
        let raw = self.read_exact(4)?;
        let len = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        self.read_exact(len)
    }

    fn read_string(&mut self) -> ForgeResult<String> {
        let raw = self.read_length_prefixed()?;
        String::from_utf8(raw.to_vec()).map_err(|_| ForgeError::InvalidString)
    }

    fn read_annots(&mut self) -> ForgeResult<Vec<String>> {
        let blob = self.read_string()?;
        Ok(blob
            .split(' ')
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn read_keyword(&mut self) -> ForgeResult<String> {
        let code = self.read_u8()?;
        keyword_name(code)
            .map(str::to_string)
            .ok_or(ForgeError::InvalidKeyword(code))
    }

    /// Reads the next node from the stream.
    pub fn read_node(&mut self) -> ForgeResult<Node> {
        if self.depth >= MAX_DEPTH {
            return Err(ForgeError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let node = self.read_tagged();
        self.depth -= 1;
        node
    }

    fn read_tagged(&mut self) -> ForgeResult<Node> {
        let tag = self.read_u8()?;
        match tag {
            TAG_INT => {
                let (value, used) = zarith::decode_int(&self.data[self.offset..])?;
                self.offset += used;
                Ok(Node::Int(value))
            }
            TAG_STRING => self.read_string().map(Node::String),
            TAG_BYTES => self.read_length_prefixed().map(|b| Node::Bytes(b.to_vec())),
            TAG_SEQ => {
                let body = self.read_length_prefixed()?;
                read_all(body, self.depth).map(Node::Seq)
            }
            TAG_PRIM_0..=TAG_PRIM_2_ANNOTS => {
                let nargs = ((tag - TAG_PRIM_0) / 2) as usize;
                let has_annots = (tag - TAG_PRIM_0) % 2 == 1;
                let prim = self.read_keyword()?;
                let mut args = Vec::with_capacity(nargs);
                for _ in 0..nargs {
                    args.push(self.read_node()?);
                }
                let annots = if has_annots {
                    self.read_annots()?
                } else {
                    Vec::new()
                };
                Ok(Node::Prim(PrimNode { prim, args, annots }))
            }
            TAG_PRIM_GENERIC => {
                let prim = self.read_keyword()?;
                let body = self.read_length_prefixed()?;
                let args = read_all(body, self.depth)?;
                let annots = self.read_annots()?;
                Ok(Node::Prim(PrimNode { prim, args, annots }))
            }
            other => Err(ForgeError::UnknownTypeCode(other)),
        }
    }
}

fn read_all(data: &[u8], depth: usize) -> ForgeResult<Vec<Node>> {
    let mut cursor = Unforger::nested(data, depth);
    let mut nodes = Vec::new();
    while !cursor.is_empty() {
        nodes.push(cursor.read_node()?);
    }
    Ok(nodes)
}

/// Decodes every node in `data`. Nothing is returned unless the whole stream decodes.
pub fn unforge(data: &[u8]) -> ForgeResult<Vec<Node>> {
    read_all(data, 0)
}

/// Decodes exactly one node; leftover bytes are an error.
pub fn unforge_one(data: &[u8]) -> ForgeResult<Node> {
    let mut cursor = Unforger::new(data);
    let node = cursor.read_node()?;
    if !cursor.is_empty() {
        return Err(ForgeError::TrailingBytes(cursor.remaining()));
    }
    Ok(node)
}

pub fn unforge_hex(text: &str) -> ForgeResult<Vec<Node>> {
    let data = hex::decode(text.trim_start_matches("0x"))?;
    unforge(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unforges_int_string_bytes() {
        assert_eq!(unforge_hex("0006").unwrap(), vec![Node::int(6)]);
        assert_eq!(
            unforge_hex("01000000096d696368656c696e65").unwrap(),
            vec![Node::string("micheline")]
        );
        assert_eq!(
            unforge_hex("0a00000002cafe").unwrap(),
            vec![Node::bytes(vec![0xca, 0xfe])]
        );
    }

    #[test]
    fn declared_length_beyond_input_fails() {
        assert_eq!(
            unforge_hex("0100000009414243"),
            Err(ForgeError::TooFewBytes {
                needed: 9,
                available: 3
            })
        );
    }

    #[test]
    fn unknown_tag_and_keyword() {
        assert_eq!(unforge_hex("0b"), Err(ForgeError::UnknownTypeCode(0x0b)));
        assert_eq!(unforge_hex("03ff"), Err(ForgeError::InvalidKeyword(0xff)));
    }

    #[test]
    fn unforge_one_rejects_trailing_bytes() {
        assert_eq!(
            unforge_one(&[0x00, 0x06, 0x00]),
            Err(ForgeError::TrailingBytes(1))
        );
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut data = [0x05, 0x09].repeat(200_000);
        data.extend_from_slice(&[0x03, 0x0b]);
        assert_eq!(unforge(&data), Err(ForgeError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn nested_sequences_count_toward_depth() {
        // Each level is `{ <inner> }` with a 4-byte length prefix.
        let mut data = vec![0x00, 0x00];
        for _ in 0..MAX_DEPTH {
            let mut wrapped = vec![0x02];
            wrapped.extend_from_slice(&(data.len() as u32).to_be_bytes());
            wrapped.extend_from_slice(&data);
            data = wrapped;
        }
        assert_eq!(unforge(&data), Err(ForgeError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn nesting_below_the_bound_decodes() {
        let mut data = [0x05, 0x09].repeat(MAX_DEPTH - 1);
        data.extend_from_slice(&[0x03, 0x0b]);
        let node = unforge_one(&data).unwrap();
        let mut depth = 1;
        let mut current = &node;
        while let Node::Prim(prim) = current {
            match prim.args.as_slice() {
                [inner] => {
                    depth += 1;
                    current = inner;
                }
                _ => break,
            }
        }
        assert_eq!(depth, MAX_DEPTH);
    }
}
