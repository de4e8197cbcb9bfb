//! Micheline binary codec and chain identifier encoders
//!
//! `forge`/`unforge` convert untyped Micheline to and from the canonical
//! binary encoding, `pack` adds the PACK marker, and `base58`/`encoding`
//! translate textual chain identifiers to their compact binary forms.

pub mod base58;
pub mod encoding;
pub mod errors;
pub mod forge;
pub mod pack;
pub mod unforge;
pub mod validate;
pub mod zarith;

pub use errors::{ForgeError, ForgeResult};
pub use forge::{forge, forge_hex, forge_nodes};
pub use pack::{pack, unpack, unpack_string, PACK_PREFIX};
pub use unforge::{unforge, unforge_hex, unforge_one, Unforger, MAX_DEPTH};
