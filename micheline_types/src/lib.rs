//! Micheline Type Definitions
//!
//! This crate contains the untyped Micheline tree and the Michelson primitive
//! registry. It provides pure data structures plus their JSON surface, without
//! any binary encoding or typing logic.

pub mod annots;
pub mod errors;
pub mod node;
pub mod prim;

// Re-export commonly used types at the crate root
pub use errors::{NodeError, NodeResult};
pub use node::*;
pub use prim::{keyword_code, keyword_name, Arity, TypePrim, PRIM_KEYWORDS};
