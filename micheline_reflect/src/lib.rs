/* Typed Micheline Library
 *
 * This library types Michelson type trees, settles untyped values into them
 * and derives views from the result: structural comparison, untyped and
 * binary re-encoding, Miguel presentation and diff trees, JSON Schema forms,
 * typedef docs, entrypoints, big-map enrichment and interface detection.
 */

pub mod ast;
pub mod bigmap;
pub mod compare;
pub mod docs;
pub mod entrypoints;
pub mod errors;
pub mod formatter;
pub mod interfaces;
pub mod miguel;
pub mod node;
pub mod ordered_map;
mod scalar;
pub mod schema;
pub mod script;
pub mod settle;
pub mod typing;
pub mod untyped;

pub use ast::TypedAst;
pub use bigmap::BigMapDiff;
pub use docs::{EntrypointDoc, Typedef, TypedefArg};
pub use entrypoints::{Parameters, DEFAULT_ENTRYPOINT};
pub use errors::{AstError, AstResult};
pub use formatter::to_michelson;
pub use interfaces::{EntrypointSpec, InterfaceRegistry, InterfaceSpec};
pub use miguel::{DiffType, MiguelNode};
pub use node::{CombShape, NodeKind, NodeMeta, OrSide, TypedNode};
pub use ordered_map::OrderedMap;
pub use schema::{JsonSchema, SchemaOptions, SCHEMA_KEY};
pub use script::{Script, ScriptView};
pub use typing::IdCounter;
pub use untyped::ValueForm;
