/* Contract interface detection
 *
 * A contract implements an interface when its parameter type has, for every
 * entrypoint of the interface, an entrypoint with the same name whose type
 * matches structurally. Branches of `or` types may appear in any order.
 * Entrypoints with an empty name match any entrypoint of the right shape,
 * which is how view interfaces are expressed.
 */

pub mod registry;
pub mod standards;

pub use registry::InterfaceRegistry;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrypointSpec {
    pub name: String,
    /* Micheline JSON of the entrypoint parameter type */
    pub type_json: String,
}

impl EntrypointSpec {
    pub fn new(name: impl Into<String>, type_json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_json: type_json.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub tag: String,
    pub entrypoints: Vec<EntrypointSpec>,
}
