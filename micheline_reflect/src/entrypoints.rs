/* Entrypoints of parameter types and call parameters */

use micheline_types::untyped_to_json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ast::TypedAst;
use crate::errors::{AstError, AstResult};
use crate::node::TypedNode;
use crate::untyped::ValueForm;

pub const DEFAULT_ENTRYPOINT: &str = "default";

/* Parameters of a contract call */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub entrypoint: String,
    pub value: JsonValue,
}

impl TypedAst {
    /* Leaves of the root `or` with their names; any other root is `default` */
    pub(crate) fn entrypoint_nodes(&self) -> Vec<(String, &TypedNode)> {
        match self.skeleton() {
            [root] if root.is_or() => root
                .flatten_or()
                .into_iter()
                .map(|(_, leaf)| (leaf.name(), leaf))
                .collect(),
            [root] => vec![(DEFAULT_ENTRYPOINT.to_string(), root)],
            _ => Vec::new(),
        }
    }

    pub fn entrypoints(&self) -> Vec<String> {
        self.entrypoint_nodes()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub fn entrypoint(&self, name: &str) -> Option<&TypedNode> {
        self.entrypoint_nodes()
            .into_iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, node)| node)
    }

    /* Call parameters for `entrypoint` from the settled value.
     * `default` sends the whole value; otherwise the settled branch must match. */
    pub fn to_parameters(&self, entrypoint: &str) -> AstResult<Parameters> {
        let root = match self.nodes() {
            [root] => root,
            nodes => {
                return Err(AstError::TreesAreDifferent(format!(
                    "parameters need one root, got {}",
                    nodes.len()
                )))
            }
        };
        if !self.is_settled() {
            return Err(AstError::TreeIsNotSettled);
        }
        if entrypoint == DEFAULT_ENTRYPOINT || !root.is_or() {
            return Ok(Parameters {
                entrypoint: DEFAULT_ENTRYPOINT.to_string(),
                value: untyped_to_json(&[root.to_untyped(ValueForm::Preserve)?]),
            });
        }
        let (_, leaf) = root.active_or_leaf().ok_or(AstError::TreeIsNotSettled)?;
        if leaf.name() != entrypoint {
            return Err(AstError::TreesAreDifferent(format!(
                "value settles entrypoint {}, not {}",
                leaf.name(),
                entrypoint
            )));
        }
        Ok(Parameters {
            entrypoint: entrypoint.to_string(),
            value: untyped_to_json(&[leaf.to_untyped(ValueForm::Preserve)?]),
        })
    }
}
