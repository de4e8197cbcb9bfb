/* Flattened type documentation */

use serde::{Deserialize, Serialize};

use crate::ast::TypedAst;
use crate::node::{NodeKind, TypedNode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedefArg {
    pub key: String,
    pub value: String,
}

/* One named type; `args` lists members of objects and branches of ors */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typedef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypedefArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrypointDoc {
    pub name: String,
    pub typedef: Vec<Typedef>,
}

/* Type expression of `node`; pairs and ors are emitted into `out` and referenced as `$name` */
fn type_expr(node: &TypedNode, out: &mut Vec<Typedef>) -> String {
    let prim = node.prim().name();
    match &node.kind {
        NodeKind::Pair { .. } => {
            let members = node.flatten_pair();
            named_typedef(node, "object", out, |out| {
                members
                    .iter()
                    .map(|member| TypedefArg {
                        key: member.name(),
                        value: type_expr(member, out),
                    })
                    .collect()
            })
        }
        NodeKind::Or { .. } => {
            let leaves = node.flatten_or();
            named_typedef(node, "or", out, |out| {
                leaves
                    .iter()
                    .map(|(_, leaf)| TypedefArg {
                        key: leaf.name(),
                        value: type_expr(leaf, out),
                    })
                    .collect()
            })
        }
        NodeKind::Contract { param, .. } => format!("contract({})", type_expr(param, out)),
        NodeKind::Option { inner, .. } => format!("option({})", type_expr(inner, out)),
        NodeKind::List { elem, .. } | NodeKind::Set { elem, .. } => {
            format!("{}({})", prim, type_expr(elem, out))
        }
        NodeKind::Map { key, value, .. } | NodeKind::BigMap { key, value, .. } => format!(
            "{}({}, {})",
            prim,
            type_expr(key, out),
            type_expr(value, out)
        ),
        NodeKind::Lambda { param, ret, .. } => format!(
            "lambda({}, {})",
            type_expr(param, out),
            type_expr(ret, out)
        ),
        NodeKind::Ticket { elem, .. } => format!("ticket({})", type_expr(elem, out)),
        NodeKind::SaplingState { memo_size, .. }
        | NodeKind::SaplingTransaction { memo_size, .. } => format!("{}({})", prim, memo_size),
        NodeKind::Constant { hash, .. } => format!("constant({:?})", hash),
        _ => prim.to_string(),
    }
}

/* Reserves the slot first so parents precede their members */
fn named_typedef<F>(node: &TypedNode, kind: &str, out: &mut Vec<Typedef>, args: F) -> String
where
    F: FnOnce(&mut Vec<Typedef>) -> Vec<TypedefArg>,
{
    let name = node.name();
    let index = out.len();
    out.push(Typedef {
        name: name.clone(),
        kind: kind.to_string(),
        args: Vec::new(),
    });
    let args = args(out);
    out[index].args = args;
    format!("${}", name)
}

impl TypedNode {
    pub fn docs(&self) -> Vec<Typedef> {
        let mut out = Vec::new();
        let expr = type_expr(self, &mut out);
        if expr != format!("${}", self.name()) {
            out.insert(
                0,
                Typedef {
                    name: self.name(),
                    kind: expr,
                    args: Vec::new(),
                },
            );
        }
        out
    }
}

impl TypedAst {
    pub fn docs(&self) -> Vec<Typedef> {
        self.skeleton().iter().flat_map(TypedNode::docs).collect()
    }

    /* Documentation of each entrypoint of a parameter type */
    pub fn entrypoint_docs(&self) -> Vec<EntrypointDoc> {
        self.entrypoint_nodes()
            .into_iter()
            .map(|(name, node)| EntrypointDoc {
                name,
                typedef: node.docs(),
            })
            .collect()
    }
}
