/* Miguel trees: presentation of settled values and their differences */

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ast::TypedAst;
use crate::errors::{AstError, AstResult};
use crate::formatter::to_michelson;
use crate::node::{NodeKind, TypedNode};
use crate::ordered_map::OrderedMap;
use crate::scalar;
use crate::untyped::ValueForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MiguelNode {
    pub prim: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_type: Option<DiffType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MiguelNode>,
}

impl MiguelNode {
    fn new(node: &TypedNode, kind: &str) -> Self {
        Self {
            prim: node.prim().name().to_string(),
            kind: kind.to_string(),
            name: Some(node.name()),
            ..Default::default()
        }
    }

    fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /* Marks this node and every descendant */
    pub fn mark(mut self, diff: DiffType) -> Self {
        self.diff_type = Some(diff);
        self.children = self.children.into_iter().map(|c| c.mark(diff)).collect();
        self
    }

    pub fn has_changes(&self) -> bool {
        self.diff_type.is_some() || self.children.iter().any(MiguelNode::has_changes)
    }
}

/* Display name of a map key or set element */
fn key_name(key: &TypedNode) -> AstResult<String> {
    match &key.kind {
        NodeKind::Scalar(Some(literal)) => scalar::display(key.prim(), literal),
        NodeKind::Bool(Some(value)) => Ok(value.to_string()),
        _ => Ok(to_michelson(&key.to_untyped(ValueForm::Readable)?)),
    }
}

/* Scalar-like value shown in the `value` field, if the node has one */
fn display_value(node: &TypedNode) -> AstResult<Option<JsonValue>> {
    Ok(match &node.kind {
        NodeKind::Bool(Some(value)) => Some(JsonValue::Bool(*value)),
        NodeKind::Scalar(Some(literal)) | NodeKind::Contract {
            value: Some(literal),
            ..
        } => Some(JsonValue::String(scalar::display(node.prim(), literal)?)),
        NodeKind::Lambda {
            code: Some(code), ..
        } => Some(JsonValue::String(to_michelson(code))),
        NodeKind::SaplingState {
            value: Some(value), ..
        }
        | NodeKind::SaplingTransaction {
            value: Some(value), ..
        }
        | NodeKind::Constant {
            value: Some(value), ..
        } => Some(JsonValue::String(to_michelson(value))),
        NodeKind::Bool(None)
        | NodeKind::Scalar(None)
        | NodeKind::Contract { value: None, .. }
        | NodeKind::Lambda { code: None, .. } => return Err(AstError::TreeIsNotSettled),
        _ => None,
    })
}

fn pair_kind(children: &[&TypedNode]) -> &'static str {
    if children.iter().any(|c| c.meta.is_named()) {
        "namedtuple"
    } else {
        "tuple"
    }
}

impl TypedNode {
    pub fn to_miguel(&self) -> AstResult<MiguelNode> {
        let prim = self.prim().name();
        Ok(match &self.kind {
            NodeKind::Unit => MiguelNode::new(self, prim),
            NodeKind::Never | NodeKind::Operation => {
                return Err(AstError::Unsupported {
                    prim: prim.to_string(),
                    op: "to_miguel",
                })
            }
            NodeKind::Pair { .. } => {
                let members = self.flatten_pair();
                let mut node = MiguelNode::new(self, pair_kind(&members));
                node.children = members
                    .iter()
                    .map(|m| m.to_miguel())
                    .collect::<AstResult<_>>()?;
                node
            }
            NodeKind::Or { .. } => {
                let (_, leaf) = self.active_or_leaf().ok_or(AstError::TreeIsNotSettled)?;
                let mut node = MiguelNode::new(self, "or");
                node.children = vec![leaf.to_miguel()?];
                node
            }
            NodeKind::Option { value, .. } => {
                let mut node = MiguelNode::new(self, "option");
                match value {
                    Some(inner) => node.children = vec![inner.to_miguel()?],
                    None => node.value = Some(JsonValue::String("None".to_string())),
                }
                node
            }
            NodeKind::List { items, .. } => {
                let mut node = MiguelNode::new(self, "list");
                node.children = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Ok(item.to_miguel()?.with_name(i.to_string())))
                    .collect::<AstResult<_>>()?;
                node
            }
            NodeKind::Set { items, .. } => {
                let mut node = MiguelNode::new(self, "set");
                node.children = items
                    .iter()
                    .map(|item| Ok(item.to_miguel()?.with_name(key_name(item)?)))
                    .collect::<AstResult<_>>()?;
                node
            }
            NodeKind::Map { data, .. } => {
                let mut node = MiguelNode::new(self, "map");
                node.children = map_children(data)?;
                node
            }
            NodeKind::BigMap { ptr, data, .. } => {
                let mut node = MiguelNode::new(self, "big_map");
                if let (Some(ptr), true) = (ptr, data.is_empty()) {
                    node.value = Some(JsonValue::String(ptr.to_string()));
                }
                node.children = map_children(data)?;
                node
            }
            NodeKind::Ticket { paired, .. } => {
                let mut node = MiguelNode::new(self, "ticket");
                node.children = paired.to_miguel()?.children;
                node
            }
            _ => {
                let mut node = MiguelNode::new(self, prim);
                node.value = display_value(self)?;
                node
            }
        })
    }

    /* Presentation of `self` with changes relative to `previous` marked.
     * Without a previous value everything is created. */
    pub fn diff(&self, previous: Option<&TypedNode>) -> AstResult<MiguelNode> {
        let Some(previous) = previous else {
            return Ok(self.to_miguel()?.mark(DiffType::Create));
        };
        if self.prim() != previous.prim() {
            return Err(AstError::not_comparable(
                self.prim().name(),
                previous.prim().name(),
            ));
        }

        match (&self.kind, &previous.kind) {
            (NodeKind::Pair { .. }, NodeKind::Pair { .. }) => {
                let (mine, theirs) = (self.flatten_pair(), previous.flatten_pair());
                if mine.len() != theirs.len() {
                    return Err(AstError::TreesAreDifferent(format!(
                        "pair of {} vs {} members",
                        mine.len(),
                        theirs.len()
                    )));
                }
                let mut node = MiguelNode::new(self, pair_kind(&mine));
                node.children = mine
                    .iter()
                    .zip(theirs.iter())
                    .map(|(a, b)| a.diff(Some(b)))
                    .collect::<AstResult<_>>()?;
                Ok(node)
            }
            (NodeKind::Or { .. }, NodeKind::Or { .. }) => {
                let (path, leaf) = self.active_or_leaf().ok_or(AstError::TreeIsNotSettled)?;
                let (old_path, old_leaf) =
                    previous.active_or_leaf().ok_or(AstError::TreeIsNotSettled)?;
                let mut node = MiguelNode::new(self, "or");
                node.children = if path == old_path {
                    vec![leaf.diff(Some(old_leaf))?]
                } else {
                    vec![
                        leaf.to_miguel()?.mark(DiffType::Create),
                        old_leaf.to_miguel()?.mark(DiffType::Delete),
                    ]
                };
                Ok(node)
            }
            (NodeKind::Option { value, .. }, NodeKind::Option { value: old, .. }) => {
                match (value, old) {
                    (Some(a), Some(b)) => {
                        let mut node = MiguelNode::new(self, "option");
                        node.children = vec![a.diff(Some(b))?];
                        Ok(node)
                    }
                    (Some(a), None) => {
                        let mut node = MiguelNode::new(self, "option");
                        node.children = vec![a.to_miguel()?.mark(DiffType::Create)];
                        Ok(node)
                    }
                    (None, Some(b)) => {
                        let mut node = self.to_miguel()?;
                        node.children = vec![b.to_miguel()?.mark(DiffType::Delete)];
                        Ok(node)
                    }
                    (None, None) => self.to_miguel(),
                }
            }
            (NodeKind::List { items, .. }, NodeKind::List { items: old, .. }) => {
                let mut node = MiguelNode::new(self, "list");
                for i in 0..items.len().max(old.len()) {
                    let child = match (items.get(i), old.get(i)) {
                        (Some(a), b) => a.diff(b)?,
                        (None, Some(b)) => b.to_miguel()?.mark(DiffType::Delete),
                        (None, None) => continue,
                    };
                    node.children.push(child.with_name(i.to_string()));
                }
                Ok(node)
            }
            (NodeKind::Set { items, .. }, NodeKind::Set { items: old, .. }) => {
                let mut node = MiguelNode::new(self, "set");
                node.children = merge_sorted(items, old)?;
                Ok(node)
            }
            (NodeKind::Map { data, .. }, NodeKind::Map { data: old, .. }) => {
                let mut node = MiguelNode::new(self, "map");
                node.children = diff_maps(data, old)?;
                Ok(node)
            }
            (
                NodeKind::BigMap { ptr, data, .. },
                NodeKind::BigMap {
                    ptr: old_ptr,
                    data: old,
                    ..
                },
            ) => {
                let mut node = self.to_miguel()?;
                node.children = diff_maps(data, old)?;
                if ptr != old_ptr && node.value.is_some() {
                    node.diff_type = Some(DiffType::Update);
                    node.from = old_ptr.map(|p| JsonValue::String(p.to_string()));
                }
                Ok(node)
            }
            (NodeKind::Ticket { paired, .. }, NodeKind::Ticket { paired: old, .. }) => {
                let mut node = MiguelNode::new(self, "ticket");
                node.children = paired.diff(Some(old))?.children;
                Ok(node)
            }
            _ => {
                let mut node = self.to_miguel()?;
                let old_value = display_value(previous)?;
                if node.value != old_value {
                    node.diff_type = Some(DiffType::Update);
                    node.from = old_value;
                }
                Ok(node)
            }
        }
    }
}

fn map_children(data: &OrderedMap) -> AstResult<Vec<MiguelNode>> {
    data.iter()
        .map(|(k, v)| Ok(v.to_miguel()?.with_name(key_name(k)?)))
        .collect()
}

fn diff_maps(data: &OrderedMap, old: &OrderedMap) -> AstResult<Vec<MiguelNode>> {
    let mut children = Vec::new();
    for (key, value) in data.iter() {
        let child = value.diff(old.get(key)?)?;
        children.push(child.with_name(key_name(key)?));
    }
    for (key, value) in old.iter() {
        if !data.contains_key(key)? {
            children.push(
                value
                    .to_miguel()?
                    .mark(DiffType::Delete)
                    .with_name(key_name(key)?),
            );
        }
    }
    Ok(children)
}

/* Both inputs are sorted; equal elements are unchanged */
fn merge_sorted(items: &[TypedNode], old: &[TypedNode]) -> AstResult<Vec<MiguelNode>> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < items.len() || j < old.len() {
        let ordering = match (items.get(i), old.get(j)) {
            (Some(a), Some(b)) => a.compare(b)?,
            (Some(_), None) => Ordering::Less,
            _ => Ordering::Greater,
        };
        match ordering {
            Ordering::Equal => {
                out.push(items[i].to_miguel()?.with_name(key_name(&items[i])?));
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(
                    items[i]
                        .to_miguel()?
                        .mark(DiffType::Create)
                        .with_name(key_name(&items[i])?),
                );
                i += 1;
            }
            Ordering::Greater => {
                out.push(
                    old[j]
                        .to_miguel()?
                        .mark(DiffType::Delete)
                        .with_name(key_name(&old[j])?),
                );
                j += 1;
            }
        }
    }
    Ok(out)
}

impl TypedAst {
    pub fn to_miguel(&self) -> AstResult<Vec<MiguelNode>> {
        if !self.is_settled() {
            return Err(AstError::TreeIsNotSettled);
        }
        self.nodes().iter().map(TypedNode::to_miguel).collect()
    }

    /* Differences of this value against `previous`; `None` marks everything created */
    pub fn diff(&self, previous: Option<&TypedAst>) -> AstResult<Vec<MiguelNode>> {
        if !self.is_settled() || previous.is_some_and(|p| !p.is_settled()) {
            return Err(AstError::TreeIsNotSettled);
        }
        match previous {
            None => self
                .nodes()
                .iter()
                .map(|node| node.diff(None))
                .collect(),
            Some(previous) => {
                if self.nodes().len() != previous.nodes().len() {
                    return Err(AstError::TreesAreDifferent(format!(
                        "{} root(s) vs {} root(s)",
                        self.nodes().len(),
                        previous.nodes().len()
                    )));
                }
                self.nodes()
                    .iter()
                    .zip(previous.nodes())
                    .map(|(a, b)| a.diff(Some(b)))
                    .collect()
            }
        }
    }
}
