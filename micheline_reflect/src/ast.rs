/* Typed AST: roots of a type tree plus the settled value */

use std::cmp::Ordering;
use std::fmt;

use micheline_forge::{forge_nodes, pack, unforge, unpack};
use micheline_types::{parse_untyped, untyped_to_json, Node, TypePrim};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::errors::{AstError, AstResult};
use crate::formatter::to_michelson;
use crate::node::{NodeKind, OrSide, TypedNode};
use crate::typing::IdCounter;
use crate::untyped::ValueForm;

#[derive(Debug, Clone, PartialEq)]
pub struct TypedAst {
    /* Current value-carrying roots */
    nodes: Vec<TypedNode>,
    /* Unsettled type template every settle starts from */
    skeleton: Vec<TypedNode>,
    settled: bool,
}

impl TypedAst {
    pub fn from_type_nodes(types: &[Node]) -> AstResult<Self> {
        let mut ids = IdCounter::new();
        let skeleton = types
            .iter()
            .map(|node| TypedNode::from_type_with(node, &mut ids, 0))
            .collect::<AstResult<Vec<_>>>()?;
        Ok(Self {
            nodes: skeleton.clone(),
            skeleton,
            settled: false,
        })
    }

    pub fn from_type_json(text: &str) -> AstResult<Self> {
        Self::from_type_nodes(&parse_untyped(text)?)
    }

    pub fn from_type_value(value: &JsonValue) -> AstResult<Self> {
        Self::from_type_nodes(&micheline_types::parse_untyped_value(value)?)
    }

    /* Types `type_json` and settles it with `value_json` */
    pub fn settled_from_json(type_json: &str, value_json: &str) -> AstResult<Self> {
        let mut ast = Self::from_type_json(type_json)?;
        ast.settle_json(value_json)?;
        Ok(ast)
    }

    pub fn nodes(&self) -> &[TypedNode] {
        &self.nodes
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    fn require_settled(&self) -> AstResult<()> {
        if self.settled {
            Ok(())
        } else {
            Err(AstError::TreeIsNotSettled)
        }
    }

    /* Settles a fresh copy of the type template; on error nothing changes */
    pub fn settle(&mut self, values: &[Node]) -> AstResult<()> {
        let mut roots = self.skeleton.clone();
        match (roots.as_mut_slice(), values) {
            ([root], [value]) if takes_directly(root, value) => {
                root.parse_value(value)?
            }
            ([root], _) if root.is_pair() && values.len() > 1 => {
                debug!(count = values.len(), "value list absorbed as right comb");
                root.parse_value(&Node::Seq(values.to_vec()))?
            }
            ([root], _) if absorbs_sequence(root) => {
                debug!(
                    count = values.len(),
                    prim = %root.prim(),
                    "value list absorbed as a sequence"
                );
                root.parse_value(&Node::Seq(values.to_vec()))?
            }
            (roots, values) if roots.len() == values.len() => {
                for (root, value) in roots.iter_mut().zip(values) {
                    root.parse_value(value)?;
                }
            }
            (roots, values) => {
                return Err(AstError::TreesAreDifferent(format!(
                    "{} type root(s), {} value(s)",
                    roots.len(),
                    values.len()
                )))
            }
        }
        self.nodes = roots;
        self.settled = true;
        Ok(())
    }

    pub fn settle_json(&mut self, text: &str) -> AstResult<()> {
        self.settle(&parse_untyped(text)?)
    }

    pub fn settle_value(&mut self, value: &JsonValue) -> AstResult<()> {
        self.settle(&micheline_types::parse_untyped_value(value)?)
    }

    /* Settles from forged bytes */
    pub fn settle_bytes(&mut self, data: &[u8]) -> AstResult<()> {
        self.settle(&unforge(data)?)
    }

    /* Settles from PACKed bytes */
    pub fn settle_packed(&mut self, data: &[u8]) -> AstResult<()> {
        self.settle(&[unpack(data)?])
    }

    pub fn to_untyped(&self, form: ValueForm) -> AstResult<Vec<Node>> {
        self.require_settled()?;
        self.nodes.iter().map(|node| node.to_untyped(form)).collect()
    }

    pub fn to_json(&self, form: ValueForm) -> AstResult<JsonValue> {
        Ok(untyped_to_json(&self.to_untyped(form)?))
    }

    /* Binary encoding of the value with optimized literals */
    pub fn forge(&self) -> AstResult<Vec<u8>> {
        Ok(forge_nodes(&self.to_untyped(ValueForm::Optimized)?)?)
    }

    pub fn pack(&self) -> AstResult<Vec<u8>> {
        match self.to_untyped(ValueForm::Optimized)?.as_slice() {
            [single] => Ok(pack(single)?),
            many => Ok(pack(&Node::Seq(many.to_vec()))?),
        }
    }

    /* Type trees of the roots with their annotations */
    pub fn type_nodes(&self) -> Vec<Node> {
        self.skeleton.iter().map(TypedNode::type_node).collect()
    }

    pub fn type_json(&self) -> JsonValue {
        untyped_to_json(&self.type_nodes())
    }

    pub fn equal_type(&self, other: &TypedAst) -> bool {
        self.skeleton.len() == other.skeleton.len()
            && self
                .skeleton
                .iter()
                .zip(&other.skeleton)
                .all(|(a, b)| a.equal_type(b))
    }

    pub fn compare(&self, other: &TypedAst) -> AstResult<Ordering> {
        self.require_settled()?;
        other.require_settled()?;
        if self.nodes.len() != other.nodes.len() {
            return Err(AstError::TreesAreDifferent(format!(
                "{} root(s) vs {} root(s)",
                self.nodes.len(),
                other.nodes.len()
            )));
        }
        for (a, b) in self.nodes.iter().zip(&other.nodes) {
            match a.compare(b)? {
                Ordering::Equal => continue,
                ordering => return Ok(ordering),
            }
        }
        Ok(Ordering::Equal)
    }

    /* Searches the type template, so unsettled branches are found too */
    pub fn find_by_name(&self, name: &str) -> Option<&TypedNode> {
        self.skeleton.iter().find_map(|node| node.find_by_name(name))
    }

    pub(crate) fn skeleton(&self) -> &[TypedNode] {
        &self.skeleton
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TypedNode] {
        &mut self.nodes
    }
}

/* Collections and lambdas take a whole value list as their body */
fn absorbs_sequence(node: &TypedNode) -> bool {
    matches!(
        node.prim(),
        TypePrim::List | TypePrim::Set | TypePrim::Map | TypePrim::BigMap | TypePrim::Lambda
    )
}

fn takes_directly(root: &TypedNode, value: &Node) -> bool {
    if !absorbs_sequence(root) {
        return true;
    }
    match value {
        Node::Seq(_) => true,
        Node::Int(_) => root.prim() == TypePrim::BigMap,
        Node::Prim(p) => p.prim == micheline_types::prim::LAMBDA_REC,
        _ => false,
    }
}

impl fmt::Display for TypedAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write_tree(f, node, node.meta.depth)?;
        }
        Ok(())
    }
}

fn write_tree(f: &mut fmt::Formatter<'_>, node: &TypedNode, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    write!(f, "{}[{}] {} {}", indent, node.id(), node.name(), node.prim())?;
    for annot in &node.meta.annots {
        write!(f, " {}", annot)?;
    }
    match &node.kind {
        NodeKind::Bool(Some(value)) => writeln!(f, " = {}", value)?,
        NodeKind::Scalar(Some(literal)) | NodeKind::Contract {
            value: Some(literal),
            ..
        } => writeln!(f, " = {}", literal)?,
        NodeKind::Or {
            side: Some(side), ..
        } => writeln!(
            f,
            " = {}",
            if *side == OrSide::Left { "Left" } else { "Right" }
        )?,
        NodeKind::Option { value: None, .. } => writeln!(f, " = None")?,
        NodeKind::BigMap {
            ptr: Some(ptr),
            data,
            ..
        } if data.is_empty() => writeln!(f, " = ptr {}", ptr)?,
        NodeKind::Lambda {
            code: Some(code), ..
        } => writeln!(f, " = {}", to_michelson(code))?,
        NodeKind::SaplingState {
            value: Some(value), ..
        }
        | NodeKind::SaplingTransaction {
            value: Some(value), ..
        }
        | NodeKind::Constant {
            value: Some(value), ..
        } => writeln!(f, " = {}", to_michelson(value))?,
        _ => writeln!(f)?,
    }

    match &node.kind {
        NodeKind::Pair { left, right, .. } => {
            write_tree(f, left, depth + 1)?;
            write_tree(f, right, depth + 1)?;
        }
        NodeKind::Or {
            left, right, side, ..
        } => match side {
            Some(OrSide::Left) => write_tree(f, left, depth + 1)?,
            Some(OrSide::Right) => write_tree(f, right, depth + 1)?,
            None => {
                write_tree(f, left, depth + 1)?;
                write_tree(f, right, depth + 1)?;
            }
        },
        NodeKind::Option { inner, value } => {
            write_tree(f, value.as_deref().unwrap_or(inner.as_ref()), depth + 1)?
        }
        NodeKind::List { elem, items } | NodeKind::Set { elem, items } => {
            if items.is_empty() {
                write_tree(f, elem, depth + 1)?;
            }
            for item in items {
                write_tree(f, item, depth + 1)?;
            }
        }
        NodeKind::Map {
            key, value, data, ..
        }
        | NodeKind::BigMap {
            key, value, data, ..
        } => {
            if data.is_empty() {
                write_tree(f, key, depth + 1)?;
                write_tree(f, value, depth + 1)?;
            }
            for (k, v) in data.iter() {
                write_tree(f, k, depth + 1)?;
                write_tree(f, v, depth + 2)?;
            }
        }
        NodeKind::Contract { param, .. } => write_tree(f, param, depth + 1)?,
        NodeKind::Lambda { param, ret, .. } => {
            write_tree(f, param, depth + 1)?;
            write_tree(f, ret, depth + 1)?;
        }
        NodeKind::Ticket { paired, .. } => write_tree(f, paired, depth + 1)?,
        _ => {}
    }
    Ok(())
}
