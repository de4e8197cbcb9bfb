/* Typed nodes: a Michelson type tree with value slots */

use micheline_types::{Literal, Node, TypePrim};
use num_bigint::BigInt;

use crate::ordered_map::OrderedMap;

/* Attributes shared by every typed node */
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMeta {
    /* Pre-order position in the type tree, stable across clones of a template */
    pub id: usize,
    /* Nesting level, only used for indentation */
    pub depth: usize,
    pub prim: TypePrim,
    /* Well-formed annotations as written on the type */
    pub annots: Vec<String>,
    pub field_name: Option<String>,
    pub type_name: Option<String>,
}

impl NodeMeta {
    /* Field name, then type name, then `@prim_id` */
    pub fn name(&self) -> String {
        self.field_name
            .clone()
            .or_else(|| self.type_name.clone())
            .unwrap_or_else(|| format!("@{}_{}", self.prim.name(), self.id))
    }

    /* True when the name came from an annotation */
    pub fn is_named(&self) -> bool {
        self.field_name.is_some() || self.type_name.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrSide {
    Left,
    Right,
}

/* How a settled pair value was written, so it can be emitted the same way */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombShape {
    /* `Pair a b` */
    #[default]
    Nested,
    /* `Pair a b c ...` with n arguments */
    Flat(usize),
    /* `{ a ; b ; c ... }` with n elements */
    Seq(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Unit,
    Never,
    Operation,
    Bool(Option<bool>),
    /* Every literal-carrying scalar; `NodeMeta::prim` tells which one */
    Scalar(Option<Literal>),
    Contract {
        param: Box<TypedNode>,
        value: Option<Literal>,
    },
    Pair {
        left: Box<TypedNode>,
        right: Box<TypedNode>,
        shape: CombShape,
    },
    Or {
        left: Box<TypedNode>,
        right: Box<TypedNode>,
        side: Option<OrSide>,
    },
    Option {
        inner: Box<TypedNode>,
        value: Option<Box<TypedNode>>,
    },
    List {
        elem: Box<TypedNode>,
        items: Vec<TypedNode>,
    },
    Set {
        elem: Box<TypedNode>,
        items: Vec<TypedNode>,
    },
    Map {
        key: Box<TypedNode>,
        value: Box<TypedNode>,
        data: OrderedMap,
    },
    BigMap {
        key: Box<TypedNode>,
        value: Box<TypedNode>,
        ptr: Option<i64>,
        data: OrderedMap,
    },
    Lambda {
        param: Box<TypedNode>,
        ret: Box<TypedNode>,
        code: Option<Node>,
    },
    /* Values settle into `paired`: pair (address %ticketer) (pair T (nat %amount)) */
    Ticket {
        elem: Box<TypedNode>,
        paired: Box<TypedNode>,
    },
    SaplingState {
        memo_size: BigInt,
        value: Option<Node>,
    },
    SaplingTransaction {
        memo_size: BigInt,
        value: Option<Node>,
    },
    Constant {
        hash: String,
        value: Option<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedNode {
    pub meta: NodeMeta,
    pub kind: NodeKind,
}

impl TypedNode {
    pub fn prim(&self) -> TypePrim {
        self.meta.prim
    }

    pub fn name(&self) -> String {
        self.meta.name()
    }

    pub fn id(&self) -> usize {
        self.meta.id
    }

    pub fn is_pair(&self) -> bool {
        matches!(self.kind, NodeKind::Pair { .. })
    }

    pub fn is_or(&self) -> bool {
        matches!(self.kind, NodeKind::Or { .. })
    }

    /* Unit and never leaves carry no data in forms and docs */
    pub fn is_unit(&self) -> bool {
        matches!(self.kind, NodeKind::Unit)
    }

    /* Type-level children in declaration order */
    pub fn type_children(&self) -> Vec<&TypedNode> {
        match &self.kind {
            NodeKind::Contract { param, .. } => vec![param.as_ref()],
            NodeKind::Pair { left, right, .. } | NodeKind::Or { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            NodeKind::Option { inner, .. } => vec![inner.as_ref()],
            NodeKind::List { elem, .. } | NodeKind::Set { elem, .. } => vec![elem.as_ref()],
            NodeKind::Map { key, value, .. } | NodeKind::BigMap { key, value, .. } => {
                vec![key.as_ref(), value.as_ref()]
            }
            NodeKind::Lambda { param, ret, .. } => vec![param.as_ref(), ret.as_ref()],
            NodeKind::Ticket { elem, .. } => vec![elem.as_ref()],
            _ => Vec::new(),
        }
    }

    /* Pair members with unnamed nested pairs spliced in */
    pub fn flatten_pair(&self) -> Vec<&TypedNode> {
        let mut out = Vec::new();
        if let NodeKind::Pair { left, right, .. } = &self.kind {
            for child in [left.as_ref(), right.as_ref()] {
                if child.is_pair() && !child.meta.is_named() {
                    out.extend(child.flatten_pair());
                } else {
                    out.push(child);
                }
            }
        }
        out
    }

    /* Or leaves with unnamed nested ors spliced in, each with its Left/Right path */
    pub fn flatten_or(&self) -> Vec<(Vec<OrSide>, &TypedNode)> {
        let mut out = Vec::new();
        if let NodeKind::Or { left, right, .. } = &self.kind {
            for (side, child) in [(OrSide::Left, left.as_ref()), (OrSide::Right, right.as_ref())] {
                if child.is_or() && !child.meta.is_named() {
                    for (mut path, leaf) in child.flatten_or() {
                        path.insert(0, side);
                        out.push((path, leaf));
                    }
                } else {
                    out.push((vec![side], child));
                }
            }
        }
        out
    }

    /* Settled leaf of an or, descending through unnamed ors, with its path */
    pub fn active_or_leaf(&self) -> Option<(Vec<OrSide>, &TypedNode)> {
        let NodeKind::Or { left, right, side } = &self.kind else {
            return None;
        };
        let (side, child) = match side {
            Some(OrSide::Left) => (OrSide::Left, left.as_ref()),
            Some(OrSide::Right) => (OrSide::Right, right.as_ref()),
            None => return None,
        };
        if child.is_or() && !child.meta.is_named() {
            let (mut path, leaf) = child.active_or_leaf()?;
            path.insert(0, side);
            Some((path, leaf))
        } else {
            Some((vec![side], child))
        }
    }

    /* Pre-order search by name over the type tree */
    pub fn find_by_name(&self, name: &str) -> Option<&TypedNode> {
        if self.name() == name {
            return Some(self);
        }
        self.type_children()
            .into_iter()
            .find_map(|child| child.find_by_name(name))
    }
}
