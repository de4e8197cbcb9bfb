/* Projection of typed nodes back to untyped Micheline */

use micheline_types::{prim as kw, Literal, Node};
use serde::{Deserialize, Serialize};

use crate::errors::{AstError, AstResult};
use crate::node::{CombShape, NodeKind, OrSide, TypedNode};
use crate::scalar;

/* Literal form used when emitting values */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueForm {
    /* Literals and comb shapes exactly as settled */
    #[default]
    Preserve,
    /* Binary literal forms, comb shapes kept */
    Optimized,
    /* Base58 and RFC 3339 text, pairs as nested binary `Pair` */
    Readable,
}

fn literal_node(prim: micheline_types::TypePrim, literal: &Literal, form: ValueForm) -> AstResult<Node> {
    let literal = match form {
        ValueForm::Preserve => literal.clone(),
        ValueForm::Optimized => scalar::optimize(prim, literal)?,
        ValueForm::Readable => scalar::readable(prim, literal)?,
    };
    Ok(literal.into())
}

impl TypedNode {
    /* Settled value as an untyped tree */
    pub fn to_untyped(&self, form: ValueForm) -> AstResult<Node> {
        let prim = self.meta.prim;
        Ok(match &self.kind {
            NodeKind::Unit => Node::prim(kw::UNIT),
            NodeKind::Never | NodeKind::Operation => {
                return Err(AstError::Unsupported {
                    prim: prim.name().to_string(),
                    op: "to_untyped",
                })
            }
            NodeKind::Bool(value) => match value {
                Some(true) => Node::prim(kw::TRUE),
                Some(false) => Node::prim(kw::FALSE),
                None => return Err(AstError::TreeIsNotSettled),
            },
            NodeKind::Scalar(value) | NodeKind::Contract { value, .. } => {
                let literal = value.as_ref().ok_or(AstError::TreeIsNotSettled)?;
                literal_node(prim, literal, form)?
            }
            NodeKind::Pair {
                left, right, shape, ..
            } => match (form, shape) {
                (ValueForm::Readable, _) | (_, CombShape::Nested) => Node::prim_with_args(
                    kw::PAIR,
                    vec![left.to_untyped(form)?, right.to_untyped(form)?],
                ),
                (_, CombShape::Flat(n)) => Node::prim_with_args(kw::PAIR, self.comb_values(*n, form)?),
                (_, CombShape::Seq(n)) => Node::Seq(self.comb_values(*n, form)?),
            },
            NodeKind::Or { left, right, side } => match side {
                Some(OrSide::Left) => Node::prim_with_args(kw::LEFT, vec![left.to_untyped(form)?]),
                Some(OrSide::Right) => {
                    Node::prim_with_args(kw::RIGHT, vec![right.to_untyped(form)?])
                }
                None => return Err(AstError::TreeIsNotSettled),
            },
            NodeKind::Option { value, .. } => match value {
                Some(inner) => Node::prim_with_args(kw::SOME, vec![inner.to_untyped(form)?]),
                None => Node::prim(kw::NONE),
            },
            NodeKind::List { items, .. } | NodeKind::Set { items, .. } => Node::Seq(
                items
                    .iter()
                    .map(|item| item.to_untyped(form))
                    .collect::<AstResult<Vec<_>>>()?,
            ),
            NodeKind::Map { data, .. } => elts(data, form)?,
            NodeKind::BigMap { ptr, data, .. } => match ptr {
                Some(id) if data.is_empty() => Node::int(*id),
                _ => elts(data, form)?,
            },
            NodeKind::Lambda { code, .. } => code.clone().ok_or(AstError::TreeIsNotSettled)?,
            NodeKind::Ticket { paired, .. } => paired.to_untyped(form)?,
            NodeKind::SaplingState { value, .. }
            | NodeKind::SaplingTransaction { value, .. }
            | NodeKind::Constant { value, .. } => {
                value.clone().ok_or(AstError::TreeIsNotSettled)?
            }
        })
    }

    /* First `count` members of a right comb */
    fn comb_values(&self, count: usize, form: ValueForm) -> AstResult<Vec<Node>> {
        match &self.kind {
            NodeKind::Pair { left, right, .. } if count > 2 => {
                let mut out = vec![left.to_untyped(form)?];
                out.extend(right.comb_values(count - 1, form)?);
                Ok(out)
            }
            NodeKind::Pair { left, right, .. } if count == 2 => {
                Ok(vec![left.to_untyped(form)?, right.to_untyped(form)?])
            }
            _ => Ok(vec![self.to_untyped(form)?]),
        }
    }

    /* Type tree with annotations; n-ary pairs come back right-nested */
    pub fn type_node(&self) -> Node {
        let args = match &self.kind {
            NodeKind::SaplingState { memo_size, .. }
            | NodeKind::SaplingTransaction { memo_size, .. } => vec![Node::Int(memo_size.clone())],
            NodeKind::Constant { hash, .. } => vec![Node::string(hash.clone())],
            _ => self
                .type_children()
                .into_iter()
                .map(TypedNode::type_node)
                .collect(),
        };
        Node::prim_full(self.meta.prim.name(), args, self.meta.annots.clone())
    }
}

fn elts(data: &crate::ordered_map::OrderedMap, form: ValueForm) -> AstResult<Node> {
    data.iter()
        .map(|(k, v)| {
            Ok(Node::prim_with_args(
                kw::ELT,
                vec![k.to_untyped(form)?, v.to_untyped(form)?],
            ))
        })
        .collect::<AstResult<Vec<_>>>()
        .map(Node::Seq)
}
