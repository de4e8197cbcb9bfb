/* Settling: binding an untyped value tree to a typed node */

use micheline_types::{prim as kw, Node};
use num_traits::ToPrimitive;

use crate::errors::{AstError, AstResult};
use crate::node::{CombShape, NodeKind, OrSide, TypedNode};
use crate::ordered_map::OrderedMap;
use crate::scalar;

fn expect_args<'a>(value: &'a Node, prim: &str, count: usize) -> AstResult<&'a [Node]> {
    match value.as_prim() {
        Some(p) if p.prim == prim => {
            if p.args.len() == count {
                Ok(&p.args)
            } else {
                Err(AstError::TreesAreDifferent(format!(
                    "{} expects {} argument(s), got {}",
                    prim,
                    count,
                    p.args.len()
                )))
            }
        }
        _ => Err(AstError::invalid_prim(prim, value.describe())),
    }
}

fn expect_seq<'a>(value: &'a Node, prim: &str) -> AstResult<&'a [Node]> {
    value
        .as_seq()
        .ok_or_else(|| AstError::invalid_prim(format!("sequence of {}", prim), value.describe()))
}

/* Remaining members of a comb, rebuilt in the form they were written */
fn comb_rest(items: &[Node], as_seq: bool) -> Node {
    match items {
        [single] => single.clone(),
        many if as_seq => Node::Seq(many.to_vec()),
        many => Node::prim_with_args(kw::PAIR, many.to_vec()),
    }
}

impl TypedNode {
    /* Settles this node from `value`, replacing whatever it held */
    pub fn parse_value(&mut self, value: &Node) -> AstResult<()> {
        let prim = self.meta.prim;
        match &mut self.kind {
            NodeKind::Unit => {
                expect_args(value, kw::UNIT, 0)?;
            }
            NodeKind::Never => {
                return Err(AstError::invalid_prim("no value for never", value.describe()));
            }
            NodeKind::Operation => {
                return Err(AstError::Unsupported {
                    prim: prim.name().to_string(),
                    op: "settle",
                });
            }
            NodeKind::Bool(slot) => {
                *slot = Some(match value.prim_name() {
                    Some(kw::TRUE) => true,
                    Some(kw::FALSE) => false,
                    _ => return Err(AstError::invalid_prim("True or False", value.describe())),
                });
            }
            NodeKind::Scalar(slot) => {
                *slot = Some(scalar::accept_literal(prim, value)?);
            }
            NodeKind::Contract { value: slot, .. } => {
                *slot = Some(scalar::accept_literal(prim, value)?);
            }
            NodeKind::Pair { left, right, shape } => {
                let (members, as_seq) = match value {
                    Node::Seq(items) => (items.as_slice(), true),
                    Node::Prim(p) if p.prim == kw::PAIR => (p.args.as_slice(), false),
                    other => return Err(AstError::invalid_prim(kw::PAIR, other.describe())),
                };
                if members.len() < 2 {
                    return Err(AstError::TreesAreDifferent(format!(
                        "pair needs at least 2 members, got {}",
                        members.len()
                    )));
                }
                if members.len() > 2 && !right.is_pair() {
                    return Err(AstError::TreesAreDifferent(format!(
                        "pair holds 2 members, got {}",
                        members.len()
                    )));
                }
                left.parse_value(&members[0])?;
                right.parse_value(&comb_rest(&members[1..], as_seq))?;
                *shape = match (as_seq, members.len()) {
                    (true, n) => CombShape::Seq(n),
                    (false, 2) => CombShape::Nested,
                    (false, n) => CombShape::Flat(n),
                };
            }
            NodeKind::Or { left, right, side } => match value.prim_name() {
                Some(kw::LEFT) => {
                    left.parse_value(&expect_args(value, kw::LEFT, 1)?[0])?;
                    *side = Some(OrSide::Left);
                }
                Some(kw::RIGHT) => {
                    right.parse_value(&expect_args(value, kw::RIGHT, 1)?[0])?;
                    *side = Some(OrSide::Right);
                }
                _ => return Err(AstError::invalid_prim("Left or Right", value.describe())),
            },
            NodeKind::Option { inner, value: slot } => match value.prim_name() {
                Some(kw::NONE) => {
                    expect_args(value, kw::NONE, 0)?;
                    *slot = None;
                }
                Some(kw::SOME) => {
                    let mut settled = inner.clone();
                    settled.parse_value(&expect_args(value, kw::SOME, 1)?[0])?;
                    *slot = Some(settled);
                }
                _ => return Err(AstError::invalid_prim("None or Some", value.describe())),
            },
            NodeKind::List { elem, items } => {
                let mut parsed = Vec::new();
                for item in expect_seq(value, "list items")? {
                    let mut node = elem.as_ref().clone();
                    node.parse_value(item)?;
                    parsed.push(node);
                }
                *items = parsed;
            }
            NodeKind::Set { elem, items } => {
                let mut parsed: Vec<TypedNode> = Vec::new();
                for item in expect_seq(value, "set items")? {
                    let mut node = elem.as_ref().clone();
                    node.parse_value(item)?;
                    /* sorted insert, equal elements collapse */
                    let mut position = parsed.len();
                    let mut duplicate = false;
                    for (index, existing) in parsed.iter().enumerate() {
                        match existing.compare(&node)? {
                            std::cmp::Ordering::Less => continue,
                            std::cmp::Ordering::Equal => duplicate = true,
                            std::cmp::Ordering::Greater => {}
                        }
                        position = index;
                        break;
                    }
                    if !duplicate {
                        parsed.insert(position, node);
                    }
                }
                *items = parsed;
            }
            NodeKind::Map { key, value: val, data } => {
                *data = parse_entries(key, val, value)?;
            }
            NodeKind::BigMap {
                key,
                value: val,
                ptr,
                data,
            } => match value {
                Node::Int(id) => {
                    let id = id
                        .to_i64()
                        .ok_or_else(|| AstError::invalid_prim("big_map pointer", value.describe()))?;
                    *ptr = Some(id);
                    *data = OrderedMap::new();
                }
                _ => {
                    *ptr = None;
                    *data = parse_entries(key, val, value)?;
                }
            },
            NodeKind::Lambda { code, .. } => match value {
                Node::Seq(_) => *code = Some(value.clone()),
                Node::Prim(p) if p.prim == kw::LAMBDA_REC => *code = Some(value.clone()),
                other => return Err(AstError::invalid_prim("lambda code", other.describe())),
            },
            NodeKind::Ticket { paired, .. } => paired.parse_value(value)?,
            NodeKind::SaplingState { value: slot, .. } => match value {
                Node::Int(_) | Node::Seq(_) => *slot = Some(value.clone()),
                other => return Err(AstError::invalid_prim("sapling state", other.describe())),
            },
            NodeKind::SaplingTransaction { value: slot, .. } => {
                scalar::accept_literal(prim, value)?;
                *slot = Some(value.clone());
            }
            NodeKind::Constant { value: slot, .. } => *slot = Some(value.clone()),
        }
        Ok(())
    }
}

fn parse_entries(key: &TypedNode, value: &TypedNode, node: &Node) -> AstResult<OrderedMap> {
    let mut data = OrderedMap::new();
    for elt in expect_seq(node, "Elt")? {
        let args = expect_args(elt, kw::ELT, 2)?;
        let mut k = key.clone();
        k.parse_value(&args[0])?;
        let mut v = value.clone();
        v.parse_value(&args[1])?;
        data.add(k, v)?;
    }
    Ok(data)
}
