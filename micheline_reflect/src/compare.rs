/* Structural ordering of settled values and equality of types */

use std::cmp::Ordering;

use crate::errors::{AstError, AstResult};
use crate::node::{NodeKind, OrSide, TypedNode};
use crate::scalar;

impl TypedNode {
    /* Total order over comparable values of the same type */
    pub fn compare(&self, other: &TypedNode) -> AstResult<Ordering> {
        if self.meta.prim != other.meta.prim {
            return Err(AstError::not_comparable(
                self.meta.prim.name(),
                other.meta.prim.name(),
            ));
        }
        match (&self.kind, &other.kind) {
            (NodeKind::Unit, NodeKind::Unit) => Ok(Ordering::Equal),
            (NodeKind::Bool(a), NodeKind::Bool(b)) => match (a, b) {
                (Some(a), Some(b)) => Ok(a.cmp(b)),
                _ => Err(AstError::TreeIsNotSettled),
            },
            (NodeKind::Scalar(a), NodeKind::Scalar(b)) => match (a, b) {
                (Some(a), Some(b)) => scalar::compare_literals(self.meta.prim, a, b),
                _ => Err(AstError::TreeIsNotSettled),
            },
            (NodeKind::Contract { value: a, .. }, NodeKind::Contract { value: b, .. }) => {
                match (a, b) {
                    (Some(a), Some(b)) => scalar::compare_literals(self.meta.prim, a, b),
                    _ => Err(AstError::TreeIsNotSettled),
                }
            }
            (
                NodeKind::Pair {
                    left: l1,
                    right: r1,
                    ..
                },
                NodeKind::Pair {
                    left: l2,
                    right: r2,
                    ..
                },
            ) => match l1.compare(l2)? {
                Ordering::Equal => r1.compare(r2),
                ordering => Ok(ordering),
            },
            (
                NodeKind::Or {
                    left: l1,
                    right: r1,
                    side: s1,
                },
                NodeKind::Or {
                    left: l2,
                    right: r2,
                    side: s2,
                },
            ) => match (s1, s2) {
                (Some(OrSide::Left), Some(OrSide::Left)) => l1.compare(l2),
                (Some(OrSide::Right), Some(OrSide::Right)) => r1.compare(r2),
                (Some(OrSide::Left), Some(OrSide::Right)) => Ok(Ordering::Less),
                (Some(OrSide::Right), Some(OrSide::Left)) => Ok(Ordering::Greater),
                _ => Err(AstError::TreeIsNotSettled),
            },
            (NodeKind::Option { value: a, .. }, NodeKind::Option { value: b, .. }) => {
                match (a, b) {
                    (None, None) => Ok(Ordering::Equal),
                    (None, Some(_)) => Ok(Ordering::Less),
                    (Some(_), None) => Ok(Ordering::Greater),
                    (Some(a), Some(b)) => a.compare(b),
                }
            }
            _ => Err(AstError::not_comparable(
                self.meta.prim.name(),
                other.meta.prim.name(),
            )),
        }
    }

    /* Same type shape, annotations ignored */
    pub fn equal_type(&self, other: &TypedNode) -> bool {
        if self.meta.prim != other.meta.prim {
            return false;
        }
        match (&self.kind, &other.kind) {
            (
                NodeKind::SaplingState { memo_size: a, .. },
                NodeKind::SaplingState { memo_size: b, .. },
            )
            | (
                NodeKind::SaplingTransaction { memo_size: a, .. },
                NodeKind::SaplingTransaction { memo_size: b, .. },
            ) => a == b,
            (NodeKind::Constant { hash: a, .. }, NodeKind::Constant { hash: b, .. }) => a == b,
            _ => {
                let (mine, theirs) = (self.type_children(), other.type_children());
                mine.len() == theirs.len()
                    && mine.iter().zip(theirs.iter()).all(|(a, b)| a.equal_type(b))
            }
        }
    }

    /* Like `equal_type`, but the leaves of an `or` may appear in any order */
    pub fn matches_type(&self, other: &TypedNode) -> bool {
        if self.meta.prim != other.meta.prim {
            return false;
        }
        if self.is_or() {
            let mine = all_or_leaves(self);
            let mut theirs = all_or_leaves(other);
            if mine.len() != theirs.len() {
                return false;
            }
            for leaf in mine {
                match theirs.iter().position(|candidate| leaf.matches_type(candidate)) {
                    Some(index) => {
                        theirs.remove(index);
                    }
                    None => return false,
                }
            }
            return true;
        }
        if !matches!(
            self.kind,
            NodeKind::Pair { .. }
                | NodeKind::Option { .. }
                | NodeKind::List { .. }
                | NodeKind::Set { .. }
                | NodeKind::Map { .. }
                | NodeKind::BigMap { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::Contract { .. }
                | NodeKind::Ticket { .. }
        ) {
            return self.equal_type(other);
        }
        let (mine, theirs) = (self.type_children(), other.type_children());
        mine.len() == theirs.len() && mine.iter().zip(theirs.iter()).all(|(a, b)| a.matches_type(b))
    }
}

/* Leaves of nested ors regardless of annotations */
fn all_or_leaves(node: &TypedNode) -> Vec<&TypedNode> {
    match &node.kind {
        NodeKind::Or { left, right, .. } => {
            let mut out = all_or_leaves(left);
            out.extend(all_or_leaves(right));
            out
        }
        _ => vec![node],
    }
}
