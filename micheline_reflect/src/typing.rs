/* Type derivation: untyped type trees to typed nodes */

use micheline_types::{annots, Node, TypePrim};

use crate::errors::{AstError, AstResult};
use crate::node::{CombShape, NodeKind, NodeMeta, TypedNode};
use crate::ordered_map::OrderedMap;

/* Pre-order id source shared by all roots of one tree */
#[derive(Debug, Default)]
pub struct IdCounter(usize);

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> usize {
        let id = self.0;
        self.0 += 1;
        id
    }
}

impl TypedNode {
    /* Types a single root with a fresh id counter */
    pub fn from_type(node: &Node) -> AstResult<TypedNode> {
        Self::from_type_with(node, &mut IdCounter::new(), 0)
    }

    pub fn from_type_with(node: &Node, ids: &mut IdCounter, depth: usize) -> AstResult<TypedNode> {
        let prim_node = node
            .as_prim()
            .ok_or_else(|| AstError::invalid_prim("type primitive", node.describe()))?;
        let lowered = prim_node.prim.to_lowercase();
        let prim =
            TypePrim::from_name(&lowered).ok_or_else(|| AstError::UnknownPrim(prim_node.prim.clone()))?;
        let args = &prim_node.args;
        if !prim.arity().accepts(args.len()) {
            return Err(AstError::InvalidArgsCount {
                prim: prim.name().to_string(),
                expected: prim.arity().to_string(),
                got: args.len(),
            });
        }

        let valid = annots::filter_valid(&prim_node.annots);
        let meta = NodeMeta {
            id: ids.next(),
            depth,
            prim,
            field_name: annots::field_name(&valid).map(str::to_string),
            type_name: annots::type_name(&valid).map(str::to_string),
            annots: valid,
        };

        let child = |ids: &mut IdCounter, index: usize| -> AstResult<Box<TypedNode>> {
            Self::from_type_with(&args[index], ids, depth + 1).map(Box::new)
        };

        let kind = match prim {
            TypePrim::Unit => NodeKind::Unit,
            TypePrim::Never => NodeKind::Never,
            TypePrim::Operation => NodeKind::Operation,
            TypePrim::Bool => NodeKind::Bool(None),
            TypePrim::String
            | TypePrim::Int
            | TypePrim::Nat
            | TypePrim::Mutez
            | TypePrim::Timestamp
            | TypePrim::Bytes
            | TypePrim::Address
            | TypePrim::Key
            | TypePrim::KeyHash
            | TypePrim::Signature
            | TypePrim::ChainId
            | TypePrim::TxRollupL2Address
            | TypePrim::Bls12381Fr
            | TypePrim::Bls12381G1
            | TypePrim::Bls12381G2
            | TypePrim::Chest
            | TypePrim::ChestKey => NodeKind::Scalar(None),
            TypePrim::Contract => NodeKind::Contract {
                param: child(ids, 0)?,
                value: None,
            },
            TypePrim::Pair => {
                let left = child(ids, 0)?;
                let right = if args.len() > 2 {
                    /* right comb: pair a b c == pair a (pair b c) */
                    let rest = Node::prim_with_args(TypePrim::Pair.name(), args[1..].to_vec());
                    Box::new(Self::from_type_with(&rest, ids, depth + 1)?)
                } else {
                    child(ids, 1)?
                };
                NodeKind::Pair {
                    left,
                    right,
                    shape: CombShape::Nested,
                }
            }
            TypePrim::Or => NodeKind::Or {
                left: child(ids, 0)?,
                right: child(ids, 1)?,
                side: None,
            },
            TypePrim::Option => NodeKind::Option {
                inner: child(ids, 0)?,
                value: None,
            },
            TypePrim::List => NodeKind::List {
                elem: child(ids, 0)?,
                items: Vec::new(),
            },
            TypePrim::Set => NodeKind::Set {
                elem: child(ids, 0)?,
                items: Vec::new(),
            },
            TypePrim::Map => NodeKind::Map {
                key: child(ids, 0)?,
                value: child(ids, 1)?,
                data: OrderedMap::new(),
            },
            TypePrim::BigMap => NodeKind::BigMap {
                key: child(ids, 0)?,
                value: child(ids, 1)?,
                ptr: None,
                data: OrderedMap::new(),
            },
            TypePrim::Lambda => NodeKind::Lambda {
                param: child(ids, 0)?,
                ret: child(ids, 1)?,
                code: None,
            },
            TypePrim::Ticket => {
                let elem = child(ids, 0)?;
                let paired = ticket_pair(&args[0]);
                NodeKind::Ticket {
                    elem,
                    paired: Box::new(Self::from_type_with(&paired, ids, depth + 1)?),
                }
            }
            TypePrim::SaplingState => NodeKind::SaplingState {
                memo_size: memo_size(&args[0])?,
                value: None,
            },
            TypePrim::SaplingTransaction | TypePrim::SaplingTransactionDeprecated => {
                NodeKind::SaplingTransaction {
                    memo_size: memo_size(&args[0])?,
                    value: None,
                }
            }
            TypePrim::Constant => match &args[0] {
                Node::String(hash) => NodeKind::Constant {
                    hash: hash.clone(),
                    value: None,
                },
                other => return Err(AstError::invalid_prim("constant hash", other.describe())),
            },
        };

        Ok(TypedNode { meta, kind })
    }
}

fn memo_size(node: &Node) -> AstResult<num_bigint::BigInt> {
    match node {
        Node::Int(size) => Ok(size.clone()),
        other => Err(AstError::invalid_prim("memo size", other.describe())),
    }
}

/* pair (address %ticketer) (pair T (nat %amount)) */
fn ticket_pair(content: &Node) -> Node {
    Node::prim_with_args(
        TypePrim::Pair.name(),
        vec![
            Node::prim_full(TypePrim::Address.name(), vec![], vec!["%ticketer".to_string()]),
            Node::prim_with_args(
                TypePrim::Pair.name(),
                vec![
                    content.clone(),
                    Node::prim_full(TypePrim::Nat.name(), vec![], vec!["%amount".to_string()]),
                ],
            ),
        ],
    )
}
