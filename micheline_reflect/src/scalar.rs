/* Literal handling for scalar primitives: acceptance, normal forms, ordering */

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use micheline_forge::encoding::{
    forge_address, forge_chain_id, forge_key_hash, forge_l2_address, forge_public_key,
    forge_signature, unforge_address, unforge_chain_id, unforge_key_hash, unforge_l2_address,
    unforge_public_key, unforge_signature,
};
use micheline_types::{Literal, Node, TypePrim};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::errors::{AstError, AstResult};

/* Checks that `value` is a literal this primitive can hold */
pub(crate) fn accept_literal(prim: TypePrim, value: &Node) -> AstResult<Literal> {
    let literal = value.as_literal();
    let accepted = match (prim, &literal) {
        (TypePrim::Int, Some(Literal::Int(_))) => true,
        (TypePrim::Nat | TypePrim::Mutez, Some(Literal::Int(v))) => {
            if v.sign() == Sign::Minus {
                return Err(AstError::Validation {
                    kind: prim.name(),
                    reason: format!("negative value {}", v),
                });
            }
            true
        }
        (TypePrim::String, Some(Literal::String(_))) => true,
        (
            TypePrim::Bytes
            | TypePrim::Bls12381G1
            | TypePrim::Bls12381G2
            | TypePrim::Chest
            | TypePrim::ChestKey
            | TypePrim::SaplingTransaction
            | TypePrim::SaplingTransactionDeprecated,
            Some(Literal::Bytes(_)),
        ) => true,
        (TypePrim::Bls12381Fr, Some(Literal::Int(_) | Literal::Bytes(_))) => true,
        (TypePrim::Timestamp, Some(Literal::Int(_) | Literal::String(_))) => true,
        (
            TypePrim::Address
            | TypePrim::Contract
            | TypePrim::Key
            | TypePrim::KeyHash
            | TypePrim::Signature
            | TypePrim::ChainId
            | TypePrim::TxRollupL2Address,
            Some(Literal::String(_) | Literal::Bytes(_)),
        ) => true,
        _ => false,
    };
    match literal {
        Some(literal) if accepted => Ok(literal),
        _ => Err(AstError::invalid_prim(
            format!("{} literal", prim.name()),
            value.describe(),
        )),
    }
}

pub(crate) fn timestamp_seconds(literal: &Literal) -> AstResult<BigInt> {
    match literal {
        Literal::Int(v) => Ok(v.clone()),
        Literal::String(text) => {
            if let Ok(secs) = text.parse::<i64>() {
                return Ok(BigInt::from(secs));
            }
            DateTime::parse_from_rfc3339(text)
                .map(|dt| BigInt::from(dt.timestamp()))
                .map_err(|e| AstError::Validation {
                    kind: "timestamp",
                    reason: format!("{:?}: {}", text, e),
                })
        }
        Literal::Bytes(_) => Err(AstError::invalid_prim("timestamp literal", "bytes")),
    }
}

fn format_timestamp(secs: &BigInt) -> Option<String> {
    let secs = secs.to_i64()?;
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/* Binary form as the chain forges it inside packed data */
pub(crate) fn optimize(prim: TypePrim, literal: &Literal) -> AstResult<Literal> {
    let Literal::String(text) = literal else {
        return Ok(literal.clone());
    };
    let bytes = match prim {
        TypePrim::Timestamp => return timestamp_seconds(literal).map(Literal::Int),
        TypePrim::Address | TypePrim::Contract => forge_address(text)?,
        TypePrim::KeyHash => forge_key_hash(text)?,
        TypePrim::Key => forge_public_key(text)?,
        TypePrim::Signature => forge_signature(text)?,
        TypePrim::ChainId => forge_chain_id(text)?,
        TypePrim::TxRollupL2Address => forge_l2_address(text)?,
        _ => return Ok(literal.clone()),
    };
    Ok(Literal::Bytes(bytes))
}

/* Textual form: base58 identifiers and RFC 3339 timestamps */
pub(crate) fn readable(prim: TypePrim, literal: &Literal) -> AstResult<Literal> {
    match (prim, literal) {
        (TypePrim::Timestamp, Literal::Int(secs)) => Ok(format_timestamp(secs)
            .map(Literal::String)
            .unwrap_or_else(|| literal.clone())),
        (_, Literal::Bytes(bytes)) => {
            let text = match prim {
                TypePrim::Address | TypePrim::Contract => unforge_address(bytes)?,
                TypePrim::KeyHash => unforge_key_hash(bytes)?,
                TypePrim::Key => unforge_public_key(bytes)?,
                TypePrim::Signature => unforge_signature(bytes)?,
                TypePrim::ChainId => unforge_chain_id(bytes)?,
                TypePrim::TxRollupL2Address => unforge_l2_address(bytes)?,
                _ => return Ok(literal.clone()),
            };
            Ok(Literal::String(text))
        }
        _ => Ok(literal.clone()),
    }
}

/* Display string used by presentation trees */
pub(crate) fn display(prim: TypePrim, literal: &Literal) -> AstResult<String> {
    readable(prim, literal).map(|lit| lit.to_string())
}

pub(crate) fn compare_literals(prim: TypePrim, a: &Literal, b: &Literal) -> AstResult<Ordering> {
    match prim {
        TypePrim::Int | TypePrim::Nat | TypePrim::Mutez => match (a, b) {
            (Literal::Int(x), Literal::Int(y)) => Ok(x.cmp(y)),
            _ => Err(AstError::not_comparable(prim.name(), prim.name())),
        },
        TypePrim::String => match (a, b) {
            (Literal::String(x), Literal::String(y)) => Ok(x.cmp(y)),
            _ => Err(AstError::not_comparable(prim.name(), prim.name())),
        },
        TypePrim::Bytes => match (a, b) {
            (Literal::Bytes(x), Literal::Bytes(y)) => Ok(x.cmp(y)),
            _ => Err(AstError::not_comparable(prim.name(), prim.name())),
        },
        TypePrim::Timestamp => Ok(timestamp_seconds(a)?.cmp(&timestamp_seconds(b)?)),
        TypePrim::Address
        | TypePrim::Contract
        | TypePrim::Key
        | TypePrim::KeyHash
        | TypePrim::Signature
        | TypePrim::ChainId
        | TypePrim::TxRollupL2Address => {
            let (x, y) = (optimize(prim, a)?, optimize(prim, b)?);
            match (x, y) {
                (Literal::Bytes(x), Literal::Bytes(y)) => Ok(x.cmp(&y)),
                _ => Err(AstError::not_comparable(prim.name(), prim.name())),
            }
        }
        _ => Err(AstError::not_comparable(prim.name(), prim.name())),
    }
}
