//! Untyped Micheline tree
//!
//! A [`Node`] is the generic expression form shared by code, types and values.
//! The JSON encoding follows the node RPC convention: literals are objects with
//! a single `int`, `string` or `bytes` key, applications carry `prim` with
//! optional `args` and `annots`, and sequences are plain arrays.

use std::fmt;

use num_bigint::BigInt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::annots;
use crate::errors::{NodeError, NodeResult};

/// Scalar leaves of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(BigInt),
    String(String),
    Bytes(Vec<u8>),
}

impl Literal {
    pub fn to_node(&self) -> Node {
        match self {
            Literal::Int(v) => Node::Int(v.clone()),
            Literal::String(v) => Node::String(v.clone()),
            Literal::Bytes(v) => Node::Bytes(v.clone()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::String(v) => write!(f, "{}", v),
            Literal::Bytes(v) => write!(f, "{}", hex::encode(v)),
        }
    }
}

/// Primitive application: keyword, ordered arguments, annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PrimNode {
    pub prim: String,
    pub args: Vec<Node>,
    pub annots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Int(BigInt),
    String(String),
    Bytes(Vec<u8>),
    Seq(Vec<Node>),
    Prim(PrimNode),
}

impl Node {
    pub fn int<T: Into<BigInt>>(value: T) -> Self {
        Node::Int(value.into())
    }

    pub fn string<S: Into<String>>(value: S) -> Self {
        Node::String(value.into())
    }

    pub fn bytes<B: Into<Vec<u8>>>(value: B) -> Self {
        Node::Bytes(value.into())
    }

    pub fn prim<S: Into<String>>(prim: S) -> Self {
        Node::Prim(PrimNode {
            prim: prim.into(),
            args: Vec::new(),
            annots: Vec::new(),
        })
    }

    pub fn prim_with_args<S: Into<String>>(prim: S, args: Vec<Node>) -> Self {
        Node::Prim(PrimNode {
            prim: prim.into(),
            args,
            annots: Vec::new(),
        })
    }

    pub fn prim_full<S: Into<String>>(prim: S, args: Vec<Node>, annots: Vec<String>) -> Self {
        Node::Prim(PrimNode {
            prim: prim.into(),
            args,
            annots,
        })
    }

    pub fn is_prim(&self, name: &str) -> bool {
        matches!(self, Node::Prim(p) if p.prim == name)
    }

    pub fn prim_name(&self) -> Option<&str> {
        match self {
            Node::Prim(p) => Some(p.prim.as_str()),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<&PrimNode> {
        match self {
            Node::Prim(p) => Some(p),
            _ => None,
        }
    }

    /// Arguments of a primitive, empty for every other node.
    pub fn args(&self) -> &[Node] {
        match self {
            Node::Prim(p) => &p.args,
            _ => &[],
        }
    }

    pub fn annots(&self) -> &[String] {
        match self {
            Node::Prim(p) => &p.annots,
            _ => &[],
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        annots::field_name(self.annots())
    }

    pub fn type_name(&self) -> Option<&str> {
        annots::type_name(self.annots())
    }

    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            Node::Int(v) => Some(Literal::Int(v.clone())),
            Node::String(v) => Some(Literal::String(v.clone())),
            Node::Bytes(v) => Some(Literal::Bytes(v.clone())),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Short shape description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Int(v) => format!("int {}", v),
            Node::String(v) => format!("string {:?}", v),
            Node::Bytes(v) => format!("bytes 0x{}", hex::encode(v)),
            Node::Seq(items) => format!("sequence of {} item(s)", items.len()),
            Node::Prim(p) => format!("{} with {} arg(s)", p.prim, p.args.len()),
        }
    }

    /// Parses one node from its JSON form.
    pub fn from_json_value(value: &Value) -> NodeResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Node::from_json_value)
                .collect::<NodeResult<Vec<_>>>()
                .map(Node::Seq),
            Value::Object(obj) => Self::from_json_object(obj),
            other => Err(NodeError::InvalidJson(format!(
                "expected object or array, got {}",
                other
            ))),
        }
    }

    fn from_json_object(obj: &Map<String, Value>) -> NodeResult<Self> {
        if let Some(raw) = obj.get("int") {
            let text = json_str(raw, "int")?;
            let parsed = text
                .parse::<BigInt>()
                .map_err(|_| NodeError::InvalidJson(format!("invalid int literal {:?}", text)))?;
            return Ok(Node::Int(parsed));
        }
        if let Some(raw) = obj.get("string") {
            return Ok(Node::String(json_str(raw, "string")?.to_string()));
        }
        if let Some(raw) = obj.get("bytes") {
            let text = json_str(raw, "bytes")?;
            let decoded = hex::decode(text)
                .map_err(|e| NodeError::InvalidJson(format!("invalid bytes literal: {}", e)))?;
            return Ok(Node::Bytes(decoded));
        }
        if let Some(raw) = obj.get("prim") {
            let prim = json_str(raw, "prim")?.to_string();
            let args = match obj.get("args") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(Node::from_json_value)
                    .collect::<NodeResult<Vec<_>>>()?,
                Some(other) => {
                    return Err(NodeError::InvalidJson(format!(
                        "args of {} must be an array, got {}",
                        prim, other
                    )))
                }
            };
            let annots = match obj.get("annots") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|a| json_str(a, "annots").map(str::to_string))
                    .collect::<NodeResult<Vec<_>>>()?,
                Some(other) => {
                    return Err(NodeError::InvalidJson(format!(
                        "annots of {} must be an array, got {}",
                        prim, other
                    )))
                }
            };
            return Ok(Node::Prim(PrimNode { prim, args, annots }));
        }
        Err(NodeError::InvalidJson(format!(
            "object has none of int, string, bytes, prim: {}",
            Value::Object(obj.clone())
        )))
    }

    /// JSON form; empty `args` and `annots` are omitted.
    pub fn to_json_value(&self) -> Value {
        match self {
            Node::Int(v) => json!({ "int": v.to_string() }),
            Node::String(v) => json!({ "string": v }),
            Node::Bytes(v) => json!({ "bytes": hex::encode(v) }),
            Node::Seq(items) => Value::Array(items.iter().map(Node::to_json_value).collect()),
            Node::Prim(p) => {
                let mut obj = Map::new();
                obj.insert("prim".to_string(), Value::String(p.prim.clone()));
                if !p.args.is_empty() {
                    obj.insert(
                        "args".to_string(),
                        Value::Array(p.args.iter().map(Node::to_json_value).collect()),
                    );
                }
                if !p.annots.is_empty() {
                    obj.insert(
                        "annots".to_string(),
                        Value::Array(p.annots.iter().cloned().map(Value::String).collect()),
                    );
                }
                Value::Object(obj)
            }
        }
    }
}

fn json_str<'a>(value: &'a Value, key: &str) -> NodeResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| NodeError::InvalidJson(format!("{} must be a string, got {}", key, value)))
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        match lit {
            Literal::Int(v) => Node::Int(v),
            Literal::String(v) => Node::String(v),
            Literal::Bytes(v) => Node::Bytes(v),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Node::from_json_value(&value).map_err(D::Error::custom)
    }
}

/// Parses Micheline JSON text. An object yields one node, an array yields its elements.
pub fn parse_untyped(text: &str) -> NodeResult<Vec<Node>> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| NodeError::InvalidJson(e.to_string()))?;
    parse_untyped_value(&value)
}

pub fn parse_untyped_value(value: &Value) -> NodeResult<Vec<Node>> {
    match value {
        Value::Array(items) => items.iter().map(Node::from_json_value).collect(),
        Value::Object(_) => Ok(vec![Node::from_json_value(value)?]),
        other => Err(NodeError::InvalidJson(format!(
            "expected object or array, got {}",
            other
        ))),
    }
}

/// Inverse of [`parse_untyped_value`]: one node becomes an object, several an array.
pub fn untyped_to_json(nodes: &[Node]) -> Value {
    match nodes {
        [single] => single.to_json_value(),
        many => Value::Array(many.iter().map(Node::to_json_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prim_with_args_and_annots() {
        let nodes = parse_untyped(
            r#"{"prim":"pair","args":[{"prim":"nat","annots":["%amount"]},{"prim":"address"}]}"#,
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        let pair = &nodes[0];
        assert!(pair.is_prim("pair"));
        assert_eq!(pair.args().len(), 2);
        assert_eq!(pair.args()[0].field_name(), Some("amount"));
        assert_eq!(pair.args()[1].annots().len(), 0);
    }

    #[test]
    fn top_level_array_yields_elements() {
        let nodes = parse_untyped(r#"[{"int":"1"},{"string":"a"},{"bytes":"00ff"}]"#).unwrap();
        assert_eq!(
            nodes,
            vec![Node::int(1), Node::string("a"), Node::bytes(vec![0x00, 0xff])]
        );
    }

    #[test]
    fn nested_arrays_are_sequences() {
        let nodes = parse_untyped(r#"[[{"int":"1"}], []]"#).unwrap();
        assert_eq!(nodes[0], Node::Seq(vec![Node::int(1)]));
        assert_eq!(nodes[1], Node::Seq(vec![]));
    }

    #[test]
    fn json_output_omits_empty_fields() {
        let node = Node::prim_with_args("Some", vec![Node::prim("Unit")]);
        assert_eq!(
            node.to_json_value(),
            json!({"prim": "Some", "args": [{"prim": "Unit"}]})
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_untyped("42").is_err());
        assert!(parse_untyped(r#"{"foo":"bar"}"#).is_err());
        assert!(parse_untyped(r#"{"int":"12x"}"#).is_err());
        assert!(parse_untyped(r#"{"bytes":"zz"}"#).is_err());
        assert!(parse_untyped("not json").is_err());
    }

    #[test]
    fn serde_round_trip_of_large_int() {
        let text = r#"{"int":"-123456789123456789123"}"#;
        let node: Node = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&node).unwrap(), text);
    }
}
