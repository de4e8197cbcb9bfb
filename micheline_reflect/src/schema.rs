/* JSON Schema documents for typed trees and decoding of form submissions */

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use micheline_forge::validate::{
    validate_address, validate_bytes, validate_chain_id, validate_key_hash, validate_l2_address,
    validate_public_key, validate_signature, validate_timestamp,
};
use micheline_types::{parse_untyped, prim as kw, Node, TypePrim};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::ast::TypedAst;
use crate::errors::{AstError, AstResult};
use crate::node::{NodeKind, OrSide, TypedNode};

/* Discriminator property of `oneOf` branches */
pub const SCHEMA_KEY: &str = "schemaKey";

const ADDRESS_LENGTH: usize = 36;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, JsonSchema>,
    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<JsonSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
    #[serde(rename = "x-itemTitle", default, skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
}

/* Knobs for schema generation */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /* Default value of timestamp fields */
    pub now: DateTime<Utc>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self { now: Utc::now() }
    }
}

impl JsonSchema {
    fn typed(kind: &str, node: &TypedNode) -> Self {
        Self {
            kind: Some(kind.to_string()),
            title: Some(node.name()),
            prim: Some(node.prim().name().to_string()),
            ..Default::default()
        }
    }

    fn discriminator(value: &str) -> Self {
        Self {
            kind: Some("string".to_string()),
            constant: Some(JsonValue::String(value.to_string())),
            ..Default::default()
        }
    }

    fn branch(title: &str, key: &str) -> Self {
        let mut branch = Self {
            title: Some(title.to_string()),
            ..Default::default()
        };
        branch
            .properties
            .insert(SCHEMA_KEY.to_string(), Self::discriminator(key));
        branch.required.push(SCHEMA_KEY.to_string());
        branch
    }

    fn is_object(&self) -> bool {
        self.kind.as_deref() == Some("object")
    }

    /* Example form submission: const, first branch, properties, then default */
    pub fn default_submission(&self) -> JsonValue {
        if let Some(constant) = &self.constant {
            return constant.clone();
        }
        if let Some(first) = self.one_of.first() {
            let mut out = JsonMap::new();
            for (key, schema) in &first.properties {
                out.insert(key.clone(), schema.default_submission());
            }
            return JsonValue::Object(out);
        }
        match self.kind.as_deref() {
            Some("object") => JsonValue::Object(
                self.properties
                    .iter()
                    .map(|(key, schema)| (key.clone(), schema.default_submission()))
                    .collect(),
            ),
            Some("array") => JsonValue::Array(Vec::new()),
            _ => self.default.clone().unwrap_or(JsonValue::Null),
        }
    }
}

fn or_path_key(path: &[OrSide]) -> String {
    path.iter()
        .map(|side| match side {
            OrSide::Left => '0',
            OrSide::Right => '1',
        })
        .collect()
}

fn scalar_schema(node: &TypedNode, opts: &SchemaOptions) -> JsonSchema {
    let prim = node.prim();
    let (kind, default) = match prim {
        TypePrim::Int | TypePrim::Nat | TypePrim::Mutez => ("integer", JsonValue::from(0)),
        TypePrim::Bool => ("boolean", JsonValue::Bool(false)),
        TypePrim::Timestamp => (
            "string",
            JsonValue::String(opts.now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
        _ => ("string", JsonValue::String(String::new())),
    };
    let mut schema = JsonSchema::typed(kind, node);
    schema.default = Some(default);
    match prim {
        TypePrim::Address => {
            schema.min_length = Some(ADDRESS_LENGTH);
            schema.max_length = Some(ADDRESS_LENGTH);
        }
        TypePrim::Timestamp => schema.format = Some("date-time".to_string()),
        _ => {}
    }
    schema
}

/* Properties of a pair's members, unit members left out */
fn pair_properties(node: &TypedNode, opts: &SchemaOptions) -> AstResult<JsonSchema> {
    let mut schema = JsonSchema::typed("object", node);
    for member in node.flatten_pair() {
        if member.is_unit() {
            continue;
        }
        schema.required.push(member.name());
        schema
            .properties
            .insert(member.name(), member.to_json_schema(opts)?);
    }
    Ok(schema)
}

impl TypedNode {
    /* Schema of the value held by this node */
    pub fn to_json_schema(&self, opts: &SchemaOptions) -> AstResult<JsonSchema> {
        Ok(match &self.kind {
            NodeKind::Unit => JsonSchema::typed("object", self),
            NodeKind::Never | NodeKind::Operation | NodeKind::Ticket { .. } => {
                return Err(AstError::Unsupported {
                    prim: self.prim().name().to_string(),
                    op: "to_json_schema",
                })
            }
            NodeKind::Bool(_) | NodeKind::Scalar(_) | NodeKind::Contract { .. } => {
                scalar_schema(self, opts)
            }
            NodeKind::Pair { .. } => pair_properties(self, opts)?,
            NodeKind::Option { inner, .. } => {
                let mut schema = JsonSchema::typed("object", self);
                let none = JsonSchema::branch("None", "none");
                let mut some = JsonSchema::branch("Some", "some");
                if !inner.is_unit() {
                    some.properties
                        .insert(inner.name(), inner.to_json_schema(opts)?);
                    some.required.push(inner.name());
                }
                schema.one_of = vec![none, some];
                schema
            }
            NodeKind::Or { .. } => {
                let mut schema = JsonSchema::typed("object", self);
                for (path, leaf) in self.flatten_or() {
                    let mut branch = JsonSchema::branch(&leaf.name(), &or_path_key(&path));
                    if !leaf.is_unit() {
                        branch
                            .properties
                            .insert(leaf.name(), leaf.to_json_schema(opts)?);
                        branch.required.push(leaf.name());
                    }
                    schema.one_of.push(branch);
                }
                schema
            }
            NodeKind::List { elem, .. } | NodeKind::Set { elem, .. } => {
                let mut schema = JsonSchema::typed("array", self);
                schema.item_title = Some(elem.name());
                schema.items = Some(Box::new(elem.to_json_schema(opts)?));
                schema
            }
            NodeKind::Map { key, value, .. } | NodeKind::BigMap { key, value, .. } => {
                let mut entry = JsonSchema {
                    kind: Some("object".to_string()),
                    required: vec![key.name(), value.name()],
                    ..Default::default()
                };
                entry.properties.insert(key.name(), key.to_json_schema(opts)?);
                entry
                    .properties
                    .insert(value.name(), value.to_json_schema(opts)?);
                let mut schema = JsonSchema::typed("array", self);
                schema.item_title = Some(key.name());
                schema.items = Some(Box::new(entry));
                schema
            }
            NodeKind::Lambda { .. }
            | NodeKind::SaplingState { .. }
            | NodeKind::SaplingTransaction { .. }
            | NodeKind::Constant { .. } => {
                let mut schema = JsonSchema::typed("string", self);
                schema.format = Some("micheline".to_string());
                schema.default = Some(JsonValue::String(String::new()));
                schema
            }
        })
    }

    /* Untyped value for this node built from a form submission */
    pub fn from_json_schema(&self, data: &JsonValue) -> AstResult<Node> {
        match &self.kind {
            NodeKind::Unit => Ok(Node::prim(kw::UNIT)),
            NodeKind::Never | NodeKind::Operation | NodeKind::Ticket { .. } => {
                Err(AstError::Unsupported {
                    prim: self.prim().name().to_string(),
                    op: "from_json_schema",
                })
            }
            NodeKind::Bool(_) => match data {
                JsonValue::Bool(true) => Ok(Node::prim(kw::TRUE)),
                JsonValue::Bool(false) => Ok(Node::prim(kw::FALSE)),
                other => Err(schema_error(self, "boolean", other)),
            },
            NodeKind::Scalar(_) | NodeKind::Contract { .. } => scalar_value(self, data),
            NodeKind::Pair { .. } => {
                let object = expect_object(self, data)?;
                self.pair_value(object)
            }
            NodeKind::Option { inner, .. } => {
                let object = expect_object(self, data)?;
                match discriminator(self, object)? {
                    "none" => Ok(Node::prim(kw::NONE)),
                    "some" => Ok(Node::prim_with_args(
                        kw::SOME,
                        vec![member_value(inner, object)?],
                    )),
                    other => Err(AstError::InvalidSchemaData(format!(
                        "{}: unknown option branch {:?}",
                        self.name(),
                        other
                    ))),
                }
            }
            NodeKind::Or { .. } => {
                let object = expect_object(self, data)?;
                let key = discriminator(self, object)?;
                let (path, leaf) = self
                    .flatten_or()
                    .into_iter()
                    .find(|(path, _)| or_path_key(path) == key)
                    .ok_or_else(|| {
                        AstError::InvalidSchemaData(format!(
                            "{}: unknown branch {:?}",
                            self.name(),
                            key
                        ))
                    })?;
                let mut value = member_value(leaf, object)?;
                for side in path.iter().rev() {
                    let prim = match side {
                        OrSide::Left => kw::LEFT,
                        OrSide::Right => kw::RIGHT,
                    };
                    value = Node::prim_with_args(prim, vec![value]);
                }
                Ok(value)
            }
            NodeKind::List { elem, .. } | NodeKind::Set { elem, .. } => {
                let items = expect_array(self, data)?;
                Ok(Node::Seq(
                    items
                        .iter()
                        .map(|item| elem.from_json_schema(item))
                        .collect::<AstResult<_>>()?,
                ))
            }
            NodeKind::Map { key, value, .. } | NodeKind::BigMap { key, value, .. } => {
                let entries = expect_array(self, data)?;
                let mut out = Vec::with_capacity(entries.len());
                for entry in entries {
                    let object = expect_object(self, entry)?;
                    out.push(Node::prim_with_args(
                        kw::ELT,
                        vec![member_value(key, object)?, member_value(value, object)?],
                    ));
                }
                Ok(Node::Seq(out))
            }
            NodeKind::Lambda { .. }
            | NodeKind::SaplingState { .. }
            | NodeKind::SaplingTransaction { .. }
            | NodeKind::Constant { .. } => {
                let text = data
                    .as_str()
                    .ok_or_else(|| schema_error(self, "micheline text", data))?;
                let mut nodes = parse_untyped(text)
                    .map_err(|e| AstError::InvalidSchemaData(format!("{}: {}", self.name(), e)))?;
                /* a lone instruction is still a code block */
                let bare_instruction = match nodes.as_slice() {
                    [Node::Prim(p)] => {
                        matches!(self.kind, NodeKind::Lambda { .. }) && p.prim != kw::LAMBDA_REC
                    }
                    _ => false,
                };
                Ok(if nodes.len() == 1 && !bare_instruction {
                    nodes.remove(0)
                } else {
                    Node::Seq(nodes)
                })
            }
        }
    }

    /* Nested `Pair` value; unnamed inner pairs read from the same object */
    fn pair_value(&self, object: &JsonMap<String, JsonValue>) -> AstResult<Node> {
        let NodeKind::Pair { left, right, .. } = &self.kind else {
            return member_value(self, object);
        };
        let mut args = Vec::with_capacity(2);
        for child in [left.as_ref(), right.as_ref()] {
            if child.is_pair() && !child.meta.is_named() {
                args.push(child.pair_value(object)?);
            } else {
                args.push(member_value(child, object)?);
            }
        }
        Ok(Node::prim_with_args(kw::PAIR, args))
    }
}

fn schema_error(node: &TypedNode, expected: &str, got: &JsonValue) -> AstError {
    AstError::InvalidSchemaData(format!("{}: expected {}, got {}", node.name(), expected, got))
}

fn expect_object<'a>(
    node: &TypedNode,
    data: &'a JsonValue,
) -> AstResult<&'a JsonMap<String, JsonValue>> {
    data.as_object()
        .ok_or_else(|| schema_error(node, "object", data))
}

fn expect_array<'a>(node: &TypedNode, data: &'a JsonValue) -> AstResult<&'a Vec<JsonValue>> {
    data.as_array().ok_or_else(|| schema_error(node, "array", data))
}

fn discriminator<'a>(node: &TypedNode, object: &'a JsonMap<String, JsonValue>) -> AstResult<&'a str> {
    object
        .get(SCHEMA_KEY)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| {
            AstError::InvalidSchemaData(format!("{}: missing {}", node.name(), SCHEMA_KEY))
        })
}

/* Value of `node` stored under its name; unit needs no entry */
fn member_value(node: &TypedNode, object: &JsonMap<String, JsonValue>) -> AstResult<Node> {
    if node.is_unit() {
        return Ok(Node::prim(kw::UNIT));
    }
    let data = object.get(&node.name()).ok_or_else(|| {
        AstError::InvalidSchemaData(format!("missing field {:?}", node.name()))
    })?;
    node.from_json_schema(data)
}

fn integer_value(node: &TypedNode, data: &JsonValue) -> AstResult<BigInt> {
    let parsed = match data {
        JsonValue::Number(n) => n
            .as_i64()
            .map(BigInt::from)
            .or_else(|| n.as_u64().map(BigInt::from)),
        JsonValue::String(text) => text.trim().parse::<BigInt>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| schema_error(node, "integer", data))
}

fn scalar_value(node: &TypedNode, data: &JsonValue) -> AstResult<Node> {
    let prim = node.prim();
    if let TypePrim::Int | TypePrim::Nat | TypePrim::Mutez = prim {
        let value = integer_value(node, data)?;
        if prim != TypePrim::Int && value < BigInt::from(0) {
            return Err(AstError::Validation {
                kind: prim.name(),
                reason: format!("negative value {}", value),
            });
        }
        return Ok(Node::Int(value));
    }
    if prim == TypePrim::Timestamp {
        if let JsonValue::Number(_) = data {
            return Ok(Node::Int(integer_value(node, data)?));
        }
    }

    let text = data
        .as_str()
        .ok_or_else(|| schema_error(node, "string", data))?;
    match prim {
        TypePrim::String => return Ok(Node::string(text)),
        TypePrim::Timestamp => validate_timestamp(text)?,
        TypePrim::Address | TypePrim::Contract => validate_address(text)?,
        TypePrim::KeyHash => validate_key_hash(text)?,
        TypePrim::Key => validate_public_key(text)?,
        TypePrim::Signature => validate_signature(text)?,
        TypePrim::ChainId => validate_chain_id(text)?,
        TypePrim::TxRollupL2Address => validate_l2_address(text)?,
        _ => {
            validate_bytes(text)?;
            let raw = text.strip_prefix("0x").unwrap_or(text);
            let bytes = hex::decode(raw)
                .map_err(|e| AstError::InvalidSchemaData(format!("{}: {}", node.name(), e)))?;
            return Ok(Node::bytes(bytes));
        }
    }
    Ok(Node::string(text))
}

impl TypedAst {
    /* Schema of the whole value; non-object roots are wrapped under their name */
    pub fn to_json_schema(&self, opts: &SchemaOptions) -> AstResult<JsonSchema> {
        let roots = self.skeleton();
        if let [root] = roots {
            let schema = root.to_json_schema(opts)?;
            if schema.is_object() {
                return Ok(schema);
            }
        }
        let mut wrapper = JsonSchema {
            kind: Some("object".to_string()),
            ..Default::default()
        };
        if let [root] = roots {
            wrapper.title = Some(root.name());
            wrapper.prim = Some(root.prim().name().to_string());
        }
        for root in roots {
            if root.is_unit() {
                continue;
            }
            wrapper.required.push(root.name());
            wrapper
                .properties
                .insert(root.name(), root.to_json_schema(opts)?);
        }
        Ok(wrapper)
    }

    /* Settles from a submission shaped like `to_json_schema` */
    pub fn from_json_schema(&mut self, data: &JsonValue) -> AstResult<()> {
        let values = {
            let roots = self.skeleton();
            let direct = match roots {
                [root] => matches!(
                    root.kind,
                    NodeKind::Unit
                        | NodeKind::Pair { .. }
                        | NodeKind::Option { .. }
                        | NodeKind::Or { .. }
                ),
                _ => false,
            };
            if direct {
                roots
                    .iter()
                    .map(|root| root.from_json_schema(data))
                    .collect::<AstResult<Vec<_>>>()?
            } else {
                let object = data.as_object().ok_or_else(|| {
                    AstError::InvalidSchemaData(format!("expected object, got {}", data))
                })?;
                roots
                    .iter()
                    .map(|root| member_value(root, object))
                    .collect::<AstResult<Vec<_>>>()?
            }
        };
        self.settle(&values)
    }
}
