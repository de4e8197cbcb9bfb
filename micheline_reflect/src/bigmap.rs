/* Big-map enrichment from externally supplied diffs */

use std::collections::HashSet;

use micheline_forge::unforge_one;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ast::TypedAst;
use crate::errors::{AstError, AstResult};
use crate::node::{NodeKind, OrSide, TypedNode};

/* One key update of a big map; a missing value removes the key */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigMapDiff {
    pub ptr: i64,
    #[serde(with = "hex_bytes")]
    pub key: Vec<u8>,
    #[serde(default, with = "hex_bytes_opt", skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<u8>>,
}

impl BigMapDiff {
    pub fn update(ptr: i64, key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            ptr,
            key,
            value: Some(value),
        }
    }

    pub fn remove(ptr: i64, key: Vec<u8>) -> Self {
        Self {
            ptr,
            key,
            value: None,
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

mod hex_bytes_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom))
            .transpose()
    }
}

fn enrich_node(
    node: &mut TypedNode,
    diffs: &[BigMapDiff],
    seen: &mut HashSet<i64>,
) -> AstResult<usize> {
    match &mut node.kind {
        NodeKind::BigMap {
            key,
            value,
            ptr: Some(ptr),
            data,
        } => {
            let ptr = *ptr;
            seen.insert(ptr);
            let mut applied = 0;
            for diff in diffs.iter().filter(|diff| diff.ptr == ptr) {
                let mut diff_key = key.as_ref().clone();
                diff_key.parse_value(&unforge_one(&diff.key)?)?;
                match &diff.value {
                    Some(bytes) => {
                        let mut diff_value = value.as_ref().clone();
                        diff_value.parse_value(&unforge_one(bytes)?)?;
                        data.add(diff_key, diff_value)?;
                    }
                    None => {
                        data.remove(&diff_key)?;
                    }
                }
                applied += 1;
            }
            debug!(ptr, applied, size = data.len(), "big map enriched");
            Ok(applied)
        }
        NodeKind::Pair { left, right, .. } => {
            Ok(enrich_node(left, diffs, seen)? + enrich_node(right, diffs, seen)?)
        }
        NodeKind::Or { left, right, side } => match side {
            Some(OrSide::Left) => enrich_node(left, diffs, seen),
            Some(OrSide::Right) => enrich_node(right, diffs, seen),
            None => Ok(0),
        },
        NodeKind::Option {
            value: Some(inner), ..
        } => enrich_node(inner, diffs, seen),
        NodeKind::List { items, .. } | NodeKind::Set { items, .. } => {
            let mut applied = 0;
            for item in items.iter_mut() {
                applied += enrich_node(item, diffs, seen)?;
            }
            Ok(applied)
        }
        NodeKind::Map { data, .. } => {
            let mut applied = 0;
            for item in data.values_mut() {
                applied += enrich_node(item, diffs, seen)?;
            }
            Ok(applied)
        }
        NodeKind::Ticket { paired, .. } => enrich_node(paired, diffs, seen),
        _ => Ok(0),
    }
}

fn collect_pointers(node: &TypedNode, out: &mut Vec<i64>) {
    match &node.kind {
        NodeKind::BigMap { ptr: Some(ptr), .. } => out.push(*ptr),
        NodeKind::Pair { left, right, .. } => {
            collect_pointers(left, out);
            collect_pointers(right, out);
        }
        NodeKind::Or { .. } => {
            if let Some((_, leaf)) = node.active_or_leaf() {
                collect_pointers(leaf, out);
            }
        }
        NodeKind::Option {
            value: Some(inner), ..
        } => collect_pointers(inner, out),
        NodeKind::List { items, .. } | NodeKind::Set { items, .. } => {
            items.iter().for_each(|item| collect_pointers(item, out))
        }
        NodeKind::Map { data, .. } => data.values().for_each(|item| collect_pointers(item, out)),
        NodeKind::Ticket { paired, .. } => collect_pointers(paired, out),
        _ => {}
    }
}

impl TypedAst {
    /* Applies `diffs` to the big maps of the settled value, keyed by pointer.
     * Returns how many diffs were applied; on error nothing changes. */
    pub fn enrich_big_maps(&mut self, diffs: &[BigMapDiff]) -> AstResult<usize> {
        if !self.is_settled() {
            return Err(AstError::TreeIsNotSettled);
        }
        let mut seen = HashSet::new();
        let mut applied = 0;
        let mut nodes = self.nodes().to_vec();
        for node in nodes.iter_mut() {
            applied += enrich_node(node, diffs, &mut seen)?;
        }
        self.nodes_mut().clone_from_slice(&nodes);
        for diff in diffs.iter().filter(|diff| !seen.contains(&diff.ptr)) {
            warn!(ptr = diff.ptr, "big map diff for unknown pointer");
        }
        Ok(applied)
    }

    /* Pointers of big maps held by the settled value, in tree order */
    pub fn big_map_pointers(&self) -> Vec<i64> {
        let mut out = Vec::new();
        for node in self.nodes() {
            collect_pointers(node, &mut out);
        }
        out
    }
}
