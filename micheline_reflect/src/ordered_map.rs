/* Map keyed by structural comparison of typed values */

use std::cmp::Ordering;

use crate::errors::AstResult;
use crate::node::TypedNode;

/* Entries kept in ascending key order.
 *
 * Lookups scan linearly and compare keys structurally, so two keys written in
 * different literal forms (an address as text and as bytes) land on the same
 * entry. A hash keyed by encoded bytes would split them. */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap {
    entries: Vec<(TypedNode, TypedNode)>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &TypedNode) -> AstResult<Result<usize, usize>> {
        for (index, (existing, _)) in self.entries.iter().enumerate() {
            match existing.compare(key)? {
                Ordering::Less => continue,
                Ordering::Equal => return Ok(Ok(index)),
                Ordering::Greater => return Ok(Err(index)),
            }
        }
        Ok(Err(self.entries.len()))
    }

    pub fn get(&self, key: &TypedNode) -> AstResult<Option<&TypedNode>> {
        Ok(match self.position(key)? {
            Ok(index) => Some(&self.entries[index].1),
            Err(_) => None,
        })
    }

    pub fn contains_key(&self, key: &TypedNode) -> AstResult<bool> {
        Ok(self.position(key)?.is_ok())
    }

    /* Inserts or replaces; returns the previous value for an equal key */
    pub fn add(&mut self, key: TypedNode, value: TypedNode) -> AstResult<Option<TypedNode>> {
        match self.position(&key)? {
            Ok(index) => Ok(Some(std::mem::replace(&mut self.entries[index].1, value))),
            Err(index) => {
                self.entries.insert(index, (key, value));
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, key: &TypedNode) -> AstResult<Option<TypedNode>> {
        Ok(match self.position(key)? {
            Ok(index) => Some(self.entries.remove(index).1),
            Err(_) => None,
        })
    }

    /* Visits entries in key order until the callback returns false */
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&TypedNode, &TypedNode) -> bool,
    {
        for (key, value) in &self.entries {
            if !f(key, value) {
                break;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypedNode, &TypedNode)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypedNode> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &TypedNode> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut TypedNode> {
        self.entries.iter_mut().map(|(_, v)| v)
    }
}
