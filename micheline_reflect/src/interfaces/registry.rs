/* Registry of contract interfaces, parsed once on first use */

use micheline_types::parse_untyped;
use once_cell::sync::OnceCell;
use tracing::debug;

use super::standards;
use super::InterfaceSpec;
use crate::ast::TypedAst;
use crate::errors::{AstError, AstResult};
use crate::node::TypedNode;

#[derive(Debug, Clone)]
struct ParsedInterface {
    tag: String,
    entrypoints: Vec<(String, TypedNode)>,
}

#[derive(Clone, Default)]
pub struct InterfaceRegistry {
    specs: Vec<InterfaceSpec>,
    parsed: OnceCell<Vec<ParsedInterface>>,
}

impl std::fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceRegistry")
            .field("tags", &self.tags())
            .field("parsed", &self.parsed.get().is_some())
            .finish()
    }
}

fn parse_type(text: &str) -> AstResult<TypedNode> {
    match parse_untyped(text)?.as_slice() {
        [node] => TypedNode::from_type(node),
        nodes => Err(AstError::TreesAreDifferent(format!(
            "interface type needs one root, got {}",
            nodes.len()
        ))),
    }
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /* Registry with FA1, FA1.2, FA2 and the view shapes */
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in standards::all() {
            registry.register(spec);
        }
        registry
    }

    /* Adds or replaces an interface by tag */
    pub fn register(&mut self, spec: InterfaceSpec) {
        match self.specs.iter_mut().find(|known| known.tag == spec.tag) {
            Some(known) => *known = spec,
            None => self.specs.push(spec),
        }
        self.parsed = OnceCell::new();
    }

    pub fn tags(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.tag.as_str()).collect()
    }

    fn parsed(&self) -> AstResult<&[ParsedInterface]> {
        let parsed = self.parsed.get_or_try_init(|| {
            let parsed = self
                .specs
                .iter()
                .map(|spec| {
                    let entrypoints = spec
                        .entrypoints
                        .iter()
                        .map(|entry| Ok((entry.name.clone(), parse_type(&entry.type_json)?)))
                        .collect::<AstResult<Vec<_>>>()?;
                    Ok(ParsedInterface {
                        tag: spec.tag.clone(),
                        entrypoints,
                    })
                })
                .collect::<AstResult<Vec<_>>>()?;
            debug!(count = parsed.len(), "interface types parsed");
            Ok::<_, AstError>(parsed)
        })?;
        Ok(parsed)
    }

    fn satisfies(interface: &ParsedInterface, available: &[(String, &TypedNode)]) -> bool {
        interface.entrypoints.iter().all(|(name, expected)| {
            available.iter().any(|(candidate, node)| {
                (name.is_empty() || name == candidate) && node.matches_type(expected)
            })
        })
    }

    /* Tags of every registered interface the parameter type implements */
    pub fn find_interfaces(&self, parameter: &TypedAst) -> AstResult<Vec<String>> {
        let available = parameter.entrypoint_nodes();
        Ok(self
            .parsed()?
            .iter()
            .filter(|interface| Self::satisfies(interface, &available))
            .map(|interface| interface.tag.clone())
            .collect())
    }

    pub fn implements(&self, parameter: &TypedAst, tag: &str) -> AstResult<bool> {
        let available = parameter.entrypoint_nodes();
        Ok(self
            .parsed()?
            .iter()
            .find(|interface| interface.tag == tag)
            .is_some_and(|interface| Self::satisfies(interface, &available)))
    }
}
