/* Contract scripts: parameter, storage, code and view sections */

use micheline_types::{parse_untyped_value, prim as kw, Node};
use serde_json::Value as JsonValue;

use crate::ast::TypedAst;
use crate::errors::{AstError, AstResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptView {
    pub name: String,
    pub parameter: TypedAst,
    pub return_type: TypedAst,
    pub code: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub parameter: TypedAst,
    pub storage: TypedAst,
    pub code: Node,
    pub views: Vec<ScriptView>,
    sections: Vec<Node>,
}

fn single_arg<'a>(section: &'a Node, name: &str) -> AstResult<&'a Node> {
    match section.args() {
        [arg] => Ok(arg),
        args => Err(AstError::InvalidArgsCount {
            prim: name.to_string(),
            expected: "1".to_string(),
            got: args.len(),
        }),
    }
}

fn parse_view(section: &Node) -> AstResult<ScriptView> {
    match section.args() {
        [Node::String(name), parameter, return_type, code] => Ok(ScriptView {
            name: name.clone(),
            parameter: TypedAst::from_type_nodes(std::slice::from_ref(parameter))?,
            return_type: TypedAst::from_type_nodes(std::slice::from_ref(return_type))?,
            code: code.clone(),
        }),
        [other, _, _, _] => Err(AstError::invalid_prim("view name", other.describe())),
        args => Err(AstError::InvalidArgsCount {
            prim: kw::VIEW.to_string(),
            expected: "4".to_string(),
            got: args.len(),
        }),
    }
}

fn collect_constants(node: &Node, out: &mut Vec<String>) {
    match node {
        Node::Prim(prim) => {
            if prim.prim == "constant" {
                if let [Node::String(hash)] = prim.args.as_slice() {
                    if !out.contains(hash) {
                        out.push(hash.clone());
                    }
                }
            }
            prim.args.iter().for_each(|arg| collect_constants(arg, out));
        }
        Node::Seq(items) => items.iter().for_each(|item| collect_constants(item, out)),
        _ => {}
    }
}

impl Script {
    /* Reads a script from its section list */
    pub fn from_nodes(nodes: &[Node]) -> AstResult<Self> {
        let sections: Vec<Node> = match nodes {
            [Node::Seq(items)] => items.clone(),
            _ => nodes.to_vec(),
        };

        let (mut parameter, mut storage, mut code) = (None, None, None);
        let mut views = Vec::new();
        for section in &sections {
            match section.prim_name() {
                Some(kw::PARAMETER) => parameter = Some(single_arg(section, kw::PARAMETER)?),
                Some(kw::STORAGE) => storage = Some(single_arg(section, kw::STORAGE)?),
                Some(kw::CODE) => code = Some(single_arg(section, kw::CODE)?),
                Some(kw::VIEW) => views.push(parse_view(section)?),
                _ => {
                    return Err(AstError::invalid_prim(
                        "script section",
                        section.describe(),
                    ))
                }
            }
        }

        let parameter = parameter.ok_or(AstError::MissingSection(kw::PARAMETER))?;
        let storage = storage.ok_or(AstError::MissingSection(kw::STORAGE))?;
        let code = code.ok_or(AstError::MissingSection(kw::CODE))?;
        Ok(Self {
            parameter: TypedAst::from_type_nodes(std::slice::from_ref(parameter))?,
            storage: TypedAst::from_type_nodes(std::slice::from_ref(storage))?,
            code: code.clone(),
            views,
            sections,
        })
    }

    /* Accepts the section array or an object with a `code` member */
    pub fn from_value(value: &JsonValue) -> AstResult<Self> {
        let sections = match value.get(kw::CODE) {
            Some(code) if value.is_object() => code,
            _ => value,
        };
        Self::from_nodes(&parse_untyped_value(sections)?)
    }

    pub fn from_json(text: &str) -> AstResult<Self> {
        let value: JsonValue = serde_json::from_str(text)
            .map_err(|e| micheline_types::NodeError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn parameter_type(&self) -> &TypedAst {
        &self.parameter
    }

    pub fn storage_type(&self) -> &TypedAst {
        &self.storage
    }

    /* Storage type settled with `value` */
    pub fn storage_value(&self, value: &JsonValue) -> AstResult<TypedAst> {
        let mut storage = self.storage.clone();
        storage.settle_value(value)?;
        Ok(storage)
    }

    pub fn view(&self, name: &str) -> Option<&ScriptView> {
        self.views.iter().find(|view| view.name == name)
    }

    /* Hashes of global constants referenced anywhere in the script */
    pub fn constants(&self) -> Vec<String> {
        let mut out = Vec::new();
        for section in &self.sections {
            collect_constants(section, &mut out);
        }
        out
    }
}
