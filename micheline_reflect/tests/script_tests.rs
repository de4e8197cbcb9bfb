/* Contract script sections */

use micheline_reflect::{AstError, Script, ValueForm};
use serde_json::json;

fn sample_sections() -> serde_json::Value {
    json!([
        {"prim": "parameter", "args": [
            {"prim": "or", "args": [
                {"prim": "nat", "annots": ["%increment"]},
                {"prim": "nat", "annots": ["%decrement"]}
            ]}
        ]},
        {"prim": "storage", "args": [
            {"prim": "pair", "args": [
                {"prim": "nat", "annots": ["%counter"]},
                {"prim": "constant", "args": [{"string": "expruQN5r2umbZVHy6WynYM8f71F8zS4AERz9bugF8UkPBEqrHLuU8"}], "annots": ["%extra"]}
            ]}
        ]},
        {"prim": "code", "args": [[
            {"prim": "CDR"},
            {"prim": "NIL", "args": [{"prim": "operation"}]},
            {"prim": "PAIR"}
        ]]},
        {"prim": "view", "args": [
            {"string": "current"},
            {"prim": "unit"},
            {"prim": "nat"},
            [{"prim": "CDR"}, {"prim": "CAR"}]
        ]}
    ])
}

#[test]
fn sections_are_typed() {
    let script = Script::from_value(&sample_sections()).unwrap();
    assert_eq!(
        script.parameter_type().entrypoints(),
        vec!["increment", "decrement"]
    );
    assert!(script.storage_type().find_by_name("counter").is_some());
    assert_eq!(script.code.as_seq().map(|s| s.len()), Some(3));
}

#[test]
fn views_are_collected() {
    let script = Script::from_value(&sample_sections()).unwrap();
    assert_eq!(script.views.len(), 1);
    let view = script.view("current").unwrap();
    assert_eq!(view.return_type.type_json(), json!({"prim": "nat"}));
    assert!(script.view("missing").is_none());
}

#[test]
fn constants_are_listed_once() {
    let script = Script::from_value(&sample_sections()).unwrap();
    assert_eq!(
        script.constants(),
        vec!["expruQN5r2umbZVHy6WynYM8f71F8zS4AERz9bugF8UkPBEqrHLuU8".to_string()]
    );
}

#[test]
fn storage_values_settle_against_the_storage_type() {
    let script = Script::from_value(&sample_sections()).unwrap();
    let storage = script
        .storage_value(&json!({"prim": "Pair", "args": [{"int": "7"}, {"string": "anything"}]}))
        .unwrap();
    assert_eq!(
        storage.to_json(ValueForm::Preserve).unwrap(),
        json!({"prim": "Pair", "args": [{"int": "7"}, {"string": "anything"}]})
    );
    assert!(!script.storage_type().is_settled());
}

#[test]
fn rpc_script_object_is_accepted() {
    let wrapped = json!({"code": sample_sections(), "storage": {"int": "0"}});
    let script = Script::from_value(&wrapped).unwrap();
    assert_eq!(script.parameter_type().entrypoints().len(), 2);

    let text = serde_json::to_string(&sample_sections()).unwrap();
    assert_eq!(Script::from_json(&text).unwrap(), script);
}

#[test]
fn missing_sections_are_reported() {
    let mut sections = sample_sections();
    sections.as_array_mut().unwrap().remove(2);
    assert_eq!(
        Script::from_value(&sections),
        Err(AstError::MissingSection("code"))
    );

    let mut sections = sample_sections();
    sections.as_array_mut().unwrap().remove(0);
    assert_eq!(
        Script::from_value(&sections),
        Err(AstError::MissingSection("parameter"))
    );
}

#[test]
fn unknown_section_is_invalid() {
    let mut sections = sample_sections();
    sections
        .as_array_mut()
        .unwrap()
        .push(json!({"prim": "storage_extra", "args": []}));
    assert!(matches!(
        Script::from_value(&sections),
        Err(AstError::InvalidPrim { .. })
    ));
}
