/* JSON Schema generation and decoding of form submissions */

use chrono::DateTime;
use micheline_reflect::{AstError, SchemaOptions, TypedAst, ValueForm};
use serde_json::{json, Value as JsonValue};

fn options() -> SchemaOptions {
    SchemaOptions {
        now: DateTime::from_timestamp(1569495591, 0).unwrap(),
    }
}

fn schema_of(type_json: &str) -> JsonValue {
    let ast = TypedAst::from_type_json(type_json).unwrap();
    serde_json::to_value(ast.to_json_schema(&options()).unwrap()).unwrap()
}

/* Settles the type with the example submission of its own schema */
fn settle_default(type_json: &str) -> JsonValue {
    let mut ast = TypedAst::from_type_json(type_json).unwrap();
    let submission = ast.to_json_schema(&options()).unwrap().default_submission();
    ast.from_json_schema(&submission)
        .unwrap_or_else(|e| panic!("{} from {}: {}", type_json, submission, e));
    ast.to_json(ValueForm::Preserve).unwrap()
}

fn settle_with(type_json: &str, submission: JsonValue) -> Result<JsonValue, AstError> {
    let mut ast = TypedAst::from_type_json(type_json)?;
    ast.from_json_schema(&submission)?;
    ast.to_json(ValueForm::Preserve)
}

#[test]
fn scalar_root_is_wrapped_under_its_name() {
    assert_eq!(
        schema_of(r#"{"prim":"nat","annots":["%amount"]}"#),
        json!({
            "type": "object",
            "title": "amount",
            "prim": "nat",
            "properties": {
                "amount": {"type": "integer", "title": "amount", "prim": "nat", "default": 0}
            },
            "required": ["amount"]
        })
    );
    assert_eq!(
        settle_default(r#"{"prim":"nat","annots":["%amount"]}"#),
        json!({"int": "0"})
    );
}

#[test]
fn string_and_bool_defaults() {
    assert_eq!(settle_default(r#"{"prim":"string"}"#), json!({"string": ""}));
    assert_eq!(settle_default(r#"{"prim":"bool"}"#), json!({"prim": "False"}));
    assert_eq!(settle_default(r#"{"prim":"int"}"#), json!({"int": "0"}));
}

#[test]
fn address_has_fixed_length() {
    let schema = schema_of(r#"{"prim":"address","annots":["%to"]}"#);
    let to = &schema["properties"]["to"];
    assert_eq!(to["minLength"], json!(36));
    assert_eq!(to["maxLength"], json!(36));
    assert_eq!(to["type"], json!("string"));
}

#[test]
fn invalid_address_submission_fails_validation() {
    let err = settle_with(
        r#"{"prim":"address","annots":["%to"]}"#,
        json!({"to": "tz1notanaddress"}),
    )
    .unwrap_err();
    assert!(matches!(err, AstError::Forge(_)));

    let ok = settle_with(
        r#"{"prim":"address","annots":["%to"]}"#,
        json!({"to": "tz1eLWfccL46VAUjtyz9kEKgzuKnwyZH4rTA"}),
    )
    .unwrap();
    assert_eq!(ok, json!({"string": "tz1eLWfccL46VAUjtyz9kEKgzuKnwyZH4rTA"}));
}

#[test]
fn l2_address_submission_is_checked() {
    let ty = r#"{"prim":"tx_rollup_l2_address","annots":["%to"]}"#;
    let err = settle_with(ty, json!({"to": "not an address"})).unwrap_err();
    assert!(matches!(err, AstError::Forge(_)));

    let err = settle_with(ty, json!({"to": "tz1eLWfccL46VAUjtyz9kEKgzuKnwyZH4rTA"})).unwrap_err();
    assert!(matches!(err, AstError::Forge(_)));

    let ok = settle_with(ty, json!({"to": "tz491FasxEbqzR2SfjgTPnRyw9JY7og2HZUA"})).unwrap();
    assert_eq!(ok, json!({"string": "tz491FasxEbqzR2SfjgTPnRyw9JY7og2HZUA"}));
}

#[test]
fn timestamp_defaults_to_now() {
    let ty = r#"{"prim":"timestamp","annots":["%at"]}"#;
    let schema = schema_of(ty);
    assert_eq!(schema["properties"]["at"]["default"], json!("2019-09-26T10:59:51Z"));
    assert_eq!(schema["properties"]["at"]["format"], json!("date-time"));
    assert_eq!(
        settle_default(ty),
        json!({"string": "2019-09-26T10:59:51Z"})
    );
}

#[test]
fn pair_members_become_properties() {
    let ty = r#"{"prim":"pair","args":[{"prim":"string","annots":["%name"]},{"prim":"pair","args":[{"prim":"nat","annots":["%age"]},{"prim":"unit","annots":["%nothing"]}]}]}"#;
    let schema = schema_of(ty);
    let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["name", "age"]);

    assert_eq!(
        settle_with(ty, json!({"name": "alice", "age": 30})).unwrap(),
        json!({"prim":"Pair","args":[{"string":"alice"},{"prim":"Pair","args":[{"int":"30"},{"prim":"Unit"}]}]})
    );
    assert_eq!(
        settle_default(ty),
        json!({"prim":"Pair","args":[{"string":""},{"prim":"Pair","args":[{"int":"0"},{"prim":"Unit"}]}]})
    );
}

#[test]
fn option_is_none_or_some() {
    let ty = r#"{"prim":"option","args":[{"prim":"nat"}],"annots":["%limit"]}"#;
    let schema = schema_of(ty);
    assert_eq!(schema["oneOf"].as_array().unwrap().len(), 2);
    assert_eq!(schema["oneOf"][0]["properties"]["schemaKey"]["const"], json!("none"));

    assert_eq!(settle_default(ty), json!({"prim": "None"}));
    assert_eq!(
        settle_with(ty, json!({"schemaKey": "some", "@nat_1": 5})).unwrap(),
        json!({"prim":"Some","args":[{"int":"5"}]})
    );
}

#[test]
fn nested_ors_flatten_into_one_of() {
    let ty = r#"{"prim":"or","args":[{"prim":"nat","annots":["%a"]},{"prim":"or","args":[{"prim":"string","annots":["%b"]},{"prim":"unit","annots":["%c"]}]}]}"#;
    let schema = schema_of(ty);
    let keys: Vec<JsonValue> = schema["oneOf"]
        .as_array()
        .unwrap()
        .iter()
        .map(|branch| branch["properties"]["schemaKey"]["const"].clone())
        .collect();
    assert_eq!(keys, vec![json!("0"), json!("10"), json!("11")]);

    assert_eq!(settle_default(ty), json!({"prim":"Left","args":[{"int":"0"}]}));
    assert_eq!(
        settle_with(ty, json!({"schemaKey": "10", "b": "hi"})).unwrap(),
        json!({"prim":"Right","args":[{"prim":"Left","args":[{"string":"hi"}]}]})
    );
    assert_eq!(
        settle_with(ty, json!({"schemaKey": "11"})).unwrap(),
        json!({"prim":"Right","args":[{"prim":"Right","args":[{"prim":"Unit"}]}]})
    );
    assert!(matches!(
        settle_with(ty, json!({"schemaKey": "2"})),
        Err(AstError::InvalidSchemaData(_))
    ));
}

#[test]
fn map_is_an_array_of_entries() {
    let ty = r#"{"prim":"map","args":[{"prim":"nat"},{"prim":"string"}]}"#;
    let schema = schema_of(ty);
    let entry = &schema["properties"]["@map_0"]["items"];
    assert_eq!(entry["required"], json!(["@nat_1", "@string_2"]));

    assert_eq!(settle_default(ty), json!([]));
    assert_eq!(
        settle_with(ty, json!({"@map_0": [{"@nat_1": 2, "@string_2": "b"}, {"@nat_1": 1, "@string_2": "a"}]}))
            .unwrap(),
        json!([
            {"prim":"Elt","args":[{"int":"1"},{"string":"a"}]},
            {"prim":"Elt","args":[{"int":"2"},{"string":"b"}]}
        ])
    );
}

#[test]
fn list_items_use_element_schema() {
    let ty = r#"{"prim":"list","args":[{"prim":"nat"}],"annots":["%xs"]}"#;
    let schema = schema_of(ty);
    assert_eq!(schema["properties"]["xs"]["type"], json!("array"));
    assert_eq!(schema["properties"]["xs"]["items"]["type"], json!("integer"));
    assert_eq!(
        settle_with(ty, json!({"xs": [1, "2"]})).unwrap(),
        json!([{"int":"1"},{"int":"2"}])
    );
}

#[test]
fn lambda_is_micheline_text() {
    let ty = r#"{"prim":"lambda","args":[{"prim":"unit"},{"prim":"unit"}],"annots":["%f"]}"#;
    assert_eq!(
        settle_with(ty, json!({"f": r#"[{"prim":"UNIT"},{"prim":"DROP"}]"#})).unwrap(),
        json!([{"prim":"UNIT"},{"prim":"DROP"}])
    );
    assert_eq!(
        settle_with(ty, json!({"f": r#"{"prim":"FAILWITH"}"#})).unwrap(),
        json!([{"prim":"FAILWITH"}])
    );
}

#[test]
fn malformed_submissions_are_rejected() {
    let ty = r#"{"prim":"pair","args":[{"prim":"nat","annots":["%a"]},{"prim":"nat","annots":["%b"]}]}"#;
    assert!(matches!(
        settle_with(ty, json!({"a": 1})),
        Err(AstError::InvalidSchemaData(_))
    ));
    assert!(matches!(
        settle_with(ty, json!({"a": "x", "b": 1})),
        Err(AstError::InvalidSchemaData(_))
    ));
    assert!(matches!(
        settle_with(ty, json!({"a": -1, "b": 1})),
        Err(AstError::Validation { .. })
    ));
}
