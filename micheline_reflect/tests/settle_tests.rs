/* Settling values into type trees and projecting them back */

use micheline_forge::{forge_nodes, pack};
use micheline_reflect::{AstError, TypedAst, ValueForm};
use micheline_types::parse_untyped;
use serde_json::{json, Value as JsonValue};
use std::cmp::Ordering;

const ADDRESS: &str = "tz1eLWfccL46VAUjtyz9kEKgzuKnwyZH4rTA";

fn settled(type_json: &str, value_json: &str) -> TypedAst {
    TypedAst::settled_from_json(type_json, value_json)
        .unwrap_or_else(|e| panic!("settle {}: {}", value_json, e))
}

fn json_of(text: &str) -> JsonValue {
    serde_json::from_str(text).expect("json")
}

const TRIPLE: &str = r#"{"prim":"pair","args":[{"prim":"nat"},{"prim":"nat"},{"prim":"nat"}]}"#;

#[test]
fn flat_comb_reforges_byte_identical() {
    let value = r#"{"prim":"Pair","args":[{"int":"1"},{"int":"2"},{"int":"3"}]}"#;
    let ast = settled(TRIPLE, value);
    let original = forge_nodes(&parse_untyped(value).unwrap()).unwrap();
    assert_eq!(ast.forge().unwrap(), original);
    assert_eq!(ast.to_json(ValueForm::Preserve).unwrap(), json_of(value));
}

#[test]
fn readable_form_nests_binary_pairs() {
    let ast = settled(
        TRIPLE,
        r#"{"prim":"Pair","args":[{"int":"1"},{"int":"2"},{"int":"3"}]}"#,
    );
    assert_eq!(
        ast.to_json(ValueForm::Readable).unwrap(),
        json!({"prim":"Pair","args":[{"int":"1"},{"prim":"Pair","args":[{"int":"2"},{"int":"3"}]}]})
    );
}

#[test]
fn sequence_comb_and_nested_pairs_keep_their_shape() {
    let seq = r#"[[{"int":"1"},{"int":"2"},{"int":"3"}]]"#;
    let ast = settled(TRIPLE, seq);
    assert_eq!(
        ast.to_json(ValueForm::Preserve).unwrap(),
        json!([{"int":"1"},{"int":"2"},{"int":"3"}])
    );

    let nested = r#"{"prim":"Pair","args":[{"int":"1"},{"prim":"Pair","args":[{"int":"2"},{"int":"3"}]}]}"#;
    let ast = settled(TRIPLE, nested);
    assert_eq!(ast.to_json(ValueForm::Preserve).unwrap(), json_of(nested));
}

#[test]
fn top_level_value_list_is_absorbed_by_a_pair_root() {
    let ty = r#"{"prim":"pair","args":[{"prim":"nat"},{"prim":"string"}]}"#;
    let ast = settled(ty, r#"[{"int":"1"},{"string":"a"}]"#);
    assert_eq!(
        ast.to_json(ValueForm::Preserve).unwrap(),
        json!([{"int":"1"},{"string":"a"}])
    );
}

#[test]
fn arity_mismatch_fails_instead_of_truncating() {
    let ty = r#"{"prim":"pair","args":[{"prim":"nat"},{"prim":"nat"}]}"#;
    let mut ast = TypedAst::from_type_json(ty).unwrap();
    let err = ast
        .settle_json(r#"{"prim":"Pair","args":[{"int":"1"}]}"#)
        .unwrap_err();
    assert!(matches!(err, AstError::TreesAreDifferent(_)));
    assert!(!ast.is_settled());

    let mut two_roots = TypedAst::from_type_json(r#"[{"prim":"nat"},{"prim":"nat"}]"#).unwrap();
    let err = two_roots
        .settle_json(r#"[{"int":"1"},{"int":"2"},{"int":"3"}]"#)
        .unwrap_err();
    assert!(matches!(err, AstError::TreesAreDifferent(_)));

    let mut ast = TypedAst::from_type_json(ty).unwrap();
    let err = ast
        .settle_json(r#"{"prim":"Pair","args":[{"int":"1"},{"int":"2"},{"int":"3"}]}"#)
        .unwrap_err();
    assert!(matches!(err, AstError::TreesAreDifferent(_)));

    let err = ast
        .settle_json(r#"[{"int":"1"},{"int":"2"},{"int":"3"}]"#)
        .unwrap_err();
    assert!(matches!(err, AstError::TreesAreDifferent(_)));
    assert!(!ast.is_settled());

    let nested = r#"{"prim":"pair","args":[{"prim":"nat"},{"prim":"pair","args":[{"prim":"nat"},{"prim":"nat"}]}]}"#;
    let mut ast = TypedAst::from_type_json(nested).unwrap();
    let err = ast
        .settle_json(r#"{"prim":"Pair","args":[{"int":"1"},{"int":"2"},{"int":"3"},{"int":"4"}]}"#)
        .unwrap_err();
    assert!(matches!(err, AstError::TreesAreDifferent(_)));
}

#[test]
fn failed_settle_keeps_previous_value() {
    let mut ast = settled(r#"{"prim":"nat"}"#, r#"{"int":"5"}"#);
    assert!(ast.settle_json(r#"{"string":"five"}"#).is_err());
    assert_eq!(ast.to_json(ValueForm::Preserve).unwrap(), json!({"int":"5"}));
}

#[test]
fn wrong_value_primitive_is_invalid_prim() {
    let mut ast = TypedAst::from_type_json(r#"{"prim":"or","args":[{"prim":"nat"},{"prim":"unit"}]}"#).unwrap();
    let err = ast.settle_json(r#"{"prim":"Some","args":[{"int":"1"}]}"#).unwrap_err();
    assert!(matches!(err, AstError::InvalidPrim { .. }));
}

#[test]
fn negative_nat_is_rejected() {
    let mut ast = TypedAst::from_type_json(r#"{"prim":"nat"}"#).unwrap();
    assert!(matches!(
        ast.settle_json(r#"{"int":"-1"}"#),
        Err(AstError::Validation { .. })
    ));
}

#[test]
fn projection_requires_settled_tree() {
    let ast = TypedAst::from_type_json(r#"{"prim":"nat"}"#).unwrap();
    assert_eq!(
        ast.to_json(ValueForm::Preserve),
        Err(AstError::TreeIsNotSettled)
    );
    assert_eq!(ast.forge(), Err(AstError::TreeIsNotSettled));
}

#[test]
fn or_and_option_settle_their_branch() {
    let ty = r#"{"prim":"or","args":[{"prim":"nat","annots":["%a"]},{"prim":"option","args":[{"prim":"string"}],"annots":["%b"]}]}"#;
    let value = r#"{"prim":"Right","args":[{"prim":"Some","args":[{"string":"hi"}]}]}"#;
    let ast = settled(ty, value);
    assert_eq!(ast.to_json(ValueForm::Preserve).unwrap(), json_of(value));

    let none = r#"{"prim":"Right","args":[{"prim":"None"}]}"#;
    let ast = settled(ty, none);
    assert_eq!(ast.to_json(ValueForm::Preserve).unwrap(), json_of(none));
}

#[test]
fn set_is_sorted_and_deduplicated() {
    let ast = settled(
        r#"{"prim":"set","args":[{"prim":"nat"}]}"#,
        r#"[{"int":"3"},{"int":"1"},{"int":"3"},{"int":"2"}]"#,
    );
    assert_eq!(
        ast.to_json(ValueForm::Preserve).unwrap(),
        json!([{"int":"1"},{"int":"2"},{"int":"3"}])
    );
}

#[test]
fn list_root_takes_explicit_sequence() {
    let ast = settled(
        r#"{"prim":"list","args":[{"prim":"string"}]}"#,
        r#"[[{"string":"b"},{"string":"a"}]]"#,
    );
    assert_eq!(
        ast.to_json(ValueForm::Preserve).unwrap(),
        json!([{"string":"b"},{"string":"a"}])
    );
}

#[test]
fn big_map_pointer_settles_directly() {
    let ast = settled(
        r#"{"prim":"big_map","args":[{"prim":"nat"},{"prim":"string"}]}"#,
        r#"{"int":"42"}"#,
    );
    assert_eq!(ast.big_map_pointers(), vec![42]);
    assert_eq!(ast.to_json(ValueForm::Preserve).unwrap(), json!({"int":"42"}));
}

#[test]
fn lambda_keeps_its_code() {
    let code = r#"[[{"prim":"DROP"},{"prim":"UNIT"}]]"#;
    let ast = settled(
        r#"{"prim":"lambda","args":[{"prim":"nat"},{"prim":"unit"}]}"#,
        code,
    );
    assert_eq!(
        ast.to_json(ValueForm::Preserve).unwrap(),
        json!([{"prim":"DROP"},{"prim":"UNIT"}])
    );
}

#[test]
fn timestamps_switch_between_forms() {
    let ast = settled(r#"{"prim":"timestamp"}"#, r#"{"int":"1569495591"}"#);
    assert_eq!(
        ast.to_json(ValueForm::Readable).unwrap(),
        json!({"string":"2019-09-26T10:59:51Z"})
    );

    let ast = settled(r#"{"prim":"timestamp"}"#, r#"{"string":"2019-09-26T10:59:51Z"}"#);
    assert_eq!(
        ast.to_json(ValueForm::Optimized).unwrap(),
        json!({"int":"1569495591"})
    );
}

#[test]
fn address_text_and_bytes_settle_to_equal_values() {
    let ty = r#"{"prim":"address"}"#;
    let text = settled(ty, &format!(r#"{{"string":"{}"}}"#, ADDRESS));
    let optimized = text.to_json(ValueForm::Optimized).unwrap();
    assert!(optimized.get("bytes").is_some());

    let mut bytes = TypedAst::from_type_json(ty).unwrap();
    bytes.settle_value(&optimized).unwrap();
    assert_eq!(text.compare(&bytes).unwrap(), Ordering::Equal);
    assert_eq!(
        bytes.to_json(ValueForm::Readable).unwrap(),
        json!({"string": ADDRESS})
    );
}

#[test]
fn packed_value_settles_back() {
    let ty = r#"{"prim":"pair","args":[{"prim":"string"},{"prim":"int"}]}"#;
    let ast = settled(ty, r#"{"prim":"Pair","args":[{"string":"abc"},{"int":"-900"}]}"#);
    let packed = ast.pack().unwrap();
    assert_eq!(packed[0], 0x05);

    let mut restored = TypedAst::from_type_json(ty).unwrap();
    restored.settle_packed(&packed).unwrap();
    assert_eq!(restored.compare(&ast).unwrap(), Ordering::Equal);

    let mut from_bytes = TypedAst::from_type_json(ty).unwrap();
    from_bytes.settle_bytes(&packed[1..]).unwrap();
    assert_eq!(from_bytes, restored);
    assert_eq!(pack(&parse_untyped(r#"{"prim":"Pair","args":[{"string":"abc"},{"int":"-900"}]}"#).unwrap()[0]).unwrap(), packed);
}
