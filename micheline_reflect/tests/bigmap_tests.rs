/* Big-map enrichment from forged key/value diffs */

use micheline_forge::encoding::forge_address;
use micheline_forge::forge;
use micheline_reflect::{AstError, BigMapDiff, NodeKind, TypedAst, ValueForm};
use micheline_types::Node;
use serde_json::json;

const LEDGER: &str = r#"{"prim":"pair","args":[{"prim":"big_map","args":[{"prim":"nat"},{"prim":"string"}],"annots":["%ledger"]},{"prim":"nat","annots":["%total"]}]}"#;

fn forged(node: Node) -> Vec<u8> {
    forge(&node).unwrap()
}

fn ledger(ptr: i64) -> TypedAst {
    TypedAst::settled_from_json(
        LEDGER,
        &format!(r#"{{"prim":"Pair","args":[{{"int":"{}"}},{{"int":"100"}}]}}"#, ptr),
    )
    .unwrap()
}

#[test]
fn diffs_insert_update_and_remove_keys() {
    let mut ast = ledger(17);
    assert_eq!(ast.big_map_pointers(), vec![17]);

    let diffs = vec![
        BigMapDiff::update(17, forged(Node::int(1)), forged(Node::string("one"))),
        BigMapDiff::update(17, forged(Node::int(2)), forged(Node::string("two"))),
        BigMapDiff::update(17, forged(Node::int(1)), forged(Node::string("uno"))),
        BigMapDiff::remove(17, forged(Node::int(2))),
        BigMapDiff::update(99, forged(Node::int(5)), forged(Node::string("elsewhere"))),
    ];
    assert_eq!(ast.enrich_big_maps(&diffs).unwrap(), 4);
    assert_eq!(
        ast.to_json(ValueForm::Preserve).unwrap(),
        json!({"prim":"Pair","args":[
            [{"prim":"Elt","args":[{"int":"1"},{"string":"uno"}]}],
            {"int":"100"}
        ]})
    );
}

#[test]
fn address_keys_collide_across_literal_forms() {
    let ty = r#"{"prim":"big_map","args":[{"prim":"address"},{"prim":"nat"}]}"#;
    let mut ast = TypedAst::settled_from_json(ty, r#"{"int":"3"}"#).unwrap();
    let address = "tz1eLWfccL46VAUjtyz9kEKgzuKnwyZH4rTA";
    let diffs = vec![
        BigMapDiff::update(
            3,
            forged(Node::bytes(forge_address(address).unwrap())),
            forged(Node::int(1)),
        ),
        BigMapDiff::update(3, forged(Node::string(address)), forged(Node::int(2))),
    ];
    assert_eq!(ast.enrich_big_maps(&diffs).unwrap(), 2);
    match &ast.nodes()[0].kind {
        NodeKind::BigMap { data, .. } => assert_eq!(data.len(), 1),
        other => panic!("expected big_map, got {:?}", other),
    }
}

#[test]
fn malformed_diff_leaves_tree_untouched() {
    let mut ast = ledger(17);
    let diffs = vec![
        BigMapDiff::update(17, forged(Node::int(1)), forged(Node::string("one"))),
        BigMapDiff::update(17, forged(Node::string("not a nat")), forged(Node::string("x"))),
    ];
    assert!(ast.enrich_big_maps(&diffs).is_err());
    assert_eq!(ast, ledger(17));
}

#[test]
fn enrichment_requires_settled_tree() {
    let mut ast = TypedAst::from_type_json(LEDGER).unwrap();
    assert_eq!(ast.enrich_big_maps(&[]), Err(AstError::TreeIsNotSettled));
}

#[test]
fn diff_records_serialize_as_hex() {
    let diff = BigMapDiff::update(17, vec![0x00, 0x01], vec![0x01, 0x00, 0x00, 0x00, 0x00]);
    let value = serde_json::to_value(&diff).unwrap();
    assert_eq!(value, json!({"ptr": 17, "key": "0001", "value": "0100000000"}));

    let removal: BigMapDiff = serde_json::from_value(json!({"ptr": 17, "key": "0x0001"})).unwrap();
    assert_eq!(removal, BigMapDiff::remove(17, vec![0x00, 0x01]));
}
