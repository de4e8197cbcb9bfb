/* Structural ordering and the ordered map built on it */

use micheline_reflect::{AstError, NodeKind, OrderedMap, TypedAst, TypedNode, ValueForm};
use micheline_types::{parse_untyped, Node};
use serde_json::json;
use std::cmp::Ordering;

fn typed(json: &str) -> TypedNode {
    TypedNode::from_type(&parse_untyped(json).unwrap()[0]).unwrap()
}

fn value(template: &TypedNode, value: Node) -> TypedNode {
    let mut node = template.clone();
    node.parse_value(&value).unwrap();
    node
}

fn cmp(type_json: &str, a: &str, b: &str) -> Ordering {
    let left = TypedAst::settled_from_json(type_json, a).unwrap();
    let right = TypedAst::settled_from_json(type_json, b).unwrap();
    left.compare(&right).unwrap()
}

#[test]
fn ordered_map_keeps_keys_ascending_and_replaces_equal_keys() {
    let key = typed(r#"{"prim":"nat"}"#);
    let val = typed(r#"{"prim":"string"}"#);
    let mut map = OrderedMap::new();
    for (k, v) in [(10, "a"), (9, "b"), (2, "c"), (4, "d"), (4, "e")] {
        map.add(value(&key, Node::int(k)), value(&val, Node::string(v)))
            .unwrap();
    }

    assert_eq!(map.len(), 4);
    let keys: Vec<String> = map
        .keys()
        .map(|k| k.to_untyped(ValueForm::Preserve).unwrap())
        .map(|n| n.to_json_value()["int"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["2", "4", "9", "10"]);

    let four = map.get(&value(&key, Node::int(4))).unwrap().unwrap();
    assert_eq!(
        four.to_untyped(ValueForm::Preserve).unwrap(),
        Node::string("e")
    );
}

#[test]
fn ordered_map_remove_and_range() {
    let key = typed(r#"{"prim":"string"}"#);
    let val = typed(r#"{"prim":"unit"}"#);
    let unit = value(&val, Node::prim("Unit"));
    let mut map = OrderedMap::new();
    for k in ["b", "a", "c"] {
        map.add(value(&key, Node::string(k)), unit.clone()).unwrap();
    }
    assert!(map.remove(&value(&key, Node::string("b"))).unwrap().is_some());
    assert!(map.remove(&value(&key, Node::string("z"))).unwrap().is_none());

    let mut visited = Vec::new();
    map.range(|k, _| {
        visited.push(k.to_untyped(ValueForm::Preserve).unwrap());
        false
    });
    assert_eq!(visited, vec![Node::string("a")]);
}

#[test]
fn map_values_are_keyed_by_compare() {
    let ty = r#"{"prim":"map","args":[{"prim":"address"},{"prim":"nat"}]}"#;
    let ast = TypedAst::settled_from_json(
        ty,
        r#"[{"prim":"Elt","args":[{"string":"tz1eLWfccL46VAUjtyz9kEKgzuKnwyZH4rTA"},{"int":"1"}]},{"prim":"Elt","args":[{"bytes":"0000cd1a410ffd5315ded34337f5f76edff48a13999a"},{"int":"2"}]}]"#,
    )
    .unwrap();
    match &ast.nodes()[0].kind {
        NodeKind::Map { data, .. } => assert_eq!(data.len(), 1),
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn scalars_order_naturally() {
    assert_eq!(cmp(r#"{"prim":"int"}"#, r#"{"int":"-5"}"#, r#"{"int":"3"}"#), Ordering::Less);
    assert_eq!(
        cmp(r#"{"prim":"string"}"#, r#"{"string":"b"}"#, r#"{"string":"a"}"#),
        Ordering::Greater
    );
    assert_eq!(
        cmp(r#"{"prim":"bytes"}"#, r#"{"bytes":"00ff"}"#, r#"{"bytes":"0100"}"#),
        Ordering::Less
    );
    assert_eq!(cmp(r#"{"prim":"bool"}"#, r#"{"prim":"False"}"#, r#"{"prim":"True"}"#), Ordering::Less);
    assert_eq!(
        cmp(
            r#"{"prim":"timestamp"}"#,
            r#"{"string":"2019-09-26T10:59:51Z"}"#,
            r#"{"int":"1569495591"}"#
        ),
        Ordering::Equal
    );
}

#[test]
fn composites_order_lexicographically() {
    let pair = r#"{"prim":"pair","args":[{"prim":"nat"},{"prim":"string"}]}"#;
    assert_eq!(
        cmp(
            pair,
            r#"{"prim":"Pair","args":[{"int":"1"},{"string":"z"}]}"#,
            r#"{"prim":"Pair","args":[{"int":"2"},{"string":"a"}]}"#
        ),
        Ordering::Less
    );

    let or = r#"{"prim":"or","args":[{"prim":"nat"},{"prim":"nat"}]}"#;
    assert_eq!(
        cmp(
            or,
            r#"{"prim":"Right","args":[{"int":"0"}]}"#,
            r#"{"prim":"Left","args":[{"int":"9"}]}"#
        ),
        Ordering::Greater
    );

    let option = r#"{"prim":"option","args":[{"prim":"nat"}]}"#;
    assert_eq!(
        cmp(option, r#"{"prim":"None"}"#, r#"{"prim":"Some","args":[{"int":"0"}]}"#),
        Ordering::Less
    );
}

#[test]
fn mismatched_types_are_not_comparable() {
    let a = TypedAst::settled_from_json(r#"{"prim":"nat"}"#, r#"{"int":"1"}"#).unwrap();
    let b = TypedAst::settled_from_json(r#"{"prim":"string"}"#, r#"{"string":"1"}"#).unwrap();
    assert!(matches!(
        a.compare(&b),
        Err(AstError::TypeIsNotComparable { .. })
    ));

    let unsettled = TypedAst::from_type_json(r#"{"prim":"nat"}"#).unwrap();
    assert_eq!(a.compare(&unsettled), Err(AstError::TreeIsNotSettled));
}

#[test]
fn collections_are_not_comparable() {
    let ty = r#"{"prim":"list","args":[{"prim":"nat"}]}"#;
    let a = TypedAst::settled_from_json(ty, r#"[[{"int":"1"}]]"#).unwrap();
    assert!(a.compare(&a.clone()).is_err());
    assert_eq!(
        a.to_json(ValueForm::Preserve).unwrap(),
        json!([{"int":"1"}])
    );
}
