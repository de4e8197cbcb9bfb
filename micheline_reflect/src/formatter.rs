/* Single-line Michelson text rendering of untyped nodes */

use micheline_types::Node;

pub fn to_michelson(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, false);
    out
}

fn write_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/* `wrap` is set for arguments, where applications need parentheses */
fn write_node(out: &mut String, node: &Node, wrap: bool) {
    match node {
        Node::Int(value) => out.push_str(&value.to_string()),
        Node::String(value) => write_string(out, value),
        Node::Bytes(value) => {
            out.push_str("0x");
            out.push_str(&hex::encode(value));
        }
        Node::Seq(items) => {
            if items.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(" ; ");
                }
                write_node(out, item, false);
            }
            out.push_str(" }");
        }
        Node::Prim(prim) => {
            let needs_parens = wrap && (!prim.args.is_empty() || !prim.annots.is_empty());
            if needs_parens {
                out.push('(');
            }
            out.push_str(&prim.prim);
            for annot in &prim.annots {
                out.push(' ');
                out.push_str(annot);
            }
            for arg in &prim.args {
                out.push(' ');
                write_node(out, arg, true);
            }
            if needs_parens {
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use micheline_types::parse_untyped;

    fn render(json: &str) -> String {
        let nodes = parse_untyped(json).unwrap();
        to_michelson(&nodes[0])
    }

    #[test]
    fn renders_types_with_annotations() {
        assert_eq!(
            render(r#"{"prim":"pair","args":[{"prim":"address","annots":["%owner"]},{"prim":"option","args":[{"prim":"nat"}]}]}"#),
            "pair (address %owner) (option nat)"
        );
    }

    #[test]
    fn renders_code_sequences() {
        assert_eq!(
            render(r#"[[{"prim":"DROP"},{"prim":"PUSH","args":[{"prim":"nat"},{"int":"1"}]},{"prim":"NIL","args":[{"prim":"operation"}]}]]"#),
            "{ DROP ; PUSH nat 1 ; NIL operation }"
        );
        assert_eq!(render("[[]]"), "{}");
    }

    #[test]
    fn escapes_strings_and_hex_bytes() {
        assert_eq!(
            render(r#"{"prim":"Pair","args":[{"string":"a\"b"},{"bytes":"cafe"}]}"#),
            r#"Pair "a\"b" 0xcafe"#
        );
    }
}
