//! Annotation helpers
//!
//! Annotations carry a one-character sigil: `%` field name, `:` type name,
//! `@` variable name. Only well-formed annotations take part in naming.

pub const FIELD_SIGIL: char = '%';
pub const TYPE_SIGIL: char = ':';
pub const VAR_SIGIL: char = '@';

/// A well-formed annotation is a sigil followed by at least one of `[A-Za-z0-9_.%@]`.
pub fn is_valid(annot: &str) -> bool {
    let mut chars = annot.chars();
    match chars.next() {
        Some(FIELD_SIGIL) | Some(TYPE_SIGIL) | Some(VAR_SIGIL) => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '%' | '@'))
}

/// Drops malformed and empty annotations.
pub fn filter_valid(annots: &[String]) -> Vec<String> {
    annots.iter().filter(|a| is_valid(a)).cloned().collect()
}

fn first_with_sigil(annots: &[String], sigil: char) -> Option<&str> {
    annots
        .iter()
        .filter(|a| is_valid(a))
        .find(|a| a.starts_with(sigil))
        .map(|a| &a[sigil.len_utf8()..])
}

/// First `%` annotation without its sigil.
pub fn field_name(annots: &[String]) -> Option<&str> {
    first_with_sigil(annots, FIELD_SIGIL)
}

/// First `:` annotation without its sigil.
pub fn type_name(annots: &[String]) -> Option<&str> {
    first_with_sigil(annots, TYPE_SIGIL)
}

/// First `@` annotation without its sigil.
pub fn var_name(annots: &[String]) -> Option<&str> {
    first_with_sigil(annots, VAR_SIGIL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annots(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_first_matching_annotation() {
        let list = annots(&[":token", "%from", "%to", "@var"]);
        assert_eq!(field_name(&list), Some("from"));
        assert_eq!(type_name(&list), Some("token"));
        assert_eq!(var_name(&list), Some("var"));
    }

    #[test]
    fn ignores_empty_and_malformed() {
        let list = annots(&["%", "%bad name", "owner", "%ok"]);
        assert_eq!(field_name(&list), Some("ok"));
        assert_eq!(filter_valid(&list), annots(&["%ok"]));
        assert_eq!(type_name(&list), None);
    }
}
