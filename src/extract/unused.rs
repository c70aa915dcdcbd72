use super::{decode, load_stylesheet};
use crate::domain::CssResult;
use crate::parser::Rule;
use crate::patterns::{selector_fragments, strip_pseudo_selectors};

/// List class and id selector fragments that never appear in `html`.
///
/// This is a text search, not selector matching: `.name` is used when
/// `class="name"` or `class='name'` occurs in the document, `#name` likewise
/// with `id=`. Type selectors are always assumed to be used. Only top-level
/// rules are considered.
pub fn extract_unused_selectors(css: impl AsRef<[u8]>, html: &str) -> CssResult<Vec<String>> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    let mut fragments: Vec<String> = Vec::new();
    for rule in &rules {
        let Rule::Qualified(rule) = rule else { continue };

        let base = strip_pseudo_selectors(rule.selector_text());
        for fragment in selector_fragments(&base) {
            if !fragments.iter().any(|seen| seen == fragment) {
                fragments.push(fragment.to_string());
            }
        }
    }

    Ok(fragments.into_iter().filter(|fragment| !is_referenced(fragment, html)).collect())
}

fn is_referenced(fragment: &str, html: &str) -> bool {
    let (attribute, name) = if let Some(class) = fragment.strip_prefix('.') {
        ("class", class)
    } else if let Some(id) = fragment.strip_prefix('#') {
        ("id", id)
    } else {
        return true;
    };

    html.contains(&format!("{attribute}=\"{name}\"")) || html.contains(&format!("{attribute}='{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_class() {
        let unused =
            extract_unused_selectors(".used{} .unused{}", "<div class=\"used\"></div>").unwrap();
        assert_eq!(unused, vec![".unused"]);
    }

    #[test]
    fn test_ids_and_single_quotes() {
        let html = "<main id='app'><p class='lead'></p></main>";
        let unused = extract_unused_selectors("#app {} #gone {} .lead {}", html).unwrap();
        assert_eq!(unused, vec!["#gone"]);
    }

    #[test]
    fn test_pseudo_selectors_and_combinators() {
        let css = ".nav > .item:hover, .nav + .extra::before {} ul li.active ~ .sib:nth-child(2n) {}";
        let html = r#"<nav class="nav"><a class="item"></a></nav>"#;
        let unused = extract_unused_selectors(css, html).unwrap();
        assert_eq!(unused, vec![".extra", ".sib"]);
    }

    #[test]
    fn test_type_selectors_are_assumed_used() {
        let unused = extract_unused_selectors("body {} h1 {} article p {}", "").unwrap();
        assert!(unused.is_empty());
    }

    #[test]
    fn test_fragments_are_deduplicated() {
        let unused = extract_unused_selectors(".x {} .x:hover {} .x .x {}", "").unwrap();
        assert_eq!(unused, vec![".x"]);
    }

    #[test]
    fn test_nested_rules_are_not_scanned() {
        let unused = extract_unused_selectors("@media print { .hidden {} }", "").unwrap();
        assert!(unused.is_empty());
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(extract_unused_selectors(".a {", "").is_err());
    }
}
