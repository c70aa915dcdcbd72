use super::{decode, load_stylesheet};
use crate::domain::{ColorMap, CssResult};
use crate::parser::Rule;
use crate::patterns::{has_color_value, COLOR_PROPERTIES};

/// Collect color-bearing declarations per selector.
///
/// A declaration counts when its property is a color property or its value
/// holds a color literal. Matches are appended as `"property: value"`, without
/// deduplication. Rules inside at-rule bodies are keyed by their own selector;
/// bodies that hold no rules, such as `@font-face` or `@page`, contribute
/// nothing.
pub fn extract_colors(css: impl AsRef<[u8]>) -> CssResult<ColorMap> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    let mut colors = ColorMap::new();
    collect_colors(&rules, &mut colors);
    Ok(colors)
}

fn collect_colors(rules: &[Rule], colors: &mut ColorMap) {
    for rule in rules {
        match rule {
            Rule::Qualified(rule) => {
                for declaration in rule.declarations() {
                    if declaration.is_any_of(COLOR_PROPERTIES) || has_color_value(&declaration.value)
                    {
                        colors
                            .entry(rule.selector_text().to_string())
                            .or_default()
                            .push(format!("{}: {}", declaration.name, declaration.value));
                    }
                }
            }
            Rule::At(at_rule) if at_rule.body.is_some() => {
                collect_colors(&at_rule.nested_rules(), colors);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CssError;

    #[test]
    fn test_simple_color() {
        let colors = extract_colors(".a { color: red; }").unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[".a"], vec!["color: red"]);
    }

    #[test]
    fn test_color_property_or_value() {
        let css = r#"
            .btn {
                background-color: var(--brand);
                border: 1px solid #a1b2c3;
                fill: rgba(0, 0, 0, 0.5);
                stroke: blue;
                margin: 0;
            }
        "#;
        let colors = extract_colors(css).unwrap();
        assert_eq!(
            colors[".btn"],
            vec![
                "background-color: var(--brand)",
                "border: 1px solid #a1b2c3",
                "fill: rgba(0, 0, 0, 0.5)",
                "stroke: blue",
            ]
        );
    }

    #[test]
    fn test_matches_are_appended_not_deduplicated() {
        let colors = extract_colors(".a { color: red; } .a { color: red; }").unwrap();
        assert_eq!(colors[".a"], vec!["color: red", "color: red"]);
    }

    #[test]
    fn test_recurses_into_at_rules_without_prefixing() {
        let css = "@media screen { @supports (display: grid) { .g { color: #fff } } } .h { color: white }";
        let colors = extract_colors(css).unwrap();
        assert_eq!(colors[".g"], vec!["color: #fff"]);
        assert_eq!(colors[".h"], vec!["color: white"]);
    }

    #[test]
    fn test_important_marker_is_not_part_of_value() {
        let colors = extract_colors(".a { color: red !important }").unwrap();
        assert_eq!(colors[".a"], vec!["color: red"]);
    }

    #[test]
    fn test_no_colors() {
        let colors = extract_colors(".a { margin: 0 } @import url(x.css);").unwrap();
        assert!(colors.is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            extract_colors(".a { color: red;"),
            Err(CssError::UnbalancedBraces { .. })
        ));
        assert!(matches!(extract_colors(".a { color: red; } .b"), Err(CssError::Parse { .. })));
    }

    #[test]
    fn test_malformed_nested_rule_is_skipped() {
        let colors = extract_colors("@media screen { .x } .y { color: red }").unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[".y"], vec!["color: red"]);
    }

    #[test]
    fn test_declaration_only_at_rules() {
        let css = "@font-face { font-family: Inter; src: url(inter.woff2); }\nbody { font-family: Inter; color: red; }";
        let colors = extract_colors(css).unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors["body"], vec!["color: red"]);

        let colors = extract_colors("@page { margin: 1in; color: black; } .a { color: red; }").unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[".a"], vec!["color: red"]);
    }

    #[test]
    fn test_accepts_bytes() {
        let colors = extract_colors(b".a { color: red; }".to_vec()).unwrap();
        assert_eq!(colors[".a"], vec!["color: red"]);
    }
}
