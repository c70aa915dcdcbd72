use super::{decode, load_stylesheet};
use crate::domain::{CssError, CssResult, FontDeclaration, FontMap};
use crate::parser::{parse_rule_body, BodyItem, Rule};
use crate::patterns::FONT_PROPERTIES;

/// Collect font-related declarations per selector.
///
/// Nested rules inside a block are keyed by the parent selector joined with
/// their own (`.card .title`). At-rules never change the selector context,
/// whether they sit at the top level or inside a block.
pub fn extract_fonts(css: impl AsRef<[u8]>) -> CssResult<FontMap> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    let mut fonts = FontMap::new();
    collect_fonts(&rules, "", &mut fonts)?;
    Ok(fonts)
}

fn collect_fonts(rules: &[Rule], parent: &str, fonts: &mut FontMap) -> CssResult<()> {
    for rule in rules {
        match rule {
            Rule::Qualified(rule) => {
                let selector = combine_selectors(parent, rule.selector_text());
                collect_block(rule.items(), &selector, fonts)?;
            }
            Rule::At(at_rule) if at_rule.body.is_some() => {
                // Declaration-only bodies (`@font-face`, `@page`) hold no rules
                collect_fonts(&at_rule.nested_rules(), parent, fonts)?;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Walk one block: its own declarations first, then nested rules.
fn collect_block(items: Vec<BodyItem>, selector: &str, fonts: &mut FontMap) -> CssResult<()> {
    let mut found = Vec::new();
    let mut nested = Vec::new();

    for item in items {
        match item {
            BodyItem::Declaration(declaration) => {
                if declaration.is_any_of(FONT_PROPERTIES) {
                    found.push(FontDeclaration::new(declaration.name, declaration.value));
                }
            }
            BodyItem::Rule(rule) => nested.push(rule),
            BodyItem::Error(issue) => return Err(issue.to_error().in_context("in declaration")),
        }
    }

    if !found.is_empty() {
        fonts.entry(selector.to_string()).or_default().extend(found);
    }

    for rule in nested {
        match rule {
            Rule::Qualified(child) => {
                let child_selector = combine_selectors(selector, child.selector_text());
                collect_block(child.items(), &child_selector, fonts)?;
            }
            Rule::At(at_rule) => {
                if let Some(body) = &at_rule.body {
                    collect_block(parse_rule_body(body), selector, fonts)
                        .map_err(|e| CssError::nested(format!("@{}", at_rule.keyword), e))?;
                }
            }
            Rule::Error(issue) => return Err(issue.to_error()),
        }
    }

    Ok(())
}

fn combine_selectors(parent: &str, selector: &str) -> String {
    if parent.is_empty() {
        selector.to_string()
    } else {
        format!("{parent} {selector}").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_properties_only() {
        let css = r#"
            body { font-family: "Inter", sans-serif; color: #333; LINE-HEIGHT: 1.5 }
            h1 { font: bold 2em Georgia; margin: 0 }
            p { margin: 0 }
        "#;
        let fonts = extract_fonts(css).unwrap();
        assert_eq!(fonts.len(), 2);
        assert_eq!(
            fonts["body"],
            vec![
                FontDeclaration::new("font-family", "\"Inter\", sans-serif"),
                FontDeclaration::new("LINE-HEIGHT", "1.5"),
            ]
        );
        assert_eq!(fonts["h1"], vec![FontDeclaration::new("font", "bold 2em Georgia")]);
    }

    #[test]
    fn test_nested_rules_combine_selectors() {
        let css = ".card { font-size: 14px; .title { font-weight: 700; .icon { font-size: 10px } } }";
        let fonts = extract_fonts(css).unwrap();
        assert_eq!(fonts[".card"], vec![FontDeclaration::new("font-size", "14px")]);
        assert_eq!(fonts[".card .title"], vec![FontDeclaration::new("font-weight", "700")]);
        assert_eq!(fonts[".card .title .icon"], vec![FontDeclaration::new("font-size", "10px")]);
    }

    #[test]
    fn test_at_rules_keep_selector_context() {
        let css = r#"
            @media (max-width: 600px) { .a { font-size: 12px } }
            @supports (font-variant: small-caps) { .b { font-variant: small-caps } }
            .c { @media print { font-size: 10pt; } }
        "#;
        let fonts = extract_fonts(css).unwrap();
        assert_eq!(fonts[".a"], vec![FontDeclaration::new("font-size", "12px")]);
        assert_eq!(fonts[".b"], vec![FontDeclaration::new("font-variant", "small-caps")]);
        assert_eq!(fonts[".c"], vec![FontDeclaration::new("font-size", "10pt")]);
    }

    #[test]
    fn test_declaration_only_at_rules() {
        let css = "@font-face { font-family: Inter; src: url(inter.woff2); }\nbody { font-family: Inter; color: red; }";
        let fonts = extract_fonts(css).unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts["body"], vec![FontDeclaration::new("font-family", "Inter")]);

        let fonts = extract_fonts("@page { margin: 1in; font-size: 9pt; } .a { font-size: 12px; }").unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[".a"], vec![FontDeclaration::new("font-size", "12px")]);
    }

    #[test]
    fn test_repeated_selector_appends() {
        let fonts = extract_fonts("p { font-size: 1em } p { font-size: 2em }").unwrap();
        assert_eq!(fonts["p"].len(), 2);
        assert_eq!(fonts["p"][1].value, "2em");
    }

    #[test]
    fn test_declaration_error_fails() {
        let error = extract_fonts("p { font-size 12px; }").unwrap_err();
        assert!(matches!(error, CssError::Parse { .. }));
        assert!(error.to_string().starts_with("CSS parse error in declaration: "));
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(matches!(
            extract_fonts("p { font-size: 12px"),
            Err(CssError::UnbalancedBraces { .. })
        ));
    }
}
