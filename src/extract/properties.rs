use super::{decode, load_stylesheet};
use crate::domain::{CssResult, PropertyMap};
use crate::parser::Rule;

/// Map every selector that sets `property` to its value.
///
/// The property name is compared ASCII case-insensitively. `!important`
/// values keep a `" !important"` suffix. Every at-rule body is searched, and
/// a later match for the same selector replaces the earlier one.
pub fn extract_selectors_by_property(
    css: impl AsRef<[u8]>,
    property: &str,
) -> CssResult<PropertyMap> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    let mut selectors = PropertyMap::new();
    collect_property(&rules, property, &mut selectors);
    Ok(selectors)
}

fn collect_property(rules: &[Rule], property: &str, selectors: &mut PropertyMap) {
    for rule in rules {
        match rule {
            Rule::Qualified(rule) => {
                for declaration in rule.declarations() {
                    if !declaration.is_named(property) {
                        continue;
                    }
                    let value = if declaration.important {
                        format!("{} !important", declaration.value)
                    } else {
                        declaration.value
                    };
                    selectors.insert(rule.selector_text().to_string(), value);
                }
            }
            Rule::At(at_rule) if at_rule.body.is_some() => {
                collect_property(&at_rule.nested_rules(), property, selectors);
            }
            _ => {}
        }
    }
}
