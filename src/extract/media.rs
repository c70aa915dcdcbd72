use super::{declaration_map, decode, load_stylesheet, nested_rules_in};
use crate::domain::{CssResult, MediaQueryMap, MediaRule};
use crate::parser::Rule;

/// Map each top-level `@media` condition to the rules declared inside it.
///
/// Only the top level is scanned and only the `media` keyword counts. A
/// condition with an empty block still gets an entry. Rules repeating a
/// condition are appended to the same entry.
pub fn extract_media_queries(css: impl AsRef<[u8]>) -> CssResult<MediaQueryMap> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    let mut queries = MediaQueryMap::new();

    for rule in &rules {
        let Rule::At(at_rule) = rule else { continue };
        if !at_rule.is("media") {
            continue;
        }

        let inner = nested_rules_in(at_rule, "media query", "in media query")?;
        let entry = queries.entry(at_rule.prelude.clone()).or_default();

        for inner_rule in &inner {
            if let Rule::Qualified(qualified) = inner_rule {
                entry.push(MediaRule {
                    selector: qualified.selector_text().to_string(),
                    properties: declaration_map(qualified),
                });
            }
        }
    }

    tracing::debug!(count = queries.len(), "Extracted media queries");
    Ok(queries)
}
