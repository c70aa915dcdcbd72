use std::collections::BTreeMap;

use super::{declaration_map, decode, load_stylesheet, nested_rules_in};
use crate::domain::{Animation, AnimationMap, CssResult, DeclarationMap};
use crate::parser::{AtRule, Rule};
use crate::patterns::{unquote, ANIMATION_PROPERTIES, KEYFRAMES_KEYWORDS};

/// Collect `@keyframes` definitions (vendor-prefixed included) and the
/// top-level selectors that reference each one.
///
/// Names referenced by `animation`/`animation-name` without a matching
/// definition do not appear in the result.
pub fn extract_animations(css: impl AsRef<[u8]>) -> CssResult<AnimationMap> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    let mut definitions: BTreeMap<String, BTreeMap<String, DeclarationMap>> = BTreeMap::new();
    for rule in &rules {
        if let Rule::At(at_rule) = rule {
            if KEYFRAMES_KEYWORDS.iter().any(|keyword| at_rule.is(keyword)) {
                let name = unquote(at_rule.prelude.trim()).to_string();
                tracing::debug!(%name, keyword = %at_rule.keyword, "Found keyframes");
                definitions.insert(name, keyframes_of(at_rule)?);
            }
        }
    }

    let mut usage = animation_usage(&rules);

    Ok(definitions
        .into_iter()
        .map(|(name, keyframes)| {
            let used_by = usage.remove(&name).unwrap_or_default();
            (name, Animation { keyframes, used_by })
        })
        .collect())
}

/// Keyframe selector (`from`, `to`, `50%`) -> declarations.
fn keyframes_of(at_rule: &AtRule) -> CssResult<BTreeMap<String, DeclarationMap>> {
    let frames = nested_rules_in(at_rule, "@keyframes", "in @keyframes")?;

    Ok(frames
        .iter()
        .filter_map(|frame| match frame {
            Rule::Qualified(frame) => {
                Some((frame.selector_text().to_string(), declaration_map(frame)))
            }
            _ => None,
        })
        .collect())
}

/// Animation name -> selectors of top-level rules that reference it.
fn animation_usage(rules: &[Rule]) -> BTreeMap<String, Vec<String>> {
    let mut usage: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for rule in rules {
        let Rule::Qualified(rule) = rule else { continue };

        for declaration in rule.declarations() {
            if !declaration.is_any_of(ANIMATION_PROPERTIES) {
                continue;
            }
            // Only the first token names the animation
            if let Some(first) = declaration.value.split_whitespace().next() {
                usage
                    .entry(unquote(first).to_string())
                    .or_default()
                    .push(rule.selector_text().to_string());
            }
        }
    }

    usage
}
