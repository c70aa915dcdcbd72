//! Extraction engine over the parsed rule tree
//!
//! Architecture: Pure Functions - Every entry point decodes, pre-checks, parses and walks on its own
//! - No state survives a call; the same input always yields the same output
//! - An error node anywhere in a traversed tree fails the whole call
//! - At-rule bodies are re-parsed from their raw text and walked recursively

mod animations;
mod colors;
mod fonts;
mod media;
mod properties;
mod unused;
mod validate;

pub use animations::extract_animations;
pub use colors::extract_colors;
pub use fonts::extract_fonts;
pub use media::extract_media_queries;
pub use properties::extract_selectors_by_property;
pub use unused::extract_unused_selectors;
pub use validate::validate_css;

use crate::domain::{CssError, CssResult, DeclarationMap};
use crate::parser::{parse_stylesheet, AtRule, QualifiedRule, Rule};

/// Decode stylesheet bytes as UTF-8.
pub(crate) fn decode(css: &[u8]) -> CssResult<&str> {
    Ok(std::str::from_utf8(css)?)
}

/// Fail when the raw text has a different number of `{` and `}`.
pub(crate) fn check_braces(text: &str) -> CssResult<()> {
    let open = text.matches('{').count();
    let close = text.matches('}').count();

    if open != close {
        tracing::debug!(open, close, "Rejecting stylesheet with unbalanced braces");
        return Err(CssError::UnbalancedBraces { open, close });
    }

    Ok(())
}

/// Fail on the first error node of a rule list. Only this level is scanned.
pub(crate) fn check_parse_errors(rules: &[Rule]) -> CssResult<()> {
    match rules.iter().find_map(|rule| match rule {
        Rule::Error(issue) => Some(issue),
        _ => None,
    }) {
        Some(issue) => Err(issue.to_error()),
        None => Ok(()),
    }
}

/// Brace check, parse, then top-level error scan.
pub(crate) fn load_stylesheet(text: &str) -> CssResult<Vec<Rule>> {
    check_braces(text)?;
    let rules = parse_stylesheet(text);
    check_parse_errors(&rules)?;
    Ok(rules)
}

/// Re-parse an at-rule body as a stylesheet, failing on its first error node.
///
/// Only `@media` and `@keyframes` bodies are checked this way; the error reads
/// `Error parsing {label} content: CSS parse error {scope}: ...`.
pub(crate) fn nested_rules_in(
    at_rule: &AtRule,
    label: &str,
    scope: &str,
) -> CssResult<Vec<Rule>> {
    let rules = at_rule.nested_rules();
    check_parse_errors(&rules).map_err(|e| CssError::nested(label, e.in_context(scope)))?;
    Ok(rules)
}

/// Declaration name -> value for one rule, later declarations overwriting earlier ones.
pub(crate) fn declaration_map(rule: &QualifiedRule) -> DeclarationMap {
    rule.declarations().into_iter().map(|d| (d.name, d.value)).collect()
}
