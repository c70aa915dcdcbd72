//! Pattern catalog shared by the extraction functions
//!
//! Architectural Principle: Service Layer - One place owns every compiled pattern and property set
//! - Regexes are compiled once and shared read-only across calls and threads
//! - Property sets are fixed vocabularies compared ASCII case-insensitively
//! - Path filtering for batch checks lives in the `path_filter` submodule

pub mod path_filter;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

pub use path_filter::PathFilter;

lazy_static! {
    static ref HEX_COLOR: Regex =
        Regex::new(r"#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})").unwrap();
    static ref RGB_COLOR: Regex = Regex::new(r"rgb\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)").unwrap();
    static ref RGBA_COLOR: Regex =
        Regex::new(r"rgba\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*,\s*[0-9.]+\s*\)").unwrap();
    static ref HSL_COLOR: Regex = Regex::new(r"hsl\(\s*\d+\s*,\s*\d+%\s*,\s*\d+%\s*\)").unwrap();
    static ref HSLA_COLOR: Regex =
        Regex::new(r"hsla\(\s*\d+\s*,\s*\d+%\s*,\s*\d+%\s*,\s*[0-9.]+\s*\)").unwrap();

    /// `:hover`, `::before`, `:nth-child(2n)`...
    static ref PSEUDO_SUFFIX: Regex = Regex::new(r"::?[a-zA-Z-]+(\([^)]*\))?").unwrap();

    /// Selector-list commas and the combinators `>`, `+`, `~` and whitespace
    static ref SELECTOR_SEPARATOR: Regex = Regex::new(r"\s*[,>+~]\s*|\s+").unwrap();

    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
}

/// Properties whose value is a color by definition
pub const COLOR_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "border-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "outline-color",
    "text-decoration-color",
    "box-shadow",
    "text-shadow",
];

/// Keyword values recognized as colors on any property
pub const NAMED_COLORS: &[&str] = &[
    "black",
    "white",
    "red",
    "green",
    "blue",
    "yellow",
    "purple",
    "orange",
    "brown",
    "gray",
    "transparent",
];

pub const FONT_PROPERTIES: &[&str] = &[
    "font",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "font-variant",
    "line-height",
    "text-transform",
    "letter-spacing",
];

/// At-rule keywords that define keyframes, standard and vendor-prefixed
pub const KEYFRAMES_KEYWORDS: &[&str] =
    &["keyframes", "-webkit-keyframes", "-moz-keyframes", "-ms-keyframes", "-o-keyframes"];

/// Properties that reference an animation by name
pub const ANIMATION_PROPERTIES: &[&str] = &[
    "animation",
    "animation-name",
    "-webkit-animation",
    "-webkit-animation-name",
    "-moz-animation",
    "-moz-animation-name",
    "-ms-animation",
    "-ms-animation-name",
    "-o-animation",
    "-o-animation-name",
];

/// Whether a serialized value contains a color literal or is exactly one of
/// the lowercase [`NAMED_COLORS`].
pub fn has_color_value(value: &str) -> bool {
    HEX_COLOR.is_match(value)
        || RGB_COLOR.is_match(value)
        || RGBA_COLOR.is_match(value)
        || HSL_COLOR.is_match(value)
        || HSLA_COLOR.is_match(value)
        || NAMED_COLORS.contains(&value)
}

/// Remove pseudo-classes and pseudo-elements from selector text.
pub fn strip_pseudo_selectors(selector: &str) -> Cow<'_, str> {
    PSEUDO_SUFFIX.replace_all(selector, "")
}

/// Split selector text into simple fragments at commas and combinators.
pub fn selector_fragments(selector: &str) -> impl Iterator<Item = &str> {
    SELECTOR_SEPARATOR.split(selector).map(str::trim).filter(|part| !part.is_empty())
}

/// Blank out `/* ... */` comments, keeping the newlines they spanned so line
/// numbers stay put.
pub fn blank_comments(text: &str) -> Cow<'_, str> {
    BLOCK_COMMENT.replace_all(text, |caps: &Captures<'_>| "\n".repeat(caps[0].matches('\n').count()))
}

/// Strip any surrounding `'` and `"` characters.
pub fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '\'' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#fff", true)]
    #[case("1px solid #a1b2c3", true)]
    #[case("#11223344", true)]
    #[case("rgb(255, 0, 0)", true)]
    #[case("rgba(0,0,0,0.5)", true)]
    #[case("hsl(120, 100%, 50%)", true)]
    #[case("hsla(120, 100%, 50%, .3)", true)]
    #[case("transparent", true)]
    #[case("Red", false)]
    #[case("BLUE", false)]
    #[case("red solid", false)]
    #[case("10px", false)]
    #[case("rgb(1.5, 2, 3)", false)]
    fn test_color_values(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(has_color_value(value), expected, "value: {value}");
    }

    #[rstest]
    #[case("a:hover", "a")]
    #[case(".btn::before", ".btn")]
    #[case("li:nth-child(2n+1) > .x:not(.y)", "li > .x")]
    fn test_strip_pseudo_selectors(#[case] selector: &str, #[case] expected: &str) {
        assert_eq!(strip_pseudo_selectors(selector), expected);
    }

    #[test]
    fn test_selector_fragments() {
        let parts: Vec<_> = selector_fragments(".a .b>.c + #d ~ p, .e").collect();
        assert_eq!(parts, vec![".a", ".b", ".c", "#d", "p", ".e"]);
    }

    #[test]
    fn test_blank_comments_keeps_lines() {
        let text = "a: b; /* one */\n/* two\nthree */\nc: d;";
        let blanked = blank_comments(text);
        assert_eq!(blanked, "a: b; \n\n\nc: d;");
        assert_eq!(blanked.lines().count(), text.lines().count());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"spin\""), "spin");
        assert_eq!(unquote("'fade'"), "fade");
        assert_eq!(unquote("plain"), "plain");
    }
}
