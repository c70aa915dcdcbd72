use super::{decode, load_stylesheet};
use crate::domain::{CssError, CssResult};
use crate::parser::{BodyItem, Rule};
use crate::patterns::blank_comments;

/// Check stylesheet syntax and return the decoded text unchanged.
///
/// Runs, in order: the brace and parse-error pre-check, a declaration parse
/// of every top-level rule block, the missing-semicolon heuristic on each
/// block, then the same heuristic on the raw text. The first failure wins.
///
/// The semicolon heuristics are line based and ignore `/* */` comments.
/// They can reject valid CSS split across lines, such as a selector list
/// with a pseudo-class at the end of a line.
pub fn validate_css(css: impl AsRef<[u8]>) -> CssResult<String> {
    let text = decode(css.as_ref())?;
    let rules = load_stylesheet(text)?;

    for rule in &rules {
        let Rule::Qualified(rule) = rule else { continue };
        if rule.body.is_empty() {
            continue;
        }

        if let Some(issue) = rule.items().into_iter().find_map(|item| match item {
            BodyItem::Error(issue) => Some(issue),
            _ => None,
        }) {
            // Body positions are relative to the block; report source lines
            let line = rule.body_line + issue.line.saturating_sub(1);
            return Err(
                CssError::parse(issue.message, line, issue.column).in_context("in declaration")
            );
        }

        check_block_semicolons(&rule.body)?;
    }

    check_raw_semicolons(text)?;

    Ok(text.to_string())
}

/// A trimmed line that carries a colon but no terminator.
fn looks_unterminated(line: &str) -> bool {
    line.contains(':') && !line.ends_with(';') && !line.ends_with('{') && !line.contains('}')
}

/// Heuristic over one rule block; the following line must exist and either
/// look like a declaration or not close the block.
fn check_block_semicolons(body: &str) -> CssResult<()> {
    let blanked = blank_comments(body);
    let lines: Vec<&str> = blanked.trim().split('\n').collect();

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if !looks_unterminated(line) {
            continue;
        }

        if let Some(next) = lines.get(i + 1) {
            if next.contains(':') || !next.trim().starts_with('}') {
                return Err(CssError::MissingSemicolon { line: line.to_string(), line_number: None });
            }
        }
    }

    Ok(())
}

/// Heuristic over the whole input; the following line must be non-blank and
/// must not close a block.
fn check_raw_semicolons(text: &str) -> CssResult<()> {
    let blanked = blank_comments(text);
    let lines: Vec<&str> = blanked.split('\n').collect();

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if !looks_unterminated(line) {
            continue;
        }

        if let Some(next) = lines.get(i + 1).map(|next| next.trim()) {
            if !next.is_empty() && !next.starts_with('}') {
                return Err(CssError::MissingSemicolon {
                    line: line.to_string(),
                    line_number: Some(i + 1),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::inline_comments_after_semicolons(
        "\n.hide-scrollbar {\n    -ms-overflow-style: none; /* Internet Explorer 10+ */\n    scrollbar-width: none; /* Firefox */\n}\n"
    )]
    #[case::pseudo_element_selector(
        "\n.hide-scrollbar::-webkit-scrollbar {\n    display: none; /* Safari and Chrome */\n}\n"
    )]
    #[case::many_inline_comments(
        "\n.element {\n    color: red; /* Basic comment */\n    background: #fff; /* Hex color comment */\n    padding: 10px; /* Number with unit */\n    margin: 0; /* Zero value */\n    border: 1px solid #ccc; /* Multiple values */\n    font-family: \"Arial\", sans-serif; /* String value */\n}\n"
    )]
    #[case::multiline_comment(
        "\n/* \n * This is a multi-line comment\n * that spans several lines\n */\n.container {\n    width: 100%; /* Full width */\n    max-width: 1200px; /* Maximum width for larger screens */\n}\n"
    )]
    #[case::special_characters_in_comments(
        "\n.element {\n    content: \"\u{2192}\"; /* Arrow symbol: \u{2192} */\n    font-size: 16px; /* Size in px (pixels) */\n    width: calc(100% - 20px); /* 100% minus padding */\n    color: #ff0000; /* RGB: 255, 0, 0 */\n}\n"
    )]
    #[case::last_declaration_without_semicolon(".a {\n    color: red\n}\n")]
    #[case::single_line_rules(".a { color: red } .b{margin:0}")]
    #[case::media_block("@media (min-width: 600px) {\n  .a {\n    color: red;\n  }\n}\n")]
    fn test_valid_stylesheets(#[case] css: &str) {
        assert_eq!(validate_css(css).unwrap(), css);
    }

    #[test]
    fn test_unbalanced_braces() {
        let error = validate_css(".broken{color:red;background:blue;").unwrap_err();
        assert!(matches!(error, CssError::UnbalancedBraces { open: 1, close: 0 }));

        let error = validate_css("\n.broken {\n    color: red;\n    background: blue;\n\n").unwrap_err();
        assert!(matches!(error, CssError::UnbalancedBraces { .. }));
    }

    #[test]
    fn test_missing_semicolon_in_block() {
        let css = "\n.broken {\n    color: red\n    background: blue;\n}\n";
        let error = validate_css(css).unwrap_err();
        assert!(matches!(
            &error,
            CssError::MissingSemicolon { line, line_number: None } if line == "color: red"
        ));
        assert_eq!(error.to_string(), "CSS syntax error: Missing semicolon after 'color: red'");
    }

    #[test]
    fn test_missing_semicolon_in_raw_text() {
        // Blocks nested in @media are only seen by the raw pass
        let css = "@media print {\n.a {\ncolor: red\nmargin: 0;\n}\n}\n";
        let error = validate_css(css).unwrap_err();
        assert!(matches!(error, CssError::MissingSemicolon { line_number: Some(3), .. }));
        assert_eq!(
            error.to_string(),
            "CSS syntax error: Missing semicolon at line 3 after 'color: red'"
        );
    }

    #[test]
    fn test_declaration_parse_error() {
        let error = validate_css(".a { color red; }").unwrap_err();
        assert!(matches!(error, CssError::Parse { .. }));
        assert!(error.to_string().starts_with("CSS parse error in declaration: "));
    }

    #[test]
    fn test_declaration_parse_error_points_at_source_line() {
        let css = ".a {\n  color: red;\n}\n\n.b {\n  margin: 0;\n  width 10px;\n}\n";
        let error = validate_css(css).unwrap_err();
        assert_eq!(error.line_number(), Some(7));
    }

    #[test]
    fn test_top_level_parse_error() {
        let error = validate_css(".a { color: red; } .b").unwrap_err();
        assert!(error.is_syntax_error());
        assert!(error.to_string().starts_with("CSS parse error: "));
    }

    #[test]
    fn test_accepts_bytes() {
        let css = ".a { color: red; }".as_bytes();
        assert_eq!(validate_css(css).unwrap(), ".a { color: red; }");
    }
}
