//! Owned rule tree produced by the adapter.
//!
//! Preludes and blocks are stored as the raw source text they were parsed
//! from, so any block can be handed back to [`parse_stylesheet`] or
//! [`parse_rule_body`] and re-parsed faithfully.

use crate::domain::CssError;

use super::{parse_rule_body, parse_stylesheet};

/// A top-level (or re-parsed) stylesheet item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Qualified(QualifiedRule),
    At(AtRule),
    Error(ParseIssue),
}

impl Rule {
    /// Render the rule back to CSS source.
    pub fn serialize(&self) -> String {
        match self {
            Self::Qualified(rule) => format!("{} {{{}}}", rule.prelude, rule.body),
            Self::At(rule) => {
                let head = if rule.prelude.is_empty() {
                    format!("@{}", rule.keyword)
                } else {
                    format!("@{} {}", rule.keyword, rule.prelude)
                };
                match &rule.body {
                    Some(body) => format!("{head} {{{body}}}"),
                    None => format!("{head};"),
                }
            }
            Self::Error(_) => String::new(),
        }
    }
}

/// `selector { block }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedRule {
    /// Selector text, trimmed
    pub prelude: String,
    /// Raw block contents between the braces
    pub body: String,
    /// 1-based line of the rule start
    pub line: u32,
    /// 1-based line where the block contents start
    pub body_line: u32,
}

impl QualifiedRule {
    pub fn selector_text(&self) -> &str {
        &self.prelude
    }

    /// Parse the block into declarations, nested rules and error items.
    pub fn items(&self) -> Vec<BodyItem> {
        parse_rule_body(&self.body)
    }

    /// Only the well-formed declarations of the block, in source order.
    pub fn declarations(&self) -> Vec<Declaration> {
        self.items()
            .into_iter()
            .filter_map(|item| match item {
                BodyItem::Declaration(declaration) => Some(declaration),
                _ => None,
            })
            .collect()
    }
}

/// `@keyword prelude { block }` or `@keyword prelude;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Keyword as written, without the `@`
    pub keyword: String,
    /// Condition or name text, trimmed
    pub prelude: String,
    /// Raw block contents, `None` for statement at-rules
    pub body: Option<String>,
    pub line: u32,
}

impl AtRule {
    /// ASCII case-insensitive keyword comparison.
    pub fn is(&self, keyword: &str) -> bool {
        self.keyword.eq_ignore_ascii_case(keyword)
    }

    /// Re-parse the block as a stylesheet. Statement at-rules yield nothing.
    pub fn nested_rules(&self) -> Vec<Rule> {
        self.body.as_deref().map(parse_stylesheet).unwrap_or_default()
    }
}

/// Items found inside a rule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem {
    Declaration(Declaration),
    /// Nested qualified rule or at-rule
    Rule(Rule),
    Error(ParseIssue),
}

/// `name: value [!important]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name as written
    pub name: String,
    /// Serialized value, trimmed, without the `!important` marker
    pub value: String,
    pub important: bool,
}

impl Declaration {
    /// ASCII case-insensitive property name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether the property name is one of `names`.
    pub fn is_any_of(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.is_named(name))
    }
}

/// Diagnostic attached to an error node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub message: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl ParseIssue {
    pub fn to_error(&self) -> CssError {
        CssError::parse(self.message.clone(), self.line, self.column)
    }
}
