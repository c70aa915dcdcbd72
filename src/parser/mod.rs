//! Rule-tree adapter over the `cssparser` crate
//!
//! Architecture: Anti-Corruption Layer - cssparser's streaming callbacks become an owned tree
//! - Malformed input never fails a parse; it shows up as error nodes in the tree
//! - Preludes and blocks are captured as raw source slices so they re-parse faithfully
//! - Extraction code only ever sees [`Rule`], [`BodyItem`] and [`Declaration`]

mod tree;

pub use tree::{AtRule, BodyItem, Declaration, ParseIssue, QualifiedRule, Rule};

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, ParseErrorKind,
    Parser, ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser, Token,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IMPORTANT_SUFFIX: Regex = Regex::new(r"(?i)!\s*important\s*$").unwrap();
}

/// Parse stylesheet text into top-level rules.
///
/// Invalid rules are reported as [`Rule::Error`] items in source order; this
/// function itself never fails.
pub fn parse_stylesheet(css: &str) -> Vec<Rule> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut builder = SheetBuilder;

    StyleSheetParser::new(&mut parser, &mut builder)
        .map(|result| match result {
            Ok(rule) => rule,
            Err((error, _)) => Rule::Error(issue_from(&error)),
        })
        .collect()
}

/// Parse the contents of a rule block into declarations, nested rules and
/// error items.
pub fn parse_rule_body(body: &str) -> Vec<BodyItem> {
    let mut input = ParserInput::new(body);
    let mut parser = Parser::new(&mut input);
    let mut builder = BodyBuilder;

    RuleBodyParser::new(&mut parser, &mut builder)
        .map(|result| match result {
            Ok(item) => item,
            Err((error, _)) => BodyItem::Error(issue_from(&error)),
        })
        .collect()
}

/// Render rules back to CSS source, one rule per line.
///
/// Error nodes are dropped. For any tree without them,
/// `parse_stylesheet(&serialize(&rules))` yields `rules` again, positions
/// aside when the original spanned several lines.
pub fn serialize(rules: &[Rule]) -> String {
    rules.iter().map(Rule::serialize).filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Builds [`Rule`]s for stylesheet-level lists.
struct SheetBuilder;

/// Builds [`BodyItem`]s for the inside of a rule block.
struct BodyBuilder;

impl<'i> QualifiedRuleParser<'i> for SheetBuilder {
    type Prelude = String;
    type QualifiedRule = Rule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        read_prelude(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(Rule::Qualified(qualified_rule(prelude, start, input)?))
    }
}

impl<'i> AtRuleParser<'i> for SheetBuilder {
    type Prelude = (String, String);
    type AtRule = Rule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Ok((name.to_string(), read_prelude(input)?))
    }

    fn rule_without_block(
        &mut self,
        (keyword, prelude): Self::Prelude,
        start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(Rule::At(AtRule { keyword, prelude, body: None, line: line_of(start) }))
    }

    fn parse_block<'t>(
        &mut self,
        (keyword, prelude): Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let body = read_block(input)?;
        Ok(Rule::At(AtRule { keyword, prelude, body: Some(body), line: line_of(start) }))
    }
}

impl<'i> QualifiedRuleParser<'i> for BodyBuilder {
    type Prelude = String;
    type QualifiedRule = BodyItem;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        read_prelude(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(BodyItem::Rule(Rule::Qualified(qualified_rule(prelude, start, input)?)))
    }
}

impl<'i> AtRuleParser<'i> for BodyBuilder {
    type Prelude = (String, String);
    type AtRule = BodyItem;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Ok((name.to_string(), read_prelude(input)?))
    }

    fn rule_without_block(
        &mut self,
        (keyword, prelude): Self::Prelude,
        start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(BodyItem::Rule(Rule::At(AtRule { keyword, prelude, body: None, line: line_of(start) })))
    }

    fn parse_block<'t>(
        &mut self,
        (keyword, prelude): Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let body = read_block(input)?;
        Ok(BodyItem::Rule(Rule::At(AtRule {
            keyword,
            prelude,
            body: Some(body),
            line: line_of(start),
        })))
    }
}

impl<'i> DeclarationParser<'i> for BodyBuilder {
    type Declaration = BodyItem;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while !input.is_exhausted() {
            let token = input.next_including_whitespace_and_comments()?;
            match token {
                // `a:hover { ... }` inside a block is a nested rule, not a declaration
                Token::CurlyBracketBlock => return Err(input.new_custom_error(())),
                Token::ParenthesisBlock | Token::SquareBracketBlock | Token::Function(_) => {
                    input.parse_nested_block(consume_component_values)?;
                }
                _ => {}
            }
        }
        let raw = input.slice_from(start).trim();

        let (value, important) = match IMPORTANT_SUFFIX.find(raw) {
            Some(marker) => (raw[..marker.start()].trim_end().to_string(), true),
            None => (raw.to_string(), false),
        };

        Ok(BodyItem::Declaration(Declaration { name: name.to_string(), value, important }))
    }
}

impl<'i> RuleBodyItemParser<'i, BodyItem, ()> for BodyBuilder {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

fn qualified_rule<'i>(
    prelude: String,
    start: &ParserState,
    input: &mut Parser<'i, '_>,
) -> Result<QualifiedRule, ParseError<'i, ()>> {
    let body_line = input.current_source_location().line + 1;
    let body = read_block(input)?;
    Ok(QualifiedRule { prelude, body, line: line_of(start), body_line })
}

fn read_prelude<'i>(input: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let start = input.position();
    consume_component_values(input)?;
    Ok(input.slice_from(start).trim().to_string())
}

fn read_block<'i>(input: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let start = input.position();
    consume_component_values(input)?;
    Ok(input.slice_from(start).to_string())
}

/// Walk to the end of the current (possibly nested) input so the caller can
/// take the raw slice.
fn consume_component_values<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while !input.is_exhausted() {
        let token = input.next_including_whitespace_and_comments()?;
        match token {
            Token::CurlyBracketBlock
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::Function(_) => {
                input.parse_nested_block(consume_component_values)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn line_of(state: &ParserState) -> u32 {
    state.source_location().line + 1
}

fn issue_from(error: &ParseError<'_, ()>) -> ParseIssue {
    let message = match &error.kind {
        ParseErrorKind::Basic(kind) => describe(kind),
        ParseErrorKind::Custom(()) => "invalid rule".to_string(),
    };
    ParseIssue { message, line: error.location.line + 1, column: error.location.column }
}

fn describe(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(token) => format!("unexpected token {token:?}"),
        BasicParseErrorKind::EndOfInput => "unexpected end of input".to_string(),
        BasicParseErrorKind::AtRuleInvalid(name) => {
            let name: &str = name;
            format!("invalid @{name} rule")
        }
        BasicParseErrorKind::AtRuleBodyInvalid => "invalid at-rule body".to_string(),
        BasicParseErrorKind::QualifiedRuleInvalid => "invalid qualified rule".to_string(),
    }
}
