//! Style lookups for word-processor exports.
//!
//! Exports carry one `<style>` block of class rules plus inline `style`
//! attributes. Only simple class selectors are kept; everything else
//! (at-rules, element and pseudo-class selectors) is skipped.

use crate::common::text::leading_number;
use crate::error::ParseError;
use crate::formats::common::dom;
use cssparser::{Delimiter, ParseError as CssError, Parser, ParserInput, SourcePosition, Token};
use markup5ever_rcdom::Handle;
use std::collections::HashMap;

/// Declarations of each `.class` selector, keys and values lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Stylesheet {
    rules: HashMap<String, HashMap<String, String>>,
}

impl Stylesheet {
    /// Parse the document's first `<style>` element. No element means no rules.
    pub fn from_document(doc: &Handle) -> Result<Self, ParseError> {
        match dom::find_tag(doc, "style") {
            Some(style) => {
                let css: String = dom::children(&style)
                    .iter()
                    .filter_map(dom::text_data)
                    .collect();
                Self::parse(css.trim())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(css: &str) -> Result<Self, ParseError> {
        let mut sheet = Stylesheet::default();
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);

        let mut rule_start: Option<SourcePosition> = None;
        let mut at_rule = false;
        let mut prelude: Vec<Token> = Vec::new();
        loop {
            let before = parser.position();
            let token = match parser.next() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::CurlyBracketBlock => {
                    let start = rule_start.take().unwrap_or(before);
                    if at_rule {
                        parser.parse_nested_block(skip_block).unwrap_or_default();
                    } else {
                        let decls = parser.parse_nested_block(declarations).unwrap_or_default();
                        sheet.add_rule(&class_selectors(&prelude), decls);
                    }
                    if !parser.slice_from(before).trim_end().ends_with('}') {
                        return Err(malformed(&parser, start, "unterminated block".to_string()));
                    }
                    prelude.clear();
                    at_rule = false;
                }
                Token::Semicolon | Token::CloseCurlyBracket => {
                    rule_start = None;
                    prelude.clear();
                    at_rule = false;
                }
                Token::AtKeyword(_) if rule_start.is_none() => {
                    rule_start = Some(before);
                    at_rule = true;
                }
                other => {
                    rule_start.get_or_insert(before);
                    prelude.push(other);
                }
            }
        }
        match rule_start {
            Some(start) if !at_rule => {
                let message = format!(
                    "unexpected end of input after {:?}",
                    parser.slice_from(start).trim()
                );
                Err(malformed(&parser, start, message))
            }
            _ => Ok(sheet),
        }
    }

    fn add_rule(&mut self, selectors: &[String], decls: Vec<(String, String)>) {
        for sel in selectors {
            let rule = self.rules.entry(sel.clone()).or_default();
            for (key, value) in &decls {
                rule.insert(key.clone(), value.clone());
            }
        }
    }

    /// Value of `key` declared for `.class`.
    pub fn class_value(&self, class: &str, key: &str) -> Option<&str> {
        self.rules
            .get(&format!(".{class}"))
            .and_then(|decls| decls.get(key))
            .map(String::as_str)
    }

    /// True if one of the element's classes, or its inline style, sets `key`
    /// to `value`.
    pub fn has_style(&self, node: &Handle, key: &str, value: &str) -> bool {
        class_list(node)
            .iter()
            .any(|c| self.class_value(c, key) == Some(value))
            || style_value(node, key) == value
    }
}

/// Error at the first non-blank byte of the rule starting at `start`.
fn malformed(parser: &Parser, start: SourcePosition, message: String) -> ParseError {
    let text = parser.slice_from(start);
    ParseError::Css {
        pos: start.byte_index() + text.len() - text.trim_start().len(),
        message,
    }
}

/// Keeps the selectors of a comma separated list that are exactly `.name`.
fn class_selectors(prelude: &[Token]) -> Vec<String> {
    prelude
        .split(|t| matches!(t, Token::Comma))
        .filter_map(|group| match group {
            [Token::Delim('.'), Token::Ident(name)] => Some(format!(".{}", &**name)),
            _ => None,
        })
        .collect()
}

fn declarations<'i>(block: &mut Parser<'i, '_>) -> Result<Vec<(String, String)>, CssError<'i, ()>> {
    let mut decls = Vec::new();
    while !block.is_exhausted() {
        if let Ok((key, value)) = block.parse_until_after(Delimiter::Semicolon, declaration) {
            decls.push((key, value.trim().trim_matches('"').to_lowercase()));
        }
    }
    Ok(decls)
}

fn declaration<'i>(input: &mut Parser<'i, '_>) -> Result<(String, &'i str), CssError<'i, ()>> {
    let key = input.expect_ident()?.to_lowercase();
    input.expect_colon()?;
    let start = input.position();
    while input.next().is_ok() {}
    Ok((key, input.slice_from(start)))
}

fn skip_block<'i>(block: &mut Parser<'i, '_>) -> Result<(), CssError<'i, ()>> {
    while block.next().is_ok() {}
    Ok(())
}

/// Classes of an element, sorted.
pub(crate) fn class_list(node: &Handle) -> Vec<String> {
    let mut classes: Vec<String> = dom::attr_or_empty(node, "class")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    classes.sort();
    classes
}

pub(crate) fn has_class(node: &Handle, name: &str) -> bool {
    class_list(node).binary_search_by(|c| c.as_str().cmp(name)).is_ok()
}

/// Inline style value of `name`, lower-cased; empty when not set.
pub(crate) fn style_value(node: &Handle, name: &str) -> String {
    let style = dom::attr_or_empty(node, "style");
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim_matches(&[' ', '"'][..]).to_lowercase())
        .unwrap_or_default()
}

/// Numeric inline style value such as `width: 120.5px`.
///
/// Zero when the property is absent, `-1.0` when its leading numeric run
/// does not parse.
pub(crate) fn style_float_value(node: &Handle, name: &str) -> f32 {
    let value = style_value(node, name);
    if value.is_empty() {
        return 0.0;
    }
    leading_number(&value).unwrap_or(-1.0)
}
