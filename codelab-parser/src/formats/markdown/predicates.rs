//! Construct recognition for rendered Markdown.
//!
//! Unlike word-processor exports, rendered Markdown carries semantic tags, so
//! every predicate here is a structural check on the element and its
//! neighbourhood.

use crate::common::metadata::is_instruction;
use crate::formats::common::dom;
use markup5ever_rcdom::Handle;

const ASIDE_POSITIVE: &str = "aside positive";
const ASIDE_NEGATIVE: &str = "aside negative";

/// `h3`..`h6`, at levels 2..5; `h1` is the title and `h2` starts a step.
pub(crate) fn header_level(node: &Handle) -> Option<usize> {
    dom::heading_level(node)
        .filter(|&level| level >= 3)
        .map(|level| level - 1)
}

pub(crate) fn is_header(node: &Handle) -> bool {
    header_level(node).is_some()
}

/// A text node holding step instructions such as `Duration: 5`.
pub(crate) fn is_meta(node: &Handle) -> bool {
    dom::text_data(node).is_some_and(|text| is_instruction(&text))
}

/// Text nodes are judged by their enclosing element.
fn element_of(node: &Handle) -> Option<Handle> {
    if dom::is_text(node) {
        dom::parent(node)
    } else {
        Some(node.clone())
    }
}

/// True if `node`, or for a `<code>` element one of its two closest
/// ancestors, is one of `tags`.
fn styled_by(node: &Handle, tags: &[&str]) -> bool {
    let Some(el) = element_of(node) else {
        return false;
    };
    let matches = |n: &Handle| tags.iter().any(|t| dom::is_tag(n, t));
    if !dom::is_text(node) && dom::is_tag(&el, "code") {
        let mut cur = dom::parent(&el);
        for _ in 0..2 {
            match cur {
                Some(p) if matches(&p) => return true,
                Some(p) => cur = dom::parent(&p),
                None => return false,
            }
        }
        return false;
    }
    matches(&el)
}

pub(crate) fn is_bold(node: &Handle) -> bool {
    styled_by(node, &["strong", "b"])
}

pub(crate) fn is_italic(node: &Handle) -> bool {
    styled_by(node, &["em", "i"])
}

pub(crate) fn is_console(node: &Handle) -> bool {
    element_of(node).is_some_and(|el| {
        dom::is_tag(&el, "code") && dom::attr_or_empty(&el, "class") == "language-console"
    })
}

pub(crate) fn is_code(node: &Handle) -> bool {
    element_of(node).is_some_and(|el| dom::is_tag(&el, "code")) && !is_console(node)
}

pub(crate) fn is_button(node: &Handle) -> bool {
    dom::is_tag(node, "button")
}

/// An `<aside class="positive|negative">`, or a block quote whose first
/// paragraph starts with `aside positive` or `aside negative`.
pub(crate) fn is_infobox(node: &Handle) -> bool {
    if dom::is_tag(node, "aside") {
        return true;
    }
    aside_marker(node).is_some()
}

pub(crate) fn is_infobox_negative(node: &Handle) -> bool {
    if dom::is_tag(node, "aside") {
        return dom::attr_or_empty(node, "class")
            .split_whitespace()
            .any(|c| c.eq_ignore_ascii_case("negative"));
    }
    aside_marker(node) == Some(ASIDE_NEGATIVE)
}

/// The `aside ...` marker opening a block quote infobox.
pub(crate) fn aside_marker(node: &Handle) -> Option<&'static str> {
    if !dom::is_tag(node, "blockquote") {
        return None;
    }
    let first = dom::element_children(node).into_iter().next()?;
    let text = dom::first_child(&first).and_then(|t| dom::text_data(&t))?;
    let text = text.trim_start();
    [ASIDE_POSITIVE, ASIDE_NEGATIVE]
        .into_iter()
        .find(|marker| starts_with_ignore_case(text, marker))
}

pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// A `<form>` holding at least one `<name>` question and one `<input>`.
pub(crate) fn is_survey(node: &Handle) -> bool {
    dom::is_tag(node, "form")
        && dom::find_tag(node, "name").is_some()
        && !dom::find_all(node, "input").is_empty()
}

pub(crate) fn is_table(node: &Handle) -> bool {
    dom::is_tag(node, "table") && (dom::count_two(node, "tr") >= 1 || dom::count_two(node, "td") >= 1)
}

pub(crate) fn is_list(node: &Handle) -> bool {
    dom::is_tag(node, "ul") || dom::is_tag(node, "ol")
}

pub(crate) fn is_youtube(node: &Handle) -> bool {
    dom::is_tag(node, "video")
}
