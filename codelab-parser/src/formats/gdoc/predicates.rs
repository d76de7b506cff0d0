//! Construct recognition for word-processor exports.
//!
//! Exports carry no semantic markup beyond headings, lists and tables, so
//! everything else is recognized by the styling conventions in [`GdocStyles`].

use super::css::Stylesheet;
use crate::formats::common::dom;
use crate::options::GdocStyles;
use markup5ever_rcdom::Handle;

pub(crate) struct Recognizer<'o> {
    css: Stylesheet,
    styles: &'o GdocStyles,
}

/// Text nodes are judged by their enclosing element.
fn styled_element(node: &Handle) -> Handle {
    if dom::is_text(node) {
        if let Some(parent) = dom::parent(node) {
            return parent;
        }
    }
    node.clone()
}

impl<'o> Recognizer<'o> {
    pub fn new(css: Stylesheet, styles: &'o GdocStyles) -> Self {
        Recognizer { css, styles }
    }

    /// Step instruction such as `Duration: 5`.
    pub fn is_meta(&self, node: &Handle) -> bool {
        self.css.has_style(node, "color", &self.styles.meta_color)
    }

    pub fn is_bold(&self, node: &Handle) -> bool {
        let el = styled_element(node);
        dom::is_tag(&el, "strong")
            || dom::is_tag(&el, "b")
            || self.css.has_style(&el, "font-weight", "bold")
            || self.css.has_style(&el, "font-weight", "700")
    }

    pub fn is_italic(&self, node: &Handle) -> bool {
        let el = styled_element(node);
        dom::is_tag(&el, "em")
            || dom::is_tag(&el, "i")
            || self.css.has_style(&el, "font-style", "italic")
    }

    pub fn is_console(&self, node: &Handle) -> bool {
        let el = styled_element(node);
        self.css
            .has_style(&el, "font-family", &self.styles.console_font)
    }

    pub fn is_code(&self, node: &Handle) -> bool {
        let el = styled_element(node);
        self.css.has_style(&el, "font-family", &self.styles.code_font)
    }

    pub fn is_button(&self, node: &Handle) -> bool {
        self.css
            .has_style(node, "background-color", &self.styles.button_color)
    }

    pub fn is_infobox(&self, node: &Handle) -> bool {
        dom::is_tag(node, "td")
            && (self.css.has_style(
                node,
                "background-color",
                &self.styles.infobox_positive_color,
            ) || self.is_infobox_negative(node))
    }

    pub fn is_infobox_negative(&self, node: &Handle) -> bool {
        dom::is_tag(node, "td")
            && self.css.has_style(
                node,
                "background-color",
                &self.styles.infobox_negative_color,
            )
    }

    pub fn is_survey(&self, node: &Handle) -> bool {
        dom::is_tag(node, "td")
            && self
                .css
                .has_style(node, "background-color", &self.styles.survey_color)
    }

    /// Start of the comments region exported after the document body.
    pub fn is_comment(&self, node: &Handle) -> bool {
        dom::is_tag(node, "div")
            && self
                .css
                .has_style(node, "border", &self.styles.comment_border)
    }
}

/// A table with more than one row or cell; single-cell tables are layout.
pub(crate) fn is_table(node: &Handle) -> bool {
    dom::is_tag(node, "table") && (dom::count_two(node, "tr") > 1 || dom::count_two(node, "td") > 1)
}

pub(crate) fn is_list(node: &Handle) -> bool {
    dom::is_tag(node, "ul") || dom::is_tag(node, "ol")
}

/// `h2`..`h6`; `h1` starts a step instead.
pub(crate) fn is_header(node: &Handle) -> bool {
    header_level(node).is_some()
}

pub(crate) fn header_level(node: &Handle) -> Option<usize> {
    dom::heading_level(node).filter(|&level| level >= 2)
}
