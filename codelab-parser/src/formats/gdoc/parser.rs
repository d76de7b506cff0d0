//! Word-processor export → codelab
//!
//! The walk starts at `<body>`. Before the first `h1` only the title
//! paragraph and the metadata table are looked at; every `h1` then opens a
//! step and everything up to the next one is offered to [`GdocWalker`].
//! The comments region the export appends to the body ends the walk.

use super::css::{has_class, style_float_value, Stylesheet};
use super::predicates::{header_level, is_header, is_list, is_table, Recognizer};
use crate::common::compact::compact_nodes;
use crate::common::metadata::apply_field;
use crate::common::squash::block_nodes;
use crate::common::text::{clean_text, slug, snake_case};
use crate::error::ParseError;
use crate::formats::common::dom;
use crate::formats::common::state::{DocState, StateFlags};
use crate::formats::common::walk::{parse_children, parse_top, Parsed, Walker};
use crate::formats::common::{
    embed_from_alt, header_kind, is_download_text, items_kind, reject_nested_imports, Embed,
};
use crate::ir::codelab::Codelab;
use crate::ir::nodes::{
    ButtonNode, CodeNode, GridCell, GridNode, HeaderNode, ImageNode, InfoboxKind, InfoboxNode,
    ItemsListNode, Node, SurveyGroup, SurveyNode, TextNode, UrlNode,
};
use crate::options::ParseOptions;
use markup5ever_rcdom::Handle;
use url::Url;

/// Links to document comments.
const COMMENT_PREFIX: &str = "#cmnt";

/// Parse a complete export into a codelab.
pub fn parse_document(source: &[u8], options: &ParseOptions) -> Result<Codelab, ParseError> {
    let dom = dom::parse_html(source)?;
    let body = dom::find_tag(&dom.document, "body").ok_or(ParseError::MissingBody)?;
    let walker = GdocWalker::new(Stylesheet::from_document(&dom.document)?, options);
    let mut ds = DocState::new(options, body.clone());

    let mut next = dom::first_child(&body);
    while let Some(cur) = next {
        ds.cur = cur.clone();
        if walker.rec.is_comment(&cur) {
            break;
        }
        if has_class(&cur, "title") && ds.step.is_none() {
            let title = walker.stringify(&cur, true, false);
            if !title.is_empty() {
                ds.codelab.meta.title = title;
            }
            if ds.codelab.meta.id.is_empty() {
                ds.codelab.meta.id = slug(&ds.codelab.meta.title);
            }
        } else if dom::is_tag(&cur, "table") && ds.step.is_none() {
            walker.meta_table(&mut ds);
        } else if dom::is_tag(&cur, "h1") {
            let title = walker.stringify(&cur, true, false);
            if !title.is_empty() {
                ds.new_step(title);
            }
        } else if ds.step.is_some() {
            parse_top(&walker, &mut ds);
        }
        next = dom::next_sibling(&ds.cur);
    }
    Ok(ds.finish())
}

/// Parse an export holding step content only.
pub fn parse_fragment(source: &[u8], options: &ParseOptions) -> Result<Vec<Node>, ParseError> {
    let dom = dom::parse_html(source)?;
    let body = dom::find_tag(&dom.document, "body").ok_or(ParseError::MissingBody)?;
    let walker = GdocWalker::new(Stylesheet::from_document(&dom.document)?, options);
    let mut ds = DocState::new(options, body.clone());
    ds.new_step("fragment");

    let mut next = dom::first_child(&body);
    while let Some(cur) = next {
        ds.cur = cur.clone();
        if walker.rec.is_comment(&cur) {
            break;
        }
        if dom::is_tag(&cur, "h1") {
            return Err(ParseError::FragmentStepBoundary(
                walker.stringify(&cur, true, false),
            ));
        }
        parse_top(&walker, &mut ds);
        next = dom::next_sibling(&ds.cur);
    }
    reject_nested_imports(ds.finish_fragment())
}

/// Unwrap `https://www.google.com/url?q=...` redirector links.
pub(crate) fn clean_url(href: &str) -> String {
    if !href.contains("google.com/url?") {
        return href.to_string();
    }
    Url::parse(href)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}

fn is_comment_link(node: &Handle) -> bool {
    dom::is_tag(node, "a") && clean_url(&dom::attr_or_empty(node, "href")).starts_with(COMMENT_PREFIX)
}

pub(crate) struct GdocWalker<'o> {
    rec: Recognizer<'o>,
}

impl Walker for GdocWalker<'_> {
    fn parse_node(&self, ds: &mut DocState<'_>) -> Parsed {
        let cur = ds.cur.clone();
        if self.rec.is_meta(&cur) {
            self.meta_step(ds);
            return Parsed::Accepted(None);
        }
        if dom::is_text(&cur) || dom::is_tag(&cur, "br") {
            return self.text(ds).into();
        }
        if dom::is_tag(&cur, "a") {
            return self.link(ds).into();
        }
        if dom::is_tag(&cur, "img") {
            return self.image(ds).into();
        }
        if self.rec.is_button(&cur) {
            return self.button(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_HEADER) && is_header(&cur) {
            return self.header(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_LIST) && is_list(&cur) {
            return self.list(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_CODE) && self.rec.is_console(&cur) {
            return self.code(ds, true).into();
        }
        if !ds.skips(StateFlags::SKIP_CODE) && self.rec.is_code(&cur) {
            return self.code(ds, false).into();
        }
        if !ds.skips(StateFlags::SKIP_INFOBOX) && self.rec.is_infobox(&cur) {
            return self.infobox(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_SURVEY) && self.rec.is_survey(&cur) {
            return self.survey(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_TABLE) && is_table(&cur) {
            return self.table(ds).into();
        }
        Parsed::Rejected
    }
}

impl<'o> GdocWalker<'o> {
    fn new(css: Stylesheet, options: &'o ParseOptions) -> Self {
        GdocWalker {
            rec: Recognizer::new(css, &options.gdoc),
        }
    }

    /// Text content of `root` with typographic characters cleaned.
    ///
    /// Comment anchors are skipped. With `line_break`, `<br>` and block
    /// children start a new line.
    pub(crate) fn stringify(&self, root: &Handle, trim: bool, line_break: bool) -> String {
        let finish = |s: String| {
            let s = clean_text(&s);
            if trim {
                s.trim().to_string()
            } else {
                s
            }
        };
        if let Some(text) = dom::text_data(root) {
            return finish(text);
        }
        if dom::is_tag(root, "br") && !trim {
            return if line_break { "\n".to_string() } else { String::new() };
        }
        let mut buf = String::new();
        for child in dom::children(root) {
            if is_comment_link(&child) {
                continue;
            }
            if dom::is_tag(&child, "br") {
                if line_break {
                    buf.push('\n');
                }
                continue;
            }
            if let Some(text) = dom::text_data(&child) {
                buf.push_str(&text);
                continue;
            }
            if line_break && !dom::is_tag(&child, "span") && !dom::is_tag(&child, "a") {
                buf.push('\n');
            }
            buf.push_str(&self.stringify(&child, false, line_break));
        }
        finish(buf)
    }

    fn meta_table(&self, ds: &mut DocState<'_>) {
        for tr in dom::tag_run(&ds.cur, "tr") {
            let cells = dom::element_children(&tr);
            let [key, value, ..] = cells.as_slice() else {
                continue;
            };
            let key = self.stringify(key, true, false);
            let value = if snake_case(&key) == "summary" {
                self.stringify(value, true, true)
            } else {
                self.stringify(value, true, false)
            };
            apply_field(&mut ds.codelab.meta, &key, &value, &ds.options.pass_metadata);
        }
    }

    /// Consume a run of instruction elements and apply them to the step.
    fn meta_step(&self, ds: &mut DocState<'_>) {
        let mut text = String::new();
        loop {
            text.push_str(&self.stringify(&ds.cur, false, false));
            match dom::next_sibling(&ds.cur) {
                Some(next) if self.rec.is_meta(&next) => ds.cur = next,
                _ => break,
            }
        }
        ds.apply_instructions(text.trim());
    }

    fn header(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let flags =
            ds.flags | StateFlags::SKIP_BLOCK | StateFlags::SKIP_HEADER | StateFlags::SKIP_LIST;
        let nodes = parse_children(self, ds, None, flags);
        if nodes.is_empty() {
            return None;
        }
        let mut header = HeaderNode::new(header_level(&cur)?, compact_nodes(nodes));
        if header.is_empty() {
            return None;
        }
        header.mutate_type(header_kind(&self.stringify(&cur, true, false)));
        ds.reset_env();
        Some(header.into())
    }

    fn infobox(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let flags =
            ds.flags | StateFlags::SKIP_CODE | StateFlags::SKIP_INFOBOX | StateFlags::SKIP_SURVEY;
        let nodes = compact_nodes(block_nodes(parse_children(self, ds, None, flags)));
        if nodes.is_empty() {
            return None;
        }
        let kind = if self.rec.is_infobox_negative(&cur) {
            InfoboxKind::Negative
        } else {
            InfoboxKind::Positive
        };
        Some(InfoboxNode::new(kind, nodes).into())
    }

    fn table(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let rows: Vec<Vec<GridCell>> = dom::find_all(&ds.cur, "tr")
            .into_iter()
            .map(|tr| self.table_row(ds, tr))
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(GridNode::new(rows).into())
    }

    fn table_row(&self, ds: &mut DocState<'_>, tr: Handle) -> Vec<GridCell> {
        let mut row = Vec::new();
        for td in dom::tag_run(&tr, "td") {
            let flags = ds.flags | StateFlags::SKIP_BLOCK;
            let nodes = parse_children(self, ds, Some(td.clone()), flags);
            let mut cell = GridCell::new(compact_nodes(block_nodes(nodes)));
            cell.colspan = span_attr(&td, "colspan");
            cell.rowspan = span_attr(&td, "rowspan");
            row.push(cell);
        }
        row
    }

    /// A survey cell: question headers each followed by option lists.
    fn survey(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let container = dom::find_tag(&ds.cur, "ul").and_then(|ul| dom::parent(&ul))?;
        let children = dom::children(&container);
        let mut groups = Vec::new();
        let mut i = 0;
        while i < children.len() {
            if !is_header(&children[i]) {
                i += 1;
                continue;
            }
            let (options, next) = self.survey_options(&children, i + 1);
            if !options.is_empty() {
                groups.push(SurveyGroup {
                    name: self.stringify(&children[i], true, false),
                    options,
                });
            }
            i = next;
        }
        if groups.is_empty() {
            return None;
        }
        ds.survey += 1;
        let id = format!("{}-{}", ds.codelab.meta.id, ds.survey);
        Some(SurveyNode::new(id, groups).into())
    }

    /// Options from the lists following a question, up to the next header.
    fn survey_options(&self, siblings: &[Handle], from: usize) -> (Vec<String>, usize) {
        let mut options = Vec::new();
        for (i, node) in siblings.iter().enumerate().skip(from) {
            if is_header(node) {
                return (options, i);
            }
            if !dom::is_tag(node, "ul") {
                continue;
            }
            for li in dom::tag_run(node, "li") {
                options.push(self.stringify(&li, true, true));
            }
        }
        (options, siblings.len())
    }

    /// Code inside a table cell is a code block; anywhere else it is
    /// code-styled text.
    fn code(&self, ds: &mut DocState<'_>, term: bool) -> Option<Node> {
        let cur = ds.cur.clone();
        let Some(td) = dom::find_ancestor(&cur, "td") else {
            return self.text(ds);
        };
        let mut value = self.stringify(&cur, false, true);
        let parent = dom::parent(&cur);
        if value.is_empty() {
            if parent.as_ref().is_some_and(|p| dom::count_direct(p) > 1) {
                return None;
            }
            value = "\n".to_string();
        } else if dom::is_first_child(&cur) && !parent.as_ref().is_some_and(|p| dom::is_tag(p, "span")) {
            value.insert(0, '\n');
        }
        let mut node: Node = CodeNode::new(value, term, "").into();
        node.mutate_block(Some(ds.block_of(&td)));
        Some(node)
    }

    fn list(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let mut list_type = dom::attr_or_empty(&cur, "type");
        if dom::is_tag(&cur, "ol") && list_type.is_empty() {
            list_type = "1".to_string();
        }
        let start = dom::attr_or_empty(&cur, "start").parse().unwrap_or(0);
        let mut list = ItemsListNode::new(list_type, start);
        for li in dom::tag_run(&cur, "li") {
            let nodes = compact_nodes(parse_children(self, ds, Some(li), ds.flags));
            if !nodes.is_empty() {
                list.new_item(nodes);
            }
        }
        if list.items.is_empty() {
            return None;
        }
        list.mutate_type(items_kind(ds.last_node_type()));
        Some(list.into())
    }

    /// An image, or the video or iframe its alt text points at.
    fn image(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let mut alt = dom::attr_or_empty(&cur, "alt").replace('\n', " ");
        match embed_from_alt(&alt, ds.options) {
            Embed::Accepted(node) => return node,
            Embed::Rejected(message) => alt = message,
            Embed::Plain => {}
        }
        let src = dom::attr_or_empty(&cur, "src");
        if src.is_empty() {
            return None;
        }
        let mut image = ImageNode::new(src);
        // Malformed widths are unknown.
        image.width = style_float_value(&cur, "width").max(0.0);
        image.alt = alt;
        image.title = dom::attr_or_empty(&cur, "title");
        let mut node: Node = image.into();
        node.mutate_block(ds.block_parent(&cur));
        Some(node)
    }

    /// A link wrapping a button, or plain text when there is no link.
    fn button(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let Some(a) = dom::find_tag(&cur, "a") else {
            return self.text(ds);
        };
        let href = clean_url(&dom::attr_or_empty(&a, "href"));
        if href.is_empty() {
            return None;
        }
        let flags = StateFlags::SKIP_BLOCK | StateFlags::SKIP_LIST;
        let nodes = parse_children(self, ds, Some(a.clone()), flags);
        if nodes.is_empty() {
            return None;
        }
        let download = is_download_text(&self.stringify(&a, true, false));
        let button = ButtonNode::new(true, true, download, nodes);
        let mut node: Node = UrlNode::new(href, vec![button.into()]).into();
        node.mutate_block(ds.block_parent(&cur));
        Some(node)
    }

    /// A link, or styled text for in-document anchors.
    fn link(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let href = clean_url(&dom::attr_or_empty(&cur, "href"));
        if href.starts_with(COMMENT_PREFIX) {
            return None;
        }
        let value = self.stringify(&cur, false, true);
        if value.trim().is_empty() {
            return None;
        }
        let (bold, italic, code) = match dom::parent(&cur) {
            Some(p) => (self.rec.is_bold(&p), self.rec.is_italic(&p), self.rec.is_code(&p)),
            None => (false, false, false),
        };
        let text = TextNode {
            bold: bold || ds.skips(StateFlags::MAKE_BOLD),
            italic: italic || ds.skips(StateFlags::MAKE_ITALIC),
            code: code || ds.skips(StateFlags::MAKE_CODE),
            ..TextNode::new(value)
        };
        let block = ds.block_parent(&cur);
        let mut node: Node = if href.is_empty() || href.starts_with('#') {
            text.into()
        } else {
            let mut link = UrlNode::new(href, vec![text.into()]);
            link.name = dom::attr_or_empty(&cur, "name");
            if let Some(target) = dom::attr(&cur, "target").filter(|t| !t.is_empty()) {
                link.target = target;
            }
            link.into()
        };
        node.mutate_block(block);
        Some(node)
    }

    /// Text of the cursor, or the link it wraps.
    fn text(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let bold = self.rec.is_bold(&cur);
        let italic = self.rec.is_italic(&cur);
        let code = self.rec.is_code(&cur) || self.rec.is_console(&cur);

        if let Some(a) = dom::find_tag(&cur, "a") {
            let mut flags = StateFlags::SKIP_BLOCK;
            if bold {
                flags |= StateFlags::MAKE_BOLD;
            }
            if italic {
                flags |= StateFlags::MAKE_ITALIC;
            }
            if code {
                flags |= StateFlags::MAKE_CODE;
            }
            ds.push(Some(a), flags);
            let link = self.link(ds);
            ds.pop();
            if let Some(mut link) = link {
                link.mutate_block(ds.block_parent(&cur));
                return Some(link);
            }
        }

        let mut text = TextNode::new(self.stringify(&cur, false, true));
        if !text.value.trim().is_empty() {
            text.bold = bold;
            text.italic = italic;
            text.code = code;
        }
        let mut node: Node = text.into();
        node.mutate_block(ds.block_parent(&cur));
        Some(node)
    }
}

fn span_attr(node: &Handle, key: &str) -> usize {
    dom::attr_or_empty(node, key).parse().unwrap_or(1)
}
