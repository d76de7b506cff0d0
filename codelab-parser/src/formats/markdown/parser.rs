//! Markdown → codelab
//!
//! Pipeline: Markdown source → comrak HTML → markup tree → codelab.
//!
//! The first `h1` is the title and the first paragraph while no id is known
//! is the metadata preamble. Every `h2` opens a step; everything after it is
//! offered to [`MarkdownWalker`].

use super::predicates::{
    aside_marker, header_level, is_bold, is_button, is_code, is_console, is_header, is_infobox,
    is_infobox_negative, is_italic, is_list, is_meta, is_survey, is_table, is_youtube,
};
use super::render::render_html;
use crate::common::compact::compact_nodes;
use crate::common::metadata::apply_field;
use crate::common::squash::block_nodes;
use crate::common::text::{clean_text, leading_number};
use crate::error::ParseError;
use crate::formats::common::dom;
use crate::formats::common::state::{DocState, StateFlags};
use crate::formats::common::walk::{parse_children, parse_top, Parsed, Walker};
use crate::formats::common::{
    embed_from_alt, header_kind, is_download_text, items_kind, reject_nested_imports, Embed,
};
use crate::ir::codelab::{Codelab, Meta};
use crate::ir::nodes::{
    BlockMarker, ButtonNode, CodeNode, GridCell, GridNode, HeaderNode, ImageNode, InfoboxKind,
    InfoboxNode, ItemsListNode, Node, SurveyGroup, SurveyNode, TextNode, UrlNode, YouTubeNode,
};
use crate::options::ParseOptions;
use markup5ever_rcdom::{Handle, RcDom};
use once_cell::sync::Lazy;
use regex::Regex;

static METADATA_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.+?):(.+)").expect("valid regex"));
static LANGUAGE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"language-(.+)").expect("valid regex"));

fn render(source: &[u8]) -> Result<RcDom, ParseError> {
    let source = std::str::from_utf8(source)?;
    dom::parse_html(render_html(source).as_bytes())
}

/// Parse a complete Markdown codelab.
pub fn parse_document(source: &[u8], options: &ParseOptions) -> Result<Codelab, ParseError> {
    let dom = render(source)?;
    let body = dom::find_tag(&dom.document, "body").ok_or(ParseError::MissingBody)?;
    let walker = MarkdownWalker;
    let mut ds = DocState::new(options, body.clone());

    let mut next = dom::first_child(&body);
    while let Some(cur) = next {
        ds.cur = cur.clone();
        if dom::is_tag(&cur, "h1") && ds.codelab.meta.title.is_empty() {
            let title = stringify(&cur, true);
            if !title.is_empty() {
                ds.codelab.meta.title = title;
            }
        } else if dom::is_tag(&cur, "p") && ds.codelab.meta.id.is_empty() {
            parse_metadata(&mut ds.codelab.meta, &cur, options)?;
        } else if dom::is_tag(&cur, "h2") {
            let title = stringify(&cur, true);
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

/// Parse a Markdown fragment holding step content only.
pub fn parse_fragment(source: &[u8], options: &ParseOptions) -> Result<Vec<Node>, ParseError> {
    let dom = render(source)?;
    let body = dom::find_tag(&dom.document, "body").ok_or(ParseError::MissingBody)?;
    let walker = MarkdownWalker;
    let mut ds = DocState::new(options, body.clone());
    ds.new_step("fragment");

    let mut next = dom::first_child(&body);
    while let Some(cur) = next {
        ds.cur = cur.clone();
        if dom::is_tag(&cur, "h2") {
            return Err(ParseError::FragmentStepBoundary(stringify(&cur, true)));
        }
        parse_top(&walker, &mut ds);
        next = dom::next_sibling(&ds.cur);
    }
    reject_nested_imports(ds.finish_fragment())
}

/// Read the `key: value` preamble paragraph into `meta`.
fn parse_metadata(meta: &mut Meta, p: &Handle, options: &ParseOptions) -> Result<(), ParseError> {
    let text = raw_text(p);
    let mut fields = Vec::new();
    for line in text.lines() {
        let Some(caps) = METADATA_LINE.captures(line) else {
            continue;
        };
        let key = caps[1].trim().to_lowercase();
        let value = caps[2].trim().to_string();
        fields.push((key, value));
    }
    if !fields.iter().any(|(k, v)| k == "id" && !v.is_empty()) {
        return Err(ParseError::MissingId);
    }
    for (key, value) in fields {
        apply_field(meta, &key, &value, &options.pass_metadata);
    }
    Ok(())
}

/// Every descendant text of `root`, concatenated as is.
fn raw_text(root: &Handle) -> String {
    if let Some(text) = dom::text_data(root) {
        return text;
    }
    dom::children(root).iter().map(raw_text).collect()
}

/// Text content of `root` with typographic characters cleaned.
///
/// Line breaks inside text are folded into spaces; `<br>` and block children
/// start a new line.
fn stringify(root: &Handle, trim: bool) -> String {
    let finish = |s: String| {
        let s = clean_text(&s);
        if trim {
            s.trim().to_string()
        } else {
            s
        }
    };
    if let Some(text) = dom::text_data(root) {
        return finish(text.replace('\n', " "));
    }
    if dom::is_tag(root, "br") && !trim {
        return "\n".to_string();
    }
    let mut buf = String::new();
    for child in dom::children(root) {
        if dom::is_tag(&child, "br") {
            buf.push('\n');
            continue;
        }
        if let Some(text) = dom::text_data(&child) {
            buf.push_str(&text);
            continue;
        }
        if !dom::is_tag(&child, "span") && !dom::is_tag(&child, "a") {
            buf.push('\n');
        }
        buf.push_str(&stringify(&child, false));
    }
    finish(buf)
}

/// Whitespace the renderer emits between block elements.
fn is_layout_whitespace(node: &Handle) -> bool {
    dom::text_data(node).is_some_and(|text| {
        text.trim().is_empty() && (text.contains('\n') || dom::find_block_parent(node).is_none())
    })
}

pub(crate) struct MarkdownWalker;

impl Walker for MarkdownWalker {
    fn parse_node(&self, ds: &mut DocState<'_>) -> Parsed {
        let cur = ds.cur.clone();
        if is_layout_whitespace(&cur) {
            return Parsed::Accepted(None);
        }
        if is_meta(&cur) {
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
        if is_youtube(&cur) {
            return self.youtube(ds).into();
        }
        if is_button(&cur) {
            return self.button(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_HEADER) && is_header(&cur) {
            return self.header(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_LIST) && is_list(&cur) {
            return self.list(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_CODE) && is_console(&cur) {
            return self.code(ds, true).into();
        }
        if !ds.skips(StateFlags::SKIP_CODE) && is_code(&cur) {
            return self.code(ds, false).into();
        }
        if !ds.skips(StateFlags::SKIP_INFOBOX) && is_infobox(&cur) {
            return self.infobox(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_SURVEY) && is_survey(&cur) {
            return self.survey(ds).into();
        }
        if !ds.skips(StateFlags::SKIP_TABLE) && is_table(&cur) {
            return self.table(ds).into();
        }
        Parsed::Rejected
    }
}

impl MarkdownWalker {
    /// Consume a run of instruction text nodes and apply them to the step.
    fn meta_step(&self, ds: &mut DocState<'_>) {
        let mut text = String::new();
        loop {
            text.push_str(&clean_text(&raw_text(&ds.cur)));
            match dom::next_sibling(&ds.cur) {
                Some(next) if is_meta(&next) => ds.cur = next,
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
        header.mutate_type(header_kind(&stringify(&cur, true)));
        ds.reset_env();
        Some(header.into())
    }

    /// An aside, or a block quote opened by an `aside` marker line.
    fn infobox(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let kind = if is_infobox_negative(&cur) {
            InfoboxKind::Negative
        } else {
            InfoboxKind::Positive
        };
        let flags = ds.flags | StateFlags::SKIP_INFOBOX | StateFlags::SKIP_SURVEY;
        let mut nodes = parse_children(self, ds, None, flags);
        if let Some(marker) = aside_marker(&cur) {
            strip_marker(&mut nodes, marker);
        }
        let nodes = compact_nodes(block_nodes(nodes));
        if nodes.is_empty() {
            return None;
        }
        Some(InfoboxNode::new(kind, nodes).into())
    }

    fn table(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let rows: Vec<Vec<GridCell>> = dom::find_all(&ds.cur, "tr")
            .into_iter()
            .map(|tr| self.table_row(ds, &tr))
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(GridNode::new(rows).into())
    }

    /// Header cells are kept as ordinary cells.
    fn table_row(&self, ds: &mut DocState<'_>, tr: &Handle) -> Vec<GridCell> {
        let mut row = Vec::new();
        for td in dom::element_children(tr) {
            if !dom::is_tag(&td, "td") && !dom::is_tag(&td, "th") {
                continue;
            }
            let flags = ds.flags | StateFlags::SKIP_BLOCK;
            let nodes = parse_children(self, ds, Some(td.clone()), flags);
            let mut cell = GridCell::new(compact_nodes(block_nodes(nodes)));
            cell.colspan = span_attr(&td, "colspan");
            cell.rowspan = span_attr(&td, "rowspan");
            row.push(cell);
        }
        row
    }

    /// A form of `<name>` questions, each followed by its `<input>` options.
    fn survey(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let mut elements = Vec::new();
        survey_elements(&ds.cur, &mut elements);

        let mut groups: Vec<SurveyGroup> = Vec::new();
        let mut current: Option<SurveyGroup> = None;
        for el in elements {
            if dom::is_tag(&el, "name") {
                groups.extend(current.take().filter(|g| !g.options.is_empty()));
                current = Some(SurveyGroup {
                    name: stringify(&el, true),
                    options: Vec::new(),
                });
                continue;
            }
            let value = clean_text(dom::attr_or_empty(&el, "value").trim());
            match current.as_mut() {
                Some(group) if !value.is_empty() => group.options.push(value),
                _ => {}
            }
        }
        groups.extend(current.filter(|g| !g.options.is_empty()));
        if groups.is_empty() {
            return None;
        }
        ds.survey += 1;
        let id = format!("{}-{}", ds.codelab.meta.id, ds.survey);
        Some(SurveyNode::new(id, groups).into())
    }

    /// Code under `<pre>` is a code block; anywhere else it is code-styled
    /// text.
    fn code(&self, ds: &mut DocState<'_>, term: bool) -> Option<Node> {
        let cur = ds.cur.clone();
        let Some(pre) = dom::find_ancestor(&cur, "pre") else {
            return self.text(ds);
        };
        let mut value = stringify(&cur, false);
        let parent = dom::parent(&cur);
        if value.is_empty() {
            if parent.as_ref().is_some_and(|p| dom::count_direct(p) > 1) {
                return None;
            }
            value = "\n".to_string();
        } else if dom::is_first_child(&cur) && !parent.as_ref().is_some_and(|p| dom::is_tag(p, "span")) {
            value.insert(0, '\n');
        }
        let lang = if term {
            String::new()
        } else {
            let class = dom::attr_or_empty(&cur, "class");
            LANGUAGE_CLASS
                .captures(&class)
                .map(|caps| caps[1].to_string())
                .unwrap_or_default()
        };
        let mut node: Node = CodeNode::new(value, term, lang).into();
        node.mutate_block(Some(ds.block_of(&pre)));
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
        let mut alt = dom::attr_or_empty(&cur, "alt");
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
        let width = dom::attr_or_empty(&cur, "width");
        image.width = leading_number(width.trim()).unwrap_or(0.0);
        image.alt = alt;
        image.title = dom::attr_or_empty(&cur, "title");
        let mut node: Node = image.into();
        node.mutate_block(ds.block_parent(&cur));
        Some(node)
    }

    fn youtube(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let id = dom::attr_or_empty(&ds.cur, "id");
        if id.trim().is_empty() {
            return None;
        }
        let mut node: Node = YouTubeNode::new(id.trim()).into();
        node.mutate_block(Some(BlockMarker::STANDALONE));
        Some(node)
    }

    /// A link wrapping a button, or plain text when there is no link.
    fn button(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let Some(a) = dom::find_tag(&cur, "a") else {
            return self.text(ds);
        };
        let href = dom::attr_or_empty(&a, "href");
        if href.is_empty() {
            return None;
        }
        let flags = StateFlags::SKIP_BLOCK | StateFlags::SKIP_LIST;
        let nodes = parse_children(self, ds, Some(a.clone()), flags);
        if nodes.is_empty() {
            return None;
        }
        let download = is_download_text(&stringify(&a, true));
        let button = ButtonNode::new(true, true, download, nodes);
        let mut node: Node = UrlNode::new(href, vec![button.into()]).into();
        node.mutate_block(ds.block_parent(&cur));
        Some(node)
    }

    fn link(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let href = dom::attr_or_empty(&cur, "href");
        let value = stringify(&cur, false);
        if value.trim().is_empty() {
            return None;
        }
        let (bold, italic, code) = match dom::parent(&cur) {
            Some(p) => (is_bold(&p), is_italic(&p), is_code(&p)),
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

    fn text(&self, ds: &mut DocState<'_>) -> Option<Node> {
        let cur = ds.cur.clone();
        let bold = is_bold(&cur);
        let italic = is_italic(&cur);
        let code = is_code(&cur) || is_console(&cur);

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

        let mut text = TextNode::new(stringify(&cur, false));
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

/// `<name>` and `<input>` elements under `root`, in document order.
fn survey_elements(root: &Handle, out: &mut Vec<Handle>) {
    for child in dom::children(root) {
        if dom::is_tag(&child, "name") || dom::is_tag(&child, "input") {
            out.push(child.clone());
        }
        survey_elements(&child, out);
    }
}

/// Remove the `aside ...` marker from the first text of a block quote.
fn strip_marker(nodes: &mut Vec<Node>, marker: &str) {
    let Some(Node::Text(first)) = nodes.first_mut() else {
        return;
    };
    let value = first.value.trim_start();
    let Some(rest) = value.get(marker.len()..) else {
        return;
    };
    first.value = rest.trim_start().to_string();
    if first.value.is_empty() {
        nodes.remove(0);
    }
}

fn span_attr(node: &Handle, key: &str) -> usize {
    dom::attr_or_empty(node, key).parse().unwrap_or(1)
}
