//! Markdown → HTML rendering
//!
//! The Markdown parser never looks at Markdown syntax itself: comrak renders
//! the source to HTML and the result is walked like any other markup tree.
//! Raw HTML is passed through since authors write buttons, asides, surveys
//! and videos as inline HTML.

use comrak::{markdown_to_html, ComrakOptions};

pub(crate) fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.render.unsafe_ = true;
    options
}

/// Render a Markdown source to an HTML fragment.
pub(crate) fn render_html(source: &str) -> String {
    markdown_to_html(source, &default_comrak_options())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_raw_html() {
        let html = render_html("# Title\n\n<button><a href=\"x\">Go</a></button>\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<button><a href=\"x\">Go</a></button>"));
    }

    #[test]
    fn test_render_fenced_code_language() {
        let html = render_html("```go\nfunc main() {}\n```\n");
        assert!(html.contains(r#"<code class="language-go">"#));
    }

    #[test]
    fn test_render_tables() {
        let html = render_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
