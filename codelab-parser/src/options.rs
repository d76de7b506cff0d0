//! Parser options
//!
//! Callers usually build these from `codelab-config`; [`ParseOptions::default`]
//! mirrors the shipped defaults.

use std::collections::BTreeSet;

/// Hosts allowed to be embedded as iframes.
pub const DEFAULT_IFRAME_ALLOWLIST: &[&str] = &[
    "carto.com",
    "codepen.io",
    "dartlang.org",
    "dartpad.dev",
    "demo.arcade.software",
    "github.com",
    "glitch.com",
    "google.com",
    "google.dev",
    "observablehq.com",
    "repl.it",
    "web.dev",
];

/// Options shared by every format.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Extra metadata keys (snake case) copied verbatim into `Meta::extra`.
    pub pass_metadata: BTreeSet<String>,
    pub iframe_allowlist: Vec<String>,
    pub gdoc: GdocStyles,
}

impl ParseOptions {
    /// True if `host` may be embedded as an iframe.
    pub fn iframe_allowed(&self, host: &str) -> bool {
        self.iframe_allowlist.iter().any(|h| h == host)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            pass_metadata: BTreeSet::new(),
            iframe_allowlist: DEFAULT_IFRAME_ALLOWLIST
                .iter()
                .map(|h| h.to_string())
                .collect(),
            gdoc: GdocStyles::default(),
        }
    }
}

/// Styling conventions that mark constructs in word-processor exports.
///
/// Values are compared against lower-cased CSS values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdocStyles {
    /// Text colour of step instructions such as `Duration: 5`.
    pub meta_color: String,
    pub button_color: String,
    pub code_font: String,
    pub console_font: String,
    pub infobox_positive_color: String,
    pub infobox_negative_color: String,
    pub survey_color: String,
    /// Border of the trailing comments region.
    pub comment_border: String,
}

impl Default for GdocStyles {
    fn default() -> Self {
        GdocStyles {
            meta_color: "#b7b7b7".to_string(),
            button_color: "#6aa84f".to_string(),
            code_font: "courier new".to_string(),
            console_font: "consolas".to_string(),
            infobox_positive_color: "#d9ead3".to_string(),
            infobox_negative_color: "#fce5cd".to_string(),
            survey_color: "#cfe2f3".to_string(),
            comment_border: "1px solid black".to_string(),
        }
    }
}
