//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry for all available source formats.
//! Formats are registered once at startup and retrieved by name afterwards; the
//! registry is read-only after construction and safe to share between threads.

use crate::error::ParseError;
use crate::format::Format;
use crate::ir::codelab::Codelab;
use crate::ir::nodes::Node;
use crate::options::ParseOptions;
use std::collections::HashMap;

/// Registry of codelab source formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let codelab = registry.parse(source, "md", &ParseOptions::default())?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// # Panics
    ///
    /// Registering two formats under the same name is a configuration error
    /// and panics. Use [`FormatRegistry::try_register`] to handle it instead.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        if let Err(err) = self.try_register(format) {
            panic!("{err}");
        }
    }

    /// Register a format, failing if its name is already taken
    pub fn try_register<F: Format + 'static>(&mut self, format: F) -> Result<(), ParseError> {
        let name = format.name().to_string();
        if self.formats.contains_key(&name) {
            return Err(ParseError::DuplicateFormat(name));
        }
        tracing::debug!(format = %name, "registered format");
        self.formats.insert(name, Box::new(format));
        Ok(())
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, ParseError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| ParseError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension
    ///
    /// Returns the format name if a matching extension is found, or None otherwise.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = FormatRegistry::default();
    /// assert_eq!(registry.detect_format_from_filename("lab.md"), Some("md".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("export.html"), Some("gdoc".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("doc.unknown"), None);
    /// ```
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension))
            .map(|format| format.name().to_string())
    }

    /// Parse a codelab using the specified format
    ///
    /// The parsed codelab's `url` is set to its id.
    pub fn parse(
        &self,
        source: &[u8],
        format: &str,
        options: &ParseOptions,
    ) -> Result<Codelab, ParseError> {
        let mut codelab = self.get(format)?.parse(source, options)?;
        codelab.meta.url = codelab.meta.id.clone();
        tracing::debug!(
            format = %format,
            id = %codelab.meta.id,
            steps = codelab.steps.len(),
            "parsed codelab"
        );
        Ok(codelab)
    }

    /// Parse a fragment using the specified format
    pub fn parse_fragment(
        &self,
        source: &[u8],
        format: &str,
        options: &ParseOptions,
    ) -> Result<Vec<Node>, ParseError> {
        self.get(format)?.parse_fragment(source, options)
    }

    /// Create a registry with the built-in formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::gdoc::GdocFormat);
        registry.register(crate::formats::markdown::MarkdownFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::codelab::Step;
    use crate::ir::nodes::TextNode;

    // Test format
    struct TestFormat;
    impl Format for TestFormat {
        fn name(&self) -> &str {
            "test"
        }
        fn description(&self) -> &str {
            "Test format"
        }
        fn file_extensions(&self) -> &[&str] {
            &["tst"]
        }
        fn parse(&self, _source: &[u8], _options: &ParseOptions) -> Result<Codelab, ParseError> {
            let mut codelab = Codelab::new();
            codelab.meta.id = "test-lab".to_string();
            codelab.steps.push(Step::new("only"));
            Ok(codelab)
        }
        fn parse_fragment(
            &self,
            _source: &[u8],
            _options: &ParseOptions,
        ) -> Result<Vec<Node>, ParseError> {
            Ok(vec![TextNode::new("fragment").into()])
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.formats.len(), 0);
    }

    #[test]
    fn test_registry_register() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        assert!(registry.has("test"));
        assert_eq!(registry.list_formats(), vec!["test"]);
    }

    #[test]
    fn test_registry_get() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let format = registry.get("test");
        assert!(format.is_ok());
        assert_eq!(format.unwrap().name(), "test");
    }

    #[test]
    fn test_registry_get_nonexistent() {
        let registry = FormatRegistry::new();
        let result = registry.get("nonexistent");
        assert!(matches!(result, Err(ParseError::FormatNotFound(name)) if name == "nonexistent"));
    }

    #[test]
    fn test_registry_parse_sets_url() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let codelab = registry
            .parse(b"input", "test", &ParseOptions::default())
            .unwrap();
        assert_eq!(codelab.meta.url, "test-lab");
        assert_eq!(codelab.steps.len(), 1);
    }

    #[test]
    fn test_registry_parse_not_found() {
        let registry = FormatRegistry::new();

        let result = registry.parse(b"input", "nonexistent", &ParseOptions::default());
        match result.unwrap_err() {
            ParseError::FormatNotFound(name) => assert_eq!(name, "nonexistent"),
            _ => panic!("Expected FormatNotFound error"),
        }
    }

    #[test]
    fn test_registry_parse_fragment() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let nodes = registry
            .parse_fragment(b"input", "test", &ParseOptions::default())
            .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_try_register_duplicate() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let result = registry.try_register(TestFormat);
        assert!(matches!(result, Err(ParseError::DuplicateFormat(name)) if name == "test"));
        assert_eq!(registry.list_formats().len(), 1);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_register_duplicate_panics() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);
        registry.register(TestFormat);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.list_formats(), vec!["gdoc", "md"]);
    }

    #[test]
    fn test_registry_default_trait() {
        let registry = FormatRegistry::default();
        assert!(registry.has("gdoc"));
        assert!(registry.has("md"));
    }

    #[test]
    fn test_detect_format_from_filename() {
        let registry = FormatRegistry::with_defaults();

        assert_eq!(
            registry.detect_format_from_filename("lab.md"),
            Some("md".to_string())
        );
        assert_eq!(
            registry.detect_format_from_filename("/path/to/lab.markdown"),
            Some("md".to_string())
        );
        assert_eq!(
            registry.detect_format_from_filename("export.html"),
            Some("gdoc".to_string())
        );
        assert_eq!(
            registry.detect_format_from_filename("export.htm"),
            Some("gdoc".to_string())
        );

        // Test unknown extension
        assert_eq!(registry.detect_format_from_filename("doc.unknown"), None);

        // Test no extension
        assert_eq!(registry.detect_format_from_filename("doc"), None);
    }
}
