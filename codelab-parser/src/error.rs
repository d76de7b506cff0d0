//! Error types for parsing and format lookup

/// Errors that can occur while parsing a codelab or one of its fragments.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Format not found in registry
    #[error("no parser named {0:?}")]
    FormatNotFound(String),

    /// A format with the same name is already registered
    #[error("parser {0:?} is already registered")]
    DuplicateFormat(String),

    #[error("document without a body")]
    MissingBody,

    #[error("invalid metadata format, missing at least id")]
    MissingId,

    #[error("error parsing CSS at {pos}: {message}")]
    Css { pos: usize, message: String },

    #[error("failed to read source")]
    Io(#[from] std::io::Error),

    #[error("source is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    /// A fragment contains a heading that would open a new step
    #[error("fragment contains a step boundary: {0:?}")]
    FragmentStepBoundary(String),

    /// A fragment contains an import directive of its own
    #[error("fragment contains a nested import of {0}")]
    NestedImport(String),

    #[error("fragment was not fetched")]
    FragmentNotFetched,

    /// A single imported fragment could not be resolved
    #[error("import {url}: {source}")]
    Import {
        url: String,
        #[source]
        source: Box<ParseError>,
    },

    /// Every failure collected while resolving the imports of a codelab
    #[error("{} import(s) failed: {}", .0.len(), join_errors(.0))]
    Imports(Vec<ParseError>),
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ParseError::FormatNotFound("docx".into()).to_string(),
            r#"no parser named "docx""#
        );
        let err = ParseError::Imports(vec![
            ParseError::Import {
                url: "a".into(),
                source: Box::new(ParseError::MissingBody),
            },
            ParseError::Import {
                url: "b".into(),
                source: Box::new(ParseError::FormatNotFound("x".into())),
            },
        ]);
        assert_eq!(
            err.to_string(),
            r#"2 import(s) failed: import a: document without a body; import b: no parser named "x""#
        );
    }
}
