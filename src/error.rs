//! Error types for docfmt library.

use std::io;
use thiserror::Error;

/// Result type alias for docfmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while importing, formatting or saving documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Source input (Markdown, plain text) could not be read.
    #[error("Import error: {0}")]
    Import(String),

    /// The document package is not a well-formed container.
    #[error("Malformed document package: {0}")]
    Format(String),

    /// Rule registration or parameter error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rule failed while being applied.
    #[error("Rule '{rule_id}' failed: {message}")]
    RuleExecution {
        /// Identifier of the failing rule
        rule_id: String,
        /// Failure description
        message: String,
    },

    /// Math conversion failed for a span.
    #[error("Math conversion error: {0}")]
    Conversion(String),

    /// The LaTeX source could not be parsed.
    #[error("LaTeX syntax error: {0}")]
    LatexSyntax(String),

    /// An external tool (diagram renderer) is missing or failed.
    #[error("External tool '{tool}' failed: {message}")]
    ExternalTool {
        /// Tool name
        tool: String,
        /// Failure description
        message: String,
    },

    /// The input format is not supported.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// XML reading or writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Zip container error.
    #[error("Zip error: {0}")]
    Zip(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts the whole processing request.
    ///
    /// Everything else degrades to a logged diagnostic or a failed fix record.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Import(_)
                | Error::Format(_)
                | Error::Io(_)
                | Error::Zip(_)
                | Error::Xml(_)
                | Error::UnsupportedFormat(_)
        )
    }

    /// Build a rule execution error.
    pub fn rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RuleExecution {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Build an external tool error.
    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Zip(err.to_string()),
        }
    }
}
