//! Input format detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Zip local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// Markdown source
    Markdown,
    /// Plain text
    Text,
    /// Word document package
    Docx,
}

impl InputFormat {
    /// Canonical file extension, used to pick an importer.
    pub fn extension(&self) -> &'static str {
        match self {
            InputFormat::Markdown => "md",
            InputFormat::Text => "txt",
            InputFormat::Docx => "docx",
        }
    }

    /// Format for a file extension (case-insensitive, no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(InputFormat::Markdown),
            "txt" | "text" => Some(InputFormat::Text),
            "docx" => Some(InputFormat::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Markdown => write!(f, "Markdown"),
            InputFormat::Text => write!(f, "plain text"),
            InputFormat::Docx => write!(f, "DOCX"),
        }
    }
}

/// Check whether bytes start with a zip header.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Detect the format of an in-memory input.
///
/// The file name extension decides when it is known. Otherwise a zip
/// header means a document package, valid UTF-8 means Markdown, and
/// anything else is rejected.
pub fn detect_format(file_name: &str, data: &[u8]) -> Result<InputFormat> {
    let by_name = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension);
    if let Some(format) = by_name {
        return Ok(format);
    }
    detect_format_from_bytes(data)
}

/// Detect the format from content alone.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    if is_zip_bytes(data) {
        return Ok(InputFormat::Docx);
    }
    if std::str::from_utf8(data).is_ok() {
        return Ok(InputFormat::Markdown);
    }
    Err(Error::UnsupportedFormat(
        "input is neither a document package nor UTF-8 text".into(),
    ))
}

/// Detect the format of a file, sniffing its header when the extension is unknown.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let path = path.as_ref();
    if let Some(format) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension)
    {
        return Ok(format);
    }
    let file = File::open(path)?;
    let mut data = Vec::new();
    BufReader::new(file).read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}
