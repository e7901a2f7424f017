//! Source importers providing a plugin architecture for input formats.
//!
//! Each importer turns raw input bytes into a [`Document`]. The registry
//! maps lower-case file extensions to importers and dispatches on them.
//!
//! # Example
//!
//! ```no_run
//! use docfmt::import::{ImportOptions, ImporterRegistry};
//!
//! fn main() -> docfmt::Result<()> {
//!     let registry = ImporterRegistry::with_defaults();
//!     let result = registry.import_bytes(b"# Title\n\nBody.", "md", &ImportOptions::default())?;
//!     println!("{} paragraphs", result.document.paragraph_count());
//!     Ok(())
//! }
//! ```

mod docx;
mod inline;
mod markdown;
mod text;

pub use docx::DocxImporter;
pub use inline::parse_inline;
pub use markdown::MarkdownImporter;
pub use text::TextImporter;

use crate::error::{Error, Result};
use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Options for importing source documents.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Normalize text to Unicode NFC
    pub normalize_unicode: bool,

    /// Monospace font for code spans and code blocks
    pub code_font: String,

    /// Point size for code spans and code blocks
    pub code_font_size: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            code_font: "Consolas".to_string(),
            code_font_size: 10.0,
        }
    }
}

impl ImportOptions {
    /// Create new import options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalize_unicode(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Set the monospace font used for code.
    pub fn with_code_font(mut self, font: impl Into<String>, size: f64) -> Self {
        self.code_font = font.into();
        self.code_font_size = size;
        self
    }
}

/// Import statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportStats {
    /// Markdown block counts
    Markdown {
        /// Number of headings
        headings: usize,
        /// Number of plain paragraphs
        paragraphs: usize,
        /// Number of fenced code blocks
        code_blocks: usize,
        /// Number of list items
        lists: usize,
        /// Number of tables
        tables: usize,
        /// Number of blockquote lines
        blockquotes: usize,
    },
    /// Plain-text counts
    Text {
        /// Number of paragraphs produced
        paragraphs: usize,
        /// Number of input lines
        lines: usize,
    },
}

/// Result of an import.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// The imported document
    pub document: Document,

    /// Import statistics (none for native packages)
    pub stats: Option<ImportStats>,
}

impl ImportResult {
    /// Create a result without statistics.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            stats: None,
        }
    }

    /// Set import statistics.
    pub fn with_stats(mut self, stats: ImportStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Trait for source importers.
///
/// Implement this trait to add support for a new input format.
pub trait DocumentImporter: Send + Sync {
    /// Get the supported file extensions for this importer.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["md"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this importer.
    fn name(&self) -> &str;

    /// Import from bytes.
    fn import_bytes(&self, bytes: &[u8], options: &ImportOptions) -> Result<ImportResult>;

    /// Import a file at the given path.
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let bytes = std::fs::read(path)?;
        self.import_bytes(&bytes, options)
    }

    /// Check if this importer supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for source importers.
pub struct ImporterRegistry {
    importers: HashMap<String, Arc<dyn DocumentImporter>>,
    by_name: HashMap<String, Arc<dyn DocumentImporter>>,
}

impl ImporterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            importers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the Markdown, plain-text and native importers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownImporter::new()));
        registry.register(Arc::new(TextImporter::new()));
        registry.register(Arc::new(DocxImporter::new()));
        registry
    }

    /// Register an importer for all its supported extensions.
    pub fn register(&mut self, importer: Arc<dyn DocumentImporter>) {
        for ext in importer.supported_extensions() {
            self.importers.insert(ext.to_lowercase(), importer.clone());
        }
        self.by_name.insert(importer.name().to_lowercase(), importer);
    }

    /// Get an importer by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentImporter>> {
        self.importers.get(&ext.to_lowercase()).cloned()
    }

    /// Get an importer by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentImporter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.importers.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.importers.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Import a file using the importer for its extension.
    pub fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat("file has no extension".into()))?;
        self.importer_for(ext)?.import(path, options)
    }

    /// Import bytes using the extension to choose the importer.
    pub fn import_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        self.importer_for(ext)?.import_bytes(bytes, options)
    }

    fn importer_for(&self, ext: &str) -> Result<Arc<dyn DocumentImporter>> {
        self.get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no importer for extension: {}", ext)))
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Decode UTF-8 source text.
///
/// Strips a byte-order mark, unifies line endings and optionally applies
/// NFC normalization. Invalid UTF-8 fails with [`Error::Import`].
pub(crate) fn decode_text(bytes: &[u8], options: &ImportOptions) -> Result<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Import(format!("input is not valid UTF-8: {}", e)))?;
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    Ok(if options.normalize_unicode {
        text.nfc().collect()
    } else {
        text
    })
}
