//! Native package importer.

use super::{DocumentImporter, ImportOptions, ImportResult};
use crate::error::Result;
use crate::model::Document;

/// Loads an existing word-processing package as-is.
#[derive(Debug, Clone, Default)]
pub struct DocxImporter {
    _private: (),
}

impl DocxImporter {
    /// Create a new native importer.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentImporter for DocxImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["docx", "docm", "dotx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn import_bytes(&self, bytes: &[u8], _options: &ImportOptions) -> Result<ImportResult> {
        Ok(ImportResult::new(Document::load(bytes)?))
    }
}
