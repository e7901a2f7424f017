//! Plain-text importer.

use super::{decode_text, DocumentImporter, ImportOptions, ImportResult, ImportStats};
use crate::error::Result;
use crate::model::{Document, Paragraph, Run};

/// Plain-text importer.
///
/// Blank lines separate paragraphs; the lines of one group are joined with
/// line breaks. No inline formatting is recognized.
#[derive(Debug, Clone, Default)]
pub struct TextImporter {
    _private: (),
}

impl TextImporter {
    /// Create a new plain-text importer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a document from plain text.
    pub fn convert(&self, source: &str) -> Result<(Document, ImportStats)> {
        let mut doc = Document::blank()?;
        let lines: Vec<&str> = source.lines().collect();
        let mut paragraphs = 0;

        for group in lines.split(|l| l.trim().is_empty()) {
            if group.is_empty() {
                continue;
            }
            let mut p = Paragraph::new();
            p.add_run(Run::new(group.join("\n")));
            doc.add_paragraph(p);
            paragraphs += 1;
        }

        Ok((
            doc,
            ImportStats::Text {
                paragraphs,
                lines: lines.len(),
            },
        ))
    }
}

impl DocumentImporter for TextImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn import_bytes(&self, bytes: &[u8], options: &ImportOptions) -> Result<ImportResult> {
        let source = decode_text(bytes, options)?;
        let (document, stats) = self.convert(&source)?;
        Ok(ImportResult::new(document).with_stats(stats))
    }
}
