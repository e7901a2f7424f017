//! Document-level types.

use super::block::Block;
use super::paragraph::Paragraph;
use super::section::Section;
use super::styles::{StyleKind, StyleSheet};
use super::table::Table;
use super::xml::{XmlDocument, XmlElement, XmlNode};
use crate::error::{Error, Result};
use crate::package::{Package, REL_CORE_PROPERTIES, REL_STYLES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namespace declarations the main part must carry for generated content.
const REQUIRED_NAMESPACES: &[(&str, &str)] = &[
    (
        "xmlns:w",
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    ),
    (
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    ),
    (
        "xmlns:m",
        "http://schemas.openxmlformats.org/officeDocument/2006/math",
    ),
    (
        "xmlns:wp",
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing",
    ),
];

/// A loaded word-processing document.
///
/// The body is held as typed [`Block`]s; the rest of the main part and all
/// other package parts are kept as read so saving leaves them untouched.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Body content in document order
    pub blocks: Vec<Block>,

    /// Trailing section properties of the body
    pub section: Option<Section>,

    package: Package,
    main_part: String,
    shell: XmlDocument,
    styles: StyleSheet,
}

impl Document {
    /// Load a document from package bytes.
    ///
    /// Fails with [`Error::Format`] if the bytes are not a well-formed
    /// document container.
    pub fn load(data: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Load a document from a file.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load(&data)
    }

    /// An empty document built on the standard blank package.
    pub fn blank() -> Result<Self> {
        Self::from_package(Package::blank())
    }

    /// Build the document model over an already-read package.
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = package.main_document_part()?;
        let xml = package
            .part(&main_part)
            .ok_or_else(|| Error::Format(format!("missing {}", main_part)))?;
        let mut shell = XmlDocument::parse(xml)
            .map_err(|e| Error::Format(format!("{}: {}", main_part, e)))?;
        if shell.root.local_name() != "document" {
            return Err(Error::Format(format!(
                "unexpected root <{}> in {}",
                shell.root.name, main_part
            )));
        }
        let body = shell
            .root
            .child_mut("w:body")
            .ok_or_else(|| Error::Format("document has no body".into()))?;

        let mut blocks = Vec::new();
        let mut section = None;
        for node in std::mem::take(&mut body.children) {
            let XmlNode::Element(el) = node else {
                continue;
            };
            if el.name == "w:sectPr" {
                section = Some(Section::new(el));
            } else {
                blocks.push(Block::from_element(el));
            }
        }

        let styles = match package.related_part(&main_part, REL_STYLES)? {
            Some(name) => match package.part(&name).map(StyleSheet::parse) {
                Some(Ok(sheet)) => sheet,
                Some(Err(e)) => {
                    log::warn!("Ignoring unreadable styles part {}: {}", name, e);
                    StyleSheet::default()
                }
                None => StyleSheet::default(),
            },
            None => StyleSheet::default(),
        };

        let metadata = match package.related_part("", REL_CORE_PROPERTIES)? {
            Some(name) => package
                .part(&name)
                .and_then(|data| Metadata::parse(data).ok())
                .unwrap_or_default(),
            None => Metadata::default(),
        };

        log::debug!(
            "Loaded {} with {} blocks, {} styles",
            main_part,
            blocks.len(),
            styles.len()
        );

        Ok(Self {
            metadata,
            blocks,
            section,
            package,
            main_part,
            shell,
            styles,
        })
    }

    /// Serialize the document to package bytes.
    pub fn save(&self) -> Result<Vec<u8>> {
        let xml = self.main_part_xml()?;
        self.package
            .to_bytes_with(&[(self.main_part.as_str(), xml.as_slice())])
    }

    /// Serialize the document to a file.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.save()?)?;
        Ok(())
    }

    /// Serialize the main document part.
    pub fn main_part_xml(&self) -> Result<Vec<u8>> {
        let mut shell = self.shell.clone();
        for (key, uri) in REQUIRED_NAMESPACES {
            if shell.root.attr(key).is_none() {
                shell.root.set_attr(key, *uri);
            }
        }
        let body = shell
            .root
            .child_mut("w:body")
            .ok_or_else(|| Error::Format("document has no body".into()))?;
        body.children = self
            .blocks
            .iter()
            .map(|b| XmlNode::Element(b.to_element()))
            .collect();
        if let Some(ref section) = self.section {
            body.push(section.element.clone());
        }
        shell.to_bytes()
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Paragraph style sheet.
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Semantic style class of a paragraph.
    pub fn style_kind(&self, paragraph: &Paragraph) -> StyleKind {
        self.styles.kind(paragraph.style())
    }

    // ==================== Views ====================

    /// Top-level paragraphs in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Top-level paragraphs, mutably.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Paragraph by paragraph-only index.
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs().nth(index)
    }

    /// Paragraph by paragraph-only index, mutably.
    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs_mut().nth(index)
    }

    /// Number of top-level paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Top-level tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Top-level tables, mutably.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Number of top-level tables.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Block position of the paragraph with the given paragraph-only index.
    pub fn paragraph_block_index(&self, index: usize) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_paragraph())
            .nth(index)
            .map(|(pos, _)| pos)
    }

    /// Insert a paragraph directly after the paragraph at `index`.
    ///
    /// Returns the paragraph-only index of the inserted paragraph.
    pub fn insert_paragraph_after(&mut self, index: usize, paragraph: Paragraph) -> Option<usize> {
        let pos = self.paragraph_block_index(index)?;
        self.blocks.insert(pos + 1, Block::Paragraph(paragraph));
        Some(index + 1)
    }

    /// Append a block to the body.
    pub fn push_block(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    /// Append a paragraph to the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Append a table to the body.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Section properties, created empty if the body has none.
    pub fn section_mut(&mut self) -> &mut Section {
        self.section.get_or_insert_with(Section::default)
    }

    /// Check if the body has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the body, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ==================== Media ====================

    /// Store image bytes in the package and return the relationship id.
    pub fn add_image(&mut self, data: Vec<u8>, extension: &str) -> Result<String> {
        self.package.add_media(&self.main_part, data, extension)
    }

    /// Next free drawing object id (`wp:docPr/@id`).
    pub fn next_drawing_id(&self) -> u32 {
        fn max_id(el: &XmlElement) -> u32 {
            let own = if el.name == "wp:docPr" {
                el.attr("id").and_then(|v| v.parse().ok()).unwrap_or(0)
            } else {
                0
            };
            el.elements().map(max_id).fold(own, u32::max)
        }
        self.blocks
            .iter()
            .map(|b| max_id(&b.to_element()))
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Document metadata from the core properties part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Description
    pub description: Option<String>,

    /// Last author to save the document
    pub last_modified_by: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Parse a core properties part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(data)?;
        let mut meta = Metadata::default();
        for el in doc.root.elements() {
            let text = el.text_content().trim().to_string();
            if text.is_empty() {
                continue;
            }
            match el.local_name() {
                "title" => meta.title = Some(text),
                "creator" => meta.author = Some(text),
                "subject" => meta.subject = Some(text),
                "keywords" => meta.keywords = Some(text),
                "description" => meta.description = Some(text),
                "lastModifiedBy" => meta.last_modified_by = Some(text),
                "created" => meta.created = parse_w3cdtf(&text),
                "modified" => meta.modified = parse_w3cdtf(&text),
                _ => {}
            }
        }
        Ok(meta)
    }
}

fn parse_w3cdtf(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Run;

    #[test]
    fn test_blank_document() {
        let doc = Document::blank().unwrap();
        assert!(doc.is_empty());
        assert!(doc.section.is_some());
        assert_eq!(doc.style_kind(&Paragraph::with_style("Heading1")), StyleKind::Heading(1));
        assert!(doc.metadata.created.is_some());
    }

    #[test]
    fn test_views_and_insert() {
        let mut doc = Document::blank().unwrap();
        doc.add_paragraph(Paragraph::with_text("a"));
        doc.add_table(Table::grid(&[vec!["x".into()]]));
        doc.add_paragraph(Paragraph::with_text("b"));

        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.table_count(), 1);
        assert_eq!(doc.paragraph_block_index(1), Some(2));

        let idx = doc.insert_paragraph_after(0, Paragraph::with_text("a2")).unwrap();
        assert_eq!(idx, 1);
        let texts: Vec<_> = doc.paragraphs().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["a", "a2", "b"]);
        assert!(doc.blocks[2].is_table());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut doc = Document::blank().unwrap();
        let mut p = Paragraph::with_style("Heading1");
        p.add_run(Run::new("Title"));
        doc.add_paragraph(p);
        doc.add_paragraph(Paragraph::with_text("Body text."));

        let bytes = doc.save().unwrap();
        let back = Document::load(&bytes).unwrap();
        assert_eq!(back.blocks, doc.blocks);
        assert_eq!(back.section, doc.section);
        assert_eq!(back.package().part("word/styles.xml"), doc.package().part("word/styles.xml"));
    }

    #[test]
    fn test_load_garbage_is_format_error() {
        let err = Document::load(b"not a package").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_metadata_parse() {
        let xml = br#"<cp:coreProperties xmlns:cp="c" xmlns:dc="d" xmlns:dcterms="t">
            <dc:title>Report</dc:title><dc:creator>Ana</dc:creator>
            <dcterms:created>2024-03-01T10:00:00Z</dcterms:created>
        </cp:coreProperties>"#;
        let meta = Metadata::parse(xml).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Report"));
        assert_eq!(meta.author.as_deref(), Some("Ana"));
        assert_eq!(meta.created.unwrap().to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }
}
