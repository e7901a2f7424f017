//! Integration tests for the importer module.

use std::sync::Arc;

use docfmt::import::{DocxImporter, MarkdownImporter, TextImporter};
use docfmt::model::StyleKind;
use docfmt::{
    Document, DocumentImporter, Error, ImportOptions, ImportResult, ImportStats, ImporterRegistry,
    Paragraph,
};

/// Mock importer for testing.
struct MockImporter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockImporter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentImporter for MockImporter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn import_bytes(&self, bytes: &[u8], _options: &ImportOptions) -> docfmt::Result<ImportResult> {
        let mut doc = Document::blank()?;
        doc.add_paragraph(Paragraph::with_text(format!(
            "{} bytes via {}",
            bytes.len(),
            self.name
        )));
        Ok(ImportResult::new(doc))
    }
}

#[test]
fn test_import_options_builder() {
    let options = ImportOptions::new()
        .with_normalize_unicode(false)
        .with_code_font("Courier New", 9.0);

    assert!(!options.normalize_unicode);
    assert_eq!(options.code_font, "Courier New");
    assert_eq!(options.code_font_size, 9.0);
}

#[test]
fn test_registry_with_defaults() {
    let registry = ImporterRegistry::with_defaults();

    assert!(registry.supports("md"));
    assert!(registry.supports("MARKDOWN")); // Case insensitive
    assert!(registry.supports("txt"));
    assert!(registry.supports("docx"));
    assert!(!registry.supports("pdf"));
    assert_eq!(registry.get_by_name("Markdown").unwrap().name(), "markdown");
}

#[test]
fn test_registry_register() {
    let mut registry = ImporterRegistry::new();
    assert!(!registry.supports("rst"));

    registry.register(Arc::new(MockImporter::new(vec!["rst"], "restructured")));

    assert!(registry.supports("rst"));
    let result = registry
        .import_bytes(b"hello", "RST", &ImportOptions::default())
        .unwrap();
    assert_eq!(
        result.document.paragraph(0).unwrap().text(),
        "5 bytes via restructured"
    );
    assert!(result.stats.is_none());
}

#[test]
fn test_unknown_extension() {
    let registry = ImporterRegistry::with_defaults();
    let err = registry
        .import_bytes(b"data", "xyz", &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
}

#[test]
fn test_markdown_document_structure() {
    let source = "# Title\n\n\
## Background\n\n\
Some **bold** context.\n\n\
```\nlet x = 1;\n```\n\n\
1. one\n\
2. two\n\n\
> a quote\n\n\
| H1 | H2 |\n|---|---|\n| a | b |\n";

    let result = MarkdownImporter::new()
        .import_bytes(source.as_bytes(), &ImportOptions::default())
        .unwrap();
    let doc = &result.document;

    let kinds: Vec<StyleKind> = doc.paragraphs().map(|p| doc.style_kind(p)).collect();
    assert_eq!(
        kinds,
        vec![
            StyleKind::Heading(1),
            StyleKind::Heading(2),
            StyleKind::Body,
            StyleKind::Code,
            StyleKind::ListNumber,
            StyleKind::ListNumber,
            StyleKind::Quote,
        ]
    );
    assert_eq!(doc.table_count(), 1);
    assert_eq!(
        result.stats,
        Some(ImportStats::Markdown {
            headings: 2,
            paragraphs: 1,
            code_blocks: 1,
            lists: 2,
            tables: 1,
            blockquotes: 1,
        })
    );

    let body = doc.paragraph(2).unwrap();
    let bold: Vec<_> = body.runs().filter(|r| r.is_bold() == Some(true)).collect();
    assert_eq!(bold.len(), 1);
    assert_eq!(bold[0].text(), "bold");
}

#[test]
fn test_markdown_keeps_math_source() {
    let result = MarkdownImporter::new()
        .import_bytes(b"Inline $a_1$ and $$x^2$$", &ImportOptions::default())
        .unwrap();
    assert_eq!(
        result.document.paragraph(0).unwrap().text(),
        "Inline $a_1$ and $$x^2$$"
    );
}

#[test]
fn test_unicode_normalization() {
    let source = "Cafe\u{301}";
    let normalized = TextImporter::new()
        .import_bytes(source.as_bytes(), &ImportOptions::default())
        .unwrap();
    assert_eq!(normalized.document.paragraph(0).unwrap().text(), "Caf\u{e9}");

    let raw = TextImporter::new()
        .import_bytes(
            source.as_bytes(),
            &ImportOptions::new().with_normalize_unicode(false),
        )
        .unwrap();
    assert_eq!(raw.document.paragraph(0).unwrap().text(), source);
}

#[test]
fn test_crlf_and_bom() {
    let result = TextImporter::new()
        .import_bytes(b"\xEF\xBB\xBFone\r\n\r\ntwo", &ImportOptions::default())
        .unwrap();
    let texts: Vec<_> = result.document.paragraphs().map(|p| p.text()).collect();
    assert_eq!(texts, vec!["one", "two"]);
}

#[test]
fn test_invalid_utf8_is_import_error() {
    let err = MarkdownImporter::new()
        .import_bytes(b"\xff\xfe bad", &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Import(_)));
}

#[test]
fn test_docx_importer_loads_package() {
    let mut doc = Document::blank().unwrap();
    doc.add_paragraph(Paragraph::with_text("Saved"));
    let bytes = doc.save().unwrap();

    let result = DocxImporter::new()
        .import_bytes(&bytes, &ImportOptions::default())
        .unwrap();
    assert_eq!(result.document.paragraph(0).unwrap().text(), "Saved");
    assert!(result.stats.is_none());
}

#[test]
fn test_import_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.markdown");
    std::fs::write(&path, "# Notes\n\nbody").unwrap();

    let result = docfmt::import_file(&path).unwrap();
    assert_eq!(result.document.paragraph_count(), 2);
    assert_eq!(
        docfmt::detect_format_from_path(&path).unwrap(),
        docfmt::InputFormat::Markdown
    );
}
