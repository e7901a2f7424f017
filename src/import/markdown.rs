//! Markdown importer.
//!
//! A line-oriented scanner for the Markdown subset the formatter needs:
//! fenced code, ATX headings, blockquotes, list items, pipe tables and
//! paragraphs. Unrecognized syntax degrades to a plain paragraph.

use super::inline::parse_inline;
use super::{decode_text, DocumentImporter, ImportOptions, ImportResult, ImportStats};
use crate::error::Result;
use crate::model::{Document, Paragraph, Run, Table};
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.+)$").unwrap());
static BULLET_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+").unwrap());
static NUMBER_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.+)$").unwrap());
static NUMBER_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+").unwrap());

/// Blockquote text colour.
const QUOTE_COLOR: &str = "666666";

/// Markdown importer.
#[derive(Debug, Clone, Default)]
pub struct MarkdownImporter {
    _private: (),
}

#[derive(Debug, Default)]
struct Counts {
    headings: usize,
    paragraphs: usize,
    code_blocks: usize,
    lists: usize,
    tables: usize,
    blockquotes: usize,
}

impl From<Counts> for ImportStats {
    fn from(c: Counts) -> Self {
        ImportStats::Markdown {
            headings: c.headings,
            paragraphs: c.paragraphs,
            code_blocks: c.code_blocks,
            lists: c.lists,
            tables: c.tables,
            blockquotes: c.blockquotes,
        }
    }
}

impl MarkdownImporter {
    /// Create a new Markdown importer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a document from Markdown text.
    pub fn convert(&self, source: &str, options: &ImportOptions) -> Result<(Document, ImportStats)> {
        let mut doc = Document::blank()?;
        let mut counts = Counts::default();
        let lines: Vec<&str> = source.split('\n').collect();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            if trimmed.is_empty() {
                i += 1;
                continue;
            }

            if let Some(lang) = trimmed.strip_prefix("```") {
                let lang = lang.trim().to_string();
                let mut code = Vec::new();
                i += 1;
                while i < lines.len() && !lines[i].trim().starts_with("```") {
                    code.push(lines[i]);
                    i += 1;
                }
                doc.add_paragraph(code_block(&code.join("\n"), &lang, options));
                counts.code_blocks += 1;
                // Skip the closing fence.
                i += 1;
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                let level = caps.get(1).map(|m| m.len()).unwrap_or(1);
                let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                let mut p = Paragraph::with_style(&format!("Heading{}", level));
                add_runs(&mut p, text, options);
                doc.add_paragraph(p);
                counts.headings += 1;
                i += 1;
                continue;
            }

            if let Some(quote) = trimmed.strip_prefix('>') {
                doc.add_paragraph(blockquote(quote.trim()));
                counts.blockquotes += 1;
                i += 1;
                continue;
            }

            if BULLET_START.is_match(line) {
                if let Some(caps) = BULLET_ITEM.captures(line) {
                    let mut p = Paragraph::with_style("ListBullet");
                    add_runs(&mut p, caps.get(1).map(|m| m.as_str()).unwrap_or_default(), options);
                    doc.add_paragraph(p);
                }
                counts.lists += 1;
                i += 1;
                continue;
            }

            if NUMBER_START.is_match(line) {
                if let Some(caps) = NUMBER_ITEM.captures(line) {
                    let mut p = Paragraph::with_style("ListNumber");
                    add_runs(&mut p, caps.get(1).map(|m| m.as_str()).unwrap_or_default(), options);
                    doc.add_paragraph(p);
                }
                counts.lists += 1;
                i += 1;
                continue;
            }

            if line.contains('|') && i + 1 < lines.len() && lines[i + 1].contains("---") {
                let mut table_lines = vec![line];
                i += 1;
                while i < lines.len() && lines[i].contains('|') {
                    table_lines.push(lines[i]);
                    i += 1;
                }
                if let Some(table) = pipe_table(&table_lines) {
                    doc.add_table(table);
                }
                counts.tables += 1;
                continue;
            }

            let mut p = Paragraph::new();
            add_runs(&mut p, line, options);
            doc.add_paragraph(p);
            counts.paragraphs += 1;
            i += 1;
        }

        log::debug!(
            "Markdown import: {} headings, {} paragraphs, {} code blocks, {} list items, {} tables",
            counts.headings,
            counts.paragraphs,
            counts.code_blocks,
            counts.lists,
            counts.tables
        );
        Ok((doc, counts.into()))
    }
}

fn add_runs(p: &mut Paragraph, text: &str, options: &ImportOptions) {
    for run in parse_inline(text, options) {
        p.add_run(run);
    }
}

fn code_block(code: &str, lang: &str, options: &ImportOptions) -> Paragraph {
    let mut p = Paragraph::with_style("Code");
    p.set_left_indent(36.0);
    p.set_shading("F5F5F5");
    // Diagram sources keep their fence so the renderer can find them.
    let text = if lang.eq_ignore_ascii_case("mermaid") {
        format!("```mermaid\n{}\n```", code)
    } else {
        code.to_string()
    };
    let mut run = Run::new(text);
    run.set_font_family(&options.code_font);
    run.set_size(options.code_font_size);
    p.add_run(run);
    p
}

fn blockquote(text: &str) -> Paragraph {
    let mut p = Paragraph::with_style("Quote");
    p.set_left_indent(36.0);
    let mut run = Run::italic(text);
    run.set_color(QUOTE_COLOR);
    p.add_run(run);
    p
}

fn split_row(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn pipe_table(lines: &[&str]) -> Option<Table> {
    let headers = split_row(lines.first()?);
    if headers.is_empty() {
        return None;
    }
    let cols = headers.len();
    let mut rows = vec![headers];
    // Index 1 is the separator row.
    for line in lines.iter().skip(2) {
        let mut cells = split_row(line);
        if cells.is_empty() {
            continue;
        }
        cells.truncate(cols);
        cells.resize(cols, String::new());
        rows.push(cells);
    }
    Some(Table::grid(&rows))
}

impl DocumentImporter for MarkdownImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn import_bytes(&self, bytes: &[u8], options: &ImportOptions) -> Result<ImportResult> {
        let source = decode_text(bytes, options)?;
        let (document, stats) = self.convert(&source, options)?;
        Ok(ImportResult::new(document).with_stats(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleKind;

    fn import(src: &str) -> (Document, ImportStats) {
        MarkdownImporter::new()
            .convert(src, &ImportOptions::default())
            .unwrap()
    }

    #[test]
    fn test_heading_and_body() {
        let (doc, stats) = import("# Title\n\nBody text.");
        assert_eq!(doc.paragraph_count(), 2);
        let heading = doc.paragraph(0).unwrap();
        assert_eq!(heading.style(), Some("Heading1"));
        assert_eq!(doc.style_kind(heading), StyleKind::Heading(1));
        assert_eq!(heading.runs().next().unwrap().is_bold(), None);
        assert_eq!(doc.paragraph(1).unwrap().text(), "Body text.");
        assert_eq!(
            stats,
            ImportStats::Markdown {
                headings: 1,
                paragraphs: 1,
                code_blocks: 0,
                lists: 0,
                tables: 0,
                blockquotes: 0
            }
        );
    }

    #[test]
    fn test_code_block_verbatim() {
        let (doc, _) = import("```rust\nfn main() {\n    **not bold**\n}\n```\nafter");
        let code = doc.paragraph(0).unwrap();
        assert_eq!(code.style(), Some("Code"));
        assert_eq!(code.text(), "fn main() {\n    **not bold**\n}");
        assert_eq!(code.run_count(), 1);
        assert_eq!(doc.paragraph(1).unwrap().text(), "after");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let (doc, stats) = import("```\nline one\nline two");
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.paragraph(0).unwrap().text(), "line one\nline two");
        assert!(matches!(stats, ImportStats::Markdown { code_blocks: 1, .. }));
    }

    #[test]
    fn test_mermaid_block_keeps_fence() {
        let (doc, _) = import("```mermaid\ngraph TD; A-->B\n```");
        assert_eq!(doc.paragraph(0).unwrap().text(), "```mermaid\ngraph TD; A-->B\n```");
    }

    #[test]
    fn test_lists_and_quote() {
        let (doc, stats) = import("- one\n* two\n1. first\n> quoted");
        let styles: Vec<_> = doc.paragraphs().map(|p| p.style().unwrap_or("")).collect();
        assert_eq!(styles, vec!["ListBullet", "ListBullet", "ListNumber", "Quote"]);
        assert_eq!(doc.paragraph(2).unwrap().text(), "first");
        let quote = doc.paragraph(3).unwrap().runs().next().unwrap();
        assert_eq!(quote.is_italic(), Some(true));
        assert!(matches!(stats, ImportStats::Markdown { lists: 3, blockquotes: 1, .. }));
    }

    #[test]
    fn test_pipe_table() {
        let (doc, stats) = import("| A | B |\n|---|---|\n| 1 | 2 |\n| 3 |\n\ntext");
        assert_eq!(doc.table_count(), 1);
        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.text(), "A\tB\n1\t2\n3\t");
        assert!(matches!(stats, ImportStats::Markdown { tables: 1, paragraphs: 1, .. }));
    }

    #[test]
    fn test_unrecognized_degrades_to_paragraph() {
        let (doc, stats) = import("####### seven hashes\n|just a pipe");
        assert_eq!(doc.paragraph_count(), 2);
        assert!(matches!(stats, ImportStats::Markdown { paragraphs: 2, headings: 0, .. }));
    }
}
