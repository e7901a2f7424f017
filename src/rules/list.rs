//! Literal list markers to list paragraphs.

use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::{Document, StyleKind};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

static ORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").unwrap());
static UNORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*+]\s+(.+)$").unwrap());

/// Turns paragraphs starting with `1. ` or `- ` into list paragraphs.
///
/// The marker is removed from the text and the paragraph gets the
/// `ListNumber` or `ListBullet` style. A summary fix listing every
/// converted paragraph comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListNumberingRule;

impl Rule for ListNumberingRule {
    fn id(&self) -> &str {
        "list_numbering"
    }

    fn name(&self) -> &str {
        "List markers"
    }

    fn category(&self) -> Category {
        Category::List
    }

    fn description(&self) -> &str {
        "Convert paragraphs starting with '1.' or '-' into list paragraphs."
    }

    fn priority(&self) -> i32 {
        55
    }

    fn apply(&self, doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
        let styles = doc.styles().clone();
        let mut fixes = Vec::new();
        let mut affected = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            if styles.kind(p.style()) == StyleKind::Code {
                continue;
            }
            let before = p.text();
            let text = before.trim();
            if text.is_empty() {
                continue;
            }
            let (style, content) = if let Some(caps) = ORDERED.captures(text) {
                ("ListNumber", caps.get(2).map(|m| m.as_str().to_string()))
            } else if let Some(caps) = UNORDERED.captures(text) {
                ("ListBullet", caps.get(1).map(|m| m.as_str().to_string()))
            } else {
                continue;
            };
            let Some(content) = content else {
                continue;
            };

            p.set_style(style);
            p.set_text(content);
            affected.push(i);
            fixes.push(
                Fix::new(format!("fix_list_numbering_{}", i), self.id(), "Normalized list item")
                    .with_paragraph(i)
                    .with_before(before.clone())
                    .with_after(p.text())
                    .with_location(json!({ "type": "list_item", "paragraph_index": i })),
            );
        }

        if !affected.is_empty() {
            let count = affected.len();
            fixes.insert(
                0,
                Fix::new(
                    "fix_list_numbering_summary",
                    self.id(),
                    format!("Normalized {} list items", count),
                )
                .with_paragraphs(affected)
                .with_location(json!({ "type": "list_numbering", "affected_count": count })),
            );
        }
        Ok(fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    #[test]
    fn test_markers_become_styles() {
        let mut doc = Document::blank().unwrap();
        doc.add_paragraph(Paragraph::with_text("1. first step"));
        doc.add_paragraph(Paragraph::with_text("plain"));
        doc.add_paragraph(Paragraph::with_text("- a bullet"));
        doc.add_paragraph(Paragraph::with_text("2.no space"));

        let fixes = ListNumberingRule.apply(&mut doc, &Params::default()).unwrap();
        assert_eq!(fixes.len(), 3);
        assert_eq!(fixes[0].id, "fix_list_numbering_summary");
        assert_eq!(fixes[0].paragraph_indices, vec![0, 2]);
        assert_eq!(fixes[1].before.as_deref(), Some("1. first step"));
        assert_eq!(fixes[1].after.as_deref(), Some("first step"));

        assert_eq!(doc.paragraph(0).unwrap().style(), Some("ListNumber"));
        assert_eq!(doc.paragraph(2).unwrap().style(), Some("ListBullet"));
        assert_eq!(doc.paragraph(2).unwrap().text(), "a bullet");
        assert_eq!(doc.paragraph(3).unwrap().style(), None);

        assert!(ListNumberingRule.apply(&mut doc, &Params::default()).unwrap().is_empty());
    }
}
