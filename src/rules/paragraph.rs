//! Paragraph spacing and first-line indentation.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::{Document, StyleKind};
use serde_json::{json, Map, Value};

/// Points per character of first-line indent.
const POINTS_PER_CHAR: f64 = 12.0;

/// Sets line spacing and the space before and after every paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphSpacingRule;

impl Rule for ParagraphSpacingRule {
    fn id(&self) -> &str {
        "paragraph_spacing"
    }

    fn name(&self) -> &str {
        "Paragraph spacing"
    }

    fn category(&self) -> Category {
        Category::Paragraph
    }

    fn description(&self) -> &str {
        "Set line spacing and the space before and after paragraphs."
    }

    fn priority(&self) -> i32 {
        50
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "line_spacing": 1.5,
            "space_before": 0,
            "space_after": 6
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let line = params.f64("line_spacing", 1.5);
        let before = params.f64("space_before", 0.0);
        let after = params.f64("space_after", 6.0);
        let mut affected = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let mut changed = p.set_line_spacing(line);
            changed |= p.set_space_before(before);
            changed |= p.set_space_after(after);
            if changed {
                affected.push(i);
            }
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Fix::new(
            "fix_spacing_all",
            self.id(),
            format!(
                "Applied line spacing {}x, {}pt before, {}pt after",
                line, before, after
            ),
        )
        .with_paragraphs(affected)
        .with_after(format!("{}x/{}pt/{}pt", line, before, after))])
    }
}

/// Indents the first line of body paragraphs.
///
/// Only plain body text is indented: headings, list items, captions, code
/// and empty paragraphs are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLineIndentRule;

impl Rule for FirstLineIndentRule {
    fn id(&self) -> &str {
        "first_line_indent"
    }

    fn name(&self) -> &str {
        "First-line indent"
    }

    fn category(&self) -> Category {
        Category::Paragraph
    }

    fn description(&self) -> &str {
        "Indent the first line of body paragraphs by a number of characters."
    }

    fn priority(&self) -> i32 {
        90
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "indent_size": 2 }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let chars = params.f64("indent_size", 2.0);
        let indent = chars * POINTS_PER_CHAR;
        let styles = doc.styles().clone();
        let mut affected = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            if styles.kind(p.style()) != StyleKind::Body || p.is_empty() {
                continue;
            }
            if p.set_first_line_indent(indent) {
                affected.push(i);
            }
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Fix::new(
            "fix_first_line_indent",
            self.id(),
            format!("Applied a {}-character first-line indent", chars),
        )
        .with_paragraphs(affected)
        .with_after(format!("{}pt", indent))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Run};

    fn doc() -> Document {
        let mut doc = Document::blank().unwrap();
        let mut heading = Paragraph::with_style("Heading1");
        heading.add_run(Run::new("Heading"));
        doc.add_paragraph(heading);
        doc.add_paragraph(Paragraph::with_text("Body one."));
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::with_text("Body two."));
        doc
    }

    #[test]
    fn test_spacing_converges() {
        let mut doc = doc();
        let rule = ParagraphSpacingRule;
        let params = Params::new(rule.default_params());
        let fixes = rule.apply(&mut doc, &params).unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].paragraph_indices, vec![0, 1, 2, 3]);
        let p = doc.paragraph(1).unwrap();
        assert_eq!(p.line_spacing(), Some(1.5));
        assert_eq!(p.space_after(), Some(6.0));
        assert!(rule.apply(&mut doc, &params).unwrap().is_empty());
    }

    #[test]
    fn test_first_line_indent_body_only() {
        let mut doc = doc();
        let rule = FirstLineIndentRule;
        let fixes = rule
            .apply(&mut doc, &Params::default().with("indent_size", 2))
            .unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].paragraph_indices, vec![1, 3]);
        assert_eq!(doc.paragraph(1).unwrap().first_line_indent(), Some(24.0));
        assert_eq!(doc.paragraph(0).unwrap().first_line_indent(), None);
        assert!(rule
            .apply(&mut doc, &Params::default().with("indent_size", 2))
            .unwrap()
            .is_empty());
    }
}
