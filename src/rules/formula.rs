//! Formula rules: LaTeX conversion, numbering, inline style and centring.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::math::{Conversion, MathConverter};
use crate::model::{is_equation_number, Alignment, Document, MathKind, Run};
use serde_json::{json, Map, Value};

/// Converts LaTeX spans in paragraph text into native Word math.
///
/// One span per paragraph is converted: the first delimiter kind found,
/// display forms before inline ones.
#[derive(Debug, Clone, Default)]
pub struct LatexToOmmlRule {
    converter: MathConverter,
}

impl LatexToOmmlRule {
    /// Rule backed by a specific converter.
    pub fn with_converter(converter: MathConverter) -> Self {
        Self { converter }
    }
}

impl Rule for LatexToOmmlRule {
    fn id(&self) -> &str {
        "latex_to_omml"
    }

    fn name(&self) -> &str {
        "LaTeX to Word math"
    }

    fn category(&self) -> Category {
        Category::Formula
    }

    fn description(&self) -> &str {
        "Convert LaTeX formulas in the text into native Word equations."
    }

    fn priority(&self) -> i32 {
        140
    }

    fn apply(&self, doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let Some(outcome) = self.converter.convert_paragraph(p) else {
                continue;
            };
            let span = outcome.span();
            let location = json!({
                "paragraph_index": i,
                "type": "formula",
                "kind": span.kind,
                "start": span.start,
                "end": span.end,
            });
            let fix = match &outcome {
                Conversion::Converted(span) => Fix::new(
                    format!("fix_latex_{}", i),
                    self.id(),
                    format!("Converted {} formula to Word math", kind_label(span.kind)),
                )
                .with_paragraph(i)
                .with_before(span.latex.clone())
                .with_after("OMML"),
                Conversion::Failed { span, error } => Fix::new(
                    format!("err_latex_{}", i),
                    self.id(),
                    format!("Formula conversion failed: {}", error),
                )
                .with_paragraph(i)
                .with_before(span.latex.clone())
                .failed(),
            };
            fixes.push(fix.with_location(location));
        }
        Ok(fixes)
    }
}

fn kind_label(kind: MathKind) -> &'static str {
    match kind {
        MathKind::Display => "display",
        MathKind::Inline => "inline",
    }
}

/// Appends a sequential `(n)` number to display formulas.
///
/// Formulas that already end with a number keep it and still advance the
/// counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaNumberingRule;

impl Rule for FormulaNumberingRule {
    fn id(&self) -> &str {
        "formula_numbering"
    }

    fn name(&self) -> &str {
        "Formula numbering"
    }

    fn category(&self) -> Category {
        Category::Formula
    }

    fn description(&self) -> &str {
        "Number display formulas sequentially."
    }

    fn priority(&self) -> i32 {
        150
    }

    fn apply(&self, doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
        let mut fixes = Vec::new();
        let mut counter = 0;

        for (i, p) in doc.paragraphs_mut().enumerate() {
            if p.math_kind() != Some(MathKind::Display) {
                continue;
            }
            counter += 1;
            let numbered = p
                .runs()
                .last()
                .is_some_and(|r| is_equation_number(&r.text()));
            if numbered {
                continue;
            }
            let label = format!("({})", counter);
            p.add_run(Run::new(format!(" {}", label)));
            fixes.push(
                Fix::new(
                    format!("fix_formula_numbering_{}", i),
                    self.id(),
                    format!("Added formula number {}", label),
                )
                .with_paragraph(i)
                .with_after(label),
            );
        }
        Ok(fixes)
    }
}

/// Applies the math font to inline formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineFormulaStyleRule;

impl Rule for InlineFormulaStyleRule {
    fn id(&self) -> &str {
        "inline_formula_style"
    }

    fn name(&self) -> &str {
        "Inline formula style"
    }

    fn category(&self) -> Category {
        Category::Formula
    }

    fn description(&self) -> &str {
        "Apply a consistent font to formulas embedded in text."
    }

    fn priority(&self) -> i32 {
        160
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "font": "Cambria Math" }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let font = params.str("font", "Cambria Math");
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            if p.math_kind() != Some(MathKind::Inline) {
                continue;
            }
            let mut changed = false;
            for node in p.math_nodes_mut() {
                changed |= node.set_run_font(&font);
            }
            if changed {
                fixes.push(
                    Fix::new(
                        format!("fix_inline_formula_style_{}", i),
                        self.id(),
                        "Applied inline formula style",
                    )
                    .with_paragraph(i)
                    .with_after(font.clone()),
                );
            }
        }
        Ok(fixes)
    }
}

/// Centres paragraphs holding a display formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayFormulaCenterRule;

impl Rule for DisplayFormulaCenterRule {
    fn id(&self) -> &str {
        "display_formula_center"
    }

    fn name(&self) -> &str {
        "Centre display formulas"
    }

    fn category(&self) -> Category {
        Category::Formula
    }

    fn description(&self) -> &str {
        "Centre display formulas on their line."
    }

    fn priority(&self) -> i32 {
        170
    }

    fn apply(&self, doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            if p.math_kind() != Some(MathKind::Display) {
                continue;
            }
            let before = p.alignment().unwrap_or_default();
            let mut changed = p.set_alignment(Alignment::Center);
            for node in p.math_nodes_mut() {
                changed |= node.set_justification("center");
            }
            if changed {
                fixes.push(
                    Fix::new(
                        format!("fix_display_formula_center_{}", i),
                        self.id(),
                        "Centred display formula",
                    )
                    .with_paragraph(i)
                    .with_before(before.to_string())
                    .with_after(Alignment::Center.to_string()),
                );
            }
        }
        Ok(fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    fn doc(texts: &[&str]) -> Document {
        let mut doc = Document::blank().unwrap();
        for t in texts {
            doc.add_paragraph(Paragraph::with_text(*t));
        }
        doc
    }

    fn run(rule: &dyn Rule, doc: &mut Document) -> Vec<Fix> {
        rule.apply(doc, &Params::new(rule.default_params())).unwrap()
    }

    #[test]
    fn test_latex_conversion() {
        let mut doc = doc(&["$$a+b$$", "Energy $E=mc^2$ here", "No math"]);
        let fixes = run(&LatexToOmmlRule::default(), &mut doc);
        let ids: Vec<_> = fixes.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["fix_latex_0", "fix_latex_1"]);
        assert_eq!(fixes[0].location.as_ref().unwrap()["kind"], "display");
        assert_eq!(doc.paragraph(0).unwrap().math_kind(), Some(MathKind::Display));
        assert_eq!(doc.paragraph(1).unwrap().math_kind(), Some(MathKind::Inline));
        assert_eq!(doc.paragraph(1).unwrap().text(), "Energy  here");

        assert!(run(&LatexToOmmlRule::default(), &mut doc).is_empty());
    }

    #[test]
    fn test_latex_failure_leaves_text() {
        let mut doc = doc(&["$$a+b$$"]);
        let rule = LatexToOmmlRule::with_converter(MathConverter::unavailable());
        let fixes = run(&rule, &mut doc);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].id, "err_latex_0");
        assert!(!fixes[0].is_applied());
        assert_eq!(doc.paragraph(0).unwrap().text(), "$$a+b$$");
    }

    #[test]
    fn test_numbering_and_centering() {
        let mut doc = doc(&["$$x^2$$", "Text $y$ inline", "$$\\frac{1}{2}$$"]);
        run(&LatexToOmmlRule::default(), &mut doc);

        let fixes = run(&FormulaNumberingRule, &mut doc);
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[1].after.as_deref(), Some("(2)"));
        assert_eq!(doc.paragraph(2).unwrap().text(), " (2)");
        assert_eq!(doc.paragraph(2).unwrap().math_kind(), Some(MathKind::Display));
        assert!(run(&FormulaNumberingRule, &mut doc).is_empty());

        let fixes = run(&DisplayFormulaCenterRule, &mut doc);
        assert_eq!(fixes.len(), 2);
        assert_eq!(doc.paragraph(0).unwrap().alignment(), Some(Alignment::Center));
        assert!(run(&DisplayFormulaCenterRule, &mut doc).is_empty());
    }

    #[test]
    fn test_inline_style() {
        let mut doc = doc(&["Text $y$ inline", "$$z$$"]);
        run(&LatexToOmmlRule::default(), &mut doc);
        let fixes = run(&InlineFormulaStyleRule, &mut doc);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].paragraph_indices, vec![0]);
        assert!(run(&InlineFormulaStyleRule, &mut doc).is_empty());
    }
}
