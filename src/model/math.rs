//! Office math nodes embedded in paragraphs.

use super::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// Display or inline placement of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathKind {
    /// Formula embedded in running text
    Inline,
    /// Formula standing alone on its own line
    Display,
}

/// An `m:oMath` or `m:oMathPara` element.
#[derive(Debug, Clone, PartialEq)]
pub struct MathNode {
    /// The math element
    pub element: XmlElement,
}

impl MathNode {
    /// Wrap an existing math element.
    pub fn new(element: XmlElement) -> Self {
        Self { element }
    }

    /// Inline math from an `m:oMath` element.
    pub fn inline(omath: XmlElement) -> Self {
        Self::new(omath)
    }

    /// Display math: `omath` wrapped in `m:oMathPara`.
    pub fn display(omath: XmlElement) -> Self {
        Self::new(XmlElement::new("m:oMathPara").with_child(omath))
    }

    /// Whether this node is an `m:oMathPara` wrapper.
    pub fn is_math_para(&self) -> bool {
        self.element.name == "m:oMathPara"
    }

    /// Text of every `m:t` in the formula.
    pub fn text(&self) -> String {
        self.element.text_content()
    }

    /// Set the justification of a math paragraph (`m:oMathParaPr/m:jc`).
    ///
    /// Returns `false` for inline nodes or when nothing changed.
    pub fn set_justification(&mut self, value: &str) -> bool {
        if !self.is_math_para() {
            return false;
        }
        self.element
            .ensure_child("m:oMathParaPr", &["m:oMathParaPr", "m:oMath"])
            .ensure_child("m:jc", &["m:jc"])
            .set_attr("m:val", value)
    }

    /// Apply a text size to every math run (`m:r/w:rPr/w:sz`).
    pub fn set_run_size(&mut self, half_points: i64) -> bool {
        let mut changed = false;
        apply_to_runs(&mut self.element, &mut |r| {
            let rpr = r.ensure_child("w:rPr", &["m:rPr", "w:rPr", "m:t"]);
            changed |= rpr
                .ensure_child("w:sz", crate::model::paragraph::RPR_ORDER)
                .set_attr("w:val", half_points.to_string());
        });
        changed
    }

    /// Apply a font to every math run (`m:r/w:rPr/w:rFonts`).
    pub fn set_run_font(&mut self, family: &str) -> bool {
        let mut changed = false;
        apply_to_runs(&mut self.element, &mut |r| {
            let fonts = r
                .ensure_child("w:rPr", &["m:rPr", "w:rPr", "m:t"])
                .ensure_child("w:rFonts", crate::model::paragraph::RPR_ORDER);
            changed |= fonts.set_attr("w:ascii", family);
            changed |= fonts.set_attr("w:hAnsi", family);
        });
        changed
    }
}

fn apply_to_runs(el: &mut XmlElement, f: &mut dyn FnMut(&mut XmlElement)) {
    for child in el.elements_mut() {
        if child.name == "m:r" {
            f(child);
        } else {
            apply_to_runs(child, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn omath() -> XmlElement {
        XmlElement::new("m:oMath").with_child(
            XmlElement::new("m:r").with_child(XmlElement::new("m:t").with_text("x")),
        )
    }

    #[test]
    fn test_display_wraps_in_math_para() {
        let mut node = MathNode::display(omath());
        assert!(node.is_math_para());
        assert_eq!(node.text(), "x");
        assert!(node.set_justification("center"));
        assert!(!node.set_justification("center"));
        let first = node.element.elements().next().unwrap();
        assert_eq!(first.name, "m:oMathParaPr");
    }

    #[test]
    fn test_run_size() {
        let mut node = MathNode::inline(omath());
        assert!(node.set_run_size(22));
        assert!(!node.set_run_size(22));
        let run = node.element.find("m:r").unwrap();
        let names: Vec<_> = run.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:rPr", "m:t"]);
    }

    #[test]
    fn test_run_font() {
        let mut node = MathNode::inline(omath());
        assert!(node.set_run_font("Cambria Math"));
        assert!(!node.set_run_font("Cambria Math"));
        let fonts = node.element.find("w:rFonts").unwrap();
        assert_eq!(fonts.attr("w:ascii"), Some("Cambria Math"));
    }
}
