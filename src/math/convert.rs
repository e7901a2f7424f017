//! Replacing LaTeX spans in paragraphs with native math nodes.

use super::detect::{find_span, MathSpan};
use super::latex::{BuiltinLatex, LatexToMathMl, NoLatex};
use super::omml::mathml_to_omml;
use crate::error::{Error, Result};
use crate::model::{Inline, MathKind, MathNode, Paragraph};
use std::fmt;
use std::sync::Arc;

/// Outcome of converting one paragraph.
#[derive(Debug)]
pub enum Conversion {
    /// The span was replaced by a math node
    Converted(MathSpan),
    /// The span could not be converted and was left as text
    Failed {
        /// The span that failed
        span: MathSpan,
        /// Why it failed
        error: Error,
    },
}

impl Conversion {
    /// The span this outcome refers to.
    pub fn span(&self) -> &MathSpan {
        match self {
            Conversion::Converted(span) => span,
            Conversion::Failed { span, .. } => span,
        }
    }

    /// Whether the span was converted.
    pub fn is_converted(&self) -> bool {
        matches!(self, Conversion::Converted(_))
    }
}

/// Two-stage LaTeX to OMML converter.
#[derive(Clone)]
pub struct MathConverter {
    latex: Arc<dyn LatexToMathMl>,
}

impl fmt::Debug for MathConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MathConverter")
            .field("latex", &self.latex.name())
            .finish()
    }
}

impl Default for MathConverter {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MathConverter {
    /// Create a converter around a LaTeX front end.
    pub fn new(latex: Arc<dyn LatexToMathMl>) -> Self {
        Self { latex }
    }

    /// Converter using the built-in LaTeX parser.
    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinLatex::new()))
    }

    /// Converter with no LaTeX front end; every span is reported as failed.
    pub fn unavailable() -> Self {
        Self::new(Arc::new(NoLatex::new()))
    }

    /// Name of the LaTeX front end.
    pub fn front_end(&self) -> &str {
        self.latex.name()
    }

    /// Convert LaTeX source into a math node of the given placement.
    pub fn to_math_node(&self, latex: &str, kind: MathKind) -> Result<MathNode> {
        let mathml = self.latex.to_mathml(latex, kind == MathKind::Display)?;
        let omath = mathml_to_omml(&mathml);
        Ok(match kind {
            MathKind::Display => MathNode::display(omath),
            MathKind::Inline => MathNode::inline(omath),
        })
    }

    /// Convert the first math span in a paragraph.
    ///
    /// Text runs are split around the span and keep their formatting; the
    /// math node takes the span's place. Drawings and other inline content
    /// keep their position. Returns `None` when the paragraph has no span or
    /// already holds a math node; a failed conversion leaves it untouched.
    pub fn convert_paragraph(&self, paragraph: &mut Paragraph) -> Option<Conversion> {
        if paragraph.has_math() {
            return None;
        }
        let text = paragraph.text();
        if text.trim().is_empty() {
            return None;
        }
        let span = find_span(&text)?;

        let node = match self.to_math_node(&span.latex, span.kind) {
            Ok(node) => node,
            Err(error) => {
                log::warn!("Could not convert formula '{}': {}", span.latex, error);
                return Some(Conversion::Failed { span, error });
            }
        };

        let content = std::mem::take(&mut paragraph.content);
        paragraph.content = splice_math(content, span.start, span.end, node);

        log::debug!("Converted {:?} formula '{}'", span.kind, span.latex);
        Some(Conversion::Converted(span))
    }
}

/// Replace the text range `start..end` (offsets into the concatenated run
/// text) with `node`.
fn splice_math(content: Vec<Inline>, start: usize, end: usize, node: MathNode) -> Vec<Inline> {
    let mut out = Vec::with_capacity(content.len() + 2);
    let mut node = Some(node);
    let mut offset = 0;

    for item in content {
        let run = match item {
            Inline::Run(run) if !run.content.is_empty() => run,
            other => {
                out.push(other);
                continue;
            }
        };
        let template = run.empty_like();
        let mut current = template.clone();

        for piece in run.content {
            let Some(text) = piece.as_text().map(str::to_string) else {
                current.content.push(piece);
                continue;
            };
            let (from, to) = (offset, offset + text.len());
            offset = to;

            if from < start {
                current.push_text(&text[..start.min(to) - from]);
            }
            if to > start {
                if let Some(node) = node.take() {
                    if !current.content.is_empty() {
                        out.push(Inline::Run(std::mem::replace(&mut current, template.clone())));
                    }
                    out.push(Inline::Math(node));
                }
            }
            if to > end {
                current.push_text(&text[end.max(from) - from..]);
            }
        }
        if !current.content.is_empty() {
            out.push(Inline::Run(current));
        }
    }
    if let Some(node) = node {
        out.push(Inline::Math(node));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Run;

    #[test]
    fn test_inline_span_keeps_surrounding_text() {
        let mut p = Paragraph::with_text("Area $\\pi r^2$ of a circle");
        let outcome = MathConverter::builtin().convert_paragraph(&mut p).unwrap();
        assert!(outcome.is_converted());
        assert_eq!(p.text(), "Area  of a circle");
        assert_eq!(p.run_count(), 2);
        assert!(matches!(p.content[1], Inline::Math(ref m) if !m.is_math_para()));
        assert_eq!(p.math_kind(), Some(MathKind::Inline));
    }

    #[test]
    fn test_display_span_becomes_math_para() {
        let mut p = Paragraph::with_text("$$a+b$$");
        MathConverter::builtin().convert_paragraph(&mut p).unwrap();
        assert_eq!(p.run_count(), 0);
        let node = p.math_nodes().next().unwrap();
        assert!(node.is_math_para());
        assert_eq!(node.text(), "a+b");
        assert_eq!(p.math_kind(), Some(MathKind::Display));
    }

    #[test]
    fn test_only_first_span_converted() {
        let mut p = Paragraph::with_text("$x$ and $y$");
        MathConverter::builtin().convert_paragraph(&mut p).unwrap();
        assert_eq!(p.math_nodes().count(), 1);
        assert_eq!(p.text(), " and $y$");
    }

    #[test]
    fn test_drawing_keeps_its_place() {
        use crate::model::Image;

        let mut p = Paragraph::new();
        p.add_run(Run::new("See "));
        p.add_run(Run::with_image(Image::inline("rId9", 1, "Figure", 914400, 914400)));
        p.add_run(Run::bold(" where $x^2$ holds"));

        let outcome = MathConverter::builtin().convert_paragraph(&mut p).unwrap();
        assert!(outcome.is_converted());
        assert!(p.has_image());
        assert_eq!(p.text(), "See  where  holds");
        assert!(matches!(p.content[1], Inline::Run(ref r) if r.images().count() == 1));
        assert!(matches!(p.content[3], Inline::Math(_)));
        assert!(matches!(p.content[4], Inline::Run(ref r) if r.is_bold() == Some(true)));
    }

    #[test]
    fn test_span_across_runs() {
        let mut p = Paragraph::new();
        p.add_run(Run::new("a $x"));
        p.add_run(Run::italic("+y$ b"));
        MathConverter::builtin().convert_paragraph(&mut p).unwrap();
        assert_eq!(p.text(), "a  b");
        assert!(matches!(p.content[1], Inline::Math(_)));
        assert!(matches!(p.content[2], Inline::Run(ref r) if r.is_italic() == Some(true)));
    }

    #[test]
    fn test_paragraph_with_math_is_skipped() {
        let mut p = Paragraph::with_text("Let $a$ and $b$ be reals.");
        let converter = MathConverter::builtin();
        assert!(converter.convert_paragraph(&mut p).unwrap().is_converted());
        let once = p.clone();
        assert!(converter.convert_paragraph(&mut p).is_none());
        assert_eq!(p, once);
        assert_eq!(p.text(), "Let  and $b$ be reals.");
    }

    #[test]
    fn test_failure_leaves_paragraph() {
        let mut p = Paragraph::with_text("bad $\\frac{1}$ input");
        let before = p.clone();
        let outcome = MathConverter::builtin().convert_paragraph(&mut p).unwrap();
        assert!(matches!(
            outcome,
            Conversion::Failed {
                error: Error::LatexSyntax(_),
                ..
            }
        ));
        assert_eq!(p, before);

        let mut p = Paragraph::with_text("$x$");
        let outcome = MathConverter::unavailable().convert_paragraph(&mut p).unwrap();
        assert!(!outcome.is_converted());
        assert_eq!(outcome.span().latex, "x");
    }

    #[test]
    fn test_no_span() {
        let mut p = Paragraph::with_text("plain");
        assert!(MathConverter::builtin().convert_paragraph(&mut p).is_none());
        assert!(MathConverter::default()
            .convert_paragraph(&mut Paragraph::new())
            .is_none());
    }
}
