//! Locating LaTeX math spans in paragraph text.

use crate::model::MathKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Delimiters in precedence order. Longer delimiters come first so that
/// `$$a$$` is never read as two inline spans.
static DELIMITERS: LazyLock<Vec<(Regex, MathKind)>> = LazyLock::new(|| {
    [
        (
            r"(?s)\\begin\{equation\*?\}(.+?)\\end\{equation\*?\}",
            MathKind::Display,
        ),
        (r"(?s)\$\$(.+?)\$\$", MathKind::Display),
        (r"(?s)\\\[(.+?)\\\]", MathKind::Display),
        (r"(?s)\$(.+?)\$", MathKind::Inline),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), kind))
    .collect()
});

/// A math span found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSpan {
    /// Byte offset of the opening delimiter
    pub start: usize,
    /// Byte offset just past the closing delimiter
    pub end: usize,
    /// LaTeX source between the delimiters, trimmed
    pub latex: String,
    /// Placement implied by the delimiter
    pub kind: MathKind,
}

/// Find the first math span in `text`.
///
/// Delimiter kinds are tried in precedence order and the first kind that
/// matches anywhere wins, even when a lower-precedence delimiter occurs
/// earlier in the text.
pub fn find_span(text: &str) -> Option<MathSpan> {
    DELIMITERS.iter().find_map(|(re, kind)| {
        let caps = re.captures(text)?;
        let whole = caps.get(0)?;
        Some(MathSpan {
            start: whole.start(),
            end: whole.end(),
            latex: caps.get(1)?.as_str().trim().to_string(),
            kind: *kind,
        })
    })
}

/// Whether `text` contains any math delimiters.
pub fn contains_math(text: &str) -> bool {
    find_span(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_dollar_is_display() {
        let span = find_span("$$a+b$$").unwrap();
        assert_eq!(span.kind, MathKind::Display);
        assert_eq!(span.latex, "a+b");
        assert_eq!((span.start, span.end), (0, 7));
    }

    #[test]
    fn test_inline_span_offsets() {
        let span = find_span("area is $\\pi r^2$ here").unwrap();
        assert_eq!(span.kind, MathKind::Inline);
        assert_eq!(span.latex, "\\pi r^2");
        assert_eq!(span.start, 8);
        assert_eq!(&"area is $\\pi r^2$ here"[span.end..], " here");
    }

    #[test]
    fn test_precedence_over_position() {
        // The inline span comes first in the text but display delimiters win.
        let span = find_span("$x$ then \\[ y \\]").unwrap();
        assert_eq!(span.kind, MathKind::Display);
        assert_eq!(span.latex, "y");
    }

    #[test]
    fn test_equation_environment() {
        let span = find_span("\\begin{equation}\nE = mc^2\n\\end{equation}").unwrap();
        assert_eq!(span.kind, MathKind::Display);
        assert_eq!(span.latex, "E = mc^2");
        assert!(find_span("\\begin{equation*}x\\end{equation*}").is_some());
    }

    #[test]
    fn test_no_math() {
        assert!(find_span("costs 5 dollars").is_none());
        assert!(!contains_math("a lone $ sign"));
    }
}
