//! Inline Markdown formatting (emphasis, code spans, links).

use super::ImportOptions;
use crate::model::Run;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Link text colour.
const LINK_COLOR: &str = "0066CC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineStyle {
    BoldItalic,
    Bold,
    Italic,
    Code,
    Link,
}

/// Patterns in declaration order; ties on start offset go to the earlier one.
static INLINE_PATTERNS: LazyLock<Vec<(Regex, InlineStyle)>> = LazyLock::new(|| {
    [
        (r"\*\*\*(.+?)\*\*\*", InlineStyle::BoldItalic),
        (r"\*\*(.+?)\*\*", InlineStyle::Bold),
        (r"\*(.+?)\*", InlineStyle::Italic),
        (r"`(.+?)`", InlineStyle::Code),
        (r"\[(.+?)\]\((.+?)\)", InlineStyle::Link),
    ]
    .into_iter()
    .map(|(pattern, style)| (Regex::new(pattern).unwrap(), style))
    .collect()
});

/// Split `text` into runs using a leftmost-earliest scan.
///
/// At each step every pattern is searched in the remaining text and the
/// match with the smallest start offset wins. Text before the match becomes
/// a plain run, the match becomes a styled run, and scanning resumes after
/// it. Unmatched trailing text becomes a final plain run.
pub fn parse_inline(text: &str, options: &ImportOptions) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut earliest: Option<(Captures<'_>, InlineStyle)> = None;
        for (re, style) in INLINE_PATTERNS.iter() {
            let Some(caps) = re.captures(rest) else {
                continue;
            };
            let start = caps.get(0).map(|m| m.start()).unwrap_or(usize::MAX);
            let better = match earliest {
                Some((ref best, _)) => start < best.get(0).map(|m| m.start()).unwrap_or(usize::MAX),
                None => true,
            };
            if better {
                earliest = Some((caps, *style));
            }
        }

        let Some((caps, style)) = earliest else {
            runs.push(Run::new(rest));
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if whole.start() > 0 {
            runs.push(Run::new(&rest[..whole.start()]));
        }
        let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        runs.push(styled_run(inner, style, options));
        rest = &rest[whole.end()..];
    }

    runs
}

fn styled_run(text: &str, style: InlineStyle, options: &ImportOptions) -> Run {
    let mut run = Run::new(text);
    match style {
        InlineStyle::BoldItalic => {
            run.set_bold(true);
            run.set_italic(true);
        }
        InlineStyle::Bold => {
            run.set_bold(true);
        }
        InlineStyle::Italic => {
            run.set_italic(true);
        }
        InlineStyle::Code => {
            run.set_font_family(&options.code_font);
            run.set_size(options.code_font_size);
        }
        InlineStyle::Link => {
            run.set_color(LINK_COLOR);
            run.set_underline(true);
        }
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Run> {
        parse_inline(text, &ImportOptions::default())
    }

    #[test]
    fn test_bold_and_italic() {
        let runs = parse("**bold** and *italic*");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(), "bold");
        assert_eq!(runs[0].is_bold(), Some(true));
        assert_eq!(runs[0].is_italic(), None);
        assert_eq!(runs[1].text(), " and ");
        assert_eq!(runs[1].is_bold(), None);
        assert_eq!(runs[2].text(), "italic");
        assert_eq!(runs[2].is_italic(), Some(true));
    }

    #[test]
    fn test_bold_italic_wins_tie() {
        let runs = parse("***both***");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text(), "both");
        assert_eq!(runs[0].is_bold(), Some(true));
        assert_eq!(runs[0].is_italic(), Some(true));
    }

    #[test]
    fn test_code_and_link() {
        let runs = parse("run `cargo` or see [docs](http://x)");
        let texts: Vec<_> = runs.iter().map(Run::text).collect();
        assert_eq!(texts, vec!["run ", "cargo", " or see ", "docs"]);
        assert_eq!(runs[1].font_family(), Some("Consolas"));
        assert_eq!(runs[1].size(), Some(10.0));
        assert_eq!(runs[3].color(), Some("0066CC"));
        assert_eq!(runs[3].is_underline(), Some(true));
    }

    #[test]
    fn test_plain_text_single_run() {
        let runs = parse("nothing special");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text(), "nothing special");
        assert!(parse("").is_empty());
    }
}
