//! Font rules: family, size, colour and replacement of non-standard fonts.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::{Document, Run, StyleKind};
use serde_json::{json, Map, Value};

fn font_label(run: Option<&Run>) -> String {
    let Some(run) = run else {
        return "(no runs)".to_string();
    };
    let size = run
        .size()
        .map(|s| format!("{}pt", s))
        .unwrap_or_else(|| "inherited size".to_string());
    format!(
        "{}/{} {}",
        run.font_family().unwrap_or("inherited"),
        run.east_asia_font().unwrap_or("inherited"),
        size
    )
}

/// Sets the Western and East Asian font and the body size on every run.
///
/// Headings and the title keep their size (the heading rule owns it) and
/// code paragraphs keep their monospace font.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontStandardRule;

impl Rule for FontStandardRule {
    fn id(&self) -> &str {
        "font_standard"
    }

    fn name(&self) -> &str {
        "Standard font"
    }

    fn category(&self) -> Category {
        Category::Font
    }

    fn description(&self) -> &str {
        "Apply the standard Western and East Asian fonts and body text size."
    }

    fn priority(&self) -> i32 {
        10
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "western_font": "Arial",
            "chinese_font": "SimSun",
            "font_size_body": 12
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let western = params.str("western_font", "Arial");
        let east_asian = params.str("chinese_font", "SimSun");
        let size = params.f64("font_size_body", 12.0);
        let styles = doc.styles().clone();
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let kind = styles.kind(p.style());
            if kind == StyleKind::Code {
                continue;
            }
            let sized = !kind.is_heading_up_to(9);
            let before = font_label(p.runs().next());
            let mut changed = false;
            for run in p.runs_mut() {
                changed |= run.set_font_family(&western);
                changed |= run.set_east_asia_font(&east_asian);
                if sized {
                    changed |= run.set_size(size);
                }
            }
            if changed {
                fixes.push(
                    Fix::new(
                        format!("fix_font_{}", i),
                        self.id(),
                        format!("Applied font {}/{} size {}pt", western, east_asian, size),
                    )
                    .with_paragraph(i)
                    .with_before(before)
                    .with_after(font_label(p.runs().next())),
                );
            }
        }
        Ok(fixes)
    }
}

/// Sets one text colour on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontColorRule;

impl Rule for FontColorRule {
    fn id(&self) -> &str {
        "font_color"
    }

    fn name(&self) -> &str {
        "Font colour"
    }

    fn category(&self) -> Category {
        Category::Font
    }

    fn description(&self) -> &str {
        "Apply one text colour to every run."
    }

    fn priority(&self) -> i32 {
        70
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "text_color": "000000" }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let color = params
            .str("text_color", "000000")
            .trim_start_matches('#')
            .to_ascii_uppercase();
        let mut affected = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let mut changed = false;
            for run in p.runs_mut() {
                changed |= run.set_color(&color);
            }
            if changed {
                affected.push(i);
            }
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Fix::new(
            "fix_font_color_all",
            self.id(),
            format!("Applied text colour #{}", color),
        )
        .with_paragraphs(affected)
        .with_after(format!("#{}", color))])
    }
}

/// Replaces non-standard fonts through a lookup table.
///
/// Fonts found in `font_map` are replaced by their mapping; any other font
/// (or a missing one) becomes the default Western or East Asian font.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontReplacementRule;

impl FontReplacementRule {
    /// Mapped fonts are replaced, fonts that are already a substitute or the
    /// fallback are kept, anything else becomes the fallback.
    fn target(current: Option<&str>, map: &[(String, String)], fallback: &str) -> String {
        let Some(font) = current else {
            return fallback.to_string();
        };
        if let Some((_, to)) = map.iter().find(|(from, _)| from == font) {
            return to.clone();
        }
        if font == fallback || map.iter().any(|(_, to)| to == font) {
            return font.to_string();
        }
        fallback.to_string()
    }
}

impl Rule for FontReplacementRule {
    fn id(&self) -> &str {
        "font_replacement"
    }

    fn name(&self) -> &str {
        "Font replacement"
    }

    fn category(&self) -> Category {
        Category::Font
    }

    fn description(&self) -> &str {
        "Replace non-standard fonts with their configured substitutes."
    }

    fn priority(&self) -> i32 {
        80
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "font_map": {
                "Microsoft YaHei": "SimSun",
                "\u{5FAE}\u{8F6F}\u{96C5}\u{9ED1}": "SimSun",
                "\u{5B8B}\u{4F53}": "SimSun",
                "\u{9ED1}\u{4F53}": "SimHei",
                "\u{6977}\u{4F53}": "KaiTi"
            },
            "default_western_font": "Arial",
            "default_chinese_font": "SimSun"
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let map = params.string_map("font_map").unwrap_or_default();
        let western = params.str("default_western_font", "Arial");
        let east_asian = params.str("default_chinese_font", "SimSun");
        let mut affected = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let mut changed = false;
            for run in p.runs_mut() {
                let family = Self::target(run.font_family(), &map, &western);
                changed |= run.set_font_family(&family);
                let east = Self::target(run.east_asia_font(), &map, &east_asian);
                changed |= run.set_east_asia_font(&east);
            }
            if changed {
                affected.push(i);
            }
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Fix::new(
            "fix_font_replacement_all",
            self.id(),
            format!("Replaced non-standard fonts with {}/{}", western, east_asian),
        )
        .with_paragraphs(affected)])
    }
}
