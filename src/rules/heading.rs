//! Heading emphasis and sizes.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::{Document, StyleKind};
use serde_json::{json, Map, Value};

/// Makes every run of headings 1 to 4 and the title bold.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleBoldRule;

impl Rule for TitleBoldRule {
    fn id(&self) -> &str {
        "title_bold"
    }

    fn name(&self) -> &str {
        "Bold headings"
    }

    fn category(&self) -> Category {
        Category::Heading
    }

    fn description(&self) -> &str {
        "Make the title and headings up to level 4 bold."
    }

    fn priority(&self) -> i32 {
        60
    }

    fn apply(&self, doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
        let styles = doc.styles().clone();
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let kind = styles.kind(p.style());
            if !kind.is_heading_up_to(4) {
                continue;
            }
            let mut changed = false;
            for run in p.runs_mut() {
                changed |= run.set_bold(true);
            }
            if changed {
                let style = p.style().unwrap_or("Title").to_string();
                fixes.push(
                    Fix::new(
                        format!("fix_title_bold_{}", i),
                        self.id(),
                        format!("Made heading '{}' bold", style),
                    )
                    .with_paragraph(i)
                    .with_before("not bold")
                    .with_after("bold"),
                );
            }
        }
        Ok(fixes)
    }
}

/// Sets heading sizes (title, levels 1 to 3) and makes them bold.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingStyleRule;

impl Rule for HeadingStyleRule {
    fn id(&self) -> &str {
        "heading_style"
    }

    fn name(&self) -> &str {
        "Heading sizes"
    }

    fn category(&self) -> Category {
        Category::Heading
    }

    fn description(&self) -> &str {
        "Apply consistent font sizes to the title and headings."
    }

    fn priority(&self) -> i32 {
        100
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "h1_size": 22,
            "h2_size": 16,
            "h3_size": 14
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let h1 = params.f64("h1_size", 22.0);
        let h2 = params.f64("h2_size", 16.0);
        let h3 = params.f64("h3_size", 14.0);
        let styles = doc.styles().clone();
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            let target = match styles.kind(p.style()) {
                StyleKind::Title => h1 + 4.0,
                StyleKind::Heading(1) => h1,
                StyleKind::Heading(2) => h2,
                StyleKind::Heading(3) => h3,
                _ => continue,
            };
            let before = p.runs().next().and_then(|r| r.size());
            let mut changed = false;
            for run in p.runs_mut() {
                changed |= run.set_size(target);
                changed |= run.set_bold(true);
            }
            if changed {
                let style = p.style().unwrap_or("Title").to_string();
                let mut fix = Fix::new(
                    format!("fix_heading_{}", i),
                    self.id(),
                    format!("Applied {}pt to heading {}", target, style),
                )
                .with_paragraph(i)
                .with_after(format!("{}pt", target));
                if let Some(size) = before {
                    fix = fix.with_before(format!("{}pt", size));
                }
                fixes.push(fix);
            }
        }
        Ok(fixes)
    }
}
