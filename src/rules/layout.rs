//! Page size and margins.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::{Document, PageGeometry};
use serde_json::{json, Map, Value};

fn describe(g: &PageGeometry) -> String {
    format!(
        "{}x{} cm, margins {}/{}/{}/{} cm",
        g.width_cm,
        g.height_cm,
        g.margin_top_cm,
        g.margin_bottom_cm,
        g.margin_left_cm,
        g.margin_right_cm
    )
}

/// Sets the page size and margins of the document section.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageLayoutRule;

impl Rule for PageLayoutRule {
    fn id(&self) -> &str {
        "page_layout"
    }

    fn name(&self) -> &str {
        "Page layout"
    }

    fn category(&self) -> Category {
        Category::Page
    }

    fn description(&self) -> &str {
        "Set the page size and margins."
    }

    fn priority(&self) -> i32 {
        5
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "page_width_cm": 21.0,
            "page_height_cm": 29.7,
            "page_margin_top_cm": 2.54,
            "page_margin_bottom_cm": 2.54,
            "page_margin_left_cm": 2.54,
            "page_margin_right_cm": 2.54
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let a4 = PageGeometry::a4();
        let target = PageGeometry {
            width_cm: params.f64("page_width_cm", a4.width_cm),
            height_cm: params.f64("page_height_cm", a4.height_cm),
            margin_top_cm: params.f64("page_margin_top_cm", a4.margin_top_cm),
            margin_bottom_cm: params.f64("page_margin_bottom_cm", a4.margin_bottom_cm),
            margin_left_cm: params.f64("page_margin_left_cm", a4.margin_left_cm),
            margin_right_cm: params.f64("page_margin_right_cm", a4.margin_right_cm),
        };

        let section = doc.section_mut();
        let before = section.geometry();
        if !section.set_geometry(&target) {
            return Ok(Vec::new());
        }

        let mut fix = Fix::new("fix_page_layout", self.id(), "Applied page size and margins")
            .with_after(describe(&target))
            .with_location(json!({ "type": "page_layout", "section_index": 0 }));
        if let Some(before) = before {
            fix = fix.with_before(describe(&before));
        }
        Ok(vec![fix])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_layout_converges() {
        let mut doc = Document::blank().unwrap();
        let rule = PageLayoutRule;
        let params = Params::new(rule.default_params()).with("page_margin_left_cm", 3.0);
        let fixes = rule.apply(&mut doc, &params).unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].id, "fix_page_layout");

        let g = doc.section_mut().geometry().unwrap();
        assert!((g.margin_left_cm - 3.0).abs() < 0.01);
        assert!((g.width_cm - 21.0).abs() < 0.01);
        assert!(rule.apply(&mut doc, &params).unwrap().is_empty());
    }

    #[test]
    fn test_landscape() {
        let mut doc = Document::blank().unwrap();
        let params = Params::default()
            .with("page_width_cm", 29.7)
            .with("page_height_cm", 21.0);
        PageLayoutRule.apply(&mut doc, &params).unwrap();
        assert!(doc.section_mut().geometry().unwrap().is_landscape());
    }
}
