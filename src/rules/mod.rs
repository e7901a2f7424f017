//! Built-in formatting rules.
//!
//! Every rule reads its parameters through [`Params`](crate::engine::Params)
//! and compares the stored value before writing, so running the whole set
//! twice leaves the second pass without value fixes.

mod diagram;
mod font;
mod formula;
mod heading;
mod image;
mod layout;
mod list;
mod paragraph;
mod table;

pub use diagram::{extract_source, png_dimensions, MermaidCli, MermaidRenderRule};
pub use font::{FontColorRule, FontReplacementRule, FontStandardRule};
pub use formula::{
    DisplayFormulaCenterRule, FormulaNumberingRule, InlineFormulaStyleRule, LatexToOmmlRule,
};
pub use heading::{HeadingStyleRule, TitleBoldRule};
pub use image::{ImageCaptionRule, ImageCenterRule, ImageResizeRule};
pub use layout::PageLayoutRule;
pub use list::ListNumberingRule;
pub use paragraph::{FirstLineIndentRule, ParagraphSpacingRule};
pub use table::{
    TableBorderRule, TableCellSpacingRule, TableColumnWidthRule, TableRepeatHeaderRule,
    TableWidthRule,
};

use crate::engine::Rule;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Turn a `json!` object literal into a parameter map.
pub(crate) fn defaults(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Every built-in rule, in no particular order.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(PageLayoutRule),
        Arc::new(FontStandardRule),
        Arc::new(TableBorderRule),
        Arc::new(TableCellSpacingRule),
        Arc::new(TableColumnWidthRule),
        Arc::new(TableWidthRule),
        Arc::new(ParagraphSpacingRule),
        Arc::new(ListNumberingRule),
        Arc::new(TitleBoldRule),
        Arc::new(FontColorRule),
        Arc::new(FontReplacementRule),
        Arc::new(FirstLineIndentRule),
        Arc::new(TableRepeatHeaderRule),
        Arc::new(HeadingStyleRule),
        Arc::new(ImageCenterRule),
        Arc::new(ImageResizeRule),
        Arc::new(ImageCaptionRule),
        Arc::new(MermaidRenderRule),
        Arc::new(LatexToOmmlRule::default()),
        Arc::new(FormulaNumberingRule),
        Arc::new(InlineFormulaStyleRule),
        Arc::new(DisplayFormulaCenterRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_unique() {
        let rules = builtin_rules();
        assert_eq!(rules.len(), 22);
        let ids: HashSet<_> = rules.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_defaults_from_object() {
        let map = defaults(serde_json::json!({ "a": 1 }));
        assert_eq!(map.get("a"), Some(&Value::from(1)));
        assert!(defaults(Value::Null).is_empty());
    }
}
