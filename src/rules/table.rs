//! Table rules: borders, cell margins, column layout, width and header rows.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::{BorderSpec, CellMargins, Document, TableLayout, TableWidth};
use serde_json::{json, Map, Value};

/// Applies a single-line border to every edge and shades the header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableBorderRule;

impl Rule for TableBorderRule {
    fn id(&self) -> &str {
        "table_border"
    }

    fn name(&self) -> &str {
        "Table borders"
    }

    fn category(&self) -> Category {
        Category::Table
    }

    fn description(&self) -> &str {
        "Apply uniform borders to tables and shade the header row."
    }

    fn priority(&self) -> i32 {
        20
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "border_size": 4,
            "border_color": "000000",
            "add_table_header_format": true,
            "table_header_bg_color": "E3E3E3"
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let size = params.i64("border_size", 4).clamp(0, u32::MAX as i64) as u32;
        let color = params.str("border_color", "000000");
        let shade_header = params.bool("add_table_header_format", true);
        let header_fill = params.str("table_header_bg_color", "E3E3E3");
        let spec = BorderSpec::single(size, color.clone());
        let mut fixes = Vec::new();

        for (i, table) in doc.tables_mut().enumerate() {
            let mut changed = table.set_borders(&spec);
            let mut desc = format!("Applied {} border to table {}", size, i + 1);
            if shade_header && table.row_count() > 0 {
                changed |= table.set_row_shading(0, &header_fill);
                desc.push_str(&format!(" with header background #{}", header_fill));
            }
            if !changed {
                continue;
            }
            fixes.push(
                Fix::new(format!("fix_table_{}", i), self.id(), desc.clone())
                    .with_table(i)
                    .with_after(desc)
                    .with_location(json!({
                        "table_index": i,
                        "type": "table_borders",
                        "border_size": size,
                        "border_color": color,
                    })),
            );
        }
        Ok(fixes)
    }
}

/// Sets the default cell margins of every table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCellSpacingRule;

impl Rule for TableCellSpacingRule {
    fn id(&self) -> &str {
        "table_cell_spacing"
    }

    fn name(&self) -> &str {
        "Table cell margins"
    }

    fn category(&self) -> Category {
        Category::Table
    }

    fn description(&self) -> &str {
        "Apply uniform cell margins to tables."
    }

    fn priority(&self) -> i32 {
        30
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "cell_margin_top": 50,
            "cell_margin_left": 50,
            "cell_margin_bottom": 50,
            "cell_margin_right": 50
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let margins = CellMargins {
            top: params.i64("cell_margin_top", 50),
            left: params.i64("cell_margin_left", 50),
            bottom: params.i64("cell_margin_bottom", 50),
            right: params.i64("cell_margin_right", 50),
        };
        let snapshot = |m: &CellMargins| {
            format!(
                "top {} / left {} / bottom {} / right {}",
                m.top, m.left, m.bottom, m.right
            )
        };
        let mut fixes = Vec::new();

        for (i, table) in doc.tables_mut().enumerate() {
            let before = table.cell_margins();
            if !table.set_cell_margins(margins) {
                continue;
            }
            let mut fix = Fix::new(
                format!("fix_table_cell_spacing_{}", i),
                self.id(),
                format!("Applied cell margins to table {}", i + 1),
            )
            .with_table(i)
            .with_after(snapshot(&margins))
            .with_location(json!({
                "table_index": i,
                "type": "table_cell_margins",
                "top": margins.top,
                "left": margins.left,
                "bottom": margins.bottom,
                "right": margins.right,
            }));
            if let Some(before) = before {
                fix = fix.with_before(snapshot(&before));
            }
            fixes.push(fix);
        }
        Ok(fixes)
    }
}

/// Sets the column layout mode; autofit drops fixed cell widths.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableColumnWidthRule;

impl Rule for TableColumnWidthRule {
    fn id(&self) -> &str {
        "table_column_width"
    }

    fn name(&self) -> &str {
        "Table column layout"
    }

    fn category(&self) -> Category {
        Category::Table
    }

    fn description(&self) -> &str {
        "Let table columns size themselves to their content."
    }

    fn priority(&self) -> i32 {
        40
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "layout": "autofit" }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let name = params.str("layout", "autofit");
        let layout = TableLayout::parse(&name).unwrap_or_else(|| {
            log::warn!("Unknown table layout '{}', using autofit", name);
            TableLayout::Autofit
        });
        let label = layout.as_str();
        let mut fixes = Vec::new();

        for (i, table) in doc.tables_mut().enumerate() {
            let before = table.layout();
            if !table.set_layout(layout) {
                continue;
            }
            fixes.push(
                Fix::new(
                    format!("fix_table_column_width_{}", i),
                    self.id(),
                    format!("Applied {} column layout to table {}", label, i + 1),
                )
                .with_table(i)
                .with_before(before.as_str())
                .with_after(label)
                .with_location(json!({
                    "table_index": i,
                    "type": "table_layout",
                    "layout": label,
                })),
            );
        }
        Ok(fixes)
    }
}

/// Sets the preferred table width as a percentage of the text area.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableWidthRule;

impl Rule for TableWidthRule {
    fn id(&self) -> &str {
        "table_width"
    }

    fn name(&self) -> &str {
        "Table width"
    }

    fn category(&self) -> Category {
        Category::Table
    }

    fn description(&self) -> &str {
        "Stretch tables to a percentage of the text width."
    }

    fn priority(&self) -> i32 {
        45
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "width_pct": 100 }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let pct = params.f64("width_pct", 100.0).clamp(1.0, 100.0);
        let target = TableWidth::Pct(pct);
        let mut fixes = Vec::new();

        for (i, table) in doc.tables_mut().enumerate() {
            let before = table.width();
            if !table.set_width(target) {
                continue;
            }
            let mut fix = Fix::new(
                format!("fix_table_width_{}", i),
                self.id(),
                format!("Set table {} width to {}", i + 1, target),
            )
            .with_table(i)
            .with_after(target.to_string())
            .with_location(json!({ "table_index": i, "type": "table_width", "width_pct": pct }));
            if let Some(before) = before {
                fix = fix.with_before(before.to_string());
            }
            fixes.push(fix);
        }
        Ok(fixes)
    }
}

/// Marks the leading rows of each table as header rows repeated on every page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRepeatHeaderRule;

impl Rule for TableRepeatHeaderRule {
    fn id(&self) -> &str {
        "table_repeat_header"
    }

    fn name(&self) -> &str {
        "Repeat table header"
    }

    fn category(&self) -> Category {
        Category::Table
    }

    fn description(&self) -> &str {
        "Repeat the header rows of tables across page breaks."
    }

    fn priority(&self) -> i32 {
        95
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "header_rows": 1 }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let header_rows = params.i64("header_rows", 1).max(1) as usize;
        let mut fixes = Vec::new();

        for (i, table) in doc.tables_mut().enumerate() {
            // A table made only of header rows has nothing to repeat over.
            if table.row_count() <= header_rows || table.header_rows() > 0 {
                continue;
            }
            if !table.set_header_rows(header_rows) {
                continue;
            }
            fixes.push(
                Fix::new(
                    format!("fix_table_repeat_header_{}", i),
                    self.id(),
                    format!(
                        "Repeat the first {} row(s) of table {} on each page",
                        header_rows,
                        i + 1
                    ),
                )
                .with_table(i)
                .with_before("no repeating header")
                .with_after(format!("repeating header ({} rows)", header_rows))
                .with_location(json!({
                    "table_index": i,
                    "type": "table_header_repeat",
                    "header_rows": header_rows,
                })),
            );
        }
        Ok(fixes)
    }
}
