//! Table types.

use super::block::Block;
use super::paragraph::{Paragraph, Run};
use super::xml::{XmlElement, XmlNode};
use serde::{Deserialize, Serialize};

/// Schema order of `w:tblPr` children.
const TBLPR_ORDER: &[&str] = &[
    "w:tblStyle",
    "w:tblpPr",
    "w:tblOverlap",
    "w:bidiVisual",
    "w:tblStyleRowBandSize",
    "w:tblStyleColBandSize",
    "w:tblW",
    "w:jc",
    "w:tblCellSpacing",
    "w:tblInd",
    "w:tblBorders",
    "w:shd",
    "w:tblLayout",
    "w:tblCellMar",
    "w:tblLook",
    "w:tblCaption",
    "w:tblDescription",
];

/// Schema order of `w:tcPr` children.
const TCPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:tcW",
    "w:gridSpan",
    "w:hMerge",
    "w:vMerge",
    "w:tcBorders",
    "w:shd",
    "w:noWrap",
    "w:tcMar",
    "w:textDirection",
    "w:tcFitText",
    "w:vAlign",
    "w:hideMark",
];

/// Schema order of `w:trPr` children.
const TRPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:divId",
    "w:gridBefore",
    "w:gridAfter",
    "w:wBefore",
    "w:wAfter",
    "w:cantSplit",
    "w:trHeight",
    "w:tblHeader",
    "w:tblCellSpacing",
    "w:jc",
    "w:hidden",
];

/// Edges written by [`Table::set_borders`].
pub const BORDER_EDGES: [&str; 6] = ["top", "left", "bottom", "right", "insideH", "insideV"];

const MARGIN_SIDES: [&str; 4] = ["top", "left", "bottom", "right"];

/// Border line for one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSpec {
    /// Line style (`single`, `double`, `none`, ...)
    pub style: String,
    /// Width in eighths of a point
    pub size: u32,
    /// Colour (hex, no `#`)
    pub color: String,
}

impl BorderSpec {
    /// A single line border.
    pub fn single(size: u32, color: impl Into<String>) -> Self {
        Self {
            style: "single".to_string(),
            size,
            color: color.into(),
        }
    }
}

/// Cell margins in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMargins {
    /// Top margin
    pub top: i64,
    /// Left margin
    pub left: i64,
    /// Bottom margin
    pub bottom: i64,
    /// Right margin
    pub right: i64,
}

impl CellMargins {
    /// Same margin on every side.
    pub fn uniform(twips: i64) -> Self {
        Self {
            top: twips,
            left: twips,
            bottom: twips,
            right: twips,
        }
    }

    fn values(&self) -> [i64; 4] {
        [self.top, self.left, self.bottom, self.right]
    }
}

/// Column layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLayout {
    /// Fixed column widths
    Fixed,
    /// Columns sized to content
    Autofit,
}

impl TableLayout {
    /// Parse a layout name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "fixed" => Some(TableLayout::Fixed),
            "autofit" | "auto" => Some(TableLayout::Autofit),
            _ => None,
        }
    }

    /// Value of `w:tblLayout/@w:type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableLayout::Fixed => "fixed",
            TableLayout::Autofit => "autofit",
        }
    }
}

/// Preferred table width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum TableWidth {
    /// Automatic width
    Auto,
    /// Percentage of the text area
    Pct(f64),
    /// Absolute width in twips
    Dxa(i64),
}

impl std::fmt::Display for TableWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableWidth::Auto => write!(f, "auto"),
            TableWidth::Pct(p) => write!(f, "{}%", p),
            TableWidth::Dxa(t) => write!(f, "{} twips", t),
        }
    }
}

/// A table (`w:tbl`).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Attributes on `w:tbl`
    pub attributes: Vec<(String, String)>,
    /// Table properties (`w:tblPr`)
    pub properties: XmlElement,
    /// Column grid (`w:tblGrid`)
    pub grid: Option<XmlElement>,
    /// Rows and row-level markup in order
    pub content: Vec<TableContent>,
}

/// Table-level content.
#[derive(Debug, Clone, PartialEq)]
pub enum TableContent {
    /// A row
    Row(TableRow),
    /// Anything else, preserved verbatim
    Other(XmlElement),
}

/// A table row (`w:tr`).
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Attributes on `w:tr`
    pub attributes: Vec<(String, String)>,
    /// Row-level property exceptions (`w:tblPrEx`)
    pub exceptions: Option<XmlElement>,
    /// Row properties (`w:trPr`); omitted on write when empty
    pub properties: XmlElement,
    /// Cells and other row content
    pub content: Vec<RowContent>,
}

/// Row-level content.
#[derive(Debug, Clone, PartialEq)]
pub enum RowContent {
    /// A cell
    Cell(TableCell),
    /// Anything else, preserved verbatim
    Other(XmlElement),
}

/// A table cell (`w:tc`).
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Attributes on `w:tc`
    pub attributes: Vec<(String, String)>,
    /// Cell properties (`w:tcPr`); omitted on write when empty
    pub properties: XmlElement,
    /// Block content of the cell
    pub blocks: Vec<Block>,
}

impl Table {
    /// Build a simple grid table from cell text; the first row is bold.
    pub fn grid(rows: &[Vec<String>]) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let col_width = 9000 / cols as i64;
        let properties = XmlElement::new("w:tblPr")
            .with_child(XmlElement::new("w:tblStyle").with_attr("w:val", "TableGrid"))
            .with_child(
                XmlElement::new("w:tblW")
                    .with_attr("w:w", "0")
                    .with_attr("w:type", "auto"),
            )
            .with_child(
                XmlElement::new("w:tblLook")
                    .with_attr("w:val", "04A0")
                    .with_attr("w:firstRow", "1")
                    .with_attr("w:lastRow", "0")
                    .with_attr("w:firstColumn", "1")
                    .with_attr("w:lastColumn", "0")
                    .with_attr("w:noHBand", "0")
                    .with_attr("w:noVBand", "1"),
            );
        let mut grid = XmlElement::new("w:tblGrid");
        for _ in 0..cols {
            grid.push(XmlElement::new("w:gridCol").with_attr("w:w", col_width.to_string()));
        }

        let content = rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let cells = (0..cols)
                    .map(|c| {
                        let text = row.get(c).map(String::as_str).unwrap_or("");
                        let mut p = Paragraph::new();
                        if !text.is_empty() {
                            p.add_run(if r == 0 { Run::bold(text) } else { Run::new(text) });
                        }
                        let properties = XmlElement::new("w:tcPr").with_child(
                            XmlElement::new("w:tcW")
                                .with_attr("w:w", col_width.to_string())
                                .with_attr("w:type", "dxa"),
                        );
                        RowContent::Cell(TableCell {
                            attributes: Vec::new(),
                            properties,
                            blocks: vec![Block::Paragraph(p)],
                        })
                    })
                    .collect();
                TableContent::Row(TableRow {
                    attributes: Vec::new(),
                    exceptions: None,
                    properties: XmlElement::new("w:trPr"),
                    content: cells,
                })
            })
            .collect();

        Self {
            attributes: Vec::new(),
            properties,
            grid: Some(grid),
            content,
        }
    }

    /// Build from a `w:tbl` element.
    pub fn from_element(el: XmlElement) -> Self {
        let mut table = Self {
            attributes: el.attributes,
            properties: XmlElement::new("w:tblPr"),
            grid: None,
            content: Vec::new(),
        };
        for node in el.children {
            let XmlNode::Element(child) = node else {
                continue;
            };
            match child.name.as_str() {
                "w:tblPr" => table.properties = child,
                "w:tblGrid" => table.grid = Some(child),
                "w:tr" => table.content.push(TableContent::Row(TableRow::from_element(child))),
                _ => table.content.push(TableContent::Other(child)),
            }
        }
        table
    }

    /// Convert back to a `w:tbl` element.
    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tbl");
        el.attributes = self.attributes.clone();
        el.push(self.properties.clone());
        if let Some(ref grid) = self.grid {
            el.push(grid.clone());
        }
        for item in &self.content {
            el.push(match item {
                TableContent::Row(row) => row.to_element(),
                TableContent::Other(other) => other.clone(),
            });
        }
        el
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.content.iter().filter_map(|c| match c {
            TableContent::Row(r) => Some(r),
            _ => None,
        })
    }

    /// Iterate mutably over rows.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TableRow> {
        self.content.iter_mut().filter_map(|c| match c {
            TableContent::Row(r) => Some(r),
            _ => None,
        })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Widest row's cell count.
    pub fn column_count(&self) -> usize {
        self.rows().map(|r| r.cells().count()).max().unwrap_or(0)
    }

    /// Text of every cell, tab-separated per row.
    pub fn text(&self) -> String {
        self.rows()
            .map(|r| r.cells().map(TableCell::text).collect::<Vec<_>>().join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Borders per edge, `None` for edges without a border element.
    pub fn borders(&self) -> Vec<(String, Option<BorderSpec>)> {
        let borders = self.properties.child("w:tblBorders");
        BORDER_EDGES
            .iter()
            .map(|edge| {
                let spec = borders
                    .and_then(|b| b.child(&format!("w:{}", edge)))
                    .map(|e| BorderSpec {
                        style: e.attr("w:val").unwrap_or("single").to_string(),
                        size: e.attr("w:sz").and_then(|v| v.parse().ok()).unwrap_or(0),
                        color: e.attr("w:color").unwrap_or("auto").to_string(),
                    });
                (edge.to_string(), spec)
            })
            .collect()
    }

    /// Apply the same border to every outer and inner edge.
    pub fn set_borders(&mut self, spec: &BorderSpec) -> bool {
        let borders = self.properties.ensure_child("w:tblBorders", TBLPR_ORDER);
        let order: Vec<String> = BORDER_EDGES.iter().map(|e| format!("w:{}", e)).collect();
        let order: Vec<&str> = order.iter().map(String::as_str).collect();
        let mut changed = false;
        for edge in &order {
            let el = borders.ensure_child(edge, &order);
            changed |= el.set_attr("w:val", spec.style.as_str());
            changed |= el.set_attr("w:sz", spec.size.to_string());
            changed |= el.set_attr("w:space", "0");
            changed |= el.set_attr("w:color", spec.color.as_str());
        }
        changed
    }

    /// Shade every cell in row `index`. Returns `true` if any cell changed.
    pub fn set_row_shading(&mut self, index: usize, fill: &str) -> bool {
        let Some(row) = self.rows_mut().nth(index) else {
            return false;
        };
        let mut changed = false;
        for cell in row.cells_mut() {
            changed |= cell.set_shading(fill);
        }
        changed
    }

    /// Default cell margins (`w:tblCellMar`).
    pub fn cell_margins(&self) -> Option<CellMargins> {
        let mar = self.properties.child("w:tblCellMar")?;
        let side = |name: &str| {
            mar.child(&format!("w:{}", name))
                .and_then(|e| e.attr("w:w"))
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0)
        };
        Some(CellMargins {
            top: side("top"),
            left: side("left"),
            bottom: side("bottom"),
            right: side("right"),
        })
    }

    /// Set default cell margins in twips.
    pub fn set_cell_margins(&mut self, margins: CellMargins) -> bool {
        let mar = self.properties.ensure_child("w:tblCellMar", TBLPR_ORDER);
        let order = ["w:top", "w:left", "w:start", "w:bottom", "w:right", "w:end"];
        let mut changed = false;
        for (side, value) in MARGIN_SIDES.iter().zip(margins.values()) {
            let el = mar.ensure_child(&format!("w:{}", side), &order);
            changed |= el.set_attr("w:w", value.to_string());
            changed |= el.set_attr("w:type", "dxa");
        }
        changed
    }

    /// Column layout mode (Word defaults to autofit).
    pub fn layout(&self) -> TableLayout {
        self.properties
            .child("w:tblLayout")
            .and_then(|l| l.attr("w:type"))
            .and_then(TableLayout::parse)
            .unwrap_or(TableLayout::Autofit)
    }

    /// Whether the layout mode is stored explicitly.
    pub fn has_explicit_layout(&self) -> bool {
        self.properties.child("w:tblLayout").is_some()
    }

    /// Set the column layout mode.
    ///
    /// Switching to autofit also drops fixed cell widths so Word sizes the
    /// columns to their content.
    pub fn set_layout(&mut self, layout: TableLayout) -> bool {
        let mut changed = self
            .properties
            .ensure_child("w:tblLayout", TBLPR_ORDER)
            .set_attr("w:type", layout.as_str());
        if layout == TableLayout::Autofit {
            for row in self.rows_mut() {
                for cell in row.cells_mut() {
                    changed |= cell.properties.remove_children("w:tcW") > 0;
                }
            }
        }
        changed
    }

    /// Preferred width.
    pub fn width(&self) -> Option<TableWidth> {
        let w = self.properties.child("w:tblW")?;
        let value = w.attr("w:w").unwrap_or("0");
        match w.attr("w:type").unwrap_or("dxa") {
            "auto" | "nil" => Some(TableWidth::Auto),
            // Fiftieths of a percent, or an explicit percentage string.
            "pct" => match value.strip_suffix('%') {
                Some(p) => p.parse().ok().map(TableWidth::Pct),
                None => value.parse::<f64>().ok().map(|v| TableWidth::Pct(v / 50.0)),
            },
            _ => value.parse().ok().map(TableWidth::Dxa),
        }
    }

    /// Set the preferred width.
    pub fn set_width(&mut self, width: TableWidth) -> bool {
        let (w, kind) = match width {
            TableWidth::Auto => ("0".to_string(), "auto"),
            TableWidth::Pct(p) => (((p * 50.0).round() as i64).to_string(), "pct"),
            TableWidth::Dxa(t) => (t.to_string(), "dxa"),
        };
        let el = self.properties.ensure_child("w:tblW", TBLPR_ORDER);
        let a = el.set_attr("w:w", w);
        let b = el.set_attr("w:type", kind);
        a || b
    }

    /// Number of leading rows marked as repeating header rows.
    pub fn header_rows(&self) -> usize {
        self.rows().take_while(|r| r.is_header()).count()
    }

    /// Mark the first `count` rows as repeating header rows.
    pub fn set_header_rows(&mut self, count: usize) -> bool {
        let mut changed = false;
        for row in self.rows_mut().take(count) {
            changed |= row.set_header(true);
        }
        changed
    }
}

impl TableRow {
    /// Build from a `w:tr` element.
    pub fn from_element(el: XmlElement) -> Self {
        let mut row = Self {
            attributes: el.attributes,
            exceptions: None,
            properties: XmlElement::new("w:trPr"),
            content: Vec::new(),
        };
        for node in el.children {
            let XmlNode::Element(child) = node else {
                continue;
            };
            match child.name.as_str() {
                "w:tblPrEx" => row.exceptions = Some(child),
                "w:trPr" => row.properties = child,
                "w:tc" => row.content.push(RowContent::Cell(TableCell::from_element(child))),
                _ => row.content.push(RowContent::Other(child)),
            }
        }
        row
    }

    /// Convert back to a `w:tr` element.
    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tr");
        el.attributes = self.attributes.clone();
        if let Some(ref ex) = self.exceptions {
            el.push(ex.clone());
        }
        if !self.properties.children.is_empty() {
            el.push(self.properties.clone());
        }
        for item in &self.content {
            el.push(match item {
                RowContent::Cell(cell) => cell.to_element(),
                RowContent::Other(other) => other.clone(),
            });
        }
        el
    }

    /// Iterate over cells.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.content.iter().filter_map(|c| match c {
            RowContent::Cell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Iterate mutably over cells.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.content.iter_mut().filter_map(|c| match c {
            RowContent::Cell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Whether the row repeats as a header on each page.
    pub fn is_header(&self) -> bool {
        self.properties
            .child("w:tblHeader")
            .map(|h| !matches!(h.attr("w:val"), Some("0") | Some("false") | Some("off")))
            .unwrap_or(false)
    }

    /// Set or clear the repeating-header flag.
    pub fn set_header(&mut self, on: bool) -> bool {
        if self.is_header() == on {
            return false;
        }
        if on {
            let h = self.properties.ensure_child("w:tblHeader", TRPR_ORDER);
            h.remove_attr("w:val");
        } else {
            self.properties.remove_children("w:tblHeader");
        }
        true
    }
}

impl TableCell {
    /// Build from a `w:tc` element.
    pub fn from_element(el: XmlElement) -> Self {
        let mut cell = Self {
            attributes: el.attributes,
            properties: XmlElement::new("w:tcPr"),
            blocks: Vec::new(),
        };
        for node in el.children {
            let XmlNode::Element(child) = node else {
                continue;
            };
            if child.name == "w:tcPr" {
                cell.properties = child;
            } else {
                cell.blocks.push(Block::from_element(child));
            }
        }
        cell
    }

    /// Convert back to a `w:tc` element.
    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tc");
        el.attributes = self.attributes.clone();
        if !self.properties.children.is_empty() {
            el.push(self.properties.clone());
        }
        for block in &self.blocks {
            el.push(block.to_element());
        }
        el
    }

    /// Iterate over the cell's paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Text of every paragraph, newline-separated.
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cell shading fill colour.
    pub fn shading(&self) -> Option<&str> {
        self.properties.child("w:shd").and_then(|s| s.attr("w:fill"))
    }

    /// Set the cell shading fill colour.
    pub fn set_shading(&mut self, fill: &str) -> bool {
        let shd = self.properties.ensure_child("w:shd", TCPR_ORDER);
        let a = shd.set_attr("w:val", "clear");
        let b = shd.set_attr("w:color", "auto");
        let c = shd.set_attr("w:fill", fill);
        a || b || c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::grid(&[
            vec!["Name".into(), "Value".into()],
            vec!["a".into(), "1".into()],
            vec!["b".into(), "2".into()],
        ])
    }

    #[test]
    fn test_grid_table() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.text(), "Name\tValue\na\t1\nb\t2");
        let header = table.rows().next().unwrap().cells().next().unwrap();
        let run = header.paragraphs().next().unwrap().runs().next().unwrap();
        assert_eq!(run.is_bold(), Some(true));
    }

    #[test]
    fn test_set_borders_idempotent() {
        let mut table = sample();
        let spec = BorderSpec::single(4, "000000");
        assert!(table.set_borders(&spec));
        assert!(!table.set_borders(&spec));
        assert_eq!(
            table.properties.children_named("w:tblBorders").count(),
            1
        );
        assert!(table.borders().iter().all(|(_, b)| b.as_ref() == Some(&spec)));
    }

    #[test]
    fn test_layout_autofit_drops_cell_widths() {
        let mut table = sample();
        assert!(table.set_layout(TableLayout::Autofit));
        assert!(!table.set_layout(TableLayout::Autofit));
        let cell = table.rows().next().unwrap().cells().next().unwrap();
        assert!(cell.properties.child("w:tcW").is_none());
    }

    #[test]
    fn test_width_pct() {
        let mut table = sample();
        assert_eq!(table.width(), Some(TableWidth::Auto));
        assert!(table.set_width(TableWidth::Pct(100.0)));
        assert_eq!(table.width(), Some(TableWidth::Pct(100.0)));
    }

    #[test]
    fn test_header_rows() {
        let mut table = sample();
        assert_eq!(table.header_rows(), 0);
        assert!(table.set_header_rows(1));
        assert!(!table.set_header_rows(1));
        assert_eq!(table.header_rows(), 1);
    }

    #[test]
    fn test_cell_margins() {
        let mut table = sample();
        assert_eq!(table.cell_margins(), None);
        assert!(table.set_cell_margins(CellMargins::uniform(50)));
        assert_eq!(table.cell_margins(), Some(CellMargins::uniform(50)));
    }

    #[test]
    fn test_element_roundtrip() {
        let mut table = sample();
        table.set_row_shading(0, "E3E3E3");
        let back = Table::from_element(table.to_element());
        assert_eq!(back, table);
    }
}
