//! Document model for word-processing packages.
//!
//! Typed views (paragraphs, runs, tables, drawings, math) sit on top of an
//! order-preserving XML tree, so any markup the model does not understand
//! is carried through a load/save cycle unchanged.

mod block;
mod document;
mod image;
mod math;
mod paragraph;
mod section;
mod styles;
mod table;
pub mod units;
pub mod xml;

pub use block::Block;
pub use document::{Document, Metadata};
pub use image::{AnchorMode, Image};
pub use math::{MathKind, MathNode};
pub use paragraph::{is_equation_number, Alignment, Inline, Paragraph, Run, RunContent};
pub use section::{PageGeometry, Section};
pub use styles::{StyleKind, StyleSheet};
pub use table::{
    BorderSpec, CellMargins, RowContent, TableCell, TableContent, TableLayout, TableRow,
    TableWidth, Table, BORDER_EDGES,
};
pub use xml::{XmlDocument, XmlElement, XmlNode};
