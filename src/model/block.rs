//! Body-level blocks.

use super::paragraph::Paragraph;
use super::table::Table;
use super::xml::XmlElement;

/// A content block in the document body or a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// Any other body element (structured document tags, bookmarks,
    /// alternate content), preserved verbatim
    Other(XmlElement),
}

impl Block {
    /// Build a block from a body child element.
    pub fn from_element(el: XmlElement) -> Self {
        match el.name.as_str() {
            "w:p" => Block::Paragraph(Paragraph::from_element(el)),
            "w:tbl" => Block::Table(Table::from_element(el)),
            _ => Block::Other(el),
        }
    }

    /// Convert back to an element.
    pub fn to_element(&self) -> XmlElement {
        match self {
            Block::Paragraph(p) => p.to_element(),
            Block::Table(t) => t.to_element(),
            Block::Other(el) => el.clone(),
        }
    }

    /// Borrow the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Borrow the table if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Check if this is a paragraph block.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this is a table block.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Plain text of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.text(),
            Block::Table(t) => t.text(),
            Block::Other(el) => el.text_content(),
        }
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}
