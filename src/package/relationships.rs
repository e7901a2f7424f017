//! Relationship parts (`*.rels`).

use crate::error::Result;
use crate::model::xml::{XmlDocument, XmlElement};

/// Relationship type of the main document part.
pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type of the core properties part.
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// Relationship type of the styles part.
pub const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Relationship type of an image part.
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A parsed relationship part.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationships {
    doc: XmlDocument,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationships {
    /// Create an empty relationship set.
    pub fn new() -> Self {
        Self {
            doc: XmlDocument::new(XmlElement::new("Relationships").with_attr("xmlns", RELS_NS)),
        }
    }

    /// Parse a relationship part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: XmlDocument::parse(data)?,
        })
    }

    /// Serialize the relationship part.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.doc.to_bytes()
    }

    /// Iterate over `(id, type, target)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.doc.root.children_named("Relationship").filter_map(|r| {
            Some((r.attr("Id")?, r.attr("Type")?, r.attr("Target")?))
        })
    }

    /// Target of the first relationship with the given type.
    pub fn target_by_type(&self, rel_type: &str) -> Option<&str> {
        self.iter()
            .find(|(_, t, _)| *t == rel_type)
            .map(|(_, _, target)| target)
    }

    /// Target of the relationship with the given id.
    pub fn target(&self, id: &str) -> Option<&str> {
        self.iter()
            .find(|(rid, _, _)| *rid == id)
            .map(|(_, _, target)| target)
    }

    /// Add a relationship and return its new id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .iter()
            .filter_map(|(id, _, _)| id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        self.doc.root.push(
            XmlElement::new("Relationship")
                .with_attr("Id", id.as_str())
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
        id
    }
}

/// Path of the relationship part belonging to `part`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for seg in target.split('/') {
        match seg {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            _ => segments.push(seg),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word/document.xml", "media/image1.png"), "word/media/image1.png");
        assert_eq!(resolve_target("word/document.xml", "../docProps/core.xml"), "docProps/core.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/styles.xml"), "word/styles.xml");
    }

    #[test]
    fn test_add_relationship() {
        let mut rels = Relationships::new();
        let a = rels.add(REL_STYLES, "styles.xml");
        let b = rels.add(REL_IMAGE, "media/image1.png");
        assert_eq!(a, "rId1");
        assert_eq!(b, "rId2");
        assert_eq!(rels.target_by_type(REL_IMAGE), Some("media/image1.png"));

        let parsed = Relationships::parse(&rels.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.target("rId1"), Some("styles.xml"));
    }
}
