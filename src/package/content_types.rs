//! The `[Content_Types].xml` part.

use crate::error::Result;
use crate::model::xml::{XmlDocument, XmlElement};

/// Parsed content-type declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTypes {
    doc: XmlDocument,
}

impl ContentTypes {
    /// Parse the content types part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: XmlDocument::parse(data)?,
        })
    }

    /// Serialize the content types part.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.doc.to_bytes()
    }

    /// Declare a default content type for an extension.
    ///
    /// Returns `true` if a declaration was added.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) -> bool {
        let exists = self
            .doc
            .root
            .children_named("Default")
            .any(|d| d.attr("Extension").is_some_and(|e| e.eq_ignore_ascii_case(extension)));
        if exists {
            return false;
        }
        let default = XmlElement::new("Default")
            .with_attr("Extension", extension)
            .with_attr("ContentType", content_type);
        // Defaults precede overrides.
        let at = self
            .doc
            .root
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.name == "Override"))
            .unwrap_or(self.doc.root.children.len());
        self.doc
            .root
            .children
            .insert(at, crate::model::xml::XmlNode::Element(default));
        true
    }

    /// Content type declared for a part, by override or by extension.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        if let Some(o) = self
            .doc
            .root
            .children_named("Override")
            .find(|o| o.attr("PartName") == Some(part_name.as_str()))
        {
            return o.attr("ContentType");
        }
        let ext = part.rsplit_once('.').map(|(_, e)| e)?;
        self.doc
            .root
            .children_named("Default")
            .find(|d| d.attr("Extension").is_some_and(|e| e.eq_ignore_ascii_case(ext)))
            .and_then(|d| d.attr("ContentType"))
    }
}

/// MIME type for an image extension.
pub fn image_mime(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="doc"/></Types>"#;

    #[test]
    fn test_ensure_default() {
        let mut ct = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();
        assert!(ct.ensure_default("png", "image/png"));
        assert!(!ct.ensure_default("PNG", "image/png"));
        assert_eq!(ct.content_type_of("word/media/image1.png"), Some("image/png"));
        assert_eq!(ct.content_type_of("word/document.xml"), Some("doc"));

        let names: Vec<_> = ct.doc.root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Default", "Default", "Override"]);
    }
}
