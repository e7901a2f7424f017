//! Paragraph style lookup.

use super::xml::XmlDocument;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic class of a paragraph style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    /// Document title
    Title,
    /// Heading with level (1-9)
    Heading(u8),
    /// Bulleted list item
    ListBullet,
    /// Numbered list item
    ListNumber,
    /// Figure or table caption
    Caption,
    /// Block quotation
    Quote,
    /// Preformatted code
    Code,
    /// Any other style
    Body,
}

impl StyleKind {
    /// Classify a style from its id and display name.
    ///
    /// Matching is case-insensitive and ignores spaces, so both the id
    /// `Heading1` and the built-in name `heading 1` resolve to the same kind.
    pub fn classify(id: &str, name: Option<&str>) -> Self {
        let norm = |s: &str| -> String {
            s.chars()
                .filter(|c| !c.is_whitespace())
                .flat_map(char::to_lowercase)
                .collect()
        };
        for key in name.into_iter().map(norm).chain(std::iter::once(norm(id))) {
            if let Some(level) = key.strip_prefix("heading") {
                if let Ok(n) = level.parse::<u8>() {
                    if (1..=9).contains(&n) {
                        return StyleKind::Heading(n);
                    }
                }
            }
            match key.as_str() {
                "title" => return StyleKind::Title,
                "listbullet" => return StyleKind::ListBullet,
                "listnumber" => return StyleKind::ListNumber,
                "caption" => return StyleKind::Caption,
                "quote" | "blocktext" => return StyleKind::Quote,
                "code" | "htmlpreformatted" => return StyleKind::Code,
                _ => {}
            }
        }
        StyleKind::Body
    }

    /// Check if this is a heading of level `1..=max_level` or the title.
    pub fn is_heading_up_to(&self, max_level: u8) -> bool {
        match self {
            StyleKind::Title => true,
            StyleKind::Heading(n) => *n <= max_level,
            _ => false,
        }
    }
}

/// Style id to display-name map from `word/styles.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    names: BTreeMap<String, String>,
}

impl StyleSheet {
    /// Parse a styles part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(data)?;
        let mut names = BTreeMap::new();
        for style in doc.root.children_named("w:style") {
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let name = style
                .child("w:name")
                .and_then(|n| n.attr("w:val"))
                .unwrap_or(id);
            names.insert(id.to_string(), name.to_string());
        }
        Ok(Self { names })
    }

    /// Display name of a style id.
    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of styles.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if no styles are defined.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether the style id is defined.
    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    /// Classify a paragraph style id; no style is body text.
    pub fn kind(&self, id: Option<&str>) -> StyleKind {
        match id {
            Some(id) => StyleKind::classify(id, self.name(id)),
            None => StyleKind::Body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(StyleKind::classify("Heading1", None), StyleKind::Heading(1));
        assert_eq!(StyleKind::classify("1", Some("heading 2")), StyleKind::Heading(2));
        assert_eq!(StyleKind::classify("Title", None), StyleKind::Title);
        assert_eq!(StyleKind::classify("a5", Some("List Bullet")), StyleKind::ListBullet);
        assert_eq!(StyleKind::classify("Normal", Some("Normal")), StyleKind::Body);
        assert_eq!(StyleKind::classify("Heading0", None), StyleKind::Body);
    }

    #[test]
    fn test_stylesheet_parse() {
        let xml = br#"<w:styles xmlns:w="urn:w">
            <w:style w:type="paragraph" w:styleId="1"><w:name w:val="heading 1"/></w:style>
            <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
        </w:styles>"#;
        let sheet = StyleSheet::parse(xml).unwrap();
        assert_eq!(sheet.kind(Some("1")), StyleKind::Heading(1));
        assert_eq!(sheet.kind(Some("Normal")), StyleKind::Body);
        assert_eq!(sheet.kind(None), StyleKind::Body);
        assert!(StyleKind::Heading(4).is_heading_up_to(4));
        assert!(!StyleKind::Heading(5).is_heading_up_to(4));
    }
}
