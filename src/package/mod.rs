//! Zip container of a word-processing document.
//!
//! Parts are kept in archive order as raw bytes. Only parts that are
//! explicitly replaced get new content; everything else is written back
//! exactly as it was read.

mod content_types;
mod relationships;
mod template;

pub use content_types::{image_mime, ContentTypes};
pub use relationships::{
    rels_path_for, resolve_target, Relationships, REL_CORE_PROPERTIES, REL_IMAGE,
    REL_OFFICE_DOCUMENT, REL_STYLES,
};

use crate::error::{Error, Result};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Default main document part.
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// A named part of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part name without leading slash
    pub name: String,
    /// Raw content
    pub data: Vec<u8>,
}

/// An ordered collection of package parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Read a package from zip bytes.
    ///
    /// Fails with [`Error::Format`] when the bytes are not a zip archive or
    /// the archive lacks a content types part.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::Format(format!("not a zip container: {}", e)))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Format(format!("unreadable entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)
                .map_err(|e| Error::Format(format!("unreadable part {}: {}", name, e)))?;
            parts.push(Part { name, data: buf });
        }
        let package = Self { parts };
        if !package.contains(CONTENT_TYPES_PART) {
            return Err(Error::Format(format!("missing {}", CONTENT_TYPES_PART)));
        }
        Ok(package)
    }

    /// Write the package to zip bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&[])
    }

    /// Write the package with some parts' content substituted.
    ///
    /// Substitutions for parts that do not exist are appended at the end.
    pub fn to_bytes_with(&self, replacements: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for part in &self.parts {
            let data = replacements
                .iter()
                .find(|(name, _)| *name == part.name)
                .map(|(_, data)| *data)
                .unwrap_or(part.data.as_slice());
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(data)?;
        }
        for (name, data) in replacements {
            if !self.contains(name) {
                writer.start_file(*name, options)?;
                writer.write_all(data)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    /// A minimal valid package with an empty body and the standard styles.
    pub fn blank() -> Self {
        let created = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        let core = template::CORE.replace("{created}", &created);
        let parts = [
            (CONTENT_TYPES_PART, template::CONTENT_TYPES.as_bytes().to_vec()),
            ("_rels/.rels", template::ROOT_RELS.as_bytes().to_vec()),
            (DEFAULT_MAIN_PART, template::DOCUMENT.as_bytes().to_vec()),
            ("word/_rels/document.xml.rels", template::DOCUMENT_RELS.as_bytes().to_vec()),
            ("word/styles.xml", template::STYLES.as_bytes().to_vec()),
            ("word/numbering.xml", template::NUMBERING.as_bytes().to_vec()),
            ("word/settings.xml", template::SETTINGS.as_bytes().to_vec()),
            ("docProps/core.xml", core.into_bytes()),
            ("docProps/app.xml", template::APP.as_bytes().to_vec()),
        ];
        Self {
            parts: parts
                .into_iter()
                .map(|(name, data)| Part {
                    name: name.to_string(),
                    data,
                })
                .collect(),
        }
    }

    /// Raw content of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Replace a part's content, appending the part if it is new.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Relationships owned by `part` (the package itself for `""`).
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        match self.part(&rels_path_for(part)) {
            Some(data) => Relationships::parse(data),
            None => Ok(Relationships::new()),
        }
    }

    /// Store the relationships owned by `part`.
    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) -> Result<()> {
        let data = rels.to_bytes()?;
        self.set_part(&rels_path_for(part), data);
        Ok(())
    }

    /// Parsed content types.
    pub fn content_types(&self) -> Result<ContentTypes> {
        let data = self
            .part(CONTENT_TYPES_PART)
            .ok_or_else(|| Error::Format(format!("missing {}", CONTENT_TYPES_PART)))?;
        ContentTypes::parse(data)
    }

    /// Name of the main document part.
    pub fn main_document_part(&self) -> Result<String> {
        let rels = self.relationships("")?;
        let name = rels
            .target_by_type(REL_OFFICE_DOCUMENT)
            .map(|t| resolve_target("", t))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
        if self.contains(&name) {
            Ok(name)
        } else {
            Err(Error::Format(format!("main document part {} not found", name)))
        }
    }

    /// Name of a part related to `source` by relationship type.
    pub fn related_part(&self, source: &str, rel_type: &str) -> Result<Option<String>> {
        let rels = self.relationships(source)?;
        Ok(rels
            .target_by_type(rel_type)
            .map(|t| resolve_target(source, t))
            .filter(|name| self.contains(name)))
    }

    /// Add an image part related to `source` and return the relationship id.
    pub fn add_media(&mut self, source: &str, data: Vec<u8>, extension: &str) -> Result<String> {
        let extension = extension.to_ascii_lowercase();
        let (name, target) = (1..)
            .map(|n| {
                let target = format!("media/image{}.{}", n, extension);
                let name = resolve_target(source, &target);
                (name, target)
            })
            .find(|(name, _)| !self.contains(name))
            .ok_or_else(|| Error::Other("no free media name".into()))?;
        log::debug!("Adding media part {}", name);
        self.set_part(&name, data);

        let mut types = self.content_types()?;
        if types.ensure_default(&extension, image_mime(&extension)) {
            self.set_part(CONTENT_TYPES_PART, types.to_bytes()?);
        }

        let mut rels = self.relationships(source)?;
        let id = rels.add(REL_IMAGE, &target);
        self.set_relationships(source, &rels)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_package_roundtrip() {
        let package = Package::blank();
        let bytes = package.to_bytes().unwrap();
        let back = Package::from_bytes(&bytes).unwrap();
        assert_eq!(back, package);
        assert_eq!(back.main_document_part().unwrap(), "word/document.xml");
        assert_eq!(
            back.related_part("word/document.xml", REL_STYLES).unwrap(),
            Some("word/styles.xml".to_string())
        );
    }

    #[test]
    fn test_not_a_zip_is_format_error() {
        let err = Package::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_add_media() {
        let mut package = Package::blank();
        let id1 = package.add_media("word/document.xml", vec![1, 2, 3], "PNG").unwrap();
        let id2 = package.add_media("word/document.xml", vec![4], "png").unwrap();
        assert_ne!(id1, id2);
        assert_eq!(package.part("word/media/image1.png"), Some(&[1u8, 2, 3][..]));
        assert!(package.contains("word/media/image2.png"));

        let rels = package.relationships("word/document.xml").unwrap();
        assert_eq!(rels.target(&id2), Some("media/image2.png"));
    }
}
