//! Embedded drawings.

use super::units::{emu_to_inches, EMU_PER_INCH};
use super::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// How a drawing is positioned relative to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// Flows with the text (`wp:inline`)
    Inline,
    /// Positioned on the page (`wp:anchor`)
    Floating,
}

/// A drawing (`w:drawing`) carried by a run.
///
/// The full element is kept so unknown drawing markup survives a save; the
/// accessors read and update the display extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// The `w:drawing` element
    pub element: XmlElement,
}

impl Image {
    /// Wrap an existing `w:drawing` element.
    pub fn new(element: XmlElement) -> Self {
        Self { element }
    }

    /// Build an inline picture referencing the relationship `rel_id`.
    pub fn inline(rel_id: &str, id: u32, name: &str, cx: i64, cy: i64) -> Self {
        let ext = |name: &str| {
            XmlElement::new(name)
                .with_attr("cx", cx.to_string())
                .with_attr("cy", cy.to_string())
        };
        let pic = XmlElement::new("pic:pic")
            .with_attr(
                "xmlns:pic",
                "http://schemas.openxmlformats.org/drawingml/2006/picture",
            )
            .with_child(
                XmlElement::new("pic:nvPicPr")
                    .with_child(
                        XmlElement::new("pic:cNvPr")
                            .with_attr("id", "0")
                            .with_attr("name", name),
                    )
                    .with_child(XmlElement::new("pic:cNvPicPr")),
            )
            .with_child(
                XmlElement::new("pic:blipFill")
                    .with_child(XmlElement::new("a:blip").with_attr("r:embed", rel_id))
                    .with_child(
                        XmlElement::new("a:stretch").with_child(XmlElement::new("a:fillRect")),
                    ),
            )
            .with_child(
                XmlElement::new("pic:spPr")
                    .with_child(
                        XmlElement::new("a:xfrm")
                            .with_child(
                                XmlElement::new("a:off")
                                    .with_attr("x", "0")
                                    .with_attr("y", "0"),
                            )
                            .with_child(ext("a:ext")),
                    )
                    .with_child(
                        XmlElement::new("a:prstGeom")
                            .with_attr("prst", "rect")
                            .with_child(XmlElement::new("a:avLst")),
                    ),
            );
        let inline = XmlElement::new("wp:inline")
            .with_attr("distT", "0")
            .with_attr("distB", "0")
            .with_attr("distL", "0")
            .with_attr("distR", "0")
            .with_child(ext("wp:extent"))
            .with_child(
                XmlElement::new("wp:docPr")
                    .with_attr("id", id.to_string())
                    .with_attr("name", name),
            )
            .with_child(
                XmlElement::new("wp:cNvGraphicFramePr").with_child(
                    XmlElement::new("a:graphicFrameLocks")
                        .with_attr(
                            "xmlns:a",
                            "http://schemas.openxmlformats.org/drawingml/2006/main",
                        )
                        .with_attr("noChangeAspect", "1"),
                ),
            )
            .with_child(
                XmlElement::new("a:graphic")
                    .with_attr(
                        "xmlns:a",
                        "http://schemas.openxmlformats.org/drawingml/2006/main",
                    )
                    .with_child(
                        XmlElement::new("a:graphicData")
                            .with_attr(
                                "uri",
                                "http://schemas.openxmlformats.org/drawingml/2006/picture",
                            )
                            .with_child(pic),
                    ),
            );
        Self::new(XmlElement::new("w:drawing").with_child(inline))
    }

    /// Positioning mode.
    pub fn anchor_mode(&self) -> AnchorMode {
        if self.element.child("wp:anchor").is_some() {
            AnchorMode::Floating
        } else {
            AnchorMode::Inline
        }
    }

    /// Whether the drawing holds a picture (rather than a chart or shape).
    pub fn has_picture(&self) -> bool {
        self.element.contains("a:blip")
    }

    /// Relationship id of the embedded picture.
    pub fn embed_id(&self) -> Option<&str> {
        self.element.find("a:blip").and_then(|b| b.attr("r:embed"))
    }

    fn container(&self) -> Option<&XmlElement> {
        self.element
            .child("wp:inline")
            .or_else(|| self.element.child("wp:anchor"))
    }

    fn container_mut(&mut self) -> Option<&mut XmlElement> {
        if self.element.child("wp:inline").is_some() {
            self.element.child_mut("wp:inline")
        } else {
            self.element.child_mut("wp:anchor")
        }
    }

    /// Display extent `(cx, cy)` in EMU.
    pub fn extent(&self) -> Option<(i64, i64)> {
        let extent = self.container()?.child("wp:extent")?;
        let cx = extent.attr("cx")?.parse().ok()?;
        let cy = extent.attr("cy")?.parse().ok()?;
        Some((cx, cy))
    }

    /// Width in inches.
    pub fn width_inches(&self) -> Option<f64> {
        self.extent().map(|(cx, _)| emu_to_inches(cx))
    }

    /// Height in inches.
    pub fn height_inches(&self) -> Option<f64> {
        self.extent().map(|(_, cy)| emu_to_inches(cy))
    }

    /// Set the display extent in EMU.
    ///
    /// The shape transform (`a:xfrm/a:ext`) is kept in sync with the frame
    /// extent. Returns `true` if anything changed.
    pub fn set_extent(&mut self, cx: i64, cy: i64) -> bool {
        let Some(container) = self.container_mut() else {
            return false;
        };
        let mut changed = false;
        if let Some(extent) = container.child_mut("wp:extent") {
            changed |= extent.set_attr("cx", cx.to_string());
            changed |= extent.set_attr("cy", cy.to_string());
        }
        if let Some(ext) = container.find_mut("a:xfrm").and_then(|x| x.child_mut("a:ext")) {
            changed |= ext.set_attr("cx", cx.to_string());
            changed |= ext.set_attr("cy", cy.to_string());
        }
        changed
    }

    /// Scale to fit within `max_width` x `max_height` inches, preserving
    /// aspect ratio. Returns the new extent if the image was resized.
    pub fn fit_within(&mut self, max_width: f64, max_height: f64) -> Option<(i64, i64)> {
        let (cx, cy) = self.extent()?;
        if cx <= 0 || cy <= 0 {
            return None;
        }
        let (w, h) = (emu_to_inches(cx), emu_to_inches(cy));
        if w <= max_width && h <= max_height {
            return None;
        }
        let ratio = w / h;
        let (mut new_w, mut new_h) = if ratio > 1.0 {
            (max_width, max_width / ratio)
        } else {
            (max_height * ratio, max_height)
        };
        if new_w > max_width {
            new_w = max_width;
            new_h = max_width / ratio;
        }
        if new_h > max_height {
            new_h = max_height;
            new_w = max_height * ratio;
        }
        let emu = EMU_PER_INCH as f64;
        let extent = ((new_w * emu).round() as i64, (new_h * emu).round() as i64);
        self.set_extent(extent.0, extent.1).then_some(extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::units::inches_to_emu;

    #[test]
    fn test_inline_image_extent() {
        let img = Image::inline("rId5", 1, "Picture 1", inches_to_emu(2.0), inches_to_emu(1.0));
        assert_eq!(img.anchor_mode(), AnchorMode::Inline);
        assert!(img.has_picture());
        assert_eq!(img.embed_id(), Some("rId5"));
        assert_eq!(img.width_inches(), Some(2.0));
    }

    #[test]
    fn test_fit_within_wide_image() {
        let mut img = Image::inline("rId1", 1, "p", inches_to_emu(10.0), inches_to_emu(5.0));
        let resized = img.fit_within(6.0, 8.0);
        assert_eq!(resized, Some((inches_to_emu(6.0), inches_to_emu(3.0))));
        let xfrm_ext = img.element.find("a:xfrm").and_then(|x| x.child("a:ext")).unwrap();
        assert_eq!(xfrm_ext.attr("cx"), Some("5486400"));

        // Already fits: nothing to do.
        assert_eq!(img.fit_within(6.0, 8.0), None);
    }

    #[test]
    fn test_fit_within_tall_image() {
        let mut img = Image::inline("rId1", 1, "p", inches_to_emu(4.0), inches_to_emu(16.0));
        let (cx, cy) = img.fit_within(6.0, 8.0).unwrap();
        assert_eq!(cx, inches_to_emu(2.0));
        assert_eq!(cy, inches_to_emu(8.0));
    }
}
