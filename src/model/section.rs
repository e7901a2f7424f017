//! Section properties: page size and margins.

use super::units::{cm_to_twips, twips_to_cm};
use super::xml::XmlElement;
use serde::{Deserialize, Serialize};

const SECTPR_ORDER: &[&str] = &[
    "w:headerReference",
    "w:footerReference",
    "w:footnotePr",
    "w:endnotePr",
    "w:type",
    "w:pgSz",
    "w:pgMar",
    "w:paperSrc",
    "w:pgBorders",
    "w:lnNumType",
    "w:pgNumType",
    "w:cols",
    "w:formProt",
    "w:vAlign",
    "w:noEndnote",
    "w:titlePg",
    "w:textDirection",
    "w:bidi",
    "w:rtlGutter",
    "w:docGrid",
    "w:printerSettings",
    "w:sectPrChange",
];

/// Page geometry in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width_cm: f64,
    /// Page height
    pub height_cm: f64,
    /// Top margin
    pub margin_top_cm: f64,
    /// Bottom margin
    pub margin_bottom_cm: f64,
    /// Left margin
    pub margin_left_cm: f64,
    /// Right margin
    pub margin_right_cm: f64,
}

impl PageGeometry {
    /// A4 portrait with 2.54 cm margins.
    pub fn a4() -> Self {
        Self {
            width_cm: 21.0,
            height_cm: 29.7,
            margin_top_cm: 2.54,
            margin_bottom_cm: 2.54,
            margin_left_cm: 2.54,
            margin_right_cm: 2.54,
        }
    }

    /// US Letter portrait with 2.54 cm margins.
    pub fn letter() -> Self {
        Self {
            width_cm: 21.59,
            height_cm: 27.94,
            ..Self::a4()
        }
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width_cm > self.height_cm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Section properties (`w:sectPr`).
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// The `w:sectPr` element
    pub element: XmlElement,
}

impl Default for Section {
    fn default() -> Self {
        Self::new(XmlElement::new("w:sectPr"))
    }
}

impl Section {
    /// Wrap an existing `w:sectPr` element.
    pub fn new(element: XmlElement) -> Self {
        Self { element }
    }

    fn twips(&self, el: &str, attr: &str) -> Option<i64> {
        self.element
            .child(el)
            .and_then(|e| e.attr(attr))
            .and_then(|v| v.parse().ok())
    }

    /// Page width and height in twips.
    pub fn page_size(&self) -> Option<(i64, i64)> {
        Some((self.twips("w:pgSz", "w:w")?, self.twips("w:pgSz", "w:h")?))
    }

    /// Current geometry, `None` when size or margins are not stored.
    pub fn geometry(&self) -> Option<PageGeometry> {
        let (w, h) = self.page_size()?;
        Some(PageGeometry {
            width_cm: twips_to_cm(w),
            height_cm: twips_to_cm(h),
            margin_top_cm: twips_to_cm(self.twips("w:pgMar", "w:top")?),
            margin_bottom_cm: twips_to_cm(self.twips("w:pgMar", "w:bottom")?),
            margin_left_cm: twips_to_cm(self.twips("w:pgMar", "w:left")?),
            margin_right_cm: twips_to_cm(self.twips("w:pgMar", "w:right")?),
        })
    }

    /// Set page size and margins. Returns `true` if anything changed.
    pub fn set_geometry(&mut self, g: &PageGeometry) -> bool {
        let mut changed = false;
        let size = self.element.ensure_child("w:pgSz", SECTPR_ORDER);
        changed |= size.set_attr("w:w", cm_to_twips(g.width_cm).to_string());
        changed |= size.set_attr("w:h", cm_to_twips(g.height_cm).to_string());
        if g.is_landscape() {
            changed |= size.set_attr("w:orient", "landscape");
        } else {
            changed |= size.remove_attr("w:orient");
        }

        let mar = self.element.ensure_child("w:pgMar", SECTPR_ORDER);
        changed |= mar.set_attr("w:top", cm_to_twips(g.margin_top_cm).to_string());
        changed |= mar.set_attr("w:right", cm_to_twips(g.margin_right_cm).to_string());
        changed |= mar.set_attr("w:bottom", cm_to_twips(g.margin_bottom_cm).to_string());
        changed |= mar.set_attr("w:left", cm_to_twips(g.margin_left_cm).to_string());
        for key in ["w:header", "w:footer", "w:gutter"] {
            if mar.attr(key).is_none() {
                let default = if key == "w:gutter" { "0" } else { "720" };
                mar.set_attr(key, default);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_geometry() {
        let mut section = Section::default();
        assert_eq!(section.geometry(), None);
        assert!(section.set_geometry(&PageGeometry::a4()));
        assert!(!section.set_geometry(&PageGeometry::a4()));

        let g = section.geometry().unwrap();
        assert!((g.width_cm - 21.0).abs() < 0.01);
        assert!((g.margin_left_cm - 2.54).abs() < 0.01);
        assert_eq!(section.page_size(), Some((11906, 16838)));
    }

    #[test]
    fn test_landscape() {
        let mut g = PageGeometry::a4();
        std::mem::swap(&mut g.width_cm, &mut g.height_cm);
        assert!(g.is_landscape());
        let mut section = Section::default();
        section.set_geometry(&g);
        let size = section.element.child("w:pgSz").unwrap();
        assert_eq!(size.attr("w:orient"), Some("landscape"));
    }
}
