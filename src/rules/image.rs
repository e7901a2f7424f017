//! Image rules: alignment, size and captions.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::Result;
use crate::model::units::emu_to_inches;
use crate::model::{Alignment, Document, Paragraph, Run, StyleKind};
use serde_json::{json, Map, Value};

/// Centres every paragraph holding a picture.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCenterRule;

impl Rule for ImageCenterRule {
    fn id(&self) -> &str {
        "image_center"
    }

    fn name(&self) -> &str {
        "Centre images"
    }

    fn category(&self) -> Category {
        Category::Image
    }

    fn description(&self) -> &str {
        "Centre paragraphs that contain images."
    }

    fn priority(&self) -> i32 {
        110
    }

    fn apply(&self, doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            if !p.has_image() {
                continue;
            }
            let before = p.alignment().unwrap_or_default();
            if !p.set_alignment(Alignment::Center) {
                continue;
            }
            fixes.push(
                Fix::new(
                    format!("fix_image_center_{}", i),
                    self.id(),
                    format!("Centred the image in paragraph {}", i + 1),
                )
                .with_paragraph(i)
                .with_before(before.to_string())
                .with_after(Alignment::Center.to_string())
                .with_location(json!({ "paragraph_index": i, "type": "image_alignment" })),
            );
        }
        Ok(fixes)
    }
}

/// Shrinks images larger than the configured bounds, keeping aspect ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizeRule;

impl Rule for ImageResizeRule {
    fn id(&self) -> &str {
        "image_resize"
    }

    fn name(&self) -> &str {
        "Resize images"
    }

    fn category(&self) -> Category {
        Category::Image
    }

    fn description(&self) -> &str {
        "Scale down images that exceed the page bounds."
    }

    fn priority(&self) -> i32 {
        120
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({ "max_width": 6.0, "max_height": 8.0 }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let max_width = params.f64("max_width", 6.0);
        let max_height = params.f64("max_height", 8.0);
        let inches = |(cx, cy): (i64, i64)| {
            format!("{:.2}x{:.2} in", emu_to_inches(cx), emu_to_inches(cy))
        };
        let mut fixes = Vec::new();

        for (i, p) in doc.paragraphs_mut().enumerate() {
            for (j, image) in p.images_mut().enumerate() {
                let Some(before) = image.extent() else {
                    continue;
                };
                let Some(after) = image.fit_within(max_width, max_height) else {
                    continue;
                };
                fixes.push(
                    Fix::new(
                        format!("fix_image_resize_{}_{}", i, j),
                        self.id(),
                        format!("Resized the image in paragraph {}", i + 1),
                    )
                    .with_paragraph(i)
                    .with_before(inches(before))
                    .with_after(inches(after))
                    .with_location(json!({
                        "paragraph_index": i,
                        "type": "image_extent",
                        "image_index": j,
                        "max_width_in": max_width,
                        "max_height_in": max_height,
                    })),
                );
            }
        }
        Ok(fixes)
    }
}

/// Adds a numbered caption paragraph below every image.
///
/// Images already followed by a caption-styled paragraph keep it, but still
/// count towards the numbering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCaptionRule;

impl Rule for ImageCaptionRule {
    fn id(&self) -> &str {
        "image_caption"
    }

    fn name(&self) -> &str {
        "Image captions"
    }

    fn category(&self) -> Category {
        Category::Image
    }

    fn description(&self) -> &str {
        "Insert a numbered caption below each image."
    }

    fn priority(&self) -> i32 {
        130
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "caption_format": "Figure {number}",
            "caption_font_size": 10
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let format = params.str("caption_format", "Figure {number}");
        let size = params.f64("caption_font_size", 10.0);
        let mut fixes = Vec::new();
        let mut number = 0;
        let mut i = 0;

        while i < doc.paragraph_count() {
            let has_image = doc.paragraph(i).is_some_and(Paragraph::has_image);
            if !has_image {
                i += 1;
                continue;
            }
            number += 1;
            let captioned = doc
                .paragraph(i + 1)
                .is_some_and(|next| doc.style_kind(next) == StyleKind::Caption);
            if captioned {
                i += 2;
                continue;
            }

            let text = format.replace("{number}", &number.to_string());
            let mut caption = Paragraph::with_style("Caption");
            caption.set_alignment(Alignment::Center);
            let mut run = Run::new(text.clone());
            run.set_size(size);
            caption.add_run(run);
            if doc.insert_paragraph_after(i, caption).is_none() {
                i += 1;
                continue;
            }

            fixes.push(
                Fix::new(
                    format!("fix_image_caption_{}", i),
                    self.id(),
                    format!("Added caption '{}' to the image in paragraph {}", text, i + 1),
                )
                .with_paragraph(i)
                .with_after(text)
                .with_location(json!({ "paragraph_index": i, "type": "image_caption" })),
            );
            i += 2;
        }
        Ok(fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::units::inches_to_emu;
    use crate::model::Image;

    fn picture(width_in: f64, height_in: f64) -> Paragraph {
        let image = Image::inline(
            "rId99",
            1,
            "Picture 1",
            inches_to_emu(width_in),
            inches_to_emu(height_in),
        );
        let mut p = Paragraph::new();
        p.add_run(Run::with_image(image));
        p
    }

    fn doc() -> Document {
        let mut doc = Document::blank().unwrap();
        doc.add_paragraph(Paragraph::with_text("Intro"));
        doc.add_paragraph(picture(8.0, 4.0));
        doc.add_paragraph(Paragraph::with_text("Between"));
        doc.add_paragraph(picture(2.0, 10.0));
        doc
    }

    #[test]
    fn test_center() {
        let mut doc = doc();
        let fixes = ImageCenterRule.apply(&mut doc, &Params::default()).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].paragraph_indices, vec![1]);
        assert_eq!(doc.paragraph(1).unwrap().alignment(), Some(Alignment::Center));
        assert!(ImageCenterRule.apply(&mut doc, &Params::default()).unwrap().is_empty());
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let mut doc = doc();
        let rule = ImageResizeRule;
        let params = Params::new(rule.default_params());
        let fixes = rule.apply(&mut doc, &params).unwrap();
        assert_eq!(fixes.len(), 2);

        let mut wide = doc.paragraph_mut(1).unwrap().images_mut().next().unwrap().clone();
        assert!((wide.width_inches().unwrap() - 6.0).abs() < 1e-3);
        assert!((wide.height_inches().unwrap() - 3.0).abs() < 1e-3);
        assert!(wide.fit_within(6.0, 8.0).is_none());

        let tall = doc.paragraph_mut(3).unwrap().images_mut().next().unwrap().clone();
        assert!((tall.height_inches().unwrap() - 8.0).abs() < 1e-3);
        assert!((tall.width_inches().unwrap() - 1.6).abs() < 1e-3);

        assert!(rule.apply(&mut doc, &params).unwrap().is_empty());
    }

    #[test]
    fn test_resize_ids_are_unique_per_image() {
        let mut doc = Document::blank().unwrap();
        let mut p = picture(9.0, 3.0);
        p.add_run(Run::with_image(Image::inline(
            "rId98",
            2,
            "Picture 2",
            inches_to_emu(12.0),
            inches_to_emu(4.0),
        )));
        doc.add_paragraph(p);

        let rule = ImageResizeRule;
        let fixes = rule.apply(&mut doc, &Params::new(rule.default_params())).unwrap();
        let ids: Vec<&str> = fixes.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["fix_image_resize_0_0", "fix_image_resize_0_1"]);
        assert_eq!(fixes[1].location.as_ref().unwrap()["image_index"], 1);
    }

    #[test]
    fn test_captions_inserted_once() {
        let mut doc = doc();
        let rule = ImageCaptionRule;
        let params = Params::new(rule.default_params());
        let fixes = rule.apply(&mut doc, &params).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(doc.paragraph_count(), 6);
        assert_eq!(doc.paragraph(2).unwrap().text(), "Figure 1");
        assert_eq!(doc.paragraph(5).unwrap().text(), "Figure 2");
        assert_eq!(fixes[1].paragraph_indices, vec![4]);

        assert!(rule.apply(&mut doc, &params).unwrap().is_empty());
        assert_eq!(doc.paragraph_count(), 6);
    }
}
