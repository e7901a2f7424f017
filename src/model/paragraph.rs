//! Paragraph and run-level types.
//!
//! Formatting lives in the `w:pPr` / `w:rPr` property elements. Accessors
//! read the typed value out of the property element; setters write it back
//! at the schema position and report whether the stored value changed, so
//! applying the same value twice is a no-op the second time.

use super::image::Image;
use super::math::{MathKind, MathNode};
use super::units::{half_points_to_pt, pt_to_half_points, pt_to_twips, twips_to_pt, LINE_UNITS};
use super::xml::{XmlElement, XmlNode};
use serde::{Deserialize, Serialize};

/// Schema order of `w:pPr` children.
pub(crate) const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Schema order of `w:rPr` children.
pub(crate) const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

/// A paragraph (`w:p`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    /// Attributes on `w:p` (revision ids and the like)
    pub attributes: Vec<(String, String)>,

    /// Paragraph properties (`w:pPr`); omitted on write when empty
    pub properties: XmlElement,

    /// Inline content in document order
    pub content: Vec<Inline>,
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A text run
    Run(Run),
    /// An embedded math node (`m:oMath` / `m:oMathPara`)
    Math(MathNode),
    /// Anything else (hyperlinks, bookmarks, fields), preserved verbatim
    Other(XmlElement),
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            properties: XmlElement::new("w:pPr"),
            content: Vec::new(),
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::new(text));
        p
    }

    /// Create a paragraph with a style id.
    pub fn with_style(style_id: &str) -> Self {
        let mut p = Self::new();
        p.set_style(style_id);
        p
    }

    /// Build from a `w:p` element.
    pub fn from_element(el: XmlElement) -> Self {
        let mut p = Self {
            attributes: el.attributes,
            properties: XmlElement::new("w:pPr"),
            content: Vec::new(),
        };
        for node in el.children {
            match node {
                XmlNode::Element(child) => match child.name.as_str() {
                    "w:pPr" => p.properties = child,
                    "w:r" => p.content.push(Inline::Run(Run::from_element(child))),
                    "m:oMath" | "m:oMathPara" => p.content.push(Inline::Math(MathNode::new(child))),
                    _ => p.content.push(Inline::Other(child)),
                },
                other if other.is_whitespace() => {}
                XmlNode::Text(_) | XmlNode::CData(_) => {}
                XmlNode::Comment(_) | XmlNode::ProcessingInstruction(_) => {}
            }
        }
        p
    }

    /// Convert back to a `w:p` element.
    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:p");
        el.attributes = self.attributes.clone();
        if !self.properties.children.is_empty() || !self.properties.attributes.is_empty() {
            el.push(self.properties.clone());
        }
        for inline in &self.content {
            el.push(match inline {
                Inline::Run(run) => run.to_element(),
                Inline::Math(math) => math.element.clone(),
                Inline::Other(other) => other.clone(),
            });
        }
        el
    }

    /// Add a run.
    pub fn add_run(&mut self, run: Run) {
        self.content.push(Inline::Run(run));
    }

    /// Add a math node.
    pub fn add_math(&mut self, math: MathNode) {
        self.content.push(Inline::Math(math));
    }

    /// Iterate over runs.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|c| match c {
            Inline::Run(r) => Some(r),
            _ => None,
        })
    }

    /// Iterate mutably over runs.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().filter_map(|c| match c {
            Inline::Run(r) => Some(r),
            _ => None,
        })
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Iterate over math nodes.
    pub fn math_nodes(&self) -> impl Iterator<Item = &MathNode> {
        self.content.iter().filter_map(|c| match c {
            Inline::Math(m) => Some(m),
            _ => None,
        })
    }

    /// Iterate mutably over math nodes.
    pub fn math_nodes_mut(&mut self) -> impl Iterator<Item = &mut MathNode> {
        self.content.iter_mut().filter_map(|c| match c {
            Inline::Math(m) => Some(m),
            _ => None,
        })
    }

    /// Whether the paragraph carries at least one math node.
    pub fn has_math(&self) -> bool {
        self.math_nodes().next().is_some()
    }

    /// Text of all runs.
    pub fn text(&self) -> String {
        self.runs().map(Run::text).collect()
    }

    /// Whether the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Replace the run content with a single run holding `text`.
    ///
    /// The new run keeps the formatting of the first run that holds text.
    /// Drawings and other non-text run content stay in place, as does
    /// non-run inline content (bookmarks, math).
    pub fn set_text(&mut self, text: impl Into<String>) {
        let first = self
            .content
            .iter()
            .position(|c| matches!(c, Inline::Run(r) if r.has_text()))
            .or_else(|| self.content.iter().position(|c| matches!(c, Inline::Run(_))));
        let mut run = match first.map(|at| &self.content[at]) {
            Some(Inline::Run(r)) => r.empty_like(),
            _ => Run::default(),
        };
        run.push_text(&text.into());
        let mut run = Some(run);

        let mut content = Vec::with_capacity(self.content.len() + 1);
        for (at, item) in std::mem::take(&mut self.content).into_iter().enumerate() {
            if Some(at) == first {
                if let Some(run) = run.take() {
                    content.push(Inline::Run(run));
                }
            }
            match item {
                Inline::Run(mut r) if r.has_text() => {
                    r.content.retain(|c| c.as_text().is_none());
                    if !r.content.is_empty() {
                        content.push(Inline::Run(r));
                    }
                }
                other => content.push(other),
            }
        }
        if let Some(run) = run {
            content.push(Inline::Run(run));
        }
        self.content = content;
    }

    /// Whether any run carries a picture.
    pub fn has_image(&self) -> bool {
        self.runs().any(|r| r.images().any(Image::has_picture))
    }

    /// Iterate mutably over every image in the paragraph.
    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut Image> {
        self.runs_mut().flat_map(|r| r.images_mut())
    }

    /// Structural math classification.
    ///
    /// A paragraph whose only visible text (ignoring an equation number such
    /// as `(3)`) belongs to math nodes is a display formula; math embedded
    /// next to other text is inline.
    pub fn math_kind(&self) -> Option<MathKind> {
        if !self.has_math() {
            return None;
        }
        let visible = self
            .runs()
            .map(Run::text)
            .filter(|t| !is_equation_number(t))
            .any(|t| !t.trim().is_empty());
        Some(if visible {
            MathKind::Inline
        } else {
            MathKind::Display
        })
    }

    // ==================== Paragraph properties ====================

    /// Style id (`w:pStyle`).
    pub fn style(&self) -> Option<&str> {
        self.properties.child("w:pStyle").and_then(|s| s.attr("w:val"))
    }

    /// Set the style id.
    pub fn set_style(&mut self, style_id: &str) -> bool {
        self.properties
            .ensure_child("w:pStyle", PPR_ORDER)
            .set_attr("w:val", style_id)
    }

    /// Paragraph alignment (`w:jc`).
    pub fn alignment(&self) -> Option<Alignment> {
        self.properties
            .child("w:jc")
            .and_then(|jc| jc.attr("w:val"))
            .and_then(Alignment::from_ooxml)
    }

    /// Set the paragraph alignment.
    pub fn set_alignment(&mut self, alignment: Alignment) -> bool {
        self.properties
            .ensure_child("w:jc", PPR_ORDER)
            .set_attr("w:val", alignment.as_ooxml())
    }

    /// Line spacing as a multiple of single spacing.
    pub fn line_spacing(&self) -> Option<f64> {
        let spacing = self.properties.child("w:spacing")?;
        match spacing.attr("w:lineRule") {
            None | Some("auto") => {}
            Some(_) => return None,
        }
        spacing
            .attr("w:line")
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v / LINE_UNITS)
    }

    /// Set line spacing as a multiple of single spacing.
    pub fn set_line_spacing(&mut self, multiple: f64) -> bool {
        let spacing = self.properties.ensure_child("w:spacing", PPR_ORDER);
        let line = ((multiple * LINE_UNITS).round() as i64).to_string();
        let a = spacing.set_attr("w:line", line);
        let b = spacing.set_attr("w:lineRule", "auto");
        a || b
    }

    /// Space before the paragraph in points.
    pub fn space_before(&self) -> Option<f64> {
        self.spacing_attr("w:before")
    }

    /// Set the space before the paragraph in points.
    pub fn set_space_before(&mut self, pt: f64) -> bool {
        self.properties
            .ensure_child("w:spacing", PPR_ORDER)
            .set_attr("w:before", pt_to_twips(pt).to_string())
    }

    /// Space after the paragraph in points.
    pub fn space_after(&self) -> Option<f64> {
        self.spacing_attr("w:after")
    }

    /// Set the space after the paragraph in points.
    pub fn set_space_after(&mut self, pt: f64) -> bool {
        self.properties
            .ensure_child("w:spacing", PPR_ORDER)
            .set_attr("w:after", pt_to_twips(pt).to_string())
    }

    fn spacing_attr(&self, key: &str) -> Option<f64> {
        self.properties
            .child("w:spacing")
            .and_then(|s| s.attr(key))
            .and_then(|v| v.parse::<i64>().ok())
            .map(twips_to_pt)
    }

    /// First-line indent in points.
    pub fn first_line_indent(&self) -> Option<f64> {
        self.properties
            .child("w:ind")
            .and_then(|i| i.attr("w:firstLine"))
            .and_then(|v| v.parse::<i64>().ok())
            .map(twips_to_pt)
    }

    /// Set the first-line indent in points (clears any hanging indent).
    pub fn set_first_line_indent(&mut self, pt: f64) -> bool {
        let ind = self.properties.ensure_child("w:ind", PPR_ORDER);
        let hanging = ind.remove_attr("w:hanging");
        ind.set_attr("w:firstLine", pt_to_twips(pt).to_string()) || hanging
    }

    /// Left indent in points.
    pub fn left_indent(&self) -> Option<f64> {
        self.properties
            .child("w:ind")
            .and_then(|i| i.attr("w:left").or_else(|| i.attr("w:start")))
            .and_then(|v| v.parse::<i64>().ok())
            .map(twips_to_pt)
    }

    /// Set the left indent in points.
    pub fn set_left_indent(&mut self, pt: f64) -> bool {
        self.properties
            .ensure_child("w:ind", PPR_ORDER)
            .set_attr("w:left", pt_to_twips(pt).to_string())
    }

    /// Paragraph shading fill colour (hex, no `#`).
    pub fn shading(&self) -> Option<&str> {
        self.properties.child("w:shd").and_then(|s| s.attr("w:fill"))
    }

    /// Set the paragraph shading fill colour.
    pub fn set_shading(&mut self, fill: &str) -> bool {
        let shd = self.properties.ensure_child("w:shd", PPR_ORDER);
        let a = shd.set_attr("w:val", "clear");
        let b = shd.set_attr("w:color", "auto");
        let c = shd.set_attr("w:fill", fill);
        a || b || c
    }

    /// Numbering reference `(num_id, level)`.
    pub fn numbering(&self) -> Option<(u32, u32)> {
        let num_pr = self.properties.child("w:numPr")?;
        let num_id = num_pr.child("w:numId")?.attr("w:val")?.parse().ok()?;
        let level = num_pr
            .child("w:ilvl")
            .and_then(|l| l.attr("w:val"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Some((num_id, level))
    }

    /// Attach the paragraph to a numbering definition.
    pub fn set_numbering(&mut self, num_id: u32, level: u32) -> bool {
        let num_pr = self.properties.ensure_child("w:numPr", PPR_ORDER);
        let order = ["w:ilvl", "w:numId"];
        let a = num_pr
            .ensure_child("w:ilvl", &order)
            .set_attr("w:val", level.to_string());
        let b = num_pr
            .ensure_child("w:numId", &order)
            .set_attr("w:val", num_id.to_string());
        a || b
    }
}

/// Whether `text` is an equation number such as `(12)`.
pub fn is_equation_number(text: &str) -> bool {
    let t = text.trim();
    t.len() > 2
        && t.starts_with('(')
        && t.ends_with(')')
        && t[1..t.len() - 1].chars().all(|c| c.is_ascii_digit())
}

/// A run of uniformly styled content (`w:r`).
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Attributes on `w:r`
    pub attributes: Vec<(String, String)>,

    /// Run properties (`w:rPr`); omitted on write when empty
    pub properties: XmlElement,

    /// Run content in order
    pub content: Vec<RunContent>,
}

/// Content of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    /// Text (`w:t`)
    Text(String),
    /// Tab (`w:tab`)
    Tab,
    /// Line break (`w:br` without a type)
    Break,
    /// Drawing (`w:drawing`)
    Drawing(Image),
    /// Anything else, preserved verbatim
    Other(XmlElement),
}

impl RunContent {
    /// Text contributed to [`Run::text`]; `None` for drawings and other elements.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RunContent::Text(t) => Some(t.as_str()),
            RunContent::Tab => Some("\t"),
            RunContent::Break => Some("\n"),
            RunContent::Drawing(_) | RunContent::Other(_) => None,
        }
    }
}

impl Default for Run {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            properties: XmlElement::new("w:rPr"),
            content: Vec::new(),
        }
    }
}

impl Run {
    /// Create a run holding plain text.
    ///
    /// Newlines become line breaks, tabs become tab elements.
    pub fn new(text: impl Into<String>) -> Self {
        let mut run = Self::default();
        run.push_text(&text.into());
        run
    }

    /// Create a run holding a drawing.
    pub fn with_image(image: Image) -> Self {
        let mut run = Self::default();
        run.content.push(RunContent::Drawing(image));
        run
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        let mut run = Self::new(text);
        run.set_bold(true);
        run
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        let mut run = Self::new(text);
        run.set_italic(true);
        run
    }

    /// Append text, splitting on newlines and tabs.
    pub fn push_text(&mut self, text: &str) {
        let mut current = String::new();
        for ch in text.chars() {
            match ch {
                '\n' => {
                    if !current.is_empty() {
                        self.content.push(RunContent::Text(std::mem::take(&mut current)));
                    }
                    self.content.push(RunContent::Break);
                }
                '\t' => {
                    if !current.is_empty() {
                        self.content.push(RunContent::Text(std::mem::take(&mut current)));
                    }
                    self.content.push(RunContent::Tab);
                }
                '\r' => {}
                _ => current.push(ch),
            }
        }
        if !current.is_empty() {
            self.content.push(RunContent::Text(current));
        }
    }

    /// Build from a `w:r` element.
    pub fn from_element(el: XmlElement) -> Self {
        let mut run = Self {
            attributes: el.attributes,
            ..Default::default()
        };
        for node in el.children {
            let XmlNode::Element(child) = node else {
                continue;
            };
            match child.name.as_str() {
                "w:rPr" => run.properties = child,
                "w:t" => run.content.push(RunContent::Text(child.text_content())),
                "w:tab" => run.content.push(RunContent::Tab),
                "w:br" if child.attributes.is_empty() => run.content.push(RunContent::Break),
                "w:drawing" => run.content.push(RunContent::Drawing(Image::new(child))),
                _ => run.content.push(RunContent::Other(child)),
            }
        }
        run
    }

    /// Convert back to a `w:r` element.
    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:r");
        el.attributes = self.attributes.clone();
        if !self.properties.children.is_empty() {
            el.push(self.properties.clone());
        }
        for item in &self.content {
            el.push(match item {
                RunContent::Text(text) => {
                    let mut t = XmlElement::new("w:t");
                    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
                    {
                        t = t.with_attr("xml:space", "preserve");
                    }
                    t.with_text(text.clone())
                }
                RunContent::Tab => XmlElement::new("w:tab"),
                RunContent::Break => XmlElement::new("w:br"),
                RunContent::Drawing(image) => image.element.clone(),
                RunContent::Other(other) => other.clone(),
            });
        }
        el
    }

    /// A run with the same attributes and formatting but no content.
    pub fn empty_like(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            properties: self.properties.clone(),
            content: Vec::new(),
        }
    }

    /// Whether any content is text, a tab or a break.
    pub fn has_text(&self) -> bool {
        self.content.iter().any(|c| c.as_text().is_some())
    }

    /// Text of the run (tabs and breaks rendered as `\t` / `\n`).
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(RunContent::as_text)
            .collect()
    }

    /// Iterate over drawings.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.content.iter().filter_map(|c| match c {
            RunContent::Drawing(img) => Some(img),
            _ => None,
        })
    }

    /// Iterate mutably over drawings.
    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut Image> {
        self.content.iter_mut().filter_map(|c| match c {
            RunContent::Drawing(img) => Some(img),
            _ => None,
        })
    }

    // ==================== Run properties ====================

    /// Western font family (`w:rFonts/@w:ascii`).
    pub fn font_family(&self) -> Option<&str> {
        self.properties.child("w:rFonts").and_then(|f| f.attr("w:ascii"))
    }

    /// Set the Western font family (ASCII and high-ANSI slots).
    pub fn set_font_family(&mut self, name: &str) -> bool {
        let fonts = self.properties.ensure_child("w:rFonts", RPR_ORDER);
        let a = fonts.set_attr("w:ascii", name);
        let b = fonts.set_attr("w:hAnsi", name);
        a || b
    }

    /// East-Asian font override (`w:rFonts/@w:eastAsia`).
    pub fn east_asia_font(&self) -> Option<&str> {
        self.properties.child("w:rFonts").and_then(|f| f.attr("w:eastAsia"))
    }

    /// Set the East-Asian font override.
    pub fn set_east_asia_font(&mut self, name: &str) -> bool {
        self.properties
            .ensure_child("w:rFonts", RPR_ORDER)
            .set_attr("w:eastAsia", name)
    }

    /// Font size in points.
    pub fn size(&self) -> Option<f64> {
        self.properties
            .child("w:sz")
            .and_then(|s| s.attr("w:val"))
            .and_then(|v| v.parse::<i64>().ok())
            .map(half_points_to_pt)
    }

    /// Set the font size in points.
    pub fn set_size(&mut self, pt: f64) -> bool {
        self.properties
            .ensure_child("w:sz", RPR_ORDER)
            .set_attr("w:val", pt_to_half_points(pt).to_string())
    }

    /// Bold flag, `None` when inherited.
    pub fn is_bold(&self) -> Option<bool> {
        self.toggle("w:b")
    }

    /// Set the bold flag.
    pub fn set_bold(&mut self, on: bool) -> bool {
        self.set_toggle("w:b", on)
    }

    /// Italic flag, `None` when inherited.
    pub fn is_italic(&self) -> Option<bool> {
        self.toggle("w:i")
    }

    /// Set the italic flag.
    pub fn set_italic(&mut self, on: bool) -> bool {
        self.set_toggle("w:i", on)
    }

    /// Strike-through flag, `None` when inherited.
    pub fn is_strike(&self) -> Option<bool> {
        self.toggle("w:strike")
    }

    /// Set the strike-through flag.
    pub fn set_strike(&mut self, on: bool) -> bool {
        self.set_toggle("w:strike", on)
    }

    /// Underline flag (any underline style other than `none`).
    pub fn is_underline(&self) -> Option<bool> {
        self.properties
            .child("w:u")
            .map(|u| u.attr("w:val").map(|v| v != "none").unwrap_or(true))
    }

    /// Set a single underline, or remove it.
    pub fn set_underline(&mut self, on: bool) -> bool {
        self.properties
            .ensure_child("w:u", RPR_ORDER)
            .set_attr("w:val", if on { "single" } else { "none" })
    }

    /// Text colour (hex, no `#`).
    pub fn color(&self) -> Option<&str> {
        self.properties.child("w:color").and_then(|c| c.attr("w:val"))
    }

    /// Set the text colour.
    pub fn set_color(&mut self, hex: &str) -> bool {
        let el = self.properties.ensure_child("w:color", RPR_ORDER);
        let a = el.remove_attr("w:themeColor");
        el.set_attr("w:val", hex.to_ascii_uppercase()) || a
    }

    /// Highlight colour name.
    pub fn highlight(&self) -> Option<&str> {
        self.properties.child("w:highlight").and_then(|c| c.attr("w:val"))
    }

    /// Set the highlight colour name (e.g. `yellow`).
    pub fn set_highlight(&mut self, name: &str) -> bool {
        self.properties
            .ensure_child("w:highlight", RPR_ORDER)
            .set_attr("w:val", name)
    }

    /// Character style id.
    pub fn style(&self) -> Option<&str> {
        self.properties.child("w:rStyle").and_then(|s| s.attr("w:val"))
    }

    fn toggle(&self, name: &str) -> Option<bool> {
        self.properties
            .child(name)
            .map(|el| !matches!(el.attr("w:val"), Some("0") | Some("false") | Some("off")))
    }

    fn set_toggle(&mut self, name: &str, on: bool) -> bool {
        if self.toggle(name) == Some(on) {
            return false;
        }
        let el = self.properties.ensure_child(name, RPR_ORDER);
        if on {
            el.remove_attr("w:val");
        } else {
            el.set_attr("w:val", "0");
        }
        true
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
    /// Distributed alignment
    Distribute,
}

impl Alignment {
    /// Parse a `w:jc/@w:val` value.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            _ => None,
        }
    }

    /// The `w:jc/@w:val` value.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
            Alignment::Distribute => "distribute",
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ooxml())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text() {
        let mut p = Paragraph::new();
        p.add_run(Run::new("Hello "));
        p.add_run(Run::bold("world"));
        p.add_run(Run::new("!"));

        assert_eq!(p.text(), "Hello world!");
        assert_eq!(p.run_count(), 3);
    }

    #[test]
    fn test_run_toggle_idempotent() {
        let mut run = Run::new("x");
        assert_eq!(run.is_bold(), None);
        assert!(run.set_bold(true));
        assert!(!run.set_bold(true));
        assert_eq!(run.is_bold(), Some(true));
        assert!(run.set_bold(false));
        assert_eq!(run.is_bold(), Some(false));
    }

    #[test]
    fn test_run_properties_schema_order() {
        let mut run = Run::new("x");
        run.set_size(12.0);
        run.set_color("ff0000");
        run.set_font_family("Arial");
        run.set_bold(true);
        let names: Vec<_> = run.properties.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:rFonts", "w:b", "w:color", "w:sz"]);
        assert_eq!(run.color(), Some("FF0000"));
        assert_eq!(run.size(), Some(12.0));
    }

    #[test]
    fn test_paragraph_spacing_roundtrip() {
        let mut p = Paragraph::with_text("body");
        assert!(p.set_line_spacing(1.5));
        assert!(!p.set_line_spacing(1.5));
        p.set_space_after(6.0);
        assert_eq!(p.line_spacing(), Some(1.5));
        assert_eq!(p.space_after(), Some(6.0));

        let el = p.to_element();
        let back = Paragraph::from_element(el);
        assert_eq!(back, p);
    }

    #[test]
    fn test_run_element_roundtrip_with_breaks() {
        let run = Run::new(" line one\nline\ttwo");
        let el = run.to_element();
        let back = Run::from_element(el);
        assert_eq!(back.text(), " line one\nline\ttwo");
    }

    #[test]
    fn test_set_text_keeps_first_run_format() {
        let mut p = Paragraph::new();
        p.add_run(Run::bold("1. "));
        p.add_run(Run::new("item"));
        p.set_text("item");
        assert_eq!(p.run_count(), 1);
        assert_eq!(p.text(), "item");
        assert_eq!(p.runs().next().unwrap().is_bold(), Some(true));
    }

    #[test]
    fn test_set_text_keeps_drawings() {
        let mut p = Paragraph::new();
        p.add_run(Run::new("1. see "));
        p.add_run(Run::with_image(Image::inline("rId5", 1, "Picture 1", 914400, 914400)));
        p.add_run(Run::new(" below"));
        p.set_text("see below");

        assert_eq!(p.text(), "see below");
        assert_eq!(p.run_count(), 2);
        assert!(matches!(p.content[0], Inline::Run(ref r) if r.text() == "see below"));
        assert_eq!(p.images_mut().count(), 1);
    }

    #[test]
    fn test_equation_number() {
        assert!(is_equation_number(" (12)"));
        assert!(!is_equation_number("()"));
        assert!(!is_equation_number("(a)"));
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::from_ooxml("both"), Some(Alignment::Justify));
        assert_eq!(Alignment::Center.as_ooxml(), "center");
        assert_eq!(Alignment::from_ooxml("bogus"), None);
    }
}
