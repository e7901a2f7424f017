//! Mermaid diagrams rendered to pictures through the mermaid CLI.
//!
//! Fenced ```` ```mermaid ```` blocks kept by the Markdown importer are
//! piped to an external renderer (`mmdc` by default) and replaced by an
//! inline picture. A missing or failing renderer leaves the source text in
//! place and records a failed fix.

use super::defaults;
use crate::engine::{Category, Fix, Params, Rule};
use crate::error::{Error, Result};
use crate::model::units::inches_to_emu;
use crate::model::{Alignment, Document, Image, Run};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```mermaid|~~~mermaid").unwrap());
static SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```mermaid\s*(.*?)\s*```|~~~mermaid\s*(.*?)\s*~~~").unwrap()
});

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PREVIEW_CHARS: usize = 100;

/// Extract the diagram source from a fenced mermaid block.
pub fn extract_source(text: &str) -> Option<String> {
    let caps = SOURCE.captures(text)?;
    let body = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Pixel size from a PNG header.
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
    if data.len() < 24 || !data.starts_with(SIGNATURE) || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    (width > 0 && height > 0).then_some((width, height))
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Invocation settings for the mermaid command-line renderer.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    /// Executable name or path
    pub program: String,
    /// Theme passed with `-t`
    pub theme: String,
    /// Background colour passed with `-b`
    pub background: String,
    /// Scale factor passed with `-s`
    pub scale: f64,
    /// Time allowed for one render
    pub timeout: Duration,
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self {
            program: "mmdc".to_string(),
            theme: "default".to_string(),
            background: "white".to_string(),
            scale: 2.0,
            timeout: Duration::from_secs(30),
        }
    }
}

impl MermaidCli {
    /// Settings from rule parameters.
    pub fn from_params(params: &Params) -> Self {
        let format = params.str("output_format", "png");
        if !format.eq_ignore_ascii_case("png") {
            log::warn!("Mermaid output format '{}' cannot be embedded, rendering png", format);
        }
        Self {
            program: params.str("renderer", "mmdc"),
            theme: params.str("theme", "default"),
            background: params.str("background_color", "white"),
            scale: params.f64("scale", 2.0),
            timeout: Duration::from_secs(params.i64("timeout_secs", 30).max(1) as u64),
        }
    }

    /// Render `source` and return the PNG bytes.
    pub fn render(&self, source: &str) -> Result<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("diagram.mmd");
        let output = dir.path().join("diagram.png");
        std::fs::write(&input, source)?;
        self.run(&input, &output)?;

        match std::fs::read(&output) {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(Error::external_tool(&self.program, "renderer produced no output")),
        }
    }

    fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .args(["-t", self.theme.as_str(), "-b", self.background.as_str()])
            .arg("-s")
            .arg(self.scale.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::external_tool(&self.program, "renderer not found on PATH")
                }
                _ => Error::external_tool(&self.program, e.to_string()),
            })?;

        // Drain stderr on the side so a chatty renderer cannot fill the pipe.
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::external_tool(
                    &self.program,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if status.success() {
            return Ok(());
        }
        let message = stderr
            .and_then(|handle| handle.join().ok())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("exited with {}", status));
        Err(Error::external_tool(&self.program, message))
    }
}

/// Replaces mermaid code blocks with rendered pictures.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidRenderRule;

impl Rule for MermaidRenderRule {
    fn id(&self) -> &str {
        "mermaid_render"
    }

    fn name(&self) -> &str {
        "Render Mermaid diagrams"
    }

    fn category(&self) -> Category {
        Category::Image
    }

    fn description(&self) -> &str {
        "Render Mermaid code blocks to images with the mermaid CLI."
    }

    fn priority(&self) -> i32 {
        135
    }

    fn default_params(&self) -> Map<String, Value> {
        defaults(json!({
            "renderer": "mmdc",
            "output_format": "png",
            "scale": 2,
            "theme": "default",
            "background_color": "white",
            "timeout_secs": 30,
            "width_in": 6.0
        }))
    }

    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>> {
        let cli = MermaidCli::from_params(params);
        let width_in = params.f64("width_in", 6.0);
        let candidates: Vec<(usize, String, String)> = doc
            .paragraphs()
            .enumerate()
            .filter_map(|(i, p)| {
                let text = p.text();
                if !FENCE.is_match(&text) {
                    return None;
                }
                let source = extract_source(&text)?;
                Some((i, text, source))
            })
            .collect();
        let mut fixes = Vec::new();

        for (i, text, source) in candidates {
            let png = match cli.render(&source) {
                Ok(png) => png,
                Err(e) => {
                    log::warn!("Mermaid render failed for paragraph {}: {}", i, e);
                    fixes.push(
                        Fix::new(
                            format!("fix_mermaid_render_error_{}", i),
                            self.id(),
                            format!("Mermaid rendering failed in paragraph {}: {}", i + 1, e),
                        )
                        .with_paragraph(i)
                        .with_before(preview(&text))
                        .with_location(json!({
                            "paragraph_index": i,
                            "type": "mermaid_error",
                            "error": e.to_string(),
                        }))
                        .failed(),
                    );
                    continue;
                }
            };

            // Unknown pixel size falls back to a 4:3 frame.
            let ratio = png_dimensions(&png)
                .map(|(w, h)| h as f64 / w as f64)
                .unwrap_or(0.75);
            let rel_id = doc.add_image(png, "png")?;
            let drawing_id = doc.next_drawing_id();
            let image = Image::inline(
                &rel_id,
                drawing_id,
                &format!("Diagram {}", drawing_id),
                inches_to_emu(width_in),
                inches_to_emu(width_in * ratio),
            );
            let Some(p) = doc.paragraph_mut(i) else {
                continue;
            };
            p.content.clear();
            p.properties.remove_children("w:pStyle");
            p.properties.remove_children("w:shd");
            p.add_run(Run::with_image(image));
            p.set_alignment(Alignment::Center);

            fixes.push(
                Fix::new(
                    format!("fix_mermaid_render_{}", i),
                    self.id(),
                    format!("Rendered the Mermaid diagram in paragraph {}", i + 1),
                )
                .with_paragraph(i)
                .with_before(preview(&text))
                .with_after("[Mermaid diagram]")
                .with_location(json!({ "paragraph_index": i, "type": "mermaid_diagram" })),
            );
        }
        Ok(fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    #[test]
    fn test_extract_source() {
        assert_eq!(
            extract_source("```mermaid\ngraph TD; A-->B\n```").as_deref(),
            Some("graph TD; A-->B")
        );
        assert_eq!(
            extract_source("~~~Mermaid\nsequenceDiagram\n~~~").as_deref(),
            Some("sequenceDiagram")
        );
        assert_eq!(extract_source("```mermaid\n\n```"), None);
        assert_eq!(extract_source("plain text"), None);
    }

    #[test]
    fn test_png_dimensions() {
        let mut header = b"\x89PNG\r\n\x1a\n\0\0\0\x0dIHDR".to_vec();
        header.extend_from_slice(&800u32.to_be_bytes());
        header.extend_from_slice(&600u32.to_be_bytes());
        assert_eq!(png_dimensions(&header), Some((800, 600)));
        assert_eq!(png_dimensions(b"GIF89a"), None);
    }

    #[test]
    fn test_missing_renderer_records_failure() {
        let source = "```mermaid\ngraph TD; A-->B\n```";
        let mut doc = Document::blank().unwrap();
        doc.add_paragraph(Paragraph::with_text(source));

        let rule = MermaidRenderRule;
        let params = Params::merged(
            &rule.default_params(),
            &defaults(json!({ "renderer": "docfmt-no-such-renderer" })),
        );
        let fixes = rule.apply(&mut doc, &params).unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].id, "fix_mermaid_render_error_0");
        assert!(!fixes[0].is_applied());
        assert_eq!(fixes[0].location.as_ref().unwrap()["type"], "mermaid_error");
        assert_eq!(doc.paragraph(0).unwrap().text(), source);
    }

    #[cfg(unix)]
    #[test]
    fn test_renderer_without_output() {
        let cli = MermaidCli {
            program: "true".to_string(),
            ..MermaidCli::default()
        };
        let err = cli.render("graph TD; A-->B").unwrap_err();
        assert!(err.to_string().contains("no output"));
    }
}
