//! # docfmt
//!
//! Rule-driven formatting engine for Word documents.
//!
//! A source document (Markdown, plain text or an existing `.docx`) is
//! imported into an in-memory document model, rewritten in place by an
//! ordered set of formatting rules, and serialized back into a package.
//! Every rule reports what it changed as a [`Fix`] record.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfmt::{ConfigSource, Preset, ProcessOptions, Processor, RuleRegistry};
//!
//! fn main() -> docfmt::Result<()> {
//!     let processor = Processor::new();
//!     let preset = Preset::from_registry(RuleRegistry::global());
//!     let output = processor.process_bytes(
//!         b"# Report\n\nThe result is $E=mc^2$.",
//!         "report.md",
//!         &ConfigSource::from(preset),
//!         &ProcessOptions::default(),
//!     )?;
//!     std::fs::write("report.docx", &output.bytes)?;
//!     println!("{} fixes", output.result.total_fixes);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lossless model**: unknown XML is carried through load and save untouched
//! - **Deterministic rules**: fixed `(priority, id)` order, idempotent re-runs
//! - **Fault isolation**: a failing rule is logged and skipped
//! - **Native math**: LaTeX spans become Word equations (LaTeX, MathML, OMML)
//! - **Parallel batches**: independent files processed with Rayon

pub mod detect;
pub mod engine;
pub mod error;
pub mod import;
pub mod math;
pub mod model;
pub mod package;
pub mod process;
pub mod rules;

// Re-export commonly used types
pub use detect::{detect_format, detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use engine::{
    Category, ConfigSource, ExecutionReport, Executor, ExecutorOptions, Fix, FixStatus, Params,
    Preset, Rule, RuleConfig, RuleMetadata, RuleRegistry, RuleSetting,
};
pub use error::{Error, Result};
pub use import::{DocumentImporter, ImportOptions, ImportResult, ImportStats, ImporterRegistry};
pub use math::{MathConverter, MathSpan};
pub use model::{Alignment, Block, Document, MathKind, Metadata, Paragraph, Run, Table};
pub use process::{BatchJob, ProcessOptions, ProcessOutput, ProcessResult, ProcessStatus, Processor};

use std::path::Path;

/// Load a `.docx` file into the document model.
///
/// # Example
///
/// ```no_run
/// let doc = docfmt::load_file("report.docx").unwrap();
/// println!("Paragraphs: {}", doc.paragraph_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    Document::load_file(path)
}

/// Import a source file (Markdown, text or `.docx`) without running rules.
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<ImportResult> {
    ImporterRegistry::with_defaults().import(path.as_ref(), &ImportOptions::default())
}

/// Format a file with every built-in rule at its default parameters.
///
/// The output is written next to the input as `<stem>_formatted.docx`.
///
/// # Example
///
/// ```no_run
/// let result = docfmt::format_file("notes.md").unwrap();
/// println!("{}", result.to_json().unwrap());
/// ```
pub fn format_file<P: AsRef<Path>>(path: P) -> Result<ProcessResult> {
    let preset = Preset::from_registry(RuleRegistry::global());
    Processor::new().process_file(path, None, &ConfigSource::from(preset))
}

/// Format a file with an explicit rule configuration.
pub fn format_file_with_config<P: AsRef<Path>>(
    path: P,
    out_path: &Path,
    config: RuleConfig,
) -> Result<ProcessResult> {
    Processor::new().process_file(path, Some(out_path), &ConfigSource::from(config))
}

/// Extract plain text from a `.docx` file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(load_file(path)?.plain_text())
}
