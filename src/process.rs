//! End-to-end processing: import, run rules, serialize.
//!
//! A [`Processor`] owns the rule and importer registries and turns one
//! input (Markdown, plain text or an existing package) into a formatted
//! package plus a [`ProcessResult`] describing every change.

use crate::detect::detect_format;
use crate::engine::{ConfigSource, ExecutorOptions, Executor, Fix, RuleRegistry};
use crate::error::{Error, Result};
use crate::import::{ImportOptions, ImportStats, ImporterRegistry};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for one processing request.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Import options for Markdown and text sources
    pub import: ImportOptions,

    /// Executor options (panic isolation, failure records)
    pub executor: ExecutorOptions,
}

impl ProcessOptions {
    /// Create new process options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set import options.
    pub fn with_import(mut self, import: ImportOptions) -> Self {
        self.import = import;
        self
    }

    /// Set executor options.
    pub fn with_executor(mut self, executor: ExecutorOptions) -> Self {
        self.executor = executor;
        self
    }
}

/// Overall outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Every enabled rule ran to completion
    Completed,
    /// Some rules or elements failed; the document was still produced
    CompletedWithErrors,
}

/// Structured result returned next to the output package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// `<unix-seconds>_<file name>`
    pub document_id: String,
    /// Overall status
    pub status: ProcessStatus,
    /// Number of fix records
    pub total_fixes: usize,
    /// Fix records in rule order
    pub fixes: Vec<Fix>,
    /// Wall-clock time for the whole request
    pub duration_ms: u64,
    /// Source statistics for Markdown and text inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_stats: Option<ImportStats>,
}

impl ProcessResult {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Output package bytes plus the result record.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Serialized document package
    pub bytes: Vec<u8>,
    /// Result record
    pub result: ProcessResult,
}

/// One file of a batch.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Source file
    pub input: PathBuf,
    /// Where to write the formatted package
    pub output: PathBuf,
}

impl BatchJob {
    /// Create a job.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Runs the full pipeline for one or many inputs.
#[derive(Clone)]
pub struct Processor {
    registry: RuleRegistry,
    importers: std::sync::Arc<ImporterRegistry>,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("rules", &self.registry.len())
            .field("extensions", &self.importers.supported_extensions())
            .finish()
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor {
    /// Processor over the global built-in rule registry.
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::global().clone())
    }

    /// Processor over a custom rule registry.
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            importers: std::sync::Arc::new(ImporterRegistry::with_defaults()),
        }
    }

    /// The rule registry.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Process an in-memory input.
    ///
    /// Import and package errors abort the request; rule failures are
    /// isolated and reflected in the status.
    pub fn process_bytes(
        &self,
        input: &[u8],
        file_name: &str,
        source: &ConfigSource,
        options: &ProcessOptions,
    ) -> Result<ProcessOutput> {
        let start = Instant::now();
        let format = detect_format(file_name, input)?;
        log::info!("Processing {} as {}", file_name, format);

        let imported = self
            .importers
            .import_bytes(input, format.extension(), &options.import)?;
        let mut document = imported.document;

        let config = source.resolve();
        let report = Executor::new(&self.registry)
            .with_options(options.executor.clone())
            .run(&mut document, &config);

        let bytes = document.save()?;
        let status = if report.failures.is_empty() && report.fixes.iter().all(Fix::is_applied) {
            ProcessStatus::Completed
        } else {
            ProcessStatus::CompletedWithErrors
        };
        let result = ProcessResult {
            document_id: document_id(file_name),
            status,
            total_fixes: report.total_fixes(),
            fixes: report.fixes,
            duration_ms: start.elapsed().as_millis() as u64,
            import_stats: imported.stats,
        };
        Ok(ProcessOutput { bytes, result })
    }

    /// Process a file and write the formatted package.
    ///
    /// Without `out_path` the output goes next to the input as
    /// `<stem>_formatted.docx`.
    pub fn process_file(
        &self,
        path: impl AsRef<Path>,
        out_path: Option<&Path>,
        source: &ConfigSource,
    ) -> Result<ProcessResult> {
        let path = path.as_ref();
        let input = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Other(format!("invalid file name: {}", path.display())))?;
        let output = self.process_bytes(&input, name, source, &ProcessOptions::default())?;

        let target = match out_path {
            Some(p) => p.to_path_buf(),
            None => default_output_path(path),
        };
        std::fs::write(&target, &output.bytes)?;
        log::info!("Wrote {}", target.display());
        Ok(output.result)
    }

    /// Process independent files in parallel.
    ///
    /// Each job owns its document; results come back in job order.
    pub fn process_batch(
        &self,
        jobs: &[BatchJob],
        source: &ConfigSource,
    ) -> Vec<(PathBuf, Result<ProcessResult>)> {
        self.process_batch_with(jobs, source, |_, _| {})
    }

    /// Like [`process_batch`](Self::process_batch), calling `on_done` as
    /// each job finishes (from worker threads, in completion order).
    pub fn process_batch_with<F>(
        &self,
        jobs: &[BatchJob],
        source: &ConfigSource,
        on_done: F,
    ) -> Vec<(PathBuf, Result<ProcessResult>)>
    where
        F: Fn(&Path, &Result<ProcessResult>) + Sync,
    {
        jobs.par_iter()
            .map(|job| {
                let result = self.process_file(&job.input, Some(&job.output), source);
                if let Err(e) = &result {
                    log::error!("{}: {}", job.input.display(), e);
                }
                on_done(&job.input, &result);
                (job.input.clone(), result)
            })
            .collect()
    }
}

fn document_id(file_name: &str) -> String {
    format!("{}_{}", chrono::Utc::now().timestamp(), file_name)
}

/// `<dir>/<stem>_formatted.docx` for an input path.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    input.with_file_name(format!("{}_formatted.docx", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleConfig;
    use crate::model::Document;

    #[test]
    fn test_process_markdown() {
        let processor = Processor::new();
        let source = ConfigSource::from(RuleConfig::enabling(["title_bold"]));
        let output = processor
            .process_bytes(b"# Title\n\nBody text.", "note.md", &source, &ProcessOptions::new())
            .unwrap();

        let result = &output.result;
        assert_eq!(result.status, ProcessStatus::Completed);
        assert_eq!(result.total_fixes, 1);
        assert_eq!(result.fixes[0].paragraph_indices, vec![0]);
        assert!(result.document_id.ends_with("_note.md"));
        assert!(matches!(
            result.import_stats,
            Some(ImportStats::Markdown { headings: 1, paragraphs: 1, .. })
        ));

        let doc = Document::load(&output.bytes).unwrap();
        assert_eq!(doc.paragraph(0).unwrap().runs().next().unwrap().is_bold(), Some(true));
    }

    #[test]
    fn test_empty_config_runs_nothing() {
        let output = Processor::new()
            .process_bytes(b"plain", "a.txt", &ConfigSource::new(), &ProcessOptions::new())
            .unwrap();
        assert_eq!(output.result.total_fixes, 0);
        let json = output.result.to_json().unwrap();
        assert!(json.contains("\"status\": \"completed\""));
    }

    #[test]
    fn test_invalid_package_is_fatal() {
        let err = Processor::new()
            .process_bytes(b"PK\x03\x04broken", "x.docx", &ConfigSource::new(), &ProcessOptions::new())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/report.md")),
            PathBuf::from("/tmp/report_formatted.docx")
        );
    }
}
