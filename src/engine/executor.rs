//! Pipeline executor: runs enabled rules in priority order.

use super::fix::Fix;
use super::params::Params;
use super::preset::RuleConfig;
use super::registry::RuleRegistry;
use crate::error::Error;
use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Options for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Convert a panicking rule into a logged failure instead of unwinding
    pub catch_panics: bool,

    /// Append a failed fix record for every rule that fails
    pub record_failures: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            catch_panics: true,
            record_failures: false,
        }
    }
}

impl ExecutorOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable panic isolation.
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Enable or disable failed fix records for failing rules.
    pub fn with_record_failures(mut self, record: bool) -> Self {
        self.record_failures = record;
        self
    }
}

/// A rule that failed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    /// Rule id
    pub rule_id: String,
    /// Failure description
    pub message: String,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Fix records in execution order
    pub fixes: Vec<Fix>,

    /// Rules that ran, in order
    pub rules_run: Vec<String>,

    /// Rules that failed
    pub failures: Vec<RuleFailure>,

    /// Wall-clock duration
    pub duration: Duration,
}

impl ExecutionReport {
    /// Number of fix records.
    pub fn total_fixes(&self) -> usize {
        self.fixes.len()
    }

    /// Whether every rule completed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the enabled rules of a registry against a document.
#[derive(Debug, Clone)]
pub struct Executor<'a> {
    registry: &'a RuleRegistry,
    options: ExecutorOptions,
}

impl<'a> Executor<'a> {
    /// Create an executor over a registry.
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self {
            registry,
            options: ExecutorOptions::default(),
        }
    }

    /// Builder: set options.
    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every enabled rule in `(priority, id)` order.
    ///
    /// A rule that returns an error or panics is logged and skipped; any
    /// partial mutation it made stays in the document and the remaining
    /// rules still run.
    pub fn run(&self, doc: &mut Document, config: &RuleConfig) -> ExecutionReport {
        let start = Instant::now();
        let mut report = ExecutionReport::default();

        for id in config.enabled_ids() {
            if !self.registry.contains(id) {
                log::warn!("Configuration enables unknown rule '{}'", id);
            }
        }

        for rule in self.registry.ordered() {
            let Some(setting) = config.get(rule.id()).filter(|s| s.enabled) else {
                continue;
            };
            let params = Params::merged(&rule.default_params(), &setting.parameters);

            log::debug!("Applying rule {} (priority {})", rule.id(), rule.priority());
            let outcome = if self.options.catch_panics {
                catch_unwind(AssertUnwindSafe(|| rule.apply(doc, &params)))
                    .unwrap_or_else(|payload| Err(Error::rule(rule.id(), panic_message(&payload))))
            } else {
                rule.apply(doc, &params)
            };
            report.rules_run.push(rule.id().to_string());

            match outcome {
                Ok(fixes) => {
                    log::debug!("Rule {} produced {} fixes", rule.id(), fixes.len());
                    report.fixes.extend(fixes);
                }
                Err(e) => {
                    let message = match e {
                        Error::RuleExecution { message, .. } => message,
                        other => other.to_string(),
                    };
                    log::warn!("Rule {} failed: {}", rule.id(), message);
                    if self.options.record_failures {
                        report.fixes.push(
                            Fix::new(
                                format!("err_{}", rule.id()),
                                rule.id(),
                                format!("Rule failed: {}", message),
                            )
                            .failed(),
                        );
                    }
                    report.failures.push(RuleFailure {
                        rule_id: rule.id().to_string(),
                        message,
                    });
                }
            }
        }

        report.duration = start.elapsed();
        log::info!(
            "Applied {} rules: {} fixes, {} failures in {:?}",
            report.rules_run.len(),
            report.fixes.len(),
            report.failures.len(),
            report.duration
        );
        report
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
