//! Rule engine: the rule contract, registry, configuration and executor.
//!
//! # Example
//!
//! ```no_run
//! use docfmt::engine::{Executor, RuleConfig, RuleRegistry};
//! use docfmt::model::Document;
//!
//! fn main() -> docfmt::Result<()> {
//!     let mut doc = Document::load_file("report.docx")?;
//!     let config = RuleConfig::enabling(["font_standard", "title_bold"]);
//!     let report = Executor::new(RuleRegistry::global()).run(&mut doc, &config);
//!     println!("{} fixes", report.total_fixes());
//!     Ok(())
//! }
//! ```

mod executor;
mod fix;
mod params;
mod preset;
mod registry;
mod rule;

pub use executor::{ExecutionReport, Executor, ExecutorOptions, RuleFailure};
pub use fix::{Fix, FixStatus};
pub use params::Params;
pub use preset::{ConfigSource, Preset, RuleConfig, RuleSetting};
pub use registry::RuleRegistry;
pub use rule::{Category, Rule, RuleMetadata};
