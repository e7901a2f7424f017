//! docfmt CLI - rule-driven document formatting tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfmt::{
    BatchJob, ConfigSource, Document, FixStatus, Preset, ProcessOptions, ProcessStatus, Processor,
    RuleConfig, RuleRegistry,
};

#[derive(Parser)]
#[command(name = "docfmt")]
#[command(version)]
#[command(about = "Format Word documents and convert Markdown with formatting rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format one document (Markdown, text or DOCX)
    Process {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <stem>_formatted.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Preset file (JSON)
        #[arg(long, value_name = "FILE", env = "DOCFMT_PRESET")]
        preset: Option<PathBuf>,

        /// Enable a rule (repeatable); with no preset only these rules run
        #[arg(long = "enable", value_name = "ID")]
        enable: Vec<String>,

        /// Disable a rule (repeatable)
        #[arg(long = "disable", value_name = "ID")]
        disable: Vec<String>,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Format many documents in parallel
    Batch {
        /// Input files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Preset file (JSON)
        #[arg(long, value_name = "FILE", env = "DOCFMT_PRESET")]
        preset: Option<PathBuf>,
    },

    /// List the available rules
    Rules {
        /// Only rules of this category
        #[arg(long)]
        category: Option<String>,

        /// Print as JSON, including parameter defaults
        #[arg(long)]
        json: bool,
    },

    /// Export the default preset (every rule enabled with its defaults)
    Preset {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            preset,
            enable,
            disable,
            json,
        } => cmd_process(
            &input,
            output.as_deref(),
            preset.as_deref(),
            &enable,
            &disable,
            json,
        ),
        Commands::Batch {
            inputs,
            output,
            preset,
        } => cmd_batch(&inputs, &output, preset.as_deref()),
        Commands::Rules { category, json } => cmd_rules(category.as_deref(), json),
        Commands::Preset { output } => cmd_preset(output.as_deref()),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Effective configuration from a preset file and enable/disable flags.
///
/// Without a preset, `--enable` selects exactly the listed rules and no
/// flags at all select every built-in rule.
fn build_config(
    preset: Option<&Path>,
    enable: &[String],
    disable: &[String],
) -> docfmt::Result<RuleConfig> {
    let mut config = match preset {
        Some(path) => Preset::from_path(path)?.rules,
        None if !enable.is_empty() => RuleConfig::new(),
        None => Preset::from_registry(RuleRegistry::global()).rules,
    };
    for id in enable {
        config.enable(id.as_str());
    }
    for id in disable {
        config.disable(id.as_str());
    }
    Ok(config)
}

fn cmd_process(
    input: &Path,
    output: Option<&Path>,
    preset: Option<&Path>,
    enable: &[String],
    disable: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(preset, enable, disable)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let data = fs::read(input)?;

    let processor = Processor::new();
    let result = processor.process_bytes(
        &data,
        &name,
        &ConfigSource::from(config),
        &ProcessOptions::default(),
    )?;

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| docfmt::process::default_output_path(input));
    fs::write(&target, &result.bytes)?;

    if json {
        println!("{}", result.result.to_json()?);
        return Ok(());
    }

    for fix in &result.result.fixes {
        let marker = match fix.status {
            FixStatus::Applied => "✓".green(),
            FixStatus::Failed => "✗".red(),
        };
        println!("  {} {} {}", marker, fix.rule_id.dimmed(), fix.description);
    }
    let summary = format!(
        "{} fixes in {} ms",
        result.result.total_fixes, result.result.duration_ms
    );
    match result.result.status {
        ProcessStatus::Completed => println!("\n{} {}", "Done!".green().bold(), summary),
        ProcessStatus::CompletedWithErrors => {
            println!("\n{} {}", "Done with errors:".yellow().bold(), summary)
        }
    }
    println!("{} {}", "Saved to".green(), target.display());
    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    preset: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;
    let config = build_config(preset, &[], &[])?;
    let jobs: Vec<BatchJob> = inputs
        .iter()
        .map(|input| {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            BatchJob::new(input, output_dir.join(format!("{}.docx", stem)))
        })
        .collect();

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let processor = Processor::new();
    let results = processor.process_batch_with(&jobs, &ConfigSource::from(config), |input, _| {
        pb.set_message(input.display().to_string());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let mut failed = 0;
    println!();
    for (input, result) in &results {
        match result {
            Ok(r) => println!(
                "  {} {} ({} fixes)",
                "✓".green(),
                input.display(),
                r.total_fixes
            ),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), input.display(), e);
            }
        }
    }
    println!(
        "\n{} {} succeeded, {} failed",
        "Batch complete:".green().bold(),
        results.len() - failed,
        failed
    );
    Ok(())
}

fn cmd_rules(category: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = RuleRegistry::global();
    let rules = match category {
        Some(c) => {
            let _: docfmt::Category = c.parse()?;
            registry.by_category(c)
        }
        None => registry.ordered(),
    };

    if json {
        let metadata: Vec<_> = rules.iter().map(|r| r.metadata()).collect();
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("{}", "Available Rules".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    for rule in &rules {
        println!(
            "{:>4}  {:<24} {:<10} {}",
            rule.priority(),
            rule.id().bold(),
            rule.category().as_str().dimmed(),
            rule.name()
        );
    }
    println!("\n{} rules", rules.len());
    Ok(())
}

fn cmd_preset(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let preset = Preset::from_registry(RuleRegistry::global())
        .with_description("Every built-in rule with its default parameters");
    match output {
        Some(path) => {
            preset.save(path)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        None => println!("{}", preset.to_json()?),
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = Document::load_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());

    let meta = &doc.metadata;
    if let Some(ref title) = meta.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = meta.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref created) = meta.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = meta.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    let formulas = doc.paragraphs().filter(|p| p.has_math()).count();
    let images = doc.paragraphs().filter(|p| p.has_image()).count();
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.table_count());
    println!("{}: {}", "Images".bold(), images);
    println!("{}: {}", "Formulas".bold(), formulas);
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfmt".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Rule-driven document formatting tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_enables_everything() {
        let config = build_config(None, &[], &[]).unwrap();
        assert_eq!(config.enabled_ids().len(), RuleRegistry::global().len());
    }

    #[test]
    fn test_enable_selects_only_listed() {
        let config = build_config(None, &["title_bold".to_string()], &[]).unwrap();
        assert_eq!(config.enabled_ids(), vec!["title_bold"]);
    }

    #[test]
    fn test_preset_file_with_disable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        Preset::from_registry(RuleRegistry::global()).save(&path).unwrap();

        let config = build_config(Some(&path), &[], &["mermaid_render".to_string()]).unwrap();
        assert!(!config.is_enabled("mermaid_render"));
        assert!(config.is_enabled("page_layout"));
    }
}
