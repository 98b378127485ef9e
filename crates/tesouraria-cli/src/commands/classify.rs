//! Classify command - suggest a category and beneficiary for local files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use tesouraria_core::models::{Beneficiary, ClassificationRule, RuleOrder};
use tesouraria_core::{ClassificationResult, ComprovanteClassifier, TextExtractor};

use super::config;
use super::read_json;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Comprovante files (PDF, image or text)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON array of classification rules
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// JSON array of beneficiaries
    #[arg(short, long)]
    beneficiaries: Option<PathBuf>,

    /// Free-text description typed by the user
    #[arg(short, long, default_value = "")]
    description: String,

    /// Rule order; the first matching rule wins
    #[arg(long, value_enum, default_value = "newest-first")]
    order: OrderArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OrderArg {
    /// Most recently created rule first
    NewestFirst,
    /// Oldest rule first
    OldestFirst,
}

impl From<OrderArg> for RuleOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::NewestFirst => RuleOrder::NewestFirst,
            OrderArg::OldestFirst => RuleOrder::OldestFirst,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Classification of one input file.
#[derive(Serialize)]
struct FileResult {
    file: String,
    #[serde(flatten)]
    result: ClassificationResult,
}

/// Content type inferred from the file extension.
fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "txt" | "text" => "text/plain",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let extractor = TextExtractor::from_config(&config.extraction);

    let rules: Vec<ClassificationRule> = match &args.rules {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let beneficiaries: Vec<Beneficiary> = match &args.beneficiaries {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    info!("Loaded {} rules and {} beneficiaries", rules.len(), beneficiaries.len());

    let classifier = ComprovanteClassifier::new(rules, beneficiaries).with_order(args.order.into());

    let pb = if args.inputs.len() > 1 {
        let pb = ProgressBar::new(args.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut results = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        pb.set_message(input.display().to_string());
        let bytes = match fs::read(input) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Cannot read {}: {}", input.display(), e);
                Vec::new()
            }
        };
        let source = input.display().to_string();
        let text = extractor.extract_text(&bytes, content_type(input), &source);
        results.push(FileResult {
            file: source,
            result: classifier.classify(&text, &args.description),
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Json => {
            if results.len() == 1 {
                println!("{}", serde_json::to_string_pretty(&results[0])?);
            } else {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        OutputFormat::Text => {
            for r in &results {
                print_text(r);
            }
        }
    }

    Ok(())
}

fn print_text(r: &FileResult) {
    println!("{}", style(&r.file).bold());
    match &r.result.suggestion {
        Some(s) => {
            println!("  Category:    {}", s.category_id.as_deref().unwrap_or("-"));
            println!("  Reason:      {}", s.reason);
        }
        None => println!("  Category:    {}", style("no rule matched").yellow()),
    }
    println!("  Receiver:    {}", r.result.receiver_name.as_deref().unwrap_or("-"));
    println!("  Beneficiary: {}", r.result.beneficiary_id.as_deref().unwrap_or("-"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type(Path::new("a/comprovante.TXT")), "text/plain");
        assert_eq!(content_type(Path::new("x.pdf")), "application/pdf");
        assert_eq!(content_type(Path::new("noext")), "application/octet-stream");
    }
}
