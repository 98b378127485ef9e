//! Validate command - check CPF/CNPJ numbers.

use clap::Args;
use console::style;

use tesouraria_core::taxid::{DocumentKind, format_document, validate_document};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// CPF or CNPJ numbers, formatted or digits-only
    #[arg(required = true)]
    documents: Vec<String>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let mut invalid = 0;

    for document in &args.documents {
        let label = DocumentKind::detect(document).map_or("?", DocumentKind::label);
        if validate_document(document) {
            println!(
                "{} {} {}",
                style("✓").green(),
                label,
                format_document(document)
            );
        } else {
            invalid += 1;
            println!("{} {} {}", style("✗").red(), label, document);
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} documents are invalid", invalid, args.documents.len());
    }
    Ok(())
}
