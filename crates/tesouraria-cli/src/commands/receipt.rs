//! Receipt command - generate a receipt or reimbursement PDF from local
//! JSON files, without the hosted platform.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Datelike;
use clap::Args;
use console::style;
use tracing::info;

use tesouraria_core::models::{Beneficiary, ChurchSettings, LedgerEntry};
use tesouraria_core::{MemoryStorage, MemoryStore, ReceiptService, SignatureInput};

use super::config;
use super::read_json;

/// Arguments for the receipt command.
#[derive(Args)]
pub struct ReceiptArgs {
    /// Ledger entry JSON
    #[arg(short, long)]
    entry: PathBuf,

    /// Church settings JSON
    #[arg(long)]
    church: PathBuf,

    /// Output PDF path
    #[arg(short, long)]
    output: PathBuf,

    /// Signature image (PNG or JPEG) used instead of the church's
    #[arg(short, long)]
    signature: Option<PathBuf>,

    /// Produce a reimbursement instead of a receipt
    #[arg(long)]
    reimbursement: bool,

    /// Beneficiary JSON signing the reimbursement
    #[arg(short, long, requires = "reimbursement")]
    beneficiary: Option<PathBuf>,

    /// Last number already used this year; the document gets the next one
    #[arg(long, default_value = "0")]
    last_number: u32,
}

pub async fn run(args: ReceiptArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;

    let entry: LedgerEntry = read_json(&args.entry)?;
    let mut church: ChurchSettings = read_json(&args.church)?;
    if church.owner_id.is_empty() {
        church.owner_id = entry.owner_id.clone();
    }
    if let Err(errors) = church.validate() {
        eprintln!("{} Church settings: {}", style("⚠").yellow(), errors);
    }

    let beneficiary: Option<Beneficiary> = match &args.beneficiary {
        Some(path) => Some(read_json(path)?),
        None => None,
    };

    let signatures = SignatureInput {
        drawn: None,
        uploaded: match &args.signature {
            Some(path) => Some(fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?),
            None => None,
        },
    };

    let entry_id = entry.id.clone();
    let owner_id = entry.owner_id.clone();
    let year = entry.effective_date().year();

    let mut store = MemoryStore::new().with_entry(entry).with_settings(church);
    if let Some(b) = &beneficiary {
        store = store.with_beneficiary(b.clone());
    }
    store.seed_sequence(&owner_id, year, args.last_number);

    let store = Arc::new(store);
    let storage = Arc::new(MemoryStorage::default());
    let bucket = config.receipt.receipts_bucket.clone();
    let service = ReceiptService::new(store.clone(), store, storage.clone(), config.receipt);

    let (bytes, number, signature) = if args.reimbursement {
        let doc = service
            .generate_reimbursement(&entry_id, beneficiary.as_ref().map(|b| b.id.as_str()), &signatures)
            .await?;
        info!("Reimbursement signed by {}", doc.signer_name);
        (doc.bytes, doc.number, doc.signature)
    } else {
        let generated = service.generate_receipt(&entry_id, &signatures).await?;
        let (bytes, _) = storage
            .get(&bucket, &generated.path)
            .ok_or_else(|| anyhow::anyhow!("Generated receipt missing at {}", generated.path))?;
        (bytes, generated.number, generated.signature)
    };

    fs::write(&args.output, &bytes)?;

    let kind = if args.reimbursement { "Reimbursement" } else { "Receipt" };
    let signed = match signature {
        Some(source) => format!("signed ({:?})", source).to_lowercase(),
        None => "unsigned".to_string(),
    };
    println!(
        "{} {} {} written to {} ({})",
        style("✓").green(),
        kind,
        number,
        args.output.display(),
        signed
    );

    Ok(())
}
