//! Offerings command - book a service's tithes and offerings.

use std::path::PathBuf;

use clap::Args;
use console::style;

use tesouraria_core::MemoryStore;
use tesouraria_core::models::{Category, LedgerEntry};
use tesouraria_core::offerings::{ServiceCollection, record_service_income};

use super::read_json;

/// Arguments for the offerings command.
#[derive(Args)]
pub struct OfferingsArgs {
    /// Service collection JSON (date, tithes, offerings)
    #[arg(short = 's', long)]
    service: PathBuf,

    /// JSON array of the owner's categories
    #[arg(long)]
    categories: PathBuf,

    /// JSON array of entries already in the ledger
    #[arg(long)]
    existing: Option<PathBuf>,

    /// Owner of the booked entries
    #[arg(long)]
    owner: String,
}

pub async fn run(args: OfferingsArgs) -> anyhow::Result<()> {
    let collection: ServiceCollection = read_json(&args.service)?;
    let categories: Vec<Category> = read_json(&args.categories)?;
    let existing: Vec<LedgerEntry> = match &args.existing {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let store = categories
        .into_iter()
        .fold(MemoryStore::new(), MemoryStore::with_category);
    let store = existing.into_iter().fold(store, MemoryStore::with_entry);

    let booked = record_service_income(&store, &args.owner, &collection).await?;
    if booked.is_empty() {
        eprintln!("{} Nothing new to book for {}", style("ℹ").blue(), collection.date);
    }
    println!("{}", serde_json::to_string_pretty(&booked)?);

    Ok(())
}
