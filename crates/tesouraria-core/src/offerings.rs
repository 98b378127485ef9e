//! Income entries for a worship service ("culto"): one for the tithes and
//! one for the offerings collected.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TesourariaError};
use crate::models::{EntryKind, LedgerEntry, NewLedgerEntry};
use crate::store::RecordStore;

/// Category receiving tithe totals.
pub const TITHES_CATEGORY: &str = "Dízimos";

/// Category receiving offering totals.
pub const OFFERINGS_CATEGORY: &str = "Ofertas";

/// One person's tithe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitheItem {
    pub name: String,
    pub amount: Decimal,
}

/// What was collected at one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCollection {
    pub date: NaiveDate,
    #[serde(default)]
    pub tithes: Vec<TitheItem>,
    #[serde(default)]
    pub offerings: Vec<Decimal>,
}

impl ServiceCollection {
    /// Tithes with a name and a positive amount, names trimmed.
    pub fn valid_tithes(&self) -> Vec<TitheItem> {
        self.tithes
            .iter()
            .filter(|t| !t.name.trim().is_empty() && t.amount > Decimal::ZERO)
            .map(|t| TitheItem {
                name: t.name.trim().to_string(),
                amount: t.amount,
            })
            .collect()
    }

    /// Positive offerings.
    pub fn valid_offerings(&self) -> Vec<Decimal> {
        self.offerings.iter().copied().filter(|v| *v > Decimal::ZERO).collect()
    }

    pub fn tithes_total(&self) -> Decimal {
        self.valid_tithes().iter().map(|t| t.amount).sum()
    }

    pub fn offerings_total(&self) -> Decimal {
        self.valid_offerings().iter().copied().sum()
    }
}

pub fn tithes_description(date: NaiveDate) -> String {
    format!("Dízimos - culto {}", date.format("%Y-%m-%d"))
}

pub fn offerings_description(date: NaiveDate) -> String {
    format!("Ofertas - culto {}", date.format("%Y-%m-%d"))
}

/// Totals with the category each is booked under.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTotal {
    pub category_id: String,
    pub description: String,
    pub amount: Decimal,
}

/// Income rows for the given totals; non-positive totals produce none.
pub fn plan_entries(owner_id: &str, date: NaiveDate, totals: &[PlannedTotal]) -> Vec<NewLedgerEntry> {
    totals
        .iter()
        .filter(|t| t.amount > Decimal::ZERO)
        .map(|t| NewLedgerEntry {
            owner_id: owner_id.to_string(),
            kind: EntryKind::Income,
            category_id: t.category_id.clone(),
            description: t.description.clone(),
            amount: t.amount,
            due_date: date,
        })
        .collect()
}

/// Drop rows matching an existing entry on category, description, amount
/// and due date.
pub fn without_duplicates(rows: Vec<NewLedgerEntry>, existing: &[LedgerEntry]) -> Vec<NewLedgerEntry> {
    rows.into_iter()
        .filter(|row| {
            !existing.iter().any(|e| {
                e.category_id == row.category_id
                    && e.description == row.description
                    && e.amount == row.amount
                    && e.due_date == row.due_date
            })
        })
        .collect()
}

async fn category_id(store: &dyn RecordStore, owner_id: &str, name: &str) -> Result<String> {
    store
        .find_category_by_name(owner_id, name)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| TesourariaError::CategoryNotFound(name.to_string()))
}

/// Book a service's tithes and offerings as income entries.
///
/// Returns the rows actually inserted; running it twice for the same
/// service inserts nothing the second time.
pub async fn record_service_income(
    store: &dyn RecordStore,
    owner_id: &str,
    collection: &ServiceCollection,
) -> Result<Vec<NewLedgerEntry>> {
    let mut totals = Vec::new();

    let tithes = collection.tithes_total();
    if tithes > Decimal::ZERO {
        totals.push(PlannedTotal {
            category_id: category_id(store, owner_id, TITHES_CATEGORY).await?,
            description: tithes_description(collection.date),
            amount: tithes,
        });
    }
    let offerings = collection.offerings_total();
    if offerings > Decimal::ZERO {
        totals.push(PlannedTotal {
            category_id: category_id(store, owner_id, OFFERINGS_CATEGORY).await?,
            description: offerings_description(collection.date),
            amount: offerings,
        });
    }

    let rows = plan_entries(owner_id, collection.date, &totals);
    if rows.is_empty() {
        debug!("Nothing to book for service on {}", collection.date);
        return Ok(rows);
    }

    let descriptions: Vec<String> = rows.iter().map(|r| r.description.clone()).collect();
    let existing = store.find_entries_by_description(owner_id, &descriptions).await?;
    let rows = without_duplicates(rows, &existing);

    if !rows.is_empty() {
        store.insert_entries(&rows).await?;
        info!("Booked {} income entries for service on {}", rows.len(), collection.date);
    }
    Ok(rows)
}
