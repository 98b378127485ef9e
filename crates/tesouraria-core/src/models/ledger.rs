//! Ledger entries ("lançamentos") and categories.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ValidationErrors};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Accounts payable.
    #[serde(rename = "DESPESA", alias = "EXPENSE")]
    Expense,
    /// Accounts receivable.
    #[serde(rename = "RECEITA", alias = "INCOME")]
    Income,
}

/// Payment status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryStatus {
    #[default]
    #[serde(rename = "EM_ABERTO", alias = "PENDENTE", alias = "OPEN")]
    Open,
    #[serde(rename = "PAGO", alias = "PAID")]
    Paid,
    #[serde(rename = "CANCELADO", alias = "CANCELLED")]
    Cancelled,
}

/// Kind of a category. Transfers move money between accounts and never
/// appear as income or expense totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    #[serde(rename = "DESPESA")]
    Expense,
    #[serde(rename = "RECEITA")]
    Income,
    #[serde(rename = "TRANSFERENCIA")]
    Transfer,
}

/// A ledger category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: CategoryKind,
}

/// Receipt bookkeeping carried on a ledger entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFields {
    /// Allocated sequence number, shared by receipt and reimbursement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_number: Option<u32>,

    /// Year the sequence number belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Storage path of the generated receipt PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,

    /// When the receipt was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// A ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub owner_id: String,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub kind: EntryKind,
    #[serde(default)]
    pub status: EntryStatus,
    pub category_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,

    #[serde(flatten)]
    pub receipt: ReceiptFields,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boleto_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
}

impl LedgerEntry {
    /// Amount printed on documents: the paid amount once paid.
    pub fn effective_amount(&self) -> Decimal {
        match (self.status, self.paid_amount) {
            (EntryStatus::Paid, Some(paid)) => paid,
            _ => self.amount,
        }
    }

    /// Date printed on documents: the payment date once paid.
    pub fn effective_date(&self) -> NaiveDate {
        match (self.status, self.payment_date) {
            (EntryStatus::Paid, Some(date)) => date,
            _ => self.due_date,
        }
    }

    /// Core financial fields are read-only once a receipt exists.
    pub fn is_locked(&self) -> bool {
        self.receipt.pdf_path.is_some()
    }

    /// Submit-time checks for the edit form.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "required"));
        }
        if self.category_id.trim().is_empty() {
            errors.push(FieldError::new("category_id", "required"));
        }
        if self.amount <= Decimal::ZERO {
            errors.push(FieldError::new("amount", "must be positive"));
        }
        if self.status == EntryStatus::Paid {
            if self.payment_date.is_none() {
                errors.push(FieldError::new("payment_date", "required when paid"));
            }
            if self.paid_amount.is_none() {
                errors.push(FieldError::new("paid_amount", "required when paid"));
            }
        }

        ValidationErrors::into_result(errors)
    }
}

/// A ledger entry about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub owner_id: String,
    pub kind: EntryKind,
    pub category_id: String,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::str::FromStr;

    pub fn entry(id: &str) -> LedgerEntry {
        LedgerEntry {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            description: "Conta de luz".to_string(),
            amount: Decimal::from_str("150.00").unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            kind: EntryKind::Expense,
            status: EntryStatus::Open,
            category_id: "cat-energia".to_string(),
            beneficiary_id: None,
            payment_date: None,
            paid_amount: None,
            receipt: ReceiptFields::default(),
            boleto_url: None,
            proof_url: None,
        }
    }

    pub fn paid_entry(id: &str) -> LedgerEntry {
        LedgerEntry {
            status: EntryStatus::Paid,
            paid_amount: Some(Decimal::from_str("150.00").unwrap()),
            payment_date: Some(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()),
            ..entry(id)
        }
    }
}
