//! Receipt and reimbursement PDF documents.
//!
//! Both documents share one per-(owner, year) number sequence and one page
//! layout. A receipt is uploaded and recorded on its ledger entry; a
//! reimbursement is returned as bytes for the caller to preview.

pub mod metrics;
pub mod render;
pub mod service;
pub mod signature;

pub use metrics::StandardFont;
pub use render::{ReceiptDocument, RenderedDocument, render};
pub use service::{GeneratedReceipt, ReceiptService, Reimbursement};
pub use signature::{
    BeneficiarySignature, InlineSignature, SignatureImage, SignatureInput, SignatureProvider,
    SignatureSource, StoredSignature, resolve_signature,
};

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::format_br;

/// A sequence number with its year, shown as `NNNNNN/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub number: u32,
    pub year: i32,
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}/{}", self.number, self.year)
    }
}

/// Which document is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    Receipt,
    Reimbursement,
}

impl ReceiptKind {
    /// Heading printed before the number.
    pub fn label(self) -> &'static str {
        match self {
            ReceiptKind::Receipt => "RECEIPT",
            ReceiptKind::Reimbursement => "REIMBURSEMENT",
        }
    }

    /// Body paragraph for this kind of document.
    pub fn body(self, church_name: &str, amount: Decimal, description: &str, date: NaiveDate) -> String {
        let phrase = match self {
            ReceiptKind::Receipt => "the amount of",
            ReceiptKind::Reimbursement => "reimbursement in the amount of",
        };
        format!(
            "Received from {} {} R$ {:.2} regarding \"{}\" on {}.",
            church_name.trim(),
            phrase,
            amount,
            description.trim(),
            format_br(date)
        )
    }
}

/// Storage path of a receipt PDF.
pub fn receipt_path(owner_id: &str, entry_id: &str, number: DocumentNumber) -> String {
    format!("{}/{}/{}-{:06}.pdf", owner_id, entry_id, number.year, number.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_document_number_display() {
        assert_eq!(DocumentNumber { number: 1, year: 2024 }.to_string(), "000001/2024");
        assert_eq!(DocumentNumber { number: 1234567, year: 2025 }.to_string(), "1234567/2025");
    }

    #[test]
    fn test_receipt_body() {
        let body = ReceiptKind::Receipt.body(
            "Igreja X",
            Decimal::from_str("150").unwrap(),
            "Conta de luz",
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        );
        assert_eq!(
            body,
            "Received from Igreja X the amount of R$ 150.00 regarding \"Conta de luz\" on 10/03/2024."
        );
    }

    #[test]
    fn test_reimbursement_body() {
        let body = ReceiptKind::Reimbursement.body(
            "Igreja X",
            Decimal::from_str("42.5").unwrap(),
            "Material de limpeza",
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        );
        assert!(body.contains("reimbursement in the amount of R$ 42.50"));
        assert!(body.ends_with("on 01/12/2024."));
    }

    #[test]
    fn test_receipt_path() {
        let path = receipt_path("owner-1", "e1", DocumentNumber { number: 12, year: 2024 });
        assert_eq!(path, "owner-1/e1/2024-000012.pdf");
    }
}
