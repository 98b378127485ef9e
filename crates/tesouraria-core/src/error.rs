//! Error types for the tesouraria-core library.

use std::fmt;

use thiserror::Error;

/// Main error type for the tesouraria library.
#[derive(Error, Debug)]
pub enum TesourariaError {
    /// Receipt or reimbursement generation error.
    #[error("receipt error: {0}")]
    Receipt(#[from] ReceiptError),

    /// Field-level validation failed before any network call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// A collaborator call (store, storage, HTTP) failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// PDF assembly error.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A category looked up by name does not exist for the owner.
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
}

/// Errors raised by the receipt and reimbursement builders.
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// Church settings are missing or incomplete.
    #[error("church settings not configured: {0}")]
    Configuration(String),

    /// The entry already carries a generated receipt.
    #[error("receipt already generated for entry {entry_id} ({number})")]
    AlreadyGenerated { entry_id: String, number: String },

    /// The entry referenced by the request does not exist.
    #[error("ledger entry not found: {0}")]
    EntryNotFound(String),

    /// The entry has no generated receipt to open.
    #[error("no receipt generated for entry {0}")]
    NotGenerated(String),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every field error found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    /// Check whether a given field failed.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Turn a list of collected errors into a result.
    pub fn into_result(errors: Vec<FieldError>) -> std::result::Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// A failed external call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Record store read/write failure.
    #[error("store request failed: {0}")]
    Store(String),

    /// Object storage failure (upload, download, signing, listing).
    #[error("storage request failed: {0}")]
    Storage(String),

    /// Sequence allocation failure.
    #[error("sequence allocation failed: {0}")]
    Sequence(String),

    /// The caller lacks permission for the requested row or object.
    #[error("permission denied: {0}")]
    Permission(String),
}

/// Result type for the tesouraria library.
pub type Result<T> = std::result::Result<T, TesourariaError>;
