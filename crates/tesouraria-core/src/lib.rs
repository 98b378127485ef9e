//! Core library for a church treasury.
//!
//! This crate provides:
//! - Comprovante classification (text normalization, rule and beneficiary
//!   matching, receiver-line heuristics)
//! - Best-effort text extraction from fetched documents
//! - CPF/CNPJ formatting and check-digit validation
//! - Receipt and reimbursement PDF generation with shared numbering
//! - Collaborator traits for the hosted record store, sequence allocator
//!   and object storage, with in-memory implementations
//! - Income booking for worship-service tithes and offerings

pub mod classify;
pub mod dates;
pub mod error;
pub mod extract;
pub mod models;
pub mod offerings;
pub mod receipt;
pub mod store;
pub mod taxid;

pub use classify::{ClassificationResult, ComprovanteClassifier, Suggestion};
pub use error::{ReceiptError, Result, TesourariaError, TransportError, ValidationErrors};
pub use extract::{ExtractionStrategy, TextExtractor};
pub use models::{
    Beneficiary, Category, CategoryKind, ChurchSettings, ClassificationRule, EntryKind,
    EntryStatus, LedgerEntry, NewLedgerEntry, NewRule, ReceiptFields, RuleOrder, RuleScope,
    TesourariaConfig,
};
pub use receipt::{DocumentNumber, GeneratedReceipt, ReceiptKind, ReceiptService, Reimbursement, SignatureInput};
pub use store::{MemoryStorage, MemoryStore, ObjectStorage, RecordStore, SequenceAllocator};
