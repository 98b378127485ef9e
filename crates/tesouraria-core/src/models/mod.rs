//! Data models: ledger entries, registries and configuration.

pub mod config;
pub mod ledger;
pub mod registry;

pub use config::{
    ExtractionConfig, ExtractionStrategyKind, ReceiptConfig, ServerConfig, TesourariaConfig,
};
pub use ledger::{
    Category, CategoryKind, EntryKind, EntryStatus, LedgerEntry, NewLedgerEntry, ReceiptFields,
};
pub use registry::{
    Beneficiary, ChurchSettings, ClassificationRule, NewRule, RuleOrder, RuleScope,
};
