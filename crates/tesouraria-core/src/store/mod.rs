//! Narrow interfaces to the hosted data platform: records, the receipt
//! sequence allocator and object storage.
//!
//! All methods are async and may fail with a [`TransportError`]. The
//! platform owns every piece of shared mutable state; nothing here caches.

mod memory;

pub use memory::{MemoryStorage, MemoryStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::models::{
    Beneficiary, Category, ChurchSettings, ClassificationRule, LedgerEntry, NewLedgerEntry,
    NewRule, ReceiptFields, RuleOrder, RuleScope,
};

/// Result type for collaborator calls.
pub type StoreResult<T> = std::result::Result<T, TransportError>;

/// A sequence number claimed for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub number: u32,
    pub year: i32,
    /// False when the entry already carried a number and it was reused.
    pub fresh: bool,
}

/// Allocator of per-(owner, year) receipt numbers.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Next number for `(owner, year)`. Atomic across concurrent callers.
    async fn next_receipt_number(&self, owner_id: &str, year: i32) -> StoreResult<u32>;

    /// Return the entry's existing number, or allocate one and record it on
    /// the entry, as a single server-side transaction.
    async fn claim_receipt_number(&self, owner_id: &str, entry_id: &str, year: i32) -> StoreResult<Claim>;
}

/// Row access for ledger entries, rules, beneficiaries, categories and
/// church settings.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_entry(&self, id: &str) -> StoreResult<Option<LedgerEntry>>;

    /// Overwrite the receipt bookkeeping fields of an entry.
    async fn update_receipt_fields(&self, id: &str, fields: &ReceiptFields) -> StoreResult<()>;

    async fn find_entries_by_description(
        &self,
        owner_id: &str,
        descriptions: &[String],
    ) -> StoreResult<Vec<LedgerEntry>>;

    async fn insert_entries(&self, entries: &[NewLedgerEntry]) -> StoreResult<()>;

    async fn list_rules(&self, scope: &RuleScope, order: RuleOrder) -> StoreResult<Vec<ClassificationRule>>;

    async fn insert_rule(&self, rule: &NewRule) -> StoreResult<ClassificationRule>;

    async fn delete_rule(&self, id: &str) -> StoreResult<()>;

    async fn list_beneficiaries(&self, owner_id: &str) -> StoreResult<Vec<Beneficiary>>;

    async fn get_beneficiary(&self, id: &str) -> StoreResult<Option<Beneficiary>>;

    async fn get_church_settings(&self, owner_id: &str) -> StoreResult<Option<ChurchSettings>>;

    /// Insert or replace the settings keyed by owner.
    async fn upsert_church_settings(&self, settings: &ChurchSettings) -> StoreResult<()>;

    /// Case-insensitive lookup of a category by exact name.
    async fn find_category_by_name(&self, owner_id: &str, name: &str) -> StoreResult<Option<Category>>;
}

/// An object listed under a storage prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Name relative to the listed prefix.
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Bucket-based object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes at a path. Existing objects are not overwritten.
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()>;

    /// Store bytes at a path, overwriting whatever is there.
    async fn replace(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()>;

    /// Time-limited URL for a private object.
    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u64) -> StoreResult<String>;

    /// Public URL, valid only if the bucket is public.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn download(&self, bucket: &str, path: &str) -> StoreResult<Vec<u8>>;

    /// Objects directly under `prefix`, most recently updated first.
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<StoredObject>>;
}
