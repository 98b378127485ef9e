//! In-process implementations of the collaborator traits, used by the CLI's
//! offline mode and by tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use super::{Claim, ObjectStorage, RecordStore, SequenceAllocator, StoreResult, StoredObject};
use crate::classify::fold;
use crate::error::TransportError;
use crate::models::{
    Beneficiary, Category, ChurchSettings, ClassificationRule, LedgerEntry, NewLedgerEntry,
    NewRule, ReceiptFields, RuleOrder, RuleScope,
};

#[derive(Default)]
struct StoreState {
    entries: Vec<LedgerEntry>,
    rules: Vec<ClassificationRule>,
    beneficiaries: Vec<Beneficiary>,
    categories: Vec<Category>,
    settings: HashMap<String, ChurchSettings>,
    sequences: HashMap<(String, i32), u32>,
    next_id: u64,
}

impl StoreState {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn allocate(&mut self, owner_id: &str, year: i32) -> u32 {
        let counter = self.sequences.entry((owner_id.to_string(), year)).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Record store and sequence allocator backed by a single mutex.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    fail_receipt_updates: AtomicBool,
    allocations: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_entry(self, entry: LedgerEntry) -> Self {
        self.lock().entries.push(entry);
        self
    }

    pub fn with_rule(self, rule: ClassificationRule) -> Self {
        self.lock().rules.push(rule);
        self
    }

    pub fn with_beneficiary(self, beneficiary: Beneficiary) -> Self {
        self.lock().beneficiaries.push(beneficiary);
        self
    }

    pub fn with_category(self, category: Category) -> Self {
        self.lock().categories.push(category);
        self
    }

    pub fn with_settings(self, settings: ChurchSettings) -> Self {
        self.lock().settings.insert(settings.owner_id.clone(), settings);
        self
    }

    /// Start `(owner, year)` after `last`, so the next number is `last + 1`.
    pub fn seed_sequence(&self, owner_id: &str, year: i32, last: u32) {
        self.lock().sequences.insert((owner_id.to_string(), year), last);
    }

    /// Make every later `update_receipt_fields` call fail.
    pub fn fail_receipt_updates(&self, fail: bool) {
        self.fail_receipt_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of fresh sequence numbers handed out so far.
    pub fn allocation_count(&self) -> u64 {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored entry.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.lock().entries.clone()
    }
}

#[async_trait]
impl SequenceAllocator for MemoryStore {
    async fn next_receipt_number(&self, owner_id: &str, year: i32) -> StoreResult<u32> {
        let number = self.lock().allocate(owner_id, year);
        self.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(number)
    }

    async fn claim_receipt_number(&self, owner_id: &str, entry_id: &str, year: i32) -> StoreResult<Claim> {
        let mut state = self.lock();

        let index = state
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| TransportError::Sequence(format!("entry {} not found", entry_id)))?;

        let existing = &state.entries[index].receipt;
        if let (Some(number), Some(year)) = (existing.doc_number, existing.year) {
            return Ok(Claim {
                number,
                year,
                fresh: false,
            });
        }

        let number = state.allocate(owner_id, year);
        let receipt = &mut state.entries[index].receipt;
        receipt.doc_number = Some(number);
        receipt.year = Some(year);
        self.allocations.fetch_add(1, Ordering::SeqCst);
        debug!("Allocated {:06}/{} for entry {}", number, year, entry_id);

        Ok(Claim {
            number,
            year,
            fresh: true,
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_entry(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.lock().entries.iter().find(|e| e.id == id).cloned())
    }

    async fn update_receipt_fields(&self, id: &str, fields: &ReceiptFields) -> StoreResult<()> {
        if self.fail_receipt_updates.load(Ordering::SeqCst) {
            return Err(TransportError::Store(format!("update of entry {} rejected", id)));
        }
        let mut state = self.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| TransportError::Store(format!("entry {} not found", id)))?;
        entry.receipt = fields.clone();
        Ok(())
    }

    async fn find_entries_by_description(
        &self,
        owner_id: &str,
        descriptions: &[String],
    ) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self
            .lock()
            .entries
            .iter()
            .filter(|e| e.owner_id == owner_id && descriptions.contains(&e.description))
            .cloned()
            .collect())
    }

    async fn insert_entries(&self, entries: &[NewLedgerEntry]) -> StoreResult<()> {
        let mut state = self.lock();
        for new in entries {
            let id = state.fresh_id("entry");
            state.entries.push(LedgerEntry {
                id,
                owner_id: new.owner_id.clone(),
                description: new.description.clone(),
                amount: new.amount,
                due_date: new.due_date,
                kind: new.kind,
                status: Default::default(),
                category_id: new.category_id.clone(),
                beneficiary_id: None,
                payment_date: None,
                paid_amount: None,
                receipt: ReceiptFields::default(),
                boleto_url: None,
                proof_url: None,
            });
        }
        Ok(())
    }

    async fn list_rules(&self, scope: &RuleScope, order: RuleOrder) -> StoreResult<Vec<ClassificationRule>> {
        let mut rules: Vec<ClassificationRule> = self
            .lock()
            .rules
            .iter()
            .filter(|r| scope.includes(&r.owner_id))
            .cloned()
            .collect();
        order.sort(&mut rules);
        Ok(rules)
    }

    async fn insert_rule(&self, rule: &NewRule) -> StoreResult<ClassificationRule> {
        let mut state = self.lock();
        let id = state.fresh_id("rule");
        // Strictly increasing timestamps keep insertion order observable.
        let created_at = Utc
            .timestamp_opt(1_700_000_000 + state.next_id as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let stored = ClassificationRule {
            id,
            owner_id: rule.owner_id.clone(),
            term: rule.term.clone(),
            category_id: rule.category_id.clone(),
            beneficiary_id: rule.beneficiary_id.clone(),
            created_at,
        };
        state.rules.push(stored.clone());
        Ok(stored)
    }

    async fn delete_rule(&self, id: &str) -> StoreResult<()> {
        self.lock().rules.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_beneficiaries(&self, owner_id: &str) -> StoreResult<Vec<Beneficiary>> {
        let mut list: Vec<Beneficiary> = self
            .lock()
            .beneficiaries
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn get_beneficiary(&self, id: &str) -> StoreResult<Option<Beneficiary>> {
        Ok(self.lock().beneficiaries.iter().find(|b| b.id == id).cloned())
    }

    async fn get_church_settings(&self, owner_id: &str) -> StoreResult<Option<ChurchSettings>> {
        Ok(self.lock().settings.get(owner_id).cloned())
    }

    async fn upsert_church_settings(&self, settings: &ChurchSettings) -> StoreResult<()> {
        self.lock()
            .settings
            .insert(settings.owner_id.clone(), settings.clone());
        Ok(())
    }

    async fn find_category_by_name(&self, owner_id: &str, name: &str) -> StoreResult<Option<Category>> {
        let wanted = fold(name.trim());
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.owner_id == owner_id && fold(&c.name) == wanted)
            .cloned())
    }
}

struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
    version: u64,
}

/// Object storage kept in a map keyed by `(bucket, path)`.
pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<BTreeMap<(String, String), StoredBlob>>,
    version: AtomicU64,
    fail_uploads: AtomicBool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(BTreeMap::new()),
            version: AtomicU64::new(0),
            fail_uploads: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<(String, String), StoredBlob>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every later upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Raw bytes and content type of a stored object.
    pub fn get(&self, bucket: &str, path: &str) -> Option<(Vec<u8>, String)> {
        self.lock()
            .get(&(bucket.to_string(), path.to_string()))
            .map(|b| (b.bytes.clone(), b.content_type.clone()))
    }

    /// Every path stored in a bucket.
    pub fn paths(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Store an object, replacing any previous one.
    pub fn put(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().insert(
            (bucket.to_string(), path.to_string()),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
                version,
            },
        );
    }
}

fn version_time(version: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(1_700_000_000 + version as i64, 0).single()
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(TransportError::Storage(format!("upload to {}/{} rejected", bucket, path)));
        }
        if self.lock().contains_key(&(bucket.to_string(), path.to_string())) {
            return Err(TransportError::Storage(format!("{}/{} already exists", bucket, path)));
        }
        self.put(bucket, path, bytes, content_type);
        Ok(())
    }

    async fn replace(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(TransportError::Storage(format!("upload to {}/{} rejected", bucket, path)));
        }
        self.put(bucket, path, bytes, content_type);
        Ok(())
    }

    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u64) -> StoreResult<String> {
        if !self.lock().contains_key(&(bucket.to_string(), path.to_string())) {
            return Err(TransportError::Storage(format!("{}/{} not found", bucket, path)));
        }
        Ok(format!(
            "{}/object/sign/{}/{}?expires_in={}",
            self.base_url, bucket, path, ttl_secs
        ))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, bucket, path)
    }

    async fn download(&self, bucket: &str, path: &str) -> StoreResult<Vec<u8>> {
        self.get(bucket, path)
            .map(|(bytes, _)| bytes)
            .ok_or_else(|| TransportError::Storage(format!("{}/{} not found", bucket, path)))
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<StoredObject>> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        let objects = self.lock();
        let mut found: Vec<(u64, StoredObject)> = objects
            .iter()
            .filter(|((b, p), _)| b == bucket && p.starts_with(&prefix))
            .filter_map(|((_, p), blob)| {
                let name = &p[prefix.len()..];
                if name.contains('/') {
                    return None;
                }
                Some((
                    blob.version,
                    StoredObject {
                        name: name.to_string(),
                        updated_at: version_time(blob.version),
                    },
                ))
            })
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(found.into_iter().map(|(_, o)| o).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ledger::fixtures::entry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_numbers_are_per_owner_and_year() {
        let store = MemoryStore::new();
        assert_eq!(store.next_receipt_number("a", 2024).await.unwrap(), 1);
        assert_eq!(store.next_receipt_number("a", 2024).await.unwrap(), 2);
        assert_eq!(store.next_receipt_number("a", 2025).await.unwrap(), 1);
        assert_eq!(store.next_receipt_number("b", 2024).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seeded_sequence_continues() {
        let store = MemoryStore::new();
        store.seed_sequence("a", 2024, 41);
        assert_eq!(store.next_receipt_number("a", 2024).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_claim_reuses_existing_number() {
        let store = MemoryStore::new().with_entry(entry("e1"));
        let first = store.claim_receipt_number("owner-1", "e1", 2024).await.unwrap();
        let second = store.claim_receipt_number("owner-1", "e1", 2024).await.unwrap();
        assert!(first.fresh);
        assert!(!second.fresh);
        assert_eq!(first.number, second.number);
        assert_eq!(store.allocation_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_are_distinct() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.next_receipt_number("owner-1", 2024).await.unwrap()
            }));
        }
        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=32).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_shallow() {
        let storage = MemoryStorage::default();
        storage.put("sig", "o/ben/b1-old.png", vec![1], "image/png");
        storage.put("sig", "o/ben/b1-new.png", vec![2], "image/png");
        storage.put("sig", "o/ben/nested/x.png", vec![3], "image/png");
        let names: Vec<String> = storage
            .list("sig", "o/ben")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["b1-new.png", "b1-old.png"]);
    }

    #[tokio::test]
    async fn test_upload_does_not_overwrite() {
        let storage = MemoryStorage::default();
        storage.upload("b", "p.pdf", vec![1], "application/pdf").await.unwrap();
        assert!(storage.upload("b", "p.pdf", vec![2], "application/pdf").await.is_err());
        assert_eq!(storage.download("b", "p.pdf").await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_category_lookup_ignores_case_and_accents() {
        let store = MemoryStore::new().with_category(Category {
            id: "c1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "Dízimos".to_string(),
            kind: crate::models::CategoryKind::Income,
        });
        let found = store.find_category_by_name("owner-1", " dizimos ").await.unwrap();
        assert_eq!(found.map(|c| c.id).as_deref(), Some("c1"));
    }
}
