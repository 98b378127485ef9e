//! Receipt generation against the record store, allocator and storage.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::signature::{
    BeneficiarySignature, InlineSignature, SignatureInput, SignatureProvider, SignatureSource,
    StoredSignature, resolve_signature,
};
use super::{DocumentNumber, ReceiptDocument, ReceiptKind, receipt_path, render};
use crate::error::{ReceiptError, Result};
use crate::models::{Beneficiary, ChurchSettings, LedgerEntry, ReceiptConfig, ReceiptFields};
use crate::store::{ObjectStorage, RecordStore, SequenceAllocator};

/// A receipt stored and recorded on its entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReceipt {
    pub path: String,
    pub number: DocumentNumber,
    pub signature: Option<SignatureSource>,
}

/// A reimbursement document, not yet stored anywhere.
#[derive(Debug, Clone)]
pub struct Reimbursement {
    pub bytes: Vec<u8>,
    pub number: DocumentNumber,
    pub signer_name: String,
    pub signature: Option<SignatureSource>,
}

/// Builds receipt and reimbursement documents for ledger entries.
pub struct ReceiptService {
    store: Arc<dyn RecordStore>,
    allocator: Arc<dyn SequenceAllocator>,
    storage: Arc<dyn ObjectStorage>,
    config: ReceiptConfig,
}

impl ReceiptService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        allocator: Arc<dyn SequenceAllocator>,
        storage: Arc<dyn ObjectStorage>,
        config: ReceiptConfig,
    ) -> Self {
        Self {
            store,
            allocator,
            storage,
            config,
        }
    }

    async fn load_entry(&self, entry_id: &str) -> Result<LedgerEntry> {
        self.store
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| ReceiptError::EntryNotFound(entry_id.to_string()).into())
    }

    async fn church_settings(&self, owner_id: &str) -> Result<ChurchSettings> {
        let settings = self
            .store
            .get_church_settings(owner_id)
            .await?
            .ok_or_else(|| ReceiptError::Configuration(format!("no church settings for owner {}", owner_id)))?;
        if !settings.is_complete() {
            return Err(ReceiptError::Configuration(format!(
                "church settings for owner {} are incomplete",
                owner_id
            ))
            .into());
        }
        Ok(settings.normalized())
    }

    /// Take the entry's number, or allocate one for the year of its
    /// effective date. The flag is true for a newly allocated number.
    async fn claim_number(&self, entry: &LedgerEntry) -> Result<(DocumentNumber, bool)> {
        let year = entry.effective_date().year();
        let claim = self
            .allocator
            .claim_receipt_number(&entry.owner_id, &entry.id, year)
            .await?;
        let number = DocumentNumber {
            number: claim.number,
            year: claim.year,
        };
        if claim.fresh {
            info!("Allocated number {} for entry {}", number, entry.id);
        } else {
            info!("Reusing number {} of entry {}", number, entry.id);
        }
        Ok((number, claim.fresh))
    }

    fn inline_providers(&self, signatures: &SignatureInput, church: &ChurchSettings) -> Vec<Box<dyn SignatureProvider>> {
        vec![
            Box::new(InlineSignature::new(SignatureSource::Drawn, signatures.drawn.clone())),
            Box::new(InlineSignature::new(SignatureSource::Uploaded, signatures.uploaded.clone())),
            Box::new(StoredSignature::new(
                SignatureSource::Church,
                Arc::clone(&self.storage),
                self.config.signatures_bucket.clone(),
                church.signature_path.clone(),
            )),
        ]
    }

    /// Generate, store and record the receipt of a ledger entry.
    ///
    /// Refused with [`ReceiptError::AlreadyGenerated`] once the entry has a
    /// stored receipt. A number already claimed by a reimbursement or by
    /// an earlier failed attempt is reused, and the file a failed attempt
    /// may have left at that number's path is overwritten.
    pub async fn generate_receipt(&self, entry_id: &str, signatures: &SignatureInput) -> Result<GeneratedReceipt> {
        let entry = self.load_entry(entry_id).await?;
        let church = self.church_settings(&entry.owner_id).await?;

        if entry.receipt.pdf_path.is_some() {
            let number = match (entry.receipt.doc_number, entry.receipt.year) {
                (Some(number), Some(year)) => DocumentNumber { number, year }.to_string(),
                _ => "unknown number".to_string(),
            };
            return Err(ReceiptError::AlreadyGenerated {
                entry_id: entry.id.clone(),
                number,
            }
            .into());
        }

        let (number, fresh) = self.claim_number(&entry).await?;

        let providers = self.inline_providers(signatures, &church);
        let resolved = resolve_signature(&providers).await;
        if resolved.is_none() {
            info!("No signature available for receipt {}", number);
        }
        let signature_source = resolved.as_ref().map(|(s, _)| *s);

        let document = ReceiptDocument {
            kind: ReceiptKind::Receipt,
            church_name: church.church_name.clone(),
            church_tax_id: church.church_tax_id.clone(),
            number,
            body: ReceiptKind::Receipt.body(
                &church.church_name,
                entry.effective_amount(),
                &entry.description,
                entry.effective_date(),
            ),
            signature: resolved.map(|(_, image)| image),
            signer_name: church.responsible_name.clone(),
            signer_document: Some(church.responsible_tax_id.clone()),
        };
        let rendered = render(&document, &self.config)?;

        let path = receipt_path(&entry.owner_id, &entry.id, number);
        let bucket = &self.config.receipts_bucket;
        if fresh {
            self.storage.upload(bucket, &path, rendered.bytes, "application/pdf").await?;
        } else {
            self.storage.replace(bucket, &path, rendered.bytes, "application/pdf").await?;
        }
        info!("Uploaded receipt {} to {}/{}", number, self.config.receipts_bucket, path);

        let fields = ReceiptFields {
            doc_number: Some(number.number),
            year: Some(number.year),
            pdf_path: Some(path.clone()),
            generated_at: Some(Utc::now()),
        };
        if let Err(e) = self.store.update_receipt_fields(&entry.id, &fields).await {
            warn!(
                "Receipt {} stored at {} but entry {} was not updated: {}",
                number, path, entry.id, e
            );
            return Err(e.into());
        }

        Ok(GeneratedReceipt {
            path,
            number,
            signature: signature_source,
        })
    }

    /// Build a reimbursement document for a ledger entry.
    ///
    /// The chosen beneficiary signs and is named in the footer; without one
    /// the church's responsible party does. The entry's number is reused
    /// when present, otherwise one is claimed and recorded on the entry.
    pub async fn generate_reimbursement(
        &self,
        entry_id: &str,
        beneficiary_id: Option<&str>,
        signatures: &SignatureInput,
    ) -> Result<Reimbursement> {
        let entry = self.load_entry(entry_id).await?;
        let church = self.church_settings(&entry.owner_id).await?;

        let beneficiary: Option<Beneficiary> = match beneficiary_id.filter(|id| !id.is_empty()) {
            Some(id) => match self.store.get_beneficiary(id).await? {
                Some(b) if b.owner_id == entry.owner_id => Some(b),
                Some(_) => {
                    warn!(
                        "Beneficiary {} does not belong to owner {}, signing as the church",
                        id, entry.owner_id
                    );
                    None
                }
                None => {
                    warn!("Beneficiary {} not found, signing as the church", id);
                    None
                }
            },
            None => None,
        };

        let (number, _) = self.claim_number(&entry).await?;

        let mut providers: Vec<Box<dyn SignatureProvider>> = Vec::new();
        if let Some(b) = &beneficiary {
            providers.push(Box::new(BeneficiarySignature::new(
                Arc::clone(&self.storage),
                self.config.signatures_bucket.clone(),
                entry.owner_id.clone(),
                b.id.clone(),
                b.signature_path.clone(),
            )));
        }
        providers.extend(self.inline_providers(signatures, &church));
        let resolved = resolve_signature(&providers).await;
        let signature_source = resolved.as_ref().map(|(s, _)| *s);

        let (signer_name, signer_document) = match &beneficiary {
            Some(b) => (b.name.clone(), b.document.clone()),
            None => (church.responsible_name.clone(), Some(church.responsible_tax_id.clone())),
        };

        let document = ReceiptDocument {
            kind: ReceiptKind::Reimbursement,
            church_name: church.church_name.clone(),
            church_tax_id: church.church_tax_id.clone(),
            number,
            body: ReceiptKind::Reimbursement.body(
                &church.church_name,
                entry.effective_amount(),
                &entry.description,
                entry.effective_date(),
            ),
            signature: resolved.map(|(_, image)| image),
            signer_name: signer_name.clone(),
            signer_document,
        };
        let rendered = render(&document, &self.config)?;
        info!("Built reimbursement {} for entry {}", number, entry.id);

        Ok(Reimbursement {
            bytes: rendered.bytes,
            number,
            signer_name,
            signature: signature_source,
        })
    }

    /// URL of a stored receipt: signed when possible, public otherwise.
    pub async fn open_receipt(&self, entry_id: &str) -> Result<String> {
        let entry = self.load_entry(entry_id).await?;
        let path = entry
            .receipt
            .pdf_path
            .ok_or_else(|| ReceiptError::NotGenerated(entry_id.to_string()))?;

        let bucket = &self.config.receipts_bucket;
        match self
            .storage
            .create_signed_url(bucket, &path, self.config.signed_url_ttl_secs)
            .await
        {
            Ok(url) => Ok(url),
            Err(e) => {
                warn!("Signing {} failed, using public URL: {}", path, e);
                Ok(self.storage.public_url(bucket, &path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TesourariaError, TransportError};
    use crate::models::ledger::fixtures::{entry, paid_entry};
    use crate::models::registry::fixtures::church;
    use crate::receipt::render::{page_operators, page_strings};
    use crate::receipt::signature::fixtures::png_rgba;
    use crate::store::{MemoryStorage, MemoryStore};
    use pretty_assertions::assert_eq;

    struct Harness {
        store: Arc<MemoryStore>,
        storage: Arc<MemoryStorage>,
        service: ReceiptService,
    }

    fn harness(store: MemoryStore) -> Harness {
        let store = Arc::new(store);
        let storage = Arc::new(MemoryStorage::default());
        let service = ReceiptService::new(
            store.clone(),
            store.clone(),
            storage.clone(),
            ReceiptConfig::default(),
        );
        Harness {
            store,
            storage,
            service,
        }
    }

    fn text_of(bytes: &[u8]) -> String {
        page_strings(bytes).join(" ")
    }

    fn has_image(bytes: &[u8]) -> bool {
        page_operators(bytes).iter().any(|op| op == "Do")
    }

    #[tokio::test]
    async fn test_paid_entry_receipt_end_to_end() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));

        let generated = h
            .service
            .generate_receipt("e1", &SignatureInput::default())
            .await
            .unwrap();

        assert_eq!(generated.number.to_string(), "000001/2024");
        assert_eq!(generated.path, "owner-1/e1/2024-000001.pdf");
        assert_eq!(generated.signature, None);

        let (bytes, content_type) = h.storage.get("recibos", &generated.path).unwrap();
        assert_eq!(content_type, "application/pdf");
        let text = text_of(&bytes);
        assert!(text.contains("RECEIPT No. 000001/2024"));
        assert!(text.contains("R$ 150.00"));
        assert!(text.contains("Conta de luz"));
        assert!(text.contains("10/03/2024"));
        assert!(text.contains("CNPJ: 11.222.333/0001-81"));
        assert!(!has_image(&bytes));

        let stored = h.store.get_entry("e1").await.unwrap().unwrap();
        assert_eq!(stored.receipt.doc_number, Some(1));
        assert_eq!(stored.receipt.year, Some(2024));
        assert_eq!(stored.receipt.pdf_path.as_deref(), Some("owner-1/e1/2024-000001.pdf"));
        assert!(stored.receipt.generated_at.is_some());
        assert!(stored.is_locked());
    }

    #[tokio::test]
    async fn test_second_generation_is_refused_without_allocating() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));
        h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();

        let err = h
            .service
            .generate_receipt("e1", &SignatureInput::default())
            .await
            .unwrap_err();
        match err {
            TesourariaError::Receipt(ReceiptError::AlreadyGenerated { entry_id, number }) => {
                assert_eq!(entry_id, "e1");
                assert_eq!(number, "000001/2024");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(h.store.allocation_count(), 1);
        assert_eq!(h.storage.paths("recibos").len(), 1);
    }

    #[tokio::test]
    async fn test_numbers_increase_per_owner_and_year() {
        let mut store = MemoryStore::new().with_settings(church());
        for i in 1..=5 {
            store = store.with_entry(paid_entry(&format!("e{}", i)));
        }
        let h = harness(store);

        let mut numbers = Vec::new();
        for i in 1..=5 {
            let generated = h
                .service
                .generate_receipt(&format!("e{}", i), &SignatureInput::default())
                .await
                .unwrap();
            numbers.push(generated.number.number);
        }
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_missing_settings_is_configuration_error() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")));
        let err = h
            .service
            .generate_receipt("e1", &SignatureInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TesourariaError::Receipt(ReceiptError::Configuration(_))));
        assert_eq!(h.store.allocation_count(), 0);
        assert!(h.storage.paths("recibos").is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_settings_is_configuration_error() {
        let mut settings = church();
        settings.responsible_name = "  ".to_string();
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(settings));
        let err = h
            .service
            .generate_receipt("e1", &SignatureInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TesourariaError::Receipt(ReceiptError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_unknown_entry() {
        let h = harness(MemoryStore::new().with_settings(church()));
        let err = h
            .service
            .generate_receipt("nope", &SignatureInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TesourariaError::Receipt(ReceiptError::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_upload_records_no_path_and_retry_reuses_number() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));
        h.storage.fail_uploads(true);

        let err = h
            .service
            .generate_receipt("e1", &SignatureInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TesourariaError::Transport(TransportError::Storage(_))));
        let stored = h.store.get_entry("e1").await.unwrap().unwrap();
        assert_eq!(stored.receipt.pdf_path, None);

        h.storage.fail_uploads(false);
        let generated = h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();
        assert_eq!(generated.number.number, 1);
        assert_eq!(h.store.allocation_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failed_update_overwrites_stored_file() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));
        h.store.fail_receipt_updates(true);

        let err = h
            .service
            .generate_receipt("e1", &SignatureInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TesourariaError::Transport(TransportError::Store(_))));
        assert_eq!(h.storage.paths("recibos"), vec!["owner-1/e1/2024-000001.pdf".to_string()]);
        let stored = h.store.get_entry("e1").await.unwrap().unwrap();
        assert_eq!(stored.receipt.pdf_path, None);

        h.store.fail_receipt_updates(false);
        let generated = h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();
        assert_eq!(generated.number.to_string(), "000001/2024");
        assert_eq!(generated.path, "owner-1/e1/2024-000001.pdf");
        assert_eq!(h.store.allocation_count(), 1);
        assert_eq!(h.storage.paths("recibos").len(), 1);
        let stored = h.store.get_entry("e1").await.unwrap().unwrap();
        assert_eq!(stored.receipt.pdf_path, Some(generated.path));
    }

    #[tokio::test]
    async fn test_open_entry_uses_due_date_and_nominal_amount() {
        let h = harness(MemoryStore::new().with_entry(entry("e1")).with_settings(church()));
        let generated = h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();
        let (bytes, _) = h.storage.get("recibos", &generated.path).unwrap();
        assert!(text_of(&bytes).contains("05/03/2024"));
    }

    #[tokio::test]
    async fn test_drawn_signature_beats_church_signature() {
        let mut settings = church();
        settings.signature_path = Some("assinaturas/owner-1/igreja.png".to_string());
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(settings));
        h.storage.put("Assinaturas", "assinaturas/owner-1/igreja.png", png_rgba(20, 10), "image/png");

        let input = SignatureInput {
            drawn: Some(png_rgba(40, 10)),
            uploaded: None,
        };
        let generated = h.service.generate_receipt("e1", &input).await.unwrap();
        assert_eq!(generated.signature, Some(SignatureSource::Drawn));
        let (bytes, _) = h.storage.get("recibos", &generated.path).unwrap();
        assert!(has_image(&bytes));
    }

    #[tokio::test]
    async fn test_church_signature_used_when_nothing_supplied() {
        let mut settings = church();
        settings.signature_path = Some("assinaturas/owner-1/igreja.png".to_string());
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(settings));
        h.storage.put("Assinaturas", "assinaturas/owner-1/igreja.png", png_rgba(20, 10), "image/png");

        let generated = h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();
        assert_eq!(generated.signature, Some(SignatureSource::Church));
    }

    #[tokio::test]
    async fn test_undecodable_signature_is_skipped() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));
        let input = SignatureInput {
            drawn: Some(b"not an image".to_vec()),
            uploaded: None,
        };
        let generated = h.service.generate_receipt("e1", &input).await.unwrap();
        assert_eq!(generated.signature, None);
    }

    #[tokio::test]
    async fn test_reimbursement_reuses_receipt_number() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));
        h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();

        let doc = h
            .service
            .generate_reimbursement("e1", None, &SignatureInput::default())
            .await
            .unwrap();
        assert_eq!(doc.number.to_string(), "000001/2024");
        assert_eq!(doc.signer_name, "João da Silva");
        assert_eq!(h.store.allocation_count(), 1);

        let text = text_of(&doc.bytes);
        assert!(text.contains("REIMBURSEMENT No. 000001/2024"));
        assert!(text.contains("reimbursement in the amount of R$ 150.00"));
        assert!(text.contains("CPF: 111.444.777-35"));
    }

    #[tokio::test]
    async fn test_reimbursement_allocates_and_records_number_without_upload() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));

        let doc = h
            .service
            .generate_reimbursement("e1", None, &SignatureInput::default())
            .await
            .unwrap();
        assert_eq!(doc.number.number, 1);
        assert!(h.storage.paths("recibos").is_empty());

        let stored = h.store.get_entry("e1").await.unwrap().unwrap();
        assert_eq!(stored.receipt.doc_number, Some(1));
        assert_eq!(stored.receipt.pdf_path, None);

        let generated = h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();
        assert_eq!(generated.number.number, 1);
        assert_eq!(h.store.allocation_count(), 1);
    }

    #[tokio::test]
    async fn test_reimbursement_signed_by_beneficiary() {
        let beneficiary = Beneficiary::new("b1", "owner-1", "Maria Souza").with_document("52998224725");
        let mut settings = church();
        settings.signature_path = Some("assinaturas/owner-1/igreja.png".to_string());
        let h = harness(
            MemoryStore::new()
                .with_entry(paid_entry("e1"))
                .with_settings(settings)
                .with_beneficiary(beneficiary),
        );
        h.storage.put("Assinaturas", "assinaturas/owner-1/igreja.png", png_rgba(20, 10), "image/png");
        h.storage.put(
            "Assinaturas",
            "assinaturas/owner-1/beneficiarios/b1-1700000000.png",
            png_rgba(30, 10),
            "image/png",
        );

        let input = SignatureInput {
            drawn: Some(png_rgba(10, 10)),
            uploaded: None,
        };
        let doc = h.service.generate_reimbursement("e1", Some("b1"), &input).await.unwrap();
        assert_eq!(doc.signature, Some(SignatureSource::Beneficiary));
        assert_eq!(doc.signer_name, "Maria Souza");
        let text = text_of(&doc.bytes);
        assert!(text.contains("Maria Souza"));
        assert!(text.contains("CPF: 529.982.247-25"));
        assert!(has_image(&doc.bytes));
    }

    #[tokio::test]
    async fn test_reimbursement_without_beneficiary_signature_falls_back() {
        let beneficiary = Beneficiary::new("b1", "owner-1", "Maria Souza");
        let h = harness(
            MemoryStore::new()
                .with_entry(paid_entry("e1"))
                .with_settings(church())
                .with_beneficiary(beneficiary),
        );
        let input = SignatureInput {
            drawn: None,
            uploaded: Some(png_rgba(10, 10)),
        };
        let doc = h.service.generate_reimbursement("e1", Some("b1"), &input).await.unwrap();
        assert_eq!(doc.signature, Some(SignatureSource::Uploaded));
        assert_eq!(doc.signer_name, "Maria Souza");
    }

    #[tokio::test]
    async fn test_reimbursement_ignores_beneficiary_of_another_owner() {
        let beneficiary = Beneficiary::new("b9", "owner-2", "Pedro Alves").with_document("52998224725");
        let h = harness(
            MemoryStore::new()
                .with_entry(paid_entry("e1"))
                .with_settings(church())
                .with_beneficiary(beneficiary),
        );
        h.storage.put(
            "Assinaturas",
            "assinaturas/owner-2/beneficiarios/b9-1700000000.png",
            png_rgba(30, 10),
            "image/png",
        );

        let doc = h
            .service
            .generate_reimbursement("e1", Some("b9"), &SignatureInput::default())
            .await
            .unwrap();
        assert_eq!(doc.signer_name, "João da Silva");
        assert_eq!(doc.signature, None);
        let text = text_of(&doc.bytes);
        assert!(!text.contains("Pedro Alves"));
        assert!(text.contains("CPF: 111.444.777-35"));
    }

    #[tokio::test]
    async fn test_open_receipt_signed_url() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")).with_settings(church()));
        let generated = h.service.generate_receipt("e1", &SignatureInput::default()).await.unwrap();
        let url = h.service.open_receipt("e1").await.unwrap();
        assert!(url.contains("/object/sign/recibos/"));
        assert!(url.contains(&generated.path));
        assert!(url.ends_with("expires_in=600"));
    }

    #[tokio::test]
    async fn test_open_receipt_falls_back_to_public_url() {
        let mut e = paid_entry("e1");
        e.receipt.pdf_path = Some("owner-1/e1/2024-000009.pdf".to_string());
        let h = harness(MemoryStore::new().with_entry(e).with_settings(church()));
        let url = h.service.open_receipt("e1").await.unwrap();
        assert_eq!(url, "memory://storage/object/public/recibos/owner-1/e1/2024-000009.pdf");
    }

    #[tokio::test]
    async fn test_open_receipt_not_generated() {
        let h = harness(MemoryStore::new().with_entry(paid_entry("e1")));
        let err = h.service.open_receipt("e1").await.unwrap_err();
        assert!(matches!(err, TesourariaError::Receipt(ReceiptError::NotGenerated(_))));
    }
}
