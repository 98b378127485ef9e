//! Record store, sequence allocator and object storage over the hosted
//! platform's REST interfaces (`/rest/v1` and `/storage/v1`).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tesouraria_core::models::{
    Beneficiary, Category, CategoryKind, ChurchSettings, ClassificationRule, EntryKind,
    EntryStatus, LedgerEntry, NewLedgerEntry, NewRule, ReceiptFields, RuleOrder, RuleScope,
    ServerConfig,
};
use tesouraria_core::store::{
    Claim, ObjectStorage, RecordStore, SequenceAllocator, StoreResult, StoredObject,
};
use tesouraria_core::TransportError;
use tracing::{debug, trace};

/// Authenticated HTTP access to the platform.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    key: String,
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Client for the configured platform, if both URL and key are set.
    pub fn from_config(server: &ServerConfig) -> Option<Self> {
        let url = server.store_url.as_deref().filter(|s| !s.trim().is_empty())?;
        let key = server.store_key.as_deref().filter(|s| !s.trim().is_empty())?;
        Some(Self::new(url, key))
    }

    fn rest(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn storage(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn get(&self, url: String) -> RequestBuilder {
        self.authed(self.http.get(url))
    }

    fn post(&self, url: String) -> RequestBuilder {
        self.authed(self.http.post(url))
    }

    fn patch(&self, url: String) -> RequestBuilder {
        self.authed(self.http.patch(url))
    }

    fn delete(&self, url: String) -> RequestBuilder {
        self.authed(self.http.delete(url))
    }
}

type Wrap = fn(String) -> TransportError;

/// Send a request and map transport or status failures.
async fn send(request: RequestBuilder, wrap: Wrap) -> StoreResult<Response> {
    let response = request.send().await.map_err(|e| wrap(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(TransportError::Permission(format!("{}: {}", status, body)))
        }
        _ => Err(wrap(format!("{}: {}", status, body))),
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder, wrap: Wrap) -> StoreResult<T> {
    send(request, wrap)
        .await?
        .json()
        .await
        .map_err(|e| wrap(e.to_string()))
}

/// `in.(...)` filter value with each item double-quoted.
fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

#[derive(Debug, Deserialize)]
struct LancamentoRow {
    id: String,
    user_id: String,
    descricao: String,
    valor: Decimal,
    vencimento: NaiveDate,
    tipo: EntryKind,
    #[serde(default)]
    status: EntryStatus,
    categoria_id: String,
    #[serde(default)]
    beneficiario_id: Option<String>,
    #[serde(default)]
    data_pagamento: Option<NaiveDate>,
    #[serde(default)]
    valor_pago: Option<Decimal>,
    #[serde(default)]
    recibo_numero: Option<u32>,
    #[serde(default)]
    recibo_ano: Option<i32>,
    #[serde(default)]
    recibo_pdf_path: Option<String>,
    #[serde(default)]
    recibo_gerado_em: Option<DateTime<Utc>>,
    #[serde(default)]
    boleto_url: Option<String>,
    #[serde(default)]
    comprovante_url: Option<String>,
}

impl From<LancamentoRow> for LedgerEntry {
    fn from(row: LancamentoRow) -> Self {
        LedgerEntry {
            id: row.id,
            owner_id: row.user_id,
            description: row.descricao,
            amount: row.valor,
            due_date: row.vencimento,
            kind: row.tipo,
            status: row.status,
            category_id: row.categoria_id,
            beneficiary_id: row.beneficiario_id,
            payment_date: row.data_pagamento,
            paid_amount: row.valor_pago,
            receipt: ReceiptFields {
                doc_number: row.recibo_numero,
                year: row.recibo_ano,
                pdf_path: row.recibo_pdf_path,
                generated_at: row.recibo_gerado_em,
            },
            boleto_url: row.boleto_url,
            proof_url: row.comprovante_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewLancamentoRow<'a> {
    user_id: &'a str,
    tipo: EntryKind,
    status: EntryStatus,
    categoria_id: &'a str,
    descricao: &'a str,
    valor: Decimal,
    vencimento: NaiveDate,
}

impl<'a> From<&'a NewLedgerEntry> for NewLancamentoRow<'a> {
    fn from(entry: &'a NewLedgerEntry) -> Self {
        Self {
            user_id: &entry.owner_id,
            tipo: entry.kind,
            status: EntryStatus::Open,
            categoria_id: &entry.category_id,
            descricao: &entry.description,
            valor: entry.amount,
            vencimento: entry.due_date,
        }
    }
}

/// Receipt columns, written together so a patch always overwrites all four.
#[derive(Debug, Serialize)]
struct ReceiptPatch<'a> {
    recibo_numero: Option<u32>,
    recibo_ano: Option<i32>,
    recibo_pdf_path: Option<&'a str>,
    recibo_gerado_em: Option<DateTime<Utc>>,
}

impl<'a> From<&'a ReceiptFields> for ReceiptPatch<'a> {
    fn from(fields: &'a ReceiptFields) -> Self {
        Self {
            recibo_numero: fields.doc_number,
            recibo_ano: fields.year,
            recibo_pdf_path: fields.pdf_path.as_deref(),
            recibo_gerado_em: fields.generated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    id: String,
    user_id: String,
    #[serde(default)]
    term: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default)]
    beneficiary_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RuleRow> for ClassificationRule {
    fn from(row: RuleRow) -> Self {
        ClassificationRule {
            id: row.id,
            owner_id: row.user_id,
            term: row.term.unwrap_or_default(),
            category_id: row.category_id,
            beneficiary_id: row.beneficiary_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewRuleRow<'a> {
    user_id: &'a str,
    term: &'a str,
    category_id: Option<&'a str>,
    beneficiary_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BeneficiaryRow {
    id: String,
    user_id: String,
    name: String,
    #[serde(default)]
    documento: Option<String>,
    #[serde(default)]
    telefone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    observacoes: Option<String>,
    #[serde(default)]
    assinatura_path: Option<String>,
}

impl From<BeneficiaryRow> for Beneficiary {
    fn from(row: BeneficiaryRow) -> Self {
        let beneficiary = Beneficiary {
            phone: row.telefone,
            email: row.email,
            notes: row.observacoes,
            signature_path: row.assinatura_path.filter(|p| !p.trim().is_empty()),
            ..Beneficiary::new(row.id, row.user_id, row.name)
        };
        match row.documento {
            Some(doc) => beneficiary.with_document(&doc),
            None => beneficiary,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChurchSettingsRow {
    user_id: String,
    #[serde(default)]
    igreja_nome: Option<String>,
    #[serde(default)]
    igreja_cnpj: Option<String>,
    #[serde(default)]
    responsavel_nome: Option<String>,
    #[serde(default)]
    responsavel_cpf: Option<String>,
    #[serde(default)]
    assinatura_path: Option<String>,
}

impl From<ChurchSettingsRow> for ChurchSettings {
    fn from(row: ChurchSettingsRow) -> Self {
        ChurchSettings {
            owner_id: row.user_id,
            church_name: row.igreja_nome.unwrap_or_default(),
            church_tax_id: row.igreja_cnpj.unwrap_or_default(),
            responsible_name: row.responsavel_nome.unwrap_or_default(),
            responsible_tax_id: row.responsavel_cpf.unwrap_or_default(),
            signature_path: row.assinatura_path,
        }
    }
}

impl From<&ChurchSettings> for ChurchSettingsRow {
    fn from(settings: &ChurchSettings) -> Self {
        let settings = settings.normalized();
        ChurchSettingsRow {
            user_id: settings.owner_id,
            igreja_nome: Some(settings.church_name),
            igreja_cnpj: Some(settings.church_tax_id),
            responsavel_nome: Some(settings.responsible_name),
            responsavel_cpf: Some(settings.responsible_tax_id),
            assinatura_path: settings.signature_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: String,
    user_id: String,
    name: String,
    tipo: CategoryKind,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            owner_id: row.user_id,
            name: row.name,
            kind: row.tipo,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClaimRow {
    numero: u32,
    ano: i32,
    novo: bool,
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Rows and sequences stored in the platform's database.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: RestClient,
}

impl RestStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn first<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<Option<T>> {
        let rows: Vec<T> = send_json(request, TransportError::Store).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl SequenceAllocator for RestStore {
    async fn next_receipt_number(&self, owner_id: &str, year: i32) -> StoreResult<u32> {
        let request = self
            .client
            .post(self.client.rest("rpc/next_receipt_number"))
            .json(&json!({ "p_user_id": owner_id, "p_year": year }));
        let number: u32 = send_json(request, TransportError::Sequence).await?;
        debug!("Allocated receipt number {} for {}/{}", number, owner_id, year);
        Ok(number)
    }

    async fn claim_receipt_number(&self, owner_id: &str, entry_id: &str, year: i32) -> StoreResult<Claim> {
        let request = self
            .client
            .post(self.client.rest("rpc/claim_receipt_number"))
            .json(&json!({ "p_user_id": owner_id, "p_lancamento_id": entry_id, "p_year": year }));
        let row: ClaimRow = send_json(request, TransportError::Sequence).await?;
        Ok(Claim {
            number: row.numero,
            year: row.ano,
            fresh: row.novo,
        })
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn get_entry(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        let request = self
            .client
            .get(self.client.rest("lancamentos"))
            .query(&[("select", "*".to_string()), ("id", eq(id))]);
        Ok(self.first::<LancamentoRow>(request).await?.map(Into::into))
    }

    async fn update_receipt_fields(&self, id: &str, fields: &ReceiptFields) -> StoreResult<()> {
        let request = self
            .client
            .patch(self.client.rest("lancamentos"))
            .query(&[("id", eq(id))])
            .json(&ReceiptPatch::from(fields));
        send(request, TransportError::Store).await?;
        Ok(())
    }

    async fn find_entries_by_description(
        &self,
        owner_id: &str,
        descriptions: &[String],
    ) -> StoreResult<Vec<LedgerEntry>> {
        if descriptions.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.client.get(self.client.rest("lancamentos")).query(&[
            ("select", "*".to_string()),
            ("user_id", eq(owner_id)),
            ("descricao", in_list(descriptions)),
        ]);
        let rows: Vec<LancamentoRow> = send_json(request, TransportError::Store).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_entries(&self, entries: &[NewLedgerEntry]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewLancamentoRow<'_>> = entries.iter().map(Into::into).collect();
        let request = self.client.post(self.client.rest("lancamentos")).json(&rows);
        send(request, TransportError::Store).await?;
        Ok(())
    }

    async fn list_rules(&self, scope: &RuleScope, order: RuleOrder) -> StoreResult<Vec<ClassificationRule>> {
        let direction = match order {
            RuleOrder::NewestFirst => "created_at.desc",
            RuleOrder::OldestFirst => "created_at.asc",
        };
        let mut query = vec![("select", "*".to_string()), ("order", direction.to_string())];
        if let RuleScope::User(owner_id) = scope {
            query.push(("user_id", eq(owner_id)));
        }
        let request = self.client.get(self.client.rest("classification_rules")).query(&query);
        let rows: Vec<RuleRow> = send_json(request, TransportError::Store).await?;
        trace!("Loaded {} rules for {:?}", rows.len(), scope);
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_rule(&self, rule: &NewRule) -> StoreResult<ClassificationRule> {
        let row = NewRuleRow {
            user_id: &rule.owner_id,
            term: &rule.term,
            category_id: rule.category_id.as_deref(),
            beneficiary_id: rule.beneficiary_id.as_deref(),
        };
        let request = self
            .client
            .post(self.client.rest("classification_rules"))
            .header("Prefer", "return=representation")
            .json(&row);
        self.first::<RuleRow>(request)
            .await?
            .map(Into::into)
            .ok_or_else(|| TransportError::Store("insert returned no row".to_string()))
    }

    async fn delete_rule(&self, id: &str) -> StoreResult<()> {
        let request = self
            .client
            .delete(self.client.rest("classification_rules"))
            .query(&[("id", eq(id))]);
        send(request, TransportError::Store).await?;
        Ok(())
    }

    async fn list_beneficiaries(&self, owner_id: &str) -> StoreResult<Vec<Beneficiary>> {
        let request = self.client.get(self.client.rest("beneficiaries")).query(&[
            ("select", "*".to_string()),
            ("user_id", eq(owner_id)),
        ]);
        let rows: Vec<BeneficiaryRow> = send_json(request, TransportError::Store).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_beneficiary(&self, id: &str) -> StoreResult<Option<Beneficiary>> {
        let request = self
            .client
            .get(self.client.rest("beneficiaries"))
            .query(&[("select", "*".to_string()), ("id", eq(id))]);
        Ok(self.first::<BeneficiaryRow>(request).await?.map(Into::into))
    }

    async fn get_church_settings(&self, owner_id: &str) -> StoreResult<Option<ChurchSettings>> {
        let request = self
            .client
            .get(self.client.rest("church_settings"))
            .query(&[("select", "*".to_string()), ("user_id", eq(owner_id))]);
        Ok(self.first::<ChurchSettingsRow>(request).await?.map(Into::into))
    }

    async fn upsert_church_settings(&self, settings: &ChurchSettings) -> StoreResult<()> {
        let request = self
            .client
            .post(self.client.rest("church_settings"))
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&ChurchSettingsRow::from(settings));
        send(request, TransportError::Store).await?;
        Ok(())
    }

    async fn find_category_by_name(&self, owner_id: &str, name: &str) -> StoreResult<Option<Category>> {
        let request = self.client.get(self.client.rest("categories")).query(&[
            ("select", "id,user_id,name,tipo".to_string()),
            ("user_id", eq(owner_id)),
            ("name", format!("ilike.{}", name)),
        ]);
        Ok(self.first::<CategoryRow>(request).await?.map(Into::into))
    }
}

#[derive(Debug, Deserialize)]
struct SignedUrlBody {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// Buckets in the platform's object storage.
#[derive(Debug, Clone)]
pub struct RestStorage {
    client: RestClient,
}

impl RestStorage {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> StoreResult<()> {
        let request = self
            .client
            .post(self.client.storage(&format!("object/{}/{}", bucket, path)))
            .header("x-upsert", if upsert { "true" } else { "false" })
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        send(request, TransportError::Storage).await?;
        debug!("Uploaded {}/{} (upsert: {})", bucket, path, upsert);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for RestStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        self.put_object(bucket, path, bytes, content_type, false).await
    }

    async fn replace(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        self.put_object(bucket, path, bytes, content_type, true).await
    }

    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u64) -> StoreResult<String> {
        let request = self
            .client
            .post(self.client.storage(&format!("object/sign/{}/{}", bucket, path)))
            .json(&json!({ "expiresIn": ttl_secs }));
        let body: SignedUrlBody = send_json(request, TransportError::Storage).await?;
        let relative = body.signed_url.trim_start_matches('/');
        Ok(self.client.storage(relative))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.client.storage(&format!("object/public/{}/{}", bucket, path))
    }

    async fn download(&self, bucket: &str, path: &str) -> StoreResult<Vec<u8>> {
        let url = self.create_signed_url(bucket, path, 60).await?;
        let response = send(self.client.http.get(url), TransportError::Storage).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Storage(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<StoredObject>> {
        let request = self
            .client
            .post(self.client.storage(&format!("object/list/{}", bucket)))
            .json(&json!({
                "prefix": prefix,
                "limit": 100,
                "offset": 0,
                "sortBy": { "column": "updated_at", "order": "desc" },
            }));
        send_json(request, TransportError::Storage).await
    }
}
