//! `POST /analisar-comprovante`: suggest a category and beneficiary for a
//! payment proof given by URL.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tesouraria_core::models::RuleScope;
use tesouraria_core::{ClassificationResult, ComprovanteClassifier, TextExtractor};
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::error::FunctionError;

/// Validated request fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRequest {
    pub source_url: String,
    pub user_id: String,
    pub description: String,
}

impl ClassifyRequest {
    /// Read the request from a JSON body. `file_url` wins over `url`;
    /// empty or non-string values count as missing.
    pub fn from_value(body: &Value) -> Result<Self, FunctionError> {
        let text = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let source_url = text("file_url").or_else(|| text("url"));
        let user_id = text("user_id");
        match (source_url, user_id) {
            (Some(source_url), Some(user_id)) => Ok(Self {
                source_url,
                user_id,
                description: text("descricao").unwrap_or_default(),
            }),
            _ => Err(FunctionError::BadRequest(
                "missing url/file_url or user_id".to_string(),
            )),
        }
    }
}

/// Rule suggestion as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionBody {
    pub categoria_id: Option<String>,
    pub beneficiario_id: Option<String>,
    pub motivo: String,
}

/// Successful classification envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub success: bool,
    pub sugestao: Option<SuggestionBody>,
    pub recebedor_nome: Option<String>,
    pub beneficiario_id: Option<String>,
}

impl From<ClassificationResult> for ClassifyResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            success: true,
            sugestao: result.suggestion.map(|s| SuggestionBody {
                categoria_id: s.category_id,
                beneficiario_id: s.beneficiary_id,
                motivo: s.reason,
            }),
            recebedor_nome: result.receiver_name,
            beneficiario_id: result.beneficiary_id,
        }
    }
}

fn failure(err: &FunctionError) -> Response {
    let status = err.status();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Classifier failed: {}", err);
    }
    (status, Json(json!({ "success": false, "error": err.to_string() }))).into_response()
}

/// Handler for the classifier route.
pub async fn analyze(State(state): State<AppState>, body: Bytes) -> Response {
    match run(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => failure(&err),
    }
}

async fn run(state: &AppState, body: &[u8]) -> Result<ClassifyResponse, FunctionError> {
    let value: Value = serde_json::from_slice(body)?;
    let request = ClassifyRequest::from_value(&value)?;

    let text = fetch_corpus(&state.http, state.extractor.clone(), &request.source_url).await;
    debug!("Corpus for {} has {} chars", request.source_url, text.len());

    let store = state
        .store
        .as_ref()
        .ok_or_else(|| FunctionError::Misconfigured("record store not configured".to_string()))?;

    let scope = RuleScope::User(request.user_id.clone());
    let rules = store.list_rules(&scope, state.rule_order).await.unwrap_or_else(|e| {
        warn!("Could not load rules for {}: {}", request.user_id, e);
        Vec::new()
    });
    let beneficiaries = store.list_beneficiaries(&request.user_id).await.unwrap_or_else(|e| {
        warn!("Could not load beneficiaries for {}: {}", request.user_id, e);
        Vec::new()
    });

    let result = ComprovanteClassifier::new(rules, beneficiaries).classify(&text, &request.description);
    info!(
        "Classified {} for {}: rule={}, beneficiary={:?}",
        request.source_url,
        request.user_id,
        result.suggestion.is_some(),
        result.beneficiary_id
    );
    Ok(result.into())
}

/// Fetch the document and turn it into text. Every failure degrades to the
/// lowercased URL so classification can still run on it.
pub async fn fetch_corpus(http: &reqwest::Client, extractor: Arc<TextExtractor>, url: &str) -> String {
    let fetched = async {
        let response = http.get(url).send().await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.bytes().await?;
        Ok::<_, reqwest::Error>((content_type, bytes))
    }
    .await;

    let (content_type, bytes) = match fetched {
        Ok(parts) => parts,
        Err(e) => {
            warn!("Fetching {} failed: {}", url, e);
            return TextExtractor::url_fallback(url);
        }
    };

    let source = url.to_string();
    let extracted = tokio::task::spawn_blocking(move || {
        extractor.extract_text(&bytes, &content_type, &source)
    })
    .await;
    match extracted {
        Ok(text) => text,
        Err(e) => {
            warn!("Text extraction for {} aborted: {}", url, e);
            TextExtractor::url_fallback(url)
        }
    }
}
