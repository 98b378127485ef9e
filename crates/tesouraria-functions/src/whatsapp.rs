//! `POST /whatsapp-send-message`: relay a text message to the WhatsApp
//! provider.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tesouraria_core::models::ServerConfig;
use tracing::{error, info};

use crate::AppState;
use crate::error::FunctionError;

/// Brazilian country calling code.
pub const COUNTRY_CODE: &str = "55";

/// Provider endpoint and token.
#[derive(Debug, Clone, Default)]
pub struct WhatsAppSettings {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl WhatsAppSettings {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            token: Some(token.into()),
        }
    }

    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            base_url: server.whatsapp_base_url.clone(),
            token: server.whatsapp_token.clone(),
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let base = self.base_url.as_deref().filter(|s| !s.trim().is_empty())?;
        let token = self.token.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((base.trim_end_matches('/'), token))
    }
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    #[serde(default)]
    numero: Option<String>,
    #[serde(default)]
    mensagem: Option<String>,
}

/// Keep only digits and prefix the country code unless already present.
pub fn format_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        format!("{}{}", COUNTRY_CODE, digits)
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Handler for the WhatsApp route.
pub async fn send_message(State(state): State<AppState>, body: Bytes) -> Response {
    let Some((base_url, token)) = state.whatsapp.credentials() else {
        error!("Missing WhatsApp provider credentials");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "WhatsApp provider not configured".to_string(),
        );
    };

    match relay(&state.http, base_url, token, &body).await {
        Ok(response) => response,
        Err(err) => {
            if err.status() == StatusCode::INTERNAL_SERVER_ERROR {
                error!("WhatsApp relay failed: {}", err);
            }
            error_response(err.status(), err.to_string())
        }
    }
}

async fn relay(http: &reqwest::Client, base_url: &str, token: &str, body: &[u8]) -> Result<Response, FunctionError> {
    let request: SendRequest = serde_json::from_slice(body)?;
    let (Some(numero), Some(mensagem)) = (
        request.numero.filter(|s| !s.is_empty()),
        request.mensagem.filter(|s| !s.is_empty()),
    ) else {
        return Err(FunctionError::BadRequest(
            "numero and mensagem are required".to_string(),
        ));
    };

    let number = format_number(&numero);
    info!("Sending WhatsApp message to {}", number);

    let upstream = http
        .post(format!("{}/send/text", base_url))
        .header("token", token)
        .json(&json!({ "number": number, "text": mensagem }))
        .send()
        .await?;
    let status = upstream.status();
    let result: Value = upstream.json().await?;
    info!("Provider answered {}: {}", status, result);

    if !status.is_success() {
        error!("Provider rejected message: {}", result);
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Ok((status, Json(json!({ "error": "failed to send message", "details": result }))).into_response());
    }

    Ok((StatusCode::OK, Json(json!({ "success": true, "result": result }))).into_response())
}
