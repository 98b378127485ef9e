//! Configuration structures for classification, receipts and the HTTP functions.

use serde::{Deserialize, Serialize};

/// Main configuration for tesouraria.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesourariaConfig {
    /// Text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Receipt and reimbursement document configuration.
    pub receipt: ReceiptConfig,

    /// HTTP function configuration.
    pub server: ServerConfig,
}

/// How document bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategyKind {
    /// Latin-1 surface, then raw stream scan.
    #[default]
    Heuristic,
    /// Full PDF parser, falling back to the heuristic.
    Parser,
}

/// Text extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Strategy used for non-text content types.
    pub strategy: ExtractionStrategyKind,

    /// Below this many characters the decoded surface is considered useless.
    pub min_surface_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategyKind::Heuristic,
            min_surface_len: 20,
        }
    }
}

/// Receipt and reimbursement document configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Bucket receiving generated receipt PDFs.
    pub receipts_bucket: String,

    /// Bucket holding church and beneficiary signature images.
    pub signatures_bucket: String,

    /// Lifetime of signed URLs, in seconds.
    pub signed_url_ttl_secs: u64,

    /// Page width in points (A4 by default).
    pub page_width: f32,

    /// Page height in points.
    pub page_height: f32,

    /// Left/right/top margin in points.
    pub margin: f32,

    /// Church name font size.
    pub title_size: f32,

    /// Receipt number font size.
    pub number_size: f32,

    /// Body paragraph font size.
    pub body_size: f32,

    /// Largest box the signature image is scaled into (width, height).
    pub signature_box: (f32, f32),
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            receipts_bucket: "recibos".to_string(),
            signatures_bucket: "Assinaturas".to_string(),
            signed_url_ttl_secs: 600,
            page_width: 595.28,
            page_height: 841.89,
            margin: 56.0,
            title_size: 18.0,
            number_size: 14.0,
            body_size: 12.0,
            signature_box: (200.0, 80.0),
        }
    }
}

impl ReceiptConfig {
    /// Width available to the body paragraph.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

/// HTTP function configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the functions listen on.
    pub bind: String,

    /// Base URL of the hosted data platform.
    pub store_url: Option<String>,

    /// Service key for the hosted data platform.
    pub store_key: Option<String>,

    /// WhatsApp provider base URL.
    pub whatsapp_base_url: Option<String>,

    /// WhatsApp provider token.
    pub whatsapp_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8787".to_string(),
            store_url: None,
            store_key: None,
            whatsapp_base_url: None,
            whatsapp_token: None,
        }
    }
}

impl ServerConfig {
    /// Fill unset credentials from the environment.
    pub fn with_env(mut self) -> Self {
        fn env(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }
        self.store_url = self.store_url.or_else(|| env("SUPABASE_URL"));
        self.store_key = self.store_key.or_else(|| env("SUPABASE_SERVICE_ROLE_KEY"));
        self.whatsapp_base_url = self.whatsapp_base_url.or_else(|| env("UAZAPI_BASE_URL"));
        self.whatsapp_token = self.whatsapp_token.or_else(|| env("UAZAPI_TOKEN"));
        self
    }
}

impl TesourariaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: TesourariaConfig =
            serde_json::from_str(r#"{"receipt": {"receipts_bucket": "docs"}}"#).unwrap();
        assert_eq!(config.receipt.receipts_bucket, "docs");
        assert_eq!(config.receipt.signatures_bucket, "Assinaturas");
        assert_eq!(config.extraction.min_surface_len, 20);
        assert_eq!(config.server.bind, "0.0.0.0:8787");
    }

    #[test]
    fn test_content_width() {
        let receipt = ReceiptConfig::default();
        assert!((receipt.content_width() - (595.28 - 112.0)).abs() < 0.001);
    }
}
