//! HTTP functions for the church treasury.
//!
//! - `POST /analisar-comprovante` classifies a payment proof by URL
//! - `POST /whatsapp-send-message` relays a text message to the WhatsApp provider
//!
//! Both routes are CORS-open and answer `OPTIONS` with `200 ok`. Handlers
//! never fail past the boundary: every outcome is a JSON envelope with an
//! explicit status code.

pub mod classifier;
pub mod cors;
pub mod error;
pub mod remote;
pub mod whatsapp;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use tesouraria_core::models::{RuleOrder, ServerConfig, TesourariaConfig};
use tesouraria_core::store::RecordStore;
use tesouraria_core::TextExtractor;
use tracing::{info, warn};

pub use error::FunctionError;
pub use remote::{RestClient, RestStorage, RestStore};
pub use whatsapp::{WhatsAppSettings, format_number};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Source of rules and beneficiaries; `None` when no credentials are set.
    pub store: Option<Arc<dyn RecordStore>>,
    pub extractor: Arc<TextExtractor>,
    pub rule_order: RuleOrder,
    pub http: reqwest::Client,
    pub whatsapp: WhatsAppSettings,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn RecordStore>>,
        extractor: TextExtractor,
        whatsapp: WhatsAppSettings,
    ) -> Self {
        Self {
            store,
            extractor: Arc::new(extractor),
            rule_order: RuleOrder::default(),
            http: reqwest::Client::new(),
            whatsapp,
        }
    }

    /// Use a preconfigured HTTP client for outbound calls.
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Build state from configuration, talking to the hosted platform when
    /// its URL and key are known.
    pub fn from_config(config: &TesourariaConfig) -> Self {
        let server = config.server.clone().with_env();
        let store: Option<Arc<dyn RecordStore>> = match RestClient::from_config(&server) {
            Some(client) => Some(Arc::new(RestStore::new(client))),
            None => {
                warn!("No record store credentials; the classifier will answer 500");
                None
            }
        };
        Self::new(
            store,
            TextExtractor::from_config(&config.extraction),
            WhatsAppSettings::from_config(&server),
        )
    }
}

/// Router with both functions mounted.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route(
            "/analisar-comprovante",
            post(classifier::analyze)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        .route(
            "/whatsapp-send-message",
            post(whatsapp::send_message).options(cors::preflight),
        )
        .with_state(state);
    cors::allow_all(router)
}

/// Listen on the configured address until the process is stopped.
pub async fn serve(server: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
