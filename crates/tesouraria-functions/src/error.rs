//! Error types for the HTTP functions.

use axum::http::StatusCode;
use tesouraria_core::{TesourariaError, TransportError};
use thiserror::Error;

/// Failure inside a handler, before it is turned into a JSON envelope.
#[derive(Error, Debug)]
pub enum FunctionError {
    /// Required request fields are missing.
    #[error("{0}")]
    BadRequest(String),

    /// Credentials or collaborators are not configured.
    #[error("{0}")]
    Misconfigured(String),

    /// The request body is not JSON.
    #[error("invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] TesourariaError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A call to an upstream HTTP service failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl FunctionError {
    /// Status code used in the error envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            FunctionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
