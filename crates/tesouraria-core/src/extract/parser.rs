//! Full PDF text extraction via `pdf-extract`.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::debug;

use super::ExtractionStrategy;

/// Parse the document properly instead of scraping streams.
///
/// `pdf-extract` panics on some malformed files; a panic is treated the
/// same as an error.
pub struct PdfParserStrategy;

impl ExtractionStrategy for PdfParserStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Option<String> {
        if !bytes.starts_with(b"%PDF") {
            return None;
        }
        let result = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));
        match result {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                debug!("pdf-extract failed: {:?}", e);
                None
            }
            Err(_) => {
                debug!("pdf-extract panicked");
                None
            }
        }
    }
}
