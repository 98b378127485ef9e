//! Best-effort conversion of fetched document bytes into searchable text.
//!
//! Extraction never fails: every strategy is optional and the lowercased
//! source URL is the last-resort corpus, so filename hints survive even
//! when nothing else does.

#[cfg(feature = "parser")]
mod parser;
mod stream_scan;

#[cfg(feature = "parser")]
pub use parser::PdfParserStrategy;
pub use stream_scan::scan_streams;

use tracing::debug;

use crate::models::config::{ExtractionConfig, ExtractionStrategyKind};

/// One way of turning raw bytes into text.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract text, or `None` when this strategy has nothing useful.
    fn extract(&self, bytes: &[u8]) -> Option<String>;
}

/// Decode bytes as Latin-1, which maps every byte to a char and so never
/// fails. Too-short surfaces are rejected.
pub struct Latin1Surface {
    pub min_len: usize,
}

/// Decode bytes one-to-one as Latin-1.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

impl ExtractionStrategy for Latin1Surface {
    fn name(&self) -> &'static str {
        "latin1"
    }

    fn extract(&self, bytes: &[u8]) -> Option<String> {
        let surface = latin1(bytes);
        (surface.chars().count() >= self.min_len).then_some(surface)
    }
}

/// Inflate raw PDF streams.
pub struct StreamScan;

impl ExtractionStrategy for StreamScan {
    fn name(&self) -> &'static str {
        "stream-scan"
    }

    fn extract(&self, bytes: &[u8]) -> Option<String> {
        let text = scan_streams(bytes);
        (!text.is_empty()).then_some(text)
    }
}

/// Ordered chain of extraction strategies.
pub struct TextExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl TextExtractor {
    /// Latin-1 surface first, raw stream scan when it is too short.
    pub fn heuristic(min_surface_len: usize) -> Self {
        Self {
            strategies: vec![
                Box::new(Latin1Surface {
                    min_len: min_surface_len,
                }),
                Box::new(StreamScan),
            ],
        }
    }

    /// Build the chain selected in configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut extractor = Self::heuristic(config.min_surface_len);
        if config.strategy == ExtractionStrategyKind::Parser {
            #[cfg(feature = "parser")]
            extractor.strategies.insert(0, Box::new(PdfParserStrategy));
            #[cfg(not(feature = "parser"))]
            tracing::warn!("PDF parser strategy requested but the `parser` feature is disabled");
        }
        extractor
    }

    /// Use a custom strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Turn fetched bytes into text.
    ///
    /// `text/*` content is decoded as UTF-8. Anything else goes through the
    /// strategy chain; when no strategy succeeds, a non-empty Latin-1
    /// surface is kept, and failing that the lowercased source URL.
    pub fn extract_text(&self, bytes: &[u8], content_type: &str, source_url: &str) -> String {
        if content_type.trim().to_ascii_lowercase().starts_with("text/") {
            return String::from_utf8_lossy(bytes).into_owned();
        }

        for strategy in &self.strategies {
            if let Some(text) = strategy.extract(bytes) {
                debug!("Extracted {} chars with {}", text.len(), strategy.name());
                return text;
            }
        }

        if !bytes.is_empty() {
            debug!("No strategy succeeded, keeping short latin1 surface");
            return latin1(bytes);
        }

        debug!("No text extracted, falling back to source URL");
        source_url.to_lowercase()
    }

    /// Fallback corpus when the document could not even be fetched.
    pub fn url_fallback(source_url: &str) -> String {
        source_url.to_lowercase()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
