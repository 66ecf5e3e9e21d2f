use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::symbol::SymbolQuote;

use super::bvb_details::BvbDetailsProvider;
use super::tradeville::TradevilleProvider;
use super::traits::QuoteSource;

/// Registry of quote sources, queried in registration order.
///
/// New sources can be added without modifying the collector.
pub struct QuoteSourceRegistry {
    sources: Vec<Box<dyn QuoteSource>>,
}

impl QuoteSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with the default sources pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // BVB mobile details page (primary)
        registry.register(Box::new(BvbDetailsProvider::new()));

        // Tradeville quotation table (fallback)
        registry.register(Box::new(TradevilleProvider::new()));

        registry
    }

    /// Register a new quote source.
    pub fn register(&mut self, source: Box<dyn QuoteSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Names of all registered sources, in priority order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Fetch a quote, falling back to the next source on failure.
    /// Returns the last error if every source fails.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::NoProvider(format!("quote for {symbol}")));
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.fetch_quote(symbol).await {
                Ok(quote) => {
                    debug!(symbol, source = source.name(), "Quote fetched");
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(symbol, source = source.name(), error = %e, "Quote source failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(format!("quote for {symbol}"))))
    }
}

impl Default for QuoteSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
