use std::path::Path;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::snapshot::SymbolSnapshot;
use crate::models::symbol::{IndexConstituent, SymbolRecord};
use crate::providers::bvb_index::BvbIndexProvider;
use crate::providers::registry::QuoteSourceRegistry;
use crate::providers::traits::IndexSource;
use crate::storage::manager::StorageManager;

use super::round_cents;

/// Collects the index composition and per-symbol quotes into a snapshot.
///
/// A run is all-or-nothing: the first network, parse or validation failure
/// aborts it, and nothing is written.
pub struct CollectorService {
    index: Box<dyn IndexSource>,
    quotes: QuoteSourceRegistry,
}

impl CollectorService {
    pub fn new(index: Box<dyn IndexSource>, quotes: QuoteSourceRegistry) -> Self {
        Self { index, quotes }
    }

    /// BVB index profile + the default quote sources.
    pub fn with_defaults() -> Self {
        Self::new(
            Box::new(BvbIndexProvider::new()),
            QuoteSourceRegistry::new_with_defaults(),
        )
    }

    /// Fetch the first `limit` constituents and their quotes.
    pub async fn collect(&self, limit: usize) -> Result<SymbolSnapshot, CoreError> {
        if limit == 0 {
            return Err(CoreError::ValidationError(
                "Symbols list size must be at least 1".into(),
            ));
        }

        info!(
            source = self.index.name(),
            quotes = ?self.quotes.source_names(),
            limit,
            "Collecting index constituents"
        );
        let constituents = self.index.fetch_constituents(limit).await?;
        if constituents.is_empty() {
            return Err(CoreError::Api {
                provider: self.index.name().to_string(),
                message: "No index constituents found".into(),
            });
        }

        let constituents = cap_weights(constituents);
        let mut records = Vec::with_capacity(constituents.len());
        for constituent in constituents {
            let quote = self.quotes.fetch_quote(&constituent.symbol).await?;
            debug!(symbol = %constituent.symbol, price = quote.buy_price, "Collected symbol");
            records.push(SymbolRecord::from_parts(constituent, quote));
        }

        let snapshot = SymbolSnapshot::new(records);
        snapshot.validate()?;

        info!(
            symbols = snapshot.len(),
            total_weight = snapshot.total_weight(),
            "Collection finished"
        );
        Ok(snapshot)
    }

    /// Collect and replace the snapshot stored at `path`.
    /// The previous file is left untouched when anything fails.
    pub async fn collect_to_file(&self, limit: usize, path: &Path) -> Result<SymbolSnapshot, CoreError> {
        let snapshot = self.collect(limit).await?;
        StorageManager::save_to_file(&snapshot, path).await?;
        info!(path = %path.display(), "Snapshot saved");
        Ok(snapshot)
    }
}

/// Round weights to 2 decimals and cap them so the running total never
/// passes 100%. The exchange occasionally publishes weights summing to more.
pub fn cap_weights(mut constituents: Vec<IndexConstituent>) -> Vec<IndexConstituent> {
    let mut remaining = 100.0;
    for constituent in &mut constituents {
        let weight = round_cents(constituent.weight).clamp(0.0, remaining);
        constituent.weight = weight;
        remaining = round_cents(remaining - weight).max(0.0);
    }
    constituents
}
