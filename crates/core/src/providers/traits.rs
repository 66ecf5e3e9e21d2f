use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::symbol::{IndexConstituent, SymbolQuote};

/// A source of index composition data (the constituents and their weights).
///
/// The collector needs exactly one of these. Swapping the exchange or the
/// page layout means replacing only the implementation.
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the first `limit` constituents, in index order.
    async fn fetch_constituents(&self, limit: usize) -> Result<Vec<IndexConstituent>, CoreError>;
}

/// A source of per-symbol market data.
///
/// Several may be registered; the registry tries them in order until one
/// returns a quote.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest quote for `symbol`.
    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, CoreError>;
}
