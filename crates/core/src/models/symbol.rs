use serde::{Deserialize, Serialize};

/// One row of the index profile: the constituent's identity and its
/// index-calculation factors, as published by the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConstituent {
    /// Ticker symbol, uppercased (e.g., "TLV", "SNP", "H2O")
    pub symbol: String,

    /// Issuer name as listed by the exchange
    pub company: String,

    /// Number of shares outstanding
    pub shares: u64,

    pub free_float_factor: f64,
    pub representation_factor: f64,
    pub price_correction_factor: f64,

    /// Index weight in percent (0..=100)
    pub weight: f64,
}

/// Market data for a single symbol, as published by a quote source.
///
/// Fields a source does not publish stay at `0.0` / `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolQuote {
    /// Last traded price, used as the default buy price
    pub buy_price: f64,
    pub open_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub medium_price: f64,
    /// Daily price variation in percent
    pub variation: f64,
    /// Dividend yield in percent
    pub dividend_yield: f64,
    /// Traded volume (shares)
    pub volume: u64,
}

/// A fully collected index constituent: profile data merged with market data.
///
/// Field names match the persisted `symbols-data.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub symbol: String,
    /// Index weight in percent
    pub weight: f64,
    #[serde(default)]
    pub open_price: f64,
    #[serde(default)]
    pub buy_price: f64,
    #[serde(default)]
    pub variation: f64,
    #[serde(default)]
    pub medium_price: f64,
    #[serde(default)]
    pub min_price: f64,
    #[serde(default)]
    pub max_price: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub free_float_factor: f64,
    #[serde(default)]
    pub representation_factor: f64,
    #[serde(default)]
    pub price_correction_factor: f64,
}

impl SymbolRecord {
    /// Build a record from the index profile row and the symbol's quote.
    pub fn from_parts(constituent: IndexConstituent, quote: SymbolQuote) -> Self {
        Self {
            symbol: constituent.symbol,
            weight: constituent.weight,
            open_price: quote.open_price,
            buy_price: quote.buy_price,
            variation: quote.variation,
            medium_price: quote.medium_price,
            min_price: quote.min_price,
            max_price: quote.max_price,
            dividend_yield: quote.dividend_yield,
            volume: quote.volume,
            shares: constituent.shares,
            company: constituent.company,
            free_float_factor: constituent.free_float_factor,
            representation_factor: constituent.representation_factor,
            price_correction_factor: constituent.price_correction_factor,
        }
    }

    /// Minimal record with just a symbol, weight and buy price.
    /// Other fields are zero / empty.
    pub fn priced(symbol: impl Into<String>, weight: f64, buy_price: f64) -> Self {
        let symbol = symbol.into().to_uppercase();
        Self {
            company: symbol.clone(),
            symbol,
            weight,
            open_price: 0.0,
            buy_price,
            variation: 0.0,
            medium_price: 0.0,
            min_price: 0.0,
            max_price: 0.0,
            dividend_yield: 0.0,
            volume: 0,
            shares: 0,
            free_float_factor: 0.0,
            representation_factor: 0.0,
            price_correction_factor: 0.0,
        }
    }

    /// All published prices of this record.
    pub fn prices(&self) -> [f64; 5] {
        [
            self.open_price,
            self.buy_price,
            self.min_price,
            self.max_price,
            self.medium_price,
        ]
    }
}

impl std::fmt::Display for SymbolRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.2}% @ {:.4})", self.symbol, self.weight, self.buy_price)
    }
}
