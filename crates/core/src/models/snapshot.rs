use chrono::{NaiveDateTime, SubsecRound, Utc};
use chrono_tz::Europe::Bucharest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::CoreError;

use super::symbol::SymbolRecord;

/// The full result of one collector run. Replaced wholesale on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    /// Exchange-local wall-clock time of the collector run.
    /// `None` for files written before the timestamp was recorded.
    pub updated_at: Option<NaiveDateTime>,

    /// Index constituents, in index order (largest weight first).
    pub symbols: Vec<SymbolRecord>,
}

impl Default for SymbolSnapshot {
    fn default() -> Self {
        Self {
            updated_at: None,
            symbols: Vec::new(),
        }
    }
}

impl SymbolSnapshot {
    pub fn new(symbols: Vec<SymbolRecord>) -> Self {
        Self {
            updated_at: Some(Self::exchange_now()),
            symbols,
        }
    }

    /// Current wall-clock time at the Bucharest Stock Exchange, to the second.
    pub fn exchange_now() -> NaiveDateTime {
        Utc::now().with_timezone(&Bucharest).naive_local().trunc_subsecs(0)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The first `size` symbols (all of them if `size` exceeds the list).
    #[must_use]
    pub fn first(&self, size: usize) -> &[SymbolRecord] {
        &self.symbols[..size.min(self.symbols.len())]
    }

    /// Find a symbol (case-insensitive).
    #[must_use]
    pub fn find(&self, symbol: &str) -> Option<&SymbolRecord> {
        let upper = symbol.to_uppercase();
        self.symbols.iter().find(|s| s.symbol == upper)
    }

    /// Sum of the index weights of all symbols, in percent.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.symbols.iter().map(|s| s.weight).sum()
    }

    /// Check the record invariants before a snapshot replaces the stored one.
    ///
    /// Rules:
    /// - Symbol codes and company names are unique
    /// - Weights are finite and non-negative
    /// - Prices are finite and non-negative
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut symbols = HashSet::new();
        let mut companies = HashSet::new();

        for record in &self.symbols {
            if record.symbol.is_empty() {
                return Err(CoreError::ValidationError("Empty symbol code".into()));
            }
            if !symbols.insert(record.symbol.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate symbol {}",
                    record.symbol
                )));
            }
            if !record.company.is_empty() && !companies.insert(record.company.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate company {} ({})",
                    record.company, record.symbol
                )));
            }
            if !record.weight.is_finite() || record.weight < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Invalid weight {} for {}",
                    record.weight, record.symbol
                )));
            }
            if record.prices().iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(CoreError::ValidationError(format!(
                    "Negative or invalid price for {}",
                    record.symbol
                )));
            }
        }

        Ok(())
    }
}
