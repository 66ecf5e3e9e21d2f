use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::allocation::{Allocation, AllocationLine, SkipReason, SkippedSymbol};
use crate::models::symbol::SymbolRecord;

/// A symbol that passed screening, with the price the computation uses.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Eligible<'a> {
    pub record: &'a SymbolRecord,
    pub price: f64,
}

/// Split symbols into those that can be bought and those that can't.
///
/// A symbol is skipped when its price is not a positive number or its
/// weight is negative / not a number. Input order is preserved.
pub(crate) fn screen<'a, F>(
    symbols: &'a [SymbolRecord],
    price_of: F,
) -> (Vec<Eligible<'a>>, Vec<SkippedSymbol>)
where
    F: Fn(&SymbolRecord) -> f64,
{
    let mut eligible = Vec::with_capacity(symbols.len());
    let mut skipped = Vec::new();

    for record in symbols {
        let price = price_of(record);
        let reason = if !record.weight.is_finite() || record.weight < 0.0 {
            Some(SkipReason::InvalidWeight)
        } else if !price.is_finite() || price <= 0.0 {
            Some(SkipReason::NonPositivePrice)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                warn!(symbol = %record.symbol, %reason, "Skipping symbol");
                skipped.push(SkippedSymbol {
                    symbol: record.symbol.clone(),
                    reason,
                });
            }
            None => eligible.push(Eligible { record, price }),
        }
    }

    (eligible, skipped)
}

/// Index weights rescaled so the eligible symbols sum to 1.
///
/// The list usually covers only the top of the index; if it covers 90%,
/// each weight is multiplied by 1/0.9. All zeros when no weight is positive.
pub(crate) fn normalized_weights(eligible: &[Eligible<'_>]) -> Vec<f64> {
    let total: f64 = eligible.iter().map(|e| e.record.weight).sum();
    eligible
        .iter()
        .map(|e| if total > 0.0 { e.record.weight / total } else { 0.0 })
        .collect()
}

/// Splits a cash budget across index constituents in proportion to their weights.
///
/// Pure business logic: no I/O, no shared state.
pub struct AllocationService;

impl AllocationService {
    pub fn new() -> Self {
        Self
    }

    /// Compute how many whole shares of each symbol to buy with `amount`.
    ///
    /// For every eligible symbol `quantity = floor(amount × w / price)` where
    /// `w` is the normalized weight, so `quantity × price` never exceeds the
    /// symbol's share of the budget and misses it by less than one share.
    ///
    /// - `amount <= 0` → empty allocation
    /// - non-finite `amount` → `ValidationError`
    /// - bad price / weight → symbol listed in `skipped`, others still allocated
    pub fn allocate(&self, amount: f64, symbols: &[SymbolRecord]) -> Result<Allocation, CoreError> {
        if !amount.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Investment amount must be a number, got {amount}"
            )));
        }
        if amount <= 0.0 {
            debug!(amount, "Non-positive investment amount, nothing to allocate");
            return Ok(Allocation::empty(amount));
        }

        let (eligible, skipped) = screen(symbols, |s| s.buy_price);
        let weights = normalized_weights(&eligible);

        let lines = eligible
            .iter()
            .zip(&weights)
            .map(|(e, w)| {
                let budget = amount * w;
                let quantity = (budget / e.price).floor().max(0.0) as u64;
                AllocationLine {
                    symbol: e.record.symbol.clone(),
                    weight: e.record.weight,
                    target_weight: w * 100.0,
                    price: e.price,
                    quantity,
                    amount: quantity as f64 * e.price,
                }
            })
            .collect();

        Ok(Allocation {
            total_amount: amount,
            lines,
            skipped,
        })
    }
}

impl Default for AllocationService {
    fn default() -> Self {
        Self::new()
    }
}
