use serde::{Deserialize, Serialize};

/// Why a symbol was left out of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Price is zero, negative or not a number
    NonPositivePrice,
    /// Weight is negative or not a number
    InvalidWeight,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NonPositivePrice => write!(f, "non-positive price"),
            SkipReason::InvalidWeight => write!(f, "invalid weight"),
        }
    }
}

/// A symbol excluded from the computation, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Suggested purchase for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub symbol: String,
    /// Index weight as published, in percent
    pub weight: f64,
    /// Weight rescaled over the allocated symbols, in percent
    pub target_weight: f64,
    pub price: f64,
    /// Whole shares to buy
    pub quantity: u64,
    /// `quantity × price`
    pub amount: f64,
}

/// A purchase plan mapping a cash budget to per-symbol share quantities.
/// Derived on every request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// The budget the plan was computed for
    pub total_amount: f64,
    /// One line per allocated symbol, in input order
    pub lines: Vec<AllocationLine>,
    pub skipped: Vec<SkippedSymbol>,
}

impl Allocation {
    /// An allocation with no purchases.
    pub fn empty(total_amount: f64) -> Self {
        Self {
            total_amount,
            lines: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Sum of all line amounts.
    #[must_use]
    pub fn invested(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Cash not spent because of whole-share rounding.
    #[must_use]
    pub fn cash_left(&self) -> f64 {
        (self.total_amount - self.invested()).max(0.0)
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&AllocationLine> {
        let upper = symbol.to_uppercase();
        self.lines.iter().find(|l| l.symbol == upper)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
