use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::allocation::SkippedSymbol;

/// Broker fees applied to every order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Commission in percent of the order value
    pub percent: f64,
    /// Flat fee added to every executed order
    pub fixed: f64,
    /// Orders worth this much or less (fees included) are not placed
    pub minimum_order_value: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            percent: 0.49,
            fixed: 1.49,
            minimum_order_value: 310.0,
        }
    }
}

impl FeeSchedule {
    /// Commission as a fraction (0.49% → 0.0049).
    pub fn rate(&self) -> f64 {
        self.percent / 100.0
    }
}

/// Input of the order planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// New cash to invest
    pub invest_amount: f64,
    #[serde(default)]
    pub fees: FeeSchedule,
    /// Shares already held, by symbol
    #[serde(default)]
    pub holdings: HashMap<String, f64>,
    /// Buy prices overriding the collected last price, by symbol
    #[serde(default)]
    pub prices: HashMap<String, f64>,
}

impl OrderRequest {
    pub fn new(invest_amount: f64, fees: FeeSchedule) -> Self {
        Self {
            invest_amount,
            fees,
            ..Self::default()
        }
    }

    pub fn with_holding(mut self, symbol: &str, quantity: f64) -> Self {
        self.holdings.insert(symbol.to_uppercase(), quantity);
        self
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_uppercase(), price);
        self
    }
}

/// The order for one symbol. Zero orders are kept so the table stays complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    /// Index weight as published, in percent
    pub weight: f64,
    /// Weight rescaled over the planned symbols, in percent
    pub target_weight: f64,
    pub current_quantity: f64,
    pub buy_price: f64,
    pub buy_quantity: u64,
    /// Cash needed for the order, fees included, rounded to 2 decimals
    pub order_value: f64,
}

/// Result of the order planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub invest_amount: f64,
    /// Market value of the current holdings
    pub actual_portfolio: f64,
    /// `actual_portfolio + invest_amount`
    pub target_portfolio: f64,
    /// Sorted by symbol
    pub orders: Vec<Order>,
    pub skipped: Vec<SkippedSymbol>,
}

impl OrderPlan {
    /// Cash spent on all orders, fees included.
    #[must_use]
    pub fn invested(&self) -> f64 {
        self.orders.iter().map(|o| o.order_value).sum()
    }

    #[must_use]
    pub fn cash_left(&self) -> f64 {
        (self.invest_amount - self.invested()).max(0.0)
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Order> {
        let upper = symbol.to_uppercase();
        self.orders.iter().find(|o| o.symbol == upper)
    }

    /// Orders with a non-zero quantity.
    pub fn placed(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.buy_quantity > 0)
    }
}
