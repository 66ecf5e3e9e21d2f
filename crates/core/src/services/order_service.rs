use tracing::debug;

use crate::errors::CoreError;
use crate::models::order::{FeeSchedule, Order, OrderPlan, OrderRequest};
use crate::models::symbol::SymbolRecord;

use super::allocation_service::{normalized_weights, screen};
use super::round_cents;

/// Plans buy orders that move existing holdings towards index weights.
///
/// Unlike [`AllocationService`](super::allocation_service::AllocationService),
/// the planner knows what is already held and what the broker charges:
///
/// 1. Each symbol gets a budget: first what it lacks to reach its weight in
///    the post-investment portfolio, then any leftover split by weight.
///    If the gaps exceed the new cash, they are scaled down to fit.
/// 2. Budgets too small to buy more than the minimum order value are given
///    up (smallest weights first) and handed to the other symbols.
/// 3. Orders are executed from the most expensive share down; the change
///    left by whole-share rounding flows to the symbols not yet executed.
///
/// The sum of all order values never exceeds the investment amount.
pub struct OrderService;

impl OrderService {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, request: &OrderRequest, symbols: &[SymbolRecord]) -> Result<OrderPlan, CoreError> {
        Self::validate_request(request)?;

        let price_of = |s: &SymbolRecord| request.prices.get(&s.symbol).copied().unwrap_or(s.buy_price);
        let (eligible, skipped) = screen(symbols, price_of);
        let weights = normalized_weights(&eligible);

        let held: Vec<f64> = eligible
            .iter()
            .map(|e| request.holdings.get(&e.record.symbol).copied().unwrap_or(0.0))
            .collect();
        let values: Vec<f64> = eligible.iter().zip(&held).map(|(e, q)| e.price * q).collect();

        let amount = request.invest_amount.max(0.0);
        let actual_portfolio: f64 = values.iter().sum();
        let target_portfolio = actual_portfolio + amount;

        let mut budgets = Self::initial_budgets(amount, target_portfolio, &weights, &values);
        debug!(actual_portfolio, target_portfolio, ?budgets, "Budgets after first pass");

        let prices: Vec<f64> = eligible.iter().map(|e| e.price).collect();
        let mut by_weight: Vec<usize> = (0..eligible.len()).collect();
        by_weight.sort_by(|&a, &b| {
            eligible[a]
                .record
                .weight
                .total_cmp(&eligible[b].record.weight)
                .then_with(|| eligible[a].record.symbol.cmp(&eligible[b].record.symbol))
        });
        Self::drop_small_orders(&mut budgets, &prices, &by_weight, &request.fees);
        debug!(?budgets, "Budgets after minimum order pass");

        let mut by_price: Vec<usize> = (0..eligible.len()).collect();
        by_price.sort_by(|&a, &b| {
            prices[b]
                .total_cmp(&prices[a])
                .then_with(|| eligible[a].record.symbol.cmp(&eligible[b].record.symbol))
        });

        let mut executed = vec![(0_u64, 0.0_f64); eligible.len()];
        for &idx in &by_price {
            let budget = std::mem::take(&mut budgets[idx]);
            let (quantity, value) = Self::execute(budget, prices[idx], &request.fees);
            executed[idx] = (quantity, value);
            redistribute(&mut budgets, budget - value);
        }

        let mut orders: Vec<Order> = eligible
            .iter()
            .enumerate()
            .map(|(idx, e)| Order {
                symbol: e.record.symbol.clone(),
                weight: e.record.weight,
                target_weight: weights[idx] * 100.0,
                current_quantity: held[idx],
                buy_price: e.price,
                buy_quantity: executed[idx].0,
                order_value: executed[idx].1,
            })
            .collect();
        orders.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        Ok(OrderPlan {
            invest_amount: amount,
            actual_portfolio,
            target_portfolio,
            orders,
            skipped,
        })
    }

    fn validate_request(request: &OrderRequest) -> Result<(), CoreError> {
        if !request.invest_amount.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Investment amount must be a number, got {}",
                request.invest_amount
            )));
        }
        let fees = &request.fees;
        if !fees.percent.is_finite() || !(0.0..100.0).contains(&fees.percent) {
            return Err(CoreError::ValidationError(format!(
                "Transaction fee must be in [0, 100), got {}",
                fees.percent
            )));
        }
        if !fees.fixed.is_finite() || fees.fixed < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Fixed fee must be non-negative, got {}",
                fees.fixed
            )));
        }
        if !fees.minimum_order_value.is_finite() || fees.minimum_order_value < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Minimum order value must be non-negative, got {}",
                fees.minimum_order_value
            )));
        }
        if let Some((symbol, quantity)) = request
            .holdings
            .iter()
            .find(|(_, q)| !q.is_finite() || **q < 0.0)
        {
            return Err(CoreError::ValidationError(format!(
                "Holding of {symbol} must be non-negative, got {quantity}"
            )));
        }
        Ok(())
    }

    /// First pass: how much of the new cash each symbol should receive.
    fn initial_budgets(amount: f64, target_portfolio: f64, weights: &[f64], values: &[f64]) -> Vec<f64> {
        if amount <= 0.0 || weights.iter().all(|w| *w <= 0.0) {
            return vec![0.0; weights.len()];
        }

        let deficits: Vec<f64> = weights
            .iter()
            .zip(values)
            .map(|(w, v)| (target_portfolio * w - v).max(0.0))
            .collect();
        let total_deficit: f64 = deficits.iter().sum();

        if total_deficit <= amount {
            let extra = amount - total_deficit;
            deficits.iter().zip(weights).map(|(d, w)| d + extra * w).collect()
        } else {
            let scale = amount / total_deficit;
            deficits.iter().map(|d| d * scale).collect()
        }
    }

    /// Second pass: give up budgets that can't buy more than the minimum order.
    fn drop_small_orders(budgets: &mut [f64], prices: &[f64], order: &[usize], fees: &FeeSchedule) {
        for &idx in order {
            let budget = budgets[idx];
            if budget <= 0.0 {
                continue;
            }
            let whole_shares = (budget / prices[idx]).floor() * prices[idx];
            if whole_shares <= fees.minimum_order_value {
                budgets[idx] = 0.0;
                redistribute(budgets, budget);
            }
        }
    }

    /// Quantity and fee-inclusive value of the order a budget can pay for.
    fn execute(budget: f64, price: f64, fees: &FeeSchedule) -> (u64, f64) {
        let rate = fees.rate();
        let net = ((budget - fees.fixed) * (1.0 - rate)).max(0.0);
        let cost = |quantity: u64| round_cents(quantity as f64 * price * (1.0 + rate) + fees.fixed);

        let mut quantity = (net / price).floor() as u64;
        // Rounding to cents may push the order a fraction over its budget
        while quantity > 0 && cost(quantity) > budget {
            quantity -= 1;
        }

        if quantity == 0 {
            return (0, 0.0);
        }
        let value = cost(quantity);
        if value <= fees.minimum_order_value {
            return (0, 0.0);
        }
        (quantity, value)
    }
}

impl Default for OrderService {
    fn default() -> Self {
        Self::new()
    }
}

/// Spread `amount` over the positive budgets, proportionally to their size.
/// Nothing happens when no budget is positive; the cash stays unspent.
fn redistribute(budgets: &mut [f64], amount: f64) {
    if amount <= 0.0 {
        return;
    }
    let total: f64 = budgets.iter().filter(|b| **b > 0.0).sum();
    if total <= 0.0 {
        return;
    }
    for budget in budgets.iter_mut().filter(|b| **b > 0.0) {
        *budget += amount * (*budget / total);
    }
}
