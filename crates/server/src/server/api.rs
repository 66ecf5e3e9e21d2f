use axum::{
    extract::{Path, Query, State},
    Json,
};
use bet_etf_core::models::allocation::Allocation;
use bet_etf_core::models::order::{FeeSchedule, OrderPlan, OrderRequest};
use bet_etf_core::models::symbol::SymbolRecord;
use bet_etf_core::storage::format::DATE_FORMAT;
use bet_etf_core::storage::manager::StorageManager;
use bet_etf_core::EtfCalculator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub symbols: usize,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolsQuery {
    pub size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub updated_at: Option<String>,
    pub symbols: Vec<SymbolRecord>,
}

#[derive(Debug, Deserialize)]
pub struct AllocationBody {
    pub amount: f64,
    #[serde(default)]
    pub size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllocationResponse {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub invested: f64,
    pub cash_left: f64,
}

/// Body of `POST /api/orders`. Omitted fees fall back to the server settings.
#[derive(Debug, Deserialize)]
pub struct OrdersBody {
    pub invest_amount: f64,
    /// Percent
    pub transaction_fee: Option<f64>,
    pub fixed_fee: Option<f64>,
    pub minimum_order_value: Option<f64>,
    pub size: Option<usize>,
    #[serde(default)]
    pub holdings: HashMap<String, f64>,
    #[serde(default)]
    pub prices: HashMap<String, f64>,
}

impl OrdersBody {
    fn into_request(self, defaults: FeeSchedule) -> (OrderRequest, Option<usize>) {
        let fees = FeeSchedule {
            percent: self.transaction_fee.unwrap_or(defaults.percent),
            fixed: self.fixed_fee.unwrap_or(defaults.fixed),
            minimum_order_value: self.minimum_order_value.unwrap_or(defaults.minimum_order_value),
        };
        let request = OrderRequest {
            invest_amount: self.invest_amount,
            fees,
            holdings: uppercase_keys(self.holdings),
            prices: uppercase_keys(self.prices),
        };
        (request, self.size)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderPlanResponse {
    #[serde(flatten)]
    pub plan: OrderPlan,
    pub invested: f64,
    pub cash_left: f64,
}

fn uppercase_keys(map: HashMap<String, f64>) -> HashMap<String, f64> {
    map.into_iter().map(|(k, v)| (k.trim().to_uppercase(), v)).collect()
}

fn updated_at(calculator: &EtfCalculator) -> Option<String> {
    calculator
        .snapshot()
        .updated_at
        .map(|at| at.format(DATE_FORMAT).to_string())
}

fn health(calculator: &EtfCalculator) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        symbols: calculator.snapshot().len(),
        updated_at: updated_at(calculator),
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let calculator = state.calculator.read().await;
    Json(health(&calculator))
}

/// GET /api/symbols?size=N - the stored snapshot, first N symbols
pub async fn symbols_handler(
    State(state): State<AppState>,
    Query(params): Query<SymbolsQuery>,
) -> Json<SymbolsResponse> {
    let calculator = state.calculator.read().await;
    Json(SymbolsResponse {
        updated_at: updated_at(&calculator),
        symbols: calculator.symbols(params.size).to_vec(),
    })
}

/// POST /api/allocation - proportional whole-share split of `amount`
#[instrument(skip(state))]
pub async fn allocation_handler(
    State(state): State<AppState>,
    Json(body): Json<AllocationBody>,
) -> Result<Json<AllocationResponse>, ApiError> {
    let calculator = state.calculator.read().await;
    let allocation = calculator.allocate(body.amount, body.size)?;
    debug!(lines = allocation.lines.len(), skipped = allocation.skipped.len(), "Allocation computed");

    Ok(Json(AllocationResponse {
        invested: allocation.invested(),
        cash_left: allocation.cash_left(),
        allocation,
    }))
}

/// POST /api/orders - fee-aware order plan over current holdings
#[instrument(skip(state))]
pub async fn orders_handler(
    State(state): State<AppState>,
    Json(body): Json<OrdersBody>,
) -> Result<Json<OrderPlanResponse>, ApiError> {
    let calculator = state.calculator.read().await;
    let (request, size) = body.into_request(calculator.settings().fees());
    let plan = calculator.plan_orders(&request, size)?;
    debug!(orders = plan.placed().count(), "Order plan computed");

    Ok(Json(OrderPlanResponse {
        invested: plan.invested(),
        cash_left: plan.cash_left(),
        plan,
    }))
}

/// GET /api/symbols/{symbol} - one record of the snapshot
pub async fn symbol_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SymbolRecord>, ApiError> {
    let calculator = state.calculator.read().await;
    Ok(Json(calculator.symbol(&symbol)?.clone()))
}

/// POST /api/reload - re-read the data file from disk.
/// The file is read before the write lock is taken; on failure the
/// current snapshot stays in place.
pub async fn reload_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let path = state.calculator.read().await.settings().data_file.clone();
    let snapshot = StorageManager::load_from_file(&path).await?;

    let mut calculator = state.calculator.write().await;
    calculator.replace_snapshot(snapshot);
    info!(symbols = calculator.snapshot().len(), path = %path.display(), "Symbols data reloaded");
    Ok(Json(health(&calculator)))
}
