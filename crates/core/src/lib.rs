pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use models::{
    allocation::Allocation,
    order::{OrderPlan, OrderRequest},
    settings::Settings,
    snapshot::SymbolSnapshot,
    symbol::SymbolRecord,
};
use services::{allocation_service::AllocationService, order_service::OrderService};
use storage::manager::StorageManager;

use errors::CoreError;

/// Main entry point for the BET ETF calculator core library.
/// Holds the latest symbol snapshot, the settings, and the services that
/// compute purchase plans from them.
#[must_use]
pub struct EtfCalculator {
    snapshot: SymbolSnapshot,
    settings: Settings,
    allocation_service: AllocationService,
    order_service: OrderService,
}

impl std::fmt::Debug for EtfCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtfCalculator")
            .field("symbols", &self.snapshot.len())
            .field("updated_at", &self.snapshot.updated_at)
            .field("settings", &self.settings)
            .finish()
    }
}

impl EtfCalculator {
    /// Wrap an already loaded snapshot.
    pub fn new(snapshot: SymbolSnapshot, settings: Settings) -> Self {
        Self {
            snapshot,
            settings,
            allocation_service: AllocationService::new(),
            order_service: OrderService::new(),
        }
    }

    /// Load the snapshot from the configured data file.
    pub async fn load(settings: Settings) -> Result<Self, CoreError> {
        let snapshot = StorageManager::load_from_file(&settings.data_file).await?;
        Ok(Self::new(snapshot, settings))
    }

    /// Load the snapshot from JSON bytes (e.g., a downloaded copy of the data file).
    pub fn load_from_bytes(data: &[u8], settings: Settings) -> Result<Self, CoreError> {
        let snapshot = StorageManager::load_from_bytes(data)?;
        Ok(Self::new(snapshot, settings))
    }

    /// Replace the snapshot wholesale (e.g., after a collector run or a reload).
    pub fn replace_snapshot(&mut self, snapshot: SymbolSnapshot) {
        self.snapshot = snapshot;
    }

    #[must_use]
    pub fn snapshot(&self) -> &SymbolSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The first `size` symbols; `None` uses the configured list size.
    #[must_use]
    pub fn symbols(&self, size: Option<usize>) -> &[SymbolRecord] {
        self.snapshot
            .first(size.unwrap_or(self.settings.symbols_list_size))
    }

    /// Look up one symbol of the snapshot (case-insensitive).
    pub fn symbol(&self, symbol: &str) -> Result<&SymbolRecord, CoreError> {
        self.snapshot
            .find(symbol)
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_uppercase()))
    }

    /// Human-readable freshness line for the dashboard. Empty when unknown.
    #[must_use]
    pub fn updated_at_label(&self) -> String {
        match self.snapshot.updated_at {
            Some(at) => format!("The prices have been updated at {}.", at.format("%Y-%m-%d %H:%M:%S")),
            None => String::new(),
        }
    }

    // ── Calculations ────────────────────────────────────────────────

    /// Split `amount` across the first `size` symbols by index weight.
    pub fn allocate(&self, amount: f64, size: Option<usize>) -> Result<Allocation, CoreError> {
        self.allocation_service.allocate(amount, self.symbols(size))
    }

    /// Plan fee-aware buy orders for the first `size` symbols.
    pub fn plan_orders(&self, request: &OrderRequest, size: Option<usize>) -> Result<OrderPlan, CoreError> {
        self.order_service.plan(request, self.symbols(size))
    }

    /// An order request pre-filled with the configured amount and fees.
    pub fn default_order_request(&self) -> OrderRequest {
        OrderRequest::new(self.settings.invest_amount, self.settings.fees())
    }
}
