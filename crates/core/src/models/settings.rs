use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::CoreError;

use super::order::FeeSchedule;

/// Runtime configuration shared by the collector and the dashboard.
///
/// Defaults match the public dashboard; every field can be overridden
/// through a `BET_ETF_*` environment variable (see [`Settings::from_env`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default cash amount to invest, in RON.
    pub invest_amount: f64,

    /// Broker commission in percent.
    pub transaction_fee: f64,

    /// Flat fee per executed order, in RON.
    pub fixed_fee: f64,

    /// Orders at or below this value (fees included) are dropped.
    pub minimum_order_value: f64,

    /// How many index constituents to collect and show.
    pub symbols_list_size: usize,

    /// Path of the JSON snapshot written by the collector.
    pub data_file: PathBuf,

    /// Dashboard HTTP port.
    pub port: u16,

    /// Pause between collector runs in watch mode, in seconds.
    pub collect_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            invest_amount: 10_000.0,
            transaction_fee: 0.49,
            fixed_fee: 1.49,
            minimum_order_value: 310.0,
            symbols_list_size: 20,
            data_file: PathBuf::from("symbols-data.json"),
            port: 8050,
            collect_interval_secs: 60,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `BET_ETF_*` environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup` (keyed by env var name).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        overlay(&lookup, "BET_ETF_INVEST_AMOUNT", &mut settings.invest_amount)?;
        overlay(&lookup, "BET_ETF_TRANSACTION_FEE", &mut settings.transaction_fee)?;
        overlay(&lookup, "BET_ETF_FIXED_FEE", &mut settings.fixed_fee)?;
        overlay(&lookup, "BET_ETF_MINIMUM_ORDER_VALUE", &mut settings.minimum_order_value)?;
        overlay(&lookup, "BET_ETF_SYMBOLS_LIST_SIZE", &mut settings.symbols_list_size)?;
        overlay(&lookup, "BET_ETF_PORT", &mut settings.port)?;
        overlay(&lookup, "BET_ETF_COLLECT_INTERVAL", &mut settings.collect_interval_secs)?;
        if let Some(path) = lookup("BET_ETF_DATA_FILE").filter(|p| !p.trim().is_empty()) {
            settings.data_file = PathBuf::from(path.trim());
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the allocator or collector cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.invest_amount.is_finite() || self.invest_amount < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "invest_amount must be a non-negative number, got {}",
                self.invest_amount
            )));
        }
        if !self.transaction_fee.is_finite() || !(0.0..100.0).contains(&self.transaction_fee) {
            return Err(CoreError::ValidationError(format!(
                "transaction_fee must be in [0, 100), got {}",
                self.transaction_fee
            )));
        }
        if !self.fixed_fee.is_finite() || self.fixed_fee < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "fixed_fee must be non-negative, got {}",
                self.fixed_fee
            )));
        }
        if !self.minimum_order_value.is_finite() || self.minimum_order_value < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "minimum_order_value must be non-negative, got {}",
                self.minimum_order_value
            )));
        }
        if self.symbols_list_size == 0 {
            return Err(CoreError::ValidationError(
                "symbols_list_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The fee schedule described by these settings.
    pub fn fees(&self) -> FeeSchedule {
        FeeSchedule {
            percent: self.transaction_fee,
            fixed: self.fixed_fee,
            minimum_order_value: self.minimum_order_value,
        }
    }
}

fn overlay<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), CoreError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        *target = raw
            .parse()
            .map_err(|_| CoreError::ValidationError(format!("Invalid value for {key}: {raw:?}")))?;
    }
    Ok(())
}
