pub mod allocation_service;
pub mod collector_service;
pub mod order_service;

/// Round to 2 decimals (cents, or hundredths of a percent).
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
