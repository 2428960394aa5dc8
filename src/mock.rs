//! Synthetic market data for development and demos

pub mod ffa;
pub mod rates;
pub mod routes;
pub mod vessels;

pub use ffa::mock_ffa_prices;
pub use rates::{generate_mock_freight_rates, generate_with};
pub use routes::mock_freight_routes;
pub use vessels::mock_vessels;

/// Round to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
