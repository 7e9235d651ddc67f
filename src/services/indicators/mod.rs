//! Technical indicator implementations.
//!
//! Pure functions over a close-price series. Every indicator returns
//! `None` when the series is shorter than its required window; this is
//! the defined insufficient-data state, which downstream consumers
//! treat as an abstention.

pub mod macd;
pub mod rsi;
pub mod sma;

pub use macd::macd;
pub use rsi::rsi;
pub use sma::sma;
