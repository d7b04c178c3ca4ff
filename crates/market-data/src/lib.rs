//! Fintrack Market Data Crate
//!
//! This crate fetches exchange rates from external providers for the
//! fintrack core. Every provider answers the same question: what is one unit
//! of each requested currency worth in a single home currency?
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +-------------------------+
//! |   Core Domain    | --> |  ExchangeRateProvider   |  (trait)
//! +------------------+     +-------------------------+
//!                                   |
//!                 +-----------------+-----------------+
//!                 v                                   v
//!        +------------------+               +------------------+
//!        | ExchangeRateHost |               |       CBR        |
//!        +------------------+               +------------------+
//!                 |                                   |
//!                 +-----------------+-----------------+
//!                                   v
//!                          +------------------+
//!                          | HomeRateSnapshot |
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`HomeRateSnapshot`] - All prices from one provider response
//! - [`ExchangeRateProvider`] - Provider abstraction
//! - [`MarketDataError`] - Provider errors with a [`RetryClass`]

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use models::HomeRateSnapshot;
pub use provider::cbr::CbrProvider;
pub use provider::exchangerate_host::ExchangeRateHostProvider;
pub use provider::{build_http_client, ExchangeRateProvider, DEFAULT_REQUEST_TIMEOUT};
