//! SQLite storage implementation for the exchange-rate cache.

mod model;
mod repository;

pub use model::ExchangeRateDB;
pub use repository::RateRepository;

// Re-export trait from core for convenience
pub use fintrack_core::fx::RateStoreTrait;
