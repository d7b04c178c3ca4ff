//! Fintrack Core - exchange-rate resolution and balance aggregation.
//!
//! This crate contains the business logic of the tracker. It is
//! database-agnostic and defines the traits that the `storage-sqlite` crate
//! implements, and it talks to rate providers through `fintrack-market-data`.

pub mod balance;
pub mod errors;
pub mod fx;
pub mod settings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
