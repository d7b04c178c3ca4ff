//! SQLite storage implementation for transactions (read-only).

mod model;
mod repository;

pub use model::TransactionRowDB;
pub use repository::TransactionRepository;

// Re-export trait from core for convenience
pub use fintrack_core::balance::TransactionRepositoryTrait;
