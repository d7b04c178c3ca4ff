//! Market data models
//!
//! - `snapshot` - One provider response expressed in home-currency prices

mod snapshot;

pub use snapshot::HomeRateSnapshot;
