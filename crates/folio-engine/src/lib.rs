//! Capacity and demand resolution for the Folio planning engine.
//!
//! The modules below are pure functions over rows already read from an
//! [`EntityStore`](folio_core::store::EntityStore). [`Planner`] ties them to
//! a store, one [`Snapshot`] per query.

pub mod demand;
pub mod error;
pub mod gap;
pub mod hierarchy;
pub mod planner;
pub mod risk;
pub mod rollup;
pub mod snapshot;
pub mod supply;
pub mod trend;

use rust_decimal::{Decimal, RoundingStrategy};

pub use error::{Error, Result};
pub use planner::{CapacityFilter, Planner};
pub use snapshot::Snapshot;

/// Round a presentation figure to two places, half away from zero.
pub(crate) fn round_fte(value: Decimal) -> Decimal {
  value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
