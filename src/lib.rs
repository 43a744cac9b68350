//! Splits EVE Online cargo lists across freighters.
//!
//! [`domain`] holds the ordering, allocation and delivery pricing, [`infra`]
//! talks to ESI and the disk, and [`util`] carries persistence and formatting.

pub mod domain;
pub mod infra;
pub mod util;
