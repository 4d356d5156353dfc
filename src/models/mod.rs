//! Domain models for tree-carbon.
//!
//! # Core Concepts
//!
//! ## Single tree
//!
//! - [`MeasurementInput`]: trunk circumference (cm) and height (m) of one tree.
//! - [`CarbonBreakdown`]: the biomass components and CO2-equivalent storage the
//!   allometric model derives from one measurement.
//!
//! ## Batch
//!
//! - [`Cell`]: an untyped value of an uploaded table, before validation.
//! - [`MeasurementRow`]: a validated, strongly-typed row of an uploaded table.
//! - [`ResultTable`]: the uploaded table with the derived breakdown of each row.
//! - [`BatchSummary`]: totals across the whole table.
//!
//! Everything here is request-scoped; nothing is persisted.

mod batch;
mod breakdown;
mod cell;

pub use batch::*;
pub use breakdown::*;
pub use cell::*;
