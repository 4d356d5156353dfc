//! Carbon storage estimates for individual trees.
//!
//! [`estimator::estimate`] maps a trunk circumference and height to a
//! biomass and CO2-equivalent breakdown. [`batch::aggregate`] applies it to
//! every row of a spreadsheet and totals the result. The remaining modules
//! read spreadsheets, write reports and charts, and serve everything over HTTP.

pub mod api;
pub mod batch;
pub mod chart;
pub mod config;
pub mod error;
pub mod estimator;
pub mod export;
pub mod models;
pub mod report;
pub mod storage;
pub mod table;

pub use batch::aggregate;
pub use estimator::estimate;
