//! # Stockdash Core
//!
//! Data models and return analytics for the Stock Market Dashboard.
//!
//! The database does the heavy aggregation; this crate holds the typed rows it
//! produces and the reshaping steps applied afterwards: ranking, summary
//! metrics, pivoting, pct-change, correlation, monthly movers and the sector
//! roll-up computed from the supplementary CSV.

pub mod error;
pub mod matrix;
pub mod models;
pub mod monthly;
pub mod returns;
pub mod sector;

pub use error::*;
pub use matrix::{CorrelationMatrix, PriceMatrix};
pub use models::*;
