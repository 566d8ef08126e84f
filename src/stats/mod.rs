//! Stats module - derived metrics over the cleaned dataset

pub mod analyzer;

pub use analyzer::{CorrelationMatrix, LocationSeries};
