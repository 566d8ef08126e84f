//! Data module - CSV loading and cleaning

mod cleaner;
mod loader;

pub use cleaner::{CleanError, DataCleaner};
pub use loader::{DataLoader, LoadError};

use polars::prelude::DataFrame;

/// Check whether a DataFrame has a column with the given name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
