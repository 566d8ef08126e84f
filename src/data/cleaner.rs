//! Data Cleaner Module
//! Filters the dataset to the target countries and normalizes missing values.

use polars::prelude::*;
use thiserror::Error;
use tracing::warn;

use super::has_column;

/// Columns the cleaner cannot work without.
const REQUIRED_COLUMNS: [&str; 4] = ["location", "date", "new_cases", "new_deaths"];

/// Numeric columns normalized to Float64 when present.
const NUMERIC_COLUMNS: [&str; 6] = [
    "total_cases",
    "total_deaths",
    "new_cases",
    "new_deaths",
    "total_vaccinations",
    "people_fully_vaccinated_per_hundred",
];

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("required column `{0}` is missing")]
    MissingColumn(String),
    #[error("failed to parse `date` column: {0}")]
    DateParse(#[source] PolarsError),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Handles row filtering and missing-value normalization.
pub struct DataCleaner;

impl DataCleaner {
    /// Run the cleaning steps in order. Later steps assume the earlier
    /// ones' postconditions, so the order is load-bearing.
    pub fn clean(df: &DataFrame, locations: &[&str]) -> Result<DataFrame, CleanError> {
        for col_name in REQUIRED_COLUMNS {
            if !has_column(df, col_name) {
                return Err(CleanError::MissingColumn(col_name.to_string()));
            }
        }

        let filtered = Self::filter_rows(df, locations)?;
        let dated = Self::parse_dates(&filtered)?;
        let cleaned = Self::fill_missing(&dated)?;
        Ok(cleaned)
    }

    /// Steps 1-2: keep only target locations, drop rows with null
    /// date/location (unrecoverable).
    fn filter_rows(df: &DataFrame, locations: &[&str]) -> Result<DataFrame, CleanError> {
        let in_targets = locations
            .iter()
            .fold(lit(false), |pred, loc| pred.or(col("location").eq(lit(*loc))));

        let filtered = df
            .clone()
            .lazy()
            .filter(in_targets)
            .filter(col("date").is_not_null().and(col("location").is_not_null()))
            .collect()?;

        Ok(filtered)
    }

    /// Step 3: strict date conversion. Unlike the numeric fields, a bad
    /// date is never defaulted.
    fn parse_dates(df: &DataFrame) -> Result<DataFrame, CleanError> {
        if df.column("date").map_err(CleanError::Polars)?.dtype() == &DataType::Date {
            return Ok(df.clone());
        }

        df.clone()
            .lazy()
            .with_column(
                col("date")
                    .str()
                    .to_date(StrptimeOptions {
                        format: Some("%Y-%m-%d".into()),
                        strict: true,
                        ..Default::default()
                    })
                    .alias("date"),
            )
            .collect()
            .map_err(CleanError::DateParse)
    }

    /// Steps 4-5: cast the known numeric columns to Float64, zero-fill
    /// new_cases/new_deaths (absence means "no change reported"), and
    /// interpolate internal vaccination gaps over row order.
    fn fill_missing(df: &DataFrame) -> Result<DataFrame, CleanError> {
        let casts: Vec<Expr> = NUMERIC_COLUMNS
            .iter()
            .filter(|name| has_column(df, name))
            .map(|name| col(*name).cast(DataType::Float64))
            .collect();

        let mut lf = df
            .clone()
            .lazy()
            .with_columns(casts)
            .with_columns([
                col("new_cases").fill_null(lit(0.0)),
                col("new_deaths").fill_null(lit(0.0)),
            ]);

        if has_column(df, "total_vaccinations") {
            lf = lf.with_column(
                col("total_vaccinations").interpolate(InterpolationMethod::Linear),
            );
        } else {
            warn!("column `total_vaccinations` absent; skipping interpolation");
        }

        Ok(lf.collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> DataFrame {
        df!(
            "location" => ["Kenya", "Kenya", "Kenya", "France", "India"],
            "date" => [Some("2021-01-01"), Some("2021-01-02"), Some("2021-01-03"), Some("2021-01-01"), None],
            "new_cases" => [Some(5.0), None, Some(7.0), Some(9.0), Some(1.0)],
            "new_deaths" => [Some(1.0), None, Some(2.0), Some(3.0), Some(0.0)],
            "total_vaccinations" => [Some(100.0), None, Some(300.0), Some(50.0), Some(60.0)],
        )
        .unwrap()
    }

    #[test]
    fn keeps_only_target_locations_with_dates() {
        let cleaned = DataCleaner::clean(&sample(), &["Kenya", "India"]).unwrap();
        // France filtered out, India row dropped for its null date.
        assert_eq!(cleaned.height(), 3);

        let locs = cleaned.column("location").unwrap().str().unwrap();
        assert!(locs.into_iter().all(|l| l == Some("Kenya")));
        assert_eq!(cleaned.column("date").unwrap().null_count(), 0);
    }

    #[test]
    fn zero_fills_new_cases_and_deaths() {
        let cleaned = DataCleaner::clean(&sample(), &["Kenya"]).unwrap();
        let cases = cleaned.column("new_cases").unwrap().f64().unwrap();
        let deaths = cleaned.column("new_deaths").unwrap().f64().unwrap();

        assert_eq!(cases.null_count(), 0);
        assert_eq!(deaths.null_count(), 0);
        assert_eq!(cases.get(1), Some(0.0));
        assert_eq!(deaths.get(1), Some(0.0));
    }

    #[test]
    fn interpolates_internal_vaccination_gaps() {
        let cleaned = DataCleaner::clean(&sample(), &["Kenya"]).unwrap();
        let vax = cleaned.column("total_vaccinations").unwrap().f64().unwrap();
        assert_eq!(vax.get(0), Some(100.0));
        assert_eq!(vax.get(1), Some(200.0));
        assert_eq!(vax.get(2), Some(300.0));
    }

    #[test]
    fn converts_dates_to_the_date_dtype() {
        let cleaned = DataCleaner::clean(&sample(), &["Kenya"]).unwrap();
        assert_eq!(cleaned.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn unparseable_date_is_an_error() {
        let df = df!(
            "location" => ["Kenya"],
            "date" => ["01/02/2021"],
            "new_cases" => [1.0],
            "new_deaths" => [0.0],
        )
        .unwrap();

        let err = DataCleaner::clean(&df, &["Kenya"]).unwrap_err();
        assert!(matches!(err, CleanError::DateParse(_)));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let df = df!(
            "location" => ["Kenya"],
            "date" => ["2021-01-01"],
        )
        .unwrap();

        let err = DataCleaner::clean(&df, &["Kenya"]).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn(_)));
    }

    #[test]
    fn works_without_the_optional_vaccination_column() {
        let df = df!(
            "location" => ["Kenya"],
            "date" => ["2021-01-01"],
            "new_cases" => [1.0],
            "new_deaths" => [0.0],
        )
        .unwrap();

        let cleaned = DataCleaner::clean(&df, &["Kenya"]).unwrap();
        assert_eq!(cleaned.height(), 1);
    }
}
