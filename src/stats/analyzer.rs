//! Analyzer Module
//! Pure functions over the cleaned dataset: time series, death rate,
//! correlations, and the latest per-location snapshot.

use chrono::NaiveDate;
use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use std::collections::HashMap;
use tracing::warn;

use crate::data::has_column;

/// One location's (date, value) pairs, ascending by date.
#[derive(Debug, Clone)]
pub struct LocationSeries {
    pub location: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Symmetric matrix of pairwise Pearson coefficients.
///
/// `values[i][j]` is the coefficient between `columns[i]` and
/// `columns[j]`; NaN marks pairs with fewer than two complete
/// observations or a zero-variance column.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Extract per-location time series for one column, ordered by date.
/// Null values are dropped; locations without data yield empty series.
pub fn time_series(
    df: &DataFrame,
    column: &str,
    locations: &[&str],
) -> PolarsResult<Vec<LocationSeries>> {
    let mut out = Vec::with_capacity(locations.len());

    for location in locations {
        let selected = df
            .clone()
            .lazy()
            .filter(col("location").eq(lit(*location)))
            .select([col("date"), col(column).cast(DataType::Float64)])
            .sort(["date"], Default::default())
            .collect()?;

        let dates = selected.column("date")?.as_materialized_series().clone();
        let dates = dates.date()?;
        let values = selected.column(column)?.f64()?;

        let points = dates
            .as_date_iter()
            .zip(values)
            .filter_map(|(d, v)| Some((d?, v?)))
            .collect();

        out.push(LocationSeries {
            location: location.to_string(),
            points,
        });
    }

    Ok(out)
}

/// Append the per-row `death_rate` column.
///
/// A zero or null denominator yields a null rate, not an error and not a
/// silent zero. When the input columns are absent the frame is returned
/// unchanged so downstream stages can degrade gracefully.
pub fn with_death_rate(df: &DataFrame) -> PolarsResult<DataFrame> {
    if !has_column(df, "total_cases") || !has_column(df, "total_deaths") {
        warn!("total_cases/total_deaths absent; skipping death_rate");
        return Ok(df.clone());
    }

    df.clone()
        .lazy()
        .with_column(
            when(
                col("total_cases")
                    .is_null()
                    .or(col("total_cases").eq(lit(0.0))),
            )
            .then(lit(NULL))
            .otherwise(col("total_deaths") / col("total_cases"))
            .alias("death_rate"),
        )
        .collect()
}

/// Maximum observed death rate per location, sorted descending.
/// Ties keep the table's first-encounter order (stable sort).
pub fn max_death_rate_per_location(df: &DataFrame) -> PolarsResult<Vec<(String, f64)>> {
    let locations = df.column("location")?.str()?;
    let rates = df.column("death_rate")?.f64()?;

    let mut order: Vec<String> = Vec::new();
    let mut max_rate: HashMap<String, f64> = HashMap::new();

    for (location, rate) in locations.into_iter().zip(rates) {
        let (Some(location), Some(rate)) = (location, rate) else {
            continue;
        };
        if rate.is_nan() {
            continue;
        }

        match max_rate.get_mut(location) {
            Some(current) => {
                if rate > *current {
                    *current = rate;
                }
            }
            None => {
                order.push(location.to_string());
                max_rate.insert(location.to_string(), rate);
            }
        }
    }

    let mut ranked: Vec<(String, f64)> = order
        .into_iter()
        .map(|location| {
            let rate = max_rate[&location];
            (location, rate)
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(ranked)
}

/// Pairwise-complete Pearson correlation across the named numeric columns.
/// Absent columns are skipped with a warning rather than failing the run.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> PolarsResult<CorrelationMatrix> {
    let mut series: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    for name in columns {
        if !has_column(df, name) {
            warn!(column = *name, "column absent; dropped from correlation matrix");
            continue;
        }
        let values = df
            .column(name)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .collect();
        series.push((name.to_string(), values));
    }

    let n = series.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

    // Each pair is independent; fan the upper triangle out across threads.
    let computed: Vec<((usize, usize), f64)> = pairs
        .par_iter()
        .map(|&(i, j)| ((i, j), pearson_pairwise(&series[i].1, &series[j].1)))
        .collect();

    let mut values = vec![vec![f64::NAN; n]; n];
    for ((i, j), r) in computed {
        values[i][j] = r;
        values[j][i] = r;
    }

    Ok(CorrelationMatrix {
        columns: series.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}

/// Pearson coefficient over the rows where both columns have values.
fn pearson_pairwise(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = (&xs).mean();
    let mean_y = (&ys).mean();
    let std_x = (&xs).std_dev();
    let std_y = (&ys).std_dev();

    if std_x == 0.0 || std_y == 0.0 {
        return f64::NAN;
    }

    let covariance = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / (n - 1) as f64;

    covariance / (std_x * std_y)
}

/// One row per location: sort ascending by date, keep the last row seen
/// for each location.
pub fn latest_snapshot(df: &DataFrame) -> PolarsResult<DataFrame> {
    let sorted = df.sort(["date"], SortMultipleOptions::default())?;
    let locations = sorted.column("location")?.str()?;

    let mut order: Vec<String> = Vec::new();
    let mut last_row: HashMap<String, usize> = HashMap::new();

    for (row, location) in locations.into_iter().enumerate() {
        let Some(location) = location else { continue };
        if !last_row.contains_key(location) {
            order.push(location.to_string());
        }
        last_row.insert(location.to_string(), row);
    }

    let indices: Vec<IdxSize> = order
        .iter()
        .map(|location| last_row[location] as IdxSize)
        .collect();

    sorted.take(&IdxCa::from_vec("idx".into(), indices))
}
