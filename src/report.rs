//! Console Reporting
//! Human-readable summary of the run: head preview, the max-death-rate
//! table, and insight lines derived from the data.

use polars::prelude::*;

use crate::data::has_column;

/// Print the first rows of the loaded dataset.
pub fn print_head(df: &DataFrame) {
    println!("First 5 rows:\n{}", df.head(Some(5)));
}

/// Print the top locations by maximum observed death rate.
pub fn print_death_rates(ranked: &[(String, f64)]) {
    if ranked.is_empty() {
        return;
    }
    println!("\nTop countries by max death rate:");
    for (location, rate) in ranked.iter().take(10) {
        println!("  {location:<20} {rate:.4}");
    }
}

/// Print insight lines derived from the cleaned data and the snapshot.
pub fn print_insights(
    df: &DataFrame,
    ranked: &[(String, f64)],
    snapshot: &DataFrame,
) -> PolarsResult<()> {
    println!("\nInsights:");
    let mut counter = 1;

    if let Some((location, rate)) = ranked.first() {
        println!(
            "{counter}. {location} recorded the highest max death rate ({:.2}%).",
            rate * 100.0
        );
        counter += 1;
    }

    if let Some((location, date, value)) = peak_new_cases(df)? {
        println!("{counter}. Peak daily new cases: {value:.0} in {location} on {date}.");
        counter += 1;
    }

    if let Some((location, value)) = column_leader(snapshot, "total_cases")? {
        println!("{counter}. {location} carries the largest case burden ({value:.0} total cases).");
        counter += 1;
    }

    if let Some((location, value)) =
        column_leader(snapshot, "people_fully_vaccinated_per_hundred")?
    {
        println!("{counter}. {location} leads vaccination coverage ({value:.1}% fully vaccinated).");
        counter += 1;
    }

    if counter == 1 {
        println!("(no derivable insights for this input)");
    }
    Ok(())
}

/// Row with the highest daily new-case count across all locations.
fn peak_new_cases(df: &DataFrame) -> PolarsResult<Option<(String, String, f64)>> {
    if !has_column(df, "new_cases") || !has_column(df, "date") {
        return Ok(None);
    }

    let locations = df.column("location")?.str()?;
    let cases = df.column("new_cases")?.f64()?;
    let dates = df.column("date")?.as_materialized_series().clone();
    let dates = dates.date()?;

    let mut peak: Option<(String, String, f64)> = None;
    for ((location, value), date) in locations
        .into_iter()
        .zip(cases)
        .zip(dates.as_date_iter())
    {
        let (Some(location), Some(value), Some(date)) = (location, value, date) else {
            continue;
        };
        if peak.as_ref().map_or(true, |(_, _, best)| value > *best) {
            peak = Some((location.to_string(), date.to_string(), value));
        }
    }
    Ok(peak)
}

/// Location with the largest value for `column` in the snapshot.
fn column_leader(snapshot: &DataFrame, column: &str) -> PolarsResult<Option<(String, f64)>> {
    if !has_column(snapshot, column) {
        return Ok(None);
    }

    let locations = snapshot.column("location")?.str()?;
    let values = snapshot.column(column)?.f64()?;

    let mut leader: Option<(String, f64)> = None;
    for (location, value) in locations.into_iter().zip(values) {
        let (Some(location), Some(value)) = (location, value) else {
            continue;
        };
        if leader.as_ref().map_or(true, |(_, best)| value > *best) {
            leader = Some((location.to_string(), value));
        }
    }
    Ok(leader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn column_leader_picks_the_maximum() {
        let snapshot = df!(
            "location" => ["Kenya", "India"],
            "total_cases" => [Some(1000.0), Some(3000.0)],
        )
        .unwrap();

        let leader = column_leader(&snapshot, "total_cases").unwrap();
        assert_eq!(leader, Some(("India".to_string(), 3000.0)));
    }

    #[test]
    fn column_leader_handles_missing_columns_and_all_nulls() {
        let snapshot = df!(
            "location" => ["Kenya"],
            "total_cases" => [Option::<f64>::None],
        )
        .unwrap();

        assert_eq!(column_leader(&snapshot, "total_cases").unwrap(), None);
        assert_eq!(column_leader(&snapshot, "absent").unwrap(), None);
    }
}
