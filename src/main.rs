//! COVID-19 Global Data Tracker
//!
//! Single-shot pipeline over the OWID dataset: load, clean, analyze,
//! render static charts and interactive choropleth maps, print a report.

mod charts;
mod config;
mod data;
mod report;
mod stats;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use charts::{ChartRenderer, ChoroplethRenderer};
use config::ChartConfig;
use data::{has_column, DataCleaner, DataLoader};
use stats::analyzer;

/// Expected next to the binary, as in the published OWID dumps.
const DATASET_PATH: &str = "owid-covid-data.csv";

const TARGET_COUNTRIES: [&str; 3] = ["Kenya", "United States", "India"];

const CORRELATION_COLUMNS: [&str; 5] = [
    "total_cases",
    "total_deaths",
    "new_cases",
    "new_deaths",
    "total_vaccinations",
];

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let chart_config = ChartConfig::default();
    std::fs::create_dir_all(&chart_config.output_dir).with_context(|| {
        format!("creating output dir {}", chart_config.output_dir.display())
    })?;

    // 1. Load
    let df = DataLoader::load_csv(DATASET_PATH)?;
    info!(rows = df.height(), columns = df.width(), "dataset loaded");
    report::print_head(&df);

    // 2. Clean
    let cleaned = DataCleaner::clean(&df, &TARGET_COUNTRIES)?;
    info!(rows = cleaned.height(), "data cleaned, ready for analysis");

    // 3. Analyze
    let enriched = analyzer::with_death_rate(&cleaned)?;
    let ranked = if has_column(&enriched, "death_rate") {
        analyzer::max_death_rate_per_location(&enriched)?
    } else {
        Vec::new()
    };
    report::print_death_rates(&ranked);

    // 4. Static charts
    let renderer = ChartRenderer::new(chart_config.clone());
    renderer.render_line_charts(&enriched, &TARGET_COUNTRIES)?;
    let matrix = analyzer::correlation_matrix(&enriched, &CORRELATION_COLUMNS)?;
    renderer.render_heatmap(&matrix)?;

    // 5. Choropleth maps from the latest snapshot
    let snapshot = analyzer::latest_snapshot(&enriched)?;
    ChoroplethRenderer::new(chart_config.clone()).render_maps(&snapshot)?;

    // 6. Insights
    report::print_insights(&enriched, &ranked, &snapshot)?;

    info!(
        output_dir = %chart_config.output_dir.display(),
        "analysis complete; view the charts and maps in the output directory"
    );
    Ok(())
}
