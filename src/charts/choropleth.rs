//! Choropleth Renderer
//! Writes interactive world-map documents from the latest snapshot. Each
//! document embeds a plotly.js payload; opening it in a browser renders
//! the map.

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::ChartConfig;
use crate::data::has_column;

/// A world map colored by one snapshot column.
struct ChoroplethSpec {
    column: &'static str,
    title: &'static str,
    colorscale: &'static str,
    file_stem: &'static str,
}

const MAPS: [ChoroplethSpec; 2] = [
    ChoroplethSpec {
        column: "total_cases",
        title: "Total COVID-19 Cases by Country",
        colorscale: "Reds",
        file_stem: "total_cases",
    },
    ChoroplethSpec {
        column: "people_fully_vaccinated_per_hundred",
        title: "Vaccination Rates (% Fully Vaccinated) by Country",
        colorscale: "Greens",
        file_stem: "vaccination_rates",
    },
];

/// The plotly trace serialized into the document.
#[derive(Serialize)]
struct ChoroplethTrace<'a> {
    #[serde(rename = "type")]
    trace_type: &'static str,
    locations: Vec<&'a str>,
    z: Vec<Option<f64>>,
    text: Vec<&'a str>,
    colorscale: &'static str,
}

pub struct ChoroplethRenderer {
    config: ChartConfig,
}

impl ChoroplethRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Render every map whose column exists in the snapshot; the
    /// vaccination map in particular is optional by contract.
    pub fn render_maps(&self, snapshot: &DataFrame) -> Result<Vec<PathBuf>> {
        if !has_column(snapshot, "iso_code") || !has_column(snapshot, "location") {
            warn!("snapshot lacks iso_code/location; skipping choropleth maps");
            return Ok(Vec::new());
        }

        let mut written = Vec::new();
        for spec in &MAPS {
            if !has_column(snapshot, spec.column) {
                warn!(column = spec.column, "column absent; skipping choropleth");
                continue;
            }
            written.push(self.render_map(snapshot, spec)?);
        }
        Ok(written)
    }

    fn render_map(&self, snapshot: &DataFrame, spec: &ChoroplethSpec) -> Result<PathBuf> {
        let iso_codes = snapshot.column("iso_code")?.str()?;
        let names = snapshot.column("location")?.str()?;
        let values = snapshot.column(spec.column)?.f64()?;

        let mut locations = Vec::with_capacity(snapshot.height());
        let mut z = Vec::with_capacity(snapshot.height());
        let mut text = Vec::with_capacity(snapshot.height());

        for ((iso, name), value) in iso_codes.into_iter().zip(names).zip(values) {
            // A row without a join key cannot be geocoded; leave it out.
            let Some(iso) = iso else {
                debug!(location = name.unwrap_or("?"), "row has no iso_code; omitted");
                continue;
            };
            locations.push(iso);
            z.push(value);
            text.push(name.unwrap_or(""));
        }

        let trace = ChoroplethTrace {
            trace_type: "choropleth",
            locations,
            z,
            text,
            colorscale: spec.colorscale,
        };
        let layout = json!({
            "title": spec.title,
            "geo": { "projection": { "type": "natural earth" } },
        });

        let document = render_document(spec.title, &trace, &layout)?;
        let path = self.config.output_dir.join(format!("{}.html", spec.file_stem));
        fs::write(&path, document)
            .with_context(|| format!("writing choropleth to {}", path.display()))?;

        info!(path = %path.display(), "choropleth written");
        Ok(path)
    }
}

fn render_document(
    title: &str,
    trace: &ChoroplethTrace<'_>,
    layout: &serde_json::Value,
) -> Result<String> {
    let data = serde_json::to_string(&[trace])?;
    let layout = serde_json::to_string(layout)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.32.0.min.js"></script>
</head>
<body>
<div id="chart"></div>
<script>
Plotly.newPlot("chart", {data}, {layout});
</script>
</body>
</html>
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn snapshot() -> DataFrame {
        df!(
            "location" => ["Kenya", "United States", "India"],
            "iso_code" => [Some("KEN"), Some("USA"), None],
            "total_cases" => [Some(1000.0), Some(5000.0), Some(3000.0)],
        )
        .unwrap()
    }

    fn renderer(dir: &std::path::Path) -> ChoroplethRenderer {
        ChoroplethRenderer::new(ChartConfig {
            output_dir: dir.to_path_buf(),
            ..ChartConfig::default()
        })
    }

    #[test]
    fn writes_case_map_and_skips_missing_vaccination_column() {
        let dir = tempfile::tempdir().unwrap();
        let written = renderer(dir.path()).render_maps(&snapshot()).unwrap();

        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("total_cases.html"));
    }

    #[test]
    fn omits_rows_without_an_iso_code() {
        let dir = tempfile::tempdir().unwrap();
        let written = renderer(dir.path()).render_maps(&snapshot()).unwrap();

        let html = fs::read_to_string(&written[0]).unwrap();
        assert!(html.contains("KEN"));
        assert!(html.contains("USA"));
        // India's row has no join key.
        assert!(!html.contains("India"));
    }

    #[test]
    fn renders_vaccination_map_when_the_column_exists() {
        let df = df!(
            "location" => ["Kenya"],
            "iso_code" => ["KEN"],
            "total_cases" => [1000.0],
            "people_fully_vaccinated_per_hundred" => [12.5],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = renderer(dir.path()).render_maps(&df).unwrap();

        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("vaccination_rates.html"));
        let html = fs::read_to_string(&written[1]).unwrap();
        assert!(html.contains("Greens"));
    }

    #[test]
    fn null_values_serialize_as_json_null() {
        let df = df!(
            "location" => ["Kenya"],
            "iso_code" => ["KEN"],
            "total_cases" => [Option::<f64>::None],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = renderer(dir.path()).render_maps(&df).unwrap();
        let html = fs::read_to_string(&written[0]).unwrap();
        assert!(html.contains("\"z\":[null]"));
    }
}
