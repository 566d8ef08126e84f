//! Static Chart Renderer
//! Renders the per-country line charts and the correlation heatmap to PNG
//! files with plotters.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::ChartConfig;
use crate::data::has_column;
use crate::stats::analyzer;
use crate::stats::CorrelationMatrix;

/// A line chart over one dataset column, one line per location.
struct LineChartSpec {
    column: &'static str,
    title: &'static str,
    y_label: &'static str,
    file_stem: &'static str,
}

impl LineChartSpec {
    fn required_columns(&self) -> [&'static str; 3] {
        ["date", "location", self.column]
    }
}

const LINE_CHARTS: [LineChartSpec; 3] = [
    LineChartSpec {
        column: "total_cases",
        title: "Total COVID-19 Cases Over Time",
        y_label: "Total Cases",
        file_stem: "total_cases",
    },
    LineChartSpec {
        column: "total_deaths",
        title: "Total COVID-19 Deaths Over Time",
        y_label: "Total Deaths",
        file_stem: "total_deaths",
    },
    LineChartSpec {
        column: "new_cases",
        title: "Daily New COVID-19 Cases",
        y_label: "New Cases",
        file_stem: "new_cases",
    },
];

// Diverging scale endpoints for the heatmap.
const COLD: RGBColor = RGBColor(59, 76, 192);
const HOT: RGBColor = RGBColor(180, 4, 38);
const UNDEFINED_CELL: RGBColor = RGBColor(225, 225, 225);

pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Render the line charts best-effort: a chart whose required columns
    /// are absent is skipped with a warning instead of aborting the run.
    pub fn render_line_charts(
        &self,
        df: &DataFrame,
        locations: &[&str],
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for spec in &LINE_CHARTS {
            let missing: Vec<&str> = spec
                .required_columns()
                .iter()
                .copied()
                .filter(|name| !has_column(df, name))
                .collect();

            if !missing.is_empty() {
                warn!(chart = spec.file_stem, ?missing, "skipping chart; columns absent");
                continue;
            }

            if let Some(path) = self.render_line_chart(df, spec, locations)? {
                written.push(path);
            }
        }

        Ok(written)
    }

    fn render_line_chart(
        &self,
        df: &DataFrame,
        spec: &LineChartSpec,
        locations: &[&str],
    ) -> Result<Option<PathBuf>> {
        let series = analyzer::time_series(df, spec.column, locations)?;

        let mut start: Option<NaiveDate> = None;
        let mut end: Option<NaiveDate> = None;
        let mut y_max = f64::MIN;
        for s in &series {
            for &(date, value) in &s.points {
                start = Some(start.map_or(date, |d| d.min(date)));
                end = Some(end.map_or(date, |d| d.max(date)));
                y_max = y_max.max(value);
            }
        }
        let (Some(start), Some(mut end)) = (start, end) else {
            warn!(chart = spec.file_stem, "skipping chart; no data points");
            return Ok(None);
        };
        if end == start {
            end = end + Duration::days(1);
        }
        let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

        let path = self.config.output_dir.join(format!("{}.png", spec.file_stem));
        let root =
            BitMapBackend::new(&path, self.config.line_chart_size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(start..end, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(spec.y_label)
            .x_labels(8)
            .draw()?;

        for (index, s) in series.iter().enumerate() {
            if s.points.is_empty() {
                continue;
            }
            let color = self.config.series_color(index);
            chart
                .draw_series(LineSeries::new(s.points.iter().copied(), &color))?
                .label(s.location.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color)
                });
        }

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .draw()?;
        root.present()?;
        drop(chart);
        drop(root);

        info!(path = %path.display(), "chart written");
        Ok(Some(path))
    }

    /// Annotated correlation heatmap in the matshow layout: one cell per
    /// column pair, rows top-down.
    pub fn render_heatmap(&self, matrix: &CorrelationMatrix) -> Result<Option<PathBuf>> {
        let n = matrix.columns.len();
        if n < 2 {
            warn!("skipping heatmap; fewer than two correlation columns");
            return Ok(None);
        }

        let path = self.config.output_dir.join("correlation_heatmap.png");
        let root = BitMapBackend::new(&path, self.config.heatmap_size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Correlation Heatmap", ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(170)
            .build_cartesian_2d(0i32..n as i32, n as i32..0i32)?;

        let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
        let half_cell = (
            (plot_w / n as u32 / 2) as i32,
            (plot_h / n as u32 / 2) as i32,
        );

        let x_names = matrix.columns.clone();
        let y_names = matrix.columns.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_offset(half_cell.0)
            .y_label_offset(half_cell.1)
            .x_label_formatter(&|x| x_names.get(*x as usize).cloned().unwrap_or_default())
            .y_label_formatter(&|y| y_names.get(*y as usize).cloned().unwrap_or_default())
            .label_style(("sans-serif", 13))
            .draw()?;

        let cells = (0..n).flat_map(|row| (0..n).map(move |column| (row, column)));

        chart.draw_series(cells.clone().map(|(row, column)| {
            Rectangle::new(
                [
                    (column as i32, row as i32),
                    (column as i32 + 1, row as i32 + 1),
                ],
                diverging_color(matrix.values[row][column]).filled(),
            )
        }))?;

        chart.draw_series(cells.filter_map(|(row, column)| {
            let r = matrix.values[row][column];
            if r.is_nan() {
                return None;
            }
            let style = ("sans-serif", 15)
                .into_font()
                .color(if r.abs() > 0.6 { &WHITE } else { &BLACK })
                .pos(Pos::new(HPos::Center, VPos::Center));
            Some(
                EmptyElement::at((column as i32, row as i32))
                    + Text::new(format!("{:.2}", r), half_cell, style),
            )
        }))?;

        root.present()?;
        drop(chart);
        drop(root);
        info!(path = %path.display(), "heatmap written");
        Ok(Some(path))
    }
}

/// Blue-white-red mapping of a coefficient in [-1, 1]; NaN cells are gray.
fn diverging_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return UNDEFINED_CELL;
    }
    let t = r.clamp(-1.0, 1.0);
    let toward = if t < 0.0 { COLD } else { HOT };
    let f = t.abs();
    RGBColor(
        lerp(255, toward.0, f),
        lerp(255, toward.1, f),
        lerp(255, toward.2, f),
    )
}

fn lerp(from: u8, to: u8, f: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * f).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn line_chart_specs_require_their_own_column() {
        for spec in &LINE_CHARTS {
            assert!(spec.required_columns().contains(&spec.column));
            assert!(spec.required_columns().contains(&"date"));
        }
    }

    #[test]
    fn charts_with_missing_columns_are_skipped() {
        let df = df!(
            "location" => ["Kenya"],
            "date" => ["2021-01-01"],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(ChartConfig {
            output_dir: dir.path().to_path_buf(),
            ..ChartConfig::default()
        });

        let written = renderer.render_line_charts(&df, &["Kenya"]).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn heatmap_needs_at_least_two_columns() {
        let matrix = CorrelationMatrix {
            columns: vec!["new_cases".to_string()],
            values: vec![vec![1.0]],
        };
        let renderer = ChartRenderer::new(ChartConfig::default());
        assert!(renderer.render_heatmap(&matrix).unwrap().is_none());
    }

    #[test]
    fn diverging_scale_is_white_at_zero_and_gray_for_nan() {
        assert_eq!(diverging_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(1.0), HOT);
        assert_eq!(diverging_color(-1.0), COLD);
        assert_eq!(diverging_color(f64::NAN), UNDEFINED_CELL);
    }
}
