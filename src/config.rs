//! Chart configuration
//! Explicit styling passed to the renderers at construction; nothing here
//! is ambient global state.

use plotters::style::RGBColor;
use std::path::PathBuf;

/// Per-location line colors, control blue first.
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(255, 87, 34),   // Deep Orange
    RGBColor(121, 85, 72),   // Brown
];

#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Directory all chart artifacts are written to.
    pub output_dir: PathBuf,
    pub line_chart_size: (u32, u32),
    pub heatmap_size: (u32, u32),
    pub palette: Vec<RGBColor>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            line_chart_size: (1000, 600),
            heatmap_size: (800, 700),
            palette: PALETTE.to_vec(),
        }
    }
}

impl ChartConfig {
    /// Color for the series at `index`, cycling through the palette.
    pub fn series_color(&self, index: usize) -> RGBColor {
        self.palette[index % self.palette.len()]
    }
}
