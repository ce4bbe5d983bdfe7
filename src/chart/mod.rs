//! Horizontal bar chart for key/value series
//!
//! Widths are computed in pixels: the largest value maps to `max - 50` and
//! every bar gets a fixed 45 px allowance for its label. The terminal and SVG
//! outputs both start from the same [`Bar`] list.

pub mod svg;

use crate::feed::schema::KeyVal;

/// Pixels taken off the top of the value range
pub const RANGE_MARGIN_PX: f64 = 50.0;

/// Pixels added to every bar for its label
pub const LABEL_ALLOWANCE_PX: f64 = 45.0;

/// Bar height when the config does not set one
pub const DEFAULT_BAR_HEIGHT_PX: u32 = 20;

/// Tallest bar the renderer will draw
pub const MAX_BAR_HEIGHT_PX: u32 = 1_000;

/// Linear map from `[0, max]` onto `[0, max - 50]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    max: f64,
}

impl LinearScale {
    pub fn new(max: f64) -> Self {
        Self { max }
    }

    /// Build a scale from the largest value in the series
    pub fn for_entries(entries: &[KeyVal]) -> Self {
        let max = entries
            .iter()
            .map(KeyVal::value)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
            .unwrap_or(0.0);
        Self::new(max)
    }

    /// A zero maximum has no range to map onto; every value scales to 0
    pub fn apply(&self, value: f64) -> f64 {
        if self.max == 0.0 {
            return 0.0;
        }
        value * (self.max - RANGE_MARGIN_PX) / self.max
    }
}

/// One rendered bar
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub key: String,
    /// Value as the server wrote it
    pub value: String,
    pub width_px: f64,
    pub height_px: u32,
}

impl Bar {
    /// `"{key} = {value}"`
    pub fn label(&self) -> String {
        format!("{} = {}", self.key, self.value)
    }
}

/// Computes bars for a series; stateless apart from the bar height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartRenderer {
    bar_height_px: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_HEIGHT_PX)
    }
}

impl ChartRenderer {
    /// Heights above [`MAX_BAR_HEIGHT_PX`] are clamped
    pub fn new(bar_height_px: u32) -> Self {
        Self {
            bar_height_px: bar_height_px.min(MAX_BAR_HEIGHT_PX),
        }
    }

    /// One bar per entry, in input order
    pub fn render(&self, entries: &[KeyVal]) -> Vec<Bar> {
        let scale = LinearScale::for_entries(entries);
        entries
            .iter()
            .map(|entry| Bar {
                key: entry.key(),
                value: entry.value_text(),
                width_px: scale.apply(entry.value()) + LABEL_ALLOWANCE_PX,
                height_px: self.bar_height_px,
            })
            .collect()
    }
}

/// Widest bar in the list, or 0 for an empty list
pub fn max_width_px(bars: &[Bar]) -> f64 {
    bars.iter().map(|b| b.width_px).fold(0.0, f64::max)
}

/// Map a pixel width onto `columns` terminal cells, relative to the widest bar
pub fn cells_for(width_px: f64, max_width_px: f64, columns: u16) -> u16 {
    if max_width_px <= 0.0 || width_px <= 0.0 {
        return 0;
    }
    let ratio = (width_px / max_width_px).min(1.0);
    (ratio * columns as f64).round() as u16
}

/// Plain text rendering, one line per bar
pub fn render_text(bars: &[Bar], columns: u16) -> Vec<String> {
    let label_width = bars.iter().map(|b| b.label().chars().count()).max().unwrap_or(0);
    let max_px = max_width_px(bars);
    bars.iter()
        .map(|bar| {
            let cells = cells_for(bar.width_px, max_px, columns) as usize;
            format!(
                "{:<width$} {} {}px",
                bar.label(),
                "█".repeat(cells),
                bar.width_px,
                width = label_width
            )
        })
        .collect()
}
