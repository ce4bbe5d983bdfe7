//! SVG export of a bar list

use anyhow::{anyhow, Result};
use plotters::prelude::*;

use super::{max_width_px, Bar};

const BAR_GAP_PX: u32 = 4;
const TEXT_INSET_PX: i32 = 4;
const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);

/// Draw one `rect` and one `text` per bar into an SVG document
pub fn render_svg(bars: &[Bar]) -> Result<String> {
    let width = max_width_px(bars).ceil().max(1.0) as u32;
    let row_height = bars
        .first()
        .map(|b| b.height_px)
        .unwrap_or(0)
        .saturating_add(BAR_GAP_PX);
    let rows = u32::try_from(bars.len()).unwrap_or(u32::MAX);
    let height = row_height.saturating_mul(rows).max(1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();

        for (i, bar) in bars.iter().enumerate() {
            let top = pixel(row_height.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX)));
            let right = bar.width_px.max(0.0).round() as i32;
            let bottom = top.saturating_add(pixel(bar.height_px));

            root.draw(&Rectangle::new([(0, top), (right, bottom)], BAR_COLOR.filled()))
                .map_err(|e| anyhow!("Failed to draw bar {}: {}", bar.key, e))?;

            let font_px = (bar.height_px as f64 - 6.0).max(6.0);
            let style = ("sans-serif", font_px).into_font().color(&WHITE);
            root.draw(&Text::new(bar.label(), (TEXT_INSET_PX, top.saturating_add(3)), style))
                .map_err(|e| anyhow!("Failed to draw label {}: {}", bar.key, e))?;
        }

        root.present()
            .map_err(|e| anyhow!("Failed to finish chart: {}", e))?;
    }

    Ok(svg)
}

/// Drawing coordinates are `i32`; anything beyond saturates
fn pixel(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}
