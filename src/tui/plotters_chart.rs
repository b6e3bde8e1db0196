//! Plotters-powered price chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Line colours, in series order.
pub const SERIES_COLORS: [RGBColor; 2] = [RGBColor(0, 255, 255), RGBColor(255, 200, 0)];

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; x values are
/// days since `start`.
pub struct FuelChart<'a> {
    /// First series line.
    pub primary: &'a [(f64, f64)],
    /// Second series line (comparison view only).
    pub secondary: Option<&'a [(f64, f64)]>,
    /// Date at x = 0.
    pub start: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
}

impl<'a> FuelChart<'a> {
    /// Bounds that fit every point with 5% vertical padding.
    pub fn bounds_for(series: &[&[(f64, f64)]]) -> ([f64; 2], [f64; 2]) {
        let (mut x_max, mut y_min, mut y_max) = (1.0_f64, f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in series.iter().flat_map(|s| s.iter()) {
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            return ([0.0, x_max], [0.0, 1.0]);
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-6);
        ([0.0, x_max], [y_min - pad, y_max + pad])
    }

    fn date_at(&self, x: f64) -> String {
        (self.start + Duration::days(x.round() as i64))
            .format("%Y-%m-%d")
            .to_string()
    }
}

impl<'a> Widget for FuelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(self.y_label)
                .x_labels(3)
                .y_labels(5)
                .x_label_formatter(&|v| self.date_at(*v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Second series first so the first one stays on top.
            if let Some(secondary) = self.secondary {
                chart.draw_series(LineSeries::new(secondary.iter().copied(), &SERIES_COLORS[1]))?;
            }
            chart.draw_series(LineSeries::new(self.primary.iter().copied(), &SERIES_COLORS[0]))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
