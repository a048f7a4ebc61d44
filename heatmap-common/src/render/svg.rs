//! SVG backend
//!
//! `SvgTarget` keeps the cell layer and the axis layer as separate
//! fragments so a theme change only regenerates the axes.

use std::fmt::Write;

use super::scene::{Scene, Theme};
use super::RenderTarget;
use crate::color::ColorScale;
use crate::model::HeatmapCell;
use crate::ticks::rounded_ticks;

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Tooltip text for a cell
pub fn cell_label(cell: &HeatmapCell, month_name: &str) -> String {
    let value = match (&cell.formatted_value, cell.value) {
        (Some(formatted), Some(_)) => formatted.clone(),
        (_, Some(v)) => format!("{:.2}", v),
        (_, None) => "No data".to_string(),
    };
    format!("{} {}: {}", month_name, cell.year, value)
}

/// Render target producing an SVG document
#[derive(Debug, Clone, Default)]
pub struct SvgTarget {
    header: String,
    cells: String,
    axes: String,
    months: Vec<String>,
}

impl SvgTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete SVG document, empty after `clear`
    pub fn svg(&self) -> String {
        if self.header.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(self.header.len() + self.cells.len() + self.axes.len() + 16);
        out.push_str(&self.header);
        out.push_str(&self.cells);
        out.push_str(&self.axes);
        out.push_str("</svg>\n");
        out
    }

    fn write_axes(&mut self, scene: &Scene) {
        let mut axes = String::new();
        let plot = scene.plot;
        let _ = writeln!(
            axes,
            r#"<g class="axes" font-family="sans-serif" font-size="11" fill="{}">"#,
            escape_xml(&scene.text_color)
        );
        let _ = writeln!(
            axes,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"/>"#,
            plot.x,
            plot.y + plot.height,
            plot.x + plot.width,
            plot.y + plot.height,
            escape_xml(&scene.axis_color)
        );
        let _ = writeln!(
            axes,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"/>"#,
            plot.x,
            plot.y,
            plot.x,
            plot.y + plot.height,
            escape_xml(&scene.axis_color)
        );
        for label in scene.year_labels.iter().chain(scene.month_labels.iter()) {
            let _ = writeln!(
                axes,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="{}">{}</text>"#,
                label.x,
                label.y,
                label.anchor.as_str(),
                escape_xml(&label.text)
            );
        }
        axes.push_str("</g>\n");
        self.axes = axes;
    }
}

impl RenderTarget for SvgTarget {
    fn draw(&mut self, scene: &Scene) {
        self.months = scene.month_labels.iter().map(|l| l.text.clone()).collect();

        let mut header = String::new();
        let _ = writeln!(
            header,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" role="img" aria-label="{title}">"#,
            w = scene.width,
            h = scene.height,
            title = escape_xml(&scene.title)
        );
        self.header = header;

        let mut cells = String::with_capacity(scene.cells.len() * 160);
        cells.push_str("<g class=\"cells\">\n");
        for node in &scene.cells {
            let cell = &node.cell;
            let month_name = self
                .months
                .get(usize::from(cell.month.saturating_sub(1)))
                .map(String::as_str)
                .unwrap_or("");
            let value = cell.value.map(|v| v.to_string()).unwrap_or_default();
            let label = escape_xml(&cell_label(cell, month_name));
            let _ = writeln!(
                cells,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" data-year="{}" data-month="{}" data-value="{}" data-source="{}" data-label="{}"><title>{}</title></rect>"#,
                node.x,
                node.y,
                node.width,
                node.height,
                escape_xml(&node.fill),
                cell.year,
                cell.month,
                value,
                escape_xml(&cell.source),
                label,
                label
            );
        }
        cells.push_str("</g>\n");
        self.cells = cells;

        self.write_axes(scene);
    }

    fn restyle_axes(&mut self, scene: &Scene) {
        if self.header.is_empty() {
            return;
        }
        self.write_axes(scene);
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Horizontal gradient legend for a color scale, with rounded ticks
///
/// `gradient_id` must be unique within the page the legend is embedded in.
pub fn legend_svg(scale: &ColorScale, width: f64, theme: Theme, label: &str, gradient_id: &str) -> String {
    const STOPS: usize = 10;
    const BAR_HEIGHT: f64 = 12.0;
    const PAD: f64 = 16.0;

    let width = width.max(PAD * 2.0 + 1.0);
    let bar_width = width - PAD * 2.0;
    let (lo, hi) = scale.extent();
    let height = 52.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="legend" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = width,
        h = height
    );
    let gradient_id = escape_xml(gradient_id);
    let _ = writeln!(
        svg,
        r#"<defs><linearGradient id="{}" x1="0" x2="1" y1="0" y2="0">"#,
        gradient_id
    );
    for i in 0..=STOPS {
        let t = i as f64 / STOPS as f64;
        let value = lo + (hi - lo) * t;
        let _ = writeln!(
            svg,
            r#"<stop offset="{:.0}%" stop-color="{}"/>"#,
            t * 100.0,
            scale.color(Some(value))
        );
    }
    svg.push_str("</linearGradient></defs>\n");

    let _ = writeln!(
        svg,
        r#"<text x="{:.2}" y="12" font-family="sans-serif" font-size="11" fill="{}">{}</text>"#,
        PAD,
        theme.text_color(),
        escape_xml(label)
    );
    let bar_y = 18.0;
    let _ = writeln!(
        svg,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="url(#{})"/>"#,
        PAD, bar_y, bar_width, BAR_HEIGHT, gradient_id
    );

    let ticks = if hi > lo {
        rounded_ticks(lo, hi, 5)
    } else {
        vec![lo]
    };
    for tick in ticks {
        let x = if hi > lo {
            PAD + (tick - lo) / (hi - lo) * bar_width
        } else {
            PAD + bar_width / 2.0
        };
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{c}"/><text x="{x:.2}" y="{ty:.2}" text-anchor="middle" font-family="sans-serif" font-size="10" fill="{t}">{v}</text>"#,
            x = x,
            y1 = bar_y + BAR_HEIGHT,
            y2 = bar_y + BAR_HEIGHT + 4.0,
            ty = bar_y + BAR_HEIGHT + 15.0,
            c = theme.axis_color(),
            t = theme.text_color(),
            v = tick
        );
    }
    svg.push_str("</svg>\n");
    svg
}
