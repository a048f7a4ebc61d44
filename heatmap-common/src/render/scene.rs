//! Backend-independent description of a rendered heatmap

use serde::{Deserialize, Serialize};

use crate::model::HeatmapCell;

/// Light or dark page theme; only axis and text colors depend on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn axis_color(&self) -> &'static str {
        match self {
            Theme::Light => "#4b5563",
            Theme::Dark => "#9ca3af",
        }
    }

    pub fn text_color(&self) -> &'static str {
        match self {
            Theme::Light => "#1f2937",
            Theme::Dark => "#e5e7eb",
        }
    }
}

/// One drawn cell: its rectangle, fill and the datum behind it
#[derive(Debug, Clone, PartialEq)]
pub struct CellNode {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub cell: HeatmapCell,
}

impl CellNode {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything a render target needs to draw one heatmap
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Full drawing size, possibly wider than the viewport when scrolling
    pub width: f64,
    pub height: f64,
    pub title: String,
    /// Area covered by the cell grid
    pub plot: PlotArea,
    pub cells: Vec<CellNode>,
    pub year_labels: Vec<AxisLabel>,
    pub month_labels: Vec<AxisLabel>,
    pub axis_color: String,
    pub text_color: String,
}

impl Scene {
    /// Index of the cell under a point in drawing coordinates
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        self.cells.iter().position(|node| node.contains(x, y))
    }

    pub fn apply_theme(&mut self, theme: Theme) {
        self.axis_color = theme.axis_color().to_string();
        self.text_color = theme.text_color().to_string();
    }
}
