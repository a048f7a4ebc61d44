//! Heatmap rendering
//!
//! `HeatmapRenderer` turns a series into a backend-independent `Scene`
//! (cell rectangles, axis labels, colors) and hands it to a `RenderTarget`.
//! The SVG backend lives in [`svg`]; other backends only need to implement
//! `RenderTarget`.
//!
//! Construction, `update` and `resize` all go through the same layout
//! path. Theme changes only restyle the axes.

pub mod band;
pub mod scene;
pub mod svg;

use std::collections::BTreeSet;

use tracing::debug;

use crate::color::{create_color_scale, ColorScale};
use crate::model::{ColorScaleConfig, HeatmapCell, SeriesMetadata, YearRange, MONTH_LABELS};
use crate::observable::Subscription;
use crate::ticks::labelled_years;

pub use band::BandScale;
pub use scene::{AxisLabel, CellNode, PlotArea, Scene, TextAnchor, Theme};
pub use svg::{escape_xml, legend_svg, SvgTarget};

/// Narrowest cell allowed, as a fraction of the cell height
pub const MIN_CELL_WIDTH_RATIO: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 30.0,
            left: 40.0,
        }
    }
}

/// Size and styling of one heatmap
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Viewport width in pixels
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Fraction of each band left empty between cells
    pub cell_padding: f64,
    pub min_cell_width_ratio: f64,
    /// Minimum horizontal room per year label
    pub year_label_spacing_px: f64,
    /// Overrides the series' own color scale (unified comparisons)
    pub color_scale: Option<ColorScaleConfig>,
    pub theme: Theme,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 300.0,
            margin: Margin::default(),
            cell_padding: 0.05,
            min_cell_width_ratio: MIN_CELL_WIDTH_RATIO,
            year_label_spacing_px: 40.0,
            color_scale: None,
            theme: Theme::default(),
        }
    }
}

/// Pointer position in drawing coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Whether the drawing is wider than its viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollInfo {
    pub scrollable: bool,
    pub content_width: f64,
    pub viewport_width: f64,
}

/// Invoked with the entered cell, or `None` when the pointer leaves a cell
pub type HoverCallback = Box<dyn FnMut(Option<&HeatmapCell>, &PointerEvent) + Send>;

/// Graphics backend the renderer draws into
pub trait RenderTarget {
    /// Replace everything drawn with `scene`
    fn draw(&mut self, scene: &Scene);

    /// Re-apply axis and text colors from `scene` without touching cells
    fn restyle_axes(&mut self, scene: &Scene);

    fn clear(&mut self);
}

/// One heatmap bound to a render target
pub struct HeatmapRenderer<T: RenderTarget> {
    target: T,
    series: SeriesMetadata,
    year_filter: Option<YearRange>,
    config: RenderConfig,
    hover: Option<HoverCallback>,
    theme_rx: Option<Subscription<Theme>>,
    scene: Scene,
    scroll: ScrollInfo,
    hovered: Option<usize>,
    last_pointer: PointerEvent,
}

impl<T: RenderTarget> HeatmapRenderer<T> {
    /// Create the renderer and draw `series` immediately
    pub fn new(
        target: T,
        series: SeriesMetadata,
        config: RenderConfig,
        hover: Option<HoverCallback>,
    ) -> Self {
        let mut renderer = Self {
            target,
            series,
            year_filter: None,
            config,
            hover,
            theme_rx: None,
            scene: Scene::default(),
            scroll: ScrollInfo::default(),
            hovered: None,
            last_pointer: PointerEvent::default(),
        };
        renderer.render();
        renderer
    }

    /// Swap in a new series and optional year filter, then redraw
    ///
    /// `None` shows the series' full span.
    pub fn update(&mut self, series: SeriesMetadata, year_range: Option<YearRange>) {
        self.series = series;
        self.year_filter = year_range;
        self.render();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
        self.render();
    }

    /// Replace the color scale override and redraw
    pub fn set_color_scale(&mut self, config: Option<ColorScaleConfig>) {
        self.config.color_scale = config;
        self.render();
    }

    /// Clear the target and hand it back
    pub fn destroy(mut self) -> T {
        self.target.clear();
        self.target
    }

    pub fn scroll_info(&self) -> ScrollInfo {
        self.scroll
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn series(&self) -> &SeriesMetadata {
        &self.series
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    /// Years currently drawn
    pub fn visible_years(&self) -> Vec<i32> {
        visible_years(&self.series, self.year_filter)
    }

    /// Track pointer movement, firing the hover callback on cell changes
    ///
    /// Moving from one cell straight into another reports the leave
    /// (`None`) before the enter.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.last_pointer = event;
        let hit = self.scene.hit_test(event.x, event.y);
        if hit == self.hovered {
            return;
        }
        let previous = std::mem::replace(&mut self.hovered, hit);
        if let Some(callback) = self.hover.as_mut() {
            if previous.is_some() {
                callback(None, &event);
            }
            if let Some(index) = hit {
                callback(Some(&self.scene.cells[index].cell), &event);
            }
        }
    }

    pub fn pointer_leave(&mut self, event: PointerEvent) {
        self.last_pointer = event;
        if self.hovered.take().is_some() {
            if let Some(callback) = self.hover.as_mut() {
                callback(None, &event);
            }
        }
    }

    /// Follow an external theme signal
    ///
    /// The current value is applied right away; later changes are picked
    /// up by `sync_theme`.
    pub fn watch_theme(&mut self, subscription: Subscription<Theme>) {
        let theme = subscription.get();
        self.theme_rx = Some(subscription);
        self.set_theme(theme);
    }

    /// Apply a pending theme change, returning whether one was applied
    pub fn sync_theme(&mut self) -> bool {
        let changed = self.theme_rx.as_mut().and_then(|rx| rx.take_changed());
        match changed {
            Some(theme) => {
                self.set_theme(theme);
                true
            }
            None => false,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.config.theme == theme && !self.scene.axis_color.is_empty() {
            return;
        }
        self.config.theme = theme;
        self.scene.apply_theme(theme);
        self.target.restyle_axes(&self.scene);
    }

    fn render(&mut self) {
        let years = visible_years(&self.series, self.year_filter);
        let scale_config = self
            .config
            .color_scale
            .as_ref()
            .unwrap_or(&self.series.color_scale);
        let scale = create_color_scale(scale_config, &self.series.metric);

        let (scene, scroll) = layout(&self.series, &years, &scale, &self.config);
        debug!(
            entity = %self.series.entity.code,
            years = years.len(),
            cells = scene.cells.len(),
            scrollable = scroll.scrollable,
            "Heatmap laid out"
        );

        // the hovered cell is gone once the scene is replaced
        if self.hovered.take().is_some() {
            if let Some(callback) = self.hover.as_mut() {
                callback(None, &self.last_pointer);
            }
        }
        self.scene = scene;
        self.scroll = scroll;
        self.target.draw(&self.scene);
    }
}

/// Series years inside `filter` (default: the series' own span)
fn visible_years(series: &SeriesMetadata, filter: Option<YearRange>) -> Vec<i32> {
    let years: BTreeSet<i32> = if series.years.is_empty() {
        series.data.iter().map(|c| c.year).collect()
    } else {
        series.years.iter().copied().collect()
    };
    match filter.or_else(|| series.year_span()) {
        Some(range) => years.into_iter().filter(|y| range.contains(*y)).collect(),
        None => Vec::new(),
    }
}

fn layout(
    series: &SeriesMetadata,
    years: &[i32],
    scale: &ColorScale,
    config: &RenderConfig,
) -> (Scene, ScrollInfo) {
    let margin = config.margin;
    let inner_width = (config.width - margin.left - margin.right).max(0.0);
    let inner_height = (config.height - margin.top - margin.bottom).max(0.0);

    let cell_height = inner_height / MONTH_LABELS.len() as f64;
    let min_cell_width = cell_height * config.min_cell_width_ratio;
    let mut content_width = inner_width;
    let mut scrollable = false;
    if !years.is_empty() && inner_width / (years.len() as f64) < min_cell_width {
        content_width = min_cell_width * years.len() as f64;
        scrollable = true;
    }

    let x = BandScale::new(
        years.to_vec(),
        (margin.left, margin.left + content_width),
        config.cell_padding,
    );
    let months: Vec<u8> = (1..=12).collect();
    let y = BandScale::new(
        months.clone(),
        (margin.top, margin.top + inner_height),
        config.cell_padding,
    );

    let cells = series
        .data
        .iter()
        .filter_map(|cell| {
            let cx = x.position(&cell.year)?;
            let cy = y.position(&cell.month)?;
            Some(CellNode {
                x: cx,
                y: cy,
                width: x.bandwidth(),
                height: y.bandwidth(),
                fill: scale.color(cell.value),
                cell: cell.clone(),
            })
        })
        .collect();

    let max_labels = (content_width / config.year_label_spacing_px.max(1.0)).floor() as usize;
    let label_y = margin.top + inner_height + 16.0;
    let year_labels = labelled_years(years, max_labels.max(1))
        .into_iter()
        .filter_map(|year| {
            Some(AxisLabel {
                text: year.to_string(),
                x: x.position(&year)? + x.bandwidth() / 2.0,
                y: label_y,
                anchor: TextAnchor::Middle,
            })
        })
        .collect();

    let month_labels = months
        .iter()
        .filter_map(|month| {
            let index = usize::from(*month - 1);
            let text = series
                .months
                .get(index)
                .cloned()
                .unwrap_or_else(|| MONTH_LABELS[index].to_string());
            Some(AxisLabel {
                text,
                x: margin.left - 6.0,
                y: y.position(month)? + y.bandwidth() / 2.0 + 4.0,
                anchor: TextAnchor::End,
            })
        })
        .collect();

    let mut scene = Scene {
        width: content_width + margin.left + margin.right,
        height: config.height.max(0.0),
        title: series.title.clone(),
        plot: PlotArea {
            x: margin.left,
            y: margin.top,
            width: content_width,
            height: inner_height,
        },
        cells,
        year_labels,
        month_labels,
        axis_color: String::new(),
        text_color: String::new(),
    };
    scene.apply_theme(config.theme);

    let scroll = ScrollInfo {
        scrollable,
        content_width: scene.width,
        viewport_width: config.width,
    };
    (scene, scroll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NULL_COLOR;
    use crate::observable::Observable;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct RecordingTarget {
        draws: usize,
        restyles: usize,
        cleared: bool,
        last: Option<Scene>,
    }

    impl RenderTarget for RecordingTarget {
        fn draw(&mut self, scene: &Scene) {
            self.draws += 1;
            self.last = Some(scene.clone());
        }

        fn restyle_axes(&mut self, scene: &Scene) {
            self.restyles += 1;
            if let Some(last) = self.last.as_mut() {
                last.axis_color = scene.axis_color.clone();
                last.text_color = scene.text_color.clone();
            }
        }

        fn clear(&mut self) {
            self.cleared = true;
            self.last = None;
        }
    }

    fn series(start: i32, end: i32) -> SeriesMetadata {
        let mut data = Vec::new();
        for year in start..=end {
            for month in 1..=12u8 {
                let value = if month == 6 { None } else { Some(f64::from(month)) };
                data.push(HeatmapCell::new(year, month, value, "UN"));
            }
        }
        SeriesMetadata {
            entity: crate::model::EntityRef {
                code: "norway".to_string(),
                name: "Norway".to_string(),
            },
            metric: "daily_fertility_rate".to_string(),
            title: "Daily births".to_string(),
            subtitle: None,
            years: (start..=end).collect(),
            months: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            color_scale: ColorScaleConfig::sequential(1.0, 12.0, "turbo"),
            data,
            sources: vec!["UN".to_string()],
            generated_at: None,
        }
    }

    fn config() -> RenderConfig {
        RenderConfig {
            width: 540.0,
            height: 280.0,
            margin: Margin {
                top: 10.0,
                right: 20.0,
                bottom: 30.0,
                left: 40.0,
            },
            cell_padding: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_draw_covers_every_cell() {
        let renderer = HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2009), config(), None);
        let target = renderer.target();
        assert_eq!(target.draws, 1);
        let scene = target.last.as_ref().unwrap();
        assert_eq!(scene.cells.len(), 120);
        assert_eq!(scene.month_labels.len(), 12);
        assert!(!renderer.scroll_info().scrollable);

        // 480 / 10 years, 240 / 12 months
        let first = &scene.cells[0];
        assert!((first.x - 40.0).abs() < 1e-9);
        assert!((first.width - 48.0).abs() < 1e-9);
        assert!((first.height - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_null_cells_use_null_color() {
        let renderer = HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2001), config(), None);
        let june: Vec<_> = renderer.scene().cells.iter().filter(|n| n.cell.month == 6).collect();
        assert_eq!(june.len(), 2);
        assert!(june.iter().all(|n| n.fill == NULL_COLOR));
        assert!(renderer
            .scene()
            .cells
            .iter()
            .filter(|n| n.cell.month != 6)
            .all(|n| n.fill != NULL_COLOR));
    }

    #[test]
    fn test_update_applies_year_filter() {
        let mut renderer = HeatmapRenderer::new(RecordingTarget::default(), series(1990, 2009), config(), None);
        renderer.update(series(1990, 2009), Some(YearRange::new(2000, 2004)));
        assert_eq!(renderer.visible_years(), vec![2000, 2001, 2002, 2003, 2004]);
        assert_eq!(renderer.scene().cells.len(), 60);
        assert_eq!(renderer.target().draws, 2);

        renderer.update(series(1990, 2009), None);
        assert_eq!(renderer.visible_years().len(), 20);
    }

    #[test]
    fn test_filter_outside_series_shows_nothing() {
        let mut renderer = HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2002), config(), None);
        renderer.update(series(2000, 2002), Some(YearRange::new(1950, 1960)));
        assert!(renderer.scene().cells.is_empty());
        assert!(renderer.scene().year_labels.is_empty());
    }

    #[test]
    fn test_narrow_viewport_becomes_scrollable() {
        // 240px / 12 months = 20px cells, floor is 5px wide; 200 years need 1000px
        let renderer = HeatmapRenderer::new(RecordingTarget::default(), series(1800, 1999), config(), None);
        let info = renderer.scroll_info();
        assert!(info.scrollable);
        assert!((info.content_width - 1060.0).abs() < 1e-9);
        assert!((info.viewport_width - 540.0).abs() < 1e-9);
        let widths: Vec<f64> = renderer.scene().cells.iter().map(|n| n.width).collect();
        assert!(widths.iter().all(|w| (*w - 5.0).abs() < 1e-9));
    }

    #[test]
    fn test_resize_uses_update_path() {
        let mut renderer = HeatmapRenderer::new(RecordingTarget::default(), series(1800, 1999), config(), None);
        assert!(renderer.scroll_info().scrollable);
        renderer.resize(1400.0, 280.0);
        assert_eq!(renderer.target().draws, 2);
        assert!(!renderer.scroll_info().scrollable);
        assert_eq!(renderer.scene().cells.len(), 2400);
    }

    #[test]
    fn test_year_labels_thinned() {
        let renderer = HeatmapRenderer::new(RecordingTarget::default(), series(1951, 2000), config(), None);
        let labels: Vec<&str> = renderer.scene().year_labels.iter().map(|l| l.text.as_str()).collect();
        assert!(labels.len() <= 12);
        assert_eq!(labels.first(), Some(&"1955"));
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let events: Arc<Mutex<Vec<Option<(i32, u8)>>>> = Arc::default();
        let sink = events.clone();
        let callback: HoverCallback = Box::new(move |cell, _event| {
            sink.lock().unwrap().push(cell.map(|c| c.key()));
        });
        let mut renderer =
            HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2009), config(), Some(callback));

        // first cell spans x 40..88, y 10..30
        renderer.pointer_move(PointerEvent::new(50.0, 15.0));
        renderer.pointer_move(PointerEvent::new(55.0, 20.0));
        // next year, same month
        renderer.pointer_move(PointerEvent::new(100.0, 20.0));
        renderer.pointer_leave(PointerEvent::new(0.0, 0.0));
        renderer.pointer_leave(PointerEvent::new(0.0, 0.0));

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![Some((2000, 1)), None, Some((2001, 1)), None]
        );
    }

    #[test]
    fn test_redraw_reports_leave_for_hovered_cell() {
        let events: Arc<Mutex<Vec<bool>>> = Arc::default();
        let sink = events.clone();
        let callback: HoverCallback = Box::new(move |cell, _event| sink.lock().unwrap().push(cell.is_some()));
        let mut renderer =
            HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2009), config(), Some(callback));

        renderer.pointer_move(PointerEvent::new(50.0, 15.0));
        renderer.update(series(2000, 2009), Some(YearRange::new(2001, 2001)));
        renderer.pointer_leave(PointerEvent::new(0.0, 0.0));
        renderer.resize(600.0, 280.0);

        assert_eq!(*events.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_hover_outside_cells_is_silent() {
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let callback: HoverCallback = Box::new(move |_, _| *sink.lock().unwrap() += 1);
        let mut renderer =
            HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2001), config(), Some(callback));
        renderer.pointer_move(PointerEvent::new(5.0, 5.0));
        renderer.pointer_leave(PointerEvent::new(5.0, 5.0));
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_theme_change_restyles_axes_only() {
        let theme = Observable::new(Theme::Light);
        let mut renderer = HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2001), config(), None);
        renderer.watch_theme(theme.subscribe());
        assert!(!renderer.sync_theme());

        theme.set(Theme::Dark);
        assert!(renderer.sync_theme());
        assert!(!renderer.sync_theme());

        let target = renderer.target();
        assert_eq!(target.draws, 1);
        assert_eq!(target.restyles, 1);
        let drawn = target.last.as_ref().unwrap();
        assert_eq!(drawn.axis_color, Theme::Dark.axis_color());
        assert_eq!(renderer.theme(), Theme::Dark);
    }

    #[test]
    fn test_color_scale_override() {
        let mut renderer = HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2000), config(), None);
        let before = renderer.scene().cells[0].fill.clone();
        renderer.set_color_scale(Some(ColorScaleConfig::sequential(0.0, 2.0, "turbo")));
        let after = renderer.scene().cells[0].fill.clone();
        assert_ne!(before, after);
    }

    #[test]
    fn test_destroy_clears_target() {
        let renderer = HeatmapRenderer::new(RecordingTarget::default(), series(2000, 2000), config(), None);
        let target = renderer.destroy();
        assert!(target.cleared);
        assert!(target.last.is_none());
    }
}
