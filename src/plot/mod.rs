//! Chart rendering with Plotters.
//!
//! Every chart implements [`Chart`], which draws onto any Plotters
//! `DrawingArea`. The same drawing code therefore targets:
//! - PNG files (`BitMapBackend`)
//! - SVG files (`SVGBackend`)
//! - the terminal viewer (`plotters-ratatui-backend`, see `crate::tui`)
//!
//! Text is rasterized with `ab_glyph` from a bundled DejaVu Sans, registered
//! once by [`register_fonts`] before the first draw.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::info;

use crate::app::pipeline::AnalysisRun;
use crate::domain::ChartFormat;
use crate::error::AppError;

pub mod correlation;
pub mod cumulative;
pub mod inflation_returns;
pub mod regimes;

pub use correlation::RollingCorrelationChart;
pub use cumulative::CumulativeReturnsChart;
pub use inflation_returns::InflationReturnsChart;
pub use regimes::RegimeComparisonChart;

pub const INFLATION_COLOR: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
pub const RETURN_COLOR: RGBColor = RGBColor(0x34, 0x98, 0xdb);
pub const NOMINAL_COLOR: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
pub const REAL_COLOR: RGBColor = RGBColor(0x9b, 0x59, 0xb6);
pub const CORRELATION_COLOR: RGBColor = RGBColor(0x16, 0xa0, 0x85);
/// Low, Moderate, High.
pub const REGIME_COLORS: [RGBColor; 3] = [
    RGBColor(0x34, 0x98, 0xdb),
    RGBColor(0xf3, 0x9c, 0x12),
    RGBColor(0xe7, 0x4c, 0x3c),
];

/// Family name every chart asks for.
pub const FONT_FAMILY: &str = "sans-serif";

static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Cartesian chart context used by every time-series chart.
pub(crate) type XyChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// A chart that can be drawn on any Plotters backend.
pub trait Chart {
    fn title(&self) -> &'static str;

    /// Preferred pixel size for image output.
    fn image_size(&self) -> (u32, u32) {
        (1200, 700)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB>;
}

/// Visual parameters that differ between image files and the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    /// `None` leaves the target untouched (terminal buffers are already cleared).
    pub background: Option<RGBColor>,
    pub foreground: RGBColor,
    pub grid: RGBColor,
    pub caption: bool,
    pub title_size: u32,
    pub label_size: u32,
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub mesh: bool,
    pub line_width: u32,
}

impl ChartStyle {
    pub fn image() -> Self {
        Self {
            background: Some(WHITE),
            foreground: BLACK,
            grid: RGBColor(220, 220, 220),
            caption: true,
            title_size: 24,
            label_size: 14,
            margin: 15,
            x_label_area: 40,
            y_label_area: 70,
            mesh: true,
            line_width: 2,
        }
    }

    /// High-contrast, compact layout for low-resolution terminal cells.
    pub fn terminal() -> Self {
        Self {
            background: None,
            foreground: WHITE,
            grid: RGBColor(90, 90, 90),
            caption: false,
            title_size: 10,
            label_size: 10,
            margin: 1,
            x_label_area: 3,
            y_label_area: 8,
            mesh: false,
            line_width: 1,
        }
    }

    pub(crate) fn font(&self) -> TextStyle<'static> {
        (FONT_FAMILY, self.label_size).into_font().color(&self.foreground)
    }

    pub(crate) fn title_font(&self) -> TextStyle<'static> {
        (FONT_FAMILY, self.title_size).into_font().color(&self.foreground)
    }
}

/// The four analysis charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    InflationReturns,
    Cumulative,
    Correlation,
    Regimes,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::InflationReturns,
        ChartKind::Cumulative,
        ChartKind::Correlation,
        ChartKind::Regimes,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::InflationReturns => "inflation_vs_returns",
            ChartKind::Cumulative => "cumulative_returns",
            ChartKind::Correlation => "rolling_correlation",
            ChartKind::Regimes => "inflation_regimes",
        }
    }
}

/// Closed set of charts, so heterogeneous charts can share a `Vec`.
pub enum AnyChart<'a> {
    InflationReturns(InflationReturnsChart<'a>),
    Cumulative(CumulativeReturnsChart<'a>),
    Correlation(RollingCorrelationChart<'a>),
    Regimes(RegimeComparisonChart<'a>),
}

impl<'a> AnyChart<'a> {
    pub fn build(kind: ChartKind, run: &'a AnalysisRun) -> Self {
        match kind {
            ChartKind::InflationReturns => AnyChart::InflationReturns(InflationReturnsChart::from_run(run)),
            ChartKind::Cumulative => AnyChart::Cumulative(CumulativeReturnsChart::from_run(run)),
            ChartKind::Correlation => AnyChart::Correlation(RollingCorrelationChart::from_run(run)),
            ChartKind::Regimes => AnyChart::Regimes(RegimeComparisonChart::from_run(run)),
        }
    }

    pub fn all(run: &'a AnalysisRun) -> Vec<Self> {
        ChartKind::ALL.iter().map(|&kind| Self::build(kind, run)).collect()
    }
}

impl Chart for AnyChart<'_> {
    fn title(&self) -> &'static str {
        match self {
            AnyChart::InflationReturns(c) => c.title(),
            AnyChart::Cumulative(c) => c.title(),
            AnyChart::Correlation(c) => c.title(),
            AnyChart::Regimes(c) => c.title(),
        }
    }

    fn image_size(&self) -> (u32, u32) {
        match self {
            AnyChart::InflationReturns(c) => c.image_size(),
            AnyChart::Cumulative(c) => c.image_size(),
            AnyChart::Correlation(c) => c.image_size(),
            AnyChart::Regimes(c) => c.image_size(),
        }
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        match self {
            AnyChart::InflationReturns(c) => c.draw(root, style),
            AnyChart::Cumulative(c) => c.draw(root, style),
            AnyChart::Correlation(c) => c.draw(root, style),
            AnyChart::Regimes(c) => c.draw(root, style),
        }
    }
}

/// Register the bundled font with Plotters. Safe to call repeatedly.
pub fn register_fonts() -> Result<(), AppError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();

    let ok = *REGISTERED.get_or_init(|| {
        plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(AppError::Render(format!("bundled font for `{FONT_FAMILY}` could not be loaded")))
    }
}

/// Render `chart` to `path`; `.svg` selects the SVG backend, anything else PNG.
pub fn save_chart<C: Chart>(chart: &C, path: &Path) -> Result<PathBuf, AppError> {
    register_fonts()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }

    let style = ChartStyle::image();
    let size = chart.image_size();
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        chart
            .draw(&root, &style)
            .and_then(|_| root.present())
            .map_err(|e| render_error(path, e))?;
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        chart
            .draw(&root, &style)
            .and_then(|_| root.present())
            .map_err(|e| render_error(path, e))?;
    }

    info!(path = %path.display(), chart = chart.title(), "saved chart");
    Ok(path.to_path_buf())
}

/// Write all four charts into `dir` as `<name>.<format>`.
pub fn save_all_charts(run: &AnalysisRun, dir: &Path, format: ChartFormat) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))?;

    ChartKind::ALL
        .iter()
        .map(|&kind| {
            let path = dir.join(format!("{}.{}", kind.file_stem(), format.extension()));
            save_chart(&AnyChart::build(kind, run), &path)
        })
        .collect()
}

pub fn plot_inflation_vs_returns(run: &AnalysisRun, save_path: Option<&Path>) -> Result<(), AppError> {
    show_or_save(run, ChartKind::InflationReturns, save_path)
}

pub fn plot_cumulative_returns(run: &AnalysisRun, save_path: Option<&Path>) -> Result<(), AppError> {
    show_or_save(run, ChartKind::Cumulative, save_path)
}

pub fn plot_rolling_correlation(run: &AnalysisRun, save_path: Option<&Path>) -> Result<(), AppError> {
    show_or_save(run, ChartKind::Correlation, save_path)
}

pub fn plot_inflation_regimes(run: &AnalysisRun, save_path: Option<&Path>) -> Result<(), AppError> {
    show_or_save(run, ChartKind::Regimes, save_path)
}

/// Save when a path is given, otherwise open the chart in the terminal viewer.
pub fn plot_chart(run: &AnalysisRun, kind: ChartKind, save_path: Option<&Path>) -> Result<(), AppError> {
    match kind {
        ChartKind::InflationReturns => plot_inflation_vs_returns(run, save_path),
        ChartKind::Cumulative => plot_cumulative_returns(run, save_path),
        ChartKind::Correlation => plot_rolling_correlation(run, save_path),
        ChartKind::Regimes => plot_inflation_regimes(run, save_path),
    }
}

fn show_or_save(run: &AnalysisRun, kind: ChartKind, save_path: Option<&Path>) -> Result<(), AppError> {
    let chart = AnyChart::build(kind, run);
    match save_path {
        Some(path) => save_chart(&chart, path).map(|_| ()),
        None => crate::tui::run_viewer(run, vec![chart]),
    }
}

fn render_error<E: std::error::Error + Send + Sync>(path: &Path, err: DrawingAreaErrorKind<E>) -> AppError {
    AppError::Render(format!("{}: {err}", path.display()))
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

/// Calendar date as a fractional year (the x coordinate of time-series charts).
pub fn year_fraction(date: NaiveDate) -> f64 {
    let days_in_year = if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    date.year() as f64 + date.ordinal0() as f64 / days_in_year
}

/// X range spanning the given dates.
pub(crate) fn date_range(dates: impl IntoIterator<Item = NaiveDate>) -> Range<f64> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for x in dates.into_iter().map(year_fraction) {
        lo = lo.min(x);
        hi = hi.max(x);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < 1e-9 {
        return lo - 0.5..hi + 0.5;
    }
    lo..hi
}

/// Y range covering all finite values with 5% padding.
pub(crate) fn value_range(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Range<f64> {
    let (mut lo, mut hi) = if include_zero { (0.0, 0.0) } else { (f64::INFINITY, f64::NEG_INFINITY) };
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return -1.0..1.0;
    }
    let span = hi - lo;
    if span < 1e-12 {
        let pad = lo.abs().max(1.0) * 0.1;
        return lo - pad..hi + pad;
    }
    let pad = span * 0.05;
    lo - pad..hi + pad
}

pub(crate) fn fmt_year(v: &f64) -> String {
    format!("{v:.0}")
}

pub(crate) fn fmt_pct(v: &f64) -> String {
    format!("{v:.1}%")
}

/// Caption (image output only) + cartesian coordinates on `root`.
pub(crate) fn build_xy<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    style: &ChartStyle,
    title: &str,
    x: Range<f64>,
    y: Range<f64>,
    right_axis: bool,
) -> Result<XyChart<'a, DB>, DrawingAreaErrorKind<DB::ErrorType>> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area);
    if right_axis {
        builder.right_y_label_area_size(style.y_label_area);
    }
    if style.caption {
        builder.caption(title, style.title_font());
    }
    builder.build_cartesian_2d(x, y)
}

/// Axes, ticks and (for images) the light grid.
pub(crate) fn draw_axes<'a, DB: DrawingBackend + 'a>(
    chart: &mut XyChart<'a, DB>,
    style: &ChartStyle,
    x_desc: &str,
    y_desc: &str,
    x_fmt: &dyn Fn(&f64) -> String,
    y_fmt: &dyn Fn(&f64) -> String,
) -> DrawResult<DB> {
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(8)
        .y_labels(6)
        .x_label_formatter(x_fmt)
        .y_label_formatter(y_fmt)
        .label_style(style.font())
        .axis_desc_style(style.font())
        .axis_style(style.foreground.stroke_width(1))
        .bold_line_style(style.grid.stroke_width(1))
        .light_line_style(style.grid.mix(0.3).stroke_width(1));
    if !style.mesh {
        mesh.disable_mesh();
    }
    mesh.draw()
}

/// Horizontal reference line across the full x range.
pub(crate) fn draw_hline<'a, DB: DrawingBackend + 'a>(
    chart: &mut XyChart<'a, DB>,
    x: &Range<f64>,
    y: f64,
    line: ShapeStyle,
) -> DrawResult<DB> {
    chart.draw_series(std::iter::once(PathElement::new(vec![(x.start, y), (x.end, y)], line)))?;
    Ok(())
}

pub(crate) fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut XyChart<'a, DB>,
    style: &ChartStyle,
    position: SeriesLabelPosition,
) -> DrawResult<DB> {
    let mut legend = chart.configure_series_labels();
    legend
        .position(position)
        .label_font(style.font())
        .border_style(style.foreground.stroke_width(1));
    if let Some(bg) = style.background {
        legend.background_style(bg.mix(0.85).filled());
    }
    legend.draw()
}

/// Short line sample for legends.
pub(crate) fn legend_line(color: RGBColor, width: u32) -> impl Fn((i32, i32)) -> PathElement<(i32, i32)> {
    move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
}

/// Filled box sample for legends.
pub(crate) fn legend_box(fill: ShapeStyle) -> impl Fn((i32, i32)) -> Rectangle<(i32, i32)> {
    move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_fraction_is_monotone_across_year_boundary() {
        let dec = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(year_fraction(dec) < year_fraction(jan));
        assert_eq!(year_fraction(jan), 2020.0);
    }

    #[test]
    fn value_range_pads_and_handles_degenerate_input() {
        let r = value_range([1.0, 3.0], false);
        assert!(r.start < 1.0 && r.end > 3.0);

        let flat = value_range([2.0, 2.0], false);
        assert!(flat.start < 2.0 && flat.end > 2.0);

        assert_eq!(value_range(std::iter::empty(), false), -1.0..1.0);

        let with_zero = value_range([1.0, 3.0], true);
        assert!(with_zero.start < 0.0);
    }

    #[test]
    fn bundled_font_registers_and_measures_text() {
        register_fonts().unwrap();
        register_fonts().unwrap();

        let (w, h) = (FONT_FAMILY, 14).into_font().box_size("2020").unwrap();
        assert!(w > 0 && h > 0);
    }

    #[test]
    fn legend_samples_sit_at_the_label_anchor() {
        use plotters::element::PointCollection;

        let line = legend_line(NOMINAL_COLOR, 2)((10, 20));
        assert_eq!(line.point_iter(), &[(10, 20), (30, 20)]);

        let boxed = legend_box(REAL_COLOR.filled())((10, 20));
        assert_eq!(boxed.point_iter(), &[(10, 15), (30, 25)]);
    }

    #[test]
    fn date_range_widens_a_single_date() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let r = date_range([d]);
        assert!(r.end - r.start > 0.9);
    }
}
