//! Returns per inflation regime: box plot of monthly returns (left) and
//! grouped mean nominal/real bars (right).

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{
    Chart, ChartStyle, DrawResult, NOMINAL_COLOR, REAL_COLOR, REGIME_COLORS, XyChart, build_xy, draw_axes,
    draw_hline, draw_legend, fmt_pct, legend_box, value_range,
};
use crate::app::pipeline::AnalysisRun;
use crate::domain::{CombinedRecord, InflationRegime, RegimeStats};
use crate::math::Quartiles;

const BOX_HALF_WIDTH: f64 = 0.3;
const BAR_WIDTH: f64 = 0.35;
const X_RANGE: std::ops::Range<f64> = -0.5..2.5;

pub struct RegimeComparisonChart<'a> {
    pub records: &'a [CombinedRecord],
    pub stats: &'a [RegimeStats],
}

impl<'a> RegimeComparisonChart<'a> {
    pub fn from_run(run: &'a AnalysisRun) -> Self {
        Self {
            records: &run.combined,
            stats: &run.regime_stats,
        }
    }

    /// Nominal monthly returns (in %) grouped by regime, Low first.
    fn returns_by_regime(&self) -> [Vec<f64>; 3] {
        let mut groups: [Vec<f64>; 3] = Default::default();
        for r in self.records {
            groups[r.regime.index()].push(r.nominal_return * 100.0);
        }
        groups
    }

    /// Mean (nominal, real) return in % per regime; absent regimes are zero.
    fn mean_bars(&self) -> [(f64, f64); 3] {
        let mut bars = [(0.0, 0.0); 3];
        for s in self.stats {
            bars[s.regime.index()] = (s.nominal_return.mean * 100.0, s.real_return.mean * 100.0);
        }
        bars
    }
}

/// Box-plot geometry for one group (Tukey whiskers at 1.5 IQR).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometry {
    pub quartiles: Quartiles,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxGeometry {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let quartiles = Quartiles::from_values(values)?;
        let lo_fence = quartiles.q1 - 1.5 * quartiles.iqr();
        let hi_fence = quartiles.q3 + 1.5 * quartiles.iqr();

        let inside = values.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
        let whisker_low = inside.clone().fold(quartiles.q1, f64::min);
        let whisker_high = inside.fold(quartiles.q3, f64::max);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| v.is_finite() && !(lo_fence..=hi_fence).contains(v))
            .collect();

        Some(Self {
            quartiles,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

fn regime_tick(v: &f64) -> String {
    let rounded = v.round();
    if (v - rounded).abs() > 1e-6 {
        return String::new();
    }
    match rounded as i64 {
        0 => InflationRegime::Low.label().to_string(),
        1 => InflationRegime::Moderate.label().to_string(),
        2 => InflationRegime::High.label().to_string(),
        _ => String::new(),
    }
}

impl Chart for RegimeComparisonChart<'_> {
    fn title(&self) -> &'static str {
        "Returns by Inflation Regime"
    }

    fn image_size(&self) -> (u32, u32) {
        (1400, 600)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        if let Some(bg) = style.background {
            root.fill(&bg)?;
        }

        let panels = root.split_evenly((1, 2));
        self.draw_boxes(&panels[0], style)?;
        self.draw_bars(&panels[1], style)
    }
}

impl RegimeComparisonChart<'_> {
    fn draw_boxes<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        let groups = self.returns_by_regime();
        let y = value_range(groups.iter().flatten().copied(), false);

        let mut chart = build_xy(area, style, "Monthly Returns by Inflation Regime", X_RANGE, y, false)?;
        draw_axes(&mut chart, style, "Inflation Regime", "Monthly Return (%)", &regime_tick, &fmt_pct)?;

        for (i, values) in groups.iter().enumerate() {
            let Some(geometry) = BoxGeometry::from_values(values) else {
                continue;
            };
            draw_box(&mut chart, style, i as f64, &geometry, REGIME_COLORS[i])?;
        }
        Ok(())
    }

    fn draw_bars<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        let bars = self.mean_bars();
        let y = value_range(bars.iter().flat_map(|&(n, r)| [n, r]), true);

        let mut chart = build_xy(area, style, "Average Returns by Inflation Regime", X_RANGE, y, false)?;
        draw_axes(&mut chart, style, "Inflation Regime", "Average Monthly Return (%)", &regime_tick, &fmt_pct)?;
        draw_hline(&mut chart, &X_RANGE, 0.0, style.foreground.stroke_width(1))?;

        let nominal_fill = NOMINAL_COLOR.mix(0.8).filled();
        let real_fill = REAL_COLOR.mix(0.8).filled();
        chart
            .draw_series(bars.iter().enumerate().map(|(i, &(n, _))| bar(i as f64 - BAR_WIDTH, n, nominal_fill)))?
            .label("Nominal Returns")
            .legend(legend_box(nominal_fill));
        chart
            .draw_series(bars.iter().enumerate().map(|(i, &(_, r))| bar(i as f64, r, real_fill)))?
            .label("Real Returns")
            .legend(legend_box(real_fill));

        let font = style.font();
        chart.draw_series(bars.iter().enumerate().flat_map(|(i, &(n, r))| {
            [
                annotation(i as f64 - BAR_WIDTH / 2.0, n, &font),
                annotation(i as f64 + BAR_WIDTH / 2.0, r, &font),
            ]
        }))?;

        draw_legend(&mut chart, style, SeriesLabelPosition::UpperRight)
    }
}

fn bar(x0: f64, value: f64, fill: ShapeStyle) -> Rectangle<(f64, f64)> {
    Rectangle::new([(x0, value.max(0.0)), (x0 + BAR_WIDTH, value.min(0.0))], fill)
}

fn annotation(x: f64, value: f64, font: &TextStyle<'static>) -> Text<'static, (f64, f64), String> {
    let anchor = if value >= 0.0 { VPos::Bottom } else { VPos::Top };
    Text::new(
        format!("{value:.2}%"),
        (x, value),
        font.pos(Pos::new(HPos::Center, anchor)),
    )
}

fn draw_box<'a, DB: DrawingBackend + 'a>(
    chart: &mut XyChart<'a, DB>,
    style: &ChartStyle,
    x: f64,
    geometry: &BoxGeometry,
    color: RGBColor,
) -> DrawResult<DB> {
    let q = geometry.quartiles;
    let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
    let cap = BOX_HALF_WIDTH / 2.0;
    let outline = style.foreground.stroke_width(1);

    chart.draw_series([
        Rectangle::new([(left, q.q3), (right, q.q1)], color.mix(0.7).filled()),
        Rectangle::new([(left, q.q3), (right, q.q1)], outline),
    ])?;
    chart.draw_series([
        PathElement::new(vec![(left, q.median), (right, q.median)], style.foreground.stroke_width(2)),
        PathElement::new(vec![(x, q.q3), (x, geometry.whisker_high)], outline),
        PathElement::new(vec![(x, q.q1), (x, geometry.whisker_low)], outline),
        PathElement::new(vec![(x - cap, geometry.whisker_high), (x + cap, geometry.whisker_high)], outline),
        PathElement::new(vec![(x - cap, geometry.whisker_low), (x + cap, geometry.whisker_low)], outline),
    ])?;
    chart.draw_series(geometry.outliers.iter().map(|&v| Cross::new((x, v), 3, outline)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_geometry_flags_outliers_beyond_fences() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let g = BoxGeometry::from_values(&values).unwrap();

        assert_eq!(g.outliers, vec![100.0]);
        assert_eq!(g.whisker_low, 1.0);
        assert_eq!(g.whisker_high, 5.0);
        assert!(g.quartiles.q1 <= g.quartiles.median && g.quartiles.median <= g.quartiles.q3);
    }

    #[test]
    fn box_geometry_of_single_value_is_flat() {
        let g = BoxGeometry::from_values(&[0.5]).unwrap();
        assert_eq!(g.quartiles.q1, 0.5);
        assert_eq!(g.whisker_low, 0.5);
        assert_eq!(g.whisker_high, 0.5);
        assert!(g.outliers.is_empty());
        assert!(BoxGeometry::from_values(&[]).is_none());
    }

    #[test]
    fn ticks_label_only_regime_positions() {
        assert_eq!(regime_tick(&0.0), "Low (<1%)");
        assert_eq!(regime_tick(&2.0), "High (>3%)");
        assert_eq!(regime_tick(&0.5), "");
        assert_eq!(regime_tick(&-0.5), "");
    }

    #[test]
    fn missing_regimes_plot_as_zero_bars() {
        use crate::domain::{RangeStats, SummaryStats};

        let summary = SummaryStats {
            mean: 0.01,
            std: None,
            min: 0.01,
            max: 0.01,
        };
        let stats = [RegimeStats {
            regime: InflationRegime::High,
            count: 1,
            nominal_return: summary,
            real_return: SummaryStats { mean: -0.02, ..summary },
            inflation_rate: RangeStats {
                mean: 0.04,
                min: 0.04,
                max: 0.04,
            },
        }];
        let chart = RegimeComparisonChart {
            records: &[],
            stats: &stats,
        };
        let bars = chart.mean_bars();

        assert_eq!(bars[0], (0.0, 0.0));
        assert_eq!(bars[1], (0.0, 0.0));
        assert!((bars[2].0 - 1.0).abs() < 1e-12);
        assert!((bars[2].1 + 2.0).abs() < 1e-12);
    }
}
