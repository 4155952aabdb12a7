//! Rolling correlation with positive/negative areas shaded.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{
    CORRELATION_COLOR, Chart, ChartStyle, DrawResult, build_xy, date_range, draw_axes, draw_hline, draw_legend,
    fmt_year, legend_box, legend_line, year_fraction,
};
use crate::app::pipeline::AnalysisRun;
use crate::domain::{RecordField, RollingPoint};

const POSITIVE_FILL: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
const NEGATIVE_FILL: RGBColor = RGBColor(0x34, 0x98, 0xdb);
const STRONG_POSITIVE: RGBColor = RGBColor(0xc0, 0x39, 0x2b);
const STRONG_NEGATIVE: RGBColor = RGBColor(0x29, 0x80, 0xb9);

pub struct RollingCorrelationChart<'a> {
    pub points: &'a [RollingPoint],
    pub fields: (RecordField, RecordField),
    pub window: usize,
}

impl<'a> RollingCorrelationChart<'a> {
    pub fn from_run(run: &'a AnalysisRun) -> Self {
        Self {
            points: &run.correlation,
            fields: run.correlate,
            window: run.window,
        }
    }
}

/// Polygons between a line and zero, split by sign.
#[derive(Debug, Default, PartialEq)]
pub struct SignedRegions {
    pub positive: Vec<Vec<(f64, f64)>>,
    pub negative: Vec<Vec<(f64, f64)>>,
}

impl SignedRegions {
    fn push(&mut self, polygon: Vec<(f64, f64)>) {
        if polygon.iter().any(|p| p.1 > 0.0) {
            self.positive.push(polygon);
        } else if polygon.iter().any(|p| p.1 < 0.0) {
            self.negative.push(polygon);
        }
    }
}

/// Split the area between `points` and the zero line into single-signed
/// polygons. Sign changes are cut at the interpolated zero crossing; `None`
/// values break the line.
pub fn signed_regions(points: &[(f64, Option<f64>)]) -> SignedRegions {
    let mut regions = SignedRegions::default();
    let mut run: Vec<(f64, f64)> = Vec::new();

    for &(x, value) in points {
        match value {
            Some(y) if y.is_finite() => run.push((x, y)),
            _ => {
                split_run(&run, &mut regions);
                run.clear();
            }
        }
    }
    split_run(&run, &mut regions);
    regions
}

fn split_run(run: &[(f64, f64)], regions: &mut SignedRegions) {
    let (Some(&(x_first, y_first)), Some(&(x_last, _))) = (run.first(), run.last()) else {
        return;
    };

    let mut current = vec![(x_first, 0.0), (x_first, y_first)];
    for w in run.windows(2) {
        let ((xa, ya), (xb, yb)) = (w[0], w[1]);
        if (ya > 0.0 && yb < 0.0) || (ya < 0.0 && yb > 0.0) {
            let xc = xa + (xb - xa) * ya / (ya - yb);
            current.push((xc, 0.0));
            regions.push(std::mem::replace(&mut current, vec![(xc, 0.0)]));
        }
        current.push((xb, yb));
        if yb == 0.0 {
            regions.push(std::mem::replace(&mut current, vec![(xb, 0.0)]));
        }
    }
    current.push((x_last, 0.0));
    regions.push(current);
}

fn fmt_corr(v: &f64) -> String {
    format!("{v:.1}")
}

impl Chart for RollingCorrelationChart<'_> {
    fn title(&self) -> &'static str {
        "Rolling Correlation"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        if let Some(bg) = style.background {
            root.fill(&bg)?;
        }

        let series: Vec<(f64, Option<f64>)> = self
            .points
            .iter()
            .map(|p| (year_fraction(p.date), p.value))
            .collect();
        let x = date_range(self.points.iter().map(|p| p.date));

        let mut chart = build_xy(root, style, self.title(), x.clone(), -1.0..1.0, false)?;
        let y_desc = format!(
            "Correlation ({} vs {}, {}-month window)",
            self.fields.0.column_name(),
            self.fields.1.column_name(),
            self.window
        );
        draw_axes(&mut chart, style, "Date", &y_desc, &fmt_year, &fmt_corr)?;

        let regions = signed_regions(&series);
        let positive = POSITIVE_FILL.mix(0.3).filled();
        let negative = NEGATIVE_FILL.mix(0.3).filled();
        chart
            .draw_series(regions.positive.into_iter().map(|poly| Polygon::new(poly, positive)))?
            .label("Positive Correlation")
            .legend(legend_box(positive));
        chart
            .draw_series(regions.negative.into_iter().map(|poly| Polygon::new(poly, negative)))?
            .label("Negative Correlation")
            .legend(legend_box(negative));

        draw_hline(&mut chart, &x, 0.0, style.foreground.stroke_width(1))?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x.start, 0.5), (x.end, 0.5)],
                STRONG_POSITIVE.mix(0.6).stroke_width(1),
            )))?
            .label("Strong Positive")
            .legend(legend_line(STRONG_POSITIVE, 1));
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x.start, -0.5), (x.end, -0.5)],
                STRONG_NEGATIVE.mix(0.6).stroke_width(1),
            )))?
            .label("Strong Negative")
            .legend(legend_line(STRONG_NEGATIVE, 1));

        // One path per defined stretch, so gaps stay visible.
        let mut segment: Vec<(f64, f64)> = Vec::new();
        let mut segments = Vec::new();
        for &(xv, value) in &series {
            match value {
                Some(y) => segment.push((xv, y)),
                None if !segment.is_empty() => segments.push(std::mem::take(&mut segment)),
                None => {}
            }
        }
        if !segment.is_empty() {
            segments.push(segment);
        }
        let line = CORRELATION_COLOR.stroke_width(style.line_width);
        chart
            .draw_series(segments.into_iter().map(|s| PathElement::new(s, line)))?
            .label(format!("{}-Month Rolling Correlation", self.window))
            .legend(legend_line(CORRELATION_COLOR, style.line_width));

        draw_legend(&mut chart, style, SeriesLabelPosition::LowerLeft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_change_is_cut_at_interpolated_zero() {
        let regions = signed_regions(&[(0.0, Some(1.0)), (1.0, Some(-1.0))]);

        assert_eq!(regions.positive, vec![vec![(0.0, 0.0), (0.0, 1.0), (0.5, 0.0)]]);
        assert_eq!(regions.negative, vec![vec![(0.5, 0.0), (1.0, -1.0), (1.0, 0.0)]]);
    }

    #[test]
    fn crossing_uses_linear_interpolation() {
        let regions = signed_regions(&[(0.0, Some(-0.2)), (4.0, Some(0.6))]);
        let crossing = regions.negative[0].last().unwrap().0;
        assert!((crossing - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_values_break_regions() {
        let regions = signed_regions(&[
            (0.0, None),
            (1.0, Some(0.3)),
            (2.0, Some(0.4)),
            (3.0, None),
            (4.0, Some(0.2)),
            (5.0, Some(0.1)),
        ]);
        assert_eq!(regions.positive.len(), 2);
        assert!(regions.negative.is_empty());
        assert_eq!(regions.positive[0].first(), Some(&(1.0, 0.0)));
        assert_eq!(regions.positive[0].last(), Some(&(2.0, 0.0)));
    }

    #[test]
    fn touching_zero_splits_without_mixing_signs() {
        let regions = signed_regions(&[(0.0, Some(0.5)), (1.0, Some(0.0)), (2.0, Some(-0.5))]);
        assert_eq!(regions.positive.len(), 1);
        assert_eq!(regions.negative.len(), 1);
        assert!(regions.positive[0].iter().all(|p| p.1 >= 0.0));
        assert!(regions.negative[0].iter().all(|p| p.1 <= 0.0));
    }

    #[test]
    fn all_undefined_yields_nothing() {
        assert_eq!(signed_regions(&[(0.0, None), (1.0, None)]), SignedRegions::default());
    }
}
