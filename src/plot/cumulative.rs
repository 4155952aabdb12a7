//! Cumulative nominal vs real returns with the inflation gap shaded.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{
    Chart, ChartStyle, DrawResult, NOMINAL_COLOR, REAL_COLOR, build_xy, date_range, draw_axes, draw_hline,
    draw_legend, fmt_pct, fmt_year, legend_box, legend_line, value_range, year_fraction,
};
use crate::app::pipeline::AnalysisRun;
use crate::domain::CombinedRecord;

const IMPACT_COLOR: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);

pub struct CumulativeReturnsChart<'a> {
    pub records: &'a [CombinedRecord],
}

impl<'a> CumulativeReturnsChart<'a> {
    pub fn from_run(run: &'a AnalysisRun) -> Self {
        Self { records: &run.combined }
    }
}

/// Closed outline between two lines sampled at the same x positions.
pub fn band_polygon(upper: &[(f64, f64)], lower: &[(f64, f64)]) -> Vec<(f64, f64)> {
    upper.iter().copied().chain(lower.iter().rev().copied()).collect()
}

impl Chart for CumulativeReturnsChart<'_> {
    fn title(&self) -> &'static str {
        "Cumulative Returns: Nominal vs Real"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        if let Some(bg) = style.background {
            root.fill(&bg)?;
        }

        let nominal: Vec<(f64, f64)> = self
            .records
            .iter()
            .map(|r| (year_fraction(r.date), r.cumulative_nominal * 100.0))
            .collect();
        let real: Vec<(f64, f64)> = self
            .records
            .iter()
            .map(|r| (year_fraction(r.date), r.cumulative_real * 100.0))
            .collect();

        let x = date_range(self.records.iter().map(|r| r.date));
        let y = value_range(nominal.iter().chain(real.iter()).map(|p| p.1), true);

        let mut chart = build_xy(root, style, self.title(), x.clone(), y, false)?;
        draw_axes(&mut chart, style, "Date", "Cumulative Return (%)", &fmt_year, &fmt_pct)?;

        if nominal.len() >= 2 {
            let impact = IMPACT_COLOR.mix(0.2).filled();
            chart
                .draw_series(std::iter::once(Polygon::new(band_polygon(&nominal, &real), impact)))?
                .label("Inflation Impact")
                .legend(legend_box(impact));
        }

        draw_hline(&mut chart, &x, 0.0, style.foreground.mix(0.4).stroke_width(1))?;

        chart
            .draw_series(LineSeries::new(nominal, NOMINAL_COLOR.stroke_width(style.line_width)))?
            .label("Nominal Returns")
            .legend(legend_line(NOMINAL_COLOR, style.line_width));
        chart
            .draw_series(LineSeries::new(real, REAL_COLOR.stroke_width(style.line_width)))?
            .label("Real Returns (Inflation-Adjusted)")
            .legend(legend_line(REAL_COLOR, style.line_width));

        draw_legend(&mut chart, style, SeriesLabelPosition::UpperLeft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_polygon_walks_upper_then_lower_backwards() {
        let upper = [(0.0, 2.0), (1.0, 3.0), (2.0, 4.0)];
        let lower = [(0.0, 1.0), (1.0, 1.5), (2.0, 2.0)];
        let poly = band_polygon(&upper, &lower);

        assert_eq!(poly.len(), 6);
        assert_eq!(poly[2], (2.0, 4.0));
        assert_eq!(poly[3], (2.0, 2.0));
        assert_eq!(poly[5], (0.0, 1.0));
    }
}
