//! Inflation rate vs monthly nominal return on two y axes.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{
    Chart, ChartStyle, DrawResult, INFLATION_COLOR, RETURN_COLOR, build_xy, date_range, draw_axes, draw_legend,
    fmt_pct, fmt_year, legend_line, value_range, year_fraction,
};
use crate::app::pipeline::AnalysisRun;
use crate::domain::CombinedRecord;

pub struct InflationReturnsChart<'a> {
    pub records: &'a [CombinedRecord],
}

impl<'a> InflationReturnsChart<'a> {
    pub fn from_run(run: &'a AnalysisRun) -> Self {
        Self { records: &run.combined }
    }
}

impl Chart for InflationReturnsChart<'_> {
    fn title(&self) -> &'static str {
        "Inflation Rate vs Stock Returns"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> DrawResult<DB> {
        if let Some(bg) = style.background {
            root.fill(&bg)?;
        }

        let inflation: Vec<(f64, f64)> = self
            .records
            .iter()
            .map(|r| (year_fraction(r.date), r.inflation_rate * 100.0))
            .collect();
        let returns: Vec<(f64, f64)> = self
            .records
            .iter()
            .map(|r| (year_fraction(r.date), r.nominal_return * 100.0))
            .collect();

        let x = date_range(self.records.iter().map(|r| r.date));
        let y_left = value_range(inflation.iter().map(|p| p.1), true);
        let y_right = value_range(returns.iter().map(|p| p.1), true);

        let mut chart = build_xy(root, style, self.title(), x.clone(), y_left, true)?
            .set_secondary_coord(x.clone(), y_right);

        draw_axes(&mut *chart, style, "Date", "Inflation Rate (%)", &fmt_year, &fmt_pct)?;
        chart
            .configure_secondary_axes()
            .y_desc("Monthly Return (%)")
            .y_label_formatter(&fmt_pct)
            .label_style(style.font())
            .axis_desc_style(style.font())
            .axis_style(style.foreground.stroke_width(1))
            .draw()?;

        chart
            .draw_series(LineSeries::new(inflation, INFLATION_COLOR.stroke_width(style.line_width)))?
            .label("Inflation Rate")
            .legend(legend_line(INFLATION_COLOR, style.line_width));

        chart.draw_secondary_series(std::iter::once(PathElement::new(
            vec![(x.start, 0.0), (x.end, 0.0)],
            style.foreground.mix(0.4).stroke_width(1),
        )))?;
        chart
            .draw_secondary_series(LineSeries::new(returns, RETURN_COLOR.mix(0.8).stroke_width(style.line_width)))?
            .label("Monthly Returns")
            .legend(legend_line(RETURN_COLOR, style.line_width));

        draw_legend(&mut *chart, style, SeriesLabelPosition::UpperLeft)
    }
}
