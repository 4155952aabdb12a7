//! Ratatui widget that renders any [`Chart`] through `plotters-ratatui-backend`.
//!
//! The chart types draw on a generic Plotters backend, so the terminal view
//! reuses exactly the drawing code used for PNG/SVG output.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{Chart, ChartStyle};

pub struct PlottersChart<'a, C: Chart> {
    pub chart: &'a C,
    pub style: ChartStyle,
}

impl<'a, C: Chart> PlottersChart<'a, C> {
    pub fn new(chart: &'a C) -> Self {
        Self {
            chart,
            style: ChartStyle::terminal(),
        }
    }
}

impl<C: Chart> Widget for PlottersChart<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out axes in tiny areas.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let chart = self.chart;
        let style = self.style;
        let widget = widget_fn(move |root| {
            chart.draw(&root, &style)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
