//! Ratatui-based chart viewer.
//!
//! Shows the analysis charts as tabs, with a header summarizing the dataset
//! and annualized metrics.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};

use crate::app::pipeline::AnalysisRun;
use crate::domain::AnnualizedMetrics;
use crate::error::AppError;
use crate::plot::{AnyChart, Chart};

mod plotters_chart;

pub use plotters_chart::PlottersChart;

/// Open the viewer on `charts` and block until the user quits.
pub fn run_viewer(run: &AnalysisRun, charts: Vec<AnyChart<'_>>) -> Result<(), AppError> {
    if charts.is_empty() {
        return Err(AppError::Config("No charts to display.".to_string()));
    }

    crate::plot::register_fonts()?;
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut viewer = Viewer::new(run, charts);
    viewer.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// What a key press does to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Select(usize),
    None,
}

struct Viewer<'a> {
    run: &'a AnalysisRun,
    charts: Vec<AnyChart<'a>>,
    selected: usize,
}

impl<'a> Viewer<'a> {
    fn new(run: &'a AnalysisRun, charts: Vec<AnyChart<'a>>) -> Self {
        Self {
            run,
            charts,
            selected: 0,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key_action(key.code, self.selected, self.charts.len()) {
                        Action::Quit => break,
                        Action::Select(i) => {
                            self.selected = i;
                            needs_redraw = true;
                        }
                        Action::None => {}
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let run = self.run;
        let range = match (run.combined.first(), run.combined.last()) {
            (Some(first), Some(last)) => format!("{} → {}", first.date, last.date),
            _ => "-".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("infl", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" | {} | {range} | {} months", run.source_label, run.combined.len())),
            ]),
            Line::from(Span::styled(
                format!(
                    "nominal: {} | real: {}",
                    metrics_line(run.nominal_metrics.as_ref()),
                    metrics_line(run.real_metrics.as_ref()),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = self
            .charts
            .iter()
            .enumerate()
            .map(|(i, c)| Line::from(format!("{} {}", i + 1, c.title())))
            .collect();

        let tabs = Tabs::new(titles)
            .select(self.selected)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(chart) = self.charts.get(self.selected) else {
            return;
        };
        let block = Block::default().title(chart.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        frame.render_widget(PlottersChart::new(chart), inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ or 1-4 switch chart  q/Esc quit";
        let p = Paragraph::new(Line::from(Span::styled(help, Style::default().fg(Color::Gray))))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn key_action(code: KeyCode, selected: usize, count: usize) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Right | KeyCode::Tab if count > 0 => Action::Select((selected + 1) % count),
        KeyCode::Left | KeyCode::BackTab if count > 0 => Action::Select((selected + count - 1) % count),
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(d) if d >= 1 && (d as usize) <= count => Action::Select(d as usize - 1),
            _ => Action::None,
        },
        _ => Action::None,
    }
}

fn metrics_line(metrics: Option<&AnnualizedMetrics>) -> String {
    match metrics {
        Some(m) => format!(
            "ret {:.2}% vol {:.2}% sharpe {:.2}",
            m.annualized_return * 100.0,
            m.annualized_volatility * 100.0,
            m.sharpe_ratio
        ),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_wrap_around_tabs() {
        assert_eq!(key_action(KeyCode::Right, 3, 4), Action::Select(0));
        assert_eq!(key_action(KeyCode::Left, 0, 4), Action::Select(3));
        assert_eq!(key_action(KeyCode::Right, 0, 1), Action::Select(0));
    }

    #[test]
    fn digits_jump_to_existing_tabs_only() {
        assert_eq!(key_action(KeyCode::Char('2'), 0, 4), Action::Select(1));
        assert_eq!(key_action(KeyCode::Char('5'), 0, 4), Action::None);
        assert_eq!(key_action(KeyCode::Char('0'), 0, 4), Action::None);
    }

    #[test]
    fn q_and_escape_quit() {
        assert_eq!(key_action(KeyCode::Char('q'), 0, 4), Action::Quit);
        assert_eq!(key_action(KeyCode::Esc, 2, 4), Action::Quit);
    }

    #[test]
    fn missing_metrics_render_as_na() {
        assert_eq!(metrics_line(None), "n/a");
        let m = AnnualizedMetrics {
            annualized_return: 0.1268,
            annualized_volatility: 0.0693,
            sharpe_ratio: 1.831,
        };
        assert_eq!(metrics_line(Some(&m)), "ret 12.68% vol 6.93% sharpe 1.83");
    }
}
