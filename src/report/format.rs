//! Formatted terminal output.
//!
//! Formatting lives in one place so the calculation code stays clean and
//! output changes stay localized.

use crate::app::pipeline::AnalysisRun;
use crate::domain::{AnnualizedMetrics, RegimeStats, SummaryStats};

use super::{full_sample_correlation, summarize_correlation};

/// Dataset overview, annualized metrics, regime table and correlation summary.
pub fn format_run_summary(run: &AnalysisRun) -> String {
    let mut out = String::new();

    out.push_str("=== infl - Inflation vs Equity Returns ===\n");
    out.push_str(&format!("Source: {}\n", run.source_label));
    if let (Some(first), Some(last)) = (run.combined.first(), run.combined.last()) {
        out.push_str(&format!(
            "Period: {} → {} ({} months)\n",
            first.date,
            last.date,
            run.combined.len()
        ));
    }
    out.push_str(&format!(
        "Inputs: inflation n={} | prices n={} ({} month-ends) | returns n={}\n",
        run.inflation.len(),
        run.daily_prices.len(),
        run.monthly_prices.len(),
        run.returns.len(),
    ));

    out.push_str("\nAnnualized metrics:\n");
    out.push_str(&format_metrics_table(&[
        ("nominal", run.nominal_metrics.as_ref()),
        ("real", run.real_metrics.as_ref()),
    ]));

    out.push_str("\nReturns by inflation regime:\n");
    out.push_str(&format_regime_table(&run.regime_stats));

    out.push('\n');
    out.push_str(&format_correlation(run));

    out
}

pub fn format_metrics_table(rows: &[(&str, Option<&AnnualizedMetrics>)]) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("{:<10} {:>12} {:>12} {:>8}", "series", "return", "volatility", "sharpe"));
    push_line(&mut out, format!("{:-<10} {:-<12} {:-<12} {:-<8}", "", "", "", ""));

    for (name, metrics) in rows {
        let line = match metrics {
            Some(m) => format!(
                "{:<10} {:>12} {:>12} {:>8.3}",
                truncate(name, 10),
                fmt_pct(m.annualized_return),
                fmt_pct(m.annualized_volatility),
                m.sharpe_ratio
            ),
            None => format!("{:<10} {:>12} {:>12} {:>8}", truncate(name, 10), "n/a", "n/a", "n/a"),
        };
        push_line(&mut out, line);
    }
    out
}

pub fn format_regime_table(stats: &[RegimeStats]) -> String {
    if stats.is_empty() {
        return "(no observations)\n".to_string();
    }

    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<16} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "regime", "n", "nom_mean", "nom_std", "real_mean", "real_std", "infl_mean", "infl_rng"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<16} {:-<5} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9}",
            "", "", "", "", "", "", "", ""
        ),
    );

    for s in stats {
        push_line(
            &mut out,
            format!(
                "{:<16} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
                truncate(s.regime.label(), 16),
                s.count,
                fmt_pct(s.nominal_return.mean),
                fmt_std(&s.nominal_return),
                fmt_pct(s.real_return.mean),
                fmt_std(&s.real_return),
                fmt_pct(s.inflation_rate.mean),
                fmt_pct(s.inflation_rate.max - s.inflation_rate.min),
            ),
        );
    }
    out
}

fn format_correlation(run: &AnalysisRun) -> String {
    let (a, b) = run.correlate;
    let mut out = format!(
        "Correlation {} vs {}:\n",
        a.column_name(),
        b.column_name()
    );

    match full_sample_correlation(&run.combined, a, b) {
        Some(r) => out.push_str(&format!("- full sample: {r:.3}\n")),
        None => out.push_str("- full sample: n/a\n"),
    }
    match summarize_correlation(&run.correlation) {
        Some(s) => out.push_str(&format!(
            "- rolling {}m: latest {:.3} ({}) | mean {:.3} | range [{:.3}, {:.3}] | {} windows\n",
            run.window, s.latest.1, s.latest.0, s.mean, s.min, s.max, s.defined
        )),
        None => out.push_str(&format!(
            "- rolling {}m: n/a (needs at least {} aligned months)\n",
            run.window, run.window
        )),
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

fn fmt_std(s: &SummaryStats) -> String {
    s.std.map(fmt_pct).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
