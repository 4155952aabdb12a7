//! CSV ingest and normalization.
//!
//! This module turns the raw inflation and price exports into sorted,
//! date-keyed series that are safe to feed into the calculator.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Strict dates**: a row whose date cannot be built aborts the load
//! - **Lenient values**: unparseable price cells become missing values and are reported
//! - **Separation of concerns**: no return/regime logic here

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::calc::month_end;
use crate::domain::{INFLATION_RATE, InflationSeries, Observation, PriceRow, PriceSeries};
use crate::error::AppError;

/// Required inflation columns (matched case-insensitively).
pub const INFLATION_COLUMNS: [&str; 4] = ["year", "month", "day", "actual"];

/// Required price column (matched case-insensitively).
pub const PRICE_DATE_COLUMN: &str = "date";

/// Everything a default run loads: inflation, raw prices, month-end prices.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub inflation: InflationSeries,
    pub daily_prices: PriceSeries,
    pub monthly_prices: PriceSeries,
}

/// Load inflation + prices and resample prices to month-end on `price_column`.
pub fn load_all(inflation_path: &Path, prices_path: &Path, price_column: &str) -> Result<LoadedData, AppError> {
    let inflation = load_inflation(inflation_path)?;
    let daily_prices = load_prices(prices_path)?;
    let monthly_prices = resample_monthly(&daily_prices, price_column)?;
    Ok(LoadedData {
        inflation,
        daily_prices,
        monthly_prices,
    })
}

/// Load an inflation CSV with `Year`, `Month`, `Day` and `Actual` columns.
///
/// The date is built from the three components; `Actual` (YoY rate as a
/// decimal) becomes the `Inflation_Rate` series. Rows with an empty `Actual`
/// are skipped. The result is sorted by date.
pub fn load_inflation(path: &Path) -> Result<InflationSeries, AppError> {
    let (mut reader, header_map) = open_csv(path)?;

    for name in INFLATION_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(schema_error(path, format!("Missing required column: `{}`", capitalize(name))));
        }
    }

    let mut points = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| parse_error(path, format!("CSV parse error on line {line}: {e}")))?;

        let date = inflation_date(&record, &header_map).map_err(|message| AppError::MalformedInput {
            path: path.to_path_buf(),
            line,
            message,
        })?;

        let Some(raw) = get_optional(&record, &header_map, "actual").filter(|raw| !is_missing_marker(raw)) else {
            skipped += 1;
            debug!(line, "inflation row without `Actual` value skipped");
            continue;
        };
        let value = parse_number(raw)
            .ok_or_else(|| parse_error(path, format!("Invalid `Actual` value '{raw}' on line {line}.")))?;

        points.push(Observation::new(date, value));
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "inflation rows without a value were skipped");
    }

    points.sort_by_key(|p| p.date);
    info!(path = %path.display(), rows = points.len(), "loaded inflation series");
    Ok(InflationSeries::new(INFLATION_RATE, points))
}

/// Load a price CSV with a `Date` column and numeric (OHLC-style) columns.
///
/// Column names are lower-cased. Empty or unparseable cells become missing
/// values. The result is sorted by date.
pub fn load_prices(path: &Path) -> Result<PriceSeries, AppError> {
    let (mut reader, header_map) = open_csv(path)?;

    let date_idx = *header_map
        .get(PRICE_DATE_COLUMN)
        .ok_or_else(|| schema_error(path, "Missing required column: `Date`"))?;

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, format!("Failed to read CSV headers: {e}")))?
        .clone();

    // (position in the record, lower-cased name) for every value column.
    let value_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx)
        .map(|(idx, name)| (idx, normalize_header_name(name)))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut rows = Vec::new();
    let mut unparsed: BTreeMap<String, usize> = BTreeMap::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| parse_error(path, format!("CSV parse error on line {line}: {e}")))?;

        let raw_date = record
            .get(date_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::MalformedInput {
                path: path.to_path_buf(),
                line,
                message: "Missing `Date` value.".to_string(),
            })?;
        let date = parse_price_date(raw_date).map_err(|message| AppError::MalformedInput {
            path: path.to_path_buf(),
            line,
            message,
        })?;

        let values = value_columns
            .iter()
            .map(|(col_idx, name)| {
                let raw = record.get(*col_idx).map(str::trim).filter(|s| !s.is_empty())?;
                let value = parse_number(raw);
                if value.is_none() {
                    *unparsed.entry(name.clone()).or_default() += 1;
                }
                value
            })
            .collect();

        rows.push(PriceRow { date, values });
    }

    for (column, count) in &unparsed {
        warn!(path = %path.display(), column = %column, count, "unparseable price cells treated as missing");
    }

    rows.sort_by_key(|r| r.date);
    info!(
        path = %path.display(),
        rows = rows.len(),
        columns = value_columns.len(),
        "loaded price series"
    );

    Ok(PriceSeries {
        columns: value_columns.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

/// Resample a price table to month-end frequency on one column.
///
/// Each output row is dated at the month-end and holds the last observed
/// (non-missing) value of `column` on or before that date. Every month-end
/// from the first to the last observation gets a row; a month without an
/// observation repeats the previous value.
pub fn resample_monthly(series: &PriceSeries, column: &str) -> Result<PriceSeries, AppError> {
    let observations = series.column(column).ok_or_else(|| AppError::Schema {
        context: "price series".to_string(),
        message: format!(
            "Price column `{column}` not found (available: {}).",
            series.columns.join(", ")
        ),
    })?;

    // Input is date-sorted, so the last insert per month is the last observation.
    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in observations {
        by_month.insert(month_end(obs.date), obs.value);
    }

    let mut rows = Vec::with_capacity(by_month.len());
    let mut filled = 0usize;
    if let (Some((&first, _)), Some((&last, _))) = (by_month.first_key_value(), by_month.last_key_value()) {
        let mut carried = None;
        let mut date = first;
        while date <= last {
            match by_month.get(&date) {
                Some(&value) => carried = Some(value),
                None => filled += 1,
            }
            rows.push(PriceRow {
                date,
                values: vec![carried],
            });
            date = next_month_end(date)?;
        }
    }

    if filled > 0 {
        warn!(column, filled, "months without a price carry the previous month-end value");
    }
    debug!(column, months = rows.len(), "resampled prices to month-end");

    Ok(PriceSeries {
        columns: vec![column.trim().to_ascii_lowercase()],
        rows,
    })
}

fn next_month_end(date: NaiveDate) -> Result<NaiveDate, AppError> {
    date.with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .map(month_end)
        .ok_or_else(|| AppError::Config(format!("Month after {date} is out of range.")))
}

fn open_csv(path: &Path) -> Result<(csv::Reader<File>, HashMap<String, usize>), AppError> {
    let file = File::open(path).map_err(|e| AppError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, format!("Failed to read CSV headers: {e}")))?
        .clone();

    Ok((reader, build_header_map(&headers)))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn inflation_date(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<NaiveDate, String> {
    let year: i32 = parse_component(record, header_map, "year")?;
    let month: u32 = parse_component(record, header_map, "month")?;
    let day: u32 = parse_component(record, header_map, "day")?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid date components: year={year}, month={month}, day={day}."))
}

fn parse_component<T: std::str::FromStr>(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<T, String> {
    let raw = get_required(record, header_map, name)?;
    // Spreadsheet tools like to write integers as `2023.0`.
    let raw = raw.strip_suffix(".0").unwrap_or(raw);
    raw.parse::<T>()
        .map_err(|_| format!("Invalid `{}` value '{raw}'.", capitalize(name)))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{}`", capitalize(name)))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{}`", capitalize(name)))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a price-file date.
///
/// Exports come in a handful of layouts; month-first is assumed for the
/// slash/dash US formats.
fn parse_price_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 6] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%b-%Y", "%b %d, %Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    // Timestamps with offsets or fractional seconds: keep the ISO date prefix.
    if let Some(prefix) = s.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Ok(d);
        }
    }

    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD, MM-DD-YYYY, DD-Mon-YYYY, Mon DD, YYYY."
    ))
}

/// Text that spreadsheet and dataframe exports write for an absent number.
fn is_missing_marker(raw: &str) -> bool {
    let cleaned = raw.trim().trim_start_matches(['+', '-']);
    ["nan", "inf", "infinity", "na", "n/a", "null", "none"]
        .iter()
        .any(|marker| cleaned.eq_ignore_ascii_case(marker))
}

fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    let v = cleaned.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn schema_error(path: &Path, message: impl Into<String>) -> AppError {
    AppError::Schema {
        context: format!("'{}'", path.display()),
        message: message.into(),
    }
}

fn parse_error(path: &Path, message: impl Into<String>) -> AppError {
    AppError::Parse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
