//! Daily-bar CSV loader (deterministic).
//!
//! CSV format
//!
//! Required columns:
//! - `symbol`
//! - `date` (`%Y-%m-%d`)
//! - `open`
//! - `high`
//! - `low`
//! - `close`
//! - `pre_close`
//! - `volume`
//! - `amount`
//!
//! Optional columns:
//! - `suspended` (bool; default: false)
//!
//! Any other column is taken as a named indicator and attached to the
//! bar via `DailyBar::with_indicator`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ashq_schemas::{DailyBar, Symbol};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    EmptyInput,
    MissingHeader(&'static str),
    ParseFloat { column: String, value: String },
    ParseBool { column: String, value: String },
    ParseDate { column: String, value: String },
    BadRow { line: usize, reason: String },
    Io(String),
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::EmptyInput => write!(f, "empty input"),
            LoadError::MissingHeader(h) => write!(f, "missing header: {}", h),
            LoadError::ParseFloat { column, value } => {
                write!(f, "failed to parse float in column {}: {}", column, value)
            }
            LoadError::ParseBool { column, value } => {
                write!(f, "failed to parse bool in column {}: {}", column, value)
            }
            LoadError::ParseDate { column, value } => {
                write!(f, "failed to parse date in column {}: {}", column, value)
            }
            LoadError::BadRow { line, reason } => write!(f, "bad row at line {}: {}", line, reason),
            LoadError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, PartialEq)]
pub struct CsvRow {
    pub symbol: Symbol,
    pub date: NaiveDate,
    pub bar: DailyBar,
}

/// Load rows from a CSV file on disk. IO is explicit; parsing and
/// sorting are deterministic.
pub fn load_csv_file(path: impl AsRef<Path>) -> Result<Vec<CsvRow>, LoadError> {
    let s = fs::read_to_string(path)?;
    parse_csv_rows(&s)
}

/// Parse rows from CSV content (pure, deterministic).
pub fn parse_csv_rows(csv: &str) -> Result<Vec<CsvRow>, LoadError> {
    let mut lines = csv.lines();

    let header_line = lines.next().ok_or(LoadError::EmptyInput)?;
    let header_line = header_line.trim().trim_start_matches('\u{feff}');
    if header_line.is_empty() {
        return Err(LoadError::EmptyInput);
    }

    let headers: Vec<String> = split_csv_line(header_line)
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect();

    let mut idx: BTreeMap<String, usize> = BTreeMap::new();
    for (i, h) in headers.iter().enumerate() {
        idx.insert(h.clone(), i);
    }

    let col_symbol = find_required(&idx, "symbol")?;
    let col_date = find_required(&idx, "date")?;
    let col_open = find_required(&idx, "open")?;
    let col_high = find_required(&idx, "high")?;
    let col_low = find_required(&idx, "low")?;
    let col_close = find_required(&idx, "close")?;
    let col_pre_close = find_required(&idx, "pre_close")?;
    let col_volume = find_required(&idx, "volume")?;
    let col_amount = find_required(&idx, "amount")?;

    let col_suspended = idx.get("suspended").copied();

    let known: std::collections::BTreeSet<usize> = [
        col_symbol,
        col_date,
        col_open,
        col_high,
        col_low,
        col_close,
        col_pre_close,
        col_volume,
        col_amount,
    ]
    .into_iter()
    .chain(col_suspended)
    .collect();

    let indicator_cols: Vec<(String, usize)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !known.contains(i))
        .map(|(i, h)| (h.clone(), i))
        .collect();

    let mut out: Vec<CsvRow> = Vec::new();

    for (line_idx0, raw) in lines.enumerate() {
        let line_no = line_idx0 + 2;

        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let fields = split_csv_line(raw);
        let get = |col: usize| -> Result<&str, LoadError> {
            fields
                .get(col)
                .map(|s| s.as_str())
                .ok_or_else(|| LoadError::BadRow {
                    line: line_no,
                    reason: format!("missing column index {col}"),
                })
        };

        let symbol = get(col_symbol)?.trim().to_string();
        if symbol.is_empty() {
            return Err(LoadError::BadRow {
                line: line_no,
                reason: "symbol is empty".to_string(),
            });
        }

        let date = parse_date(get(col_date)?, "date")?;
        let open = parse_f64(get(col_open)?, "open")?;
        let high = parse_f64(get(col_high)?, "high")?;
        let low = parse_f64(get(col_low)?, "low")?;
        let close = parse_f64(get(col_close)?, "close")?;
        let pre_close = parse_f64(get(col_pre_close)?, "pre_close")?;
        let volume = parse_f64(get(col_volume)?, "volume")?;
        let amount = parse_f64(get(col_amount)?, "amount")?;

        let mut bar = DailyBar::new(open, high, low, close, pre_close, volume, amount);

        if let Some(c) = col_suspended {
            if parse_bool(get(c)?, "suspended")? {
                bar = bar.suspended();
            }
        }

        for (name, col) in &indicator_cols {
            let raw = get(*col)?.trim();
            if raw.is_empty() {
                continue;
            }
            if let Ok(v) = raw.parse::<f64>() {
                bar = bar.with_indicator(name.clone(), v);
            }
        }

        out.push(CsvRow { symbol, date, bar });
    }

    // Deterministic ordering: (date ASC, symbol ASC)
    out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
    Ok(out)
}

fn find_required(idx: &BTreeMap<String, usize>, name: &'static str) -> Result<usize, LoadError> {
    idx.get(name).copied().ok_or(LoadError::MissingHeader(name))
}

fn parse_f64(s: &str, col: &str) -> Result<f64, LoadError> {
    let t = s.trim();
    t.parse::<f64>().map_err(|_| LoadError::ParseFloat {
        column: col.to_string(),
        value: t.to_string(),
    })
}

fn parse_bool(s: &str, col: &str) -> Result<bool, LoadError> {
    let t = s.trim();
    match t {
        "1" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(LoadError::ParseBool {
            column: col.to_string(),
            value: t.to_string(),
        }),
    }
}

fn parse_date(s: &str, col: &str) -> Result<NaiveDate, LoadError> {
    let t = s.trim();
    NaiveDate::parse_from_str(t, "%Y-%m-%d").map_err(|_| LoadError::ParseDate {
        column: col.to_string(),
        value: t.to_string(),
    })
}

fn split_csv_line(line: &str) -> Vec<String> {
    line.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_sorts_deterministically() {
        let csv = r#"symbol,date,open,high,low,close,pre_close,volume,amount
B.SH,2024-01-03,10,12,9,11,1000,100,1100
A.SZ,2024-01-03,20,22,19,21,2000,200,4200
A.SZ,2024-01-02,1,1,1,1,1,1,1
"#;
        let rows = parse_csv_rows(csv).expect("parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].symbol, "A.SZ");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(rows[1].symbol, "A.SZ");
        assert_eq!(rows[2].symbol, "B.SH");
    }

    #[test]
    fn unknown_columns_become_indicators() {
        let csv = r#"symbol,date,open,high,low,close,pre_close,volume,amount,ma5
A.SZ,2024-01-02,1,1,1,1,1,1,1,0.95
"#;
        let rows = parse_csv_rows(csv).expect("parse");
        assert_eq!(rows[0].bar.indicator("ma5"), Some(0.95));
    }

    #[test]
    fn missing_required_header_is_rejected() {
        let csv = "symbol,date,open,high,low,close,pre_close,volume\nA,2024-01-02,1,1,1,1,1,1\n";
        assert_eq!(parse_csv_rows(csv), Err(LoadError::MissingHeader("amount")));
    }

    #[test]
    fn suspended_flag_parsed_when_present() {
        let csv = r#"symbol,date,open,high,low,close,pre_close,volume,amount,suspended
A.SZ,2024-01-02,1,1,1,1,1,1,1,true
"#;
        let rows = parse_csv_rows(csv).expect("parse");
        assert!(rows[0].bar.suspended);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse_csv_rows(""), Err(LoadError::EmptyInput));
    }
}
