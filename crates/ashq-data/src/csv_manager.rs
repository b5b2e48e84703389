use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ashq_schemas::{DailyBar, Symbol, TradingCalendar};
use chrono::NaiveDate;

use crate::csv_loader::load_csv_file;
use crate::frame::DailyFrame;
use crate::manager::{score_and_rank, stratified_sample, DataManager, LoadedMarket};

/// A filesystem-backed `DataManager`: one CSV per symbol under
/// `data_dir/<symbol>.csv`, plus one CSV per universe under
/// `universe_dir/<index_code>.csv` (single `symbol` column, one row per
/// constituent).
pub struct CsvDataManager {
    data_dir: PathBuf,
    universe_dir: PathBuf,
}

impl CsvDataManager {
    pub fn new(data_dir: impl Into<PathBuf>, universe_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            universe_dir: universe_dir.into(),
        }
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.csv"))
    }

    fn universe_path(&self, index_code: &str) -> PathBuf {
        self.universe_dir.join(format!("{index_code}.csv"))
    }
}

impl DataManager for CsvDataManager {
    fn load_universe(&self, index_code: &str) -> Result<Vec<Symbol>> {
        let path = self.universe_path(index_code);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading universe file {}", path.display()))?;

        let mut symbols: Vec<Symbol> = contents
            .lines()
            .skip(1) // header: "symbol"
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn load_symbol(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DailyFrame> {
        load_symbol_frame(&self.symbol_path(symbol), start, end)
    }

    fn load_market(
        &self,
        symbols: &[Symbol],
        start: NaiveDate,
        end: NaiveDate,
        max_n: Option<usize>,
        scorer: Option<&dyn Fn(&Symbol, &DailyBar) -> f64>,
    ) -> Result<LoadedMarket> {
        if start >= end {
            return Err(anyhow!("load_market: start {start} must precede end {end}"));
        }

        let mut market_data: BTreeMap<Symbol, DailyFrame> = BTreeMap::new();
        for symbol in symbols {
            let frame = self.load_symbol(symbol, start, end)?;
            if !frame.is_empty() {
                market_data.insert(symbol.clone(), frame);
            }
        }

        let loaded_symbols: Vec<Symbol> = market_data.keys().cloned().collect();
        let selected = match (max_n, scorer) {
            (Some(n), Some(f)) => score_and_rank(
                &loaded_symbols,
                |s| market_data.get(s).and_then(|frame| frame.values().next_back()).cloned(),
                f,
                n,
            ),
            (Some(n), None) => stratified_sample(&loaded_symbols, n),
            (None, _) => loaded_symbols,
        };

        market_data.retain(|symbol, _| selected.contains(symbol));

        let all_dates: Vec<NaiveDate> = market_data
            .values()
            .flat_map(|frame| frame.keys().copied())
            .collect();

        Ok(LoadedMarket {
            market_data,
            trading_dates: TradingCalendar::new(all_dates),
        })
    }
}

fn load_symbol_frame(path: &Path, start: NaiveDate, end: NaiveDate) -> Result<DailyFrame> {
    if !path.exists() {
        return Ok(DailyFrame::new());
    }
    let rows = load_csv_file(path).map_err(|e| anyhow!("{}: {}", path.display(), e))?;

    let mut frame = DailyFrame::new();
    for row in rows {
        if row.date >= start && row.date <= end {
            frame.insert(row.date, row.bar);
        }
    }
    Ok(frame)
}
