//! ashq-data
//!
//! Market-data access: the `DataManager` trait the engine depends on,
//! a `DailyFrame` time series type with "most recent prior bar"
//! lookup, and a CSV-backed reference implementation.

mod csv_loader;
mod csv_manager;
mod frame;
mod manager;

pub use csv_loader::{load_csv_file, parse_csv_rows, CsvRow, LoadError};
pub use csv_manager::CsvDataManager;
pub use frame::{bar_on, DailyFrame};
pub use manager::{score_and_rank, stratified_sample, DataManager, LoadedMarket};
