/// Validation failures for a loaded `BacktestConfig`. Deliberately not
/// an `anyhow::Error`: callers (tests, `ashq-cli`) want to match on the
/// offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDateRange { start: String, end: String },
    NonPositive { field: &'static str, value: String },
    Negative { field: &'static str, value: String },
    OutOfUnitRange { field: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidDateRange { start, end } => {
                write!(f, "start_date {start} must precede end_date {end}")
            }
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be > 0, got {value}")
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{field} must be >= 0, got {value}")
            }
            ConfigError::OutOfUnitRange { field, value } => {
                write!(f, "{field} must be in (0, 1], got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
