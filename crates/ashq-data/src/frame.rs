use std::collections::BTreeMap;

use ashq_schemas::DailyBar;
use chrono::NaiveDate;

/// A dated, indexed sequence of `DailyBar`s for one symbol, as returned
/// by `DataManager::load_symbol`. `BTreeMap` keeps the sequence ordered
/// and supports `range` lookups for `bar_on`'s "most recent on or
/// before" fallback.
pub type DailyFrame = BTreeMap<NaiveDate, DailyBar>;

/// Returns the bar for `date`, or the most recent bar strictly before
/// it if `date` itself is missing.
pub fn bar_on<'a>(frame: &'a DailyFrame, date: NaiveDate) -> Option<&'a DailyBar> {
    if let Some(bar) = frame.get(&date) {
        return Some(bar);
    }
    frame.range(..date).next_back().map(|(_, bar)| bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> DailyBar {
        DailyBar::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn bar_on_returns_exact_match() {
        let mut frame = DailyFrame::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        frame.insert(d, bar());
        assert!(bar_on(&frame, d).is_some());
    }

    #[test]
    fn bar_on_falls_back_to_most_recent_prior_bar() {
        let mut frame = DailyFrame::new();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        frame.insert(d1, bar());
        frame.insert(d3, bar());

        let missing = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert!(bar_on(&frame, missing).is_some());
    }

    #[test]
    fn bar_on_returns_none_when_date_precedes_all_data() {
        let mut frame = DailyFrame::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        frame.insert(d, bar());

        let before = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(bar_on(&frame, before).is_none());
    }
}
