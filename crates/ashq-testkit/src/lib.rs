//! ashq-testkit
//!
//! Shared fixture builders for engine-level tests: synthetic bars,
//! calendars, and scriptable `Strategy` implementations, so every
//! crate's integration tests construct scenarios the same way instead
//! of each hand-rolling its own bar/calendar plumbing.

mod fixtures;
mod scripted_strategy;

pub use fixtures::{calendar, date, flat_bar, suspended_bar, synthetic_frame, synthetic_market};
pub use scripted_strategy::{NoOpStrategy, ScoreByCloseStrategy, ScriptedStrategy};
