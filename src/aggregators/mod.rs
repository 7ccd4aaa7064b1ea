//! Section aggregators for the weekly report.
//!
//! Each submodule builds one report section the same way:
//!
//! 1. **Query**: Issue fixed query templates through the [`SearchGateway`](crate::search::SearchGateway)
//! 2. **Extract**: Run the [`extract`](crate::extract) heuristics over every hit
//! 3. **Dedupe**: Drop repeats by the section's key (model name, title, quote)
//! 4. **Trim**: Rank or truncate to the requested size
//!
//! # Sections
//!
//! | Section | Module | Dedupe key | Ordering |
//! |---------|--------|------------|----------|
//! | Sales rankings | [`sales`] | model name, per band | discovery order |
//! | New launches / upcoming | [`releases`] | none | result order |
//! | VIP voices | [`vip`] | quote text | result order |
//! | Smart-dimming news | [`dimming`] | title | score, then discovery |
//!
//! Aggregators never fail. An empty or degraded search simply produces an
//! empty section (or a sentinel summary for VIPs).

use chrono::{Days, NaiveDate, Utc};

pub mod dimming;
pub mod releases;
pub mod sales;
pub mod vip;

/// Today's date in UTC, the reference point for every date-windowed query.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// The date one week before `today`.
pub fn week_before(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(7)).unwrap_or(today)
}
