//! Probe window generation
//!
//! Builds the ordered sequence of calendar dates a sweep probes for one
//! target: tomorrow up to and including the configured limit, bounded by a
//! 30-day safety fallback. Pure date arithmetic, regenerated on every sweep
//! because "tomorrow" shifts daily.

use chrono::{Duration, NaiveDate};
use tracing::warn;

/// Wire format shared by every target site
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Window length used when no valid limit is configured
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Parse a DD/MM/YYYY date string
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Format a date in the DD/MM/YYYY wire format
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Generate the ascending probe window for one sweep.
///
/// The window starts at `today + 1` (today itself is never probed) and ends
/// at `explicit_limit` inclusive when it parses as DD/MM/YYYY, otherwise at
/// `today + 30`. A limit before tomorrow yields an empty window.
pub fn date_window(today: NaiveDate, explicit_limit: Option<&str>) -> Vec<NaiveDate> {
    let start = today + Duration::days(1);

    let limit = match explicit_limit.and_then(parse_date) {
        Some(limit) => limit,
        None => {
            if explicit_limit.is_some() {
                warn!(
                    limit = ?explicit_limit,
                    "date limit is not a valid DD/MM/YYYY date, defaulting to {DEFAULT_WINDOW_DAYS} day window"
                );
            } else {
                warn!("no date limit set, defaulting to {DEFAULT_WINDOW_DAYS} day window");
            }
            today + Duration::days(DEFAULT_WINDOW_DAYS)
        }
    };

    let mut dates = Vec::new();
    let mut current = start;
    while current <= limit {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}
