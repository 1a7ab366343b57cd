//! Display helpers for upstream ISO-8601 durations and timestamps

use chrono::{DateTime, NaiveDateTime, ParseError};
use regex::Regex;
use std::sync::LazyLock;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?").expect("duration pattern is valid")
});

/// Date and 24-hour clock time split out of a timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDateTime {
    pub date: String,
    pub time: String,
}

/// Render a `PT[n]H[n]M` duration as `"4h 30m"`, `"4h"`, `"45m"` or `"0m"`.
///
/// Input that doesn't look like a duration at all is returned unchanged.
pub fn parse_duration(iso: &str) -> String {
    let Some(captures) = DURATION_PATTERN.captures(iso) else {
        return iso.to_string();
    };

    let component = |index: usize| -> u64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let hours = component(1);
    let minutes = component(2);

    match (hours, minutes) {
        (0, 0) => "0m".to_string(),
        (h, 0) => format!("{}h", h),
        (0, m) => format!("{}m", m),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Split a timestamp into `YYYY-MM-DD` and `HH:MM`.
///
/// Timestamps with an offset are rendered in that offset; timestamps without
/// one are taken as written. No display timezone is applied.
pub fn format_date_time(iso: &str) -> Result<DisplayDateTime, ParseError> {
    let naive = match DateTime::parse_from_rfc3339(iso) {
        Ok(timestamp) => timestamp.naive_local(),
        Err(rfc_err) => NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M"))
            .map_err(|_| rfc_err)?,
    };

    Ok(DisplayDateTime {
        date: naive.format("%Y-%m-%d").to_string(),
        time: naive.format("%H:%M").to_string(),
    })
}
