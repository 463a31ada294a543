//! Date/time text forms used by the two codecs.
//!
//! The bracketed codec writes second precision; the indentation codec writes a
//! fuller form with seven fractional digits. Parsing accepts the codec's own
//! form first and then a handful of common layouts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

/// How a codec renders and reads date/time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `2024-03-15T09:30:00` (bracketed codec).
    Compact,
    /// `2024-03-15T09:30:00.0000000` (indentation codec).
    RoundTrip,
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layouts tried after the native one, in order.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl DateStyle {
    fn native_format(self) -> &'static str {
        match self {
            DateStyle::Compact => SECONDS_FORMAT,
            DateStyle::RoundTrip => "%Y-%m-%dT%H:%M:%S%.f",
        }
    }

    pub fn format_naive(self, dt: &NaiveDateTime) -> String {
        let seconds = dt.format(SECONDS_FORMAT).to_string();
        match self {
            DateStyle::Compact => seconds,
            // chrono has no seven-digit fraction specifier; ticks of 100ns.
            DateStyle::RoundTrip => {
                let ticks = (dt.nanosecond() % 1_000_000_000) / 100;
                format!("{seconds}.{ticks:07}")
            }
        }
    }

    pub fn format_utc(self, dt: &DateTime<Utc>) -> String {
        format!("{}Z", self.format_naive(&dt.naive_utc()))
    }

    pub fn format_date(self, date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a local timestamp. Offsets, if present, are applied and dropped.
    pub fn parse_naive(self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, self.native_format()) {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        FALLBACK_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    /// Parse a UTC timestamp. Text without an offset is taken as UTC.
    pub fn parse_utc(self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = s.strip_suffix('Z').unwrap_or(s);
        self.parse_naive(naive).map(|dt| dt.and_utc())
    }

    /// Parse a calendar date, also accepting a full timestamp.
    pub fn parse_date(self, s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .ok()
            .or_else(|| self.parse_naive(s).map(|dt| dt.date()))
    }
}
