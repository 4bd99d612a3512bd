//! Foundational low-level utilities shared across Muster crates.
//!
//! Provides atomic file-write helpers, time utilities used by the event
//! store and notification selection, and human date parsing for the
//! event-creation form.

pub mod atomic_io;
pub mod date_utils;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use date_utils::{day_number, is_day_formatted_as_date, next_weekday_as_date, parse_human_date};
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms, day_bounds, is_same_day};

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use chrono::{DateTime, Utc};

    use super::*;

    fn utc(value: &str) -> DateTime<Utc> {
        value.parse::<DateTime<Utc>>().expect("timestamp")
    }

    #[test]
    fn time_utils_round_trip_bounds() {
        let now_s = current_unix_timestamp();
        let now_ms = current_unix_timestamp_ms();
        let now_ms_s = now_ms / 1_000;
        assert!(now_ms_s >= now_s);
        assert!(now_ms_s <= now_s.saturating_add(1));
    }

    #[test]
    fn day_bounds_are_half_open_over_the_calendar_day() {
        let now = utc("2025-01-15T09:30:00Z");
        let (start, end) = day_bounds(now);
        assert_eq!(start, utc("2025-01-15T00:00:00Z"));
        assert_eq!(end, utc("2025-01-16T00:00:00Z"));

        assert!(is_same_day(utc("2025-01-15T00:00:00Z"), now));
        assert!(is_same_day(utc("2025-01-15T23:59:59Z"), now));
        assert!(!is_same_day(utc("2025-01-16T00:00:00Z"), now));
        assert!(!is_same_day(utc("2025-01-14T23:59:59Z"), now));
    }

    #[test]
    fn write_text_atomic_writes_content() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("sample.txt");
        write_text_atomic(&path, "hello world").expect("write");
        let contents = read_to_string(&path).expect("read");
        assert_eq!(contents, "hello world");
    }
}
