//! Human-friendly date parsing for event scheduling input.
//!
//! Accepts strict `YYYY-MM-DD` dates plus the short phrases people actually
//! type into a chat form: weekday names, `today`, `tomorrow`, `next friday`,
//! `in 3 days`. Phrases that resolve to a date in the past yield `None`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Returns true when `value` is a valid date in strict `YYYY-MM-DD` form.
pub fn is_day_formatted_as_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Parses a weekday name, full or three-letter, case-insensitive.
pub fn day_number(name: &str) -> Option<Weekday> {
    name.trim().parse::<Weekday>().ok()
}

/// Returns the next date falling on `weekday`, counting `today` itself.
pub fn next_weekday_as_date(weekday: Weekday, today: NaiveDate) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(i64::from(ahead))
}

/// Resolves `text` to a concrete future (or today's) date, `None` otherwise.
pub fn parse_human_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return (date >= today).then_some(date);
    }

    let lowered = trimmed.to_ascii_lowercase();
    match lowered.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = lowered.strip_prefix("next ") {
        let weekday = day_number(rest)?;
        let candidate = next_weekday_as_date(weekday, today);
        // "next monday" on a Monday means a week out, not today.
        return Some(if candidate == today {
            candidate + Duration::days(7)
        } else {
            candidate
        });
    }

    if let Some(weekday) = day_number(&lowered) {
        return Some(next_weekday_as_date(weekday, today));
    }

    if let Some(rest) = lowered.strip_prefix("in ") {
        let days = rest
            .strip_suffix(" days")
            .or_else(|| rest.strip_suffix(" day"))?
            .trim()
            .parse::<i64>()
            .ok()?;
        if days < 0 {
            return None;
        }
        return Some(today + Duration::days(days));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        // 2025-01-15 is a Wednesday.
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn unit_is_day_formatted_as_date_accepts_strict_iso_only() {
        assert!(is_day_formatted_as_date("2025-01-15"));
        assert!(is_day_formatted_as_date("2024-02-29"));
        assert!(!is_day_formatted_as_date("15-01-2025"));
        assert!(!is_day_formatted_as_date("01/15/2025"));
        assert!(!is_day_formatted_as_date("2025-13-01"));
        assert!(!is_day_formatted_as_date("2025-01-32"));
        assert!(!is_day_formatted_as_date(""));
        assert!(!is_day_formatted_as_date("not-a-date"));
    }

    #[test]
    fn unit_day_number_parses_full_and_abbreviated_names_any_case() {
        assert_eq!(day_number("Monday"), Some(Weekday::Mon));
        assert_eq!(day_number("mon"), Some(Weekday::Mon));
        assert_eq!(day_number("MoNdAy"), Some(Weekday::Mon));
        assert_eq!(day_number("saturday"), Some(Weekday::Sat));
        assert_eq!(day_number("sunday"), Some(Weekday::Sun));
        assert_eq!(day_number("funday"), None);
        assert_eq!(day_number(""), None);
    }

    #[test]
    fn unit_next_weekday_as_date_lands_within_a_week_and_counts_today() {
        let today = wednesday();
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let result = next_weekday_as_date(weekday, today);
            assert_eq!(result.weekday(), weekday);
            assert!(result >= today);
            assert!(result <= today + Duration::days(6));
        }
        assert_eq!(next_weekday_as_date(Weekday::Wed, today), today);
    }

    #[test]
    fn unit_parse_human_date_resolves_phrases_relative_to_today() {
        let today = wednesday();
        assert_eq!(parse_human_date("today", today), Some(today));
        assert_eq!(
            parse_human_date("tomorrow", today),
            Some(today + Duration::days(1))
        );
        assert_eq!(
            parse_human_date("in 5 days", today),
            Some(today + Duration::days(5))
        );
        assert_eq!(
            parse_human_date("Friday", today),
            NaiveDate::from_ymd_opt(2025, 1, 17)
        );
        assert_eq!(
            parse_human_date("next Thursday", today),
            NaiveDate::from_ymd_opt(2025, 1, 16)
        );
        // "next wednesday" on a Wednesday skips to the following week.
        assert_eq!(
            parse_human_date("next wednesday", today),
            Some(today + Duration::days(7))
        );
    }

    #[test]
    fn unit_parse_human_date_rejects_past_dates_and_unknown_phrases() {
        let today = wednesday();
        assert_eq!(parse_human_date("2025-01-14", today), None);
        assert_eq!(parse_human_date("yesterday", today), None);
        assert_eq!(parse_human_date("last week", today), None);
        assert_eq!(parse_human_date("", today), None);
        assert_eq!(parse_human_date("soonish", today), None);
    }

    #[test]
    fn regression_parse_human_date_accepts_iso_dates_on_or_after_today() {
        let today = wednesday();
        assert_eq!(parse_human_date("2025-01-15", today), Some(today));
        assert_eq!(
            parse_human_date("2025-12-25", today),
            NaiveDate::from_ymd_opt(2025, 12, 25)
        );
    }
}
