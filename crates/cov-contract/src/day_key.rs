// day_key.rs — canonical calendar-day identifiers and the clock seam.
//
// A day-key is a `YYYY-MM-DD` string and nothing else: no time component,
// no partial dates, no offsets. Anywhere a contract carries a day-key, an
// ISO timestamp is a validation failure, not a value to be coerced.
//
// All horizon walks are bounded by `MAX_HORIZON_DAYS` so a malformed range
// becomes a structured error instead of an unbounded loop.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::ContractError;

/// Upper bound on any day-range walk. Plans cover at most a few hundred
/// days; anything past this is a malformed input, not a real horizon.
pub const MAX_HORIZON_DAYS: usize = 1000;

/// True when `value` is a canonical `YYYY-MM-DD` key naming a real date.
pub fn is_valid_day_key(value: &str) -> bool {
    parse_day_key(value).is_ok()
}

/// Parse a canonical day-key into a [`NaiveDate`].
///
/// The shape check runs before chrono because chrono's numeric specifiers
/// accept unpadded fields — `2026-1-1` must be rejected, not normalized.
pub fn parse_day_key(value: &str) -> Result<NaiveDate, ContractError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if !shape_ok {
        return Err(ContractError::InvalidDayKey {
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ContractError::InvalidDayKey {
        value: value.to_string(),
    })
}

/// Format a date back into its canonical day-key.
pub fn format_day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Add (or subtract) `n` calendar days to a day-key.
pub fn add_days(day_key: &str, n: i64) -> Result<String, ContractError> {
    let date = parse_day_key(day_key)?;
    Ok(format_day_key(date + Duration::days(n)))
}

/// Resolve an RFC 3339 timestamp to the UTC calendar day it falls on.
pub fn day_key_from_iso(iso: &str) -> Result<String, ContractError> {
    let instant =
        DateTime::parse_from_rfc3339(iso).map_err(|_| ContractError::InvalidTimestamp {
            value: iso.to_string(),
        })?;
    Ok(format_day_key(instant.with_timezone(&Utc).date_naive()))
}

/// Every day-key in `[start, end]`, inclusive, in ascending order.
///
/// Empty when `start > end`. Errors when the span exceeds the walk cap.
pub fn days_between_inclusive(start: &str, end: &str) -> Result<Vec<String>, ContractError> {
    let start_date = parse_day_key(start)?;
    let end_date = parse_day_key(end)?;
    if start_date > end_date {
        return Ok(Vec::new());
    }
    let span = (end_date - start_date).num_days() as usize + 1;
    if span > MAX_HORIZON_DAYS {
        return Err(ContractError::HorizonTooLong {
            start: start.to_string(),
            end: end.to_string(),
            max: MAX_HORIZON_DAYS,
        });
    }
    let mut days = Vec::with_capacity(span);
    let mut cursor = start_date;
    while cursor <= end_date {
        days.push(format_day_key(cursor));
        cursor += Duration::days(1);
    }
    Ok(days)
}

/// Weekday index of a day-key, Sunday = 0 through Saturday = 6.
pub fn weekday_index(day_key: &str) -> Result<u32, ContractError> {
    Ok(parse_day_key(day_key)?.weekday().num_days_from_sunday())
}

/// The Monday-start week key containing `day_key` — used for weekly caps.
pub fn week_start(day_key: &str) -> Result<String, ContractError> {
    let date = parse_day_key(day_key)?;
    let offset = date.weekday().num_days_from_monday() as i64;
    Ok(format_day_key(date - Duration::days(offset)))
}

/// Parse a wall-clock time like `09:00`, `9:30 pm`, or `14:05:30`.
///
/// Returns `(hours, minutes)` in 24h form, or `None` when unparseable —
/// callers turn that into their own refusal, so no error type here.
pub fn parse_time_of_day(raw: &str) -> Option<(u8, u8)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (clock, meridiem) = match trimmed.to_ascii_lowercase() {
        s if s.ends_with("am") => (s[..s.len() - 2].trim().to_string(), Some("am")),
        s if s.ends_with("pm") => (s[..s.len() - 2].trim().to_string(), Some("pm")),
        s => (s, None),
    };
    let mut parts = clock.split(':');
    let hours_raw: u8 = parts.next()?.parse().ok()?;
    let minutes: u8 = parts.next()?.parse().ok()?;
    if let Some(seconds) = parts.next() {
        let _: u8 = seconds.parse().ok()?;
    }
    if parts.next().is_some() || minutes > 59 {
        return None;
    }
    let hours = match meridiem {
        None if hours_raw <= 23 => hours_raw,
        Some("pm") if hours_raw >= 1 && hours_raw < 12 => hours_raw + 12,
        Some("pm") if hours_raw == 12 => 12,
        Some("am") if hours_raw == 12 => 0,
        Some("am") if hours_raw >= 1 && hours_raw <= 11 => hours_raw,
        _ => return None,
    };
    Some((hours, minutes))
}

/// Canonical `HH:MM` rendering of a parsed time.
pub fn canonical_time(hours: u8, minutes: u8) -> String {
    format!("{hours:02}:{minutes:02}")
}

/// The single source of "now" for every transform in the workspace.
///
/// Generators never read the system clock directly — they take a `Clock`
/// (or an explicit instant) so identical inputs replay identically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_iso(&self) -> String {
        self.now().to_rfc3339()
    }

    fn now_day_key(&self) -> String {
        format_day_key(self.now().date_naive())
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant, for tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn from_rfc3339(iso: &str) -> Result<Self, ContractError> {
        let instant =
            DateTime::parse_from_rfc3339(iso).map_err(|_| ContractError::InvalidTimestamp {
                value: iso.to_string(),
            })?;
        Ok(Self(instant.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keys_parse() {
        assert!(is_valid_day_key("2026-01-10"));
        assert!(is_valid_day_key("2024-02-29")); // leap day
    }

    #[test]
    fn non_canonical_keys_rejected() {
        for bad in [
            "2026-1-10",                // unpadded month
            "2026-01-10T09:00:00Z",     // timestamp where a day-key belongs
            "2026-01",                  // partial date
            "2026-02-30",               // not a real date
            "2023-02-29",               // non-leap February 29
            "not-a-date",
            "",
        ] {
            assert!(!is_valid_day_key(bad), "expected rejection: {bad}");
        }
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days("2026-01-30", 3).unwrap(), "2026-02-02");
        assert_eq!(add_days("2025-12-30", 5).unwrap(), "2026-01-04");
        assert_eq!(add_days("2026-01-10", -10).unwrap(), "2025-12-31");
    }

    #[test]
    fn day_key_from_iso_resolves_to_utc_day() {
        assert_eq!(
            day_key_from_iso("2026-01-10T23:30:00-05:00").unwrap(),
            "2026-01-11"
        );
        assert!(day_key_from_iso("2026-01-10").is_err());
    }

    #[test]
    fn days_between_is_inclusive_and_ordered() {
        let days = days_between_inclusive("2026-01-30", "2026-02-02").unwrap();
        assert_eq!(
            days,
            vec!["2026-01-30", "2026-01-31", "2026-02-01", "2026-02-02"]
        );
        assert!(days_between_inclusive("2026-02-02", "2026-01-30")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn oversized_horizon_is_a_structured_error() {
        let result = days_between_inclusive("2000-01-01", "2026-01-01");
        assert!(matches!(result, Err(ContractError::HorizonTooLong { .. })));
    }

    #[test]
    fn week_start_is_monday() {
        // 2026-01-10 is a Saturday; its week starts Monday 2026-01-05.
        assert_eq!(week_start("2026-01-10").unwrap(), "2026-01-05");
        assert_eq!(week_start("2026-01-05").unwrap(), "2026-01-05");
        // Sunday belongs to the week that started the previous Monday.
        assert_eq!(week_start("2026-01-11").unwrap(), "2026-01-05");
    }

    #[test]
    fn weekday_index_sunday_zero() {
        assert_eq!(weekday_index("2026-01-11").unwrap(), 0); // Sunday
        assert_eq!(weekday_index("2026-01-05").unwrap(), 1); // Monday
        assert_eq!(weekday_index("2026-01-10").unwrap(), 6); // Saturday
    }

    #[test]
    fn time_parsing_accepts_common_forms() {
        assert_eq!(parse_time_of_day("09:00"), Some((9, 0)));
        assert_eq!(parse_time_of_day("9:30 PM"), Some((21, 30)));
        assert_eq!(parse_time_of_day("12:15am"), Some((0, 15)));
        assert_eq!(parse_time_of_day("12:15pm"), Some((12, 15)));
        assert_eq!(parse_time_of_day("14:05:30"), Some((14, 5)));
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("09:61"), None);
        assert_eq!(parse_time_of_day("morning"), None);
    }

    #[test]
    fn fixed_clock_replays_one_instant() {
        let clock = FixedClock::from_rfc3339("2026-01-10T08:00:00Z").unwrap();
        assert_eq!(clock.now_day_key(), "2026-01-10");
        assert_eq!(clock.now_day_key(), clock.now_day_key());
    }
}
