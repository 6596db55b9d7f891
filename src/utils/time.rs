use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Mutex;

/// Source of the current instant for anything time-dependent.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().expect("fixed clock mutex poisoned") = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().expect("fixed clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("fixed clock mutex poisoned")
    }
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Accepts RFC 3339, a zone-less `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]`, or a bare
/// `YYYY-MM-DD` meaning midnight. Zone-less input is read as UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| parse_date(raw).map(|date| day_bounds(date).0))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Half-open `[00:00, next 00:00)` bounds of a calendar date.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::default()).and_utc();
    (start, start + Duration::days(1))
}

pub fn hour_minute(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_and_naive_inputs() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_date_time("2025-06-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01T10:00:00"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01 10:00"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01T10:00:00.000"), Some(expected));
        assert_eq!(
            parse_date_time("2025-06-01 10:00:00.250").map(|d| d.timestamp_subsec_millis()),
            Some(250)
        );
        assert_eq!(parse_date_time("01/06/2025 10:00"), None);
        assert_eq!(parse_date_time(""), None);
    }

    #[test]
    fn bare_date_means_midnight_utc() {
        let midnight = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date_time("2025-06-01"), Some(midnight));
        assert_eq!(parse_date_time("2025-06-31"), None);
    }

    #[test]
    fn parse_date_is_strict() {
        assert_eq!(parse_date("2025-06-01"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(parse_date("2025-6-1x"), None);
        assert_eq!(parse_date("2025-06-01T10:00"), None);
    }

    #[test]
    fn fixed_clock_moves_only_on_request() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::minutes(5));
        assert_eq!(hour_minute(&clock.now()), "09:05");
    }
}
