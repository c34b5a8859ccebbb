use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Active,
    Expiring,
    Expired,
}

/// Accepts a bare ISO date or a full RFC 3339 timestamp. A bare date
/// means midnight UTC of that day.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Expiry at or before `as_of` is `Expired`; at most `window_days`
/// ahead is `Expiring` (upper boundary inclusive); anything later is
/// `Active`.
pub fn classify(expiry: DateTime<Utc>, as_of: DateTime<Utc>, window_days: i64) -> ExpiryStatus {
    if expiry <= as_of {
        ExpiryStatus::Expired
    } else if expiry <= as_of + Duration::days(window_days) {
        ExpiryStatus::Expiring
    } else {
        ExpiryStatus::Active
    }
}

/// Whole days until expiry, rounded up; negative once expired.
pub fn days_until_expiry(expiry: DateTime<Utc>, as_of: DateTime<Utc>) -> i64 {
    let seconds = (expiry - as_of).num_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn expiry_equal_to_as_of_is_expired() {
        let now = at(2025, 1, 5);
        assert_eq!(classify(now, now, 7), ExpiryStatus::Expired);
    }

    #[test]
    fn expiry_at_window_boundary_is_expiring() {
        let now = at(2025, 1, 5);
        assert_eq!(classify(at(2025, 1, 12), now, 7), ExpiryStatus::Expiring);
    }

    #[test]
    fn expiry_one_day_past_window_is_active() {
        let now = at(2025, 1, 5);
        assert_eq!(classify(at(2025, 1, 13), now, 7), ExpiryStatus::Active);
    }

    #[test]
    fn expiry_before_as_of_is_expired() {
        let now = at(2025, 1, 5);
        assert_eq!(classify(at(2024, 12, 31), now, 7), ExpiryStatus::Expired);
    }

    #[test]
    fn parses_bare_dates_and_timestamps() {
        assert_eq!(parse_expiry("2025-01-10"), Some(at(2025, 1, 10)));
        assert_eq!(
            parse_expiry("2025-01-10T00:00:00Z"),
            Some(at(2025, 1, 10))
        );
        assert_eq!(parse_expiry("not-a-date"), None);
        assert_eq!(parse_expiry(""), None);
    }

    #[test]
    fn days_until_expiry_rounds_up() {
        let now = at(2025, 1, 5);
        assert_eq!(days_until_expiry(at(2025, 1, 10), now), 5);

        // partial day still counts as a full day remaining
        let later = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
        assert_eq!(days_until_expiry(at(2025, 1, 10), later), 5);
    }

    #[test]
    fn days_until_expiry_is_negative_after_expiry() {
        let now = at(2025, 1, 5);
        assert_eq!(days_until_expiry(at(2025, 1, 2), now), -3);
    }
}
