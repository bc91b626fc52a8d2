use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

/// Business hours: weekdays 09:00–15:00 local time.
pub const BUSINESS_START_HOUR: u32 = 9;
pub const BUSINESS_END_HOUR: u32 = 15;

/// One business day is exactly the window length (6 hours), used when
/// formatting durations as days/hours/minutes.
pub const BUSINESS_DAY_MS: i64 =
    (BUSINESS_END_HOUR - BUSINESS_START_HOUR) as i64 * 3_600_000;

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (
        date.and_hms_opt(BUSINESS_START_HOUR, 0, 0).unwrap(),
        date.and_hms_opt(BUSINESS_END_HOUR, 0, 0).unwrap(),
    )
}

/// Elapsed business time between two local instants, in milliseconds.
///
/// Walks day by day from `start`'s date to `end`'s date and accumulates
/// the positive overlap between `[start, end]` and each weekday's
/// 09:00–15:00 window. Spans entirely outside the window (nights,
/// weekends) contribute zero. Monotonically non-decreasing in `end`.
pub fn business_time_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    if end <= start {
        return 0;
    }

    let mut total = 0i64;
    let mut day = start.date();
    let last = end.date();
    while day <= last {
        if !is_weekend(day) {
            let (win_start, win_end) = window(day);
            let lo = if start > win_start { start } else { win_start };
            let hi = if end < win_end { end } else { win_end };
            if hi > lo {
                total += (hi - lo).num_milliseconds();
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    total
}

/// Format a business-time duration as `"2d 3h 15m"`, with a 6-hour
/// business day. Sub-minute values render as `"0m"`.
pub fn format_business_duration(ms: i64) -> String {
    if ms < MINUTE_MS {
        return "0m".to_string();
    }

    let days = ms / BUSINESS_DAY_MS;
    let hours = (ms % BUSINESS_DAY_MS) / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.join(" ")
}

/// Age annotation for a top issue: `"3d"` for issues at least one day
/// old, otherwise `"5t"` (hours).
pub fn age_label(created: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = now - created;
    let days = elapsed.num_days();
    if days >= 1 {
        format!("{days}d")
    } else {
        format!("{}t", elapsed.num_hours().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_weekend_span_is_zero() {
        // Saturday 2025-03-01 10:00 to Sunday 2025-03-02 14:00
        assert_eq!(
            business_time_between(dt(2025, 3, 1, 10, 0), dt(2025, 3, 2, 14, 0)),
            0
        );
    }

    #[test]
    fn test_same_day_inside_window() {
        // Wednesday 10:00 to 12:30 = 2.5h
        assert_eq!(
            business_time_between(dt(2025, 3, 5, 10, 0), dt(2025, 3, 5, 12, 30)),
            150 * MINUTE_MS
        );
    }

    #[test]
    fn test_same_day_outside_window() {
        // Wednesday 16:00 to 18:00, after close
        assert_eq!(
            business_time_between(dt(2025, 3, 5, 16, 0), dt(2025, 3, 5, 18, 0)),
            0
        );
    }

    #[test]
    fn test_friday_afternoon_to_monday_morning() {
        // Friday 14:30 → Monday 10:00: 30min Friday + 60min Monday
        let start = dt(2025, 3, 7, 14, 30);
        let end = dt(2025, 3, 10, 10, 0);
        assert_eq!(business_time_between(start, end), 90 * MINUTE_MS);
    }

    #[test]
    fn test_full_business_days_are_window_multiples() {
        // Monday 08:00 → Thursday 16:00 spans Mon, Tue, Wed, Thu fully
        let elapsed = business_time_between(dt(2025, 3, 10, 8, 0), dt(2025, 3, 13, 16, 0));
        assert_eq!(elapsed, 4 * BUSINESS_DAY_MS);
        assert_eq!(elapsed % BUSINESS_DAY_MS, 0);
    }

    #[test]
    fn test_end_before_start() {
        assert_eq!(
            business_time_between(dt(2025, 3, 5, 12, 0), dt(2025, 3, 5, 10, 0)),
            0
        );
    }

    #[test]
    fn test_monotone_in_end() {
        let start = dt(2025, 3, 7, 14, 30);
        let mut prev = 0;
        for hour in 0..72 {
            let end = start + chrono::Duration::hours(hour);
            let elapsed = business_time_between(start, end);
            assert!(elapsed >= prev, "not monotone at +{hour}h");
            prev = elapsed;
        }
    }

    #[test]
    fn test_format_business_duration() {
        assert_eq!(format_business_duration(0), "0m");
        assert_eq!(format_business_duration(30_000), "0m");
        assert_eq!(format_business_duration(45 * MINUTE_MS), "45m");
        assert_eq!(format_business_duration(2 * HOUR_MS + 15 * MINUTE_MS), "2h 15m");
        // 1 business day = 6h
        assert_eq!(format_business_duration(BUSINESS_DAY_MS), "1d");
        assert_eq!(
            format_business_duration(2 * BUSINESS_DAY_MS + 3 * HOUR_MS + 15 * MINUTE_MS),
            "2d 3h 15m"
        );
    }

    #[test]
    fn test_age_label() {
        let now = dt(2025, 3, 5, 12, 0);
        assert_eq!(age_label(dt(2025, 3, 2, 12, 0), now), "3d");
        assert_eq!(age_label(dt(2025, 3, 5, 7, 0), now), "5t");
        assert_eq!(age_label(dt(2025, 3, 5, 11, 59), now), "0t");
    }
}
