use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc,
};

/// Convert a tenant-local naive instant to the UTC instant used in
/// query expressions. A skipped local time (DST gap) falls back to the
/// naive value read as UTC.
fn to_utc(naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    match naive.and_local_timezone(Local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// UTC instants `[midnight, next midnight)` for a tenant-local
/// calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    let start = date.and_time(midnight);
    let end = (date + Duration::days(1)).and_time(midnight);
    (to_utc(start), to_utc(end))
}

/// UTC instants `[monday, next monday)` for the week starting at the
/// given Monday.
pub fn week_bounds(monday: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    let start = monday.and_time(midnight);
    let end = (monday + Duration::days(7)).and_time(midnight);
    (to_utc(start), to_utc(end))
}

/// The Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Days of the current week from Monday through `today`, oldest first.
pub fn current_week_days(today: NaiveDate) -> Vec<NaiveDate> {
    let monday = monday_of(today);
    let mut days = Vec::new();
    let mut day = monday;
    while day <= today {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// Mondays of the `n` full weeks preceding the current week, oldest
/// first.
pub fn prior_week_mondays(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let current_monday = monday_of(today);
    (1..=n)
        .rev()
        .map(|i| current_monday - Duration::days(7 * i as i64))
        .collect()
}
