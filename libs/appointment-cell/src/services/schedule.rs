// libs/appointment-cell/src/services/schedule.rs
//
// Pure calendar math for the scheduling engine: timezone
// normalization, working-hours resolution and slot generation.
// Nothing here touches the store or the clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// Base slot grid, the shortest service duration. Slots for every
/// service start on this grid so busy marking stays aligned.
pub const SLOT_MINUTES: i64 = 15;

/// Open/close clock hours for one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub start_hour: i64,
    pub end_hour: i64,
}

/// Calendar date that `t` falls on in the client's offset.
///
/// `tz_offset_minutes` follows the `Date.getTimezoneOffset()` sign
/// convention (UTC minus local), so local wall-clock time is the
/// instant shifted backward by the offset.
pub fn local_date(t: DateTime<Utc>, tz_offset_minutes: i32) -> NaiveDate {
    (t - Duration::minutes(tz_offset_minutes as i64)).date_naive()
}

/// Absolute instant of local midnight for `date` in the client's
/// offset. Inverse of [`local_date`]: reconstruct midnight as if the
/// wall clock were UTC, then shift forward by the offset.
pub fn local_midnight(date: NaiveDate, tz_offset_minutes: i32) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    midnight + Duration::minutes(tz_offset_minutes as i64)
}

/// Working hours for a local calendar date. Weekends run a short day.
/// Pure function of the date only.
pub fn working_window(date: NaiveDate) -> WorkingWindow {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => WorkingWindow { start_hour: 9, end_hour: 13 },
        _ => WorkingWindow { start_hour: 9, end_hour: 18 },
    }
}

/// Ascending candidate start instants within `[window_start, window_end)`:
/// every `t` reachable from `window_start` in steps of `slot_minutes`
/// with `t + duration_minutes <= window_end`.
pub fn slot_starts(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    slot_minutes: i64,
    duration_minutes: i64,
) -> Vec<DateTime<Utc>> {
    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(slot_minutes);

    let mut slots = Vec::new();
    let mut current = window_start;

    while current + duration <= window_end {
        slots.push(current);
        current += step;
    }

    slots
}
