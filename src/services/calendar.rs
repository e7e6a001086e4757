//! Calendar-aware interval arithmetic.
//!
//! Pure functions over `(DateTime<Utc>, BusinessHours)`: no state, no I/O,
//! fully deterministic. The business-hours walk steps day by day instead of
//! using closed-form calendar math; `MAX_CALENDAR_DAYS` bounds the walk so a
//! malformed calendar (zero-width window, no workdays) degenerates into a
//! best-effort result instead of looping forever. Keep that cap if this
//! module is ever replaced with a real calendar library.

use crate::models::BusinessHours;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc};

/// Iteration bound for the day-by-day walks.
pub const MAX_CALENDAR_DAYS: usize = 365;

/// Compute the deadline reached after consuming `duration_minutes` of
/// business time starting at `start`.
///
/// Without business hours (or for non-positive durations) this is plain
/// addition. Otherwise the walk consumes whatever fits in each workday's
/// open window and carries the remainder to the next workday's open.
pub fn calculate_deadline(
    start: DateTime<Utc>,
    duration_minutes: i64,
    hours: &BusinessHours,
    business_hours_only: bool,
) -> DateTime<Utc> {
    if !business_hours_only || duration_minutes <= 0 {
        return start + Duration::minutes(duration_minutes);
    }

    let open = hours.open_minutes();
    let close = hours.close_minutes();
    let mut current = start;
    let mut remaining = duration_minutes;

    for _ in 0..MAX_CALENDAR_DAYS {
        if !hours.is_workday(weekday_of(current)) {
            current = at_minute_of_day(next_day(current), open);
            continue;
        }

        let minute = minute_of_day(current);
        if minute < open {
            current = at_minute_of_day(current, open);
            continue;
        }
        if minute >= close {
            current = at_minute_of_day(next_day(current), open);
            continue;
        }

        let available = close - minute;
        if remaining <= available {
            return current + Duration::minutes(remaining);
        }
        remaining -= available;
        current = at_minute_of_day(next_day(current), open);
    }

    current
}

/// Business minutes elapsed between `start` and `end`.
///
/// Without business hours this is the plain minute difference. With business
/// hours it sums the overlap of `[start, end)` with each workday's open
/// window, skipping non-workdays.
pub fn calculate_elapsed_minutes(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    hours: &BusinessHours,
    business_hours_only: bool,
) -> i64 {
    if !business_hours_only {
        return (end - start).num_minutes();
    }
    if end <= start {
        return 0;
    }

    let open = hours.open_minutes();
    let close = hours.close_minutes();
    let mut total = 0i64;
    let mut current = start;

    for _ in 0..MAX_CALENDAR_DAYS {
        if current >= end {
            break;
        }
        if hours.is_workday(weekday_of(current)) {
            let day_open = at_minute_of_day(current, open);
            let day_close = at_minute_of_day(current, close);
            let from = current.max(day_open);
            let to = end.min(day_close);
            if to > from {
                total += (to - from).num_minutes();
            }
        }
        current = at_minute_of_day(next_day(current), 0);
    }

    total
}

/// Business minutes remaining until `deadline`, with paused time given back.
///
/// A breach is reported as negative remaining: when `now >= deadline` the
/// result is the negated elapsed business time since the deadline (plus the
/// paused padding).
pub fn calculate_remaining_minutes(
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
    hours: &BusinessHours,
    business_hours_only: bool,
    paused_minutes: i64,
) -> i64 {
    if now >= deadline {
        -calculate_elapsed_minutes(deadline, now, hours, business_hours_only) + paused_minutes
    } else {
        calculate_elapsed_minutes(now, deadline, hours, business_hours_only) + paused_minutes
    }
}

/// Percent of the SLA budget consumed at `now`, clamped to [0, 100].
///
/// A degenerate zero-duration budget reports 100 immediately.
pub fn calculate_used_percent(
    start: DateTime<Utc>,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
    hours: &BusinessHours,
    business_hours_only: bool,
    paused_minutes: i64,
) -> f64 {
    let total = calculate_elapsed_minutes(start, deadline, hours, business_hours_only);
    if total <= 0 {
        return 100.0;
    }
    let used = calculate_elapsed_minutes(start, now, hours, business_hours_only) - paused_minutes;
    ((used as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}

/// True iff the instant falls on a workday inside the `[open, close)` window.
pub fn is_within_business_hours(instant: DateTime<Utc>, hours: &BusinessHours) -> bool {
    if !hours.is_workday(weekday_of(instant)) {
        return false;
    }
    let minute = minute_of_day(instant);
    minute >= hours.open_minutes() && minute < hours.close_minutes()
}

/// Human-readable rendering of a minute count. Display helper only.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return format!("-{}", format_duration(-minutes));
    }
    if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 1440 {
        let h = minutes / 60;
        let m = minutes % 60;
        if m == 0 {
            format!("{}h", h)
        } else {
            format!("{}h {}m", h, m)
        }
    } else {
        let d = minutes / 1440;
        let h = (minutes % 1440) / 60;
        if h == 0 {
            format!("{}d", d)
        } else {
            format!("{}d {}h", d, h)
        }
    }
}

// 0 = Sunday .. 6 = Saturday, matching the workdays encoding.
fn weekday_of(instant: DateTime<Utc>) -> u8 {
    instant.weekday().num_days_from_sunday() as u8
}

fn minute_of_day(instant: DateTime<Utc>) -> i64 {
    (instant.hour() * 60 + instant.minute()) as i64
}

fn at_minute_of_day(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    let clamped = minutes.clamp(0, 23 * 60 + 59);
    let time = NaiveTime::from_hms_opt((clamped / 60) as u32, (clamped % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&instant.date_naive().and_time(time))
}

fn next_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    match instant.date_naive().succ_opt() {
        Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        None => instant,
    }
}
