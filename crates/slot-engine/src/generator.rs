//! Candidate slot generation.
//!
//! Both strategies walk the search window day by day and lay slots on a fixed
//! minute grid inside a local wall-clock window. Local times are resolved
//! through the request timezone; a grid point inside a DST gap is skipped and
//! an ambiguous one resolves to the earlier instant.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::model::{local_time, CandidateSlot, DaySet, OrganizerIntent, UserSchedulingPreference};
use crate::window::SearchWindow;

/// Wall-clock view of an instant in `tz`.
pub fn local_datetime(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

fn resolve_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn minute_of_day(time: NaiveTime) -> u32 {
    let minutes = time.hour() * 60 + time.minute();
    // round a partial minute up so the first slot never starts early
    if time.second() > 0 || time.nanosecond() > 0 {
        minutes + 1
    } else {
        minutes
    }
}

/// Lay `duration`-long slots on a `grid_minutes` grid between two local times on `date`.
///
/// The first slot starts at `from` rounded up to the grid; the last one ends
/// at or before `until`.
pub fn grid_slots(
    date: NaiveDate,
    from: NaiveTime,
    until: NaiveTime,
    grid_minutes: u32,
    duration: Duration,
    tz: Tz,
) -> Vec<CandidateSlot> {
    if grid_minutes == 0 || duration <= Duration::zero() {
        return Vec::new();
    }

    let duration_minutes = duration.num_minutes();
    let last_minute = i64::from(until.hour() * 60 + until.minute());
    let mut minute = i64::from(minute_of_day(from).div_ceil(grid_minutes) * grid_minutes);

    let mut slots = Vec::new();
    while minute + duration_minutes <= last_minute {
        let time = local_time((minute / 60) as u32, (minute % 60) as u32);
        if let Some(start) = resolve_local(date, time, tz) {
            slots.push(CandidateSlot::new(start, duration));
        }
        minute += i64::from(grid_minutes);
    }
    slots
}

/// Inputs shared by both strategies.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub window: &'a SearchWindow,
    pub duration: Duration,
    pub tz: Tz,
    pub now: DateTime<Utc>,
    pub grid_minutes: u32,
}

/// Mutual-availability generation over every participant's preferences.
///
/// A day is used only if every participant accepts that weekday, and slots
/// are confined to the intersection of everyone's working hours. Slots
/// starting before `now + max(minimum_notice_hours)` are dropped.
pub fn generate_plain<'p>(
    ctx: &GenerationContext<'_>,
    preferences: impl IntoIterator<Item = &'p UserSchedulingPreference>,
) -> Vec<CandidateSlot> {
    let preferences: Vec<&UserSchedulingPreference> = preferences.into_iter().collect();
    if preferences.is_empty() {
        return Vec::new();
    }

    let same_day_blocked = preferences.iter().any(|p| !p.allow_same_day_scheduling);
    let shared_days = preferences
        .iter()
        .fold(DaySet::ALL, |days, p| days.intersection(p.available_days()));
    let (day_start, day_end) = shared_working_hours(&preferences);
    let notice_hours = preferences
        .iter()
        .map(|p| p.minimum_notice_hours)
        .max()
        .unwrap_or(0);
    let earliest_permitted = ctx.now + Duration::hours(i64::from(notice_hours));
    let today = local_datetime(ctx.now, ctx.tz).date();

    if day_end.signed_duration_since(day_start) < ctx.duration {
        return Vec::new();
    }

    ctx.window
        .days()
        .filter(|date| !(same_day_blocked && *date == today))
        .filter(|date| shared_days.contains(date.weekday()))
        .flat_map(|date| grid_slots(date, day_start, day_end, ctx.grid_minutes, ctx.duration, ctx.tz))
        .filter(|slot| slot.start >= earliest_permitted)
        .collect()
}

/// Latest of the starts, earliest of the ends.
pub fn shared_working_hours(preferences: &[&UserSchedulingPreference]) -> (NaiveTime, NaiveTime) {
    let start = preferences
        .iter()
        .map(|p| p.earliest_start_time)
        .max()
        .unwrap_or(NaiveTime::MIN);
    let end = preferences
        .iter()
        .map(|p| p.latest_end_time)
        .min()
        .unwrap_or(NaiveTime::MIN);
    (start, end)
}

/// The two fixed bands the context-aware strategy schedules into. Lunch
/// (12:00–13:00) sits between them.
pub fn context_bands() -> [(NaiveTime, NaiveTime); 2] {
    [
        (local_time(9, 0), local_time(12, 0)),
        (local_time(13, 0), local_time(17, 0)),
    ]
}

/// Context-aware generation driven by the organizer's intent.
///
/// Skips days the organizer or any participant avoids, skips weekends unless
/// the organizer explicitly prefers them, and never emits a slot in the past.
/// Every slot carries a descriptive label and reasoning.
pub fn generate_context_aware<'p>(
    ctx: &GenerationContext<'_>,
    intent: &OrganizerIntent,
    preferences: impl IntoIterator<Item = &'p UserSchedulingPreference>,
) -> Vec<CandidateSlot> {
    let avoided = preferences
        .into_iter()
        .fold(intent.avoid_days, |days, p| days.union(p.avoid_days));

    ctx.window
        .days()
        .filter(|date| !avoided.contains(date.weekday()))
        .filter(|date| !is_weekend(date.weekday()) || intent.preferred_days.contains(date.weekday()))
        .flat_map(|date| {
            context_bands().into_iter().flat_map(move |(from, until)| {
                grid_slots(date, from, until, ctx.grid_minutes, ctx.duration, ctx.tz)
            })
        })
        .filter(|slot| slot.start >= ctx.now)
        .map(|slot| {
            let local = local_datetime(slot.start, ctx.tz);
            let (label, reasoning) = describe_slot(local.weekday(), local.hour());
            slot.with_description(label, reasoning)
        })
        .collect()
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Label and reasoning for a context-aware slot at `hour` on `day`.
pub fn describe_slot(day: Weekday, hour: u32) -> (&'static str, &'static str) {
    match (day, hour) {
        (Weekday::Mon, _) => ("Week kickoff meeting", "Sets priorities at the start of the week"),
        (Weekday::Fri, _) => ("End-of-week wrap-up", "Reviews the week before the weekend"),
        (_, h) if h < 10 => ("Early morning focus", "Starts before the day fills up"),
        (_, h) if h < 12 => ("Mid-morning meeting", "Productive morning hours"),
        (_, h) if h < 15 => ("Early afternoon session", "Right after the lunch break"),
        _ => ("Late afternoon check-in", "Winds down the working day"),
    }
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
