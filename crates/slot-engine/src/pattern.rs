//! Historical calendar habits derived from a participant's busy intervals.

use std::collections::HashMap;

use chrono::{Datelike, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::generator::local_datetime;
use crate::model::BusyInterval;

/// How many of the busiest weekdays to report.
const TOP_BUSY_DAYS: usize = 3;

/// Read-only summary of when a participant usually has meetings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarPattern {
    pub morning_meeting_count: usize,
    pub afternoon_meeting_count: usize,
    pub average_start_hour: f64,
    pub average_duration_minutes: f64,
    pub top_busy_weekdays: Vec<Weekday>,
}

impl CalendarPattern {
    /// Analyze `busy` in the local time of `tz`. An empty list yields the zero pattern.
    pub fn from_busy(busy: &[BusyInterval], tz: Tz) -> Self {
        if busy.is_empty() {
            return Self::default();
        }

        let mut pattern = Self::default();
        let mut start_hours = 0.0;
        let mut minutes = 0.0;
        let mut per_day: HashMap<Weekday, usize> = HashMap::new();

        for interval in busy {
            let local = local_datetime(interval.start, tz);
            if local.hour() < 12 {
                pattern.morning_meeting_count += 1;
            } else {
                pattern.afternoon_meeting_count += 1;
            }
            start_hours += f64::from(local.hour()) + f64::from(local.minute()) / 60.0;
            minutes += interval.duration_minutes() as f64;
            *per_day.entry(local.weekday()).or_default() += 1;
        }

        let count = busy.len() as f64;
        pattern.average_start_hour = start_hours / count;
        pattern.average_duration_minutes = minutes / count;

        let mut days: Vec<(Weekday, usize)> = per_day.into_iter().collect();
        days.sort_by_key(|&(day, n)| (std::cmp::Reverse(n), day.num_days_from_monday()));
        pattern.top_busy_weekdays = days.into_iter().take(TOP_BUSY_DAYS).map(|(d, _)| d).collect();
        pattern
    }

    pub fn meeting_count(&self) -> usize {
        self.morning_meeting_count + self.afternoon_meeting_count
    }
}

/// Which half of the day a group of participants historically favors, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoricalLean {
    Mornings,
    Afternoons,
}

/// Combine several participants' patterns into a single lean. A tie, or no
/// history at all, gives no lean.
pub fn historical_lean<'a>(patterns: impl IntoIterator<Item = &'a CalendarPattern>) -> Option<HistoricalLean> {
    let (mornings, afternoons) = patterns.into_iter().fold((0, 0), |(m, a), p| {
        (m + p.morning_meeting_count, a + p.afternoon_meeting_count)
    });
    match mornings.cmp(&afternoons) {
        std::cmp::Ordering::Greater => Some(HistoricalLean::Mornings),
        std::cmp::Ordering::Less => Some(HistoricalLean::Afternoons),
        std::cmp::Ordering::Equal => None,
    }
}
