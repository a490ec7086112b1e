//! Search window planning -- which calendar days the generator walks.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::{OrganizerIntent, RoughTimeframe};

/// Longest search horizon the planners will lay out.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// An inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub max_days: u32,
}

impl SearchWindow {
    fn spanning(start: NaiveDate, max_days: u32) -> Self {
        let max_days = max_days.clamp(1, MAX_HORIZON_DAYS);
        Self {
            start,
            end: start + Duration::days(i64::from(max_days) - 1),
            max_days,
        }
    }

    /// Every date in the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..i64::from(self.max_days)).map(move |offset| start + Duration::days(offset))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Window for the plain strategy: `days` days starting today.
pub fn plan_fixed_window(today: NaiveDate, days: u32) -> SearchWindow {
    SearchWindow::spanning(today, days)
}

/// Window for the context-aware strategy, derived from the organizer's intent.
///
/// - urgent requests look at most `urgent_horizon_days` ahead, others `default_horizon_days`
/// - `this_week` starts today and stops at Sunday
/// - `next_week` covers next Monday through Friday, capped by the horizon
/// - anything else starts tomorrow
pub fn plan_search_window(
    intent: &OrganizerIntent,
    today: NaiveDate,
    config: &EngineConfig,
) -> SearchWindow {
    let horizon = if intent.is_urgent() {
        config.urgent_horizon_days
    } else {
        config.default_horizon_days
    };

    let days_from_monday = today.weekday().num_days_from_monday();
    match intent.rough_timeframe {
        Some(RoughTimeframe::ThisWeek) => {
            let remaining_in_week = 7 - days_from_monday;
            SearchWindow::spanning(today, horizon.min(remaining_in_week))
        }
        Some(RoughTimeframe::NextWeek) => {
            let next_monday = today + Duration::days(i64::from(7 - days_from_monday));
            SearchWindow::spanning(next_monday, horizon.min(5))
        }
        Some(RoughTimeframe::NoPreference) | None => {
            SearchWindow::spanning(today + Duration::days(1), horizon)
        }
    }
}
