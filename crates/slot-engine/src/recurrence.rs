//! Recurring busy blocks -- expands an RFC 5545 RRULE into concrete busy intervals.
//!
//! Calendar collaborators sometimes hand over a standing commitment (a daily
//! stand-up, a weekly 1:1) as a rule instead of a list of occurrences. The
//! rule is expanded with the `rrule` crate in the block's own timezone, so
//! occurrences keep their wall-clock time across DST transitions.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::model::BusyInterval;

/// Upper bound on occurrences when the rule carries no COUNT.
const DEFAULT_EXPANSION_LIMIT: u16 = 500;

/// A busy block that repeats according to an RRULE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringBusy {
    /// RRULE body, e.g. `FREQ=WEEKLY;BYDAY=TU,TH`.
    pub rrule: String,
    /// Local start of the first occurrence.
    pub dtstart: NaiveDateTime,
    pub duration_minutes: u32,
    /// Local end boundary for expansion.
    #[serde(default)]
    pub until: Option<NaiveDateTime>,
    /// Maximum number of occurrences, applied when the rule has no COUNT.
    #[serde(default)]
    pub count: Option<u32>,
}

impl RecurringBusy {
    /// Expand into concrete busy intervals, in chronological order.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidRule` if the rule is empty or unparseable.
    pub fn expand(&self, tz: Tz) -> Result<Vec<BusyInterval>> {
        if self.rrule.trim().is_empty() {
            return Err(SlotError::InvalidRule("empty RRULE string".to_string()));
        }
        if self.count == Some(0) {
            return Ok(Vec::new());
        }

        let upper = self.rrule.to_uppercase();
        let mut rule = self.rrule.clone();
        if let Some(count) = self.count {
            if !upper.contains("COUNT=") {
                rule.push_str(&format!(";COUNT={count}"));
            }
        }
        if let Some(until) = self.until {
            if !upper.contains("UNTIL=") {
                // the rrule crate wants UNTIL in the same zone as DTSTART; UTC needs the Z suffix
                let suffix = if tz == Tz::UTC { "Z" } else { "" };
                rule.push_str(&format!(";UNTIL={}{suffix}", ical_stamp(until)));
            }
        }

        let text = format!(
            "DTSTART;TZID={}:{}\nRRULE:{}",
            tz.name(),
            ical_stamp(self.dtstart),
            rule
        );
        let set: RRuleSet = text
            .parse()
            .map_err(|e| SlotError::InvalidRule(format!("{e}")))?;

        let limit = self
            .count
            .map(|c| u16::try_from(c).unwrap_or(u16::MAX))
            .unwrap_or(DEFAULT_EXPANSION_LIMIT);
        let duration = Duration::minutes(i64::from(self.duration_minutes));

        let mut intervals: Vec<BusyInterval> = set
            .all(limit)
            .dates
            .into_iter()
            .map(|dt| {
                let start: DateTime<Utc> = dt.with_timezone(&Utc);
                BusyInterval::new(start, start + duration)
            })
            .collect();

        if let Some(count) = self.count {
            intervals.truncate(count as usize);
        }
        Ok(intervals)
    }
}

fn ical_stamp(local: NaiveDateTime) -> String {
    local.format("%Y%m%dT%H%M%S").to_string()
}
