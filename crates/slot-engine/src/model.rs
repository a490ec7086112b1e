//! Value types shared by every stage of the suggestion pipeline.
//!
//! Everything here is created fresh per scheduling request and is immutable
//! once built. Instants are UTC; local wall-clock values (`NaiveTime`) are
//! interpreted in the request timezone.

use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Build a wall-clock time, falling back to midnight for out-of-range input.
pub(crate) fn local_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// A window during which one participant is known to be unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A set of weekdays, serialized as sorted ISO numbers (1 = Monday .. 7 = Sunday).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);
    /// Monday through Friday.
    pub const WEEKDAYS: DaySet = DaySet(0b001_1111);
    pub const ALL: DaySet = DaySet(0b111_1111);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn intersection(self, other: DaySet) -> DaySet {
        DaySet(self.0 & other.0)
    }

    pub fn union(self, other: DaySet) -> DaySet {
        DaySet(self.0 | other.0)
    }

    pub fn difference(self, other: DaySet) -> DaySet {
        DaySet(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in the set, Monday first.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        ALL_DAYS.into_iter().filter(move |d| self.contains(*d))
    }
}

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for DaySet {
    type Error = String;

    fn try_from(numbers: Vec<u8>) -> std::result::Result<Self, Self::Error> {
        numbers
            .into_iter()
            .map(|n| match n {
                1..=7 => Ok(ALL_DAYS[usize::from(n - 1)]),
                other => Err(format!("weekday must be 1 (Mon) through 7 (Sun), got {other}")),
            })
            .collect()
    }
}

impl From<DaySet> for Vec<u8> {
    fn from(set: DaySet) -> Self {
        // number_from_monday is 1..=7
        set.iter().map(|d| d.number_from_monday() as u8).collect()
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// One participant's stored scheduling preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSchedulingPreference {
    pub earliest_start_time: NaiveTime,
    pub latest_end_time: NaiveTime,
    pub preferred_days: DaySet,
    pub avoid_days: DaySet,
    pub buffer_minutes: u32,
    pub allow_back_to_back: bool,
    pub lunch_break_start: NaiveTime,
    pub lunch_break_end: NaiveTime,
    pub allow_same_day_scheduling: bool,
    pub minimum_notice_hours: u32,
}

impl UserSchedulingPreference {
    /// 09:00–17:00 Monday to Friday, 15-minute buffer, no back-to-back meetings,
    /// lunch 12:00–13:00 blocked, no same-day scheduling, 24 hours notice.
    pub fn standard() -> Self {
        Self {
            earliest_start_time: local_time(9, 0),
            latest_end_time: local_time(17, 0),
            preferred_days: DaySet::WEEKDAYS,
            avoid_days: DaySet::EMPTY,
            buffer_minutes: 15,
            allow_back_to_back: false,
            lunch_break_start: local_time(12, 0),
            lunch_break_end: local_time(13, 0),
            allow_same_day_scheduling: false,
            minimum_notice_hours: 24,
        }
    }

    /// Days this participant will meet on: preferred minus avoided.
    pub fn available_days(&self) -> DaySet {
        self.preferred_days.difference(self.avoid_days)
    }

    /// Gap required around this participant's busy intervals.
    pub fn effective_buffer(&self) -> Duration {
        if self.allow_back_to_back {
            Duration::zero()
        } else {
            Duration::minutes(i64::from(self.buffer_minutes))
        }
    }
}

impl Default for UserSchedulingPreference {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUrgency {
    Urgent,
    #[default]
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoughTimeframe {
    ThisWeek,
    NextWeek,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    NoPreference,
}

/// What the person initiating the request asked for. Supplied once per request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerIntent {
    pub time_urgency: TimeUrgency,
    pub rough_timeframe: Option<RoughTimeframe>,
    pub time_of_day: Option<TimeOfDay>,
    pub preferred_days: DaySet,
    pub avoid_days: DaySet,
}

impl OrganizerIntent {
    pub fn is_urgent(&self) -> bool {
        self.time_urgency == TimeUrgency::Urgent
    }
}

/// A grid-aligned slot that has not been scored yet.
///
/// The context-aware generator fills in `label` and `reasoning`; the plain
/// generator leaves them empty for the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
    pub reasoning: String,
}

impl CandidateSlot {
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
            label: String::new(),
            reasoning: String::new(),
        }
    }

    pub fn with_description(mut self, label: impl Into<String>, reasoning: impl Into<String>) -> Self {
        self.label = label.into();
        self.reasoning = reasoning.into();
        self
    }
}

/// A ranked suggestion as handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Always within `[0, 1]`.
    pub score: f64,
    /// Sum of adjustments before clamping. Ranks slots whose clamped scores
    /// tie; set only by the scorer and never read from or written to JSON.
    #[serde(skip)]
    pub(crate) unclamped_score: f64,
    pub label: String,
    pub reasoning: String,
    pub is_best_match: bool,
}

impl ScoredSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_set_serializes_as_iso_numbers() {
        let set: DaySet = [Weekday::Sun, Weekday::Mon, Weekday::Wed].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,3,7]");
        let back: DaySet = serde_json::from_str("[7,3,1]").unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn day_set_rejects_out_of_range_numbers() {
        assert!(serde_json::from_str::<DaySet>("[0]").is_err());
        assert!(serde_json::from_str::<DaySet>("[8]").is_err());
    }

    #[test]
    fn weekdays_constant_is_monday_to_friday() {
        let days: Vec<Weekday> = DaySet::WEEKDAYS.iter().collect();
        assert_eq!(
            days,
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        );
        assert!(!DaySet::WEEKDAYS.contains(Weekday::Sat));
    }

    #[test]
    fn partial_preference_record_fills_defaults() {
        let pref: UserSchedulingPreference =
            serde_json::from_str(r#"{"earliest_start_time":"10:00","buffer_minutes":5}"#).unwrap();
        assert_eq!(pref.earliest_start_time, local_time(10, 0));
        assert_eq!(pref.buffer_minutes, 5);
        assert_eq!(pref.latest_end_time, local_time(17, 0));
        assert_eq!(pref.preferred_days, DaySet::WEEKDAYS);
    }

    #[test]
    fn back_to_back_disables_buffer() {
        let mut pref = UserSchedulingPreference::standard();
        assert_eq!(pref.effective_buffer(), Duration::minutes(15));
        pref.allow_back_to_back = true;
        assert_eq!(pref.effective_buffer(), Duration::zero());
    }

    #[test]
    fn scored_slot_json_carries_only_public_ranking() {
        let slot: ScoredSlot = serde_json::from_str(
            r#"{"start":"2026-03-17T10:00:00Z","end":"2026-03-17T10:30:00Z","score":0.8,
                "unclamped_score":5.0,"label":"Tuesday 10:00","reasoning":"","is_best_match":false}"#,
        )
        .unwrap();
        assert_eq!(slot.unclamped_score, 0.0);
        let json = serde_json::to_value(&slot).unwrap();
        assert!(json.get("unclamped_score").is_none());
        assert_eq!(slot.duration_minutes(), 30);
    }

    #[test]
    fn intent_enums_use_snake_case() {
        let intent: OrganizerIntent = serde_json::from_str(
            r#"{"time_urgency":"urgent","rough_timeframe":"next_week","time_of_day":"no_preference"}"#,
        )
        .unwrap();
        assert!(intent.is_urgent());
        assert_eq!(intent.rough_timeframe, Some(RoughTimeframe::NextWeek));
        assert_eq!(intent.time_of_day, Some(TimeOfDay::NoPreference));
    }
}
