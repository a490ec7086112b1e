//! Reduce a scored candidate pool to a short, temporally diverse list.
//!
//! Selection is a fold over the candidates sorted by descending score. The
//! accumulator carries what has been picked so far, so each diversity rule is
//! a predicate over (accumulator, candidate) and can be tested on its own.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Duration, NaiveDate, Timelike};
use chrono_tz::Tz;

use crate::generator::local_datetime;
use crate::model::ScoredSlot;

pub const BEST_MATCH_PREFIX: &str = "⭐ Best Match - ";

/// Scores closer than this are ordered by start time instead.
const NEAR_TIE: f64 = 0.1;

/// Slots on one calendar day, when the pool spans several days.
const MAX_PER_DAY: usize = 3;

/// Limits shared by both selection strategies.
#[derive(Debug, Clone, Copy)]
pub struct SelectionPolicy {
    pub max_suggestions: usize,
    pub min_separation: Duration,
    pub tz: Tz,
}

/// Buckets used by mutual-availability selection, relative to the first candidate's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    /// 06:00–11:59
    Morning,
    /// 12:00–14:59
    Midday,
    /// 15:00–18:59
    Afternoon,
    /// 19:00–21:00
    Evening,
    /// Any later day.
    NextDay,
}

/// Order in which buckets contribute their best candidate.
pub const BUCKET_PRIORITY: [DayPeriod; 5] = [
    DayPeriod::Morning,
    DayPeriod::Afternoon,
    DayPeriod::Midday,
    DayPeriod::Evening,
    DayPeriod::NextDay,
];

impl DayPeriod {
    pub fn of(slot: &ScoredSlot, reference_day: NaiveDate, tz: Tz) -> Option<DayPeriod> {
        let local = local_datetime(slot.start, tz);
        if local.date() > reference_day {
            return Some(DayPeriod::NextDay);
        }
        if local.date() < reference_day {
            return None;
        }
        match (local.hour(), local.minute()) {
            (6..=11, _) => Some(DayPeriod::Morning),
            (12..=14, _) => Some(DayPeriod::Midday),
            (15..=18, _) => Some(DayPeriod::Afternoon),
            (19..=20, _) | (21, 0) => Some(DayPeriod::Evening),
            _ => None,
        }
    }
}

/// Descending score, then descending unclamped score, then earliest start.
fn rank(a: &ScoredSlot, b: &ScoredSlot) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(b.unclamped_score.total_cmp(&a.unclamped_score))
        .then(a.start.cmp(&b.start))
}

pub fn sort_by_score(mut slots: Vec<ScoredSlot>) -> Vec<ScoredSlot> {
    slots.sort_by(rank);
    slots
}

fn far_apart(a: &ScoredSlot, b: &ScoredSlot, separation: Duration) -> bool {
    a.start != b.start && (a.start - b.start).abs() >= separation
}

/// Mutual-availability selection.
///
/// Takes the best candidate of each period bucket in [`BUCKET_PRIORITY`]
/// order, then tops up from the full ranking with candidates at least
/// `min_separation` away from everything already picked.
pub fn select_mutual(slots: Vec<ScoredSlot>, policy: &SelectionPolicy) -> Vec<ScoredSlot> {
    let sorted = sort_by_score(slots);
    let Some(reference_day) = sorted
        .iter()
        .map(|s| local_datetime(s.start, policy.tz).date())
        .min()
    else {
        return Vec::new();
    };

    let bucket_picks: Vec<ScoredSlot> = BUCKET_PRIORITY
        .iter()
        .filter_map(|period| {
            sorted
                .iter()
                .find(|s| DayPeriod::of(s, reference_day, policy.tz) == Some(*period))
                .cloned()
        })
        .take(policy.max_suggestions)
        .collect();

    let selected = sorted.iter().fold(bucket_picks, |mut picked, candidate| {
        if picked.len() < policy.max_suggestions
            && picked
                .iter()
                .all(|s| far_apart(s, candidate, policy.min_separation))
        {
            picked.push(candidate.clone());
        }
        picked
    });

    sort_by_score(selected)
}

/// Accumulator for the context-aware diversity fold.
#[derive(Debug, Default)]
struct Picked {
    slots: Vec<ScoredSlot>,
    windows: HashSet<(NaiveDate, u32)>,
    per_day: HashMap<NaiveDate, usize>,
}

impl Picked {
    fn with(mut self, slot: &ScoredSlot, tz: Tz) -> Self {
        let local = local_datetime(slot.start, tz);
        self.windows.insert(two_hour_window(slot, tz));
        *self.per_day.entry(local.date()).or_default() += 1;
        self.slots.push(slot.clone());
        self
    }

    fn day_count(&self, slot: &ScoredSlot, tz: Tz) -> usize {
        let date = local_datetime(slot.start, tz).date();
        self.per_day.get(&date).copied().unwrap_or(0)
    }
}

/// The local 2-hour block (00–02, 02–04, ...) a slot starts in.
pub fn two_hour_window(slot: &ScoredSlot, tz: Tz) -> (NaiveDate, u32) {
    let local = local_datetime(slot.start, tz);
    (local.date(), local.hour() / 2)
}

fn is_morning(slot: &ScoredSlot, tz: Tz) -> bool {
    local_datetime(slot.start, tz).hour() < 12
}

/// Context-aware selection.
///
/// Walks the ranking and keeps a candidate when its 2-hour window is not yet
/// taken and its day holds fewer than three picks. Both rules are waived when
/// the pool covers a single day. If four or more picks all fall in the
/// morning, or all in the afternoon, a rebalancing pass mixes periods. The
/// top scorer is flagged as the best match and the result is ordered by
/// score with near-ties broken by start time.
pub fn select_context_aware(slots: Vec<ScoredSlot>, policy: &SelectionPolicy) -> Vec<ScoredSlot> {
    let tz = policy.tz;
    let sorted = sort_by_score(slots);
    let distinct_days: BTreeSet<NaiveDate> = sorted
        .iter()
        .map(|s| local_datetime(s.start, tz).date())
        .collect();
    let single_day = distinct_days.len() < 2;

    let picked = sorted.iter().fold(Picked::default(), |picked, candidate| {
        let accept = picked.slots.len() < policy.max_suggestions
            && (single_day || !picked.windows.contains(&two_hour_window(candidate, tz)))
            && (single_day || picked.day_count(candidate, tz) < MAX_PER_DAY);
        if accept {
            picked.with(candidate, tz)
        } else {
            picked
        }
    });

    let one_sided = picked.slots.len() >= 4
        && (picked.slots.iter().all(|s| is_morning(s, tz))
            || picked.slots.iter().all(|s| !is_morning(s, tz)));

    let selected = if one_sided {
        rebalance(&sorted, policy, single_day)
    } else {
        picked.slots
    };

    order_with_near_ties(mark_best_match(selected))
}

/// Re-pick from business-hours candidates (09:00–16:59 starts), seeding with
/// the best morning slot and the best afternoon slot far enough from it, then
/// filling by score while keeping every pick `min_separation` apart.
fn rebalance(sorted: &[ScoredSlot], policy: &SelectionPolicy, single_day: bool) -> Vec<ScoredSlot> {
    let tz = policy.tz;
    let business: Vec<&ScoredSlot> = sorted
        .iter()
        .filter(|s| (9..17).contains(&local_datetime(s.start, tz).hour()))
        .collect();

    let fits = |picked: &Picked, candidate: &ScoredSlot| {
        picked.slots.len() < policy.max_suggestions
            && picked
                .slots
                .iter()
                .all(|s| far_apart(s, candidate, policy.min_separation))
            && (single_day || picked.day_count(candidate, tz) < MAX_PER_DAY)
    };

    let seeded = [true, false].into_iter().fold(Picked::default(), |picked, want_morning| {
        match business
            .iter()
            .find(|s| is_morning(s, tz) == want_morning && fits(&picked, **s))
        {
            Some(seed) => picked.with(*seed, tz),
            None => picked,
        }
    });

    business
        .iter()
        .fold(seeded, |picked, candidate| {
            if fits(&picked, *candidate) {
                picked.with(*candidate, tz)
            } else {
                picked
            }
        })
        .slots
}

/// Flag the highest-ranked slot and prefix its label.
pub fn mark_best_match(mut slots: Vec<ScoredSlot>) -> Vec<ScoredSlot> {
    for slot in &mut slots {
        slot.is_best_match = false;
    }
    let best = slots
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| rank(a, b))
        .map(|(i, _)| i);
    if let Some(slot) = best.and_then(|i| slots.get_mut(i)) {
        slot.is_best_match = true;
        slot.label = format!("{BEST_MATCH_PREFIX}{}", slot.label);
    }
    slots
}

/// Order by descending score, except that among slots within [`NEAR_TIE`] of
/// the best remaining score the earliest one goes first.
pub fn order_with_near_ties(mut remaining: Vec<ScoredSlot>) -> Vec<ScoredSlot> {
    let mut ordered = Vec::with_capacity(remaining.len());
    while let Some(top) = remaining.iter().map(|s| s.score).reduce(f64::max) {
        let next = remaining
            .iter()
            .enumerate()
            .filter(|(_, s)| top - s.score < NEAR_TIE)
            .min_by_key(|(_, s)| s.start)
            .map(|(i, _)| i);
        match next {
            Some(i) => ordered.push(remaining.remove(i)),
            None => break,
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn scored(day: u32, hour: u32, min: u32, score: f64) -> ScoredSlot {
        let start = Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap();
        ScoredSlot {
            start,
            end: start + Duration::minutes(30),
            score,
            unclamped_score: score,
            label: format!("{day}@{hour}:{min:02}"),
            reasoning: String::new(),
            is_best_match: false,
        }
    }

    fn policy() -> SelectionPolicy {
        SelectionPolicy {
            max_suggestions: 5,
            min_separation: Duration::hours(2),
            tz: Tz::UTC,
        }
    }

    #[test]
    fn buckets_are_relative_to_the_first_day() {
        let first = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        assert_eq!(DayPeriod::of(&scored(17, 9, 0, 0.5), first, Tz::UTC), Some(DayPeriod::Morning));
        assert_eq!(DayPeriod::of(&scored(17, 13, 0, 0.5), first, Tz::UTC), Some(DayPeriod::Midday));
        assert_eq!(DayPeriod::of(&scored(17, 16, 0, 0.5), first, Tz::UTC), Some(DayPeriod::Afternoon));
        assert_eq!(DayPeriod::of(&scored(17, 21, 0, 0.5), first, Tz::UTC), Some(DayPeriod::Evening));
        assert_eq!(DayPeriod::of(&scored(17, 21, 30, 0.5), first, Tz::UTC), None);
        assert_eq!(DayPeriod::of(&scored(18, 9, 0, 0.5), first, Tz::UTC), Some(DayPeriod::NextDay));
    }

    #[test]
    fn mutual_takes_one_per_bucket_then_spaced_fill() {
        let slots = vec![
            scored(17, 9, 0, 0.9),
            scored(17, 9, 15, 0.89),
            scored(17, 12, 30, 0.7),
            scored(17, 15, 0, 0.8),
            scored(18, 9, 0, 0.6),
            scored(18, 9, 15, 0.59),
        ];
        let picked = select_mutual(slots, &policy());
        let labels: Vec<&str> = picked.iter().map(|s| s.label.as_str()).collect();
        // bucket picks: morning 9:00, afternoon 15:00, midday 12:30, next-day 18@9:00;
        // 9:15 on either day is too close to an existing pick
        assert_eq!(labels, vec!["17@9:00", "17@15:00", "17@12:30", "18@9:00"]);
    }

    #[test]
    fn context_keeps_one_slot_per_two_hour_window() {
        let slots = vec![
            scored(17, 9, 0, 0.95),
            scored(17, 9, 30, 0.94),
            scored(17, 14, 0, 0.9),
            scored(18, 10, 0, 0.8),
            scored(18, 10, 30, 0.79),
        ];
        let picked = select_context_aware(slots, &policy());
        let mut windows: Vec<(NaiveDate, u32)> = picked.iter().map(|s| two_hour_window(s, Tz::UTC)).collect();
        let before = windows.len();
        windows.sort();
        windows.dedup();
        assert_eq!(windows.len(), before);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn context_caps_three_per_day_when_days_differ() {
        let slots = vec![
            scored(17, 9, 0, 0.99),
            scored(17, 11, 0, 0.98),
            scored(17, 13, 0, 0.97),
            scored(17, 15, 0, 0.96),
            scored(18, 9, 0, 0.5),
        ];
        let picked = select_context_aware(slots, &policy());
        let on_17 = picked.iter().filter(|s| s.label.contains("17@")).count();
        assert_eq!(on_17, 3);
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn single_day_pool_waives_window_rule() {
        let slots = vec![
            scored(17, 9, 0, 0.9),
            scored(17, 9, 30, 0.85),
            scored(17, 14, 0, 0.8),
        ];
        let picked = select_context_aware(slots, &policy());
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn best_match_is_flagged_once() {
        let slots = vec![scored(17, 14, 0, 0.7), scored(18, 9, 0, 0.9)];
        let picked = select_context_aware(slots, &policy());
        let best: Vec<&ScoredSlot> = picked.iter().filter(|s| s.is_best_match).collect();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].label, format!("{BEST_MATCH_PREFIX}18@9:00"));
    }

    #[test]
    fn morning_only_picks_are_rebalanced() {
        // five mornings on five days outrank every afternoon
        let mut slots: Vec<ScoredSlot> = (16..=20).map(|d| scored(d, 9, 0, 0.95)).collect();
        slots.push(scored(16, 14, 0, 0.6));
        let picked = select_context_aware(slots, &policy());
        assert!(picked.iter().any(|s| !is_morning(s, Tz::UTC)));
        assert!(picked.iter().any(|s| is_morning(s, Tz::UTC)));
        assert_eq!(picked.iter().filter(|s| s.is_best_match).count(), 1);
        for (i, a) in picked.iter().enumerate() {
            for b in &picked[i + 1..] {
                assert!((a.start - b.start).abs() >= Duration::hours(2));
            }
        }
    }

    #[test]
    fn near_ties_go_earliest_first() {
        let ordered = order_with_near_ties(vec![
            scored(18, 9, 0, 0.9),
            scored(17, 9, 0, 0.85),
            scored(16, 9, 0, 0.5),
        ]);
        let labels: Vec<&str> = ordered.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["17@9:00", "18@9:00", "16@9:00"]);
    }
}
