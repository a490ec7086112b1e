//! Property-based tests for pipeline invariants using proptest.
//!
//! Whatever the busy calendars look like, every suggestion must keep the
//! requested duration, stay clear of busy time, and carry a score in
//! `[0, 1]`. The list must be short and reproducible, context-aware picks
//! must not share a 2-hour window, and urgent picks must stay close.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use slot_engine::conflict::conflicts_with_buffer;
use slot_engine::model::CandidateSlot;
use slot_engine::selector::two_hour_window;
use slot_engine::{
    BusyInterval, EngineConfig, OrganizerIntent, Participant, RankingStrategy, ResolvedPreferences,
    RoughTimeframe, SchedulingEngine, SchedulingRequest, ScoredSlot, TimeOfDay, TimeUrgency,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Monday 2026-03-16, 08:00 UTC.
fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 8, 0, 0).unwrap()
}

/// A busy interval somewhere in the next ten days, on a five-minute grid.
fn arb_busy() -> impl Strategy<Value = BusyInterval> {
    (0i64..(10 * 24 * 12), 3i64..=48).prop_map(|(start_step, length_steps)| {
        let start = base() + Duration::minutes(start_step * 5);
        BusyInterval::new(start, start + Duration::minutes(length_steps * 5))
    })
}

fn arb_calendar() -> impl Strategy<Value = Vec<BusyInterval>> {
    prop::collection::vec(arb_busy(), 0..25)
}

fn arb_duration() -> impl Strategy<Value = i64> {
    prop_oneof![Just(15i64), Just(30), Just(45), Just(60), Just(90)]
}

fn arb_timezone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::Europe::London),
        Just(chrono_tz::Asia::Tokyo),
    ]
}

fn arb_intent() -> impl Strategy<Value = OrganizerIntent> {
    (
        prop_oneof![Just(TimeUrgency::Urgent), Just(TimeUrgency::Flexible)],
        prop_oneof![
            Just(None),
            Just(Some(RoughTimeframe::ThisWeek)),
            Just(Some(RoughTimeframe::NextWeek)),
        ],
        prop_oneof![
            Just(None),
            Just(Some(TimeOfDay::Morning)),
            Just(Some(TimeOfDay::Afternoon)),
        ],
    )
        .prop_map(|(time_urgency, rough_timeframe, time_of_day)| OrganizerIntent {
            time_urgency,
            rough_timeframe,
            time_of_day,
            ..Default::default()
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    }
}

fn request(
    organizer: Vec<BusyInterval>,
    recipient: Vec<BusyInterval>,
    duration_minutes: i64,
    timezone: Tz,
    strategy: RankingStrategy,
) -> SchedulingRequest {
    SchedulingRequest {
        organizer: Participant::new("org@example.com", organizer),
        recipients: vec![Participant::new("guest@example.com", recipient)],
        duration_minutes,
        timezone,
        horizon_days: None,
        now: base(),
        strategy,
    }
}

fn run(req: &SchedulingRequest) -> Vec<ScoredSlot> {
    SchedulingEngine::new(EngineConfig::default())
        .unwrap()
        .suggest_with_preferences(req, &ResolvedPreferences::new())
        .unwrap()
}

fn as_candidate(slot: &ScoredSlot) -> CandidateSlot {
    CandidateSlot::new(slot.start, slot.end - slot.start)
}

fn check_shape(slots: &[ScoredSlot], duration_minutes: i64) -> Result<(), TestCaseError> {
    prop_assert!(slots.len() <= 5, "too many suggestions: {}", slots.len());
    for slot in slots {
        prop_assert_eq!(slot.duration_minutes(), duration_minutes);
        prop_assert!((0.0..=1.0).contains(&slot.score), "score {} out of range", slot.score);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Property 1: mutual availability respects busy time plus the default buffer
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn mutual_slots_clear_buffered_busy_time(
        organizer in arb_calendar(),
        recipient in arb_calendar(),
        duration in arb_duration(),
        tz in arb_timezone(),
    ) {
        let req = request(organizer.clone(), recipient.clone(), duration, tz, RankingStrategy::MutualAvailability);
        let slots = run(&req);
        check_shape(&slots, duration)?;

        let buffer = Duration::minutes(15);
        for slot in &slots {
            prop_assert!(slot.start >= req.now);
            for interval in organizer.iter().chain(&recipient) {
                prop_assert!(
                    !conflicts_with_buffer(&as_candidate(slot), interval, buffer),
                    "slot {} within 15 minutes of busy {:?}",
                    slot.start,
                    interval
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: context-aware slots never overlap busy time and one is best
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn context_slots_clear_busy_time(
        organizer in arb_calendar(),
        recipient in arb_calendar(),
        duration in arb_duration(),
        tz in arb_timezone(),
        intent in arb_intent(),
    ) {
        let req = request(organizer.clone(), recipient.clone(), duration, tz, RankingStrategy::ContextAware(intent));
        let slots = run(&req);
        check_shape(&slots, duration)?;

        for slot in &slots {
            prop_assert!(slot.start >= req.now);
            for interval in organizer.iter().chain(&recipient) {
                prop_assert!(
                    !(slot.start < interval.end && interval.start < slot.end),
                    "slot {} overlaps busy {:?}",
                    slot.start,
                    interval
                );
            }
        }
        let best = slots.iter().filter(|s| s.is_best_match).count();
        prop_assert_eq!(best, usize::from(!slots.is_empty()));
    }
}

// ---------------------------------------------------------------------------
// Property 3: identical inputs give identical output
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn suggestions_are_deterministic(
        organizer in arb_calendar(),
        recipient in arb_calendar(),
        duration in arb_duration(),
        intent in arb_intent(),
        context_aware in any::<bool>(),
    ) {
        let strategy = if context_aware {
            RankingStrategy::ContextAware(intent)
        } else {
            RankingStrategy::MutualAvailability
        };
        let req = request(organizer, recipient, duration, Tz::UTC, strategy);
        prop_assert_eq!(run(&req), run(&req));
    }
}

// ---------------------------------------------------------------------------
// Property 4: context-aware picks spanning several days use distinct 2-hour windows
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn context_picks_use_distinct_two_hour_windows(
        organizer in arb_calendar(),
        recipient in arb_calendar(),
        duration in arb_duration(),
        tz in arb_timezone(),
        intent in arb_intent(),
    ) {
        let req = request(organizer, recipient, duration, tz, RankingStrategy::ContextAware(intent));
        let slots = run(&req);

        let days: BTreeSet<NaiveDate> = slots
            .iter()
            .map(|s| s.start.with_timezone(&tz).date_naive())
            .collect();
        if days.len() >= 2 {
            let windows: BTreeSet<(NaiveDate, u32)> =
                slots.iter().map(|s| two_hour_window(s, tz)).collect();
            prop_assert_eq!(windows.len(), slots.len(), "shared 2-hour window in {:?}", slots);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: urgent requests stay inside the urgent horizon
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn urgent_slots_start_within_three_days(
        organizer in arb_calendar(),
        recipient in arb_calendar(),
        duration in arb_duration(),
        tz in arb_timezone(),
        intent in arb_intent(),
    ) {
        let intent = OrganizerIntent { time_urgency: TimeUrgency::Urgent, ..intent };
        let req = request(organizer, recipient, duration, tz, RankingStrategy::ContextAware(intent));
        let window = SchedulingEngine::new(EngineConfig::default())
            .unwrap()
            .search_window(&req);
        prop_assert!(window.max_days <= 3);

        for slot in run(&req) {
            let day = slot.start.with_timezone(&tz).date_naive();
            prop_assert!(day >= window.start, "{} before {}", day, window.start);
            prop_assert!((day - window.start).num_days() < 3, "{} too far from {}", day, window.start);
        }
    }
}
