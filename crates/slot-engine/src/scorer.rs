//! Heuristic slot scoring.
//!
//! Every slot starts at `weights.base` and collects additive adjustments. The
//! adjustments are independent of each other and of the order they are
//! applied in. Gains are capped at 1.0, penalties are subtracted from that,
//! and the result is clamped to `[0, 1]`. In context-aware mode each
//! adjustment that fires also appends a short clause to the slot's reasoning.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::ScoringWeights;
use crate::generator::{day_name, local_datetime};
use crate::model::{local_time, CandidateSlot, DaySet, OrganizerIntent, ScoredSlot, TimeOfDay};
use crate::pattern::HistoricalLean;

/// Preference-derived inputs shared by both scoring modes.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub weights: &'a ScoringWeights,
    pub tz: Tz,
    pub now: DateTime<Utc>,
    /// The time-of-day range that counts as "working hours".
    pub working_hours: (NaiveTime, NaiveTime),
    /// Weekdays every participant accepts.
    pub preferred_days: DaySet,
    /// Every participant's lunch break.
    pub lunch_breaks: Vec<(NaiveTime, NaiveTime)>,
}

/// Organizer- and history-derived inputs used only in context-aware mode.
#[derive(Debug, Clone, Copy)]
pub struct ContextSignals<'a> {
    pub intent: &'a OrganizerIntent,
    pub lean: Option<HistoricalLean>,
}

struct Tally {
    gains: f64,
    penalties: f64,
    clauses: Vec<&'static str>,
}

impl Tally {
    fn new(base: f64) -> Self {
        Self {
            gains: base,
            penalties: 0.0,
            clauses: Vec::new(),
        }
    }

    fn add(&mut self, weight: f64, clause: &'static str) {
        if weight < 0.0 {
            self.penalties += weight;
        } else {
            self.gains += weight;
        }
        self.clauses.push(clause);
    }

    fn add_if(&mut self, condition: bool, weight: f64, clause: &'static str) {
        if condition {
            self.add(weight, clause);
        }
    }

    /// Gains saturate at 1.0 before penalties are taken off, so a penalty
    /// always lowers the reported score.
    fn clamped(&self) -> f64 {
        round3((self.gains.min(1.0) + self.penalties).clamp(0.0, 1.0))
    }

    fn unclamped(&self) -> f64 {
        round3(self.gains + self.penalties)
    }
}

fn round3(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

struct LocalSlot {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl LocalSlot {
    fn of(slot: &CandidateSlot, tz: Tz) -> Self {
        Self {
            start: local_datetime(slot.start, tz),
            end: local_datetime(slot.end, tz),
        }
    }

    fn hour(&self) -> u32 {
        self.start.hour()
    }

    fn weekday(&self) -> Weekday {
        self.start.weekday()
    }

    fn within(&self, from: NaiveTime, until: NaiveTime) -> bool {
        self.start.date() == self.end.date() && self.start.time() >= from && self.end.time() <= until
    }

    fn intersects(&self, from: NaiveTime, until: NaiveTime) -> bool {
        let end = if self.end.date() == self.start.date() {
            self.end.time()
        } else {
            local_time(23, 59)
        };
        self.start.time() < until && from < end
    }
}

fn apply_common(tally: &mut Tally, local: &LocalSlot, ctx: &ScoringContext<'_>) {
    let w = ctx.weights;
    let (from, until) = ctx.working_hours;

    if local.within(from, until) {
        tally.add(w.in_working_hours, "within working hours");
    } else {
        tally.add(w.outside_working_hours, "outside working hours");
    }

    if ctx.preferred_days.contains(local.weekday()) {
        tally.add(w.preferred_day, "on a day everyone works");
    } else {
        tally.add(w.non_preferred_day, "outside someone's preferred days");
    }

    let hits_lunch = ctx
        .lunch_breaks
        .iter()
        .any(|&(from, until)| local.intersects(from, until));
    tally.add_if(hits_lunch, w.lunch_overlap, "overlaps a lunch break");

    let hour = local.hour();
    tally.add_if(hour == 10 || hour == 14, w.sweet_spot, "in a sweet-spot hour");

    let minute = local.start.minute();
    tally.add_if(minute == 0 || minute == 30, w.round_time, "starts on a round time");
}

/// Score a slot from the mutual-availability strategy.
pub fn score_plain(slot: CandidateSlot, ctx: &ScoringContext<'_>) -> ScoredSlot {
    let local = LocalSlot::of(&slot, ctx.tz);
    let mut tally = Tally::new(ctx.weights.base);
    apply_common(&mut tally, &local, ctx);

    ScoredSlot {
        start: slot.start,
        end: slot.end,
        score: tally.clamped(),
        unclamped_score: tally.unclamped(),
        label: format!("{} {}", day_name(local.weekday()), local.start.format("%H:%M")),
        reasoning: "Free for all participants".to_string(),
        is_best_match: false,
    }
}

/// Score a slot from the context-aware strategy.
pub fn score_context_aware(
    slot: CandidateSlot,
    ctx: &ScoringContext<'_>,
    signals: &ContextSignals<'_>,
) -> ScoredSlot {
    let local = LocalSlot::of(&slot, ctx.tz);
    let w = ctx.weights;
    let hour = local.hour();
    let morning = hour < 12;

    let mut tally = Tally::new(w.base);
    apply_common(&mut tally, &local, ctx);

    let time_of_day_match = match signals.intent.time_of_day {
        Some(TimeOfDay::Morning) => morning,
        Some(TimeOfDay::Afternoon) => !morning,
        Some(TimeOfDay::NoPreference) | None => false,
    };
    tally.add_if(time_of_day_match, w.time_of_day_match, "matches the requested time of day");

    tally.add_if(
        signals.intent.preferred_days.contains(local.weekday()),
        w.organizer_day_match,
        "on the organizer's preferred day",
    );

    let soon = slot.start - ctx.now <= Duration::days(1);
    tally.add_if(signals.intent.is_urgent() && soon, w.urgency_match, "available soon");

    let habitual = match signals.lean {
        Some(HistoricalLean::Mornings) => morning,
        Some(HistoricalLean::Afternoons) => !morning,
        None => false,
    };
    tally.add_if(habitual, w.historical_pattern, "fits usual meeting habits");

    tally.add_if(
        (9..11).contains(&hour) || (14..16).contains(&hour),
        w.optimal_hours,
        "during peak focus hours",
    );
    tally.add_if(hour >= 17, w.late_day, "late in the day");
    tally.add_if(
        matches!(local.weekday(), Weekday::Tue | Weekday::Wed | Weekday::Thu),
        w.collaboration_day,
        "mid-week collaboration day",
    );

    let reasoning = if slot.reasoning.is_empty() {
        tally.clauses.join(", ")
    } else {
        format!("{}; {}", slot.reasoning, tally.clauses.join(", "))
    };

    ScoredSlot {
        start: slot.start,
        end: slot.end,
        score: tally.clamped(),
        unclamped_score: tally.unclamped(),
        label: slot.label,
        reasoning,
        is_best_match: false,
    }
}
