//! The suggestion pipeline.
//!
//! Resolve preferences → plan the search window → generate candidates →
//! filter conflicts → score → select. Both ranking strategies share the
//! generator and conflict primitives; they differ in how candidates are
//! generated, how busy time is checked, and how slots are scored and picked.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::conflict::{filter_conflicts, ParticipantBusy};
use crate::error::{Result, SlotError};
use crate::generator::{
    context_bands, generate_context_aware, generate_plain, local_datetime, shared_working_hours,
    GenerationContext,
};
use crate::model::{BusyInterval, CandidateSlot, DaySet, OrganizerIntent, ScoredSlot, UserSchedulingPreference};
use crate::pattern::{historical_lean, CalendarPattern};
use crate::preference::{PreferenceResolver, PreferenceStore, ResolvedPreferences};
use crate::scorer::{score_context_aware, score_plain, ContextSignals, ScoringContext};
use crate::selector::{select_context_aware, select_mutual, SelectionPolicy};
use crate::window::{plan_fixed_window, plan_search_window, SearchWindow, MAX_HORIZON_DAYS};

/// Longest meeting the engine will schedule.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// How candidates are generated, scored, and selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingStrategy {
    /// Mutual availability under every participant's stored preferences.
    MutualAvailability,
    /// Driven by the organizer's stated intent and participants' habits.
    ContextAware(OrganizerIntent),
}

impl RankingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RankingStrategy::MutualAvailability => "mutual_availability",
            RankingStrategy::ContextAware(_) => "context_aware",
        }
    }
}

/// One person whose calendar constrains the meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Opaque identifier, usually an email address.
    pub id: String,
    pub busy: Vec<BusyInterval>,
}

impl Participant {
    pub fn new(id: impl Into<String>, busy: Vec<BusyInterval>) -> Self {
        Self { id: id.into(), busy }
    }
}

/// Everything a single scheduling call needs.
#[derive(Debug, Clone)]
pub struct SchedulingRequest {
    pub organizer: Participant,
    pub recipients: Vec<Participant>,
    pub duration_minutes: i64,
    pub timezone: Tz,
    /// Days to search in mutual-availability mode; the config default when `None`.
    pub horizon_days: Option<u32>,
    /// The instant the request is evaluated at. Identical inputs including
    /// `now` always produce identical output.
    pub now: DateTime<Utc>,
    pub strategy: RankingStrategy,
}

impl SchedulingRequest {
    /// # Errors
    /// Returns `SlotError::InvalidDuration` unless the duration is between one
    /// minute and a full day, and `SlotError::InvalidHorizon` unless the
    /// horizon is between one and [`MAX_HORIZON_DAYS`] days.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(SlotError::InvalidDuration(self.duration_minutes));
        }
        match self.horizon_days {
            Some(days) if !(1..=MAX_HORIZON_DAYS).contains(&days) => {
                Err(SlotError::InvalidHorizon(days))
            }
            _ => Ok(()),
        }
    }

    /// Zero for a duration too large to represent; `validate` rejects those.
    pub fn duration(&self) -> Duration {
        Duration::try_minutes(self.duration_minutes).unwrap_or_else(Duration::zero)
    }

    /// Organizer first, then recipients; identifiers that differ only in case
    /// are merged and their busy intervals combined.
    pub fn participants(&self) -> Vec<Participant> {
        let mut merged: Vec<Participant> = Vec::new();
        for person in std::iter::once(&self.organizer).chain(&self.recipients) {
            match merged.iter_mut().find(|p| p.id.eq_ignore_ascii_case(&person.id)) {
                Some(existing) => existing.busy.extend(person.busy.iter().cloned()),
                None => merged.push(person.clone()),
            }
        }
        merged
    }

    pub fn participant_ids(&self) -> Vec<String> {
        self.participants().into_iter().map(|p| p.id).collect()
    }
}

/// Parse an IANA timezone name.
///
/// # Errors
/// Returns `SlotError::InvalidTimezone` for an unknown name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Stateless apart from its configuration; safe to share across requests.
#[derive(Debug, Clone)]
pub struct SchedulingEngine {
    config: EngineConfig,
    resolver: PreferenceResolver,
}

impl SchedulingEngine {
    /// # Errors
    /// Returns `SlotError::InvalidConfig` if the configuration is inconsistent.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let resolver = PreferenceResolver::new(config.default_preference.clone());
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PreferenceResolver {
        &self.resolver
    }

    /// The calendar days the request will search.
    pub fn search_window(&self, request: &SchedulingRequest) -> SearchWindow {
        let today = local_datetime(request.now, request.timezone).date();
        match &request.strategy {
            RankingStrategy::MutualAvailability => plan_fixed_window(
                today,
                request.horizon_days.unwrap_or(self.config.default_horizon_days),
            ),
            RankingStrategy::ContextAware(intent) => plan_search_window(intent, today, &self.config),
        }
    }

    /// Resolve every participant's preferences from `store`, then rank.
    ///
    /// An empty list means no slot fits; it is not an error.
    ///
    /// # Errors
    /// Returns an error only for invalid input (see [`SchedulingRequest::validate`]).
    pub async fn suggest(
        &self,
        store: &dyn PreferenceStore,
        request: &SchedulingRequest,
    ) -> Result<Vec<ScoredSlot>> {
        request.validate()?;
        let preferences = self
            .resolver
            .resolve(store, &request.participant_ids())
            .await;
        self.suggest_with_preferences(request, &preferences)
    }

    /// Rank with already-resolved preferences. Participants missing from
    /// `preferences` get the configured default.
    ///
    /// # Errors
    /// Returns an error only for invalid input (see [`SchedulingRequest::validate`]).
    pub fn suggest_with_preferences(
        &self,
        request: &SchedulingRequest,
        preferences: &ResolvedPreferences,
    ) -> Result<Vec<ScoredSlot>> {
        request.validate()?;

        let participants = self.participants_with_preferences(request, preferences);
        let prefs: Vec<&UserSchedulingPreference> = participants.iter().map(|(_, p)| *p).collect();
        let window = self.search_window(request);

        let generation = GenerationContext {
            window: &window,
            duration: request.duration(),
            tz: request.timezone,
            now: request.now,
            grid_minutes: match request.strategy {
                RankingStrategy::MutualAvailability => self.config.plain_grid_minutes,
                RankingStrategy::ContextAware(_) => self.config.context_grid_minutes,
            },
        };

        let candidates = match &request.strategy {
            RankingStrategy::MutualAvailability => generate_plain(&generation, prefs.iter().copied()),
            RankingStrategy::ContextAware(intent) => {
                generate_context_aware(&generation, intent, prefs.iter().copied())
            }
        };
        let generated = candidates.len();

        let free = self.without_conflicts(candidates, request, &participants);
        let conflict_free = free.len();

        let scored = self.score(free, request, &participants);

        let policy = SelectionPolicy {
            max_suggestions: self.config.max_suggestions,
            min_separation: Duration::minutes(i64::from(self.config.min_separation_minutes)),
            tz: request.timezone,
        };
        let selected = match request.strategy {
            RankingStrategy::MutualAvailability => select_mutual(scored, &policy),
            RankingStrategy::ContextAware(_) => select_context_aware(scored, &policy),
        };

        debug!(
            window_start = %window.start,
            window_end = %window.end,
            generated,
            conflict_free,
            selected = selected.len(),
            "pipeline stages complete"
        );
        if selected.is_empty() {
            info!(strategy = request.strategy.name(), "no mutually available slot found");
        } else {
            info!(
                strategy = request.strategy.name(),
                participants = participants.len(),
                suggestions = selected.len(),
                "suggestions computed"
            );
        }

        Ok(selected)
    }

    fn participants_with_preferences<'a>(
        &'a self,
        request: &SchedulingRequest,
        preferences: &'a ResolvedPreferences,
    ) -> Vec<(Participant, &'a UserSchedulingPreference)> {
        request
            .participants()
            .into_iter()
            .map(|participant| {
                let preference = preferences
                    .get(&participant.id)
                    .unwrap_or(self.resolver.default_preference());
                (participant, preference)
            })
            .collect()
    }

    fn without_conflicts(
        &self,
        candidates: Vec<CandidateSlot>,
        request: &SchedulingRequest,
        participants: &[(Participant, &UserSchedulingPreference)],
    ) -> Vec<CandidateSlot> {
        let busy: Vec<ParticipantBusy<'_>> = participants
            .iter()
            .map(|(participant, preference)| match request.strategy {
                RankingStrategy::MutualAvailability => {
                    ParticipantBusy::buffered(&participant.busy, preference.effective_buffer())
                }
                RankingStrategy::ContextAware(_) => ParticipantBusy::strict(&participant.busy),
            })
            .collect();
        filter_conflicts(candidates, &busy)
    }

    fn score(
        &self,
        free: Vec<CandidateSlot>,
        request: &SchedulingRequest,
        participants: &[(Participant, &UserSchedulingPreference)],
    ) -> Vec<ScoredSlot> {
        let prefs: Vec<&UserSchedulingPreference> = participants.iter().map(|(_, p)| *p).collect();
        let preferred_days = prefs
            .iter()
            .fold(DaySet::ALL, |days, p| days.intersection(p.available_days()));
        let lunch_breaks = prefs
            .iter()
            .map(|p| (p.lunch_break_start, p.lunch_break_end))
            .collect();

        let working_hours = match request.strategy {
            RankingStrategy::MutualAvailability => shared_working_hours(&prefs),
            RankingStrategy::ContextAware(_) => context_hours(),
        };

        let ctx = ScoringContext {
            weights: &self.config.weights,
            tz: request.timezone,
            now: request.now,
            working_hours,
            preferred_days,
            lunch_breaks,
        };

        match &request.strategy {
            RankingStrategy::MutualAvailability => {
                free.into_iter().map(|slot| score_plain(slot, &ctx)).collect()
            }
            RankingStrategy::ContextAware(intent) => {
                let patterns: Vec<CalendarPattern> = participants
                    .iter()
                    .map(|(participant, _)| CalendarPattern::from_busy(&participant.busy, request.timezone))
                    .collect();
                let signals = ContextSignals {
                    intent,
                    lean: historical_lean(&patterns),
                };
                free.into_iter()
                    .map(|slot| score_context_aware(slot, &ctx, &signals))
                    .collect()
            }
        }
    }
}

/// Earliest band start to latest band end.
fn context_hours() -> (NaiveTime, NaiveTime) {
    let bands = context_bands();
    let start = bands.iter().map(|(from, _)| *from).min().unwrap_or(NaiveTime::MIN);
    let end = bands.iter().map(|(_, until)| *until).max().unwrap_or(NaiveTime::MIN);
    (start, end)
}
