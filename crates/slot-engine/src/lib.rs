//! # slot-engine
//!
//! Meeting-time suggestion engine for calendar scheduling.
//!
//! Given the busy intervals of two or more participants, a meeting duration,
//! and scheduling preferences, the engine computes a small, diverse, ranked set
//! of candidate slots that avoid every conflict. It performs no I/O of its own
//! apart from the preference lookups behind [`PreferenceStore`]; fetching
//! calendars and persisting results belong to the caller.
//!
//! ## Modules
//!
//! - [`model`]: Busy intervals, preferences, organizer intent, slots
//! - [`config`]: Injected default preference and tunable scoring weights
//! - [`preference`]: Concurrent preference lookup with default substitution
//! - [`window`]: Which calendar days to search
//! - [`generator`]: Grid-aligned candidate slots, timezone-correct
//! - [`conflict`]: Drop slots that overlap busy time (optionally with a buffer)
//! - [`pattern`]: Historical meeting habits from busy intervals
//! - [`scorer`]: Heuristic `[0, 1]` score plus reasoning per slot
//! - [`selector`]: Diversity-aware reduction to the final list
//! - [`recurrence`]: RRULE expansion of recurring busy blocks
//! - [`engine`]: The pipeline and the [`RankingStrategy`] switch
//! - [`error`]: Error types

pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod generator;
pub mod model;
pub mod pattern;
pub mod preference;
pub mod recurrence;
pub mod scorer;
pub mod selector;
pub mod window;

pub use config::{EngineConfig, ScoringWeights};
pub use engine::{parse_timezone, Participant, RankingStrategy, SchedulingEngine, SchedulingRequest};
pub use error::SlotError;
pub use model::{
    BusyInterval, CandidateSlot, DaySet, OrganizerIntent, RoughTimeframe, ScoredSlot, TimeOfDay,
    TimeUrgency, UserSchedulingPreference,
};
pub use pattern::CalendarPattern;
pub use preference::{InMemoryPreferenceStore, PreferenceResolver, PreferenceStore, ResolvedPreferences};
pub use recurrence::RecurringBusy;
pub use window::SearchWindow;
