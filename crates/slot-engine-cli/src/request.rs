//! JSON input formats accepted by the `slots` binary.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use slot_engine::{
    parse_timezone, BusyInterval, InMemoryPreferenceStore, OrganizerIntent, Participant,
    RankingStrategy, RecurringBusy, SchedulingRequest, UserSchedulingPreference,
};

/// A scheduling request as written by callers.
///
/// `intent` switches the engine to context-aware ranking; without it the
/// mutual-availability strategy runs. `now` defaults to the current time.
#[derive(Debug, Deserialize)]
pub struct RequestFile {
    pub organizer: ParticipantFile,
    #[serde(default)]
    pub recipients: Vec<ParticipantFile>,
    pub duration_minutes: i64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub horizon_days: Option<u32>,
    #[serde(default)]
    pub intent: Option<OrganizerIntent>,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantFile {
    pub id: String,
    #[serde(default)]
    pub busy: Vec<BusyEntry>,
}

/// Either a concrete interval or a recurring block expanded in the request timezone.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BusyEntry {
    Interval(BusyInterval),
    Recurring(RecurringBusy),
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl ParticipantFile {
    fn into_participant(self, tz: Tz) -> Result<Participant> {
        let mut busy = Vec::with_capacity(self.busy.len());
        for entry in self.busy {
            match entry {
                BusyEntry::Interval(interval) => busy.push(interval),
                BusyEntry::Recurring(rule) => busy.extend(
                    rule.expand(tz)
                        .with_context(|| format!("Failed to expand busy rule for {}", self.id))?,
                ),
            }
        }
        Ok(Participant::new(self.id, busy))
    }
}

impl RequestFile {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scheduling request")
    }

    pub fn into_request(self) -> Result<SchedulingRequest> {
        let timezone = parse_timezone(&self.timezone)?;
        let strategy = match self.intent {
            Some(intent) => RankingStrategy::ContextAware(intent),
            None => RankingStrategy::MutualAvailability,
        };
        let recipients = self
            .recipients
            .into_iter()
            .map(|p| p.into_participant(timezone))
            .collect::<Result<Vec<_>>>()?;

        Ok(SchedulingRequest {
            organizer: self.organizer.into_participant(timezone)?,
            recipients,
            duration_minutes: self.duration_minutes,
            timezone,
            horizon_days: self.horizon_days,
            now: self.now.unwrap_or_else(Utc::now),
            strategy,
        })
    }
}

/// Stored preferences keyed by participant identifier.
pub fn parse_preferences(json: &str) -> Result<InMemoryPreferenceStore> {
    let records: BTreeMap<String, UserSchedulingPreference> =
        serde_json::from_str(json).context("Failed to parse preferences file")?;
    Ok(records.into_iter().collect())
}
