//! Per-participant preference resolution.
//!
//! Stored preferences live behind the [`PreferenceStore`] trait. The resolver
//! looks every participant up concurrently, waits for all of them, and maps
//! anything missing or failed to the injected default. It never fails.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::UserSchedulingPreference;

/// Source of stored per-user scheduling preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Fetch the stored record for `participant`.
    ///
    /// `Ok(None)` means the participant has never saved preferences.
    ///
    /// # Errors
    /// Returns `SlotError::PreferenceStore` if the lookup itself failed.
    async fn load(&self, participant: &str) -> Result<Option<UserSchedulingPreference>>;
}

/// A store backed by a map, keyed by lower-cased participant identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPreferenceStore {
    records: HashMap<String, UserSchedulingPreference>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, participant: &str, preference: UserSchedulingPreference) {
        self.records.insert(participant.to_lowercase(), preference);
    }
}

impl FromIterator<(String, UserSchedulingPreference)> for InMemoryPreferenceStore {
    fn from_iter<I: IntoIterator<Item = (String, UserSchedulingPreference)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (participant, preference) in iter {
            store.insert(&participant, preference);
        }
        store
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load(&self, participant: &str) -> Result<Option<UserSchedulingPreference>> {
        Ok(self.records.get(&participant.to_lowercase()).cloned())
    }
}

/// Resolved preferences keyed by participant identifier, in a stable order.
pub type ResolvedPreferences = BTreeMap<String, UserSchedulingPreference>;

/// Loads stored preferences, substituting `default_preference` where needed.
#[derive(Debug, Clone)]
pub struct PreferenceResolver {
    default_preference: UserSchedulingPreference,
}

impl PreferenceResolver {
    pub fn new(default_preference: UserSchedulingPreference) -> Self {
        Self { default_preference }
    }

    pub fn default_preference(&self) -> &UserSchedulingPreference {
        &self.default_preference
    }

    /// Resolve every participant. Lookups run concurrently and are all joined
    /// before this returns.
    pub async fn resolve(
        &self,
        store: &dyn PreferenceStore,
        participants: &[String],
    ) -> ResolvedPreferences {
        let lookups = participants.iter().map(|participant| async move {
            let preference = match store.load(participant).await {
                Ok(Some(preference)) => preference,
                Ok(None) => {
                    debug!(participant = %participant, "no stored preference, using default");
                    self.default_preference.clone()
                }
                Err(error) => {
                    warn!(participant = %participant, %error, "preference lookup failed, using default");
                    self.default_preference.clone()
                }
            };
            (participant.clone(), preference)
        });

        join_all(lookups).await.into_iter().collect()
    }
}
