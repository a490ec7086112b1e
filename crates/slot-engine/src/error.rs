//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid meeting duration: {0} minutes")]
    InvalidDuration(i64),

    #[error("Invalid search horizon: {0} days")]
    InvalidHorizon(u32),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A preference lookup failed. The resolver absorbs this and substitutes
    /// the configured default; stores return it so the failure can be logged.
    #[error("Preference lookup failed for {participant}: {message}")]
    PreferenceStore { participant: String, message: String },
}

pub type Result<T> = std::result::Result<T, SlotError>;
