//! Error types for configuration and revision parsing.

/// Errors raised while building or loading an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Office window is empty or out of range
    #[error("invalid office hours: start {start} must be before end {end}, both within 0..=23")]
    InvalidOfficeHours {
        /// Configured start hour
        start: u32,
        /// Configured end hour
        end: u32,
    },

    /// Daily cap must be positive
    #[error("max_hours_per_day must be positive, got {0}")]
    InvalidDailyCap(f64),

    /// Timezone name not found in the IANA database
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Timeframe start is after its end
    #[error("timeframe start {start} is after end {end}")]
    InvertedTimeframe {
        /// Timeframe start date
        start: chrono::NaiveDate,
        /// Timeframe end date
        end: chrono::NaiveDate,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while converting a raw tracker revision into a state event.
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    /// Revision carries no change date
    #[error("revision {0} has no changed_date")]
    MissingTimestamp(u64),

    /// Change date is not a valid RFC 3339 instant
    #[error("revision {revision} has malformed changed_date '{value}': {source}")]
    MalformedTimestamp {
        /// Revision number
        revision: u64,
        /// Raw timestamp text
        value: String,
        /// Underlying parse error
        source: chrono::ParseError,
    },
}
