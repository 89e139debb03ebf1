//! Error types for CityStore operations
//!
//! Every fallible store or query operation returns a [`CityError`]. The
//! expected outcomes (duplicate, missing, empty, bad input) are all
//! recoverable at the call boundary; [`CityError::BrokenHierarchy`] is the one
//! variant that signals a defect inside the store itself.

use thiserror::Error;

/// CityStore error types with the key that caused them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CityError {
    /// A record with the same (country, state, name) is already stored
    #[error("city {name} already exists in {state}, {country}")]
    AlreadyExists {
        /// City name
        name: String,
        /// State the city was inserted into
        state: String,
        /// Country the state belongs to
        country: String,
    },

    /// No record matches the given (country, state, name)
    #[error("city {name} not found in {state}, {country}")]
    NotFound {
        /// City name
        name: String,
        /// State that was searched
        state: String,
        /// Country that was searched
        country: String,
    },

    /// The query matched no records
    #[error("query matched no cities")]
    EmptyResult,

    /// A date could not be normalized to a calendar date
    #[error("invalid date {input:?}: {reason}")]
    InvalidDate {
        /// The raw input as received
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A record field is blank or too long
    #[error("invalid {field}: {reason}")]
    InvalidRecord {
        /// Field name (`name`, `state` or `country`)
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Store configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An empty level was found where pruning should have removed it
    #[error("hierarchy invariant broken: empty level at {country}/{state}")]
    BrokenHierarchy {
        /// Country of the offending level
        country: String,
        /// State of the offending level
        state: String,
    },
}

impl CityError {
    /// True for errors that indicate a bug in the store rather than bad input
    /// or an expected outcome.
    pub fn is_defect(&self) -> bool {
        matches!(self, CityError::BrokenHierarchy { .. })
    }

    pub(crate) fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        CityError::InvalidDate {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for CityStore operations
pub type CityResult<T> = Result<T, CityError>;
