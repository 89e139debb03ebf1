//! City records and the shapes they are returned in.

use serde::{Deserialize, Serialize};

use crate::date::FoundingDate;
use crate::error::{CityError, CityResult};

/// A single city entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    /// City name, unique within its state
    pub name: String,
    /// State the city is situated in
    pub state: String,
    /// Country the state is situated in
    pub country: String,
    /// Normalized founding date
    #[serde(rename = "dateFounded")]
    pub founding_date: FoundingDate,
}

impl CityRecord {
    /// Build a record, rejecting blank names.
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        founding_date: FoundingDate,
    ) -> CityResult<Self> {
        let record = Self {
            name: name.into(),
            state: state.into(),
            country: country.into(),
            founding_date,
        };
        record.check_fields(usize::MAX)?;
        Ok(record)
    }

    /// Reject blank fields and fields longer than `max_len` bytes.
    pub(crate) fn check_fields(&self, max_len: usize) -> CityResult<()> {
        check_field("name", &self.name, max_len)?;
        check_field("state", &self.state, max_len)?;
        check_field("country", &self.country, max_len)
    }

    /// Drop the state and country, which a scoped query already implies.
    pub fn reduce(self) -> ReducedCity {
        ReducedCity {
            name: self.name,
            founding_date: self.founding_date,
        }
    }
}

fn check_field(field: &'static str, value: &str, max_len: usize) -> CityResult<()> {
    if value.trim().is_empty() {
        return Err(CityError::InvalidRecord {
            field,
            reason: "must not be blank".into(),
        });
    }
    if value.len() > max_len {
        return Err(CityError::InvalidRecord {
            field,
            reason: format!("{} bytes exceeds limit of {}", value.len(), max_len),
        });
    }
    Ok(())
}

/// Name and founding date only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedCity {
    /// City name
    pub name: String,
    /// Normalized founding date
    #[serde(rename = "dateFounded")]
    pub founding_date: FoundingDate,
}

/// The shape a city is returned in, fixed by the query's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CityProjection {
    /// Unscoped queries: every field
    Full(CityRecord),
    /// Country- or state-scoped queries: name and date
    Reduced(ReducedCity),
}

impl CityProjection {
    /// City name, present in both shapes.
    pub fn name(&self) -> &str {
        match self {
            CityProjection::Full(city) => &city.name,
            CityProjection::Reduced(city) => &city.name,
        }
    }

    /// Founding date, present in both shapes.
    pub fn founding_date(&self) -> FoundingDate {
        match self {
            CityProjection::Full(city) => city.founding_date,
            CityProjection::Reduced(city) => city.founding_date,
        }
    }

    /// True for the full shape.
    pub fn is_full(&self) -> bool {
        matches!(self, CityProjection::Full(_))
    }
}

/// Envelope for a query result: `{"cities": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityList {
    /// Matching cities, newest first
    pub cities: Vec<CityProjection>,
}
