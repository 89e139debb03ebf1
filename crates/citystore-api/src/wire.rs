//! Wire format of an incoming city and its validation.
//!
//! ```json
//! {"name": "Leeds", "state": "England", "country": "UK", "dateFounded": "1207-01-01"}
//! ```
//!
//! `dateFounded` may also be a signed integer number of days since
//! 1970-01-01. Every problem with the payload is reported at once rather
//! than stopping at the first.

use chrono::NaiveDate;
use serde::Deserialize;

use citystore_core::{CityRecord, FoundingDate};

use crate::error::{ApiError, BAD_DATE_MESSAGE, FUTURE_DATE_MESSAGE};

/// A founding date as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// Signed day offset from 1970-01-01
    Days(i64),
    /// ISO `yyyy-MM-dd` (or a day offset written as a string)
    Text(String),
}

impl DateInput {
    /// Normalize to a calendar date. Numeric offsets go through the same
    /// range checks as their string form.
    pub fn normalize(&self) -> Option<FoundingDate> {
        let parsed = match self {
            DateInput::Days(days) => FoundingDate::parse(&days.to_string()),
            DateInput::Text(text) => FoundingDate::parse(text),
        };
        parsed.ok()
    }
}

/// An unvalidated city from a request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityPayload {
    /// City name
    pub name: Option<String>,
    /// State name
    pub state: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// Founding date
    pub date_founded: Option<DateInput>,
}

impl CityPayload {
    /// Decode a request body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Check every field and build the record. `today` bounds the founding
    /// date from above.
    pub fn into_record(self, today: NaiveDate) -> Result<CityRecord, ApiError> {
        let mut problems = Vec::new();

        let name = required("name", self.name, &mut problems);
        let state = required("state", self.state, &mut problems);
        let country = required("country", self.country, &mut problems);

        let founding_date = match &self.date_founded {
            None => {
                problems.push("dateFounded is required".to_string());
                None
            }
            Some(input) => match input.normalize() {
                None => {
                    problems.push(BAD_DATE_MESSAGE.to_string());
                    None
                }
                Some(date) if date.as_naive() > today => {
                    problems.push(FUTURE_DATE_MESSAGE.to_string());
                    None
                }
                Some(date) => Some(date),
            },
        };

        match (name, state, country, founding_date) {
            (Some(name), Some(state), Some(country), Some(date)) if problems.is_empty() => {
                Ok(CityRecord::new(name, state, country, date)?)
            }
            _ => Err(ApiError::Validation(problems)),
        }
    }
}

fn required(field: &str, value: Option<String>, problems: &mut Vec<String>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            problems.push(format!("{field} is required"));
            None
        }
    }
}
