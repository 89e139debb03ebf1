//! Founding-date normalization
//!
//! A founding date arrives either as an ISO `yyyy-MM-dd` string (optionally
//! followed by a `Z` or `±hh:mm` zone suffix, which carries no information
//! for a calendar date and is dropped) or as a signed count of days from
//! 1970-01-01. Both forms normalize to [`FoundingDate`], and every comparison
//! inside the store happens on that type, never on the original text.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CityError, CityResult};

/// Length of `yyyy-MM-dd`
const ISO_DATE_LEN: usize = 10;

/// A normalized calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoundingDate(NaiveDate);

impl FoundingDate {
    /// Parse either an ISO date or a signed day offset from the epoch.
    ///
    /// Day offsets are limited to the 32-bit signed range, matching what
    /// clients are allowed to send.
    pub fn parse(input: &str) -> CityResult<Self> {
        if input.is_empty() {
            return Err(CityError::invalid_date(input, "empty date"));
        }

        if is_day_offset(input) {
            let days: i32 = input.parse().map_err(|_| {
                CityError::invalid_date(input, "day offset outside the 32-bit range")
            })?;
            return Self::from_epoch_days(i64::from(days));
        }

        let date_part = strip_zone_suffix(input);
        if !is_iso_shape(date_part) {
            return Err(CityError::invalid_date(input, "expected yyyy-MM-dd"));
        }
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map(FoundingDate)
            .map_err(|e| CityError::invalid_date(input, e.to_string()))
    }

    /// Build a date from a signed number of days since 1970-01-01.
    pub fn from_epoch_days(days: i64) -> CityResult<Self> {
        let offset = Days::new(days.unsigned_abs());
        let date = if days >= 0 {
            epoch().checked_add_days(offset)
        } else {
            epoch().checked_sub_days(offset)
        };
        date.map(FoundingDate).ok_or_else(|| {
            CityError::invalid_date(days.to_string(), "day offset outside the supported calendar")
        })
    }

    /// Build a date from year, month and day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CityResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(FoundingDate)
            .ok_or_else(|| {
                CityError::invalid_date(format!("{year:04}-{month:02}-{day:02}"), "no such calendar day")
            })
    }

    /// Signed number of days since 1970-01-01.
    pub fn epoch_days(&self) -> i64 {
        self.0.signed_duration_since(epoch()).num_days()
    }

    /// The underlying calendar date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

/// 1970-01-01 (chrono's default date).
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn is_day_offset(input: &str) -> bool {
    let digits = input.strip_prefix('-').unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Exactly `yyyy-MM-dd` in ASCII digits.
fn is_iso_shape(s: &str) -> bool {
    s.len() == ISO_DATE_LEN
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn strip_zone_suffix(input: &str) -> &str {
    if let Some(rest) = input.strip_suffix('Z') {
        return rest;
    }
    let bytes = input.as_bytes();
    if bytes.len() > 6 {
        let tail = &bytes[bytes.len() - 6..];
        let is_offset = matches!(tail[0], b'+' | b'-')
            && tail[1].is_ascii_digit()
            && tail[2].is_ascii_digit()
            && tail[3] == b':'
            && tail[4].is_ascii_digit()
            && tail[5].is_ascii_digit();
        if is_offset {
            // the tail is ASCII, so this is a char boundary
            return &input[..input.len() - 6];
        }
    }
    input
}

impl From<NaiveDate> for FoundingDate {
    fn from(date: NaiveDate) -> Self {
        FoundingDate(date)
    }
}

impl FromStr for FoundingDate {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FoundingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for FoundingDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Days(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for FoundingDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match RawDate::deserialize(deserializer)? {
            RawDate::Days(days) => Self::from_epoch_days(days),
            RawDate::Text(text) => Self::parse(&text),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
