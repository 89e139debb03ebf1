//! Query engine — collect, order, filter, shape.
//!
//! A query names an optional country, an optional state and an optional
//! founding-date upper bound. Its scope decides two things up front:
//!
//! - **Unscoped** (no country, no state): full records are returned and the
//!   date bound, if any, is applied.
//! - **Scoped** (country and/or state): reduced `{name, dateFounded}`
//!   projections are returned and the date bound is ignored.
//!
//! Results are always ordered newest first; cities founded on the same day
//! keep their insertion order.

use tracing::debug;

use crate::date::FoundingDate;
use crate::error::{CityError, CityResult};
use crate::record::{CityProjection, CityRecord};
use crate::store::CityStore;

/// A traversal request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityQuery<'a> {
    /// Restrict to one country
    pub country: Option<&'a str>,
    /// Restrict to one state name
    pub state: Option<&'a str>,
    /// Keep only cities founded strictly before this date (unscoped only)
    pub max_date: Option<FoundingDate>,
}

impl<'a> CityQuery<'a> {
    /// Every city in the store.
    pub fn all() -> Self {
        Self::default()
    }

    /// Every city in one country.
    pub fn in_country(country: &'a str) -> Self {
        Self { country: Some(country), ..Self::default() }
    }

    /// Every city in one state of one country.
    pub fn in_state(country: &'a str, state: &'a str) -> Self {
        Self { country: Some(country), state: Some(state), ..Self::default() }
    }

    /// Add a founding-date upper bound.
    pub fn founded_before(mut self, max_date: FoundingDate) -> Self {
        self.max_date = Some(max_date);
        self
    }

    /// Add a founding-date upper bound given in its raw input form.
    pub fn founded_before_raw(self, max_date: &str) -> CityResult<Self> {
        Ok(self.founded_before(FoundingDate::parse(max_date)?))
    }

    /// True when a country or state narrows the query.
    pub fn is_scoped(&self) -> bool {
        self.country.is_some() || self.state.is_some()
    }
}

/// Runs [`CityQuery`]s against a store.
pub struct QueryEngine<'s> {
    store: &'s CityStore,
}

impl<'s> QueryEngine<'s> {
    /// Bind an engine to a store.
    pub fn new(store: &'s CityStore) -> Self {
        Self { store }
    }

    /// Candidate records for the query's scope, in insertion order.
    pub fn collect(&self, query: &CityQuery<'_>) -> CityResult<Vec<CityRecord>> {
        self.store.query(query.country, query.state)
    }

    /// Collect, sort, filter and shape. An empty answer is
    /// [`CityError::EmptyResult`].
    pub fn run(&self, query: &CityQuery<'_>) -> CityResult<Vec<CityProjection>> {
        let mut records = self.collect(query)?;
        let candidates = records.len();
        sort_descending_by_date(&mut records);

        let scoped = query.is_scoped();
        if let Some(max_date) = query.max_date {
            if scoped {
                debug!(%max_date, "date filter ignored for scoped query");
            } else {
                records = filter_by_max_date(records, max_date);
            }
        }

        debug!(
            country = query.country.unwrap_or("*"),
            state = query.state.unwrap_or("*"),
            candidates,
            returned = records.len(),
            "query answered"
        );
        shape(records, scoped)
    }
}

/// Order records newest first. The sort is stable, so equal dates keep
/// their incoming order.
pub fn sort_descending_by_date(records: &mut [CityRecord]) {
    records.sort_by(|a, b| b.founding_date.cmp(&a.founding_date));
}

/// Keep records founded strictly before `max_date`, preserving order.
pub fn filter_by_max_date(records: Vec<CityRecord>, max_date: FoundingDate) -> Vec<CityRecord> {
    records
        .into_iter()
        .filter(|record| record.founding_date < max_date)
        .collect()
}

/// Convert records to the projection their scope calls for.
pub fn shape(records: Vec<CityRecord>, scoped: bool) -> CityResult<Vec<CityProjection>> {
    if records.is_empty() {
        return Err(CityError::EmptyResult);
    }
    let projections = if scoped {
        records.into_iter().map(|r| CityProjection::Reduced(r.reduce())).collect()
    } else {
        records.into_iter().map(CityProjection::Full).collect()
    };
    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> FoundingDate {
        FoundingDate::parse(s).unwrap()
    }

    fn record(name: &str, state: &str, country: &str, founded: &str) -> CityRecord {
        CityRecord::new(name, state, country, date(founded)).unwrap()
    }

    fn dates(projections: &[CityProjection]) -> Vec<String> {
        projections.iter().map(|p| p.founding_date().to_string()).collect()
    }

    fn sample_store() -> CityStore {
        let store = CityStore::new();
        store.insert_city(record("Alpha", "England", "UK", "2020-01-01")).unwrap();
        store.insert_city(record("Beta", "Texas", "USA", "1999-06-15")).unwrap();
        store.insert_city(record("Gamma", "England", "UK", "2021-03-03")).unwrap();
        store
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record("a", "s", "c", "2020-01-01"),
            record("b", "s", "c", "1999-06-15"),
            record("c", "s", "c", "2021-03-03"),
        ];
        sort_descending_by_date(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut records = vec![
            record("first", "s", "c", "2000-01-01"),
            record("newer", "s", "c", "2010-01-01"),
            record("second", "s", "c", "2000-01-01"),
            record("third", "s", "c", "2000-01-01"),
        ];
        sort_descending_by_date(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["newer", "first", "second", "third"]);
    }

    #[test]
    fn test_sort_uses_calendar_not_text() {
        // day 100 is 1970-04-11
        let mut records = vec![
            record("iso", "s", "c", "1970-01-10"),
            CityRecord::new("offset", "s", "c", FoundingDate::from_epoch_days(100).unwrap()).unwrap(),
        ];
        sort_descending_by_date(&mut records);
        assert_eq!(records[0].name, "offset");
    }

    #[test]
    fn test_filter_is_strictly_before() {
        let records = vec![
            record("a", "s", "c", "2021-03-03"),
            record("b", "s", "c", "2020-01-01"),
            record("c", "s", "c", "1999-06-15"),
        ];
        let kept = filter_by_max_date(records, date("2020-01-01"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "c");
    }

    #[test]
    fn test_shape_empty_is_empty_result() {
        assert_eq!(shape(Vec::new(), false).unwrap_err(), CityError::EmptyResult);
        assert_eq!(shape(Vec::new(), true).unwrap_err(), CityError::EmptyResult);
    }

    #[test]
    fn test_unscoped_query_full_and_ordered() {
        let store = sample_store();
        let result = QueryEngine::new(&store).run(&CityQuery::all()).unwrap();
        assert_eq!(dates(&result), ["2021-03-03", "2020-01-01", "1999-06-15"]);
        assert!(result.iter().all(CityProjection::is_full));
    }

    #[test]
    fn test_unscoped_query_with_max_date() {
        let store = sample_store();
        let query = CityQuery::all().founded_before(date("2020-01-01"));
        let result = QueryEngine::new(&store).run(&query).unwrap();
        assert_eq!(dates(&result), ["1999-06-15"]);
    }

    #[test]
    fn test_max_date_excluding_everything_is_empty() {
        let store = sample_store();
        let query = CityQuery::all().founded_before(date("1999-06-15"));
        assert_eq!(QueryEngine::new(&store).run(&query).unwrap_err(), CityError::EmptyResult);
    }

    #[test]
    fn test_scoped_query_reduced_and_unfiltered() {
        let store = sample_store();
        let query = CityQuery::in_state("UK", "England").founded_before(date("1900-01-01"));
        let result = QueryEngine::new(&store).run(&query).unwrap();

        assert_eq!(dates(&result), ["2021-03-03", "2020-01-01"]);
        for projection in &result {
            assert!(!projection.is_full());
            let json = serde_json::to_value(projection).unwrap();
            assert!(json.get("state").is_none());
            assert!(json.get("country").is_none());
        }
    }

    #[test]
    fn test_country_query_reduced() {
        let store = sample_store();
        let result = QueryEngine::new(&store).run(&CityQuery::in_country("USA")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name(), "Beta");
        assert!(!result[0].is_full());
    }

    #[test]
    fn test_unknown_scope_is_empty_result() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);
        assert_eq!(engine.run(&CityQuery::in_country("France")).unwrap_err(), CityError::EmptyResult);
        assert_eq!(engine.run(&CityQuery::in_state("UK", "Wales")).unwrap_err(), CityError::EmptyResult);
    }

    #[test]
    fn test_founded_before_raw() {
        let query = CityQuery::all().founded_before_raw("2020-01-01").unwrap();
        assert_eq!(query.max_date, Some(date("2020-01-01")));

        let err = CityQuery::all().founded_before_raw("01/01/2020").unwrap_err();
        assert!(matches!(err, CityError::InvalidDate { .. }));
    }
}
