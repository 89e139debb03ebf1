//! Request handlers over a shared [`CityStore`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use citystore_core::{CityList, CityProjection, CityQuery, CityResult, CityStore, QueryEngine};

use crate::error::ApiError;
use crate::response::{ApiResponse, Status};
use crate::wire::CityPayload;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One handler per endpoint; each returns a finished response.
pub struct CityApi {
    store: Arc<CityStore>,
    clock: Arc<dyn Clock>,
}

impl CityApi {
    /// Serve requests from `store` using the wall clock.
    pub fn new(store: Arc<CityStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Serve requests from `store` using `clock` for timestamps and the
    /// future-date check.
    pub fn with_clock(store: Arc<CityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The store behind this API.
    pub fn store(&self) -> &Arc<CityStore> {
        &self.store
    }

    /// Liveness greeting.
    pub fn hello(&self, name: Option<&str>) -> ApiResponse {
        ApiResponse::text(Status::Ok, format!("Hello {}!", name.unwrap_or("World")))
    }

    /// Validate a JSON city and store it.
    pub fn add_city(&self, body: &str) -> ApiResponse {
        let result = CityPayload::from_json(body)
            .and_then(|payload| payload.into_record(self.clock.now().date_naive()))
            .and_then(|record| self.store.insert_city(record).map_err(ApiError::from));
        match result {
            Ok(()) => ApiResponse::empty(Status::Created),
            Err(e) => self.failure(e),
        }
    }

    /// Remove a city named by query parameters.
    pub fn delete_city(&self, name: Option<&str>, state: Option<&str>, country: Option<&str>) -> ApiResponse {
        let mut problems = Vec::new();
        let name = not_blank("name", name, &mut problems);
        let state = not_blank("state", state, &mut problems);
        let country = not_blank("country", country, &mut problems);

        match (name, state, country) {
            (Some(name), Some(state), Some(country)) => {
                match self.store.remove_city(name, state, country) {
                    Ok(()) => ApiResponse::empty(Status::NoContent),
                    Err(e) => self.failure(e.into()),
                }
            }
            _ => self.failure(ApiError::Validation(problems)),
        }
    }

    /// Every city, newest first, optionally founded before `date_founded`.
    pub fn list_cities(&self, date_founded: Option<&str>) -> ApiResponse {
        let query = match date_founded {
            Some(raw) => CityQuery::all().founded_before_raw(raw),
            None => Ok(CityQuery::all()),
        };
        match query {
            Ok(query) => self.answer(&query),
            Err(e) => self.failure(e.into()),
        }
    }

    /// Every city in one country, reduced to name and date.
    pub fn list_cities_in_country(&self, country: &str) -> ApiResponse {
        self.answer(&CityQuery::in_country(country))
    }

    /// Every city in one state, reduced to name and date.
    pub fn list_cities_in_state(&self, country: &str, state: &str) -> ApiResponse {
        self.answer(&CityQuery::in_state(country, state))
    }

    fn answer(&self, query: &CityQuery<'_>) -> ApiResponse {
        let result: CityResult<Vec<CityProjection>> = QueryEngine::new(&self.store).run(query);
        match result {
            Ok(cities) => ApiResponse::json(Status::Ok, &CityList { cities }),
            Err(e) => self.failure(e.into()),
        }
    }

    fn failure(&self, err: ApiError) -> ApiResponse {
        let status = err.status();
        if status == Status::InternalServerError {
            error!(error = %err, "request failed");
        } else {
            debug!(error = %err, code = status.code(), "request rejected");
        }
        match err.messages() {
            Some(messages) => ApiResponse::errors(status, messages, self.clock.now()),
            None => ApiResponse::empty(status),
        }
    }
}

impl fmt::Debug for CityApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CityApi")
            .field("cities", &self.store.len())
            .finish()
    }
}

fn not_blank<'a>(field: &str, value: Option<&'a str>, problems: &mut Vec<String>) -> Option<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            problems.push(format!("{field} must not be blank"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello() {
        let api = CityApi::new(Arc::new(CityStore::new()));
        assert_eq!(api.hello(None).body.as_deref(), Some("Hello World!"));
        assert_eq!(api.hello(Some("Ada")).body.as_deref(), Some("Hello Ada!"));
    }

    #[test]
    fn test_debug_shows_city_count() {
        let api = CityApi::new(Arc::new(CityStore::new()));
        let debug_str = format!("{:?}", api);
        assert!(debug_str.contains("CityApi"));
        assert!(debug_str.contains("cities: 0"));
    }

    #[test]
    fn test_delete_reports_blank_params() {
        let api = CityApi::new(Arc::new(CityStore::new()));
        let response = api.delete_city(Some("Leeds"), Some(""), None);
        assert_eq!(response.status, Status::BadRequest);
        let body = response.body.unwrap();
        assert!(body.contains("state must not be blank"));
        assert!(body.contains("country must not be blank"));
        assert!(!body.contains("name must not be blank"));
    }
}
