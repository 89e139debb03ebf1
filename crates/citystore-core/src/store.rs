//! Hierarchical record store — the heart of CityStore.
//!
//! CityStore keeps every city under a (country, state) region in a flat hash
//! table keyed by `RegionKey`. A country exists exactly while at least one
//! of its regions does, and a region exists exactly while it holds at least
//! one city: removing the last city of a state drops the region, which in
//! turn drops the country if it was the last state.
//!
//! **Mutations**: claim the [`MutationGate`], decide via an existence check,
//! then take the map's write lock briefly
//! **Queries**: read lock only; under [`ReadConsistency::Strict`] they run
//! while holding the gate idle

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, ReadConsistency};
use crate::date::FoundingDate;
use crate::error::{CityError, CityResult};
use crate::gate::{Mutation, MutationGate};
use crate::query::{CityQuery, QueryEngine};
use crate::record::{CityProjection, CityRecord};
use crate::stats::{StatsSnapshot, StoreStats};

/// Composite (country, state) key of one region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RegionKey {
    country: String,
    state: String,
}

impl RegionKey {
    fn new(country: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            state: state.into(),
        }
    }

    /// True if this region passes the given filters. An absent filter
    /// matches every value at its level.
    fn matches(&self, country: Option<&str>, state: Option<&str>) -> bool {
        country.map_or(true, |c| self.country == c) && state.map_or(true, |s| self.state == s)
    }
}

/// A city as held inside its region; state and country live in the key.
#[derive(Debug, Clone)]
struct StoredCity {
    name: String,
    founding_date: FoundingDate,
    /// Insertion sequence number, used to keep traversal order stable
    seq: u64,
}

impl StoredCity {
    fn to_record(&self, region: &RegionKey) -> CityRecord {
        CityRecord {
            name: self.name.clone(),
            state: region.state.clone(),
            country: region.country.clone(),
            founding_date: self.founding_date,
        }
    }
}

/// Concurrent country → state → city store.
///
/// All public methods take `&self`; wrap the store in an `Arc` to share it
/// between threads. Every value handed out is an independent copy.
#[derive(Debug)]
pub struct CityStore {
    /// Cities per region — concurrent reads via RwLock
    regions: RwLock<HashMap<RegionKey, Vec<StoredCity>>>,
    /// Serializes inserts and removes
    gate: MutationGate,
    /// Next insertion sequence number
    next_seq: AtomicU64,
    /// Operation counters
    stats: StoreStats,
    /// Store configuration
    config: Config,
}

impl CityStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::build(Config::default())
    }

    /// Create an empty store, rejecting an invalid configuration.
    pub fn with_config(config: Config) -> CityResult<Self> {
        config.validate().map_err(CityError::InvalidConfig)?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        Self {
            regions: RwLock::new(HashMap::new()),
            gate: MutationGate::new(),
            next_seq: AtomicU64::new(0),
            stats: StoreStats::new(),
            config,
        }
    }

    /// Store a new city.
    ///
    /// Fails with [`CityError::AlreadyExists`] if the region already holds a
    /// city of that name. Missing country and state levels are created on
    /// demand.
    pub fn insert_city(&self, record: CityRecord) -> CityResult<()> {
        record.check_fields(self.config.max_field_len)?;

        let _turn = self.gate.claim(Mutation::Writing);

        if self.exists(&record.name, &record.state, &record.country) {
            self.stats.record_conflict();
            warn!(
                city = %record.name,
                state = %record.state,
                country = %record.country,
                "insert rejected: city already exists"
            );
            return Err(CityError::AlreadyExists {
                name: record.name,
                state: record.state,
                country: record.country,
            });
        }

        let CityRecord { name, state, country, founding_date } = record;
        info!(city = %name, %state, %country, %founding_date, "city stored");

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        {
            let mut regions = self.regions.write();
            regions
                .entry(RegionKey::new(country, state))
                .or_default()
                .push(StoredCity { name, founding_date, seq });
        }
        self.stats.record_insert();
        Ok(())
    }

    /// Remove a stored city, pruning its state and country if they become
    /// empty.
    ///
    /// Fails with [`CityError::NotFound`] if no such city is stored.
    pub fn remove_city(&self, name: &str, state: &str, country: &str) -> CityResult<()> {
        let _turn = self.gate.claim(Mutation::Deleting);

        if !self.exists(name, state, country) {
            self.stats.record_miss();
            warn!(city = %name, %state, %country, "remove rejected: city not found");
            return Err(CityError::NotFound {
                name: name.to_string(),
                state: state.to_string(),
                country: country.to_string(),
            });
        }

        {
            let mut regions = self.regions.write();
            let key = RegionKey::new(country, state);
            if let Some(cities) = regions.get_mut(&key) {
                cities.retain(|city| city.name != name);
                if cities.is_empty() {
                    regions.remove(&key);
                    debug!(%state, %country, "pruned empty state");
                    if !regions.keys().any(|k| k.country == country) {
                        debug!(%country, "pruned empty country");
                    }
                }
            }
        }

        self.stats.record_removal();
        info!(city = %name, %state, %country, "city removed");
        Ok(())
    }

    /// Lookup used inside a mutation turn; never waits on the gate.
    fn exists(&self, name: &str, state: &str, country: &str) -> bool {
        let regions = self.regions.read();
        regions
            .get(&RegionKey::new(country, state))
            .map_or(false, |cities| cities.iter().any(|city| city.name == name))
    }

    /// Check if a city is stored.
    pub fn contains(&self, name: &str, state: &str, country: &str) -> bool {
        self.read_view(|| self.exists(name, state, country))
    }

    /// Copy out every city under the given filters, in insertion order.
    ///
    /// Both filters absent: every country and state. Only `country`: every
    /// state in that country. Both: that one state. Only `state`: that state
    /// name in every country.
    pub fn query(&self, country: Option<&str>, state: Option<&str>) -> CityResult<Vec<CityRecord>> {
        self.stats.record_query();

        let mut hits: Vec<(u64, CityRecord)> = Vec::new();
        self.read_view(|| {
            let regions = self.regions.read();
            if let (Some(country), Some(state)) = (country, state) {
                if let Some((key, cities)) = regions.get_key_value(&RegionKey::new(country, state)) {
                    collect_region(key, cities, &mut hits)?;
                }
            } else {
                for (key, cities) in regions.iter() {
                    if key.matches(country, state) {
                        collect_region(key, cities, &mut hits)?;
                    }
                }
            }
            Ok::<(), CityError>(())
        })?;

        hits.sort_unstable_by_key(|(seq, _)| *seq);
        Ok(hits.into_iter().map(|(_, record)| record).collect())
    }

    /// Answer a query: collect, order newest first, apply the date filter
    /// to unscoped queries, then shape.
    ///
    /// An empty answer is [`CityError::EmptyResult`].
    pub fn query_cities(
        &self,
        country: Option<&str>,
        state: Option<&str>,
        max_date: Option<FoundingDate>,
    ) -> CityResult<Vec<CityProjection>> {
        let query = CityQuery { country, state, max_date };
        QueryEngine::new(self).run(&query)
    }

    /// Verify that no empty region is stored.
    pub fn check_hierarchy(&self) -> CityResult<()> {
        let regions = self.regions.read();
        for (key, cities) in regions.iter() {
            if cities.is_empty() {
                return Err(broken(key));
            }
        }
        Ok(())
    }

    /// Total number of cities.
    pub fn len(&self) -> usize {
        let regions = self.regions.read();
        regions.values().map(Vec::len).sum()
    }

    /// Returns true if the store holds no cities.
    pub fn is_empty(&self) -> bool {
        let regions = self.regions.read();
        regions.is_empty()
    }

    /// Number of countries holding at least one city.
    pub fn country_count(&self) -> usize {
        let regions = self.regions.read();
        let countries: HashSet<&str> = regions.keys().map(|k| k.country.as_str()).collect();
        countries.len()
    }

    /// Number of (country, state) regions holding at least one city.
    pub fn region_count(&self) -> usize {
        let regions = self.regions.read();
        regions.len()
    }

    /// Operation counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Store configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a read. Under `Strict` it runs with the gate held idle, so no
    /// turn can start until it finishes.
    fn read_view<R>(&self, read: impl FnOnce() -> R) -> R {
        match self.config.read_consistency {
            ReadConsistency::Strict => self.gate.while_idle(read),
            ReadConsistency::Relaxed => read(),
        }
    }

    #[cfg(test)]
    fn inject_empty_region(&self, country: &str, state: &str) {
        self.regions.write().insert(RegionKey::new(country, state), Vec::new());
    }
}

impl Default for CityStore {
    fn default() -> Self { Self::new() }
}

fn collect_region(
    key: &RegionKey,
    cities: &[StoredCity],
    hits: &mut Vec<(u64, CityRecord)>,
) -> CityResult<()> {
    if cities.is_empty() {
        return Err(broken(key));
    }
    hits.extend(cities.iter().map(|city| (city.seq, city.to_record(key))));
    Ok(())
}

fn broken(key: &RegionKey) -> CityError {
    warn!(state = %key.state, country = %key.country, "empty region found during traversal");
    CityError::BrokenHierarchy {
        country: key.country.clone(),
        state: key.state.clone(),
    }
}
