//! Configuration management for CityStore
//!
//! Provides read-consistency presets and validation of the limits applied
//! to incoming records.

/// How external queries interact with in-flight mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadConsistency {
    /// External queries never wait on the mutation gate. A query issued while
    /// an insert or remove is in flight runs against whatever the map holds
    /// at the moment it takes its read lock.
    #[default]
    Relaxed,
    /// External queries wait until no insert or remove is in flight, then run
    /// while holding the gate idle, so no turn can start mid-read.
    Strict,
}

/// CityStore configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether external queries wait for the mutation gate to go idle
    pub read_consistency: ReadConsistency,
    /// Maximum length in bytes of a city, state or country name
    pub max_field_len: usize,
}

impl Config {
    /// Queries do not wait for in-flight mutations.
    pub fn relaxed() -> Self {
        Self {
            read_consistency: ReadConsistency::Relaxed,
            max_field_len: 256,
        }
    }

    /// Queries wait until the store is idle before reading.
    pub fn strict() -> Self {
        Self {
            read_consistency: ReadConsistency::Strict,
            ..Self::relaxed()
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.max_field_len == 0 || self.max_field_len > 4096 {
            return Err("max_field_len must be in [1, 4096]".into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self { Self::relaxed() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_valid() {
        assert!(Config::relaxed().validate().is_ok());
        assert!(Config::strict().validate().is_ok());
    }

    #[test]
    fn test_default_is_relaxed() {
        assert_eq!(Config::default().read_consistency, ReadConsistency::Relaxed);
        assert_eq!(Config::strict().read_consistency, ReadConsistency::Strict);
    }

    #[test]
    fn test_field_len_bounds() {
        let mut config = Config::default();
        config.max_field_len = 0;
        assert!(config.validate().is_err());
        config.max_field_len = 4097;
        assert!(config.validate().is_err());
        config.max_field_len = 4096;
        assert!(config.validate().is_ok());
    }
}
