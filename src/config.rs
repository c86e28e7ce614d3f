//! Runtime configuration, read from the environment.
//!
//! | Variable                          | Default  |
//! |-----------------------------------|----------|
//! | `STOREFRONT_DATA_DIR`             | `./data` |
//! | `STOREFRONT_LOW_STOCK_THRESHOLD`  | `3`      |
//! | `STOREFRONT_CHANNEL_CAPACITY`     | `100`    |
//!
//! Log verbosity is controlled separately through `RUST_LOG`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::error::ConfigError;

pub const DATA_DIR_VAR: &str = "STOREFRONT_DATA_DIR";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "STOREFRONT_LOW_STOCK_THRESHOLD";
pub const CHANNEL_CAPACITY_VAR: &str = "STOREFRONT_CHANNEL_CAPACITY";

#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    /// Directory holding the flat-file snapshots.
    pub data_dir: PathBuf,
    pub low_stock_threshold: i64,
    /// Request queue capacity of the catalog actor.
    pub channel_capacity: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            channel_capacity: 100,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source; unset variables
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(LOW_STOCK_THRESHOLD_VAR) {
            config.low_stock_threshold = parse(LOW_STOCK_THRESHOLD_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CHANNEL_CAPACITY_VAR) {
            let capacity: usize = parse(CHANNEL_CAPACITY_VAR, &raw)?;
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    key: CHANNEL_CAPACITY_VAR,
                    value: raw,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.channel_capacity = capacity;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.low_stock_threshold, 3);
    }

    #[test]
    fn reads_all_variables() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/tmp/shop"),
            (LOW_STOCK_THRESHOLD_VAR, "5"),
            (CHANNEL_CAPACITY_VAR, "8"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn rejects_unparsable_threshold() {
        let err = StorefrontConfig::from_lookup(lookup(&[(LOW_STOCK_THRESHOLD_VAR, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: LOW_STOCK_THRESHOLD_VAR, .. }));
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(StorefrontConfig::from_lookup(lookup(&[(CHANNEL_CAPACITY_VAR, "0")])).is_err());
    }
}
