//! Runtime configuration read from the environment.
//!
//! | Setting | Primary env var | Fallback | Default |
//! |---------|-----------------|----------|---------|
//! | Alpha Vantage key | `PRICEMARK_ALPHAVANTAGE_API_KEY` | `ALPHAVANTAGE_API_KEY` | unset |
//! | Request timeout | `PRICEMARK_TIMEOUT_MS` | - | `10000` |
//! | User agent | `PRICEMARK_USER_AGENT` | - | browser-like agent |
//! | Notes directory | `PRICEMARK_NOTES_DIR` | - | `./notes` |
//! | Alert note tag | `PRICEMARK_ALERT_TAG` | - | `alert` |
//! | Subscription tag | `PRICEMARK_SUBSCRIPTION_TAG` | - | `abo` |

use std::env;
use std::path::PathBuf;

use crate::http_client::DEFAULT_USER_AGENT;
use crate::ConfigError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_NOTES_DIR: &str = "./notes";
pub const DEFAULT_ALERT_TAG: &str = "alert";
pub const DEFAULT_SUBSCRIPTION_TAG: &str = "abo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub alphavantage_api_key: Option<String>,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub notes_dir: PathBuf,
    pub alert_tag: String,
    pub subscription_tag: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alphavantage_api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: String::from(DEFAULT_USER_AGENT),
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
            alert_tag: String::from(DEFAULT_ALERT_TAG),
            subscription_tag: String::from(DEFAULT_SUBSCRIPTION_TAG),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.alphavantage_api_key = get("PRICEMARK_ALPHAVANTAGE_API_KEY")
            .or_else(|| get("ALPHAVANTAGE_API_KEY"));

        if let Some(raw) = get("PRICEMARK_TIMEOUT_MS") {
            config.timeout_ms = parse_timeout("PRICEMARK_TIMEOUT_MS", &raw)?;
        }
        if let Some(user_agent) = get("PRICEMARK_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(dir) = get("PRICEMARK_NOTES_DIR") {
            config.notes_dir = PathBuf::from(dir);
        }
        if let Some(tag) = get("PRICEMARK_ALERT_TAG") {
            config.alert_tag = tag;
        }
        if let Some(tag) = get("PRICEMARK_SUBSCRIPTION_TAG") {
            config.subscription_tag = tag;
        }

        Ok(config)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "timeout_ms",
                value: String::from("0"),
            });
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    pub fn with_notes_dir(mut self, notes_dir: impl Into<PathBuf>) -> Self {
        self.notes_dir = notes_dir.into();
        self
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::Empty {
                key: "alphavantage_api_key",
            });
        }
        self.alphavantage_api_key = Some(key);
        Ok(self)
    }
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).expect("config should load");
        assert_eq!(config, Config::default());
        assert_eq!(config.notes_dir, PathBuf::from("./notes"));
        assert_eq!(config.subscription_tag, "abo");
    }

    #[test]
    fn primary_key_wins_over_fallback() {
        let config = Config::from_lookup(lookup(&[
            ("PRICEMARK_ALPHAVANTAGE_API_KEY", "primary"),
            ("ALPHAVANTAGE_API_KEY", "fallback"),
        ]))
        .expect("config should load");
        assert_eq!(config.alphavantage_api_key.as_deref(), Some("primary"));

        let config = Config::from_lookup(lookup(&[
            ("PRICEMARK_ALPHAVANTAGE_API_KEY", "   "),
            ("ALPHAVANTAGE_API_KEY", "fallback"),
        ]))
        .expect("config should load");
        assert_eq!(config.alphavantage_api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = Config::from_lookup(lookup(&[("PRICEMARK_TIMEOUT_MS", "soon")]))
            .expect_err("must fail");
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: "PRICEMARK_TIMEOUT_MS",
                value: String::from("soon"),
            }
        );
        assert!(Config::from_lookup(lookup(&[("PRICEMARK_TIMEOUT_MS", "0")])).is_err());
    }

    #[test]
    fn reads_paths_and_tags() {
        let config = Config::from_lookup(lookup(&[
            ("PRICEMARK_TIMEOUT_MS", "2500"),
            ("PRICEMARK_NOTES_DIR", "/tmp/vault"),
            ("PRICEMARK_ALERT_TAG", "kursalarm"),
        ]))
        .expect("config should load");
        assert_eq!(config.timeout_ms, 2_500);
        assert_eq!(config.notes_dir, PathBuf::from("/tmp/vault"));
        assert_eq!(config.alert_tag, "kursalarm");
    }
}
