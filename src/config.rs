use crate::models::CategorySet;
use crate::scoring::DEFAULT_LEADERBOARD_SIZE;
use crate::selector::SelectionPolicy;
use crate::session::SessionOptions;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const POLICY_VAR: &str = "RANKEM_POLICY";
pub const CATEGORIES_VAR: &str = "RANKEM_CATEGORIES";
pub const SEED_PATH_VAR: &str = "RANKEM_SEED_PATH";
pub const LEADERBOARD_SIZE_VAR: &str = "RANKEM_LEADERBOARD_SIZE";
pub const DELAY_VAR: &str = "RANKEM_DELAY_MS";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub policy: SelectionPolicy,
    pub categories: CategorySet,
    pub seed_path: Option<PathBuf>,
    pub leaderboard_size: usize,
    pub delay: Duration,
}

impl Config {
    /// Reads settings from the process environment. Call `dotenvy::dotenv()`
    /// first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let policy = match get(POLICY_VAR) {
            Some(raw) => raw.parse::<SelectionPolicy>().map_err(|message| ConfigError::Invalid {
                var: POLICY_VAR,
                message,
            })?,
            None => SelectionPolicy::Rotation,
        };

        let categories = match get(CATEGORIES_VAR) {
            Some(raw) => parse_categories(&raw)?,
            None => CategorySet::classic(),
        };

        let leaderboard_size = match get(LEADERBOARD_SIZE_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size >= 1 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: LEADERBOARD_SIZE_VAR,
                        message: format!("expected a positive integer, got '{}'", raw),
                    });
                }
            },
            None => DEFAULT_LEADERBOARD_SIZE,
        };

        let delay = match get(DELAY_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    var: DELAY_VAR,
                    message: format!("expected milliseconds, got '{}'", raw),
                })?,
            None => SessionOptions::for_policy(policy).delay,
        };

        Ok(Self {
            policy,
            categories,
            seed_path: get(SEED_PATH_VAR).map(PathBuf::from),
            leaderboard_size,
            delay,
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            policy: self.policy,
            leaderboard_size: self.leaderboard_size,
            delay: self.delay,
        }
    }
}

fn parse_categories(raw: &str) -> Result<CategorySet, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "classic" => Ok(CategorySet::classic()),
        "compact" => Ok(CategorySet::compact()),
        _ => CategorySet::new(raw.split(',')).map_err(|e| ConfigError::Invalid {
            var: CATEGORIES_VAR,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_rotation_with_classic_categories() {
        let config = config_from(&[]).expect("defaults are valid");
        assert_eq!(config.policy, SelectionPolicy::Rotation);
        assert_eq!(config.categories, CategorySet::classic());
        assert_eq!(config.leaderboard_size, 10);
        assert_eq!(config.delay, Duration::from_millis(2000));
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn cyclic_policy_uses_its_own_delay() {
        let config = config_from(&[(POLICY_VAR, "cyclic"), (CATEGORIES_VAR, "compact")])
            .expect("valid");
        assert_eq!(config.policy, SelectionPolicy::Cyclic);
        assert_eq!(config.delay, Duration::from_millis(1500));
        assert_eq!(config.categories.len(), 3);
    }

    #[test]
    fn custom_categories_and_overrides() {
        let config = config_from(&[
            (CATEGORIES_VAR, "wit, style ,kindness"),
            (LEADERBOARD_SIZE_VAR, "5"),
            (DELAY_VAR, "250"),
            (SEED_PATH_VAR, "seed.json"),
        ])
        .expect("valid");
        assert_eq!(config.categories.iter().collect::<Vec<_>>(), ["wit", "style", "kindness"]);
        assert_eq!(config.session_options().leaderboard_size, 5);
        assert_eq!(config.delay, Duration::from_millis(250));
        assert_eq!(config.seed_path, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[(POLICY_VAR, "random")]).is_err());
        assert!(config_from(&[(LEADERBOARD_SIZE_VAR, "0")]).is_err());
        assert!(config_from(&[(DELAY_VAR, "soon")]).is_err());
        assert!(config_from(&[(CATEGORIES_VAR, "wit,wit")]).is_err());
    }
}
