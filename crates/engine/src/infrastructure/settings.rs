//! Environment-driven application configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::dnd5e_api::DEFAULT_DND5E_API_URL;
use crate::infrastructure::storage::default_storage_path;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_DICE_LOG_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage_path: PathBuf,
    pub api_url: String,
    pub http_timeout: Duration,
    pub cache_ttl: Duration,
    /// Maximum dice log entries kept; oldest are dropped first.
    pub dice_log_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            api_url: DEFAULT_DND5E_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            dice_log_limit: DEFAULT_DICE_LOG_LIMIT,
        }
    }
}

impl AppConfig {
    /// Read `QUESTBOARD_*` environment variables, defaulting anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let storage_path = lookup("QUESTBOARD_STORAGE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);
        let api_url = lookup("QUESTBOARD_API_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(defaults.api_url);
        let http_timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "QUESTBOARD_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        ));
        let cache_ttl = Duration::from_secs(parse_or_default(
            &lookup,
            "QUESTBOARD_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        ));
        let dice_log_limit = parse_or_default(
            &lookup,
            "QUESTBOARD_DICE_LOG_LIMIT",
            DEFAULT_DICE_LOG_LIMIT,
        )
        .max(1);

        Self {
            storage_path,
            api_url,
            http_timeout,
            cache_ttl,
            dice_log_limit,
        }
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = %key, value = %raw, "Invalid number, using default");
            default
        }),
    }
}
