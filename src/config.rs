//! Runtime configuration from environment variables.
//!
//! HOST (default 0.0.0.0), PORT (default 8080), BRACKET_SWEEP_LIMIT (default 1024).

use std::str::FromStr;

pub const DEFAULT_SWEEP_LIMIT: usize = 1024;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Maximum auto-advance steps per operation before the sweep gives up.
    pub sweep_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            sweep_limit: DEFAULT_SWEEP_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing or blank values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            host: value("HOST").unwrap_or(defaults.host),
            port: parse_or(value("PORT"), "PORT", defaults.port),
            sweep_limit: parse_or(value("BRACKET_SWEEP_LIMIT"), "BRACKET_SWEEP_LIMIT", defaults.sweep_limit),
        }
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
