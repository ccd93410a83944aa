//! Service configuration loaded from the environment.
//!
//! Supported env vars (all optional):
//! - `PARSE_VIDEO_BIND` (default `0.0.0.0:7777`)
//! - `PARSE_VIDEO_REQUEST_TIMEOUT_SECS` (default 30)
//! - `PARSE_VIDEO_RELAY_TIMEOUT_SECS` (default 20)
//! - `PARSE_VIDEO_RETRY_MAX_ATTEMPTS` (default 10)
//! - `PARSE_VIDEO_RETRY_BACKOFF_MIN_MS` / `PARSE_VIDEO_RETRY_BACKOFF_MAX_MS` (default 100 / 300)
//! - `PARSE_VIDEO_SHUTDOWN_GRACE_SECS` (default 5)

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use share_parser::ParserConfig;
use share_parser::extractor::retry::RetryPolicy;
use share_parser::relay::RelayConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub request_timeout: Duration,
    pub relay_timeout: Duration,
    pub retry: RetryPolicy,
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 7777)),
            request_timeout: Duration::from_secs(30),
            relay_timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset or blank
    /// variables keep their defaults; malformed ones are an error naming
    /// the variable.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind = parse_or(var("PARSE_VIDEO_BIND"), "PARSE_VIDEO_BIND", defaults.bind)?;
        let request_timeout = secs_or(
            var("PARSE_VIDEO_REQUEST_TIMEOUT_SECS"),
            "PARSE_VIDEO_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout,
        )?;
        let relay_timeout = secs_or(
            var("PARSE_VIDEO_RELAY_TIMEOUT_SECS"),
            "PARSE_VIDEO_RELAY_TIMEOUT_SECS",
            defaults.relay_timeout,
        )?;
        let shutdown_grace = secs_or(
            var("PARSE_VIDEO_SHUTDOWN_GRACE_SECS"),
            "PARSE_VIDEO_SHUTDOWN_GRACE_SECS",
            defaults.shutdown_grace,
        )?;

        let max_attempts = parse_or(
            var("PARSE_VIDEO_RETRY_MAX_ATTEMPTS"),
            "PARSE_VIDEO_RETRY_MAX_ATTEMPTS",
            defaults.retry.max_attempts,
        )?;
        let min_backoff = millis_or(
            var("PARSE_VIDEO_RETRY_BACKOFF_MIN_MS"),
            "PARSE_VIDEO_RETRY_BACKOFF_MIN_MS",
            defaults.retry.min_backoff,
        )?;
        let max_backoff = millis_or(
            var("PARSE_VIDEO_RETRY_BACKOFF_MAX_MS"),
            "PARSE_VIDEO_RETRY_BACKOFF_MAX_MS",
            defaults.retry.max_backoff,
        )?;
        if max_backoff < min_backoff {
            bail!(
                "PARSE_VIDEO_RETRY_BACKOFF_MAX_MS ({}) is below PARSE_VIDEO_RETRY_BACKOFF_MIN_MS ({})",
                max_backoff.as_millis(),
                min_backoff.as_millis()
            );
        }

        Ok(Self {
            bind,
            request_timeout,
            relay_timeout,
            retry: RetryPolicy::new(max_attempts, min_backoff, max_backoff),
            shutdown_grace,
        })
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            timeout: self.request_timeout,
            retry: self.retry.clone(),
            ..ParserConfig::default()
        }
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            timeout: self.relay_timeout,
            ..RelayConfig::default()
        }
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        None => Ok(default),
    }
}

fn secs_or(raw: Option<String>, name: &str, default: Duration) -> anyhow::Result<Duration> {
    Ok(raw
        .map(|raw| parse_or(Some(raw), name, 0u64))
        .transpose()?
        .map_or(default, Duration::from_secs))
}

fn millis_or(raw: Option<String>, name: &str, default: Duration) -> anyhow::Result<Duration> {
    Ok(raw
        .map(|raw| parse_or(Some(raw), name, 0u64))
        .transpose()?
        .map_or(default, Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:7777");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.relay_timeout, Duration::from_secs(20));
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    fn overrides_are_applied() {
        let config = from_vars(&[
            ("PARSE_VIDEO_BIND", "127.0.0.1:8080"),
            ("PARSE_VIDEO_RETRY_MAX_ATTEMPTS", "3"),
            ("PARSE_VIDEO_RETRY_BACKOFF_MIN_MS", "10"),
            ("PARSE_VIDEO_RETRY_BACKOFF_MAX_MS", "20"),
            ("PARSE_VIDEO_RELAY_TIMEOUT_SECS", " 60 "),
            ("PARSE_VIDEO_REQUEST_TIMEOUT_SECS", ""),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(
            config.retry,
            RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(20))
        );
        assert_eq!(config.relay_timeout, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.parser_config().timeout, Duration::from_secs(30));
        assert_eq!(config.relay_config().timeout, Duration::from_secs(60));
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = from_vars(&[("PARSE_VIDEO_RETRY_MAX_ATTEMPTS", "many")]).unwrap_err();
        assert!(err.to_string().contains("PARSE_VIDEO_RETRY_MAX_ATTEMPTS"), "{err}");

        let err = from_vars(&[("PARSE_VIDEO_BIND", "nowhere")]).unwrap_err();
        assert!(err.to_string().contains("PARSE_VIDEO_BIND"), "{err}");
    }

    #[test]
    fn inverted_backoff_is_rejected() {
        let err = from_vars(&[
            ("PARSE_VIDEO_RETRY_BACKOFF_MIN_MS", "500"),
            ("PARSE_VIDEO_RETRY_BACKOFF_MAX_MS", "100"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("BACKOFF_MAX_MS"), "{err}");
    }
}
