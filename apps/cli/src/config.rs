use anyhow::{anyhow, bail, Context};
use std::str::FromStr;
use std::time::Duration;

use fintrack_core::fx::{Currency, DEFAULT_FRESHNESS_HOURS};
use fintrack_market_data::DEFAULT_REQUEST_TIMEOUT;

const DEFAULT_DB_PATH: &str = "./db/fintrack.db";

/// Which upstream quotes the home-currency rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateProviderKind {
    Cbr,
    ExchangeRateHost,
}

impl FromStr for RateProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CBR" => Ok(RateProviderKind::Cbr),
            "EXCHANGERATE_HOST" => Ok(RateProviderKind::ExchangeRateHost),
            other => bail!(
                "unknown rate provider '{}' (expected CBR or EXCHANGERATE_HOST)",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub home_currency: Currency,
    pub rate_provider: RateProviderKind,
    /// Provider default when unset.
    pub rate_api_url: Option<String>,
    pub request_timeout: Duration,
    pub rate_ttl: chrono::Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `FT_*` variables, after loading a `.env` file when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = get("FT_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let home_currency = match get("FT_HOME_CURRENCY") {
            Some(code) => code
                .parse::<Currency>()
                .map_err(|e| anyhow!("FT_HOME_CURRENCY: {}", e))?,
            None => Currency::Rub,
        };

        let rate_provider = match get("FT_RATE_PROVIDER") {
            Some(name) => name.parse().context("FT_RATE_PROVIDER")?,
            None => RateProviderKind::Cbr,
        };

        let request_timeout = match get("FT_REQUEST_TIMEOUT_MS") {
            Some(ms) => {
                let ms: u64 = ms
                    .trim()
                    .parse()
                    .with_context(|| format!("FT_REQUEST_TIMEOUT_MS: invalid value '{}'", ms))?;
                if ms == 0 {
                    bail!("FT_REQUEST_TIMEOUT_MS must be greater than zero");
                }
                Duration::from_millis(ms)
            }
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let ttl_hours = match get("FT_RATE_TTL_HOURS") {
            Some(hours) => hours
                .trim()
                .parse::<i64>()
                .with_context(|| format!("FT_RATE_TTL_HOURS: invalid value '{}'", hours))?,
            None => DEFAULT_FRESHNESS_HOURS,
        };
        if !(1..=24 * 365).contains(&ttl_hours) {
            bail!("FT_RATE_TTL_HOURS must be between 1 and 8760, got {}", ttl_hours);
        }

        let log_format = match get("FT_LOG_FORMAT") {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(f) if f.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(f) => bail!("FT_LOG_FORMAT must be 'text' or 'json', got '{}'", f),
            None => LogFormat::Text,
        };

        Ok(Self {
            db_path,
            home_currency,
            rate_provider,
            rate_api_url: get("FT_RATE_API_URL"),
            request_timeout,
            rate_ttl: chrono::Duration::hours(ttl_hours),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.home_currency, Currency::Rub);
        assert_eq!(config.rate_provider, RateProviderKind::Cbr);
        assert_eq!(config.rate_api_url, None);
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.rate_ttl, chrono::Duration::hours(24));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FT_DB_PATH", "/tmp/ft.db"),
            ("FT_HOME_CURRENCY", "usd"),
            ("FT_RATE_PROVIDER", "exchangerate_host"),
            ("FT_RATE_API_URL", "http://localhost:8080"),
            ("FT_REQUEST_TIMEOUT_MS", "1500"),
            ("FT_RATE_TTL_HOURS", "6"),
            ("FT_LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.db_path, "/tmp/ft.db");
        assert_eq!(config.home_currency, Currency::Usd);
        assert_eq!(config.rate_provider, RateProviderKind::ExchangeRateHost);
        assert_eq!(config.rate_api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.rate_ttl, chrono::Duration::hours(6));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("FT_HOME_CURRENCY", "XYZ")]).is_err());
        assert!(config_from(&[("FT_RATE_PROVIDER", "yahoo")]).is_err());
        assert!(config_from(&[("FT_REQUEST_TIMEOUT_MS", "soon")]).is_err());
        assert!(config_from(&[("FT_REQUEST_TIMEOUT_MS", "0")]).is_err());
        assert!(config_from(&[("FT_RATE_TTL_HOURS", "0")]).is_err());
        assert!(config_from(&[("FT_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("FT_DB_PATH", "  "), ("FT_RATE_API_URL", "")]).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.rate_api_url, None);
    }
}
