//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for all provider operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching exchange rates.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method. Callers own the retry policy;
/// providers never retry on their own.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A requested symbol is missing from the provider response.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider cannot quote against the requested home currency.
    #[error("Provider {provider} does not quote against {base}")]
    UnsupportedBase {
        /// The provider that rejected the base
        provider: String,
        /// The requested home currency
        base: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with an error status or an explicit failure flag.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The response body could not be understood.
    #[error("Malformed response from {provider}: {message}")]
    Parse {
        /// The provider that sent the body
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use fintrack_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Timeout { provider: "CBR".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Transient);
    ///
    /// let error = MarketDataError::SymbolNotFound("XYZ".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolNotFound(_) | Self::UnsupportedBase { .. } | Self::Parse { .. } => {
                RetryClass::Never
            }

            Self::Timeout { .. } | Self::ProviderError { .. } => RetryClass::Transient,

            Self::Network(e) => {
                if e.is_decode() || e.is_builder() {
                    RetryClass::Never
                } else {
                    RetryClass::Transient
                }
            }
        }
    }

    /// Maps a reqwest error, separating timeouts from other network faults.
    pub fn from_request(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_never_retries() {
        let error = MarketDataError::SymbolNotFound("USD".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_parse_never_retries() {
        let error = MarketDataError::Parse {
            provider: "CBR".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_unsupported_base_never_retries() {
        let error = MarketDataError::UnsupportedBase {
            provider: "CBR".to_string(),
            base: "USD".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_timeout_is_transient() {
        let error = MarketDataError::Timeout {
            provider: "EXCHANGERATE_HOST".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Transient);
    }

    #[test]
    fn test_provider_error_is_transient() {
        let error = MarketDataError::ProviderError {
            provider: "CBR".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Transient);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::UnsupportedBase {
            provider: "CBR".to_string(),
            base: "EUR".to_string(),
        };
        assert_eq!(error.to_string(), "Provider CBR does not quote against EUR");
    }
}
