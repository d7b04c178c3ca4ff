use fintrack_market_data::{MarketDataError, RetryClass};
use thiserror::Error;

/// Errors of the exchange-rate subsystem.
///
/// `Network`, `Parse`, `SymbolNotQuoted`, `InvalidRate` and `Source` describe a
/// failed call to the rate source; the resolver absorbs them by falling back
/// to cached data. `UnsupportedCurrency` and `RateUnavailable` reach callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("Currency '{0}' is not supported")]
    UnsupportedCurrency(String),

    #[error("Rate source unreachable: {0}")]
    Network(String),

    #[error("Rate source returned malformed data: {0}")]
    Parse(String),

    #[error("Rate source did not quote {0}")]
    SymbolNotQuoted(String),

    #[error("Rate source rejected the request: {0}")]
    Source(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    #[error("Exchange rate {from}/{to} unavailable: {reason}")]
    RateUnavailable {
        from: String,
        to: String,
        reason: String,
    },
}

impl FxError {
    /// True when the error came from fetching rates rather than from the input.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            FxError::Network(_)
                | FxError::Parse(_)
                | FxError::SymbolNotQuoted(_)
                | FxError::Source(_)
                | FxError::InvalidRate(_)
        )
    }

    /// True when repeating the same fetch may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FxError::Network(_))
    }
}

impl From<MarketDataError> for FxError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::SymbolNotFound(symbol) => FxError::SymbolNotQuoted(symbol),
            MarketDataError::Parse { .. } => FxError::Parse(err.to_string()),
            MarketDataError::UnsupportedBase { .. } => FxError::Source(err.to_string()),
            other => match other.retry_class() {
                RetryClass::Transient => FxError::Network(other.to_string()),
                RetryClass::Never => FxError::Source(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_errors_map_to_source_failures() {
        let err: FxError = MarketDataError::Timeout {
            provider: "CBR".to_string(),
        }
        .into();
        assert_eq!(err, FxError::Network("Timeout: CBR".to_string()));
        assert!(err.is_transient());

        let err: FxError = MarketDataError::SymbolNotFound("USD".to_string()).into();
        assert_eq!(err, FxError::SymbolNotQuoted("USD".to_string()));
        assert!(err.is_source_failure());
        assert!(!err.is_transient());

        let err: FxError = MarketDataError::Parse {
            provider: "CBR".to_string(),
            message: "eof".to_string(),
        }
        .into();
        assert!(matches!(err, FxError::Parse(_)));
    }

    #[test]
    fn test_input_errors_are_not_source_failures() {
        assert!(!FxError::UnsupportedCurrency("CHF".to_string()).is_source_failure());
        let unavailable = FxError::RateUnavailable {
            from: "USD".to_string(),
            to: "RUB".to_string(),
            reason: "offline".to_string(),
        };
        assert!(!unavailable.is_source_failure());
        assert_eq!(
            unavailable.to_string(),
            "Exchange rate USD/RUB unavailable: offline"
        );
    }
}
