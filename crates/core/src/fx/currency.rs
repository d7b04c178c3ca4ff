use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::FxError;

/// The closed set of currencies the tracker understands.
///
/// Codes are always uppercase ISO 4217. Anything else is rejected with
/// [`FxError::UnsupportedCurrency`] instead of being carried around as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    Gbp,
    Cny,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Rub,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cny,
        Currency::Jpy,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cny => "CNY",
            Currency::Jpy => "JPY",
        }
    }

    /// Every supported currency except `home`.
    pub fn foreign_to(home: Currency) -> impl Iterator<Item = Currency> {
        Self::ALL.into_iter().filter(move |c| *c != home)
    }
}

impl FromStr for Currency {
    type Err = FxError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let normalized = code.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == normalized)
            .ok_or_else(|| FxError::UnsupportedCurrency(code.trim().to_string()))
    }
}

impl TryFrom<&str> for Currency {
    type Error = FxError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
