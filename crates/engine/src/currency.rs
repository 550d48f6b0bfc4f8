use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency code carried by an expense and its balances.
///
/// Expenses between the same pair of users may be recorded in different
/// currencies; balances are never converted, they are kept per code.
///
/// Codes are trimmed and normalized to upper case, so `"usd"` and `" USD "`
/// name the same currency. Any non-empty code is accepted (`"USDT"` too).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_uppercase();
        if code.is_empty() {
            return Err(EngineError::InvalidExpense(
                "currency code is empty".to_string(),
            ));
        }
        Ok(Currency(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}
