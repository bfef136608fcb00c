use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO currency code owned by a budget.
///
/// A budget keeps a single currency for all its accounts; the engine never
/// converts between currencies.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units** (see
/// `MoneyCents`). Every supported currency uses 2 fraction digits, so
/// `10.50 BRL` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
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
        match value.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
