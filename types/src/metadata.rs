//! Immutable token metadata, fixed at ledger construction.

use serde::{Deserialize, Serialize};

use crate::{TokenAmount, TypesError};

/// Name, symbol and decimal precision of a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Raw units in one whole token (`10^decimals`).
    pub fn unit(&self) -> Result<TokenAmount, TypesError> {
        TokenAmount::from_whole(1, self.decimals).ok_or(TypesError::DecimalsTooLarge(self.decimals))
    }

    /// Render a raw amount as a decimal string with `decimals` fractional digits.
    pub fn format_amount(&self, amount: TokenAmount) -> String {
        let Ok(unit) = self.unit() else {
            return amount.to_string();
        };
        if self.decimals == 0 {
            return amount.to_string();
        }
        let whole = amount.raw() / unit.raw();
        let frac = amount.raw() % unit.raw();
        let frac = format!("{:0width$}", frac, width = usize::from(self.decimals));
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            format!("{whole} {}", self.symbol)
        } else {
            format!("{whole}.{frac} {}", self.symbol)
        }
    }
}
