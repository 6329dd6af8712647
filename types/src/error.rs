//! Errors raised while parsing or building fundamental types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account id {input:?}: {reason}")]
    InvalidAccountId { input: String, reason: String },

    #[error("decimals {0} do not fit a u128 scale factor")]
    DecimalsTooLarge(u8),
}
