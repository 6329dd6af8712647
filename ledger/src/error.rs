use std::fmt;

use mchain_store::StoreError;
use mchain_types::{AccountId, TokenAmount};
use thiserror::Error;

/// Which argument of an operation carried the null account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressRole {
    Caller,
    Recipient,
    Holder,
    Custodian,
    Owner,
    Spender,
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Caller => "caller",
            Self::Recipient => "recipient",
            Self::Holder => "holder",
            Self::Custodian => "custodian",
            Self::Owner => "owner",
            Self::Spender => "spender",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid address: {role} is the null account")]
    InvalidAddress { role: AddressRole },

    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("batch length mismatch: {recipients} recipients, {amounts} amounts")]
    LengthMismatch { recipients: usize, amounts: usize },

    #[error("insufficient allowance from {owner} to {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("{caller} is not authorized: {reason}")]
    Unauthorized { caller: AccountId, reason: String },

    #[error("initial supply {initial_amount} x 10^{decimals} does not fit in u128")]
    SupplyOverflow { initial_amount: u128, decimals: u8 },

    #[error("supply mismatch: recorded {recorded}, balances sum to {actual}")]
    SupplyMismatch {
        recorded: TokenAmount,
        actual: TokenAmount,
    },

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientBalance {
                account,
                needed,
                available,
            } => Self::InsufficientBalance {
                account,
                needed,
                available,
            },
            StoreError::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            } => Self::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            },
            other => Self::Store(other),
        }
    }
}

/// Reject the null account in `role`.
pub(crate) fn require_non_null(account: &AccountId, role: AddressRole) -> Result<(), LedgerError> {
    if account.is_null() {
        return Err(LedgerError::InvalidAddress { role });
    }
    Ok(())
}
