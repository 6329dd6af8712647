//! Allowance (approval) storage trait.

use crate::StoreError;
use mchain_types::{AccountId, TokenAmount};
use serde::{Deserialize, Serialize};

/// One approval: `owner` lets `spender` act on up to `amount` of its balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceRecord {
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: TokenAmount,
}

pub trait AllowanceStore {
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount;
    fn set_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), StoreError>;
    fn allowances(&self) -> Vec<AllowanceRecord>;

    /// Reduce an allowance by `amount`, failing if it does not cover it.
    fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), StoreError> {
        let available = self.allowance(owner, spender);
        let next = available
            .checked_sub(amount)
            .ok_or(StoreError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                needed: amount,
                available,
            })?;
        self.set_allowance(owner, spender, next)
    }
}
