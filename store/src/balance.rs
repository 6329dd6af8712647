//! Account balance storage trait.

use crate::StoreError;
use mchain_types::{AccountId, TokenAmount};

/// Mapping from account to non-negative balance.
///
/// Unknown accounts read as zero. Entries are never removed; a zero balance
/// is a valid steady state.
pub trait BalanceStore {
    fn balance(&self, account: &AccountId) -> TokenAmount;
    fn set_balance(&mut self, account: &AccountId, amount: TokenAmount) -> Result<(), StoreError>;

    /// Every recorded account with its balance, in account order.
    fn accounts(&self) -> Vec<(AccountId, TokenAmount)>;

    fn account_count(&self) -> usize {
        self.accounts().len()
    }

    fn credit(&mut self, account: &AccountId, amount: TokenAmount) -> Result<(), StoreError> {
        let next = self
            .balance(account)
            .checked_add(amount)
            .ok_or(StoreError::Overflow { account: *account })?;
        self.set_balance(account, next)
    }

    fn debit(&mut self, account: &AccountId, amount: TokenAmount) -> Result<(), StoreError> {
        let available = self.balance(account);
        let next = available
            .checked_sub(amount)
            .ok_or(StoreError::InsufficientBalance {
                account: *account,
                needed: amount,
                available,
            })?;
        self.set_balance(account, next)
    }
}
