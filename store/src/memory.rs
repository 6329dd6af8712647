//! In-memory storage backends.
//!
//! Not internally synchronized: the ledger owns these behind its own lock.

use std::collections::BTreeMap;

use crate::{AllowanceRecord, AllowanceStore, BalanceStore, StoreError};
use mchain_types::{AccountId, TokenAmount};

/// Ordered in-memory balance map.
#[derive(Clone, Debug, Default)]
pub struct MemoryBalanceStore {
    balances: BTreeMap<AccountId, TokenAmount>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing `(account, balance)` pairs.
    pub fn from_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (AccountId, TokenAmount)>,
    {
        Self {
            balances: balances.into_iter().collect(),
        }
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn balance(&self, account: &AccountId) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(TokenAmount::ZERO)
    }

    fn set_balance(&mut self, account: &AccountId, amount: TokenAmount) -> Result<(), StoreError> {
        self.balances.insert(*account, amount);
        Ok(())
    }

    fn accounts(&self) -> Vec<(AccountId, TokenAmount)> {
        self.balances.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn account_count(&self) -> usize {
        self.balances.len()
    }
}

/// In-memory allowance map keyed by `(owner, spender)`.
#[derive(Clone, Debug, Default)]
pub struct MemoryAllowanceStore {
    allowances: BTreeMap<(AccountId, AccountId), TokenAmount>,
}

impl MemoryAllowanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = AllowanceRecord>,
    {
        Self {
            allowances: records
                .into_iter()
                .map(|r| ((r.owner, r.spender), r.amount))
                .collect(),
        }
    }
}

impl AllowanceStore for MemoryAllowanceStore {
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    fn set_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), StoreError> {
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    fn allowances(&self) -> Vec<AllowanceRecord> {
        self.allowances
            .iter()
            .map(|((owner, spender), amount)| AllowanceRecord {
                owner: *owner,
                spender: *spender,
                amount: *amount,
            })
            .collect()
    }
}
