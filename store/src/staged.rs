//! Staged write set over a [`BalanceStore`].
//!
//! Reads fall through to the underlying store; writes are buffered until
//! [`StagedBalances::commit`]. Dropping the stage discards every buffered write,
//! which is how multi-account operations roll back.

use std::collections::BTreeMap;

use crate::{BalanceStore, StoreError};
use mchain_types::{AccountId, TokenAmount};

pub struct StagedBalances<'a, S: BalanceStore + ?Sized> {
    inner: &'a mut S,
    writes: BTreeMap<AccountId, TokenAmount>,
}

impl<'a, S: BalanceStore + ?Sized> StagedBalances<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            writes: BTreeMap::new(),
        }
    }

    /// Number of accounts with buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Apply every buffered write to the underlying store.
    pub fn commit(self) -> Result<(), StoreError> {
        let Self { inner, writes } = self;
        for (account, amount) in writes {
            inner.set_balance(&account, amount)?;
        }
        Ok(())
    }
}

impl<S: BalanceStore + ?Sized> BalanceStore for StagedBalances<'_, S> {
    fn balance(&self, account: &AccountId) -> TokenAmount {
        match self.writes.get(account) {
            Some(amount) => *amount,
            None => self.inner.balance(account),
        }
    }

    fn set_balance(&mut self, account: &AccountId, amount: TokenAmount) -> Result<(), StoreError> {
        self.writes.insert(*account, amount);
        Ok(())
    }

    fn accounts(&self) -> Vec<(AccountId, TokenAmount)> {
        let mut merged: BTreeMap<AccountId, TokenAmount> =
            self.inner.accounts().into_iter().collect();
        merged.extend(self.writes.iter().map(|(k, v)| (*k, *v)));
        merged.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBalanceStore;

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 20])
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let mut store = MemoryBalanceStore::from_balances([(account(1), TokenAmount::new(100))]);
        {
            let mut stage = StagedBalances::new(&mut store);
            stage.debit(&account(1), TokenAmount::new(30)).unwrap();
            stage.credit(&account(2), TokenAmount::new(30)).unwrap();
            assert_eq!(stage.balance(&account(1)), TokenAmount::new(70));
            assert_eq!(stage.pending_writes(), 2);
        }
        assert_eq!(store.balance(&account(1)), TokenAmount::new(100));
        assert_eq!(store.balance(&account(2)), TokenAmount::ZERO);
    }

    #[test]
    fn commit_applies_writes() {
        let mut store = MemoryBalanceStore::from_balances([(account(1), TokenAmount::new(100))]);
        let mut stage = StagedBalances::new(&mut store);
        stage.debit(&account(1), TokenAmount::new(30)).unwrap();
        stage.credit(&account(2), TokenAmount::new(30)).unwrap();
        stage.commit().unwrap();
        assert_eq!(store.balance(&account(1)), TokenAmount::new(70));
        assert_eq!(store.balance(&account(2)), TokenAmount::new(30));
    }

    #[test]
    fn staged_debits_accumulate() {
        let mut store = MemoryBalanceStore::from_balances([(account(1), TokenAmount::new(50))]);
        let mut stage = StagedBalances::new(&mut store);
        stage.debit(&account(1), TokenAmount::new(30)).unwrap();
        let err = stage.debit(&account(1), TokenAmount::new(30)).unwrap_err();
        assert!(matches!(err, StoreError::InsufficientBalance { .. }));
    }

    #[test]
    fn accounts_merge_overlay() {
        let mut store = MemoryBalanceStore::from_balances([(account(1), TokenAmount::new(50))]);
        let mut stage = StagedBalances::new(&mut store);
        stage.credit(&account(2), TokenAmount::new(5)).unwrap();
        assert_eq!(
            stage.accounts(),
            vec![
                (account(1), TokenAmount::new(50)),
                (account(2), TokenAmount::new(5)),
            ]
        );
    }
}
