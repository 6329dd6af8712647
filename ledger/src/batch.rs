//! Batch transfer plans.
//!
//! A batch is an ordered list of `(recipient, amount)` pairs sent by one
//! caller. The ledger validates the whole plan, runs it against a staged write
//! set and commits only if every entry succeeds.

use serde::{Deserialize, Serialize};

use mchain_store::BalanceStore;
use mchain_types::{AccountId, TokenAmount};

use crate::error::{require_non_null, AddressRole};
use crate::event::EventRecord;
use crate::LedgerError;

/// One leg of a batch transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub to: AccountId,
    pub amount: TokenAmount,
}

/// An ordered batch transfer plan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTransfer {
    entries: Vec<BatchEntry>,
}

impl BatchTransfer {
    /// Pair `recipients[i]` with `amounts[i]`; the slices must be equally long.
    pub fn from_parallel(
        recipients: &[AccountId],
        amounts: &[TokenAmount],
    ) -> Result<Self, LedgerError> {
        if recipients.len() != amounts.len() {
            return Err(LedgerError::LengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }
        Ok(Self::from_pairs(
            recipients.iter().copied().zip(amounts.iter().copied()),
        ))
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (AccountId, TokenAmount)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(to, amount)| BatchEntry { to, amount })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all amounts, `None` if it overflows.
    pub fn total(&self) -> Option<TokenAmount> {
        TokenAmount::checked_sum(self.entries.iter().map(|e| e.amount))
    }

    /// Run every leg in order against `balances`. Stops at the first failing
    /// leg; the caller discards `balances` in that case.
    pub(crate) fn apply<S>(&self, caller: &AccountId, balances: &mut S) -> Result<(), LedgerError>
    where
        S: BalanceStore + ?Sized,
    {
        for entry in &self.entries {
            require_non_null(&entry.to, AddressRole::Recipient)?;
            balances.debit(caller, entry.amount)?;
            balances.credit(&entry.to, entry.amount)?;
        }
        Ok(())
    }
}

/// Outcome of a committed batch transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReceipt {
    pub total: TokenAmount,
    /// One `Transfer` per leg, then the `BulkTransferCompleted` summary.
    pub events: Vec<EventRecord>,
}

impl BatchReceipt {
    /// The `BulkTransferCompleted` record.
    pub fn completion(&self) -> Option<&EventRecord> {
        self.events.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mchain_store::{MemoryBalanceStore, StagedBalances};

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 20])
    }

    #[test]
    fn from_parallel_rejects_length_mismatch() {
        let err = BatchTransfer::from_parallel(&[account(1), account(2)], &[TokenAmount::new(1)])
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::LengthMismatch {
                recipients: 2,
                amounts: 1,
            }
        );
    }

    #[test]
    fn from_parallel_keeps_input_order() {
        let batch = BatchTransfer::from_parallel(
            &[account(2), account(1)],
            &[TokenAmount::new(200), TokenAmount::new(100)],
        )
        .unwrap();
        assert_eq!(batch.entries()[0].to, account(2));
        assert_eq!(batch.entries()[1].amount, TokenAmount::new(100));
        assert_eq!(batch.total(), Some(TokenAmount::new(300)));
    }

    #[test]
    fn empty_batch_totals_zero() {
        let batch = BatchTransfer::from_parallel(&[], &[]).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.total(), Some(TokenAmount::ZERO));
    }

    #[test]
    fn total_overflow_is_none() {
        let batch = BatchTransfer::from_pairs([
            (account(1), TokenAmount::MAX),
            (account(2), TokenAmount::new(1)),
        ]);
        assert_eq!(batch.total(), None);
    }

    #[test]
    fn apply_stops_at_null_recipient_without_touching_store() {
        let mut store = MemoryBalanceStore::from_balances([(account(1), TokenAmount::new(500))]);
        let batch = BatchTransfer::from_pairs([
            (account(2), TokenAmount::new(100)),
            (AccountId::NULL, TokenAmount::new(100)),
        ]);
        {
            let mut stage = StagedBalances::new(&mut store);
            let err = batch.apply(&account(1), &mut stage).unwrap_err();
            assert_eq!(
                err,
                LedgerError::InvalidAddress {
                    role: AddressRole::Recipient,
                }
            );
        }
        assert_eq!(store.balance(&account(1)), TokenAmount::new(500));
        assert_eq!(store.balance(&account(2)), TokenAmount::ZERO);
    }
}
