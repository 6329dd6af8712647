//! Pluggable authorization for operations that act on behalf of an account.
//!
//! Transfers need no authorization beyond the explicit caller identity. Burns
//! from another holder and (optionally) batch transfers are checked here. An
//! authorizer only inspects state; when it approves an action against an
//! allowance it returns the [`AllowanceCharge`] the ledger must consume when
//! the operation commits.

use mchain_store::AllowanceStore;
use mchain_types::{AccountId, TokenAmount};

use crate::LedgerError;

/// Allowance consumed by an authorized operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowanceCharge {
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: TokenAmount,
}

pub trait Authorizer: Send + Sync {
    /// Short policy name for logs.
    fn name(&self) -> &'static str;

    /// May `caller` burn `amount` from `holder`?
    fn authorize_burn(
        &self,
        caller: &AccountId,
        holder: &AccountId,
        amount: TokenAmount,
        allowances: &dyn AllowanceStore,
    ) -> Result<Option<AllowanceCharge>, LedgerError>;

    /// May `caller` run a batch transfer of `total` through `ledger`?
    fn authorize_batch(
        &self,
        caller: &AccountId,
        ledger: &AccountId,
        total: TokenAmount,
        allowances: &dyn AllowanceStore,
    ) -> Result<Option<AllowanceCharge>, LedgerError>;
}

/// Charge `amount` against the allowance `owner` gave `spender`.
///
/// A spender with no allowance at all is unauthorized; one with too small an
/// allowance gets `InsufficientAllowance`.
fn require_allowance(
    allowances: &dyn AllowanceStore,
    owner: &AccountId,
    spender: &AccountId,
    amount: TokenAmount,
) -> Result<AllowanceCharge, LedgerError> {
    let available = allowances.allowance(owner, spender);
    if available.is_zero() && !amount.is_zero() {
        return Err(LedgerError::Unauthorized {
            caller: *spender,
            reason: format!("no allowance from {owner}"),
        });
    }
    if available < amount {
        return Err(LedgerError::InsufficientAllowance {
            owner: *owner,
            spender: *spender,
            needed: amount,
            available,
        });
    }
    Ok(AllowanceCharge {
        owner: *owner,
        spender: *spender,
        amount,
    })
}

/// Holders act on their own balance freely; anyone else burns only through
/// an allowance. Batch transfers need no approval.
#[derive(Clone, Copy, Debug, Default)]
pub struct HolderAuthority;

impl Authorizer for HolderAuthority {
    fn name(&self) -> &'static str {
        "holder-authority"
    }

    fn authorize_burn(
        &self,
        caller: &AccountId,
        holder: &AccountId,
        amount: TokenAmount,
        allowances: &dyn AllowanceStore,
    ) -> Result<Option<AllowanceCharge>, LedgerError> {
        if caller == holder {
            return Ok(None);
        }
        require_allowance(allowances, holder, caller, amount).map(Some)
    }

    fn authorize_batch(
        &self,
        _caller: &AccountId,
        _ledger: &AccountId,
        _total: TokenAmount,
        _allowances: &dyn AllowanceStore,
    ) -> Result<Option<AllowanceCharge>, LedgerError> {
        Ok(None)
    }
}

/// [`HolderAuthority`] plus self-approval for batches: the caller must have
/// approved the ledger id for at least the batch total, and the approval is
/// consumed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApprovedBatches;

impl Authorizer for ApprovedBatches {
    fn name(&self) -> &'static str {
        "approved-batches"
    }

    fn authorize_burn(
        &self,
        caller: &AccountId,
        holder: &AccountId,
        amount: TokenAmount,
        allowances: &dyn AllowanceStore,
    ) -> Result<Option<AllowanceCharge>, LedgerError> {
        HolderAuthority.authorize_burn(caller, holder, amount, allowances)
    }

    fn authorize_batch(
        &self,
        caller: &AccountId,
        ledger: &AccountId,
        total: TokenAmount,
        allowances: &dyn AllowanceStore,
    ) -> Result<Option<AllowanceCharge>, LedgerError> {
        require_allowance(allowances, caller, ledger, total).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mchain_store::MemoryAllowanceStore;

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 20])
    }

    fn allowances_with(owner: u8, spender: u8, amount: u128) -> MemoryAllowanceStore {
        let mut store = MemoryAllowanceStore::new();
        store
            .set_allowance(&account(owner), &account(spender), TokenAmount::new(amount))
            .unwrap();
        store
    }

    #[test]
    fn holder_burns_own_balance_without_charge() {
        let store = MemoryAllowanceStore::new();
        let charge = HolderAuthority
            .authorize_burn(&account(1), &account(1), TokenAmount::new(10), &store)
            .unwrap();
        assert_eq!(charge, None);
    }

    #[test]
    fn delegated_burn_charges_allowance() {
        let store = allowances_with(1, 2, 50);
        let charge = HolderAuthority
            .authorize_burn(&account(2), &account(1), TokenAmount::new(40), &store)
            .unwrap();
        assert_eq!(
            charge,
            Some(AllowanceCharge {
                owner: account(1),
                spender: account(2),
                amount: TokenAmount::new(40),
            })
        );
    }

    #[test]
    fn delegated_burn_without_allowance_is_rejected() {
        let store = MemoryAllowanceStore::new();
        let err = HolderAuthority
            .authorize_burn(&account(2), &account(1), TokenAmount::new(1), &store)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { caller, .. } if caller == account(2)));
    }

    #[test]
    fn delegated_burn_above_allowance_is_rejected() {
        let store = allowances_with(1, 2, 5);
        let err = HolderAuthority
            .authorize_burn(&account(2), &account(1), TokenAmount::new(6), &store)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    }

    #[test]
    fn holder_authority_allows_any_batch() {
        let store = MemoryAllowanceStore::new();
        let charge = HolderAuthority
            .authorize_batch(&account(1), &account(9), TokenAmount::new(1_000), &store)
            .unwrap();
        assert_eq!(charge, None);
    }

    #[test]
    fn approved_batches_require_self_approval() {
        let store = allowances_with(1, 9, 300);
        let charge = ApprovedBatches
            .authorize_batch(&account(1), &account(9), TokenAmount::new(300), &store)
            .unwrap();
        assert_eq!(charge.map(|c| c.amount), Some(TokenAmount::new(300)));

        let err = ApprovedBatches
            .authorize_batch(&account(1), &account(9), TokenAmount::new(301), &store)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientAllowance {
                owner: account(1),
                spender: account(9),
                needed: TokenAmount::new(301),
                available: TokenAmount::new(300),
            }
        );
    }
}
