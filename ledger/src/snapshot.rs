//! Ledger snapshots: the full state of a ledger at a point in time.
//!
//! A snapshot carries the metadata, every balance and allowance, the supply
//! and the event log, sealed with a Blake2b-256 hash computed deterministically
//! from that content. [`LedgerSnapshot::verify`] checks the hash and the
//! ledger invariants before anything is restored from it.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use mchain_store::AllowanceRecord;
use mchain_types::{AccountId, TokenAmount, TokenMetadata};

use crate::event::{EventRecord, LedgerEvent};
use crate::LedgerError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Format version.
    pub version: u32,
    /// Blake2b-256 over everything below.
    pub hash: [u8; 32],
    pub metadata: TokenMetadata,
    pub ledger_id: AccountId,
    pub custodian: AccountId,
    pub total_supply: TokenAmount,
    /// Balances in account order.
    pub balances: Vec<(AccountId, TokenAmount)>,
    pub allowances: Vec<AllowanceRecord>,
    pub events: Vec<EventRecord>,
}

impl LedgerSnapshot {
    pub fn create(
        metadata: TokenMetadata,
        ledger_id: AccountId,
        custodian: AccountId,
        total_supply: TokenAmount,
        balances: Vec<(AccountId, TokenAmount)>,
        allowances: Vec<AllowanceRecord>,
        events: Vec<EventRecord>,
    ) -> Self {
        let mut snap = Self {
            version: SNAPSHOT_VERSION,
            hash: [0u8; 32],
            metadata,
            ledger_id,
            custodian,
            total_supply,
            balances,
            allowances,
            events,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.metadata.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.metadata.symbol.as_bytes());
        hasher.update([0u8, self.metadata.decimals]);
        hasher.update(self.ledger_id.as_bytes());
        hasher.update(self.custodian.as_bytes());
        hasher.update(self.total_supply.raw().to_le_bytes());

        hasher.update((self.balances.len() as u64).to_le_bytes());
        for (account, amount) in &self.balances {
            hasher.update(account.as_bytes());
            hasher.update(amount.raw().to_le_bytes());
        }

        hasher.update((self.allowances.len() as u64).to_le_bytes());
        for record in &self.allowances {
            hasher.update(record.owner.as_bytes());
            hasher.update(record.spender.as_bytes());
            hasher.update(record.amount.raw().to_le_bytes());
        }

        hasher.update((self.events.len() as u64).to_le_bytes());
        for record in &self.events {
            hasher.update(record.sequence.to_le_bytes());
            let (tag, a, b, amount) = match &record.event {
                LedgerEvent::Transfer { from, to, amount } => (0u8, from, to, amount),
                LedgerEvent::Approval {
                    owner,
                    spender,
                    amount,
                } => (1, owner, spender, amount),
                LedgerEvent::BulkTransferCompleted {
                    ledger,
                    sender,
                    total,
                } => (2, ledger, sender, total),
            };
            hasher.update([tag]);
            hasher.update(a.as_bytes());
            hasher.update(b.as_bytes());
            hasher.update(amount.raw().to_le_bytes());
        }

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Check the hash, the format version and the ledger invariants: balances
    /// sum to the supply, the null account holds nothing and the event log is
    /// numbered `0..n`.
    pub fn verify(&self) -> Result<(), LedgerError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        if self.hash != self.compute_hash() {
            return Err(LedgerError::Snapshot("hash mismatch".into()));
        }
        if self
            .balances
            .iter()
            .any(|(account, amount)| account.is_null() && !amount.is_zero())
        {
            return Err(LedgerError::Snapshot(
                "null account holds a balance".into(),
            ));
        }
        let actual = TokenAmount::checked_sum(self.balances.iter().map(|(_, amount)| *amount));
        if actual != Some(self.total_supply) {
            return Err(LedgerError::SupplyMismatch {
                recorded: self.total_supply,
                actual: actual.unwrap_or(TokenAmount::MAX),
            });
        }
        let contiguous = self
            .events
            .iter()
            .enumerate()
            .all(|(i, r)| r.sequence == i as u64);
        if !contiguous {
            return Err(LedgerError::Snapshot(
                "event sequence is not contiguous".into(),
            ));
        }
        Ok(())
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Deserialize a snapshot from bytes. The result is not yet verified.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}
