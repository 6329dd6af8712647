//! Audit log and subscriber fan-out for ledger events.
//!
//! Every committed operation appends one or more [`EventRecord`]s. Sequence
//! numbers start at zero (the genesis mint) and increase by one; records are
//! never mutated or reordered once appended.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::warn;

use mchain_types::{AccountId, TokenAmount};

/// A balance- or allowance-affecting event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Value moved from `from` to `to`. Mints come from the null account and
    /// burns go to it.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: TokenAmount,
    },
    /// `owner` set the allowance of `spender` to `amount`.
    Approval {
        owner: AccountId,
        spender: AccountId,
        amount: TokenAmount,
    },
    /// A batch transfer by `sender` completed, moving `total` in all.
    BulkTransferCompleted {
        ledger: AccountId,
        sender: AccountId,
        total: TokenAmount,
    },
}

impl LedgerEvent {
    pub fn is_burn(&self) -> bool {
        matches!(self, Self::Transfer { to, .. } if to.is_null())
    }

    pub fn is_mint(&self) -> bool {
        matches!(self, Self::Transfer { from, .. } if from.is_null())
    }
}

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: LedgerEvent,
}

/// Append-only, ordered event log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from records that must be numbered `0..n` in order.
    pub fn from_records(records: Vec<EventRecord>) -> Option<Self> {
        let contiguous = records
            .iter()
            .enumerate()
            .all(|(i, r)| r.sequence == i as u64);
        contiguous.then_some(Self { records })
    }

    /// Append an event and return its record.
    pub fn append(&mut self, event: LedgerEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.next_sequence(),
            event,
        };
        self.records.push(record.clone());
        record
    }

    pub fn next_sequence(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.records.len());
        &self.records[start..]
    }
}

type Listener = Box<dyn Fn(&EventRecord) + Send + Sync>;

/// Synchronous fan-out to event listeners.
///
/// Listeners run inline on the committing thread while the ledger lock is
/// held; they must be fast and must not call back into the ledger. A
/// panicking listener is logged and skipped; the remaining listeners still
/// see the record.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, record: &EventRecord) {
        for (index, listener) in self.listeners.iter().enumerate() {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(record))).is_err() {
                warn!(listener = index, sequence = record.sequence, "event listener panicked");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
