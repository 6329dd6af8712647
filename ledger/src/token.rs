//! The token ledger.
//!
//! Balances, allowances, total supply, the event log and subscribers live
//! behind one mutex. Every public operation takes the lock for its whole
//! duration, validates all preconditions, stages its writes and only then
//! commits and emits events. A rejected operation leaves the ledger exactly
//! as it was.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use mchain_store::{
    AllowanceStore, BalanceStore, MemoryAllowanceStore, MemoryBalanceStore, StagedBalances,
};
use mchain_types::{AccountId, TokenAmount, TokenMetadata};
use mchain_utils::StatsCounter;
use tracing::{debug, info};

use crate::auth::{AllowanceCharge, Authorizer};
use crate::batch::{BatchReceipt, BatchTransfer};
use crate::config::LedgerConfig;
use crate::error::{require_non_null, AddressRole};
use crate::event::{EventBus, EventLog, EventRecord, LedgerEvent};
use crate::genesis::{derive_ledger_id, genesis_supply};
use crate::ops::Operation;
use crate::snapshot::LedgerSnapshot;
use crate::LedgerError;

pub const STAT_TRANSFERS: &str = "transfers";
pub const STAT_BURNS: &str = "burns";
pub const STAT_BULK_TRANSFERS: &str = "bulk_transfers";
pub const STAT_APPROVALS: &str = "approvals";
pub const STAT_REJECTED: &str = "rejected";

const STAT_NAMES: &[&str] = &[
    STAT_TRANSFERS,
    STAT_BURNS,
    STAT_BULK_TRANSFERS,
    STAT_APPROVALS,
    STAT_REJECTED,
];

struct LedgerState<B, A> {
    balances: B,
    allowances: A,
    total_supply: TokenAmount,
    events: EventLog,
    bus: EventBus,
}

impl<B, A> LedgerState<B, A> {
    /// Append every event of one operation, then notify listeners. The log is
    /// complete before any listener runs.
    fn record_all<I>(&mut self, events: I) -> Vec<EventRecord>
    where
        I: IntoIterator<Item = LedgerEvent>,
    {
        let start = self.events.next_sequence();
        for event in events {
            self.events.append(event);
        }
        let records = self.events.since(start).to_vec();
        for record in &records {
            self.bus.emit(record);
        }
        records
    }

    fn record(&mut self, event: LedgerEvent) -> EventRecord {
        let record = self.events.append(event);
        self.bus.emit(&record);
        record
    }
}

fn spend<A: AllowanceStore>(allowances: &mut A, charge: &AllowanceCharge) -> Result<(), LedgerError> {
    allowances.spend_allowance(&charge.owner, &charge.spender, charge.amount)?;
    Ok(())
}

/// Result of [`TokenLedger::audit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyAudit {
    pub total_supply: TokenAmount,
    /// Accounts with a recorded balance, zero included.
    pub accounts: usize,
    /// Accounts with a non-zero balance.
    pub holders: usize,
}

/// A fungible-token ledger.
///
/// `Send + Sync`; share it across threads with `Arc`.
pub struct TokenLedger<B = MemoryBalanceStore, A = MemoryAllowanceStore> {
    metadata: TokenMetadata,
    ledger_id: AccountId,
    custodian: AccountId,
    authorizer: Box<dyn Authorizer>,
    state: Mutex<LedgerState<B, A>>,
    stats: StatsCounter,
}

impl TokenLedger {
    /// In-memory ledger with the authorization policy chosen by `config`.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Self::new(
            config,
            MemoryBalanceStore::new(),
            MemoryAllowanceStore::new(),
            config.authorizer(),
        )
    }

    /// In-memory ledger restored from a snapshot.
    pub fn restore_in_memory(
        snapshot: &LedgerSnapshot,
        authorizer: Box<dyn Authorizer>,
    ) -> Result<Self, LedgerError> {
        Self::restore(
            snapshot,
            MemoryBalanceStore::new(),
            MemoryAllowanceStore::new(),
            authorizer,
        )
    }
}

impl<B: BalanceStore, A: AllowanceStore> TokenLedger<B, A> {
    /// Construct a ledger and mint the initial supply to the custodian.
    ///
    /// `balances` must be empty. Event 0 is the mint
    /// `Transfer(NULL, custodian, initial_amount * 10^decimals)`.
    pub fn new(
        config: &LedgerConfig,
        mut balances: B,
        allowances: A,
        authorizer: Box<dyn Authorizer>,
    ) -> Result<Self, LedgerError> {
        let custodian = config.custodian()?;
        require_non_null(&custodian, AddressRole::Custodian)?;
        let supply = genesis_supply(config.initial_amount, config.decimals)?;
        if balances.account_count() != 0 {
            return Err(LedgerError::Config(
                "balance store must be empty at genesis".into(),
            ));
        }

        let metadata = config.metadata();
        let ledger_id = config
            .ledger_id
            .unwrap_or_else(|| derive_ledger_id(&metadata, &custodian));
        if ledger_id.is_null() {
            return Err(LedgerError::Config(
                "ledger id must not be the null account".into(),
            ));
        }

        balances.credit(&custodian, supply)?;
        let mut events = EventLog::new();
        events.append(LedgerEvent::Transfer {
            from: AccountId::NULL,
            to: custodian,
            amount: supply,
        });

        info!(
            name = %metadata.name,
            symbol = %metadata.symbol,
            decimals = metadata.decimals,
            %custodian,
            %ledger_id,
            %supply,
            policy = authorizer.name(),
            "token ledger constructed"
        );

        Ok(Self {
            metadata,
            ledger_id,
            custodian,
            authorizer,
            state: Mutex::new(LedgerState {
                balances,
                allowances,
                total_supply: supply,
                events,
                bus: EventBus::new(),
            }),
            stats: StatsCounter::new(STAT_NAMES),
        })
    }

    /// Rebuild a ledger from a verified snapshot into empty stores.
    pub fn restore(
        snapshot: &LedgerSnapshot,
        mut balances: B,
        mut allowances: A,
        authorizer: Box<dyn Authorizer>,
    ) -> Result<Self, LedgerError> {
        snapshot.verify()?;
        if balances.account_count() != 0 {
            return Err(LedgerError::Config(
                "balance store must be empty before restore".into(),
            ));
        }
        let events = EventLog::from_records(snapshot.events.clone())
            .ok_or_else(|| LedgerError::Snapshot("event sequence is not contiguous".into()))?;

        for (account, amount) in &snapshot.balances {
            balances.set_balance(account, *amount)?;
        }
        for record in &snapshot.allowances {
            allowances.set_allowance(&record.owner, &record.spender, record.amount)?;
        }

        info!(
            ledger_id = %snapshot.ledger_id,
            accounts = snapshot.balances.len(),
            events = snapshot.events.len(),
            supply = %snapshot.total_supply,
            "token ledger restored from snapshot"
        );

        Ok(Self {
            metadata: snapshot.metadata.clone(),
            ledger_id: snapshot.ledger_id,
            custodian: snapshot.custodian,
            authorizer,
            state: Mutex::new(LedgerState {
                balances,
                allowances,
                total_supply: snapshot.total_supply,
                events,
                bus: EventBus::new(),
            }),
            stats: StatsCounter::new(STAT_NAMES),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState<B, A>> {
        // Listener panics are caught by the bus, and every operation validates
        // and stages before it writes, so a poisoned guard still holds a
        // consistent ledger.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish<T>(
        &self,
        op: &'static str,
        stat: &'static str,
        caller: &AccountId,
        result: Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        match &result {
            Ok(_) => self.stats.increment(stat),
            Err(err) => {
                self.stats.increment(STAT_REJECTED);
                debug!(op, %caller, error = %err, "operation rejected");
            }
        }
        result
    }

    // ── Metadata ────────────────────────────────────────────────────────

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn ledger_id(&self) -> AccountId {
        self.ledger_id
    }

    pub fn custodian(&self) -> AccountId {
        self.custodian
    }

    pub fn authorizer_name(&self) -> &'static str {
        self.authorizer.name()
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn total_supply(&self) -> TokenAmount {
        self.lock().total_supply
    }

    pub fn balance_of(&self, account: &AccountId) -> TokenAmount {
        self.lock().balances.balance(account)
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount {
        self.lock().allowances.allowance(owner, spender)
    }

    /// Every recorded account with its balance, in account order.
    pub fn accounts(&self) -> Vec<(AccountId, TokenAmount)> {
        self.lock().balances.accounts()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.lock().events.records().to_vec()
    }

    /// Events with `sequence >= from`.
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.lock().events.since(from).to_vec()
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    /// Register a listener called with every event appended from now on.
    ///
    /// Listeners run while the ledger lock is held and must not call back
    /// into the ledger.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        self.lock().bus.subscribe(Box::new(listener));
    }

    /// Operation counters.
    pub fn stats(&self) -> BTreeMap<&'static str, u64> {
        self.stats.snapshot()
    }

    /// Recompute the balance sum and compare it with the recorded supply.
    pub fn audit(&self) -> Result<SupplyAudit, LedgerError> {
        let state = self.lock();
        let accounts = state.balances.accounts();
        let actual = TokenAmount::checked_sum(accounts.iter().map(|(_, amount)| *amount));
        match actual {
            Some(actual) if actual == state.total_supply => Ok(SupplyAudit {
                total_supply: actual,
                accounts: accounts.len(),
                holders: accounts.iter().filter(|(_, a)| !a.is_zero()).count(),
            }),
            actual => Err(LedgerError::SupplyMismatch {
                recorded: state.total_supply,
                actual: actual.unwrap_or(TokenAmount::MAX),
            }),
        }
    }

    /// Capture the full ledger state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.lock();
        LedgerSnapshot::create(
            self.metadata.clone(),
            self.ledger_id,
            self.custodian,
            state.total_supply,
            state.balances.accounts(),
            state.allowances.allowances(),
            state.events.records().to_vec(),
        )
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Move `amount` from `caller` to `to`.
    ///
    /// A zero amount succeeds and is still recorded.
    pub fn transfer(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<EventRecord, LedgerError> {
        let result = self.transfer_inner(caller, to, amount);
        self.finish("transfer", STAT_TRANSFERS, caller, result)
    }

    fn transfer_inner(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<EventRecord, LedgerError> {
        require_non_null(caller, AddressRole::Caller)?;
        require_non_null(to, AddressRole::Recipient)?;

        let mut guard = self.lock();
        let state = &mut *guard;
        let mut stage = StagedBalances::new(&mut state.balances);
        stage.debit(caller, amount)?;
        stage.credit(to, amount)?;
        stage.commit()?;

        let record = state.record(LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        debug!(%caller, %to, %amount, sequence = record.sequence, "transfer committed");
        Ok(record)
    }

    /// Destroy `amount` of the caller's own balance.
    pub fn burn(&self, caller: &AccountId, amount: TokenAmount) -> Result<EventRecord, LedgerError> {
        let result = self.burn_inner(caller, caller, amount);
        self.finish("burn", STAT_BURNS, caller, result)
    }

    /// Destroy `amount` of `holder`'s balance on the authority of `caller`.
    pub fn burn_from(
        &self,
        caller: &AccountId,
        holder: &AccountId,
        amount: TokenAmount,
    ) -> Result<EventRecord, LedgerError> {
        let result = self.burn_inner(caller, holder, amount);
        self.finish("burn_from", STAT_BURNS, caller, result)
    }

    fn burn_inner(
        &self,
        caller: &AccountId,
        holder: &AccountId,
        amount: TokenAmount,
    ) -> Result<EventRecord, LedgerError> {
        require_non_null(caller, AddressRole::Caller)?;
        require_non_null(holder, AddressRole::Holder)?;

        let mut guard = self.lock();
        let state = &mut *guard;
        let charge = self
            .authorizer
            .authorize_burn(caller, holder, amount, &state.allowances)?;

        let available = state.balances.balance(holder);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *holder,
                needed: amount,
                available,
            });
        }
        let supply = state.total_supply.checked_sub(amount).ok_or(
            LedgerError::SupplyMismatch {
                recorded: state.total_supply,
                actual: available,
            },
        )?;

        if let Some(charge) = &charge {
            spend(&mut state.allowances, charge)?;
        }
        state.balances.debit(holder, amount)?;
        state.total_supply = supply;

        let record = state.record(LedgerEvent::Transfer {
            from: *holder,
            to: AccountId::NULL,
            amount,
        });
        debug!(%caller, %holder, %amount, %supply, sequence = record.sequence, "burn committed");
        Ok(record)
    }

    /// Send `amounts[i]` to `recipients[i]` for every `i`, all or nothing.
    pub fn bulk_transfer(
        &self,
        caller: &AccountId,
        recipients: &[AccountId],
        amounts: &[TokenAmount],
    ) -> Result<BatchReceipt, LedgerError> {
        let result = BatchTransfer::from_parallel(recipients, amounts)
            .and_then(|batch| self.bulk_inner(caller, &batch));
        self.finish("bulk_transfer", STAT_BULK_TRANSFERS, caller, result)
    }

    /// [`TokenLedger::bulk_transfer`] over `(recipient, amount)` pairs.
    pub fn bulk_transfer_pairs<I>(
        &self,
        caller: &AccountId,
        pairs: I,
    ) -> Result<BatchReceipt, LedgerError>
    where
        I: IntoIterator<Item = (AccountId, TokenAmount)>,
    {
        self.execute_batch(caller, &BatchTransfer::from_pairs(pairs))
    }

    /// Run a prepared batch plan, all or nothing.
    pub fn execute_batch(
        &self,
        caller: &AccountId,
        batch: &BatchTransfer,
    ) -> Result<BatchReceipt, LedgerError> {
        let result = self.bulk_inner(caller, batch);
        self.finish("bulk_transfer", STAT_BULK_TRANSFERS, caller, result)
    }

    fn bulk_inner(
        &self,
        caller: &AccountId,
        batch: &BatchTransfer,
    ) -> Result<BatchReceipt, LedgerError> {
        require_non_null(caller, AddressRole::Caller)?;

        let mut guard = self.lock();
        let state = &mut *guard;

        let available = state.balances.balance(caller);
        let total = match batch.total() {
            Some(total) if total <= available => total,
            total => {
                return Err(LedgerError::InsufficientBalance {
                    account: *caller,
                    needed: total.unwrap_or(TokenAmount::MAX),
                    available,
                })
            }
        };
        let charge =
            self.authorizer
                .authorize_batch(caller, &self.ledger_id, total, &state.allowances)?;

        // Any failing leg drops the stage, discarding earlier legs.
        let mut stage = StagedBalances::new(&mut state.balances);
        batch.apply(caller, &mut stage)?;
        if let Some(charge) = &charge {
            spend(&mut state.allowances, charge)?;
        }
        stage.commit()?;

        let legs = batch.entries().iter().map(|entry| LedgerEvent::Transfer {
            from: *caller,
            to: entry.to,
            amount: entry.amount,
        });
        let events = state.record_all(legs.chain(std::iter::once(
            LedgerEvent::BulkTransferCompleted {
                ledger: self.ledger_id,
                sender: *caller,
                total,
            },
        )));
        debug!(%caller, recipients = batch.len(), %total, "bulk transfer committed");
        Ok(BatchReceipt { total, events })
    }

    /// Set the allowance `owner` gives `spender`, replacing any previous value.
    pub fn approve(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: TokenAmount,
    ) -> Result<EventRecord, LedgerError> {
        let result = self.approve_inner(owner, spender, amount);
        self.finish("approve", STAT_APPROVALS, owner, result)
    }

    fn approve_inner(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: TokenAmount,
    ) -> Result<EventRecord, LedgerError> {
        require_non_null(owner, AddressRole::Owner)?;
        require_non_null(spender, AddressRole::Spender)?;

        let mut guard = self.lock();
        let state = &mut *guard;
        state.allowances.set_allowance(owner, spender, amount)?;
        let record = state.record(LedgerEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
        debug!(%owner, %spender, %amount, "approval committed");
        Ok(record)
    }

    /// Execute a serializable operation, returning the events it appended.
    pub fn apply(&self, operation: &Operation) -> Result<Vec<EventRecord>, LedgerError> {
        match operation {
            Operation::Transfer { caller, to, amount } => {
                self.transfer(caller, to, *amount).map(|r| vec![r])
            }
            Operation::Burn { caller, amount } => self.burn(caller, *amount).map(|r| vec![r]),
            Operation::BurnFrom {
                caller,
                holder,
                amount,
            } => self.burn_from(caller, holder, *amount).map(|r| vec![r]),
            Operation::Approve {
                owner,
                spender,
                amount,
            } => self.approve(owner, spender, *amount).map(|r| vec![r]),
            Operation::BulkTransfer {
                caller,
                recipients,
                amounts,
            } => self
                .bulk_transfer(caller, recipients, amounts)
                .map(|receipt| receipt.events),
        }
    }
}
