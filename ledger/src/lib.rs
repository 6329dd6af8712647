//! Fungible-token ledger.
//!
//! A fixed supply is minted to a custodian at construction. Holders move value
//! with `transfer`, destroy it with `burn`, and distribute it to many
//! recipients at once with an all-or-nothing `bulk_transfer`. Every committed
//! operation is recorded in an append-only event log.

pub mod auth;
pub mod batch;
pub mod config;
pub mod error;
pub mod event;
pub mod genesis;
pub mod ops;
pub mod snapshot;
pub mod token;

pub use auth::{AllowanceCharge, ApprovedBatches, Authorizer, HolderAuthority};
pub use batch::{BatchEntry, BatchReceipt, BatchTransfer};
pub use config::LedgerConfig;
pub use error::{AddressRole, LedgerError};
pub use event::{EventBus, EventLog, EventRecord, LedgerEvent};
pub use genesis::{derive_ledger_id, genesis_supply};
pub use ops::Operation;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use token::{SupplyAudit, TokenLedger};
