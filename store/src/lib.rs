//! Storage traits for the Mchain token ledger.
//!
//! The ledger depends only on [`BalanceStore`] and [`AllowanceStore`]. The
//! in-memory backends in [`memory`] are the shipped implementations; other
//! backends plug in behind the same traits.
//!
//! [`StagedBalances`] is the write set used for multi-account operations:
//! writes land in an overlay and reach the underlying store only on commit.

pub mod allowance;
pub mod balance;
pub mod error;
pub mod memory;
pub mod staged;

pub use allowance::{AllowanceRecord, AllowanceStore};
pub use balance::BalanceStore;
pub use error::StoreError;
pub use memory::{MemoryAllowanceStore, MemoryBalanceStore};
pub use staged::StagedBalances;
