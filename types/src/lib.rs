//! Fundamental types for the Mchain token ledger.
//!
//! This crate defines the types shared by every other crate in the workspace:
//! account identities, token amounts and token metadata.

pub mod account;
pub mod amount;
pub mod error;
pub mod metadata;

pub use account::{AccountId, ACCOUNT_ID_LEN};
pub use amount::TokenAmount;
pub use error::TypesError;
pub use metadata::TokenMetadata;
