//! Genesis: the initial mint and the ledger's own identity.
//!
//! The whole initial supply `initial_amount * 10^decimals` is minted to the
//! custodian. Unless configured, the ledger id is derived deterministically
//! from the token metadata and custodian so the same configuration always
//! yields the same id.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::LedgerError;
use mchain_types::{AccountId, TokenAmount, TokenMetadata, ACCOUNT_ID_LEN};

type Blake2b256 = Blake2b<U32>;

/// Domain separator for ledger id derivation.
const LEDGER_ID_DOMAIN: &[u8] = b"mchain-ledger-id";

/// Raw supply minted at construction.
pub fn genesis_supply(initial_amount: u64, decimals: u8) -> Result<TokenAmount, LedgerError> {
    TokenAmount::from_whole(u128::from(initial_amount), decimals).ok_or(
        LedgerError::SupplyOverflow {
            initial_amount: u128::from(initial_amount),
            decimals,
        },
    )
}

/// Deterministic ledger id: the first 20 bytes of
/// Blake2b-256(domain || name || 0 || symbol || 0 || decimals || custodian).
pub fn derive_ledger_id(metadata: &TokenMetadata, custodian: &AccountId) -> AccountId {
    let mut hasher = Blake2b256::new();
    hasher.update(LEDGER_ID_DOMAIN);
    hasher.update(metadata.name.as_bytes());
    hasher.update([0u8]);
    hasher.update(metadata.symbol.as_bytes());
    hasher.update([0u8]);
    hasher.update([metadata.decimals]);
    hasher.update(custodian.as_bytes());
    let digest = hasher.finalize();

    let mut id = [0u8; ACCOUNT_ID_LEN];
    id.copy_from_slice(&digest[..ACCOUNT_ID_LEN]);
    AccountId::new(id)
}
