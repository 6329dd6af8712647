//! Fixed-width account identity.
//!
//! Accounts are 20-byte identifiers rendered as `0x`-prefixed lowercase hex.
//! The all-zero identity is the null account: it is the sink of every burn and
//! is never a valid transfer source or ordinary destination.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Width of an account identity in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

/// An opaque account identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The null identity (burn sink).
    pub const NULL: Self = Self([0u8; ACCOUNT_ID_LEN]);

    pub const fn new(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; ACCOUNT_ID_LEN]
    }

    /// Parse an account from hex, with or without the `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, TypesError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|e| TypesError::InvalidAccountId {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; ACCOUNT_ID_LEN] =
            bytes
                .try_into()
                .map_err(|raw: Vec<u8>| TypesError::InvalidAccountId {
                    input: input.to_string(),
                    reason: format!("expected {ACCOUNT_ID_LEN} bytes, got {}", raw.len()),
                })?;
        Ok(Self(bytes))
    }

    /// Full `0x`-prefixed hex rendering.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; ACCOUNT_ID_LEN]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

// Hex strings for JSON/TOML, raw bytes for bincode.
impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(D::Error::custom)
        } else {
            <[u8; ACCOUNT_ID_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_all_zero() {
        assert!(AccountId::NULL.is_null());
        assert!(!AccountId::new([1u8; ACCOUNT_ID_LEN]).is_null());
    }

    #[test]
    fn parses_with_and_without_prefix() {
        let a = AccountId::from_hex("0x00000000000000000000000000000000000000ff").unwrap();
        let b = AccountId::from_hex("00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes()[19], 0xff);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = AccountId::from_hex("0xdeadbeef").unwrap_err();
        assert!(matches!(err, TypesError::InvalidAccountId { .. }));
    }

    #[test]
    fn rejects_non_hex() {
        assert!(AccountId::from_hex("0xzz000000000000000000000000000000000000ff").is_err());
    }

    #[test]
    fn display_matches_to_hex() {
        let id = AccountId::new([0xab; ACCOUNT_ID_LEN]);
        assert_eq!(id.to_string(), id.to_hex());
        assert_eq!(id.to_hex().len(), 2 + 2 * ACCOUNT_ID_LEN);
    }

    #[test]
    fn json_uses_hex_string() {
        let id = AccountId::new([7u8; ACCOUNT_ID_LEN]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn bincode_uses_raw_bytes() {
        let id = AccountId::new([9u8; ACCOUNT_ID_LEN]);
        let encoded = bincode::serialize(&id).unwrap();
        assert_eq!(encoded.len(), ACCOUNT_ID_LEN);
        let back: AccountId = bincode::deserialize(&encoded).unwrap();
        assert_eq!(back, id);
    }
}
