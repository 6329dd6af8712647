//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};

use crate::auth::{ApprovedBatches, Authorizer, HolderAuthority};
use crate::LedgerError;
use mchain_types::{AccountId, TokenMetadata};

/// Construction-time parameters of a token ledger.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Token name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Token symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Decimal precision; one whole token is `10^decimals` raw units.
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Initial supply in whole tokens, minted to the custodian.
    #[serde(default = "default_initial_amount")]
    pub initial_amount: u64,

    /// Account credited with the entire initial supply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custodian: Option<AccountId>,

    /// Identity of the ledger itself. Derived from the metadata and custodian
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_id: Option<AccountId>,

    /// Require callers to approve the ledger for a batch total before
    /// `bulk_transfer` (the approval is consumed).
    #[serde(default)]
    pub batch_requires_approval: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    "Mchain".to_string()
}

fn default_symbol() -> String {
    "MAR".to_string()
}

fn default_decimals() -> u8 {
    18
}

fn default_initial_amount() -> u64 {
    110_000_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Default parameters with the given custodian.
    pub fn with_custodian(custodian: AccountId) -> Self {
        Self {
            custodian: Some(custodian),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata::new(self.name.clone(), self.symbol.clone(), self.decimals)
    }

    /// The configured custodian, which must be present.
    pub fn custodian(&self) -> Result<AccountId, LedgerError> {
        self.custodian
            .ok_or_else(|| LedgerError::Config("custodian address is not configured".into()))
    }

    /// The authorization policy selected by this configuration.
    pub fn authorizer(&self) -> Box<dyn Authorizer> {
        if self.batch_requires_approval {
            Box::new(ApprovedBatches)
        } else {
            Box::new(HolderAuthority)
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
            initial_amount: default_initial_amount(),
            custodian: None,
            ledger_id: None,
            batch_requires_approval: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CUSTODIAN: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn defaults_match_deployment() {
        let config = LedgerConfig::default();
        assert_eq!(config.name, "Mchain");
        assert_eq!(config.symbol, "MAR");
        assert_eq!(config.decimals, 18);
        assert_eq!(config.initial_amount, 110_000_000);
        assert!(config.custodian.is_none());
        assert!(!config.batch_requires_approval);
    }

    #[test]
    fn parses_partial_toml() {
        let config = LedgerConfig::from_toml_str(&format!(
            "name = \"MarTokenName\"\nsymbol = \"MRT\"\ncustodian = \"{CUSTODIAN}\"\n"
        ))
        .unwrap();
        assert_eq!(config.name, "MarTokenName");
        assert_eq!(config.symbol, "MRT");
        assert_eq!(config.decimals, 18);
        assert_eq!(config.custodian().unwrap(), CUSTODIAN.parse().unwrap());
    }

    #[test]
    fn rejects_malformed_custodian() {
        let err = LedgerConfig::from_toml_str("custodian = \"0x1234\"\n").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn missing_custodian_is_a_config_error() {
        let config = LedgerConfig::from_toml_str("").unwrap();
        assert!(matches!(config.custodian(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = LedgerConfig::with_custodian(CUSTODIAN.parse().unwrap());
        config.batch_requires_approval = true;
        let text = config.to_toml_string().unwrap();
        assert_eq!(LedgerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "custodian = \"{CUSTODIAN}\"").unwrap();
        writeln!(file, "initial_amount = 1000").unwrap();
        let config = LedgerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.initial_amount, 1000);
    }

    #[test]
    fn selects_authorizer_by_flag() {
        let mut config = LedgerConfig::default();
        assert_eq!(config.authorizer().name(), "holder-authority");
        config.batch_requires_approval = true;
        assert_eq!(config.authorizer().name(), "approved-batches");
    }
}
