//! Serializable ledger operations.
//!
//! An [`Operation`] names one mutating ledger call with its explicit caller.
//! Scripts of operations are read from JSON by the CLI and executed with
//! [`TokenLedger::apply`](crate::TokenLedger::apply).

use serde::{Deserialize, Serialize};

use mchain_types::{AccountId, TokenAmount};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Transfer {
        caller: AccountId,
        to: AccountId,
        amount: TokenAmount,
    },
    Burn {
        caller: AccountId,
        amount: TokenAmount,
    },
    BurnFrom {
        caller: AccountId,
        holder: AccountId,
        amount: TokenAmount,
    },
    Approve {
        owner: AccountId,
        spender: AccountId,
        amount: TokenAmount,
    },
    BulkTransfer {
        caller: AccountId,
        recipients: Vec<AccountId>,
        amounts: Vec<TokenAmount>,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Burn { .. } => "burn",
            Self::BurnFrom { .. } => "burn_from",
            Self::Approve { .. } => "approve",
            Self::BulkTransfer { .. } => "bulk_transfer",
        }
    }

    /// The account on whose authority the operation runs.
    pub fn caller(&self) -> &AccountId {
        match self {
            Self::Transfer { caller, .. }
            | Self::Burn { caller, .. }
            | Self::BurnFrom { caller, .. }
            | Self::BulkTransfer { caller, .. } => caller,
            Self::Approve { owner, .. } => owner,
        }
    }

    /// Parse a JSON array of operations.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x1111111111111111111111111111111111111111";
    const BOB: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn parses_operation_script() {
        let json = format!(
            r#"[
                {{"transfer": {{"caller": "{ALICE}", "to": "{BOB}", "amount": 100}}}},
                {{"burn": {{"caller": "{ALICE}", "amount": 5}}}},
                {{"bulk_transfer": {{"caller": "{ALICE}", "recipients": ["{BOB}"], "amounts": [7]}}}}
            ]"#
        );
        let ops = Operation::list_from_json(&json).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[0],
            Operation::Transfer {
                caller: ALICE.parse().unwrap(),
                to: BOB.parse().unwrap(),
                amount: TokenAmount::new(100),
            }
        );
        assert_eq!(ops[1].name(), "burn");
        assert_eq!(ops[2].caller(), &ALICE.parse::<AccountId>().unwrap());
    }

    #[test]
    fn amounts_beyond_u64_parse() {
        let json = format!(
            r#"[{{"burn": {{"caller": "{ALICE}", "amount": 110000000000000000000000000}}}}]"#
        );
        let ops = Operation::list_from_json(&json).unwrap();
        assert_eq!(
            ops[0],
            Operation::Burn {
                caller: ALICE.parse().unwrap(),
                amount: TokenAmount::new(110_000_000 * 10u128.pow(18)),
            }
        );
    }

    #[test]
    fn approve_caller_is_owner() {
        let op = Operation::Approve {
            owner: ALICE.parse().unwrap(),
            spender: BOB.parse().unwrap(),
            amount: TokenAmount::new(1),
        };
        assert_eq!(op.caller(), &ALICE.parse::<AccountId>().unwrap());
    }
}
