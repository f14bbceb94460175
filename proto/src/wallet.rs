use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::DecodeError;

/// Which side of a record a wallet sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletDirection {
    /// The wallet is the record's target.
    To,
    /// The wallet signed the record.
    From,
}

impl WalletDirection {
    /// The reserved field name the ledger's filter language uses for this side.
    pub fn field_name(&self) -> &'static str {
        match self {
            WalletDirection::To => "to",
            WalletDirection::From => "from",
        }
    }
}

impl fmt::Display for WalletDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.field_name()) }
}

impl FromStr for WalletDirection {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to" => Ok(WalletDirection::To),
            "from" => Ok(WalletDirection::From),
            other => Err(DecodeError::InvalidDirection(other.to_string())),
        }
    }
}
