use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use crate::error::DecodeError;

/// Identity of a chain position: the `Root-Id` shared by a whole chain, or the
/// `Head-Node` / `Tail-Node` / `Branch-Tail-Node` edges linking records together.
///
/// Values written by other producers are opaque strings; ids minted here are
/// url-safe base64 encoded ULIDs.
#[derive(PartialEq, Eq, Hash, Clone, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn generate() -> Self { NodeId(general_purpose::URL_SAFE_NO_PAD.encode(Ulid::new().to_bytes())) }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Recover the ULID of an id minted by [`NodeId::generate`].
    pub fn to_ulid(&self) -> Result<Ulid, DecodeError> {
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(&self.0).map_err(DecodeError::InvalidBase64)?;
        let bytes: [u8; 16] = decoded[..].try_into().map_err(|_| DecodeError::InvalidLength)?;
        Ok(Ulid::from_bytes(bytes))
    }

    pub fn to_short(&self) -> &str {
        let start = self.0.char_indices().rev().nth(5).map(|(i, _)| i).unwrap_or(0);
        &self.0[start..]
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.to_short())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "NodeId({})", self.0) }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self { NodeId(id.to_string()) }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self { NodeId(id) }
}

impl From<&String> for NodeId {
    fn from(id: &String) -> Self { NodeId(id.clone()) }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self { id.0 }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str { &self.0 }
}

/// Identifier the ledger assigned to a persisted record.
#[derive(PartialEq, Eq, Hash, Clone, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self { TxId(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "TxId({})", self.0) }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self { TxId(id.to_string()) }
}

impl From<String> for TxId {
    fn from(id: String) -> Self { TxId(id) }
}

/// Address of a ledger wallet.
#[derive(PartialEq, Eq, Hash, Clone, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddr(String);

impl WalletAddr {
    pub fn new(addr: impl Into<String>) -> Self { WalletAddr(addr.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for WalletAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Debug for WalletAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "WalletAddr({})", self.0) }
}

impl From<&str> for WalletAddr {
    fn from(addr: &str) -> Self { WalletAddr(addr.to_string()) }
}

impl From<String> for WalletAddr {
    fn from(addr: String) -> Self { WalletAddr(addr) }
}
