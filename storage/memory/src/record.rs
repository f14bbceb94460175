use trackweave_proto::{TagSet, TxId, WalletAddr};
use trackweave_query::selection::filter::Filterable;

/// A posted record as the ledger stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tx_id: TxId,
    pub owner: WalletAddr,
    pub target: Option<WalletAddr>,
    pub tags: TagSet,
}

impl Filterable for Record {
    fn tag(&self, name: &str) -> Option<&str> { self.tags.get(name) }

    fn owner(&self) -> Option<&str> { Some(self.owner.as_str()) }

    fn target(&self) -> Option<&str> { self.target.as_ref().map(WalletAddr::as_str) }
}
