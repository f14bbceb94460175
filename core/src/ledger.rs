use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use trackweave_proto::{TagSet, TxId, WalletAddr};
use trackweave_query::Predicate;

/// The order in which a ledger returns the ids matching a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResultOrder {
    /// Most recently written record first. This is what block-indexed gateways do.
    #[default]
    NewestFirst,
    OldestFirst,
}

impl ResultOrder {
    /// Reorders `ids` so the oldest record comes first.
    pub fn into_chronological<T>(self, mut ids: Vec<T>) -> Vec<T> {
        if self == ResultOrder::NewestFirst {
            ids.reverse();
        }
        ids
    }

    /// Picks the oldest of `ids`.
    pub fn oldest<T>(self, ids: Vec<T>) -> Option<T> {
        match self {
            ResultOrder::NewestFirst => ids.into_iter().last(),
            ResultOrder::OldestFirst => ids.into_iter().next(),
        }
    }
}

/// Read access to an append-only, tag-indexed ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Ids of every record matching `filter`, ordered as [`Ledger::ordering`] says.
    async fn query(&self, filter: &Predicate) -> Result<Vec<TxId>, LedgerError>;

    /// The tags attached to a record.
    async fn fetch_tags(&self, tx_id: &TxId) -> Result<TagSet, LedgerError>;

    fn ordering(&self) -> ResultOrder { ResultOrder::NewestFirst }
}

/// A record ready to be signed and posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub owner: WalletAddr,
    pub target: Option<WalletAddr>,
    pub tags: TagSet,
}

impl Submission {
    pub fn new(owner: WalletAddr, tags: TagSet) -> Self { Self { owner, target: None, tags } }

    pub fn with_target(mut self, target: WalletAddr) -> Self {
        self.target = Some(target);
        self
    }
}

/// Write access to the ledger. Signing and transport happen behind this trait.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn post(&self, submission: Submission) -> Result<TxId, LedgerError>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    async fn query(&self, filter: &Predicate) -> Result<Vec<TxId>, LedgerError> { (**self).query(filter).await }

    async fn fetch_tags(&self, tx_id: &TxId) -> Result<TagSet, LedgerError> { (**self).fetch_tags(tx_id).await }

    fn ordering(&self) -> ResultOrder { (**self).ordering() }
}

#[async_trait]
impl<L: LedgerWriter + ?Sized> LedgerWriter for Arc<L> {
    async fn post(&self, submission: Submission) -> Result<TxId, LedgerError> { (**self).post(submission).await }
}
