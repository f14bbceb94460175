use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use trackweave_core::error::LedgerError;
use trackweave_core::ledger::{Ledger, LedgerWriter, ResultOrder, Submission};
use trackweave_proto::{TagSet, TxId, WalletAddr};
use trackweave_query::selection::filter::FilterIterator;
use trackweave_query::Predicate;

use crate::record::Record;

/// Records are numbered `tx1`, `tx2`, ... in posting order.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<Record>>,
    order: ResultOrder,
    failing: RwLock<HashMap<TxId, u16>>,
    queries: AtomicUsize,
}

impl MemoryLedger {
    /// A ledger answering newest first, like a block-indexed gateway.
    pub fn new() -> Self { Self::default() }

    pub fn with_order(order: ResultOrder) -> Self { Self { order, ..Self::default() } }

    /// Stores a record directly, bypassing [`LedgerWriter`].
    pub fn insert(&self, owner: impl Into<WalletAddr>, target: Option<WalletAddr>, tags: TagSet) -> TxId {
        let mut records = self.records.write().expect("Failed to lock the ledger");
        let tx_id = TxId::new(format!("tx{}", records.len() + 1));
        records.push(Record { tx_id: tx_id.clone(), owner: owner.into(), target, tags });
        tx_id
    }

    pub fn records(&self) -> Vec<Record> { self.records.read().expect("Failed to lock the ledger").clone() }

    pub fn len(&self) -> usize { self.records.read().expect("Failed to lock the ledger").len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Makes every later `fetch_tags` for `tx_id` fail with `status`.
    pub fn fail_fetches_for(&self, tx_id: impl Into<TxId>, status: u16) {
        self.failing.write().expect("Failed to lock the failure table").insert(tx_id.into(), status);
    }

    pub fn clear_failures(&self) { self.failing.write().expect("Failed to lock the failure table").clear(); }

    /// How many times `query` has been called.
    pub fn query_count(&self) -> usize { self.queries.load(Ordering::SeqCst) }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn query(&self, filter: &Predicate) -> Result<Vec<TxId>, LedgerError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read().expect("Failed to lock the ledger");
        let mut matches: Vec<TxId> = FilterIterator::new(records.iter(), filter.clone()).map(|record| record.tx_id.clone()).collect();
        debug!("query {} matched {} of {} records", filter, matches.len(), records.len());

        if self.order == ResultOrder::NewestFirst {
            matches.reverse();
        }
        Ok(matches)
    }

    async fn fetch_tags(&self, tx_id: &TxId) -> Result<TagSet, LedgerError> {
        if let Some(status) = self.failing.read().expect("Failed to lock the failure table").get(tx_id) {
            return Err(LedgerError::status(*status, format!("fetching {} failed", tx_id)));
        }
        let records = self.records.read().expect("Failed to lock the ledger");
        match records.iter().find(|record| &record.tx_id == tx_id) {
            Some(record) => Ok(record.tags.clone()),
            None => Err(LedgerError::status(404, "Not Found")),
        }
    }

    fn ordering(&self) -> ResultOrder { self.order }
}

#[async_trait]
impl LedgerWriter for MemoryLedger {
    async fn post(&self, submission: Submission) -> Result<TxId, LedgerError> {
        let tx_id = self.insert(submission.owner, submission.target, submission.tags);
        debug!("posted {}", tx_id);
        Ok(tx_id)
    }
}
