//! Writing new records to a chain.

use chrono::{DurationRound, TimeDelta, Utc};
use tracing::debug;

use crate::error::RdtError;
use crate::ledger::{LedgerWriter, Submission};
use crate::node::{AnyNode, BranchNode, Node, RootNode};
use crate::rdt::Rdt;
use crate::tags::format_timestamp;
use trackweave_proto::{NodeId, TagSet, TxId, WalletAddr};

/// Current time at the precision `Created-At` is stored with.
fn now() -> chrono::DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
}

impl<L: LedgerWriter> Rdt<L> {
    /// Starts a new chain owned by `owner`.
    pub async fn create_root(&self, owner: &WalletAddr) -> Result<RootNode, RdtError> {
        let mut root = RootNode::genesis(now()).with_major_version(self.config.major_version);
        let tx_id = self.post(owner, root.to_tags()).await?;
        debug!("created chain {:#} as {}", root.root, tx_id);
        root.tx_id = Some(tx_id);
        Ok(root)
    }

    /// Adds a record after `previous`. A branch keeps growing as a branch.
    pub async fn append_node(&self, owner: &WalletAddr, previous: &AnyNode) -> Result<AnyNode, RdtError> {
        let node = match previous {
            AnyNode::Branch(branch) => BranchNode::following(branch, NodeId::generate(), now()).into(),
            _ => Node::following(previous, NodeId::generate(), now()).into(),
        };
        self.publish(owner, node).await
    }

    /// Adds a plain record after `previous`, ending the branch `previous` is on.
    pub async fn rejoin_node(&self, owner: &WalletAddr, previous: &AnyNode) -> Result<AnyNode, RdtError> {
        self.publish(owner, Node::following(previous, NodeId::generate(), now()).into()).await
    }

    /// Forks a branch one level below `fork_point`.
    pub async fn fork_branch(&self, owner: &WalletAddr, fork_point: &AnyNode) -> Result<AnyNode, RdtError> {
        self.publish(owner, BranchNode::forking(fork_point, NodeId::generate(), now()).into()).await
    }

    /// Posts `node` under the configured major version and records its transaction id.
    pub async fn publish(&self, owner: &WalletAddr, mut node: AnyNode) -> Result<AnyNode, RdtError> {
        node.set_major_version(self.config.major_version);
        let tx_id = self.post(owner, node.to_tags()).await?;
        debug!("published {} {:#} as {} at {}", node.node_type(), node.head(), tx_id, format_timestamp(node.created_at()));
        node.set_tx_id(tx_id);
        Ok(node)
    }

    async fn post(&self, owner: &WalletAddr, tags: TagSet) -> Result<TxId, RdtError> {
        Ok(self.ledger.post(Submission::new(owner.clone(), tags)).await?)
    }
}
