mod common;

use anyhow::Result;
use async_trait::async_trait;
use common::heads;
use std::sync::Arc;
use trackweave_core::proto::{TxId, WalletAddr};
use trackweave_core::{
    AnyNode, LedgerError, LedgerWriter, NodeQuery, Rdt, RdtConfig, RdtError, Resolved, RootQuery, Submission, TraverseOptions,
};
use trackweave_ledger_memory::MemoryLedger;

#[tokio::test]
async fn published_chain_can_be_walked() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let owner = WalletAddr::from("alice");

    let root: AnyNode = rdt.create_root(&owner).await?.into();
    let first = rdt.append_node(&owner, &root).await?;
    let second = rdt.append_node(&owner, &first).await?;
    assert_eq!(first.tail(), Some(root.head()));
    assert_eq!(second.tail(), Some(first.head()));
    assert_eq!(root.tx_id(), Some(&TxId::from("tx1")));
    assert_eq!(second.tx_id(), Some(&TxId::from("tx3")));

    let walked = rdt.traverse_nodes(TraverseOptions::new(root.clone(), 5)).collect().await?;
    assert_eq!(walked, vec![first.clone(), second.clone()]);

    let found = rdt.find_root_node(&RootQuery::of(&second)).await?;
    assert_eq!(found.map(AnyNode::from), Some(root));
    Ok(())
}

#[tokio::test]
async fn records_carry_the_configured_version() -> Result<()> {
    let rdt = Rdt::with_config(MemoryLedger::new(), RdtConfig::strict(4));
    let owner = WalletAddr::from("alice");

    let root = rdt.create_root(&owner).await?;
    assert_eq!(root.major_version, 4);
    let node = rdt.append_node(&owner, &AnyNode::from(root.clone())).await?;
    assert_eq!(rdt.ledger().records()[1].tags.get("RDT-Major-Version"), Some("4"));

    assert_eq!(rdt.get_node(&NodeQuery::of(&node).head(node.head().clone())).await?, Resolved::Single(node));
    Ok(())
}

#[tokio::test]
async fn forks_and_rejoins() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let owner = WalletAddr::from("alice");

    let root: AnyNode = rdt.create_root(&owner).await?.into();
    let fork_point = rdt.append_node(&owner, &root).await?;
    let branch = rdt.fork_branch(&owner, &fork_point).await?;
    let branch_next = rdt.append_node(&owner, &branch).await?;
    let rejoin = rdt.rejoin_node(&owner, &branch_next).await?;

    assert!(branch.is_branch() && branch_next.is_branch());
    assert_eq!(branch.depth(), 1);
    assert_eq!(branch_next.branch_tail(), Some(fork_point.head()));
    assert!(!rejoin.is_branch());
    assert_eq!(rejoin.depth(), 1);

    let query = NodeQuery::of(&root).tail(branch_next.head().clone()).depth(1).fetch_greedily(true);
    let resolved = rdt.get_node(&query).await?;
    assert_eq!(heads(&resolved.into_vec()), heads(&[branch_next, rejoin]));

    // the main line doesn't see the branch
    let walked = rdt.traverse_nodes(TraverseOptions::new(root, 3)).collect().await?;
    assert_eq!(walked, vec![fork_point]);
    Ok(())
}

/// Rejects every submission, the way a gateway does when the owner can't pay.
struct RejectingWriter;

#[async_trait]
impl LedgerWriter for RejectingWriter {
    async fn post(&self, _submission: Submission) -> Result<TxId, LedgerError> { Err(LedgerError::status(402, "Payment Required")) }
}

#[tokio::test]
async fn post_failures_are_reported() -> Result<()> {
    let rdt = Rdt::new(Arc::new(RejectingWriter));
    let err = rdt.create_root(&WalletAddr::from("alice")).await.unwrap_err();
    assert!(matches!(err, RdtError::Ledger(LedgerError::Status { status: 402, .. })));
    Ok(())
}
