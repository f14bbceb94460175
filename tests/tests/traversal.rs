mod common;

use anyhow::Result;
use common::{at, heads, seed, seed_as, seed_chain};
use futures::{StreamExt, TryStreamExt};
use trackweave_core::{
    AnyNode, BranchNode, Direction, LedgerError, Node, Rdt, RdtError, RootNode, TraverseOptions, WalletFilter,
};
use trackweave_ledger_memory::MemoryLedger;

#[tokio::test]
async fn forward_walk_yields_exactly_the_amount() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, nodes) = seed_chain(rdt.ledger(), 5);

    let walked = rdt.traverse_nodes(TraverseOptions::new(nodes[0].clone(), 3)).collect().await?;
    assert_eq!(heads(&walked), vec!["h2", "h3", "h4"]);
    assert_eq!(walked, nodes[1..4].to_vec());
    Ok(())
}

#[tokio::test]
async fn backward_walk_follows_tails() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, nodes) = seed_chain(rdt.ledger(), 5);

    let traversal = rdt.traverse_nodes(TraverseOptions::new(nodes[3].clone(), -2));
    assert_eq!(traversal.direction(), Direction::Backward);
    assert_eq!(heads(&traversal.collect().await?), vec!["h3", "h2"]);
    Ok(())
}

#[tokio::test]
async fn backward_from_a_tailless_node_is_empty() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (root, _) = seed_chain(rdt.ledger(), 2);

    let walked = rdt.traverse_nodes(TraverseOptions::new(root, -1)).collect().await?;
    assert!(walked.is_empty());
    assert_eq!(rdt.ledger().query_count(), 0);
    Ok(())
}

#[tokio::test]
async fn zero_amount_is_empty() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, nodes) = seed_chain(rdt.ledger(), 2);

    let mut traversal = rdt.traverse_nodes(TraverseOptions::new(nodes[0].clone(), 0));
    assert_eq!(traversal.remaining(), 0);
    assert!(traversal.next_node().await.is_none());
    assert_eq!(rdt.ledger().query_count(), 0);
    Ok(())
}

#[tokio::test]
async fn walk_ends_quietly_at_the_chain_end() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, nodes) = seed_chain(rdt.ledger(), 5);

    let walked: Vec<_> = rdt.traverse_nodes(TraverseOptions::new(nodes[3].clone(), 10)).into_stream().try_collect().await?;
    assert_eq!(heads(&walked), vec!["h5"]);
    Ok(())
}

#[tokio::test]
async fn root_is_a_valid_entry_point() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (root, _) = seed_chain(rdt.ledger(), 3);

    let walked = rdt.traverse_nodes(TraverseOptions::new(root, 2)).collect().await?;
    assert_eq!(heads(&walked), vec!["h1", "h2"]);
    Ok(())
}

#[tokio::test]
async fn ledger_failure_is_yielded_once() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, nodes) = seed_chain(rdt.ledger(), 5);
    let failing = nodes[2].tx_id().cloned().expect("seeded nodes have ids");
    rdt.ledger().fail_fetches_for(failing, 502);

    let mut stream = Box::pin(rdt.traverse_nodes(TraverseOptions::new(nodes[0].clone(), 4)).into_stream());
    assert_eq!(stream.next().await.transpose()?.map(|n| n.head().to_string()), Some("h2".to_string()));
    match stream.next().await {
        Some(Err(RdtError::Ledger(LedgerError::Status { status, .. }))) => assert_eq!(status, 502),
        other => panic!("expected the injected failure, got {:?}", other),
    }
    assert!(stream.next().await.is_none());
    Ok(())
}

/// Main line `h0 -> h1 -> h2`, a branch forked at `h1` (`b1 -> b2`) and a record rejoining
/// after `b2`, created at `rejoin_created`.
fn seed_branch(ledger: &MemoryLedger, rejoin_created: i64) -> (Vec<AnyNode>, Vec<AnyNode>) {
    let (_, nodes) = seed_chain(ledger, 2);
    let b1 = seed(ledger, BranchNode::forking(&nodes[0], "b1".into(), at(10_000)));
    let AnyNode::Branch(first) = &b1 else { panic!("forking yields a branch") };
    let b2 = seed(ledger, BranchNode::following(first, "b2".into(), at(11_000)));
    let rejoin = seed(ledger, Node::following(&b2, "j1".into(), at(rejoin_created)));
    (nodes, vec![b1, b2, rejoin])
}

#[tokio::test]
async fn walk_descends_into_a_branch_at_the_configured_depth() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (nodes, branch) = seed_branch(rdt.ledger(), 12_000);

    let walked = rdt.traverse_nodes(TraverseOptions::new(nodes[0].clone(), 5).max_branch_depth(1)).collect().await?;
    assert_eq!(walked, branch);

    // the main line at depth 0 never sees the branch
    let walked = rdt.traverse_nodes(TraverseOptions::new(nodes[0].clone(), 5)).collect().await?;
    assert_eq!(heads(&walked), vec!["h2"]);
    Ok(())
}

#[tokio::test]
async fn walk_stops_before_a_rejoin_older_than_its_fork_point() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, branch) = seed_branch(rdt.ledger(), 500);

    let walked = rdt.traverse_nodes(TraverseOptions::new(branch[0].clone(), 5).max_branch_depth(1)).collect().await?;
    assert_eq!(heads(&walked), vec!["b2"]);
    Ok(())
}

#[tokio::test]
async fn walk_continues_through_a_valid_rejoin() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (_, branch) = seed_branch(rdt.ledger(), 12_000);

    let walked = rdt.traverse_nodes(TraverseOptions::new(branch[0].clone(), 5).max_branch_depth(1)).collect().await?;
    assert_eq!(heads(&walked), vec!["b2", "j1"]);
    Ok(())
}

#[tokio::test]
async fn wallet_filter_applies_to_every_step() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let ledger = rdt.ledger();
    let root = seed_as(ledger, "alice", RootNode::new("r1".into(), "h0".into(), at(1_000)));
    let start = seed_as(ledger, "alice", Node::following(&root, "h1".into(), at(2_000)));
    // a competing successor, older than alice's
    seed_as(ledger, "mallory", Node::following(&start, "m2".into(), at(3_000)));
    let a2 = seed_as(ledger, "alice", Node::following(&start, "a2".into(), at(4_000)));
    seed_as(ledger, "alice", Node::following(&a2, "a3".into(), at(5_000)));

    let walked = rdt.traverse_nodes(TraverseOptions::new(start.clone(), 2)).collect().await?;
    assert_eq!(heads(&walked), vec!["m2"]);

    let options = TraverseOptions::new(start, 2).wallet(WalletFilter::new("alice"));
    let walked = rdt.traverse_nodes(options).collect().await?;
    assert_eq!(heads(&walked), vec!["a2", "a3"]);
    Ok(())
}
