mod common;

use anyhow::Result;
use common::{at, seed, seed_as, seed_chain};
use trackweave_core::proto::{TagSet, TxId};
use trackweave_core::{AnyNode, ArgumentError, DecodeError, LedgerError, Rdt, RdtConfig, RdtError, ResultOrder, RootNode, RootQuery, WalletFilter};
use trackweave_ledger_memory::MemoryLedger;

fn root_record(created: i64) -> RootNode { RootNode::new("r1".into(), format!("h{}", created).into(), at(created)) }

#[tokio::test]
async fn oldest_root_is_canonical() -> Result<()> {
    for order in [ResultOrder::NewestFirst, ResultOrder::OldestFirst] {
        let rdt = Rdt::new(MemoryLedger::with_order(order));
        for created in [1_000, 2_000, 3_000] {
            seed(rdt.ledger(), root_record(created));
        }

        let root = rdt.find_root_node(&RootQuery::for_chain("r1")).await?.expect("a root exists");
        assert_eq!(root.tx_id, Some(TxId::from("tx1")), "ledger order {:?}", order);
        assert_eq!(root.created_at, at(1_000));
    }
    Ok(())
}

#[tokio::test]
async fn root_of_any_chain_member() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let (root, nodes) = seed_chain(rdt.ledger(), 3);

    let found = rdt.find_root_node(&RootQuery::of(&nodes[2])).await?;
    assert_eq!(found.map(AnyNode::from), Some(root));
    Ok(())
}

#[tokio::test]
async fn missing_root_is_none() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    seed_chain(rdt.ledger(), 1);

    assert_eq!(rdt.find_root_node(&RootQuery::for_chain("r2")).await?, None);
    Ok(())
}

#[tokio::test]
async fn lookup_by_wallet_only() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    seed_as(rdt.ledger(), "alice", RootNode::new("ra".into(), "ha".into(), at(1_000)));
    seed_as(rdt.ledger(), "bob", RootNode::new("rb".into(), "hb".into(), at(2_000)));

    let found = rdt.find_root_node(&RootQuery::for_wallet(WalletFilter::new("bob"))).await?.expect("bob has a root");
    assert_eq!(found.root.as_str(), "rb");

    let tagged = RootQuery::for_wallet(WalletFilter::new("bob")).tag("App-Name", "demo");
    assert_eq!(rdt.find_root_node(&tagged).await?, None);
    Ok(())
}

#[tokio::test]
async fn lookup_needs_a_chain_or_a_wallet() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());

    let err = rdt.find_root_node(&RootQuery::new()).await.unwrap_err();
    assert!(matches!(err, RdtError::InvalidArgument(ArgumentError::MissingRootOrWallet)));
    assert_eq!(rdt.ledger().query_count(), 0);
    Ok(())
}

#[tokio::test]
async fn undecodable_canonical_root_is_an_error() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    let tags: TagSet = [("RDT-Type", "root"), ("Root-Id", "r1"), ("Created-At", "1000")].into_iter().collect();
    rdt.ledger().insert("alice", None, tags);
    seed(rdt.ledger(), root_record(2_000));

    match rdt.find_root_node(&RootQuery::for_chain("r1")).await {
        Err(RdtError::Decode { tx_id, source }) => {
            assert_eq!(tx_id, TxId::from("tx1"));
            assert_eq!(source, DecodeError::MissingTag("RDT-Major-Version"));
        }
        other => panic!("expected a decode error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn fetch_failures_are_reported() -> Result<()> {
    let rdt = Rdt::new(MemoryLedger::new());
    seed(rdt.ledger(), root_record(1_000));
    rdt.ledger().fail_fetches_for("tx1", 500);

    let err = rdt.find_root_node(&RootQuery::for_chain("r1")).await.unwrap_err();
    assert!(matches!(err, RdtError::Ledger(LedgerError::Status { status: 500, .. })));
    Ok(())
}

#[tokio::test]
async fn strict_policy_ignores_a_foreign_root() -> Result<()> {
    let rdt = Rdt::with_config(MemoryLedger::new(), RdtConfig::strict(1));
    seed(rdt.ledger(), root_record(1_000));

    assert_eq!(rdt.find_root_node(&RootQuery::for_chain("r1")).await?, None);
    Ok(())
}
