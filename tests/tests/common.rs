use chrono::{DateTime, Utc};
use tracing::Level;

use trackweave_core::{AnyNode, Node, RootNode};
use trackweave_ledger_memory::MemoryLedger;

pub const OWNER: &str = "owner-wallet";

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init(); }

#[allow(unused)]
pub fn at(millis: i64) -> DateTime<Utc> { DateTime::<Utc>::from_timestamp_millis(millis).expect("timestamp in range") }

/// Stores `node` as posted by `owner` and returns it the way the resolver decodes it.
#[allow(unused)]
pub fn seed_as(ledger: &MemoryLedger, owner: &str, node: impl Into<AnyNode>) -> AnyNode {
    let tags = node.into().to_tags();
    let tx_id = ledger.insert(owner, None, tags.clone());
    AnyNode::from_tags(Some(tx_id), &tags).expect("seeded node decodes")
}

#[allow(unused)]
pub fn seed(ledger: &MemoryLedger, node: impl Into<AnyNode>) -> AnyNode { seed_as(ledger, OWNER, node) }

/// A root (`r1`, head `h0`) followed by `len` main-line nodes with heads `h1..=hN`, one
/// second apart.
#[allow(unused)]
pub fn seed_chain(ledger: &MemoryLedger, len: usize) -> (AnyNode, Vec<AnyNode>) {
    let root = seed(ledger, RootNode::new("r1".into(), "h0".into(), at(1_000)));
    let mut nodes: Vec<AnyNode> = Vec::with_capacity(len);
    for i in 1..=len {
        let previous = nodes.last().unwrap_or(&root);
        let node = Node::following(previous, format!("h{}", i).into(), at(1_000 * (i as i64 + 1)));
        nodes.push(seed(ledger, node));
    }
    (root, nodes)
}

#[allow(unused)]
pub fn heads(nodes: &[AnyNode]) -> Vec<&str> { nodes.iter().map(|node| node.head().as_str()).collect() }
