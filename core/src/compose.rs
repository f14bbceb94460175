//! Builds the ledger filters used by node resolution and root lookup.

use serde::{Deserialize, Serialize};

use crate::resolve::NodeQuery;
use crate::root::RootQuery;
use crate::tags::{Attribute, NodeType};
use trackweave_proto::{WalletAddr, WalletDirection};
use trackweave_query::{and, equals, or, Field, Predicate};

/// Restricts a lookup to records involving a wallet on any of the given sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletFilter {
    pub addr: WalletAddr,
    pub directions: Vec<WalletDirection>,
}

impl WalletFilter {
    /// Records signed by `addr`.
    pub fn new(addr: impl Into<WalletAddr>) -> Self { Self { addr: addr.into(), directions: vec![WalletDirection::From] } }

    pub fn directions(mut self, directions: impl IntoIterator<Item = WalletDirection>) -> Self {
        self.directions = directions.into_iter().collect();
        self
    }

    pub fn to_predicate(&self) -> Option<Predicate> { target_wallet_ops(&self.addr, &self.directions) }
}

/// One equality per requested direction, OR-ed together when there is more than one.
/// Repeated directions are only emitted once; no directions means no clause at all.
pub fn target_wallet_ops(addr: &WalletAddr, directions: &[WalletDirection]) -> Option<Predicate> {
    let mut clauses = Vec::with_capacity(directions.len());
    let mut seen = Vec::with_capacity(directions.len());
    for direction in directions {
        if seen.contains(direction) {
            continue;
        }
        seen.push(*direction);
        clauses.push(equals(direction.field_name(), addr.as_str()));
    }

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(or(clauses)),
    }
}

fn tag_equals(attribute: Attribute, value: impl Into<String>) -> Predicate { equals(Field::tag(attribute.tag_name()), value) }

fn extra_tags(tags: &[(String, String)]) -> impl Iterator<Item = Predicate> + '_ {
    tags.iter().map(|(name, value)| equals(Field::tag(name.as_str()), value.as_str()))
}

/// `AND(root, depth, extra tags..., wallet?, OR(AND(core edges), AND(prev edges)?, AND(next edges)?))`
pub(crate) fn node_filter(query: &NodeQuery) -> Predicate {
    let mut clauses = vec![tag_equals(Attribute::Root, query.root.as_str()), tag_equals(Attribute::Depth, query.depth.to_string())];
    clauses.extend(extra_tags(&query.tags));
    if let Some(wallet) = query.wallet.as_ref().and_then(WalletFilter::to_predicate) {
        clauses.push(wallet);
    }

    let mut current = Vec::new();
    let mut previous = Vec::new();
    let mut next = Vec::new();

    if let Some(tail) = &query.tail {
        if query.fetch_greedily {
            previous.push(tag_equals(Attribute::Head, tail.as_str()));
        }
        current.push(tag_equals(Attribute::Tail, tail.as_str()));
    }

    if let Some(head) = &query.head {
        if query.fetch_greedily {
            next.push(tag_equals(Attribute::Tail, head.as_str()));
        }
        current.push(tag_equals(Attribute::Head, head.as_str()));
    }

    let mut edges = vec![and(current)];
    if !previous.is_empty() {
        edges.push(and(previous));
    }
    if !next.is_empty() {
        edges.push(and(next));
    }
    clauses.push(or(edges));

    and(clauses)
}

/// `AND(type == root, extra tags..., wallet?, root?)`
pub(crate) fn root_filter(query: &RootQuery) -> Predicate {
    let mut clauses = vec![tag_equals(Attribute::Type, NodeType::Root.as_str())];
    clauses.extend(extra_tags(&query.tags));
    if let Some(wallet) = query.wallet.as_ref().and_then(WalletFilter::to_predicate) {
        clauses.push(wallet);
    }
    if let Some(chain) = &query.chain {
        clauses.push(tag_equals(Attribute::Root, chain.as_str()));
    }
    and(clauses)
}
