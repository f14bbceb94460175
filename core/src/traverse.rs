//! Walking a chain one link at a time.
//!
//! A [`Traversal`] is a pull-based cursor: every call to [`Traversal::next_node`] resolves
//! exactly one neighbour through the ledger. Dropping it at any point is fine, nothing is
//! held open between steps.

use std::collections::HashSet;

use futures::stream::{self, Stream};
use tracing::debug;

use crate::compose::WalletFilter;
use crate::error::RdtError;
use crate::ledger::Ledger;
use crate::link::LinkOptions;
use crate::node::AnyNode;
use crate::rdt::Rdt;
use trackweave_proto::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward newer records, following heads.
    Forward,
    /// Toward older records, following tails.
    Backward,
}

impl Direction {
    /// `None` for a zero amount.
    pub fn of(amount: i64) -> Option<Self> {
        match amount {
            0 => None,
            n if n > 0 => Some(Direction::Forward),
            _ => Some(Direction::Backward),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraverseOptions {
    /// Where to start. Not part of the output.
    pub entry_node: AnyNode,
    /// How many records to walk; the sign picks the direction.
    pub amount: i64,
    pub max_branch_depth: u32,
    pub wallet: Option<WalletFilter>,
}

impl TraverseOptions {
    pub fn new(entry_node: AnyNode, amount: i64) -> Self { Self { entry_node, amount, max_branch_depth: 0, wallet: None } }

    pub fn max_branch_depth(mut self, max_branch_depth: u32) -> Self {
        self.max_branch_depth = max_branch_depth;
        self
    }

    pub fn wallet(mut self, wallet: impl Into<Option<WalletFilter>>) -> Self {
        self.wallet = wallet.into();
        self
    }
}

pub struct Traversal<'a, L> {
    rdt: &'a Rdt<L>,
    cursor: Option<AnyNode>,
    remaining: u64,
    direction: Direction,
    link: LinkOptions,
    /// Heads already yielded (or started from), so a cyclic ledger can't keep us going.
    visited: HashSet<NodeId>,
}

impl<'a, L: Ledger> Traversal<'a, L> {
    fn new(rdt: &'a Rdt<L>, options: TraverseOptions) -> Self {
        let direction = Direction::of(options.amount).unwrap_or(Direction::Forward);
        let remaining = options.amount.unsigned_abs();
        let link = LinkOptions { depth: options.max_branch_depth, wallet: options.wallet };

        let mut visited = HashSet::new();
        visited.insert(options.entry_node.head().clone());

        // walking back from a node with no tail goes nowhere
        let cursor = match direction {
            Direction::Backward if options.entry_node.tail().is_none() => None,
            _ if remaining == 0 => None,
            _ => Some(options.entry_node),
        };

        Self { rdt, cursor, remaining, direction, link, visited }
    }

    pub fn direction(&self) -> Direction { self.direction }

    /// Records still to be yielded if the chain is long enough.
    pub fn remaining(&self) -> u64 { if self.cursor.is_some() { self.remaining } else { 0 } }

    fn finish(&mut self) {
        self.cursor = None;
        self.remaining = 0;
    }

    /// Resolves the next record. `None` once the walk is over; an error also ends it.
    pub async fn next_node(&mut self) -> Option<Result<AnyNode, RdtError>> {
        if self.remaining == 0 {
            return None;
        }
        let cursor = self.cursor.as_ref()?;

        let step = match self.direction {
            Direction::Forward => self.rdt.get_head_node(cursor, &self.link).await,
            Direction::Backward => self.rdt.get_tail_node(cursor, &self.link).await,
        };

        // a neighbour that rejoins a branch before its fork point ends the walk
        let step = match step {
            Ok(Some(node)) => {
                let (older, newer) = match self.direction {
                    Direction::Forward => (cursor, &node),
                    Direction::Backward => (&node, cursor),
                };
                match self.rdt.is_valid_link(older, newer).await {
                    Ok(true) => Ok(Some(node)),
                    Ok(false) => {
                        debug!("{:#} cannot follow {:#}, stopping", newer.head(), older.head());
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
            other => other,
        };

        match step {
            Ok(Some(node)) => {
                if !self.visited.insert(node.head().clone()) {
                    debug!("traversal came back to {:#}, stopping", node.head());
                    self.finish();
                    return None;
                }
                self.remaining -= 1;
                self.cursor = Some(node.clone());
                Some(Ok(node))
            }
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                self.finish();
                Some(Err(e))
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<AnyNode, RdtError>> + 'a
    where L: 'a {
        stream::unfold(self, |mut traversal| async move {
            let item = traversal.next_node().await?;
            Some((item, traversal))
        })
    }

    /// Walks to the end, failing on the first ledger error.
    pub async fn collect(mut self) -> Result<Vec<AnyNode>, RdtError> {
        let mut nodes = Vec::new();
        while let Some(node) = self.next_node().await {
            nodes.push(node?);
        }
        Ok(nodes)
    }
}

impl<L: Ledger> Rdt<L> {
    /// A lazy walk of up to `|amount|` records from `options.entry_node`.
    pub fn traverse_nodes(&self, options: TraverseOptions) -> Traversal<'_, L> { Traversal::new(self, options) }
}
