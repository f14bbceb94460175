use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::compose::{self, WalletFilter};
use crate::error::{ArgumentError, LedgerError, RdtError};
use crate::ledger::Ledger;
use crate::node::{AnyNode, ChainMember};
use crate::rdt::Rdt;
use crate::validation::{ChainValidator, ForkPointRequest};
use trackweave_proto::{NodeId, TagSet, TxId};

/// Describes the records to look up: the members of chain `root` at `depth`
/// whose `tail` and/or `head` match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeQuery {
    pub root: NodeId,
    pub tail: Option<NodeId>,
    pub head: Option<NodeId>,
    pub depth: u32,
    /// Also match the neighbours of the requested edge: the record whose head is
    /// `tail`, and the record whose tail is `head`.
    pub fetch_greedily: bool,
    pub wallet: Option<WalletFilter>,
    /// Additional tag equalities.
    pub tags: Vec<(String, String)>,
}

impl NodeQuery {
    pub fn new(root: impl Into<NodeId>) -> Self {
        Self { root: root.into(), tail: None, head: None, depth: 0, fetch_greedily: false, wallet: None, tags: Vec::new() }
    }

    /// A query on the chain `member` belongs to.
    pub fn of(member: &impl ChainMember) -> Self { Self::new(member.root().clone()) }

    pub fn tail(mut self, tail: impl Into<NodeId>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn head(mut self, head: impl Into<NodeId>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn fetch_greedily(mut self, fetch_greedily: bool) -> Self {
        self.fetch_greedily = fetch_greedily;
        self
    }

    pub fn wallet(mut self, wallet: impl Into<Option<WalletFilter>>) -> Self {
        self.wallet = wallet.into();
        self
    }

    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((name.into(), value.into()));
        self
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        match (&self.tail, &self.head) {
            (None, None) => Err(ArgumentError::MissingEdge),
            (Some(tail), Some(head)) if tail == head => Err(ArgumentError::SelfReferentialEdge(tail.clone())),
            _ => Ok(()),
        }
    }
}

/// What [`Rdt::get_node`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Exactly one main-line node matched.
    Single(AnyNode),
    /// Every other outcome, including no match at all.
    Many(Vec<AnyNode>),
}

impl Resolved {
    fn shape(depth: u32, mut nodes: Vec<AnyNode>) -> Self {
        if depth == 0 && nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return Resolved::Single(node);
            }
        }
        Resolved::Many(nodes)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Resolved::Single(_) => false,
            Resolved::Many(nodes) => nodes.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Resolved::Single(_) => 1,
            Resolved::Many(nodes) => nodes.len(),
        }
    }

    /// The oldest node found.
    pub fn first(&self) -> Option<&AnyNode> {
        match self {
            Resolved::Single(node) => Some(node),
            Resolved::Many(nodes) => nodes.first(),
        }
    }

    pub fn into_first(self) -> Option<AnyNode> {
        match self {
            Resolved::Single(node) => Some(node),
            Resolved::Many(nodes) => nodes.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<AnyNode> {
        match self {
            Resolved::Single(node) => vec![node],
            Resolved::Many(nodes) => nodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForkLookup {
    Enabled,
    /// Used for the fork point lookup itself, so lookups never nest.
    Disabled,
}

impl<L: Ledger> Rdt<L> {
    /// Looks up the chain members described by `query`, dropping everything from the
    /// first inconsistency on. Nothing matching is not an error.
    pub async fn get_node(&self, query: &NodeQuery) -> Result<Resolved, RdtError> {
        query.validate()?;
        let nodes = self.resolve_nodes(query, ForkLookup::Enabled).await?;
        Ok(Resolved::shape(query.depth, nodes))
    }

    fn resolve_nodes<'a>(&'a self, query: &'a NodeQuery, fork_lookup: ForkLookup) -> BoxFuture<'a, Result<Vec<AnyNode>, RdtError>> {
        async move {
            let filter = compose::node_filter(query);
            let tx_ids = self.ledger.query(&filter).await?;
            debug!("{} candidates for {} ({} clauses)", tx_ids.len(), filter, filter.clause_count());
            if tx_ids.is_empty() {
                return Ok(Vec::new());
            }

            let tx_ids = self.ledger.ordering().into_chronological(tx_ids);
            let candidates = self.fetch_candidates(tx_ids).await?;

            let mut validator = ChainValidator::default();
            for candidate in candidates {
                if validator.is_stopped() {
                    break;
                }
                if let Some(request) = validator.fork_point_needed(&candidate) {
                    if fork_lookup == ForkLookup::Enabled {
                        if let Some(fork_point) = self.find_fork_point(&query.root, request).await? {
                            validator.provide_fork_point(fork_point);
                        }
                    }
                }
                validator.push(candidate);
            }
            Ok(validator.finish())
        }
        .boxed()
    }

    async fn find_fork_point(&self, root: &NodeId, request: ForkPointRequest) -> Result<Option<AnyNode>, RdtError> {
        let lookup = NodeQuery::new(root.clone()).head(request.branch_tail).depth(request.depth);
        Ok(self.resolve_nodes(&lookup, ForkLookup::Disabled).await?.into_iter().next())
    }

    /// Whether `newer` may directly follow `older`. A rejoin is checked against its fork
    /// point, which is looked up once and never recursively.
    pub(crate) async fn is_valid_link(&self, older: &AnyNode, newer: &AnyNode) -> Result<bool, RdtError> {
        let mut validator = ChainValidator::default();
        validator.push(older.clone());
        if let Some(request) = validator.fork_point_needed(newer) {
            if let Some(fork_point) = self.find_fork_point(older.root(), request).await? {
                validator.provide_fork_point(fork_point);
            }
        }
        validator.push(newer.clone());
        Ok(validator.finish().len() == 2)
    }

    /// Fetches tags for every candidate concurrently, keeping the input order.
    async fn fetch_candidates(&self, tx_ids: Vec<TxId>) -> Result<Vec<AnyNode>, RdtError> {
        let ledger = &self.ledger;
        let fetched: Vec<(TxId, TagSet)> = stream::iter(tx_ids)
            .map(|tx_id| async move {
                let tags = ledger.fetch_tags(&tx_id).await?;
                Ok::<_, LedgerError>((tx_id, tags))
            })
            .buffered(self.config.effective_concurrency())
            .try_collect()
            .await?;

        Ok(fetched.into_iter().filter_map(|(tx_id, tags)| self.decode_candidate(tx_id, &tags)).collect())
    }

    fn decode_candidate(&self, tx_id: TxId, tags: &TagSet) -> Option<AnyNode> {
        match AnyNode::chain_node_from_tags(Some(tx_id.clone()), tags) {
            Ok(node) if self.config.admits_version(node.major_version()) => Some(node),
            Ok(node) => {
                warn!("skipping {}: major version {} is not {}", tx_id, node.major_version(), self.config.major_version);
                None
            }
            Err(e) => {
                warn!("skipping {}: {}", tx_id, e);
                None
            }
        }
    }
}
