//! The three kinds of records a chain is made of.
//!
//! ```text
//!  root ── node ── node ── node ── node          depth 0
//!                    └── branch ── branch        depth 1 (branch_tail = head of the node it forked from)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DecodeError;
use crate::tags::{self, Attribute, NodeType, TagFields, TagMap, TagSchema, BRANCH_TAG_MAP, NODE_TAG_MAP, ROOT_TAG_MAP};
use trackweave_proto::{NodeId, TagSet, TxId};

/// The genesis record of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootNode {
    /// Absent until the record has been persisted.
    pub tx_id: Option<TxId>,
    pub major_version: u32,
    pub root: NodeId,
    pub created_at: DateTime<Utc>,
    pub tail: Option<NodeId>,
    pub head: NodeId,
    pub other_tags: BTreeMap<String, String>,
}

/// A record continuing a chain, on the main line (`depth == 0`) or on a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tx_id: Option<TxId>,
    pub major_version: u32,
    pub root: NodeId,
    pub created_at: DateTime<Utc>,
    pub tail: NodeId,
    pub head: NodeId,
    pub depth: u32,
    pub other_tags: BTreeMap<String, String>,
}

/// A record living on a forked sub-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchNode {
    pub tx_id: Option<TxId>,
    pub major_version: u32,
    pub root: NodeId,
    pub created_at: DateTime<Utc>,
    pub tail: NodeId,
    pub head: NodeId,
    pub depth: u32,
    /// Head of the record one level up from which this branch forked.
    pub branch_tail: NodeId,
    pub other_tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyNode {
    Root(RootNode),
    Node(Node),
    Branch(BranchNode),
}

/// Anything that knows which chain it belongs to.
pub trait ChainMember {
    fn root(&self) -> &NodeId;
}

impl ChainMember for NodeId {
    fn root(&self) -> &NodeId { self }
}

impl RootNode {
    pub fn new(root: NodeId, head: NodeId, created_at: DateTime<Utc>) -> Self {
        Self { tx_id: None, major_version: 0, root, created_at, tail: None, head, other_tags: BTreeMap::new() }
    }

    /// A brand new chain: fresh root and head ids.
    pub fn genesis(created_at: DateTime<Utc>) -> Self { Self::new(NodeId::generate(), NodeId::generate(), created_at) }

    pub fn with_major_version(mut self, major_version: u32) -> Self {
        self.major_version = major_version;
        self
    }

    pub fn to_tags(&self) -> TagSet { tags::encode(&ROOT_TAG_MAP, self) }

    pub fn from_tags(tx_id: Option<TxId>, tags: &TagSet) -> Result<Self, DecodeError> {
        let mut fields = tags::decode(&ROOT_TAG_MAP, tags);
        expect_type(&mut fields, NodeType::Root)?;
        Ok(Self {
            tx_id,
            major_version: fields.take_u32(Attribute::MajorVersion)?,
            root: fields.take_required(Attribute::Root)?.into(),
            created_at: fields.take_created_at()?,
            tail: fields.take(Attribute::Tail).map(NodeId::from),
            head: fields.take_required(Attribute::Head)?.into(),
            other_tags: fields.other_tags,
        })
    }
}

impl Node {
    /// The next record after `previous`, on the same line and depth.
    pub fn following(previous: &AnyNode, head: NodeId, created_at: DateTime<Utc>) -> Self {
        Self {
            tx_id: None,
            major_version: previous.major_version(),
            root: previous.root().clone(),
            created_at,
            tail: previous.head().clone(),
            head,
            depth: previous.depth(),
            other_tags: BTreeMap::new(),
        }
    }

    pub fn to_tags(&self) -> TagSet { tags::encode(&NODE_TAG_MAP, self) }

    pub fn from_tags(tx_id: Option<TxId>, tags: &TagSet) -> Result<Self, DecodeError> {
        let mut fields = tags::decode(&NODE_TAG_MAP, tags);
        expect_type(&mut fields, NodeType::Node)?;
        Ok(Self {
            tx_id,
            major_version: fields.take_u32(Attribute::MajorVersion)?,
            root: fields.take_required(Attribute::Root)?.into(),
            created_at: fields.take_created_at()?,
            tail: fields.take_required(Attribute::Tail)?.into(),
            head: fields.take_required(Attribute::Head)?.into(),
            depth: fields.take_u32(Attribute::Depth)?,
            other_tags: fields.other_tags,
        })
    }
}

impl BranchNode {
    /// Forks a new branch one level below `fork_point`.
    pub fn forking(fork_point: &AnyNode, head: NodeId, created_at: DateTime<Utc>) -> Self {
        Self {
            tx_id: None,
            major_version: fork_point.major_version(),
            root: fork_point.root().clone(),
            created_at,
            tail: fork_point.head().clone(),
            head,
            depth: fork_point.depth() + 1,
            branch_tail: fork_point.head().clone(),
            other_tags: BTreeMap::new(),
        }
    }

    /// The next record on the same branch.
    pub fn following(previous: &BranchNode, head: NodeId, created_at: DateTime<Utc>) -> Self {
        Self {
            tx_id: None,
            major_version: previous.major_version,
            root: previous.root.clone(),
            created_at,
            tail: previous.head.clone(),
            head,
            depth: previous.depth,
            branch_tail: previous.branch_tail.clone(),
            other_tags: BTreeMap::new(),
        }
    }

    pub fn to_tags(&self) -> TagSet { tags::encode(&BRANCH_TAG_MAP, self) }

    pub fn from_tags(tx_id: Option<TxId>, tags: &TagSet) -> Result<Self, DecodeError> {
        let mut fields = tags::decode(&BRANCH_TAG_MAP, tags);
        expect_type(&mut fields, NodeType::Node)?;
        Ok(Self {
            tx_id,
            major_version: fields.take_u32(Attribute::MajorVersion)?,
            root: fields.take_required(Attribute::Root)?.into(),
            created_at: fields.take_created_at()?,
            tail: fields.take_required(Attribute::Tail)?.into(),
            head: fields.take_required(Attribute::Head)?.into(),
            depth: fields.take_u32(Attribute::Depth)?,
            branch_tail: fields.take_required(Attribute::BranchTail)?.into(),
            other_tags: fields.other_tags,
        })
    }
}

fn expect_type(fields: &mut TagFields, expected: NodeType) -> Result<(), DecodeError> {
    let found = fields.take_type()?;
    if found != expected {
        return Err(DecodeError::UnexpectedType { expected, found });
    }
    Ok(())
}

impl AnyNode {
    /// Decodes any kind of record. `RDT-Type` separates roots from nodes, and the
    /// presence of `Branch-Tail-Node` separates branch nodes from plain ones.
    pub fn from_tags(tx_id: Option<TxId>, tags: &TagSet) -> Result<Self, DecodeError> {
        match tags.get(Attribute::Type.tag_name()).map(str::parse::<NodeType>).transpose()? {
            Some(NodeType::Root) => Ok(AnyNode::Root(RootNode::from_tags(tx_id, tags)?)),
            Some(NodeType::Node) => Self::chain_node_from_tags(tx_id, tags),
            None => Err(DecodeError::MissingTag(Attribute::Type.tag_name())),
        }
    }

    /// Decodes a record that must be a plain or branch node.
    pub fn chain_node_from_tags(tx_id: Option<TxId>, tags: &TagSet) -> Result<Self, DecodeError> {
        if tags.contains(Attribute::BranchTail.tag_name()) {
            Ok(AnyNode::Branch(BranchNode::from_tags(tx_id, tags)?))
        } else {
            Ok(AnyNode::Node(Node::from_tags(tx_id, tags)?))
        }
    }

    pub fn to_tags(&self) -> TagSet { tags::encode(self.tag_map(), self) }

    pub fn tag_map(&self) -> &'static TagMap {
        match self {
            AnyNode::Root(_) => &ROOT_TAG_MAP,
            AnyNode::Node(_) => &NODE_TAG_MAP,
            AnyNode::Branch(_) => &BRANCH_TAG_MAP,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            AnyNode::Root(_) => NodeType::Root,
            AnyNode::Node(_) | AnyNode::Branch(_) => NodeType::Node,
        }
    }

    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            AnyNode::Root(n) => n.tx_id.as_ref(),
            AnyNode::Node(n) => n.tx_id.as_ref(),
            AnyNode::Branch(n) => n.tx_id.as_ref(),
        }
    }

    pub(crate) fn set_tx_id(&mut self, tx_id: TxId) {
        match self {
            AnyNode::Root(n) => n.tx_id = Some(tx_id),
            AnyNode::Node(n) => n.tx_id = Some(tx_id),
            AnyNode::Branch(n) => n.tx_id = Some(tx_id),
        }
    }

    pub(crate) fn set_major_version(&mut self, major_version: u32) {
        match self {
            AnyNode::Root(n) => n.major_version = major_version,
            AnyNode::Node(n) => n.major_version = major_version,
            AnyNode::Branch(n) => n.major_version = major_version,
        }
    }

    pub fn major_version(&self) -> u32 {
        match self {
            AnyNode::Root(n) => n.major_version,
            AnyNode::Node(n) => n.major_version,
            AnyNode::Branch(n) => n.major_version,
        }
    }

    pub fn root(&self) -> &NodeId {
        match self {
            AnyNode::Root(n) => &n.root,
            AnyNode::Node(n) => &n.root,
            AnyNode::Branch(n) => &n.root,
        }
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        match self {
            AnyNode::Root(n) => &n.created_at,
            AnyNode::Node(n) => &n.created_at,
            AnyNode::Branch(n) => &n.created_at,
        }
    }

    pub fn tail(&self) -> Option<&NodeId> {
        match self {
            AnyNode::Root(n) => n.tail.as_ref(),
            AnyNode::Node(n) => Some(&n.tail),
            AnyNode::Branch(n) => Some(&n.tail),
        }
    }

    pub fn head(&self) -> &NodeId {
        match self {
            AnyNode::Root(n) => &n.head,
            AnyNode::Node(n) => &n.head,
            AnyNode::Branch(n) => &n.head,
        }
    }

    /// Roots live on the main line.
    pub fn depth(&self) -> u32 {
        match self {
            AnyNode::Root(_) => 0,
            AnyNode::Node(n) => n.depth,
            AnyNode::Branch(n) => n.depth,
        }
    }

    pub fn branch_tail(&self) -> Option<&NodeId> {
        match self {
            AnyNode::Branch(n) => Some(&n.branch_tail),
            _ => None,
        }
    }

    pub fn is_branch(&self) -> bool { matches!(self, AnyNode::Branch(_)) }

    pub fn other_tags_mut(&mut self) -> &mut BTreeMap<String, String> {
        match self {
            AnyNode::Root(n) => &mut n.other_tags,
            AnyNode::Node(n) => &mut n.other_tags,
            AnyNode::Branch(n) => &mut n.other_tags,
        }
    }
}

impl From<RootNode> for AnyNode {
    fn from(node: RootNode) -> Self { AnyNode::Root(node) }
}

impl From<Node> for AnyNode {
    fn from(node: Node) -> Self { AnyNode::Node(node) }
}

impl From<BranchNode> for AnyNode {
    fn from(node: BranchNode) -> Self { AnyNode::Branch(node) }
}

impl ChainMember for AnyNode {
    fn root(&self) -> &NodeId { AnyNode::root(self) }
}

impl ChainMember for RootNode {
    fn root(&self) -> &NodeId { &self.root }
}

impl ChainMember for Node {
    fn root(&self) -> &NodeId { &self.root }
}

impl ChainMember for BranchNode {
    fn root(&self) -> &NodeId { &self.root }
}

impl TagSchema for RootNode {
    fn attribute(&self, attribute: Attribute) -> Option<String> {
        match attribute {
            Attribute::Type => Some(NodeType::Root.as_str().to_string()),
            Attribute::MajorVersion => Some(self.major_version.to_string()),
            Attribute::Root => Some(self.root.to_string()),
            Attribute::CreatedAt => Some(tags::format_timestamp(&self.created_at)),
            Attribute::Tail => self.tail.as_ref().map(NodeId::to_string),
            Attribute::Head => Some(self.head.to_string()),
            Attribute::Depth | Attribute::BranchTail => None,
        }
    }

    fn other_tags(&self) -> &BTreeMap<String, String> { &self.other_tags }
}

impl TagSchema for Node {
    fn attribute(&self, attribute: Attribute) -> Option<String> {
        match attribute {
            Attribute::Type => Some(NodeType::Node.as_str().to_string()),
            Attribute::MajorVersion => Some(self.major_version.to_string()),
            Attribute::Root => Some(self.root.to_string()),
            Attribute::CreatedAt => Some(tags::format_timestamp(&self.created_at)),
            Attribute::Tail => Some(self.tail.to_string()),
            Attribute::Head => Some(self.head.to_string()),
            Attribute::Depth => Some(self.depth.to_string()),
            Attribute::BranchTail => None,
        }
    }

    fn other_tags(&self) -> &BTreeMap<String, String> { &self.other_tags }
}

impl TagSchema for BranchNode {
    fn attribute(&self, attribute: Attribute) -> Option<String> {
        match attribute {
            Attribute::Type => Some(NodeType::Node.as_str().to_string()),
            Attribute::MajorVersion => Some(self.major_version.to_string()),
            Attribute::Root => Some(self.root.to_string()),
            Attribute::CreatedAt => Some(tags::format_timestamp(&self.created_at)),
            Attribute::Tail => Some(self.tail.to_string()),
            Attribute::Head => Some(self.head.to_string()),
            Attribute::Depth => Some(self.depth.to_string()),
            Attribute::BranchTail => Some(self.branch_tail.to_string()),
        }
    }

    fn other_tags(&self) -> &BTreeMap<String, String> { &self.other_tags }
}

impl TagSchema for AnyNode {
    fn attribute(&self, attribute: Attribute) -> Option<String> {
        match self {
            AnyNode::Root(n) => n.attribute(attribute),
            AnyNode::Node(n) => n.attribute(attribute),
            AnyNode::Branch(n) => n.attribute(attribute),
        }
    }

    fn other_tags(&self) -> &BTreeMap<String, String> {
        match self {
            AnyNode::Root(n) => &n.other_tags,
            AnyNode::Node(n) => &n.other_tags,
            AnyNode::Branch(n) => &n.other_tags,
        }
    }
}
