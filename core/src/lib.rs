//! A Rollup Data Tree: linked chains of records, with branches, stored as tags on an
//! append-only ledger.

pub mod compose;
pub mod config;
pub mod error;
pub mod ledger;
pub mod link;
pub mod node;
pub mod publish;
pub mod rdt;
pub mod resolve;
pub mod root;
pub mod tags;
pub mod traverse;
pub mod validation;

pub use trackweave_proto as proto;
pub use trackweave_query as query;

pub use compose::{target_wallet_ops, WalletFilter};
pub use config::{RdtConfig, VersionPolicy};
pub use error::{ArgumentError, DecodeError, LedgerError, RdtError};
pub use ledger::{Ledger, LedgerWriter, ResultOrder, Submission};
pub use link::LinkOptions;
pub use node::{AnyNode, BranchNode, ChainMember, Node, RootNode};
pub use rdt::Rdt;
pub use resolve::{NodeQuery, Resolved};
pub use root::RootQuery;
pub use tags::{Attribute, NodeType};
pub use traverse::{Direction, Traversal, TraverseOptions};
