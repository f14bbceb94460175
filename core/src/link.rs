use crate::compose::WalletFilter;
use crate::error::RdtError;
use crate::ledger::Ledger;
use crate::node::AnyNode;
use crate::rdt::Rdt;
use crate::resolve::NodeQuery;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Depth the neighbour is looked up at.
    pub depth: u32,
    pub wallet: Option<WalletFilter>,
}

impl LinkOptions {
    pub fn at_depth(depth: u32) -> Self { Self { depth, wallet: None } }

    pub fn wallet(mut self, wallet: impl Into<Option<WalletFilter>>) -> Self {
        self.wallet = wallet.into();
        self
    }
}

impl<L: Ledger> Rdt<L> {
    /// The record `node` continues from, if any.
    pub async fn get_tail_node(&self, node: &AnyNode, options: &LinkOptions) -> Result<Option<AnyNode>, RdtError> {
        let Some(tail) = node.tail() else {
            return Ok(None);
        };
        let query = NodeQuery::of(node).head(tail.clone()).depth(options.depth).wallet(options.wallet.clone());
        Ok(self.get_node(&query).await?.into_first())
    }

    /// The record continuing from `node`, if any.
    pub async fn get_head_node(&self, node: &AnyNode, options: &LinkOptions) -> Result<Option<AnyNode>, RdtError> {
        let query = NodeQuery::of(node).tail(node.head().clone()).depth(options.depth).wallet(options.wallet.clone());
        Ok(self.get_node(&query).await?.into_first())
    }
}
