use tracing::{debug, warn};

use crate::compose::{self, WalletFilter};
use crate::error::{ArgumentError, RdtError};
use crate::ledger::Ledger;
use crate::node::{ChainMember, RootNode};
use crate::rdt::Rdt;
use trackweave_proto::NodeId;

/// Which root record to look for. At least one of `chain` and `wallet` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootQuery {
    pub chain: Option<NodeId>,
    pub wallet: Option<WalletFilter>,
    pub tags: Vec<(String, String)>,
}

impl RootQuery {
    pub fn new() -> Self { Self::default() }

    pub fn for_chain(chain: impl Into<NodeId>) -> Self { Self { chain: Some(chain.into()), ..Self::default() } }

    /// The root of the chain `member` belongs to.
    pub fn of(member: &impl ChainMember) -> Self { Self::for_chain(member.root().clone()) }

    pub fn for_wallet(wallet: WalletFilter) -> Self { Self { wallet: Some(wallet), ..Self::default() } }

    pub fn chain(mut self, chain: impl Into<NodeId>) -> Self {
        self.chain = Some(chain.into());
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
        if self.chain.is_none() && self.wallet.is_none() {
            return Err(ArgumentError::MissingRootOrWallet);
        }
        Ok(())
    }
}

impl<L: Ledger> Rdt<L> {
    /// The canonical root record: the oldest of those matching `query`.
    pub async fn find_root_node(&self, query: &RootQuery) -> Result<Option<RootNode>, RdtError> {
        query.validate()?;

        let filter = compose::root_filter(query);
        let tx_ids = self.ledger.query(&filter).await?;
        debug!("{} root candidates for {}", tx_ids.len(), filter);

        let Some(tx_id) = self.ledger.ordering().oldest(tx_ids) else {
            return Ok(None);
        };

        let tags = self.ledger.fetch_tags(&tx_id).await?;
        let root = match RootNode::from_tags(Some(tx_id.clone()), &tags) {
            Ok(root) => root,
            Err(source) => return Err(RdtError::Decode { tx_id, source }),
        };

        if !self.config.admits_version(root.major_version) {
            warn!("canonical root {} has major version {}, ignoring it", tx_id, root.major_version);
            return Ok(None);
        }
        Ok(Some(root))
    }
}
