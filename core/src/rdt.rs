use crate::config::RdtConfig;

/// Entry point for reading and writing chains on a ledger.
///
/// Reads need `L: Ledger`, writes `L: LedgerWriter`; the handle itself holds no other state.
#[derive(Debug, Clone)]
pub struct Rdt<L> {
    pub(crate) ledger: L,
    pub(crate) config: RdtConfig,
}

impl<L> Rdt<L> {
    pub fn new(ledger: L) -> Self { Self::with_config(ledger, RdtConfig::default()) }

    pub fn with_config(ledger: L, config: RdtConfig) -> Self { Self { ledger, config } }

    pub fn ledger(&self) -> &L { &self.ledger }

    pub fn config(&self) -> &RdtConfig { &self.config }
}
