use serde::{Deserialize, Serialize};

/// What to do with records whose `RDT-Major-Version` differs from ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Accept them, logging a warning.
    #[default]
    Lenient,
    /// Skip them as if they weren't in the ledger.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdtConfig {
    /// Written into every published node and compared against decoded ones.
    pub major_version: u32,
    pub version_policy: VersionPolicy,
    /// Upper bound on concurrent tag fetches within one resolution.
    pub fetch_concurrency: usize,
}

impl Default for RdtConfig {
    fn default() -> Self { Self { major_version: 0, version_policy: VersionPolicy::Lenient, fetch_concurrency: 8 } }
}

impl RdtConfig {
    pub fn new(major_version: u32) -> Self { Self { major_version, ..Self::default() } }

    pub fn strict(major_version: u32) -> Self { Self { major_version, version_policy: VersionPolicy::Strict, ..Self::default() } }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency;
        self
    }

    pub(crate) fn effective_concurrency(&self) -> usize { self.fetch_concurrency.max(1) }

    /// Whether a record written with `major_version` should be used.
    pub fn admits_version(&self, major_version: u32) -> bool {
        if major_version == self.major_version {
            return true;
        }
        match self.version_policy {
            VersionPolicy::Lenient => {
                tracing::warn!("accepting record with major version {} (expected {})", major_version, self.major_version);
                true
            }
            VersionPolicy::Strict => false,
        }
    }
}
