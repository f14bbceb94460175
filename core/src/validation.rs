//! The consistency pass applied to resolver candidates.
//!
//! Candidates are folded oldest-first. Each decision depends on the last accepted
//! node, so this cannot be parallelised. Once the chain is found to be
//! inconsistent (a reciprocal cycle, or a branch rejoining before it was forked)
//! everything from that point on is dropped.

use tracing::debug;

use crate::node::AnyNode;
use trackweave_proto::NodeId;

/// Two records pointing at each other at the same depth.
pub fn is_circular(a: &AnyNode, b: &AnyNode) -> bool {
    Some(a.head()) == b.tail() && Some(b.head()) == a.tail() && a.depth() == b.depth()
}

/// A fork point that has to be looked up before a rejoin can be judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ForkPointRequest {
    /// `head` of the record to look for.
    pub branch_tail: NodeId,
    pub depth: u32,
}

#[derive(Debug, Default)]
pub(crate) struct ChainValidator {
    previous: Option<AnyNode>,
    previous_was_branch: bool,
    fork_point: Option<AnyNode>,
    stopped: bool,
    accepted: Vec<AnyNode>,
}

impl ChainValidator {
    pub fn is_stopped(&self) -> bool { self.stopped }

    fn is_rejoin(&self, previous: &AnyNode, candidate: &AnyNode) -> bool {
        self.previous_was_branch && !candidate.is_branch() && candidate.tail() == Some(previous.head())
    }

    /// If `candidate` rejoins the parent chain and we don't yet know where the branch
    /// forked, the fork point the caller has to find. It is searched one level above the
    /// branch, never further.
    pub fn fork_point_needed(&self, candidate: &AnyNode) -> Option<ForkPointRequest> {
        if self.stopped || self.fork_point.is_some() {
            return None;
        }
        let previous = self.previous.as_ref()?;
        if is_circular(previous, candidate) || !self.is_rejoin(previous, candidate) {
            return None;
        }
        Some(ForkPointRequest { branch_tail: previous.branch_tail()?.clone(), depth: previous.depth().saturating_sub(1) })
    }

    pub fn provide_fork_point(&mut self, fork_point: AnyNode) { self.fork_point = Some(fork_point); }

    pub fn push(&mut self, candidate: AnyNode) {
        if self.stopped {
            return;
        }

        if let Some(previous) = &self.previous {
            if is_circular(previous, &candidate) {
                debug!("{:#} and {:#} reference each other, truncating", previous.head(), candidate.head());
                self.stopped = true;
                return;
            }

            if !self.previous_was_branch && candidate.branch_tail() == Some(previous.head()) {
                self.fork_point = Some(previous.clone());
            }

            if self.is_rejoin(previous, &candidate) {
                let Some(fork_point) = &self.fork_point else {
                    debug!("no fork point for the branch rejoined by {:#}, skipping it", candidate.head());
                    return;
                };
                if fork_point.created_at() > candidate.created_at() {
                    debug!("branch rejoined by {:#} predates its fork point {:#}: dead end", candidate.head(), fork_point.head());
                    self.stopped = true;
                    return;
                }
                self.fork_point = None;
            }
        }

        self.previous_was_branch = candidate.is_branch();
        self.previous = Some(candidate.clone());
        self.accepted.push(candidate);
    }

    pub fn finish(self) -> Vec<AnyNode> { self.accepted }
}
