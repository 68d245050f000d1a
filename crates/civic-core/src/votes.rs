//! At-most-one vote per (issue, identity).
//!
//! The tracker only records who voted. Bumping `Issue::votes` is the
//! caller's job and must happen in the same step (see `IssueDesk::vote`).

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::{CivicError, Result};

/// Result of a vote attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    /// False when the identity had already voted; nothing was recorded.
    pub applied: bool,
}

/// Records which identities have voted on which issues.
#[derive(Debug, Clone, Default)]
pub struct VoteTracker {
    voters: HashMap<u64, HashSet<String>>,
}

impl VoteTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote unless this identity already voted on the issue.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if `identity` is absent or blank.
    pub fn try_vote(&mut self, issue_id: u64, identity: Option<&str>) -> Result<VoteOutcome> {
        let identity = identity
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CivicError::unauthorized("voting requires an identity"))?;

        let applied = self
            .voters
            .entry(issue_id)
            .or_default()
            .insert(identity.to_string());
        if !applied {
            debug!(issue_id, identity, "repeat vote ignored");
        }
        Ok(VoteOutcome { applied })
    }

    /// Undo a vote recorded by `try_vote` whose counter update failed.
    pub(crate) fn retract(&mut self, issue_id: u64, identity: &str) {
        if let Some(voters) = self.voters.get_mut(&issue_id) {
            voters.remove(identity);
        }
    }

    #[must_use]
    pub fn has_voted(&self, issue_id: u64, identity: &str) -> bool {
        self.voters
            .get(&issue_id)
            .is_some_and(|voters| voters.contains(identity))
    }

    /// Number of distinct identities that voted on the issue.
    #[must_use]
    pub fn count(&self, issue_id: u64) -> usize {
        self.voters.get(&issue_id).map_or(0, HashSet::len)
    }
}
