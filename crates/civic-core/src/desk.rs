//! Command surface used by the presentation layer.
//!
//! `IssueDesk` owns the store and the vote tracker. Every command takes
//! `&mut self`, so there is exactly one writer, and each command either
//! fully applies or returns an error with nothing changed.

use serde::Serialize;
use tracing::{debug, info};

use crate::admin::{self, AdminAction};
use crate::comments;
use crate::error::{CivicError, Result};
use crate::filter;
use crate::model::{Caller, Category, Comment, Issue, IssueDraft};
use crate::query::{IssueQuery, IssueUpdate};
use crate::stats::IssueStats;
use crate::store::IssueStore;
use crate::votes::VoteTracker;

/// Identities that submitted the built-in sample reports.
pub const SAMPLE_AUTHORS: [&str; 2] = [
    "0x1234567890123456789012345678901234567890",
    "0x0987654321098765432109876543210987654321",
];

/// Result of `IssueDesk::vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub issue_id: u64,
    /// False for a repeat vote; the count is unchanged.
    pub applied: bool,
    pub votes: u64,
}

/// Issue state and query engine.
#[derive(Debug, Clone, Default)]
pub struct IssueDesk {
    store: IssueStore,
    votes: VoteTracker,
}

impl IssueDesk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a configured, empty store.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the store already holds issues, since their
    /// vote counts would have no recorded voters.
    pub fn with_store(store: IssueStore) -> Result<Self> {
        if !store.is_empty() {
            return Err(CivicError::validation(
                "store",
                format!("must be empty, found {} issues", store.len()),
            ));
        }
        Ok(Self {
            store,
            votes: VoteTracker::new(),
        })
    }

    #[must_use]
    pub const fn store(&self) -> &IssueStore {
        &self.store
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Submit a new report as `caller`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without an identity, or the validation
    /// errors of `IssueStore::create`.
    pub fn create_issue(&mut self, caller: &Caller, draft: &IssueDraft) -> Result<Issue> {
        let author = caller.require_identity("reporting an issue")?;
        self.store.create(draft, author)
    }

    /// Upvote an issue once per identity.
    ///
    /// Recording the voter and bumping the counter happen together: if
    /// the counter update fails the recorded vote is withdrawn.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` for an unknown issue or `Unauthorized`
    /// without an identity.
    pub fn vote(&mut self, issue_id: u64, identity: Option<&str>) -> Result<VoteReceipt> {
        let current = self.store.get(issue_id)?.votes;
        let outcome = self.votes.try_vote(issue_id, identity)?;
        if !outcome.applied {
            return Ok(VoteReceipt {
                issue_id,
                applied: false,
                votes: current,
            });
        }

        let update = IssueUpdate {
            votes: Some(current + 1),
            ..Default::default()
        };
        match self.store.update(issue_id, &update) {
            Ok(issue) => {
                info!(
                    issue_id,
                    votes = issue.votes,
                    voters = self.votes.count(issue_id),
                    "vote recorded"
                );
                Ok(VoteReceipt {
                    issue_id,
                    applied: true,
                    votes: issue.votes,
                })
            }
            Err(err) => {
                if let Some(identity) = identity {
                    self.votes.retract(issue_id, identity);
                }
                Err(err)
            }
        }
    }

    /// Comment on an issue.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without an author, `Validation` for blank
    /// text, or `IssueNotFound`.
    pub fn add_comment(&mut self, issue_id: u64, author: Option<&str>, text: &str) -> Result<Comment> {
        let author = author
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| CivicError::unauthorized("commenting requires an identity"))?;
        comments::add(&mut self.store, issue_id, author, text)
    }

    /// # Errors
    ///
    /// See [`admin::set_status`].
    pub fn set_status(
        &mut self,
        caller: &Caller,
        issue_id: u64,
        status: &str,
        reason: Option<&str>,
    ) -> Result<Issue> {
        admin::set_status(&mut self.store, caller, issue_id, status, reason)
    }

    /// # Errors
    ///
    /// See [`admin::assign_department`].
    pub fn assign_department(&mut self, caller: &Caller, issue_id: u64, department: &str) -> Result<Issue> {
        admin::assign_department(&mut self.store, caller, issue_id, department)
    }

    /// # Errors
    ///
    /// See [`admin::apply`].
    pub fn apply_admin_action(&mut self, caller: &Caller, issue_id: u64, action: &AdminAction) -> Result<Issue> {
        admin::apply(&mut self.store, caller, issue_id, action)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The filtered, sorted view of all issues for `caller`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if a non-privileged caller uses the
    /// department, status, or appeals filters.
    pub fn query_issues(&self, caller: &Caller, query: &IssueQuery) -> Result<Vec<&Issue>> {
        if query.uses_admin_filters() {
            caller.require_privilege("dashboard filters")?;
        }
        let view = filter::view(self.store.list(), query, caller.identity());
        debug!(tab = query.tab.as_str(), sort = %query.sort_by, matched = view.len(), "issues queried");
        Ok(view)
    }

    /// Statistics over the view `query` selects.
    ///
    /// # Errors
    ///
    /// Same as [`Self::query_issues`].
    pub fn stats(&self, caller: &Caller, query: &IssueQuery) -> Result<IssueStats> {
        self.query_issues(caller, query)
            .map(|view| IssueStats::compute(view.into_iter()))
    }

    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist.
    pub fn get_issue(&self, issue_id: u64) -> Result<&Issue> {
        self.store.get(issue_id)
    }

    #[must_use]
    pub fn has_voted(&self, issue_id: u64, identity: &str) -> bool {
        self.votes.has_voted(issue_id, identity)
    }

    // ========================================================================
    // Sample data
    // ========================================================================

    /// Load the two demonstration reports through the normal commands.
    ///
    /// The garbage report is filed first so the pothole is the newest.
    ///
    /// # Errors
    ///
    /// Propagates any command failure.
    pub fn seed_samples(&mut self) -> Result<Vec<Issue>> {
        let garbage = self.create_issue(
            &Caller::user(SAMPLE_AUTHORS[1]),
            &IssueDraft::new(
                "Garbage Pileup in Park",
                "Garbage hasn't been collected for over a week in the local park",
                "Lodhi Gardens, Delhi",
                Category::Sanitation,
            )
            .with_image("https://images.unsplash.com/photo-1575408264798-b50b252663e6?w=500&auto=format&fit=crop"),
        )?;
        self.cast_sample_votes(garbage.id, 12)?;
        self.assign_department(&Caller::admin(SAMPLE_AUTHORS[0]), garbage.id, "Sanitation")?;

        let pothole = self.create_issue(
            &Caller::user(SAMPLE_AUTHORS[0]),
            &IssueDraft::new(
                "Pothole on Main Road",
                "Large pothole near the intersection causing traffic issues",
                "Connaught Place, Delhi",
                Category::Road,
            )
            .with_image("https://images.unsplash.com/photo-1563555397763-5fc103c6f7b8?w=500&auto=format&fit=crop"),
        )?;
        self.add_comment(pothole.id, Some("Resident1"), "This has been here for weeks!")?;
        self.add_comment(pothole.id, Some("Driver123"), "Damaged my car's suspension")?;
        self.cast_sample_votes(pothole.id, 4)?;

        info!(count = 2, "sample issues seeded");
        [garbage.id, pothole.id]
            .into_iter()
            .map(|id| self.store.get(id).cloned())
            .collect()
    }

    fn cast_sample_votes(&mut self, issue_id: u64, count: usize) -> Result<()> {
        for n in 1..=count {
            let voter = format!("resident-{n}");
            self.vote(issue_id, Some(voter.as_str()))?;
        }
        Ok(())
    }
}
