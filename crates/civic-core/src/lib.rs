//! `civic-core` - issue state and query engine for civic issue reporting.
//!
//! Residents submit reports, upvote and comment on them, and browse a
//! filtered, sorted view. Administrators triage reports by changing their
//! status or assigning a department. State lives in memory for the life of
//! the process.
//!
//! # Quick Start
//!
//! ```
//! use civic_core::{Caller, Category, IssueDesk, IssueDraft, IssueQuery, Tab};
//!
//! let mut desk = IssueDesk::new();
//! let resident = Caller::user("0xabc");
//! let admin = Caller::admin("0xadmin");
//!
//! let issue = desk
//!     .create_issue(
//!         &resident,
//!         &IssueDraft::new("Pothole", "Deep pothole", "Ring Road", Category::Road),
//!     )
//!     .unwrap();
//!
//! desk.vote(issue.id, Some("0xabc")).unwrap();
//! desk.assign_department(&admin, issue.id, "Transport").unwrap();
//!
//! let pending = desk
//!     .query_issues(&resident, &IssueQuery::default().tab(Tab::Pending))
//!     .unwrap();
//! assert!(pending.is_empty());
//! ```

pub mod admin;
pub mod comments;
pub mod desk;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod stats;
pub mod store;
pub mod votes;

pub use admin::AdminAction;
pub use desk::{IssueDesk, VoteReceipt};
pub use error::{CivicError, ErrorKind, Result, ValidationError};
pub use model::{
    Caller, Category, Comment, Department, Issue, IssueDraft, Status, default_department,
};
pub use query::{AdminView, IssueQuery, IssueUpdate, SortBy, Tab};
pub use stats::IssueStats;
pub use store::IssueStore;
pub use votes::{VoteOutcome, VoteTracker};
