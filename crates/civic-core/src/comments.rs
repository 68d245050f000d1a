//! Append-only comment thread per issue.

use chrono::Utc;
use tracing::info;

use crate::error::{CivicError, Result};
use crate::model::{Comment, Department, SYSTEM_AUTHOR};
use crate::query::IssueUpdate;
use crate::store::IssueStore;

/// Build a comment for `issue_id` with a fresh ID and the current time.
///
/// The comment is not attached until it goes through `IssueStore::update`.
pub fn compose(store: &mut IssueStore, issue_id: u64, author: &str, text: &str) -> Comment {
    Comment {
        id: store.allocate_comment_id(),
        issue_id,
        author: author.to_string(),
        text: text.trim().to_string(),
        created_at: Utc::now(),
    }
}

/// Build an `Administrator` audit comment.
pub fn compose_system(store: &mut IssueStore, issue_id: u64, text: &str) -> Comment {
    compose(store, issue_id, SYSTEM_AUTHOR, text)
}

/// Append a comment to an issue.
///
/// # Errors
///
/// Returns `Validation` if `text` is blank or `author` is the reserved
/// system author, or `IssueNotFound` if the issue doesn't exist.
pub fn add(store: &mut IssueStore, issue_id: u64, author: &str, text: &str) -> Result<Comment> {
    if text.trim().is_empty() {
        return Err(CivicError::validation("text", "cannot be empty"));
    }
    if author.trim().eq_ignore_ascii_case(SYSTEM_AUTHOR) {
        return Err(CivicError::validation(
            "author",
            format!("'{SYSTEM_AUTHOR}' is reserved for workflow notes"),
        ));
    }
    if !store.contains(issue_id) {
        return Err(CivicError::IssueNotFound { id: issue_id });
    }

    let comment = compose(store, issue_id, author, text);
    store.update(
        issue_id,
        &IssueUpdate {
            append_comments: vec![comment.clone()],
            ..Default::default()
        },
    )?;

    info!(issue_id, comment_id = comment.id, author, "comment added");
    Ok(comment)
}

/// Audit text recorded when an issue is rejected.
#[must_use]
pub fn rejection_note(reason: &str) -> String {
    format!("Status changed to Rejected. Reason: {}", reason.trim())
}

/// Audit text recorded when a department is assigned.
#[must_use]
pub fn assignment_note(department: Department) -> String {
    format!("Assigned to {department} department")
}
