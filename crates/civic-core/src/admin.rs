//! Administrator workflow: status transitions and department assignment.
//!
//! ```text
//!            set_status / assign_department
//!  Pending ───────────────────────────────▶ In Progress
//!     │                                         │
//!     └──────────────▶ Resolved ◀───────────────┤
//!     └──────────────▶ Rejected ◀───────────────┘   (reason + audit comment)
//! ```
//!
//! Resolved and Rejected have no defined exits, but leaving them is
//! allowed and logged rather than refused.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::comments;
use crate::error::{CivicError, Result};
use crate::model::{Caller, Department, Issue, Status};
use crate::query::IssueUpdate;
use crate::store::IssueStore;

pub use crate::model::default_department;

/// An administrator action submitted from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    StatusUpdate {
        new_status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    AssignDepartment { department: String },
}

/// Apply a dashboard action to an issue.
///
/// # Errors
///
/// See [`set_status`] and [`assign_department`].
pub fn apply(
    store: &mut IssueStore,
    caller: &Caller,
    issue_id: u64,
    action: &AdminAction,
) -> Result<Issue> {
    match action {
        AdminAction::StatusUpdate { new_status, reason } => {
            set_status(store, caller, issue_id, new_status, reason.as_deref())
        }
        AdminAction::AssignDepartment { department } => {
            assign_department(store, caller, issue_id, department)
        }
    }
}

/// Move an issue to `new_status`.
///
/// Rejection needs a non-blank reason, recorded as one `Administrator`
/// comment in the same update as the status change. A reason given for
/// any other status is ignored.
///
/// # Errors
///
/// - `Unauthorized` if the caller is not privileged.
/// - `InvalidTransition` if `new_status` is not a recognized status.
/// - `IssueNotFound` if the issue doesn't exist.
/// - `Validation` if rejecting without a reason.
pub fn set_status(
    store: &mut IssueStore,
    caller: &Caller,
    issue_id: u64,
    new_status: &str,
    reason: Option<&str>,
) -> Result<Issue> {
    guard(caller, "status update", issue_id)?;
    let status: Status = new_status.parse()?;
    let current = store.get(issue_id)?.status;

    let mut update = IssueUpdate {
        status: Some(status),
        ..Default::default()
    };
    if status == Status::Rejected {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| CivicError::validation("reason", "required when rejecting an issue"))?;
        update
            .append_comments
            .push(comments::compose_system(store, issue_id, &comments::rejection_note(reason)));
    }

    if current.is_terminal() && current != status {
        warn!(issue_id, from = %current, to = %status, "leaving terminal status");
    }

    let updated = store.update(issue_id, &update)?;
    info!(issue_id, from = %current, to = %status, "status updated");
    Ok(updated)
}

/// Assign a department, moving a Pending issue to In Progress.
///
/// Always appends one `Administrator` comment naming the department,
/// even when re-assigning the same department.
///
/// # Errors
///
/// - `Unauthorized` if the caller is not privileged.
/// - `Validation` if `department` is unknown or not assignable.
/// - `IssueNotFound` if the issue doesn't exist.
pub fn assign_department(
    store: &mut IssueStore,
    caller: &Caller,
    issue_id: u64,
    department: &str,
) -> Result<Issue> {
    guard(caller, "department assignment", issue_id)?;
    let department: Department = department.parse()?;
    if !department.is_assignable() {
        return Err(CivicError::validation(
            "department",
            format!("'{department}' cannot be assigned"),
        ));
    }
    let current = store.get(issue_id)?.status;

    let note = comments::compose_system(store, issue_id, &comments::assignment_note(department));
    let update = IssueUpdate {
        status: (current == Status::Pending).then_some(Status::InProgress),
        assigned_department: Some(department),
        append_comments: vec![note],
        ..Default::default()
    };

    let updated = store.update(issue_id, &update)?;
    info!(issue_id, department = %department, status = %updated.status, "department assigned");
    Ok(updated)
}

fn guard(caller: &Caller, action: &str, issue_id: u64) -> Result<()> {
    caller.require_privilege(action).inspect_err(|_| {
        warn!(
            issue_id,
            identity = caller.identity().unwrap_or("<anonymous>"),
            action,
            "privileged action refused"
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, IssueDraft, SYSTEM_AUTHOR};

    fn setup() -> (IssueStore, u64, Caller) {
        let mut store = IssueStore::new();
        let issue = store
            .create(
                &IssueDraft::new(
                    "Garbage Pileup in Park",
                    "Not collected for a week",
                    "Lodhi Gardens",
                    Category::Sanitation,
                ),
                "0xuser",
            )
            .unwrap();
        (store, issue.id, Caller::admin("0xadmin"))
    }

    #[test]
    fn test_set_status_requires_privilege() {
        let (mut store, id, _) = setup();
        let result = set_status(&mut store, &Caller::user("0xuser"), id, "Resolved", None);
        assert!(matches!(result, Err(CivicError::Unauthorized { .. })));
        assert_eq!(store.get(id).unwrap().status, Status::Pending);
    }

    #[test]
    fn test_set_status_direct() {
        let (mut store, id, admin) = setup();
        let updated = set_status(&mut store, &admin, id, "In Progress", None).unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert!(updated.comments.is_empty());

        let updated = set_status(&mut store, &admin, id, "Resolved", Some("ignored")).unwrap();
        assert_eq!(updated.status, Status::Resolved);
        assert!(updated.comments.is_empty());
    }

    #[test]
    fn test_reject_without_reason_fails() {
        let (mut store, id, admin) = setup();
        for reason in [None, Some(""), Some("   ")] {
            let result = set_status(&mut store, &admin, id, "Rejected", reason);
            assert!(matches!(result, Err(CivicError::Validation { ref field, .. }) if field == "reason"));
        }
        let issue = store.get(id).unwrap();
        assert_eq!(issue.status, Status::Pending);
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn test_reject_with_reason_appends_one_comment() {
        let (mut store, id, admin) = setup();
        let updated = set_status(&mut store, &admin, id, "Rejected", Some("Duplicate")).unwrap();
        assert_eq!(updated.status, Status::Rejected);
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].author, SYSTEM_AUTHOR);
        assert_eq!(
            updated.comments[0].text,
            "Status changed to Rejected. Reason: Duplicate"
        );
    }

    #[test]
    fn test_unknown_status_is_invalid_transition() {
        let (mut store, id, admin) = setup();
        let result = set_status(&mut store, &admin, id, "Closed", None);
        assert!(matches!(result, Err(CivicError::InvalidTransition { .. })));
    }

    #[test]
    fn test_set_status_missing_issue() {
        let (mut store, _, admin) = setup();
        let result = set_status(&mut store, &admin, 77, "Resolved", None);
        assert!(matches!(result, Err(CivicError::IssueNotFound { id: 77 })));
    }

    #[test]
    fn test_terminal_status_can_be_left() {
        let (mut store, id, admin) = setup();
        set_status(&mut store, &admin, id, "Resolved", None).unwrap();
        let reopened = set_status(&mut store, &admin, id, "Pending", None).unwrap();
        assert_eq!(reopened.status, Status::Pending);
    }

    #[test]
    fn test_assign_department_moves_pending_to_in_progress() {
        let (mut store, id, admin) = setup();
        let updated = assign_department(&mut store, &admin, id, "Sanitation").unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.assigned_department, Some(Department::Sanitation));
        assert_eq!(updated.comments.len(), 1);
        assert!(updated.comments[0].text.contains("Sanitation"));
        assert!(updated.comments[0].is_system());
    }

    #[test]
    fn test_assign_department_keeps_non_pending_status() {
        let (mut store, id, admin) = setup();
        set_status(&mut store, &admin, id, "Resolved", None).unwrap();
        let updated = assign_department(&mut store, &admin, id, "Parks").unwrap();
        assert_eq!(updated.status, Status::Resolved);
        assert_eq!(updated.assigned_department, Some(Department::Parks));
    }

    #[test]
    fn test_reassignment_appends_again() {
        let (mut store, id, admin) = setup();
        assign_department(&mut store, &admin, id, "Water").unwrap();
        let updated = assign_department(&mut store, &admin, id, "Water").unwrap();
        assert_eq!(updated.comments.len(), 2);
    }

    #[test]
    fn test_assign_rejects_unknown_and_general() {
        let (mut store, id, admin) = setup();
        for dept in ["Fire Brigade", "General", ""] {
            let result = assign_department(&mut store, &admin, id, dept);
            assert!(matches!(result, Err(CivicError::Validation { .. })), "{dept}");
        }
        let issue = store.get(id).unwrap();
        assert_eq!(issue.assigned_department, None);
        assert_eq!(issue.status, Status::Pending);
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn test_assign_requires_privilege() {
        let (mut store, id, _) = setup();
        let result = assign_department(&mut store, &Caller::anonymous(), id, "Water");
        assert!(matches!(result, Err(CivicError::Unauthorized { .. })));
    }

    #[test]
    fn test_apply_dispatch() {
        let (mut store, id, admin) = setup();
        let action: AdminAction = serde_json::from_str(
            r#"{"action":"status_update","new_status":"Rejected","reason":"Out of scope"}"#,
        )
        .unwrap();
        let updated = apply(&mut store, &admin, id, &action).unwrap();
        assert_eq!(updated.status, Status::Rejected);

        let action = AdminAction::AssignDepartment {
            department: "Transport".into(),
        };
        let updated = apply(&mut store, &admin, id, &action).unwrap();
        assert_eq!(updated.department(), Department::Transport);
    }
}
