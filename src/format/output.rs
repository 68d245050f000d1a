use civic_core::{Category, CivicError, Department, Issue, default_department};
use serde::Serialize;

use crate::session::Reply;

/// Issue as shown to a particular caller.
#[derive(Debug, Clone, Serialize)]
pub struct IssueView {
    #[serde(flatten)]
    pub issue: Issue,
    /// Assigned department, or the category default.
    pub department: Department,
    /// Whether the acting identity has upvoted this issue.
    pub upvoted: bool,
}

impl IssueView {
    #[must_use]
    pub fn new(issue: Issue, upvoted: bool) -> Self {
        let department = issue.department();
        Self {
            issue,
            department,
            upvoted,
        }
    }
}

/// Error details in a step record.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub kind: &'static str,
    pub message: String,
}

impl From<&CivicError> for ErrorRecord {
    fn from(err: &CivicError) -> Self {
        Self {
            kind: err.kind().as_str(),
            message: err.to_string(),
        }
    }
}

/// One executed script line.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub line: usize,
    pub op: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

impl StepRecord {
    #[must_use]
    pub fn from_outcome(line: usize, op: &'static str, outcome: &Result<Reply, CivicError>) -> Self {
        match outcome {
            Ok(reply) => Self {
                line,
                op,
                ok: true,
                result: Some(reply.clone()),
                error: None,
            },
            Err(err) => Self {
                line,
                op,
                ok: false,
                result: None,
                error: Some(ErrorRecord::from(err)),
            },
        }
    }
}

/// Category listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub category: Category,
    pub icon: &'static str,
    pub department: Department,
    pub appeal: bool,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            category,
            icon: category.icon(),
            department: default_department(category),
            appeal: category.is_appeal(),
        }
    }
}
