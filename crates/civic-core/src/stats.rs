//! Aggregate statistics over a set of issues.

use serde::Serialize;

use crate::model::{Category, Issue, Status};

/// Count of issues in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Summary counts for a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub total_votes: u64,
    /// Non-empty categories, in `Category::ALL` order.
    pub by_category: Vec<CategoryCount>,
}

impl IssueStats {
    #[must_use]
    pub fn compute<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut stats = Self::default();
        let mut per_category = [0usize; Category::ALL.len()];

        for issue in issues {
            stats.total += 1;
            stats.total_votes += issue.votes;
            match issue.status {
                Status::Pending => stats.pending += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Resolved => stats.resolved += 1,
                Status::Rejected => stats.rejected += 1,
            }
            if let Some(idx) = Category::ALL.iter().position(|c| *c == issue.category) {
                per_category[idx] += 1;
            }
        }

        stats.by_category = Category::ALL
            .into_iter()
            .zip(per_category)
            .filter(|(_, count)| *count > 0)
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        stats
    }

    /// Share of issues that reached `Resolved`, in percent.
    #[must_use]
    pub fn resolution_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 * 100.0 / self.total as f64
        }
    }
}
