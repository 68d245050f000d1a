//! Filtering and sorting of issue views.
//!
//! Filters run in a fixed order (tab, then category/department/status,
//! then search) and sorting comes last. Sorting is stable, so equal keys
//! keep their store order.

use std::cmp::Reverse;

use crate::model::{Issue, Status};
use crate::query::{AdminView, IssueQuery, SortBy, Tab};

/// Build the ordered view of `issues` for `query`.
///
/// `identity` is the caller's identity, used by the `my` tab; with no
/// identity that tab is empty.
#[must_use]
pub fn view<'a>(issues: &'a [Issue], query: &IssueQuery, identity: Option<&str>) -> Vec<&'a Issue> {
    let term = query.search_term.to_lowercase();

    let mut results: Vec<&Issue> = issues
        .iter()
        .filter(|issue| matches_tab(issue, query.tab, identity))
        .filter(|issue| matches_facets(issue, query))
        .filter(|issue| matches_search(issue, &term))
        .collect();

    sort_issues(&mut results, query.sort_by);
    results
}

fn matches_tab(issue: &Issue, tab: Tab, identity: Option<&str>) -> bool {
    match tab {
        Tab::All => true,
        Tab::My => identity.is_some_and(|id| issue.author == id),
        Tab::Pending => issue.status == Status::Pending,
    }
}

fn matches_facets(issue: &Issue, query: &IssueQuery) -> bool {
    if query.admin_view == AdminView::Appeals && !issue.category.is_appeal() {
        return false;
    }
    if query.category.is_some_and(|category| issue.category != category) {
        return false;
    }
    if query
        .department
        .is_some_and(|department| issue.department() != department)
    {
        return false;
    }
    if query.status.is_some_and(|status| issue.status != status) {
        return false;
    }
    true
}

/// `term` must already be lowercased. Empty matches everything.
fn matches_search(issue: &Issue, term: &str) -> bool {
    term.is_empty()
        || [&issue.title, &issue.description, &issue.location]
            .iter()
            .any(|field| field.to_lowercase().contains(term))
}

fn sort_issues(issues: &mut [&Issue], sort: SortBy) {
    match sort {
        SortBy::Newest => issues.sort_by_key(|issue| Reverse(issue.created_at)),
        SortBy::Oldest => issues.sort_by_key(|issue| issue.created_at),
        SortBy::MostVoted => issues.sort_by_key(|issue| Reverse(issue.votes)),
        SortBy::LeastVoted => issues.sort_by_key(|issue| issue.votes),
    }
}
