//! Text formatting functions for `fixd`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - Status icons (○ ◐ ✓ ✗)
//! - Category badges ([🛣️ Road], [🚰 Water], etc.)
//! - Issue line and detail formatting

use std::fmt::Write as _;

use civic_core::{Category, Issue, IssueStats, Status};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::IssueView;
use crate::session::Reply;

/// Widest title shown on a one-line summary, in terminal columns.
pub const TITLE_WIDTH: usize = 48;

/// Status icon characters.
pub mod icons {
    /// Pending - awaiting triage (hollow circle).
    pub const PENDING: &str = "○";
    /// In progress - a department is on it (half-filled).
    pub const IN_PROGRESS: &str = "◐";
    /// Resolved (checkmark).
    pub const RESOLVED: &str = "✓";
    /// Rejected (X mark).
    pub const REJECTED: &str = "✗";
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Pending => icons::PENDING,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Resolved => icons::RESOLVED,
        Status::Rejected => icons::REJECTED,
    }
}

/// Format a category as a bracketed badge with its icon.
#[must_use]
pub fn format_category_badge(category: Category) -> String {
    format!("[{} {}]", category.icon(), category.as_str())
}

/// Cut `title` to at most `max_width` columns, ending in `…` if cut.
#[must_use]
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in title.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Format a single-line issue summary.
///
/// Format: `{icon} #{id} {badge} {title} ({votes} votes)`
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    format!(
        "{} #{} {} {} ({} votes)",
        format_status_icon(issue.status),
        issue.id,
        format_category_badge(issue.category),
        truncate_title(&issue.title, TITLE_WIDTH),
        issue.votes,
    )
}

/// Format the full view of one issue, comments included.
#[must_use]
pub fn format_issue_details(view: &IssueView) -> String {
    let issue = &view.issue;
    let mut out = format!(
        "{} #{} {}\n",
        format_status_icon(issue.status),
        issue.id,
        issue.title
    );
    let _ = writeln!(out, "  Status:     {}", issue.status);
    let _ = writeln!(out, "  Category:   {}", format_category_badge(issue.category));
    let _ = writeln!(out, "  Department: {}", view.department);
    let _ = writeln!(out, "  Location:   {}", issue.location);
    let _ = writeln!(out, "  Reporter:   {}", issue.author);
    let voted = if view.upvoted { " (upvoted)" } else { "" };
    let _ = writeln!(out, "  Votes:      {}{voted}", issue.votes);
    let _ = writeln!(out, "  Reported:   {}", issue.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "\n  {}", issue.description);
    if !issue.comments.is_empty() {
        let _ = writeln!(out, "\n  Comments ({}):", issue.comments.len());
        for comment in &issue.comments {
            let marker = if comment.is_system() { "*" } else { "-" };
            let _ = writeln!(out, "  {marker} {}: {}", comment.author, comment.text);
        }
    }
    out
}

/// Format summary counts for a view.
#[must_use]
pub fn format_stats(stats: &IssueStats) -> String {
    let mut out = format!("{} issues, {} votes\n", stats.total, stats.total_votes);
    let _ = writeln!(
        out,
        "  {} pending  {} in progress  {} resolved  {} rejected",
        stats.pending, stats.in_progress, stats.resolved, stats.rejected
    );
    let _ = writeln!(out, "  Resolution rate: {:.1}%", stats.resolution_rate());
    for entry in &stats.by_category {
        let _ = writeln!(out, "  {} {}", format_category_badge(entry.category), entry.count);
    }
    out
}

/// Render a command reply for the terminal.
#[must_use]
pub fn format_reply(reply: &Reply) -> String {
    match reply {
        Reply::Caller {
            identity,
            privileged,
        } => {
            let who = identity.as_deref().unwrap_or("(anonymous)");
            let role = if *privileged { "administrator" } else { "resident" };
            format!("Acting as {who} ({role})")
        }
        Reply::Issue(view) => format_issue_details(view).trim_end().to_string(),
        Reply::Vote(receipt) if receipt.applied => {
            format!("Upvoted #{} ({} votes)", receipt.issue_id, receipt.votes)
        }
        Reply::Vote(receipt) => format!(
            "Already upvoted #{} ({} votes)",
            receipt.issue_id, receipt.votes
        ),
        Reply::Comment(comment) => {
            format!("Comment {} added to #{}", comment.id, comment.issue_id)
        }
        Reply::Issues(views) if views.is_empty() => "No issues found".to_string(),
        Reply::Issues(views) => views
            .iter()
            .map(|view| format_issue_line(&view.issue))
            .collect::<Vec<_>>()
            .join("\n"),
        Reply::Stats(stats) => format_stats(stats).trim_end().to_string(),
    }
}
