//! Output formatting for `fixd`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! In JSON mode each script step is one JSON object per line on stdout;
//! diagnostics always go to stderr.
//!
//! # JSON Output Types
//!
//! - [`IssueView`] - Issue with its effective department and vote state
//! - [`StepRecord`] - Outcome of one script line
//! - [`CategoryInfo`] - Category with its routing department

mod output;
mod text;

pub use output::{CategoryInfo, ErrorRecord, IssueView, StepRecord};
pub use text::{
    format_category_badge, format_issue_details, format_issue_line, format_reply, format_stats,
    format_status_icon, truncate_title,
};
