//! Query and patch types for issue operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CivicError, Result};
use crate::model::{Category, Comment, Department, Status};

/// Partial mutation applied through `IssueStore::update`.
///
/// This is the only write path into an existing issue.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub status: Option<Status>,
    pub assigned_department: Option<Department>,
    pub votes: Option<u64>,
    /// Comments to append, in order. IDs come from
    /// `IssueStore::allocate_comment_id`.
    pub append_comments: Vec<Comment>,
}

/// Base subset selected before any other filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    /// Issues submitted by the caller.
    My,
    /// Issues still awaiting triage.
    Pending,
}

impl Tab {
    /// Parse a tab name; anything unrecognized means `All`.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "my" | "mine" => Self::My,
            "pending" => Self::Pending,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::My => "my",
            Self::Pending => "pending",
        }
    }
}

impl<'de> Deserialize<'de> for Tab {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&value))
    }
}

/// Ordering applied to a view. Deserializes through `FromStr`, so the
/// aliases are accepted wherever a sort is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// `created_at` descending.
    #[default]
    Newest,
    Oldest,
    /// `votes` descending.
    MostVoted,
    LeastVoted,
}

impl SortBy {
    pub const ALL: [Self; 4] = [
        Self::Newest,
        Self::Oldest,
        Self::MostVoted,
        Self::LeastVoted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::MostVoted => "most-voted",
            Self::LeastVoted => "least-voted",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('_', "-");
        match key.as_str() {
            "newest" | "new" => Ok(Self::Newest),
            "oldest" | "old" => Ok(Self::Oldest),
            "most-voted" | "most" | "votes" => Ok(Self::MostVoted),
            "least-voted" | "least" => Ok(Self::LeastVoted),
            _ => Err(CivicError::validation(
                "sort_by",
                format!("unknown sort '{s}' (expected newest, oldest, most-voted, least-voted)"),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for SortBy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Administrator dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminView {
    #[default]
    Issues,
    /// Green-space and public-toilet reports only.
    Appeals,
}

/// Parameters for `filter::view`.
///
/// `department`, `status` and `admin_view` belong to the administrator
/// dashboard; `IssueDesk::query_issues` rejects them for other callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IssueQuery {
    pub tab: Tab,
    #[serde(deserialize_with = "all_or")]
    pub category: Option<Category>,
    #[serde(deserialize_with = "all_or")]
    pub department: Option<Department>,
    #[serde(deserialize_with = "all_or")]
    pub status: Option<Status>,
    pub admin_view: AdminView,
    pub search_term: String,
    pub sort_by: SortBy,
}

impl IssueQuery {
    #[must_use]
    pub fn tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn admin_view(mut self, view: AdminView) -> Self {
        self.admin_view = view;
        self
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    #[must_use]
    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort_by = sort;
        self
    }

    /// True if any administrator-only parameter is set.
    #[must_use]
    pub fn uses_admin_filters(&self) -> bool {
        self.department.is_some() || self.status.is_some() || self.admin_view != AdminView::Issues
    }
}

/// Parse a filter value where `All` (or empty) means no filter.
///
/// # Errors
///
/// Returns the parse error of `T` for unrecognized values.
pub fn parse_filter<T>(value: &str) -> Result<Option<T>>
where
    T: FromStr<Err = CivicError>,
{
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        trimmed.parse().map(Some)
    }
}

fn all_or<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = CivicError>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(value) => parse_filter(&value).map_err(serde::de::Error::custom),
    }
}
