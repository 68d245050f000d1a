//! Core data types for civic-core.
//!
//! Enumerations serialize with the display labels residents see
//! ("In Progress", "Green Space") and parse leniently from user input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CivicError, Result};

/// Author recorded on comments appended by the admin workflow.
pub const SYSTEM_AUTHOR: &str = "Administrator";

/// Image substituted when a report is submitted without one.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1566438480900-0609be27a4be?w=500&auto=format&fit=crop";

/// Lowercase and drop separators so "Green Space", "green_space" and
/// "GreenSpace" all compare equal.
fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Issue category chosen by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Road,
    Sanitation,
    Water,
    Electricity,
    #[serde(rename = "Green Space", alias = "GreenSpace")]
    GreenSpace,
    #[serde(rename = "Public Toilet", alias = "PublicToilet")]
    PublicToilet,
    Other,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Road,
        Self::Sanitation,
        Self::Water,
        Self::Electricity,
        Self::GreenSpace,
        Self::PublicToilet,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Road => "Road",
            Self::Sanitation => "Sanitation",
            Self::Water => "Water",
            Self::Electricity => "Electricity",
            Self::GreenSpace => "Green Space",
            Self::PublicToilet => "Public Toilet",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Road => "🛣️",
            Self::Sanitation => "🗑️",
            Self::Water => "🚰",
            Self::Electricity => "💡",
            Self::GreenSpace => "🌳",
            Self::PublicToilet => "🚽",
            Self::Other => "❓",
        }
    }

    /// Categories handled through the appeals queue.
    #[must_use]
    pub const fn is_appeal(self) -> bool {
        matches!(self, Self::GreenSpace | Self::PublicToilet)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| normalize(c.as_str()) == key)
            .ok_or_else(|| CivicError::validation("category", format!("unknown category '{s}'")))
    }
}

/// Issue lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Resolved,
    Rejected,
}

impl Status {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }

    /// No outgoing transition is defined from these states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize(s);
        Self::ALL
            .into_iter()
            .find(|status| normalize(status.as_str()) == key)
            .ok_or_else(|| CivicError::InvalidTransition {
                status: s.to_string(),
            })
    }
}

/// City department responsible for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Transport,
    Sanitation,
    Water,
    Power,
    Parks,
    #[serde(rename = "Urban Development", alias = "UrbanDevelopment")]
    UrbanDevelopment,
    /// Fallback for uncategorized reports; never assigned explicitly.
    General,
}

impl Department {
    pub const ALL: [Self; 7] = [
        Self::Transport,
        Self::Sanitation,
        Self::Water,
        Self::Power,
        Self::Parks,
        Self::UrbanDevelopment,
        Self::General,
    ];

    /// Departments an administrator may assign.
    pub const ASSIGNABLE: [Self; 6] = [
        Self::Transport,
        Self::Sanitation,
        Self::Water,
        Self::Power,
        Self::Parks,
        Self::UrbanDevelopment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Sanitation => "Sanitation",
            Self::Water => "Water",
            Self::Power => "Power",
            Self::Parks => "Parks",
            Self::UrbanDevelopment => "Urban Development",
            Self::General => "General",
        }
    }

    #[must_use]
    pub const fn is_assignable(self) -> bool {
        !matches!(self, Self::General)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize(s);
        Self::ALL
            .into_iter()
            .find(|d| normalize(d.as_str()) == key)
            .ok_or_else(|| {
                CivicError::validation("department", format!("unknown department '{s}'"))
            })
    }
}

/// Department that handles a category when none has been assigned.
///
/// Used for display and filtering only; never written back to an issue.
#[must_use]
pub const fn default_department(category: Category) -> Department {
    match category {
        Category::Road => Department::Transport,
        Category::Sanitation | Category::PublicToilet => Department::Sanitation,
        Category::Water => Department::Water,
        Category::Electricity => Department::Power,
        Category::GreenSpace => Department::Parks,
        Category::Other => Department::General,
    }
}

/// A civic issue report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Creation-ordered ID, starting at 1.
    pub id: u64,

    pub title: String,

    pub description: String,

    pub location: String,

    pub category: Category,

    /// Image URI (remote URL or `data:` URI).
    pub image: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub votes: u64,

    /// Identity of the submitter.
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_department: Option<Department>,

    #[serde(default)]
    pub comments: Vec<Comment>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Assigned department, or the category default when unassigned.
    #[must_use]
    pub fn department(&self) -> Department {
        self.assigned_department
            .unwrap_or_else(|| default_department(self.category))
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub issue_id: u64,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.author == SYSTEM_AUTHOR
    }
}

/// User-submitted fields for a new issue.
///
/// `category` stays textual so unrecognized input is reported as a
/// validation failure rather than a parse error at the edge. Missing
/// fields read as empty and fail validation the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl IssueDraft {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: location.into(),
            category: category.as_str().to_string(),
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Who is making a call, as resolved by the presentation layer.
///
/// The identity and privilege flag are trusted exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub identity: Option<String>,
    pub privileged: bool,
}

impl Caller {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            identity: None,
            privileged: false,
        }
    }

    #[must_use]
    pub fn user(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            privileged: false,
        }
    }

    #[must_use]
    pub fn admin(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            privileged: true,
        }
    }

    /// The caller's identity, treating blank strings as absent.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// # Errors
    ///
    /// Returns `Unauthorized` if the caller has no identity.
    pub fn require_identity(&self, action: &str) -> Result<&str> {
        self.identity()
            .ok_or_else(|| CivicError::unauthorized(format!("{action} requires an identity")))
    }

    /// # Errors
    ///
    /// Returns `Unauthorized` if the caller is not privileged.
    pub fn require_privilege(&self, action: &str) -> Result<()> {
        if self.privileged {
            Ok(())
        } else {
            Err(CivicError::unauthorized(format!(
                "{action} requires administrator privileges"
            )))
        }
    }
}
