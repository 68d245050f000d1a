//! In-memory issue store.
//!
//! The single source of truth for issues and their comments. Issues are
//! kept in creation order and never removed, so an issue's ID is its
//! position plus one.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{CivicError, Result, ValidationError};
use crate::model::{Category, Comment, Issue, IssueDraft, PLACEHOLDER_IMAGE, Status};
use crate::query::IssueUpdate;

/// Largest image accepted inline as a `data:` URI.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// In-memory civic issue store.
#[derive(Debug, Clone)]
pub struct IssueStore {
    issues: Vec<Issue>,
    next_id: u64,
    next_comment_id: u64,
    placeholder_image: String,
    max_image_bytes: usize,
}

impl IssueStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            next_id: 1,
            next_comment_id: 1,
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Use a different image for reports submitted without one.
    #[must_use]
    pub fn with_placeholder_image(mut self, uri: impl Into<String>) -> Self {
        self.placeholder_image = uri.into();
        self
    }

    /// Change the size limit for inline `data:` images.
    #[must_use]
    pub const fn with_max_image_bytes(mut self, max: usize) -> Self {
        self.max_image_bytes = max;
        self
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Create a new issue from a draft.
    ///
    /// Assigns the next ID, `Pending` status, zero votes and the current
    /// time. A missing or blank image is replaced with the placeholder.
    ///
    /// # Errors
    ///
    /// Returns `Validation`/`ValidationErrors` if a required field is blank,
    /// the category is unknown, or the image is rejected.
    pub fn create(&mut self, draft: &IssueDraft, author: &str) -> Result<Issue> {
        let category = self.validate_draft(draft, author)?;

        let now = Utc::now();
        let image = draft
            .image
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map_or_else(|| self.placeholder_image.clone(), String::from);

        let issue = Issue {
            id: self.next_id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            location: draft.location.trim().to_string(),
            category,
            image,
            status: Status::Pending,
            votes: 0,
            author: author.to_string(),
            assigned_department: None,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.issues.push(issue.clone());

        info!(id = issue.id, category = %issue.category, author, "issue created");
        Ok(issue)
    }

    /// Get a single issue by ID.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist.
    pub fn get(&self, id: u64) -> Result<&Issue> {
        self.index_of(id)
            .map(|idx| &self.issues[idx])
            .ok_or(CivicError::IssueNotFound { id })
    }

    /// Apply a partial mutation to an existing issue.
    ///
    /// The whole patch is validated before anything changes, so a failed
    /// update leaves the issue exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist, or `Validation`
    /// if an appended comment is blank or belongs to another issue.
    pub fn update(&mut self, id: u64, update: &IssueUpdate) -> Result<Issue> {
        let idx = self.index_of(id).ok_or(CivicError::IssueNotFound { id })?;

        for comment in &update.append_comments {
            if comment.issue_id != id {
                return Err(CivicError::validation(
                    "comments",
                    format!("comment {} belongs to issue {}", comment.id, comment.issue_id),
                ));
            }
            if comment.text.trim().is_empty() {
                return Err(CivicError::validation("text", "cannot be empty"));
            }
        }

        let issue = &mut self.issues[idx];
        if let Some(status) = update.status {
            if status != issue.status {
                debug!(id, from = %issue.status, to = %status, "status changed");
            }
            issue.status = status;
        }
        if let Some(department) = update.assigned_department {
            issue.assigned_department = Some(department);
        }
        if let Some(votes) = update.votes {
            issue.votes = votes;
        }
        issue
            .comments
            .extend(update.append_comments.iter().cloned());
        issue.updated_at = Utc::now();

        Ok(issue.clone())
    }

    /// All issues in creation order.
    ///
    /// The borrow keeps the store from changing while the slice is alive.
    #[must_use]
    pub fn list(&self) -> &[Issue] {
        &self.issues
    }

    /// Comments on an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist.
    pub fn comments(&self, id: u64) -> Result<&[Comment]> {
        self.get(id).map(|issue| issue.comments.as_slice())
    }

    /// Reserve a fresh comment ID.
    pub fn allocate_comment_id(&mut self) -> u64 {
        let id = self.next_comment_id;
        self.next_comment_id += 1;
        id
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn index_of(&self, id: u64) -> Option<usize> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        (idx < self.issues.len()).then_some(idx)
    }

    fn validate_draft(&self, draft: &IssueDraft, author: &str) -> Result<Category> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("title", &draft.title),
            ("description", &draft.description),
            ("location", &draft.location),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(field, "cannot be empty"));
            }
        }
        if author.trim().is_empty() {
            errors.push(ValidationError::new("author", "cannot be empty"));
        }

        let category = match draft.category.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                errors.push(ValidationError::new(
                    "category",
                    format!("unknown category '{}'", draft.category),
                ));
                None
            }
        };

        if let Some(image) = draft.image.as_deref() {
            if let Err(err) = validate_image(image, self.max_image_bytes) {
                errors.push(err);
            }
        }

        match category {
            Some(category) if errors.is_empty() => Ok(category),
            _ => Err(CivicError::from_validation_errors(errors)),
        }
    }
}

impl Default for IssueStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Check an image reference supplied with a draft.
///
/// Plain URLs pass through. Inline `data:` URIs must carry an `image/*`
/// media type and decode to at most `max_bytes`.
///
/// # Errors
///
/// Returns a `ValidationError` for the `image` field.
pub fn validate_image(uri: &str, max_bytes: usize) -> std::result::Result<(), ValidationError> {
    let Some(rest) = uri.trim().strip_prefix("data:") else {
        return Ok(());
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(ValidationError::new("image", "malformed data URI"));
    };

    let media_type = header.split(';').next().unwrap_or_default();
    if !media_type.to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::new("image", "only image files are allowed"));
    }

    let size = if header.ends_with(";base64") {
        let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
        (payload.len() / 4 * 3 + payload.len() % 4 * 3 / 4).saturating_sub(padding)
    } else {
        payload.len()
    };
    if size > max_bytes {
        return Err(ValidationError::new(
            "image",
            format!("file size should not exceed {max_bytes} bytes"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Department, SYSTEM_AUTHOR};

    fn draft(title: &str) -> IssueDraft {
        IssueDraft::new(
            title,
            "Large pothole near the intersection",
            "Connaught Place, Delhi",
            Category::Road,
        )
    }

    fn comment(store: &mut IssueStore, issue_id: u64, text: &str) -> Comment {
        Comment {
            id: store.allocate_comment_id(),
            issue_id,
            author: SYSTEM_AUTHOR.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let mut store = IssueStore::new();
        let created = store.create(&draft("Pothole"), "0xabc").unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.status, Status::Pending);
        assert_eq!(created.votes, 0);
        assert!(created.comments.is_empty());
        assert_eq!(created.author, "0xabc");
        assert_eq!(created.image, PLACEHOLDER_IMAGE);

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.title, "Pothole");
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut store = IssueStore::new();
        let a = store.create(&draft("A"), "u").unwrap();
        let b = store.create(&draft("B"), "u").unwrap();
        let c = store.create(&draft("C"), "u").unwrap();
        assert!(a.id < b.id && b.id < c.id);
        let order: Vec<u64> = store.list().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_create_keeps_supplied_image() {
        let mut store = IssueStore::new();
        let created = store
            .create(&draft("Lamp").with_image("https://example.org/lamp.jpg"), "u")
            .unwrap();
        assert_eq!(created.image, "https://example.org/lamp.jpg");

        let blank = store.create(&draft("Blank").with_image("  "), "u").unwrap();
        assert_eq!(blank.image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_custom_placeholder() {
        let mut store = IssueStore::new().with_placeholder_image("placeholder.png");
        let created = store.create(&draft("X"), "u").unwrap();
        assert_eq!(created.image, "placeholder.png");
    }

    #[test]
    fn test_create_empty_fields_rejected() {
        let mut store = IssueStore::new();
        let bad = IssueDraft {
            title: "  ".into(),
            description: String::new(),
            location: "Delhi".into(),
            category: "Road".into(),
            image: None,
        };
        let err = store.create(&bad, "u").unwrap_err();
        match err {
            CivicError::ValidationErrors { errors } => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["title", "description"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_unknown_category_rejected() {
        let mut store = IssueStore::new();
        let mut bad = draft("Bridge");
        bad.category = "Bridges".into();
        let err = store.create(&bad, "u").unwrap_err();
        assert!(matches!(err, CivicError::Validation { ref field, .. } if field == "category"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_nonexistent() {
        let store = IssueStore::new();
        assert!(matches!(
            store.get(0),
            Err(CivicError::IssueNotFound { id: 0 })
        ));
        assert!(matches!(
            store.get(42),
            Err(CivicError::IssueNotFound { id: 42 })
        ));
    }

    #[test]
    fn test_update_issue() {
        let mut store = IssueStore::new();
        let created = store.create(&draft("Pothole"), "u").unwrap();
        let note = comment(&mut store, created.id, "Assigned to Transport department");

        let updated = store
            .update(
                created.id,
                &IssueUpdate {
                    status: Some(Status::InProgress),
                    assigned_department: Some(Department::Transport),
                    votes: Some(3),
                    append_comments: vec![note],
                },
            )
            .unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.assigned_department, Some(Department::Transport));
        assert_eq!(updated.votes, 3);
        assert_eq!(updated.comments.len(), 1);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.get(created.id).unwrap(), &updated);
    }

    #[test]
    fn test_update_nonexistent() {
        let mut store = IssueStore::new();
        let result = store.update(9, &IssueUpdate::default());
        assert!(matches!(result, Err(CivicError::IssueNotFound { id: 9 })));
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let mut store = IssueStore::new();
        let created = store.create(&draft("Pothole"), "u").unwrap();
        let blank = comment(&mut store, created.id, "   ");

        let result = store.update(
            created.id,
            &IssueUpdate {
                status: Some(Status::Rejected),
                append_comments: vec![blank],
                ..Default::default()
            },
        );
        assert!(result.is_err());
        let issue = store.get(created.id).unwrap();
        assert_eq!(issue.status, Status::Pending);
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn test_update_rejects_foreign_comment() {
        let mut store = IssueStore::new();
        let a = store.create(&draft("A"), "u").unwrap();
        let b = store.create(&draft("B"), "u").unwrap();
        let stray = comment(&mut store, b.id, "wrong issue");
        let result = store.update(
            a.id,
            &IssueUpdate {
                append_comments: vec![stray],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CivicError::Validation { .. })));
    }

    #[test]
    fn test_comments_append_in_order() {
        let mut store = IssueStore::new();
        let created = store.create(&draft("Pothole"), "u").unwrap();
        for text in ["first", "second", "third"] {
            let c = comment(&mut store, created.id, text);
            store
                .update(
                    created.id,
                    &IssueUpdate {
                        append_comments: vec![c],
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        let texts: Vec<&str> = store
            .comments(created.id)
            .unwrap()
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_validate_image_data_uri() {
        assert!(validate_image("https://example.org/a.png", 10).is_ok());
        assert!(validate_image("data:image/png;base64,aGVsbG8=", 10).is_ok());
        assert!(validate_image("data:text/plain;base64,aGVsbG8=", 10).is_err());
        assert!(validate_image("data:image/png;base64,aGVsbG8gd29ybGQ=", 5).is_err());
        assert!(validate_image("data:image/png", 10).is_err());
    }

    #[test]
    fn test_create_rejects_oversized_image() {
        let mut store = IssueStore::new().with_max_image_bytes(4);
        let result = store.create(
            &draft("Photo").with_image("data:image/jpeg;base64,aGVsbG8gd29ybGQ="),
            "u",
        );
        assert!(matches!(result, Err(CivicError::Validation { ref field, .. }) if field == "image"));
    }
}
