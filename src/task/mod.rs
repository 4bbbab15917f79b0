//! Task domain: entity, enums, and domain rules.
//!
//! Business rules live on the entity itself; the store only persists state
//! it was handed.

pub mod store;

pub use store::{ListParams, Page, PageMeta, SortOrder, TaskStore};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Domain and persistence failures for tasks.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task title is required")]
    TitleRequired,
    #[error("Task is already completed")]
    AlreadyCompleted,
    #[error("Task not found: {0}")]
    NotFound(Uuid),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Task category. The same fixed set backs the CRUD surface and the AI
/// output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Work,
    Personal,
    Health,
    Finance,
    Shopping,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "WORK",
            Category::Personal => "PERSONAL",
            Category::Health => "HEALTH",
            Category::Finance => "FINANCE",
            Category::Shopping => "SHOPPING",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WORK" => Ok(Category::Work),
            "PERSONAL" => Ok(Category::Personal),
            "HEALTH" => Ok(Category::Health),
            "FINANCE" => Ok(Category::Finance),
            "SHOPPING" => Ok(Category::Shopping),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a task. `deadline: Some(None)` clears the field;
/// `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub deadline: Option<Option<String>>,
    pub is_completed: Option<bool>,
}

impl Task {
    /// Create a new task. The title must not be blank.
    pub fn create(
        title: &str,
        description: Option<String>,
        category: Option<Category>,
        priority: Option<Priority>,
        deadline: Option<&str>,
    ) -> Result<Self, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::TitleRequired);
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description,
            category,
            priority,
            deadline: deadline.and_then(parse_deadline),
            is_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mark the task completed. Completing twice is a domain error.
    pub fn complete(&mut self) -> Result<(), TaskError> {
        if self.is_completed {
            return Err(TaskError::AlreadyCompleted);
        }
        self.is_completed = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a partial update; only supplied fields change.
    pub fn apply(&mut self, update: TaskUpdate) -> Result<(), TaskError> {
        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(TaskError::TitleRequired);
            }
            self.title = title.to_string();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(priority) = update.priority {
            self.priority = Some(priority);
        }
        if let Some(deadline) = update.deadline {
            self.deadline = deadline.as_deref().and_then(parse_deadline);
        }
        if let Some(done) = update.is_completed {
            self.is_completed = done;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Parse a deadline string as RFC 3339 or plain `YYYY-MM-DD`.
///
/// Anything else drops the deadline with a warning instead of failing the
/// whole record.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    tracing::warn!("Ignoring unparseable deadline: {}", raw);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title() {
        let err = Task::create("   ", None, None, None, None).unwrap_err();
        assert!(matches!(err, TaskError::TitleRequired));
    }

    #[test]
    fn create_trims_title() {
        let task = Task::create("  Buy milk  ", None, None, None, None).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.is_completed);
    }

    #[test]
    fn completing_twice_is_an_error() {
        let mut task = Task::create("Buy milk", None, None, None, None).unwrap();
        task.complete().unwrap();
        let err = task.complete().unwrap_err();
        assert!(matches!(err, TaskError::AlreadyCompleted));
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let mut task = Task::create(
            "Buy milk",
            Some("2%".to_string()),
            Some(Category::Shopping),
            Some(Priority::Low),
            None,
        )
        .unwrap();

        task.apply(TaskUpdate {
            priority: Some(Priority::High),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.category, Some(Category::Shopping));
        assert_eq!(task.description.as_deref(), Some("2%"));
    }

    #[test]
    fn apply_rejects_blank_title() {
        let mut task = Task::create("Buy milk", None, None, None, None).unwrap();
        let err = task
            .apply(TaskUpdate {
                title: Some("  ".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TaskError::TitleRequired));
    }

    #[test]
    fn apply_can_clear_deadline() {
        let mut task =
            Task::create("Buy milk", None, None, None, Some("2026-09-01")).unwrap();
        assert!(task.deadline.is_some());

        task.apply(TaskUpdate {
            deadline: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert!(task.deadline.is_none());
    }

    #[test]
    fn deadline_parsing() {
        assert!(parse_deadline("2026-09-04T12:00:00Z").is_some());
        assert!(parse_deadline("2026-09-04").is_some());
        assert!(parse_deadline("next Friday").is_none());
    }

    #[test]
    fn enum_round_trip() {
        for category in ["WORK", "PERSONAL", "HEALTH", "FINANCE", "SHOPPING"] {
            assert_eq!(category.parse::<Category>().unwrap().as_str(), category);
        }
        for priority in ["HIGH", "MEDIUM", "LOW"] {
            assert_eq!(priority.parse::<Priority>().unwrap().as_str(), priority);
        }
        assert!("URGENT".parse::<Priority>().is_err());
        assert!("work".parse::<Category>().is_err());
    }
}
