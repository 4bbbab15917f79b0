//! SQLite-backed task store.
//!
//! One table, no migrations beyond the initial schema. Access is serialized
//! behind a mutex; each method holds the lock for a single statement batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, types::ToSql, Connection, Row};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Category, Priority, Task, TaskError};

/// Sort order for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Filters and paging for [`TaskStore::list`].
#[derive(Debug, Clone)]
pub struct ListParams {
    /// 1-based page number.
    pub page: u32,
    /// Page size, clamped to 1..=50.
    pub limit: u32,
    /// Substring match against title and description.
    pub search: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub sort: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            completed: None,
            priority: None,
            category: None,
            sort: SortOrder::Newest,
        }
    }
}

/// Pagination metadata for the list envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One page of tasks plus its metadata.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<Task>,
    pub meta: PageMeta,
}

const MAX_LIMIT: u32 = 50;

const TASK_COLUMNS: &str =
    "id, title, description, category, priority, limit_date, is_completed, created_at, updated_at";

/// Store over the single `tasks` table.
#[derive(Clone)]
pub struct TaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl TaskStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn create(&self, task: &Task) -> Result<(), TaskError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (id, title, description, category, priority, limit_date, \
             is_completed, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id.to_string(),
                task.title,
                task.description,
                task.category.map(|c| c.as_str()),
                task.priority.map(|p| p.as_str()),
                task.deadline.map(|d| d.timestamp()),
                task.is_completed,
                task.created_at.timestamp(),
                task.updated_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Task, TaskError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE id = ?1",
            TASK_COLUMNS
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => row_to_task(row),
            None => Err(TaskError::NotFound(id)),
        }
    }

    /// List tasks matching `params`, newest first by default.
    pub async fn list(&self, params: &ListParams) -> Result<Page, TaskError> {
        let page = params.page.max(1);
        let limit = params.limit.clamp(1, MAX_LIMIT);

        // Boxes must be Send: `args` lives across the lock await point and
        // axum requires handler futures to be Send.
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Box<dyn ToSql + Send>> = Vec::new();

        if let Some(search) = &params.search {
            clauses.push("(title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')");
            let pattern = format!("%{}%", escape_like(search));
            args.push(Box::new(pattern.clone()));
            args.push(Box::new(pattern));
        }
        if let Some(completed) = params.completed {
            clauses.push("is_completed = ?");
            args.push(Box::new(completed));
        }
        if let Some(priority) = params.priority {
            clauses.push("priority = ?");
            args.push(Box::new(priority.as_str()));
        }
        if let Some(category) = params.category {
            clauses.push("category = ?");
            args.push(Box::new(category.as_str()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn.lock().await;

        let total: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks{}", where_sql),
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
            |row| row.get(0),
        )?;

        let order = match params.sort {
            SortOrder::Newest => "DESC",
            SortOrder::Oldest => "ASC",
        };
        // Widen before multiplying; the page number is caller-controlled.
        args.push(Box::new(i64::from(limit)));
        args.push(Box::new(i64::from(page - 1) * i64::from(limit)));

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks{} ORDER BY created_at {} LIMIT ? OFFSET ?",
            TASK_COLUMNS, where_sql, order
        ))?;
        let mut rows = stmt.query(rusqlite::params_from_iter(
            args.iter().map(|a| a.as_ref()),
        ))?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(row_to_task(row)?);
        }

        let total_pages = (total as u32).div_ceil(limit);
        Ok(Page {
            items,
            meta: PageMeta {
                total,
                page,
                limit,
                total_pages,
                has_next_page: page < total_pages,
                has_previous_page: page > 1 && total > 0,
            },
        })
    }

    pub async fn update(&self, task: &Task) -> Result<(), TaskError> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "UPDATE tasks SET title = ?2, description = ?3, category = ?4, priority = ?5, \
             limit_date = ?6, is_completed = ?7, updated_at = ?8 WHERE id = ?1",
            params![
                task.id.to_string(),
                task.title,
                task.description,
                task.category.map(|c| c.as_str()),
                task.priority.map(|p| p.as_str()),
                task.deadline.map(|d| d.timestamp()),
                task.is_completed,
                task.updated_at.timestamp(),
            ],
        )?;
        if affected == 0 {
            return Err(TaskError::NotFound(task.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), TaskError> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if affected == 0 {
            return Err(TaskError::NotFound(id));
        }
        Ok(())
    }
}

/// Escape LIKE metacharacters so user search text matches literally.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn row_to_task(row: &Row<'_>) -> Result<Task, TaskError> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let category: Option<String> = row.get(3)?;
    let priority: Option<String> = row.get(4)?;
    let deadline: Option<i64> = row.get(5)?;

    Ok(Task {
        id,
        title: row.get(1)?,
        description: row.get(2)?,
        category: category.and_then(|s| s.parse().ok()),
        priority: priority.and_then(|s| s.parse().ok()),
        deadline: deadline.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        is_completed: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        updated_at: timestamp_column(row, 8)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>, TaskError> {
    let ts: i64 = row.get(idx)?;
    DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        TaskError::Storage(rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            "timestamp out of range".into(),
        ))
    })
}
