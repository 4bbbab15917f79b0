//! SQLite bootstrap.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

/// Shared SQLite connection handle.
pub type SharedConnection = Arc<Mutex<Connection>>;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT,
    priority TEXT,
    limit_date INTEGER,
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// Open (or create) the database at `path` and ensure the schema exists.
pub fn open(path: &str) -> anyhow::Result<SharedConnection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    tracing::info!("Database ready at {}", path);
    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database with the same schema, for tests.
pub fn open_in_memory() -> anyhow::Result<SharedConnection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_persists_rows_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let path = path.to_str().unwrap();

        let conn = open(path).unwrap();
        conn.lock()
            .await
            .execute(
                "INSERT INTO tasks (id, title, is_completed, created_at, updated_at) \
                 VALUES ('t1', 'Buy milk', 0, 0, 0)",
                [],
            )
            .unwrap();
        drop(conn);

        // Reopening must see the schema and the persisted row.
        let conn = open(path).unwrap();
        let count: i64 = conn
            .lock()
            .await
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
