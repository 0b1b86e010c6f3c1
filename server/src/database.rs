// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use common::{CreateTaskPayload, Normalized, Status, Task, normalize};
use serde_json::{Map, Value};
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A stored task document: the id and the JSON field map of everything else.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: String,
}

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures the `tasks` table exists.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Creates the `tasks` table if it is missing.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY NOT NULL,
            data TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    info!("'tasks' table is ready.");
    Ok(())
}

/// Turns a stored row into a task, logging every data-shape warning.
/// Rows whose data is not a JSON object are skipped.
fn load_task(row: DocumentRow) -> Option<Task> {
    let doc = match serde_json::from_str::<Map<String, Value>>(&row.data) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Skipping task {}: stored data is not a JSON object: {}", row.id, e);
            return None;
        }
    };

    let Normalized { task, warnings } = normalize(&row.id, &doc);
    for warning in &warnings {
        warn!("{}", warning);
    }
    Some(task)
}

/// Retrieves every task, in insertion order.
pub async fn list_tasks_from_db(pool: &SqlitePool) -> Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT id, data FROM tasks ORDER BY created_at ASC, rowid ASC;",
    )
    .fetch_all(pool)
    .await
    .context("Failed to retrieve tasks from DB")?;

    Ok(rows.into_iter().filter_map(load_task).collect())
}

async fn fetch_row(pool: &SqlitePool, task_id: &str) -> Result<Option<DocumentRow>> {
    sqlx::query_as::<_, DocumentRow>("SELECT id, data FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to retrieve task with ID: {task_id}"))
}

pub async fn get_task_from_db(pool: &SqlitePool, task_id: &str) -> Result<Option<Task>> {
    Ok(fetch_row(pool, task_id).await?.and_then(load_task))
}

/// Stores a raw document under `task_id`, as written by any client.
pub async fn insert_document(
    pool: &SqlitePool,
    task_id: &str,
    doc: &Map<String, Value>,
) -> Result<()> {
    let data = serde_json::to_string(doc)?;
    debug!("Insert values: id={}, data={}", task_id, data);

    sqlx::query("INSERT INTO tasks (id, data, created_at) VALUES (?, ?, ?)")
        .bind(task_id)
        .bind(data)
        .bind(Utc::now())
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert task with ID: {task_id}"))?;
    Ok(())
}

/// Inserts a new task into the database.
pub async fn create_task_in_db(pool: &SqlitePool, payload: CreateTaskPayload) -> Result<Task> {
    let task = Task {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        priority: payload.priority,
        status: payload.status,
        categories: payload.categories,
        deadline: payload.deadline,
    };

    insert_document(pool, &task.id, &task.to_document()).await?;
    info!("Created task with ID: {}", task.id);

    Ok(task)
}

/// Sets the status of a task, leaving the rest of its document untouched.
/// Returns `None` if no task with the given ID was found, or if its stored
/// data is unreadable (such rows are skipped when listing, too).
pub async fn update_task_status_in_db(
    pool: &SqlitePool,
    task_id: &str,
    status: Status,
) -> Result<Option<Task>> {
    let Some(row) = fetch_row(pool, task_id).await? else {
        return Ok(None);
    };
    let mut doc = match serde_json::from_str::<Map<String, Value>>(&row.data) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Not updating task {}: stored data is not a JSON object: {}", task_id, e);
            return Ok(None);
        }
    };

    doc.insert("status".to_string(), Value::from(status.ordinal()));
    // Older documents carry a completion flag; keep it mirroring the status.
    if doc.contains_key("isCompleted") {
        doc.insert(
            "isCompleted".to_string(),
            Value::Bool(status == Status::Done),
        );
    }

    let data = serde_json::to_string(&doc)?;
    sqlx::query("UPDATE tasks SET data = ? WHERE id = ?")
        .bind(data.as_str())
        .bind(task_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update status of task with ID: {task_id}"))?;
    info!("Task {} is now {}", task_id, status);

    Ok(load_task(DocumentRow { id: row.id, data }))
}

/// Deletes a task.
/// Returns true if a task was removed, false if no task with the given ID was found.
pub async fn delete_task_in_db(pool: &SqlitePool, task_id: &str) -> Result<bool> {
    debug!("Attempting to delete task with ID: {}", task_id);
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete task with ID: {task_id}"))?;

    let rows_affected = result.rows_affected();
    info!("Deleted {} rows for task ID: {}", rows_affected, task_id);

    Ok(rows_affected > 0)
}
