// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::colors::CategoryPalette;
use crate::database;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{FixedOffset, NaiveDate, Utc};
use common::{
    CalendarDay, CategoryFilter, CreateTaskPayload, Priority, Status, StatusFilter, Task,
    TaskFilter, TaskView, ViewMode, ViewState, build_view, month_grid, week_strip,
    with_task_counts,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Shared state of every handler: the database pool and the category colors.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub palette: Arc<RwLock<CategoryPalette>>,
}

impl AppState {
    pub fn new(pool: SqlitePool, palette: CategoryPalette) -> Self {
        Self {
            pool,
            palette: Arc::new(RwLock::new(palette)),
        }
    }
}

/// Query parameters of the task list/daily/weekly/monthly screens.
#[derive(Deserialize, Debug, Default)]
pub struct TasksQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub mode: Option<String>,
    /// The selected date; defaults to the viewer's today.
    pub date: Option<NaiveDate>,
    /// The viewer's offset from UTC, in minutes.
    pub tz_offset: Option<i32>,
}

/// Query parameters of the calendar screens.
#[derive(Deserialize, Debug, Default)]
pub struct CalendarQuery {
    /// Any date of the month to show; defaults to the selected date.
    pub reference: Option<NaiveDate>,
    pub selected: Option<NaiveDate>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub tz_offset: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdate {
    pub status: Status,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct CategorySummary {
    pub name: String,
    pub color: String,
    pub task_count: usize,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub ordinal: i64,
    pub color: String,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Legend {
    pub statuses: Vec<LegendEntry>,
    pub priorities: Vec<LegendEntry>,
}

/// Handler for the assembled task view of a screen.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
) -> Result<Json<TaskView>, AppError> {
    debug!("Received task view request: {:?}", query);
    let tz = viewer_offset(query.tz_offset)?;
    let filter = task_filter(query.status.as_deref(), query.category)?;
    let mode = match query.mode.as_deref() {
        Some(mode) => mode
            .parse::<ViewMode>()
            .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, &e.to_string()))?,
        None => ViewMode::default(),
    };
    let selected = query.date.unwrap_or_else(|| today_in(&tz));

    let tasks = database::list_tasks_from_db(&state.pool).await?;
    let view = build_view(&tasks, &ViewState::new(filter, mode, selected), &tz);

    info!(
        "Built {:?} view for {}: {} active, {} completed.",
        mode,
        selected,
        view.active.len(),
        view.completed.len()
    );
    Ok(Json(view))
}

/// Handler for fetching a single task.
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, AppError> {
    match database::get_task_from_db(&state.pool, &task_id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(not_found(&task_id)),
    }
}

/// Handler for creating a new task.
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    debug!("Received request to create task: {}", payload.title);
    if payload.title.trim().is_empty() {
        error!("Validation failed: Title is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Task title cannot be empty.",
        ));
    }
    if payload.categories.iter().any(|c| c.trim().is_empty()) {
        error!("Validation failed: Empty category name.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Category names cannot be empty.",
        ));
    }

    let new_task = database::create_task_in_db(&state.pool, payload).await?;

    {
        let mut palette = state.palette.write();
        if new_task.categories.is_empty() {
            palette.color_for(new_task.primary_category());
        }
        for category in &new_task.categories {
            palette.color_for(category);
        }
    }

    info!("Task created successfully with ID: {}", new_task.id);
    Ok((StatusCode::CREATED, Json(new_task)))
}

/// Handler for changing the status of a task.
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Task>, AppError> {
    debug!("Setting status of task {} to {}", task_id, update.status);
    match database::update_task_status_in_db(&state.pool, &task_id, update.status).await? {
        Some(task) => Ok(Json(task)),
        None => Err(not_found(&task_id)),
    }
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Attempting to delete task with ID: {}", task_id);

    if database::delete_task_in_db(&state.pool, &task_id).await? {
        info!("Task with ID {} deleted successfully.", task_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&task_id))
    }
}

/// Handler for the six-week month grid, with the number of matching tasks per day.
pub async fn month_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarDay>>, AppError> {
    let tz = viewer_offset(query.tz_offset)?;
    let filter = task_filter(query.status.as_deref(), query.category)?;
    let today = today_in(&tz);
    let selected = query.selected.unwrap_or(today);
    let reference = query.reference.unwrap_or(selected);

    let grid = month_grid(reference, selected, today).ok_or_else(|| out_of_range(reference))?;

    let tasks = filtered_tasks(&state.pool, &filter).await?;
    Ok(Json(with_task_counts(&grid, &tasks, &tz)))
}

/// Handler for the week strip around the selected date.
pub async fn week_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarDay>>, AppError> {
    let tz = viewer_offset(query.tz_offset)?;
    let filter = task_filter(query.status.as_deref(), query.category)?;
    let today = today_in(&tz);
    let selected = query.selected.unwrap_or(today);

    let strip = week_strip(selected, today).ok_or_else(|| out_of_range(selected))?;

    let tasks = filtered_tasks(&state.pool, &filter).await?;
    Ok(Json(with_task_counts(&strip, &tasks, &tz)))
}

/// Handler listing the categories in use, with their colors.
/// Tasks without categories are counted under their fallback primary category.
/// Listing never assigns colors; see `CategoryPalette::color_of`.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let tasks = database::list_tasks_from_db(&state.pool).await?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for task in &tasks {
        if task.categories.is_empty() {
            *counts.entry(task.primary_category()).or_default() += 1;
        }
        for category in &task.categories {
            *counts.entry(category.as_str()).or_default() += 1;
        }
    }

    let palette = state.palette.read();
    let summaries = counts
        .into_iter()
        .map(|(name, task_count)| CategorySummary {
            name: name.to_string(),
            color: palette.color_of(name),
            task_count,
        })
        .collect();
    Ok(Json(summaries))
}

/// Handler for the status and priority color legend.
pub async fn legend() -> Json<Legend> {
    Json(Legend {
        statuses: Status::ALL
            .iter()
            .map(|s| LegendEntry {
                label: s.label().to_string(),
                ordinal: s.ordinal(),
                color: s.color().to_string(),
            })
            .collect(),
        priorities: Priority::ALL
            .iter()
            .map(|p| LegendEntry {
                label: p.label().to_string(),
                ordinal: p.ordinal(),
                color: p.color().to_string(),
            })
            .collect(),
    })
}

async fn filtered_tasks(pool: &SqlitePool, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
    let tasks = database::list_tasks_from_db(pool).await?;
    Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
}

fn viewer_offset(minutes: Option<i32>) -> Result<FixedOffset, AppError> {
    let minutes = minutes.unwrap_or(0);
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            AppError::new(
                StatusCode::BAD_REQUEST,
                &format!("Invalid tz_offset: {minutes} minutes."),
            )
        })
}

fn task_filter(status: Option<&str>, category: Option<String>) -> Result<TaskFilter, AppError> {
    let status = match status {
        Some(label) => label
            .parse::<StatusFilter>()
            .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, &e.to_string()))?,
        None => StatusFilter::All,
    };
    let category = category.map(CategoryFilter::from).unwrap_or_default();
    Ok(TaskFilter::new(status, category))
}

fn today_in(tz: &FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

fn out_of_range(date: NaiveDate) -> AppError {
    AppError::new(
        StatusCode::BAD_REQUEST,
        &format!("Date {date} is too close to the limits of the calendar."),
    )
}

fn not_found(task_id: &str) -> AppError {
    error!("Task with ID {} not found.", task_id);
    AppError::new(
        StatusCode::NOT_FOUND,
        &format!("Task with ID {task_id} not found."),
    )
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// Allows converting an `anyhow::Error` (coming from `database.rs`)
/// into our `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal server error: {:?}", err);
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred.".to_string(),
        }
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_schema;

    async fn test_state() -> AppState {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        AppState::new(pool, CategoryPalette::in_memory())
    }

    fn create_test_payload(title: &str, categories: &[&str]) -> Json<CreateTaskPayload> {
        Json(CreateTaskPayload {
            title: title.to_string(),
            priority: Priority::Low,
            status: Status::ToDo,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            deadline: None,
        })
    }

    #[tokio::test]
    async fn test_create_task_validation_empty_title() {
        let state = test_state().await;

        let result = create_task(State(state), create_test_payload("   ", &[])).await;

        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Task title cannot be empty.");
    }

    #[tokio::test]
    async fn test_create_task_validation_empty_category() {
        let state = test_state().await;

        let result = create_task(State(state), create_test_payload("Title", &["Work", ""])).await;

        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_task_assigns_category_colors() {
        let state = test_state().await;

        let (code, Json(task)) = create_task(
            State(state.clone()),
            create_test_payload("Title", &["Work", "Home"]),
        )
        .await
        .ok()
        .unwrap();

        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(task.categories, vec!["Work", "Home"]);
        let palette = state.palette.read();
        assert_eq!(palette.get("Work"), Some("#1f77b4"));
        assert_eq!(palette.get("Home"), Some("#ff7f0e"));
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let state = test_state().await;
        let query = TasksQuery {
            status: Some("Finished".to_string()),
            ..Default::default()
        };

        let err = list_tasks(State(state), Query(query)).await.err().unwrap();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Finished"));
    }

    #[tokio::test]
    async fn test_unknown_mode_is_bad_request() {
        let state = test_state().await;
        let query = TasksQuery {
            mode: Some("yearly".to_string()),
            ..Default::default()
        };

        let err = list_tasks(State(state), Query(query)).await.err().unwrap();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_offset_is_bad_request() {
        let state = test_state().await;
        let query = CalendarQuery {
            tz_offset: Some(24 * 60),
            ..Default::default()
        };

        let err = month_calendar(State(state), Query(query)).await.err().unwrap();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let state = test_state().await;

        let err = update_task_status(
            State(state.clone()),
            Path("missing".to_string()),
            Json(StatusUpdate {
                status: Status::Done,
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.code, StatusCode::NOT_FOUND);

        let err = delete_task(State(state), Path("missing".to_string()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_calendars_at_the_ends_of_the_date_range() {
        let state = test_state().await;

        let query = CalendarQuery {
            reference: Some(NaiveDate::MAX),
            ..Default::default()
        };
        let err = month_calendar(State(state.clone()), Query(query))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);

        for selected in [NaiveDate::MIN, NaiveDate::MAX] {
            let query = CalendarQuery {
                selected: Some(selected),
                ..Default::default()
            };
            let err = week_calendar(State(state.clone()), Query(query))
                .await
                .err()
                .unwrap();
            assert_eq!(err.code, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_listing_categories_assigns_no_colors() {
        let state = test_state().await;
        let serde_json::Value::Object(doc) =
            serde_json::json!({ "title": "Imported", "categories": ["Garden"] })
        else {
            unreachable!()
        };
        database::insert_document(&state.pool, "imported", &doc)
            .await
            .unwrap();

        let Json(first) = list_categories(State(state.clone())).await.ok().unwrap();
        let Json(second) = list_categories(State(state.clone())).await.ok().unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].name, "Garden");
        assert_eq!(first[0].task_count, 1);
        assert_eq!(state.palette.read().get("Garden"), None);
    }

    #[tokio::test]
    async fn test_create_task_without_categories_colors_the_fallback() {
        let state = test_state().await;

        create_task(State(state.clone()), create_test_payload("Title", &[]))
            .await
            .ok()
            .unwrap();

        assert_eq!(state.palette.read().get("General"), Some("#1f77b4"));
    }

    #[tokio::test]
    async fn test_legend_covers_every_variant() {
        let Json(legend) = legend().await;
        assert_eq!(legend.statuses.len(), Status::ALL.len());
        assert_eq!(legend.priorities.len(), Priority::ALL.len());
        assert_eq!(legend.statuses[2].label, "Done");
        assert_eq!(legend.statuses[2].ordinal, 2);
    }
}
