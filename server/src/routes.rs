// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers::{self, AppState};
use axum::{
    Router,
    routing::{get, patch},
};

/// Creates and configures the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // `GET` assembles the task view of a screen, `POST` creates a task
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task).delete(handlers::delete_task),
        )
        .route("/api/tasks/{id}/status", patch(handlers::update_task_status))
        // Six-week month grid and the week strip, with task counts per day
        .route("/api/calendar/month", get(handlers::month_calendar))
        .route("/api/calendar/week", get(handlers::week_calendar))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/legend", get(handlers::legend))
        // Adds the shared state to the application
        .with_state(state)
}
