// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Pure task logic shared by the server: the task model, normalization of
//! stored documents, filtering, completion partitioning, time-of-day sessions
//! and calendar grids. Nothing in here performs I/O or keeps state between
//! calls.
pub mod calendar;
pub mod colors;
pub mod filter;
pub mod normalize;
pub mod partition;
pub mod session;
pub mod task;
pub mod views;

pub use calendar::{CalendarCell, month_grid, week_strip};
pub use filter::{CategoryFilter, StatusFilter, TaskFilter, matches};
pub use normalize::{DataWarning, Normalized, normalize};
pub use partition::partition;
pub use session::{Session, group_by_session, session_of};
pub use task::{CreateTaskPayload, DEFAULT_CATEGORY, EnumError, Priority, Status, Task};
pub use views::{CalendarDay, TaskView, ViewMode, ViewState, build_view, with_task_counts};
