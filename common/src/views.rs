// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::calendar::{CalendarCell, week_start};
use crate::filter::{TaskFilter, on_day};
use crate::partition::partition;
use crate::session::{Session, group_by_session};
use crate::task::{Priority, Task};

/// Which screen the tasks are being assembled for. Every mode but `List`
/// restricts tasks to a window of days around the selected date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view mode `{0}`")]
pub struct UnknownViewMode(pub String);

impl FromStr for ViewMode {
    type Err = UnknownViewMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewMode::List),
            "daily" => Ok(ViewMode::Daily),
            "weekly" => Ok(ViewMode::Weekly),
            "monthly" => Ok(ViewMode::Monthly),
            _ => Err(UnknownViewMode(s.to_string())),
        }
    }
}

/// Everything a screen has selected. Passed in explicitly on every call; the
/// view functions keep nothing between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub filter: TaskFilter,
    pub mode: ViewMode,
    pub selected: NaiveDate,
}

impl ViewState {
    pub fn new(filter: TaskFilter, mode: ViewMode, selected: NaiveDate) -> Self {
        Self {
            filter,
            mode,
            selected,
        }
    }

    /// Whether the task falls within this mode's window of days.
    fn in_window<Tz: TimeZone>(&self, task: &Task, tz: &Tz) -> bool {
        let due = task
            .deadline
            .map(|deadline| deadline.with_timezone(tz).date_naive());
        match self.mode {
            ViewMode::List => true,
            ViewMode::Daily => on_day(task, self.selected, tz),
            ViewMode::Weekly => {
                // Weeks cut off by either end of the date range are clamped.
                let start = week_start(self.selected).unwrap_or(NaiveDate::MIN);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
                due.is_some_and(|d| d >= start && d <= end)
            }
            ViewMode::Monthly => due.is_some_and(|d| {
                d.year() == self.selected.year() && d.month() == self.selected.month()
            }),
        }
    }
}

/// The assembled content of a task screen.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TaskView {
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
    /// The active tasks grouped by time of day.
    pub sessions: BTreeMap<Session, Vec<Task>>,
}

impl TaskView {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

/// Filters, windows, partitions, sorts and groups `tasks` for one screen.
pub fn build_view<Tz: TimeZone>(tasks: &[Task], state: &ViewState, tz: &Tz) -> TaskView {
    let visible = tasks
        .iter()
        .filter(|t| state.filter.matches(t) && state.in_window(t, tz));
    let (mut active, mut completed) = partition(visible);
    active.sort_by(|a, b| display_order(a, b));
    completed.sort_by(|a, b| display_order(a, b));

    let sessions: BTreeMap<Session, Vec<Task>> = group_by_session(active.iter().copied(), tz)
        .into_iter()
        .map(|(session, group)| (session, group.into_iter().cloned().collect()))
        .collect();

    TaskView {
        active: active.into_iter().cloned().collect(),
        completed: completed.into_iter().cloned().collect(),
        sessions,
    }
}

/// Earliest deadline first (unscheduled last), then higher priority, then title.
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(task: &Task) -> (DateTime<Utc>, Reverse<Priority>, &str) {
    (
        task.deadline.unwrap_or(DateTime::<Utc>::MAX_UTC),
        Reverse(task.priority),
        task.title.as_str(),
    )
}

/// A calendar cell along with the number of tasks due on it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    #[serde(flatten)]
    pub cell: CalendarCell,
    pub task_count: usize,
}

/// Annotates each cell with how many of `tasks` are due that day.
pub fn with_task_counts<Tz: TimeZone>(
    cells: &[CalendarCell],
    tasks: &[Task],
    tz: &Tz,
) -> Vec<CalendarDay> {
    cells
        .iter()
        .map(|cell| CalendarDay {
            cell: *cell,
            task_count: tasks.iter().filter(|t| on_day(t, cell.date, tz)).count(),
        })
        .collect()
}
