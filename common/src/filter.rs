// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::str::FromStr;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::{EnumError, Status, Task};

/// The filter value that lets every task through.
pub const ALL: &str = "All";

/// Checks a task against the status and category filters as the UI passes them.
///
/// `"All"` disables a filter. A status filter otherwise has to equal the
/// task's status label, and a category filter has to appear anywhere in the
/// task's categories (not only in the primary one). Both must hold.
pub fn matches(task: &Task, status_filter: &str, category_filter: &str) -> bool {
    (status_filter == ALL || task.status.label() == status_filter)
        && (category_filter == ALL || task.has_category(category_filter))
}

/// True when the task is due on `date` in the viewer's calendar.
pub fn on_day<Tz: TimeZone>(task: &Task, date: NaiveDate, tz: &Tz) -> bool {
    task.deadline
        .is_some_and(|deadline| deadline.with_timezone(tz).date_naive() == date)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == *status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = EnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = EnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => ALL.to_string(),
            StatusFilter::Only(status) => status.label().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => task.has_category(category),
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value == ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value)
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => ALL.to_string(),
            CategoryFilter::Only(category) => category,
        }
    }
}

/// Both filters of a list screen, combined with a logical AND.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub category: CategoryFilter,
}

impl TaskFilter {
    pub fn new(status: StatusFilter, category: CategoryFilter) -> Self {
        Self { status, category }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.category.matches(task)
    }
}
