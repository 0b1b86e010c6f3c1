// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Category shown for tasks that carry no category at all.
pub const DEFAULT_CATEGORY: &str = "General";

/// Error returned when a stored ordinal or a label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumError {
    #[error("{kind} ordinal {value} is out of range")]
    Ordinal { kind: &'static str, value: i64 },
    #[error("unknown {kind} label `{label}`")]
    Label { kind: &'static str, label: String },
}

/// How urgent a task is. Stored as its ordinal (0 = low).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn ordinal(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Priority {
    type Error = EnumError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            _ => Err(EnumError::Ordinal {
                kind: "priority",
                value,
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = EnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| EnumError::Label {
                kind: "priority",
                label: s.to_string(),
            })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a task stands. Stored as its ordinal; `Done` is the only completed state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Waiting,
    #[serde(rename = "To Do")]
    ToDo,
    Done,
    #[serde(rename = "Hold On")]
    HoldOn,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Waiting,
        Status::ToDo,
        Status::Done,
        Status::HoldOn,
        Status::InProgress,
    ];

    /// The label shown on status chips and used by status filters.
    pub fn label(self) -> &'static str {
        match self {
            Status::Waiting => "Waiting",
            Status::ToDo => "To Do",
            Status::Done => "Done",
            Status::HoldOn => "Hold On",
            Status::InProgress => "In Progress",
        }
    }

    pub fn ordinal(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Status {
    type Error = EnumError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| Status::ALL.get(idx).copied())
            .ok_or(EnumError::Ordinal {
                kind: "status",
                value,
            })
    }
}

impl FromStr for Status {
    type Err = EnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| EnumError::Label {
                kind: "status",
                label: s.to_string(),
            })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Represents a task as the views work with it.
///
/// Completion is never stored on the task: it is always derived from `status`
/// through [`Task::is_completed`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    /// Ordered, possibly empty. The first entry is the primary category.
    pub categories: Vec<String>,
    /// Unscheduled tasks have no deadline.
    pub deadline: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Done
    }

    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Encodes this task as a stored document. The id lives outside the document.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("title".into(), Value::from(self.title.clone()));
        doc.insert("priority".into(), Value::from(self.priority.ordinal()));
        doc.insert("status".into(), Value::from(self.status.ordinal()));
        doc.insert("categories".into(), Value::from(self.categories.clone()));
        doc.insert(
            "deadline".into(),
            self.deadline
                .map(|d| Value::from(d.to_rfc3339()))
                .unwrap_or(Value::Null),
        );
        doc
    }
}

/// Structure used to receive task creation data from the API.
#[derive(Deserialize, Debug)]
pub struct CreateTaskPayload {
    pub title: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    // Missing status means the task has not been triaged yet.
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default)]
    pub categories: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
}

fn default_priority() -> Priority {
    Priority::Low
}

fn default_status() -> Status {
    Status::Waiting
}
