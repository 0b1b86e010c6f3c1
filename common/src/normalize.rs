// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::task::{Priority, Status, Task};

/// A stored document that did not have the shape we expected. These are never
/// fatal: the affected field falls back to its default and the caller decides
/// whether to log them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataWarning {
    #[error("task {id}: missing field `{field}`")]
    MissingField { id: String, field: &'static str },
    #[error("task {id}: field `{field}` has unexpected value {value}")]
    InvalidField {
        id: String,
        field: &'static str,
        value: Value,
    },
    #[error("task {id}: legacy isCompleted={flag} disagrees with status {status}")]
    CompletionMismatch { id: String, flag: bool, status: Status },
}

/// The result of normalizing one stored document.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub task: Task,
    pub warnings: Vec<DataWarning>,
}

/// Maps a raw stored document onto a [`Task`], defaulting whatever is absent.
///
/// Missing `categories`, `status`, `priority` and `deadline` are all valid and
/// produce no warning. Values of the wrong type or outside the enumerated
/// range are replaced by the default and reported.
pub fn normalize(id: &str, doc: &Map<String, Value>) -> Normalized {
    let mut warnings = Vec::new();
    let mut invalid = |field: &'static str, value: &Value| {
        warnings.push(DataWarning::InvalidField {
            id: id.to_string(),
            field,
            value: value.clone(),
        })
    };

    let title = match doc.get("title") {
        Some(Value::String(title)) => title.clone(),
        Some(other) => {
            invalid("title", other);
            String::new()
        }
        None => String::new(),
    };

    let priority = match present(doc, "priority") {
        Some(value) => value
            .as_i64()
            .and_then(|n| Priority::try_from(n).ok())
            .unwrap_or_else(|| {
                invalid("priority", value);
                Priority::Low
            }),
        None => Priority::Low,
    };

    let status = match present(doc, "status") {
        Some(value) => value
            .as_i64()
            .and_then(|n| Status::try_from(n).ok())
            .unwrap_or_else(|| {
                invalid("status", value);
                Status::Waiting
            }),
        None => Status::Waiting,
    };

    let categories = match present(doc, "categories") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.clone()),
                other => {
                    invalid("categories", other);
                    None
                }
            })
            .collect(),
        Some(other) => {
            invalid("categories", other);
            Vec::new()
        }
        None => Vec::new(),
    };

    let deadline = present(doc, "deadline").and_then(|value| {
        let parsed = parse_deadline(value);
        if parsed.is_none() {
            invalid("deadline", value);
        }
        parsed
    });

    if !doc.contains_key("title") {
        warnings.push(DataWarning::MissingField {
            id: id.to_string(),
            field: "title",
        });
    }

    // The legacy flag is only a mirror of the status; it is checked, never trusted.
    if let Some(flag) = doc.get("isCompleted").and_then(Value::as_bool) {
        if flag != (status == Status::Done) {
            warnings.push(DataWarning::CompletionMismatch {
                id: id.to_string(),
                flag,
                status,
            });
        }
    }

    Normalized {
        task: Task {
            id: id.to_string(),
            title,
            priority,
            status,
            categories,
            deadline,
        },
        warnings,
    }
}

/// Returns the field unless it is absent or explicitly `null`.
fn present<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    doc.get(field).filter(|value| !value.is_null())
}

/// Deadlines are either RFC 3339 strings or epoch milliseconds.
fn parse_deadline(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}
