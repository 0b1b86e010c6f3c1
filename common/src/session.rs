// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{TimeZone, Timelike};
use serde::Serialize;

use crate::task::Task;

/// Time-of-day bucket used to group a day's tasks.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Session {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Session {
    pub const ALL: [Session; 4] = [
        Session::Morning,
        Session::Afternoon,
        Session::Evening,
        Session::Night,
    ];

    /// Maps an hour of the day (0-23) onto its session.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=10 => Session::Morning,
            11..=14 => Session::Afternoon,
            15..=18 => Session::Evening,
            _ => Session::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Session::Morning => "Morning",
            Session::Afternoon => "Afternoon",
            Session::Evening => "Evening",
            Session::Night => "Night",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a task by the local hour of its deadline.
///
/// Unscheduled tasks land in `Night` so that grouped views never drop them.
pub fn session_of<Tz: TimeZone>(task: &Task, tz: &Tz) -> Session {
    match task.deadline {
        Some(deadline) => Session::from_hour(deadline.with_timezone(tz).hour()),
        None => Session::Night,
    }
}

/// Groups tasks by session. Every session is present in the result, possibly
/// with no tasks, and each group keeps the input order.
pub fn group_by_session<'a, I, Tz>(tasks: I, tz: &Tz) -> BTreeMap<Session, Vec<&'a Task>>
where
    I: IntoIterator<Item = &'a Task>,
    Tz: TimeZone,
{
    let mut groups: BTreeMap<Session, Vec<&'a Task>> =
        Session::ALL.into_iter().map(|s| (s, Vec::new())).collect();
    for task in tasks {
        groups.entry(session_of(task, tz)).or_default().push(task);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Status};
    use chrono::{FixedOffset, Utc};

    fn task_due(id: &str, hour: Option<u32>) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            priority: Priority::Low,
            status: Status::ToDo,
            categories: Vec::new(),
            deadline: hour.map(|h| Utc.with_ymd_and_hms(2025, 2, 10, h, 15, 0).unwrap()),
        }
    }

    #[test]
    fn test_hours_partition_into_sessions() {
        let expected = |hour: u32| match hour {
            5..=10 => Session::Morning,
            11..=14 => Session::Afternoon,
            15..=18 => Session::Evening,
            0..=4 | 19..=23 => Session::Night,
            _ => unreachable!(),
        };
        for hour in 0..24 {
            assert_eq!(Session::from_hour(hour), expected(hour), "hour {hour}");
            assert_eq!(session_of(&task_due("t", Some(hour)), &Utc), expected(hour));
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(Session::from_hour(4), Session::Night);
        assert_eq!(Session::from_hour(5), Session::Morning);
        assert_eq!(Session::from_hour(10), Session::Morning);
        assert_eq!(Session::from_hour(11), Session::Afternoon);
        assert_eq!(Session::from_hour(14), Session::Afternoon);
        assert_eq!(Session::from_hour(15), Session::Evening);
        assert_eq!(Session::from_hour(18), Session::Evening);
        assert_eq!(Session::from_hour(19), Session::Night);
    }

    #[test]
    fn test_examples() {
        assert_eq!(session_of(&task_due("a", Some(14)), &Utc), Session::Afternoon);
        assert_eq!(session_of(&task_due("b", Some(19)), &Utc), Session::Night);
        assert_eq!(session_of(&task_due("c", None), &Utc), Session::Night);
    }

    #[test]
    fn test_local_hour_is_used() {
        // 09:15 UTC is 14:45 five and a half hours east, which is afternoon...
        let task = task_due("t", Some(9));
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(session_of(&task, &Utc), Session::Morning);
        assert_eq!(session_of(&task, &ist), Session::Afternoon);

        // ...and six hours west of 09:15 UTC it is 03:15, which falls back into the night.
        let west = FixedOffset::west_opt(6 * 3600).unwrap();
        assert_eq!(session_of(&task, &west), Session::Night);
    }

    #[test]
    fn test_grouping_keeps_every_session_and_order() {
        let tasks = vec![
            task_due("late", Some(22)),
            task_due("breakfast", Some(7)),
            task_due("lunch", Some(12)),
            task_due("someday", None),
            task_due("early", Some(6)),
        ];

        let groups = group_by_session(&tasks, &Utc);

        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), Session::ALL);
        let ids = |s: Session| groups[&s].iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids(Session::Morning), vec!["breakfast", "early"]);
        assert_eq!(ids(Session::Afternoon), vec!["lunch"]);
        assert!(ids(Session::Evening).is_empty());
        assert_eq!(ids(Session::Night), vec!["late", "someday"]);
    }
}
