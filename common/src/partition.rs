// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::task::Task;

/// Splits tasks into `(active, completed)`, keeping the input order in both.
///
/// A task is completed iff its status is `Done`; this is the only completion
/// rule used anywhere in the views.
pub fn partition<'a, I>(tasks: I) -> (Vec<&'a Task>, Vec<&'a Task>)
where
    I: IntoIterator<Item = &'a Task>,
{
    let (completed, active) = tasks.into_iter().partition(|t| t.is_completed());
    (active, completed)
}
