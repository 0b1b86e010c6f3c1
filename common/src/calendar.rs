// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{Datelike, Days, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// Number of cells in a month grid: always six full weeks, so the grid keeps
/// the same height whatever the month.
pub const MONTH_GRID_CELLS: usize = 42;
pub const WEEK_CELLS: usize = 7;

/// One day slot of a rendered calendar.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub day: u32,
    pub is_current_month: bool,
    pub is_selected: bool,
    pub is_today: bool,
}

impl CalendarCell {
    /// Builds the cell for `date`. All flags compare calendar days, never times.
    fn new(date: NaiveDate, month_of: NaiveDate, selected: NaiveDate, today: NaiveDate) -> Self {
        Self {
            date,
            day: date.day(),
            is_current_month: date.year() == month_of.year() && date.month() == month_of.month(),
            is_selected: date == selected,
            is_today: date == today,
        }
    }
}

/// The Sunday on or before `date`, or `None` if it precedes the earliest
/// representable date.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// `N` consecutive days from `start`, or `None` if the run leaves chrono's
/// date range.
fn days_from<const N: usize>(start: NaiveDate) -> Option<[NaiveDate; N]> {
    let mut days = [start; N];
    let mut day = start;
    for slot in days.iter_mut().skip(1) {
        day = day.succ_opt()?;
        *slot = day;
    }
    Some(days)
}

/// Six weeks of days starting on the Sunday on or before the first day of
/// `reference`'s month. `None` near the ends of the representable range,
/// where the grid would run past them.
pub fn month_grid(
    reference: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
) -> Option<[CalendarCell; MONTH_GRID_CELLS]> {
    let start = week_start(first_of_month(reference))?;
    let days: [NaiveDate; MONTH_GRID_CELLS] = days_from(start)?;
    Some(days.map(|date| CalendarCell::new(date, reference, selected, today)))
}

/// The seven days of the week (Sunday first) that contains `selected`.
/// `is_current_month` is relative to `selected`'s month.
pub fn week_strip(selected: NaiveDate, today: NaiveDate) -> Option<[CalendarCell; WEEK_CELLS]> {
    let start = week_start(selected)?;
    let days: [NaiveDate; WEEK_CELLS] = days_from(start)?;
    Some(days.map(|date| CalendarCell::new(date, selected, selected, today)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Counts the runs of cells outside the month, treating the grid as a ring.
    fn outside_runs(cells: &[CalendarCell]) -> usize {
        (0..cells.len())
            .filter(|&i| {
                let prev = cells[(i + cells.len() - 1) % cells.len()];
                !cells[i].is_current_month && prev.is_current_month
            })
            .count()
    }

    #[test]
    fn test_month_grid_shape() {
        // Every month of a few years, including leap Februaries.
        for year in [2015, 2024, 2025, 2026] {
            for month in 1..=12 {
                let reference = date(year, month, 15);
                let grid = month_grid(reference, reference, reference).unwrap();

                assert_eq!(grid.len(), MONTH_GRID_CELLS);
                assert_eq!(grid[0].date.weekday(), Weekday::Sun);
                assert!(grid[0].date <= first_of_month(reference));
                assert_eq!(outside_runs(&grid), 1, "{year}-{month}");
                for pair in grid.windows(2) {
                    assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
                }
            }
        }
    }

    #[test]
    fn test_month_grid_for_march_2025() {
        // March 1st 2025 is a Saturday, so the grid starts on February 23rd.
        let grid = month_grid(date(2025, 3, 20), date(2025, 3, 5), date(2025, 3, 10)).unwrap();

        assert_eq!(grid[0].date, date(2025, 2, 23));
        assert_eq!(grid[0].day, 23);
        assert!(!grid[0].is_current_month);
        assert_eq!(grid[6].date, date(2025, 3, 1));
        assert!(grid[6].is_current_month);
        assert_eq!(grid[41].date, date(2025, 4, 5));
        assert_eq!(grid.iter().filter(|c| c.is_current_month).count(), 31);

        let selected: Vec<_> = grid.iter().filter(|c| c.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, date(2025, 3, 5));
        let today: Vec<_> = grid.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2025, 3, 10));
    }

    #[test]
    fn test_month_starting_on_sunday() {
        // February 2015 starts on a Sunday and has exactly four weeks.
        let grid = month_grid(date(2015, 2, 1), date(2015, 2, 1), date(2000, 1, 1)).unwrap();
        assert_eq!(grid[0].date, date(2015, 2, 1));
        assert!(grid[..28].iter().all(|c| c.is_current_month));
        assert!(grid[28..].iter().all(|c| !c.is_current_month));
        assert!(grid.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_selection_outside_the_month() {
        let grid = month_grid(date(2025, 3, 1), date(2025, 7, 4), date(2025, 7, 4)).unwrap();
        assert!(grid.iter().all(|c| !c.is_selected && !c.is_today));
    }

    #[test]
    fn test_week_strip() {
        // Wednesday, January 1st 2025.
        let strip = week_strip(date(2025, 1, 1), date(2024, 12, 30)).unwrap();

        assert_eq!(strip.len(), WEEK_CELLS);
        assert_eq!(strip[0].date, date(2024, 12, 29));
        assert_eq!(strip[0].date.weekday(), Weekday::Sun);
        assert_eq!(strip[6].date, date(2025, 1, 4));
        assert_eq!(strip.iter().filter(|c| c.is_selected).count(), 1);
        assert!(strip[3].is_selected);
        assert!(strip[1].is_today);
        assert!(!strip[2].is_current_month);
        assert!(strip[3].is_current_month);
    }

    #[test]
    fn test_week_strip_on_sunday_and_saturday() {
        let sunday = week_strip(date(2025, 6, 1), date(2025, 6, 1)).unwrap();
        assert_eq!(sunday[0].date, date(2025, 6, 1));
        assert!(sunday[0].is_selected && sunday[0].is_today);

        let saturday = week_strip(date(2025, 6, 7), date(2025, 6, 1)).unwrap();
        assert_eq!(saturday[0].date, date(2025, 6, 1));
        assert!(saturday[6].is_selected);
    }

    #[test]
    fn test_grids_at_the_ends_of_the_date_range() {
        // The last month's grid runs past the latest date.
        assert!(month_grid(NaiveDate::MAX, NaiveDate::MAX, NaiveDate::MAX).is_none());
        assert!(week_strip(NaiveDate::MAX, NaiveDate::MAX).is_none());

        // The earliest date is not a Sunday, so its week starts before it.
        assert_ne!(NaiveDate::MIN.weekday(), Weekday::Sun);
        assert_eq!(week_start(NaiveDate::MIN), None);
        assert!(week_strip(NaiveDate::MIN, NaiveDate::MIN).is_none());
        assert!(month_grid(NaiveDate::MIN, NaiveDate::MIN, NaiveDate::MIN).is_none());

        // A month well inside the range still has its full grid.
        let late = NaiveDate::MAX - Duration::days(365);
        assert!(month_grid(late, late, late).is_some());
    }
}
