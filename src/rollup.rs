//! Derived status and time window for epics.
//!
//! Pure functions over a subtask sequence; the store applies the results
//! after every subtask mutation.

use chrono::{DateTime, Utc};

use crate::item::{Status, SubtaskItem};

/// Aggregate schedule of an epic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub end: Option<DateTime<Utc>>,
}

/// Derive an epic's status from its subtask statuses.
///
/// No subtasks means NEW. Any in-progress subtask, or a mix of new and
/// done ones, makes the epic in progress; otherwise the homogeneous
/// status wins.
pub fn rollup_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut saw_new = false;
    let mut saw_done = false;

    for status in statuses {
        match status {
            Status::New => saw_new = true,
            Status::Done => saw_done = true,
            Status::InProgress => return Status::InProgress,
        }
        if saw_new && saw_done {
            return Status::InProgress;
        }
    }

    if saw_done {
        Status::Done
    } else {
        Status::New
    }
}

/// Derive an epic's time window from its subtasks.
///
/// Start is the earliest defined subtask start, end the latest defined
/// subtask end. Undated subtasks still contribute their duration to the
/// total but are skipped for the min/max, so a window can have a nonzero
/// duration with no start or end.
pub fn rollup_window<'a, I>(subtasks: I) -> TimeWindow
where
    I: IntoIterator<Item = &'a SubtaskItem>,
{
    let mut window = TimeWindow::default();

    for subtask in subtasks {
        window.duration_minutes += subtask.duration_minutes;

        if let Some(start) = subtask.start_time {
            if window.start.map_or(true, |current| start < current) {
                window.start = Some(start);
            }
        }
        if let Some(end) = subtask.end_time() {
            if window.end.map_or(true, |current| end > current) {
                window.end = Some(end);
            }
        }
    }

    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn subtask(status: Status, start: Option<DateTime<Utc>>, minutes: i64) -> SubtaskItem {
        let mut subtask = SubtaskItem::new("s", "", 1).with_status(status);
        subtask.start_time = start;
        subtask.duration_minutes = minutes;
        subtask
    }

    #[test]
    fn no_subtasks_is_new() {
        assert_eq!(rollup_status(std::iter::empty()), Status::New);
    }

    #[test]
    fn homogeneous_statuses_win() {
        assert_eq!(rollup_status([Status::New, Status::New]), Status::New);
        assert_eq!(rollup_status([Status::Done, Status::Done]), Status::Done);
    }

    #[test]
    fn new_and_done_mix_is_in_progress() {
        assert_eq!(rollup_status([Status::New, Status::Done]), Status::InProgress);
        assert_eq!(rollup_status([Status::Done, Status::New]), Status::InProgress);
    }

    #[test]
    fn any_in_progress_forces_in_progress() {
        assert_eq!(
            rollup_status([Status::New, Status::InProgress]),
            Status::InProgress
        );
        assert_eq!(
            rollup_status([Status::Done, Status::InProgress, Status::Done]),
            Status::InProgress
        );
        assert_eq!(rollup_status([Status::InProgress]), Status::InProgress);
    }

    #[test]
    fn empty_window_has_no_bounds() {
        assert_eq!(rollup_window(std::iter::empty()), TimeWindow::default());
    }

    #[test]
    fn window_spans_min_start_to_max_end() {
        let subtasks = [
            subtask(Status::New, Some(at(12, 0)), 30),
            subtask(Status::New, Some(at(9, 0)), 60),
            subtask(Status::New, Some(at(14, 0)), 15),
        ];
        let window = rollup_window(subtasks.iter());
        assert_eq!(window.start, Some(at(9, 0)));
        assert_eq!(window.end, Some(at(14, 0) + Duration::minutes(15)));
        assert_eq!(window.duration_minutes, 105);
    }

    #[test]
    fn undated_subtasks_contribute_duration_only() {
        let subtasks = [
            subtask(Status::New, None, 90),
            subtask(Status::New, Some(at(10, 0)), 30),
        ];
        let window = rollup_window(subtasks.iter());
        assert_eq!(window.start, Some(at(10, 0)));
        assert_eq!(window.end, Some(at(10, 30)));
        assert_eq!(window.duration_minutes, 120);
    }

    #[test]
    fn all_undated_leaves_bounds_undefined() {
        let subtasks = [subtask(Status::New, None, 45), subtask(Status::New, None, 15)];
        let window = rollup_window(subtasks.iter());
        assert_eq!(window.start, None);
        assert_eq!(window.end, None);
        assert_eq!(window.duration_minutes, 60);
    }
}
