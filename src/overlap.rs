//! Schedule conflict detection.

use crate::error::{Error, Result};
use crate::item::Interval;

/// Fail on the first existing interval the candidate intersects.
///
/// Intervals are half-open, so windows that merely touch at an endpoint do
/// not conflict. The candidate's own id is skipped, which lets updates
/// re-validate against everything except their previous interval. Items
/// without a start time never produce an interval and are exempt on both
/// sides, as are epics.
pub fn ensure_no_overlap<I>(candidate: Option<Interval>, existing: I) -> Result<()>
where
    I: IntoIterator<Item = Interval>,
{
    let Some(candidate) = candidate else {
        return Ok(());
    };

    for other in existing {
        if other.id == candidate.id {
            continue;
        }
        if candidate.start < other.end && other.start < candidate.end {
            return Err(Error::TimeOverlap(other.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn interval(id: u64, start: DateTime<Utc>, minutes: i64) -> Interval {
        Interval {
            id,
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    #[test]
    fn intersecting_windows_conflict() {
        let existing = vec![interval(1, at(10, 0), 60)];
        let candidate = Some(interval(2, at(10, 30), 45));
        let err = ensure_no_overlap(candidate, existing).expect_err("overlap");
        assert!(matches!(err, Error::TimeOverlap(1)));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let existing = vec![interval(1, at(10, 0), 60)];
        let candidate = Some(interval(2, at(11, 0), 40));
        ensure_no_overlap(candidate, existing).expect("touching is free");
    }

    #[test]
    fn containment_conflicts() {
        let existing = vec![interval(1, at(10, 0), 120)];
        let candidate = Some(interval(2, at(10, 30), 10));
        assert!(ensure_no_overlap(candidate, existing).is_err());
    }

    #[test]
    fn undated_candidate_is_exempt() {
        let existing = vec![interval(1, at(10, 0), 60)];
        ensure_no_overlap(None, existing).expect("no interval, no conflict");
    }

    #[test]
    fn own_previous_interval_is_skipped() {
        let existing = vec![interval(5, at(10, 0), 60)];
        let candidate = Some(interval(5, at(10, 15), 30));
        ensure_no_overlap(candidate, existing).expect("self excluded");
    }
}
