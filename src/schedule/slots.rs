use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::{Appointment, AvailabilityWindow, CounselorProfile, TimeRange};
use crate::error::{ScheduleError, ScheduleResult};

/// A bookable interval offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot {
    pub date: NaiveDate,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Copy)]
pub struct SlotQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub granularity: Duration,
    pub max_days: i64,
}

impl SlotQuery {
    fn validate(&self) -> ScheduleResult<()> {
        if self.from > self.to {
            return Err(ScheduleError::validation(
                "The start date must not be after the end date",
            ));
        }
        if (self.to - self.from).num_days() + 1 > self.max_days {
            return Err(ScheduleError::validation(format!(
                "Slots can be searched for at most {} days at a time",
                self.max_days
            )));
        }
        if self.granularity <= Duration::zero() {
            return Err(ScheduleError::validation("Slot length must be positive"));
        }
        Ok(())
    }
}

/// Active availability covering `date`, merged into disjoint spans in
/// ascending order. Touching windows join into one span.
pub fn open_spans(windows: &[AvailabilityWindow], date: NaiveDate) -> Vec<TimeRange> {
    let mut ranges: Vec<TimeRange> = windows
        .iter()
        .filter(|w| w.active && w.recurrence.applies_to(date))
        .map(|w| w.range)
        .collect();
    ranges.sort();

    let mut spans: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match spans.last_mut() {
            Some(last) if range.start <= last.end => {
                if range.end > last.end {
                    last.end = range.end;
                }
            }
            _ => spans.push(range),
        }
    }
    spans
}

/// Consecutive slots of `granularity` stepped from the start of `span`.
/// A trailing remainder shorter than `granularity` is not offered.
pub fn span_slots(span: &TimeRange, date: NaiveDate, granularity: Duration) -> Vec<TimeRange> {
    let mut slots = Vec::new();
    if granularity <= Duration::zero() {
        return slots;
    }
    let span_end = date.and_time(span.end);
    let mut start = date.and_time(span.start);
    while start + granularity <= span_end {
        let end = start + granularity;
        slots.push(TimeRange {
            start: start.time(),
            end: end.time(),
        });
        start = end;
    }
    slots
}

/// Slots of `query.granularity` that fit the counselor's active availability,
/// avoid every appointment still holding its time and start no earlier than
/// `now` on the counselor's clock.
pub fn resolve_slots(
    counselor: &CounselorProfile,
    windows: &[AvailabilityWindow],
    booked: &[Appointment],
    query: &SlotQuery,
    now: DateTime<Utc>,
) -> ScheduleResult<Vec<Slot>> {
    query.validate()?;
    let local_now = counselor.local_time(now);

    let mut slots = Vec::new();
    let mut date = query.from;
    while date <= query.to {
        let taken: Vec<TimeRange> = booked
            .iter()
            .filter(|a| a.date == date && a.status.holds_slot())
            .map(|a| a.range)
            .collect();

        for span in open_spans(windows, date) {
            for candidate in span_slots(&span, date, query.granularity) {
                let start = date.and_time(candidate.start);
                if start >= local_now
                    && counselor.exists_locally(start)
                    && !taken.iter().any(|t| t.overlaps(&candidate))
                {
                    slots.push(Slot {
                        date,
                        range: candidate,
                    });
                }
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(slots)
}
