use std::cmp::Ordering;

use chrono::Datelike;

use super::{AvailabilityWindow, NewWindow, Recurrence};
use crate::error::{ScheduleError, ScheduleResult};

/// Rejects a window that collides with an active window of the same
/// recurrence.
pub fn check_new_window(existing: &[AvailabilityWindow], window: &NewWindow) -> ScheduleResult<()> {
    let conflict = existing
        .iter()
        .any(|w| w.active && w.recurrence == window.recurrence && w.range.overlaps(&window.range));
    if conflict {
        return Err(ScheduleError::validation(
            "Time interval conflicts with an existing availability window",
        ));
    }
    Ok(())
}

/// Toggling a window must change it; re-activating must not collide.
pub fn check_toggle(
    existing: &[AvailabilityWindow],
    window: &AvailabilityWindow,
    active: bool,
) -> ScheduleResult<()> {
    if window.active == active {
        return Err(ScheduleError::validation(if active {
            "Availability window is already active"
        } else {
            "Availability window is already inactive"
        }));
    }
    if active {
        let others: Vec<AvailabilityWindow> = existing
            .iter()
            .filter(|w| w.id != window.id)
            .cloned()
            .collect();
        check_new_window(
            &others,
            &NewWindow {
                recurrence: window.recurrence,
                range: window.range,
            },
        )?;
    }
    Ok(())
}

fn recurrence_key(recurrence: &Recurrence) -> (u8, i64) {
    match recurrence {
        Recurrence::Weekly(day) => (0, day.num_days_from_monday() as i64),
        Recurrence::Once(date) => (1, date.num_days_from_ce() as i64),
    }
}

/// Weekly windows Monday to Sunday first, then dated ones, each by start.
pub fn sort_windows(windows: &mut [AvailabilityWindow]) {
    windows.sort_by(|a, b| {
        match recurrence_key(&a.recurrence).cmp(&recurrence_key(&b.recurrence)) {
            Ordering::Equal => (a.range, a.id).cmp(&(b.range, b.id)),
            other => other,
        }
    });
}
