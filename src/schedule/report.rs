use chrono::{DateTime, NaiveDateTime, Utc};

use super::{Appointment, ApprovalStatus, AvailabilityWindow, CounselorProfile};

#[derive(Debug, Default)]
pub struct Agenda {
    /// Not cancelled and not yet started, soonest first.
    pub upcoming: Vec<Appointment>,
    /// Everything else, most recent first.
    pub past: Vec<Appointment>,
}

/// Splits appointments around the reference instant. `local_now` gives the
/// reference instant on the clock of each appointment's counselor.
pub fn split_agenda<F>(appointments: Vec<Appointment>, local_now: F, past_limit: usize) -> Agenda
where
    F: Fn(&Appointment) -> NaiveDateTime,
{
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) = appointments
        .into_iter()
        .partition(|a| a.status.holds_slot() && a.starts_at() >= local_now(a));

    upcoming.sort_by_key(|a| (a.starts_at(), a.id));
    past.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()).then(b.id.cmp(&a.id)));
    past.truncate(past_limit);

    Agenda { upcoming, past }
}

/// Open appointments listed under "next up" on the dashboard.
pub const NEXT_UP_LIMIT: usize = 5;

#[derive(Debug)]
pub struct Dashboard {
    pub approval_status: ApprovalStatus,
    pub today: Vec<Appointment>,
    pub upcoming_open: usize,
    /// Open appointments not yet started, soonest first.
    pub next_open: Vec<Appointment>,
    pub active_windows: usize,
}

pub fn dashboard(
    profile: &CounselorProfile,
    appointments: &[Appointment],
    windows: &[AvailabilityWindow],
    now: DateTime<Utc>,
) -> Dashboard {
    let local_now = profile.local_time(now);
    let today = local_now.date();

    let mut todays: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.counselor_id == profile.id && a.date == today && a.status.is_open())
        .cloned()
        .collect();
    todays.sort_by_key(|a| (a.range.start, a.id));

    let upcoming_open = appointments
        .iter()
        .filter(|a| a.counselor_id == profile.id && a.date >= today && a.status.is_open())
        .count();

    let mut next_open: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.counselor_id == profile.id && a.status.is_open() && a.starts_at() >= local_now)
        .cloned()
        .collect();
    next_open.sort_by_key(|a| (a.starts_at(), a.id));
    next_open.truncate(NEXT_UP_LIMIT);

    let active_windows = windows
        .iter()
        .filter(|w| w.counselor_id == profile.id && w.active)
        .count();

    Dashboard {
        approval_status: profile.approval_status,
        today: todays,
        upcoming_open,
        next_open,
        active_windows,
    }
}
