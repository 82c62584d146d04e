use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::{
    database::BookingStore,
    error::{ScheduleError, ScheduleResult},
    schedule::{Appointment, ApprovalStatus, CounselorProfile},
};

/// Approved counselors only; anything else is reported as missing.
pub fn listed_counselor(store: &dyn BookingStore, counselor_id: &str) -> ScheduleResult<CounselorProfile> {
    let profile = store.counselor(counselor_id)?;
    if profile.approval_status != ApprovalStatus::Approved {
        return Err(ScheduleError::not_found("No such counselor"));
    }
    Ok(profile)
}

/// Timezone of every counselor the client has appointments with.
///
/// A counselor whose profile is gone falls back to UTC so the client can
/// still see the appointment.
pub fn counselor_zones(
    store: &dyn BookingStore,
    appointments: &[Appointment],
) -> ScheduleResult<HashMap<String, Tz>> {
    let mut zones = HashMap::new();
    for appointment in appointments {
        if zones.contains_key(&appointment.counselor_id) {
            continue;
        }
        let zone = match store.counselor(&appointment.counselor_id) {
            Ok(profile) => profile.timezone,
            Err(ScheduleError::NotFound(_)) => Tz::UTC,
            Err(err) => return Err(err),
        };
        zones.insert(appointment.counselor_id.clone(), zone);
    }
    Ok(zones)
}

pub fn wall_clock(zones: &HashMap<String, Tz>, appointment: &Appointment, now: DateTime<Utc>) -> NaiveDateTime {
    let zone = zones.get(&appointment.counselor_id).copied().unwrap_or(Tz::UTC);
    now.with_timezone(&zone).naive_local()
}
