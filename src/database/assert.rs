use diesel::prelude::*;

use crate::{
    error::{ScheduleError, ScheduleResult},
    models::{
        appointments::AppointmentData, availability::WindowData, counselor_profiles::CounselorData,
    },
};

/// Loads a counselor row, taking its row lock when `lock` is set.
///
/// Every write that can affect bookings locks this row first, which is what
/// serializes bookings for one counselor across server processes.
pub fn assert_counselor(
    conn: &MysqlConnection,
    counselor_id: &str,
    lock: bool,
) -> ScheduleResult<CounselorData> {
    use crate::schema::counselor_profiles;

    let query = counselor_profiles::table.find(counselor_id);
    let res = if lock {
        query.for_update().first::<CounselorData>(conn).optional()?
    } else {
        query.first::<CounselorData>(conn).optional()?
    };
    res.ok_or_else(|| ScheduleError::not_found("No such counselor"))
}

pub fn full_name(conn: &MysqlConnection, user_id: &str) -> ScheduleResult<String> {
    use crate::schema::profiles;

    let res = profiles::table
        .find(user_id)
        .select(profiles::full_name)
        .first::<String>(conn)
        .optional()?;
    res.ok_or_else(|| ScheduleError::not_found("No such user"))
}

pub fn assert_window(
    conn: &MysqlConnection,
    counselor_id: &str,
    window_id: u64,
) -> ScheduleResult<WindowData> {
    use crate::schema::counselor_availability;

    let res = counselor_availability::table
        .filter(counselor_availability::id.eq(window_id))
        .filter(counselor_availability::counselor_id.eq(counselor_id))
        .first::<WindowData>(conn)
        .optional()?;
    res.ok_or_else(|| ScheduleError::not_found("No such availability window"))
}

/// Loads an appointment with its row lock held.
pub fn assert_appointment(conn: &MysqlConnection, appointment_id: u64) -> ScheduleResult<AppointmentData> {
    use crate::schema::appointments;

    let res = appointments::table
        .find(appointment_id)
        .for_update()
        .first::<AppointmentData>(conn)
        .optional()?;
    res.ok_or_else(|| ScheduleError::not_found("No such appointment"))
}
