use std::{collections::HashMap, convert::TryFrom};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use tracing::{debug, info};

use super::{
    assert::{assert_appointment, assert_counselor, assert_window, full_name},
    check_session_age, get_db_conn, hash_token, BookingStore, DbConn, DbPool, Page,
};
use crate::{
    error::{ScheduleError, ScheduleResult},
    models::{
        appointments::{into_appointments, AppointmentData, NewAppointmentData},
        availability::{NewWindowData, WindowData},
        counselor_profiles::CounselorData,
        profiles::ProfileData,
        sessions::SessionData,
    },
    schedule::{
        availability::{check_new_window, check_toggle, sort_windows},
        booking::{check_booking, BookingPolicy, BookingRequest},
        lifecycle::{next_status, AppointmentAction},
        profile::{apply_edit, review, specialization_needle, ProfileEdit},
        Appointment, ApprovalStatus, AvailabilityWindow, CounselorProfile, Identity, NewWindow,
        Party,
    },
};

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

pub struct MysqlStore {
    pool: DbPool,
}

impl MysqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> ScheduleResult<DbConn> {
        get_db_conn(&self.pool)
    }
}

fn load_windows(conn: &MysqlConnection, counselor_id: &str) -> ScheduleResult<Vec<AvailabilityWindow>> {
    use crate::schema::counselor_availability;

    let rows = counselor_availability::table
        .filter(counselor_availability::counselor_id.eq(counselor_id))
        .load::<WindowData>(conn)?;
    let mut windows = rows
        .into_iter()
        .map(AvailabilityWindow::try_from)
        .collect::<ScheduleResult<Vec<_>>>()?;
    sort_windows(&mut windows);
    Ok(windows)
}

fn load_profile(conn: &MysqlConnection, counselor_id: &str, lock: bool) -> ScheduleResult<CounselorProfile> {
    let data = assert_counselor(conn, counselor_id, lock)?;
    let name = full_name(conn, counselor_id)?;
    data.into_profile(name)
}

fn into_profiles(rows: Vec<(CounselorData, String)>) -> ScheduleResult<Vec<CounselorProfile>> {
    rows.into_iter()
        .map(|(data, name)| data.into_profile(name))
        .collect()
}

impl BookingStore for MysqlStore {
    fn identity(&self, token: &str, now: DateTime<Utc>, ttl: Duration) -> ScheduleResult<Identity> {
        use crate::schema::{profiles, sessions};

        let conn = self.conn()?;
        let data = sessions::table
            .filter(sessions::token_hash.eq(hash_token(token)))
            .order(sessions::login_time.desc())
            .first::<SessionData>(&conn)
            .optional()?
            .ok_or_else(|| ScheduleError::unauthorized("You are not logged in"))?;
        check_session_age(data.login_time, now, ttl)?;

        profiles::table
            .find(&data.user_id)
            .first::<ProfileData>(&conn)
            .optional()?
            .ok_or_else(|| ScheduleError::unauthorized("You are not logged in"))?
            .into_identity()
    }

    fn display_names(&self, user_ids: &[String]) -> ScheduleResult<HashMap<String, String>> {
        use crate::schema::profiles;

        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.conn()?;
        let rows = profiles::table
            .filter(profiles::id.eq_any(user_ids))
            .select((profiles::id, profiles::full_name))
            .load::<(String, String)>(&conn)?;
        Ok(rows.into_iter().collect())
    }

    fn counselor(&self, counselor_id: &str) -> ScheduleResult<CounselorProfile> {
        let conn = self.conn()?;
        load_profile(&conn, counselor_id, false)
    }

    fn search_counselors(
        &self,
        specialization: Option<&str>,
        page: &Page,
    ) -> ScheduleResult<Vec<CounselorProfile>> {
        use crate::schema::{counselor_profiles, profiles};

        let conn = self.conn()?;
        let pattern = crate::utils::get_str_pattern_opt(specialization.and_then(specialization_needle));
        let rows = counselor_profiles::table
            .inner_join(profiles::table.on(counselor_profiles::id.eq(profiles::id)))
            .filter(counselor_profiles::approval_status.eq(ApprovalStatus::Approved.as_str()))
            .filter(counselor_profiles::is_accepting_patients.eq(true))
            .filter(counselor_profiles::specializations.like(pattern))
            .order(counselor_profiles::created_at.desc())
            .offset(page.first_index)
            .limit(page.limit)
            .select((counselor_profiles::all_columns, profiles::full_name))
            .load::<(CounselorData, String)>(&conn)?;
        into_profiles(rows)
    }

    fn profiles_by_status(
        &self,
        status: ApprovalStatus,
        page: &Page,
    ) -> ScheduleResult<Vec<CounselorProfile>> {
        use crate::schema::{counselor_profiles, profiles};

        let conn = self.conn()?;
        let rows = counselor_profiles::table
            .inner_join(profiles::table.on(counselor_profiles::id.eq(profiles::id)))
            .filter(counselor_profiles::approval_status.eq(status.as_str()))
            .order(counselor_profiles::created_at.asc())
            .offset(page.first_index)
            .limit(page.limit)
            .select((counselor_profiles::all_columns, profiles::full_name))
            .load::<(CounselorData, String)>(&conn)?;
        into_profiles(rows)
    }

    fn save_profile(&self, edit: ProfileEdit, now: DateTime<Utc>) -> ScheduleResult<CounselorProfile> {
        use crate::schema::{counselor_profiles, profiles};

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            let existing = match assert_counselor(&conn, &edit.counselor_id, true) {
                Ok(data) => Some(data.into_profile(edit.full_name.clone())?),
                Err(ScheduleError::NotFound(_)) => None,
                Err(err) => return Err(err),
            };

            let updated = diesel::update(profiles::table.find(&edit.counselor_id))
                .set(profiles::full_name.eq(&edit.full_name))
                .execute(&conn)?;
            if updated == 0 {
                return Err(ScheduleError::not_found("No such user"));
            }

            let profile = apply_edit(existing.as_ref(), edit, now.naive_utc());
            let data = CounselorData::from_profile(&profile)?;
            if existing.is_some() {
                diesel::update(counselor_profiles::table.find(&profile.id))
                    .set(&data)
                    .execute(&conn)?;
            } else {
                diesel::insert_into(counselor_profiles::table)
                    .values(&data)
                    .execute(&conn)?;
            }

            info!(counselor = %profile.id, status = %profile.approval_status, "counselor profile saved");
            Ok(profile)
        })
    }

    fn review_profile(
        &self,
        counselor_id: &str,
        decision: ApprovalStatus,
    ) -> ScheduleResult<CounselorProfile> {
        use crate::schema::counselor_profiles;

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            let mut profile = load_profile(&conn, counselor_id, true)?;
            profile.approval_status = review(profile.approval_status, decision)?;

            diesel::update(counselor_profiles::table.find(counselor_id))
                .set(counselor_profiles::approval_status.eq(profile.approval_status.as_str()))
                .execute(&conn)?;

            Ok(profile)
        })
    }

    fn windows(&self, counselor_id: &str) -> ScheduleResult<Vec<AvailabilityWindow>> {
        let conn = self.conn()?;
        load_windows(&conn, counselor_id)
    }

    fn add_window(&self, counselor_id: &str, window: NewWindow) -> ScheduleResult<AvailabilityWindow> {
        use crate::schema::counselor_availability;

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            assert_counselor(&conn, counselor_id, true)?;
            let existing = load_windows(&conn, counselor_id)?;
            check_new_window(&existing, &window)?;

            diesel::insert_into(counselor_availability::table)
                .values(NewWindowData::new(
                    counselor_id.to_string(),
                    window.recurrence,
                    window.range,
                ))
                .execute(&conn)?;
            let id = diesel::select(last_insert_id).first::<u64>(&conn)?;

            Ok(AvailabilityWindow {
                id,
                counselor_id: counselor_id.to_string(),
                recurrence: window.recurrence,
                range: window.range,
                active: true,
            })
        })
    }

    fn set_window_active(
        &self,
        counselor_id: &str,
        window_id: u64,
        active: bool,
    ) -> ScheduleResult<AvailabilityWindow> {
        use crate::schema::counselor_availability;

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            assert_counselor(&conn, counselor_id, true)?;
            let mut window = AvailabilityWindow::try_from(assert_window(&conn, counselor_id, window_id)?)?;
            let existing = load_windows(&conn, counselor_id)?;
            check_toggle(&existing, &window, active)?;

            diesel::update(counselor_availability::table.find(window_id))
                .set(counselor_availability::is_active.eq(active))
                .execute(&conn)?;

            window.active = active;
            Ok(window)
        })
    }

    fn delete_window(&self, counselor_id: &str, window_id: u64) -> ScheduleResult<()> {
        use crate::schema::counselor_availability;

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            assert_counselor(&conn, counselor_id, true)?;
            assert_window(&conn, counselor_id, window_id)?;

            diesel::delete(counselor_availability::table.find(window_id)).execute(&conn)?;
            Ok(())
        })
    }

    fn appointments(
        &self,
        party: &Party,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ScheduleResult<Vec<Appointment>> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        let mut query = appointments::table.into_boxed();
        query = match party {
            Party::Counselor(id) => query.filter(appointments::counselor_id.eq(id.clone())),
            Party::Client(id) => query.filter(appointments::user_id.eq(id.clone())),
        };
        if let Some(from) = from {
            query = query.filter(appointments::appointment_date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(appointments::appointment_date.le(to));
        }
        let rows = query
            .order((
                appointments::appointment_date.asc(),
                appointments::start_time.asc(),
            ))
            .load::<AppointmentData>(&conn)?;
        into_appointments(rows)
    }

    fn book(&self, request: &BookingRequest, policy: &BookingPolicy) -> ScheduleResult<Appointment> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            // Lock order: counselor row, then that day's appointments.
            let counselor = load_profile(&conn, &request.counselor_id, true)?;
            let windows = load_windows(&conn, &request.counselor_id)?;
            let booked = appointments::table
                .filter(appointments::counselor_id.eq(&request.counselor_id))
                .filter(appointments::appointment_date.eq(request.date))
                .filter(appointments::status.ne("cancelled"))
                .for_update()
                .load::<AppointmentData>(&conn)?;
            let booked = into_appointments(booked)?;

            check_booking(&counselor, &windows, &booked, request, policy)?;

            let stamp = policy.now.naive_utc();
            diesel::insert_into(appointments::table)
                .values(NewAppointmentData {
                    counselor_id: request.counselor_id.clone(),
                    user_id: request.client_id.clone(),
                    appointment_date: request.date,
                    start_time: request.range.start,
                    end_time: request.range.end,
                    status: policy.initial_status().as_str().to_string(),
                    notes: request.notes.clone(),
                    created_at: stamp,
                    updated_at: stamp,
                })
                .execute(&conn)?;
            let id = diesel::select(last_insert_id).first::<u64>(&conn)?;
            debug!(appointment = id, "appointment row inserted");

            let data = appointments::table.find(id).first::<AppointmentData>(&conn)?;
            Appointment::try_from(data)
        })
    }

    fn transition(
        &self,
        appointment_id: u64,
        actor: &Identity,
        action: AppointmentAction,
        now: DateTime<Utc>,
    ) -> ScheduleResult<Appointment> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        conn.transaction::<_, ScheduleError, _>(|| {
            let mut appointment = Appointment::try_from(assert_appointment(&conn, appointment_id)?)?;
            let status = next_status(&appointment, actor, action)?;

            let stamp = now.naive_utc();
            diesel::update(appointments::table.find(appointment_id))
                .set((
                    appointments::status.eq(status.as_str()),
                    appointments::updated_at.eq(stamp),
                ))
                .execute(&conn)?;

            appointment.status = status;
            appointment.updated_at = stamp;
            Ok(appointment)
        })
    }
}
