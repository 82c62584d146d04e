pub mod assert;
#[cfg(test)]
pub mod memory;
pub mod mysql;

use std::collections::HashMap;

use blake2::{Blake2b, Digest};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;

use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::{
        booking::{BookingPolicy, BookingRequest},
        lifecycle::AppointmentAction,
        profile::ProfileEdit,
        Appointment, ApprovalStatus, AvailabilityWindow, CounselorProfile, Identity, NewWindow,
        Party,
    },
};

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<MysqlConnection>>;

pub fn get_db_conn(pool: &DbPool) -> ScheduleResult<DbConn> {
    pool.get().map_err(ScheduleError::from)
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub first_index: i64,
    pub limit: i64,
}

/// Persistence for the booking engine.
///
/// Every method is one short transaction. Methods that change appointments
/// or availability serialize on the counselor they touch, so concurrent
/// requests against one counselor observe each other's commits.
pub trait BookingStore: Send + Sync {
    /// Resolves a login token issued by the identity provider.
    fn identity(&self, token: &str, now: DateTime<Utc>, ttl: Duration) -> ScheduleResult<Identity>;

    fn display_names(&self, user_ids: &[String]) -> ScheduleResult<HashMap<String, String>>;

    /// Any counselor profile regardless of approval.
    fn counselor(&self, counselor_id: &str) -> ScheduleResult<CounselorProfile>;

    /// Approved counselors accepting patients, newest first.
    fn search_counselors(
        &self,
        specialization: Option<&str>,
        page: &Page,
    ) -> ScheduleResult<Vec<CounselorProfile>>;

    /// Profiles waiting in a review state, oldest first.
    fn profiles_by_status(
        &self,
        status: ApprovalStatus,
        page: &Page,
    ) -> ScheduleResult<Vec<CounselorProfile>>;

    fn save_profile(&self, edit: ProfileEdit, now: DateTime<Utc>) -> ScheduleResult<CounselorProfile>;

    fn review_profile(
        &self,
        counselor_id: &str,
        decision: ApprovalStatus,
    ) -> ScheduleResult<CounselorProfile>;

    fn windows(&self, counselor_id: &str) -> ScheduleResult<Vec<AvailabilityWindow>>;

    fn add_window(&self, counselor_id: &str, window: NewWindow) -> ScheduleResult<AvailabilityWindow>;

    fn set_window_active(
        &self,
        counselor_id: &str,
        window_id: u64,
        active: bool,
    ) -> ScheduleResult<AvailabilityWindow>;

    fn delete_window(&self, counselor_id: &str, window_id: u64) -> ScheduleResult<()>;

    /// Appointments of one party, optionally bounded by date (inclusive),
    /// ordered by date and start time.
    fn appointments(
        &self,
        party: &Party,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ScheduleResult<Vec<Appointment>>;

    /// Re-validates and inserts the booking atomically.
    fn book(&self, request: &BookingRequest, policy: &BookingPolicy) -> ScheduleResult<Appointment>;

    fn transition(
        &self,
        appointment_id: u64,
        actor: &Identity,
        action: AppointmentAction,
        now: DateTime<Utc>,
    ) -> ScheduleResult<Appointment>;
}

/// Sessions are stored by digest so a leaked table does not leak tokens.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Blake2b::digest(token.as_bytes()))
}

pub fn check_session_age(
    login_time: NaiveDateTime,
    now: DateTime<Utc>,
    ttl: Duration,
) -> ScheduleResult<()> {
    if now.naive_utc().signed_duration_since(login_time) > ttl {
        return Err(ScheduleError::unauthorized("Login has expired"));
    }
    Ok(())
}
