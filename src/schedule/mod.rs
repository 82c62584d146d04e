//! Booking domain: typed records and the rules that govern them.
//!
//! Nothing in here touches the database. The stores in `crate::database`
//! load records, hand them to these functions inside a transaction and write
//! back whatever the rules decide.

pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod profile;
pub mod report;
pub mod slots;

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::error::{ScheduleError, ScheduleResult};

/// Half-open wall-clock interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> ScheduleResult<Self> {
        if start >= end {
            return Err(ScheduleError::validation(
                "Start time must be earlier than end time",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Counselor,
    Admin,
}

impl FromStr for Role {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" | "user" => Ok(Role::Client),
            "counselor" => Ok(Role::Counselor),
            "admin" => Ok(Role::Admin),
            other => Err(ScheduleError::validation(format!(
                "Unknown user type '{}'",
                other
            ))),
        }
    }
}

/// Authenticated caller as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn require(&self, role: Role) -> ScheduleResult<()> {
        if self.role != role {
            return Err(ScheduleError::unauthorized(
                "You are not allowed to perform this action",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(ScheduleError::validation(format!(
                "Unknown approval status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounselorProfile {
    pub id: String,
    pub full_name: String,
    pub bio: String,
    pub credentials: String,
    pub specializations: Vec<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i32>,
    pub accepting_patients: bool,
    pub approval_status: ApprovalStatus,
    pub timezone: Tz,
    pub created_at: NaiveDateTime,
}

impl CounselorProfile {
    pub fn is_listed(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved && self.accepting_patients
    }

    /// Reference instant expressed on this counselor's wall clock.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.timezone).naive_local()
    }

    /// False for wall-clock times skipped by a daylight-saving jump.
    pub fn exists_locally(&self, at: NaiveDateTime) -> bool {
        !matches!(self.timezone.from_local_datetime(&at), LocalResult::None)
    }
}

/// When a window applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Weekly(Weekday),
    Once(NaiveDate),
}

impl Recurrence {
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Weekly(day) => date.weekday() == *day,
            Recurrence::Once(day) => *day == date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityWindow {
    pub id: u64,
    pub counselor_id: String,
    pub recurrence: Recurrence,
    pub range: TimeRange,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewWindow {
    pub recurrence: Recurrence,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether an appointment in this state still occupies its time range.
    pub fn holds_slot(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

impl FromStr for AppointmentStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(ScheduleError::validation(format!(
                "Unknown appointment status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: u64,
    pub counselor_id: String,
    pub client_id: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.range.start)
    }
}

/// Which party's appointments to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    Counselor(String),
    Client(String),
}
