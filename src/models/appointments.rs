use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::{Appointment, TimeRange},
    schema::appointments,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::convert::TryFrom;

#[derive(Queryable)]
pub struct AppointmentData {
    pub id: u64,
    pub counselor_id: String,
    pub user_id: String,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "appointments"]
pub struct NewAppointmentData {
    pub counselor_id: String,
    pub user_id: String,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AppointmentData> for Appointment {
    type Error = ScheduleError;

    fn try_from(data: AppointmentData) -> ScheduleResult<Self> {
        let status = data.status.parse().map_err(|_| {
            ScheduleError::storage(format!(
                "appointment {} has unknown status '{}'",
                data.id, data.status
            ))
        })?;
        let range = TimeRange::new(data.start_time, data.end_time).map_err(|_| {
            ScheduleError::storage(format!("appointment {} has an empty range", data.id))
        })?;

        Ok(Appointment {
            id: data.id,
            counselor_id: data.counselor_id,
            client_id: data.user_id,
            date: data.appointment_date,
            range,
            status,
            notes: data.notes,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }
}

pub fn into_appointments(rows: Vec<AppointmentData>) -> ScheduleResult<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}
