use std::collections::HashMap;

use serde::Serialize;

use crate::{
    schedule::{Appointment, CounselorProfile},
    utils::{format_date, format_time},
};

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }
}

/// Wire form of an appointment, shared by the client and counselor views.
#[derive(Default, Serialize)]
pub struct AppointItem {
    pub appointment_id: u64,
    pub counselor_id: String,
    pub counselor_name: String,
    pub client_id: String,
    pub client_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub notes: String,
}

impl AppointItem {
    /// `names` maps user ids to display names; unknown ids render empty.
    pub fn new(appointment: &Appointment, names: &HashMap<String, String>) -> Self {
        let name_of = |id: &String| names.get(id).cloned().unwrap_or_default();
        Self {
            appointment_id: appointment.id,
            counselor_id: appointment.counselor_id.clone(),
            counselor_name: name_of(&appointment.counselor_id),
            client_id: appointment.client_id.clone(),
            client_name: name_of(&appointment.client_id),
            date: format_date(&appointment.date),
            start_time: format_time(&appointment.range.start),
            end_time: format_time(&appointment.range.end),
            status: appointment.status.to_string(),
            notes: appointment.notes.clone().unwrap_or_default(),
        }
    }
}

/// Every party named by `appointments`, each once.
pub fn parties(appointments: &[Appointment]) -> Vec<String> {
    let mut ids: Vec<String> = appointments
        .iter()
        .flat_map(|a| vec![a.counselor_id.clone(), a.client_id.clone()])
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

#[derive(Default, Serialize)]
pub struct CounselorItem {
    pub counselor_id: String,
    pub full_name: String,
    pub bio: String,
    pub credentials: String,
    pub specializations: Vec<String>,
    pub phone: String,
    pub location: String,
    pub years_experience: Option<i32>,
    pub accepting_patients: bool,
    pub approval_status: String,
    pub timezone: String,
    pub created_at: String,
}

impl From<CounselorProfile> for CounselorItem {
    fn from(profile: CounselorProfile) -> Self {
        Self {
            created_at: format_date(&profile.created_at.date()),
            approval_status: profile.approval_status.to_string(),
            timezone: profile.timezone.name().to_string(),
            counselor_id: profile.id,
            full_name: profile.full_name,
            bio: profile.bio,
            credentials: profile.credentials,
            specializations: profile.specializations,
            phone: profile.phone.unwrap_or_default(),
            location: profile.location.unwrap_or_default(),
            years_experience: profile.years_experience,
            accepting_patients: profile.accepting_patients,
        }
    }
}

/// Gives each response type an `err` constructor carrying the message and
/// kind of a `ScheduleError`.
#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err(err: &$crate::error::ScheduleError) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        code: err.code().to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}
