use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::{profile::parse_timezone, CounselorProfile},
    schema::counselor_profiles,
};
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable, AsChangeset)]
#[table_name = "counselor_profiles"]
#[changeset_options(treat_none_as_null = "true")]
pub struct CounselorData {
    pub id: String,
    pub bio: String,
    pub credentials: String,
    pub specializations: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i32>,
    pub is_accepting_patients: bool,
    pub approval_status: String,
    pub timezone: String,
    pub created_at: NaiveDateTime,
}

impl CounselorData {
    pub fn into_profile(self, full_name: String) -> ScheduleResult<CounselorProfile> {
        let approval_status = self.approval_status.parse().map_err(|_| {
            ScheduleError::storage(format!(
                "counselor {} has unknown approval status '{}'",
                self.id, self.approval_status
            ))
        })?;
        let timezone = parse_timezone(&self.timezone).map_err(|_| {
            ScheduleError::storage(format!(
                "counselor {} has unknown timezone '{}'",
                self.id, self.timezone
            ))
        })?;
        let specializations = serde_json::from_str(&self.specializations).map_err(|err| {
            ScheduleError::storage(format!(
                "counselor {} has malformed specializations: {}",
                self.id, err
            ))
        })?;

        Ok(CounselorProfile {
            id: self.id,
            full_name,
            bio: self.bio,
            credentials: self.credentials,
            specializations,
            phone: self.phone,
            location: self.location,
            years_experience: self.years_experience,
            accepting_patients: self.is_accepting_patients,
            approval_status,
            timezone,
            created_at: self.created_at,
        })
    }

    pub fn from_profile(profile: &CounselorProfile) -> ScheduleResult<Self> {
        let specializations = serde_json::to_string(&profile.specializations)
            .map_err(|err| ScheduleError::storage(err.to_string()))?;
        Ok(Self {
            id: profile.id.clone(),
            bio: profile.bio.clone(),
            credentials: profile.credentials.clone(),
            specializations,
            phone: profile.phone.clone(),
            location: profile.location.clone(),
            years_experience: profile.years_experience,
            is_accepting_patients: profile.accepting_patients,
            approval_status: profile.approval_status.as_str().to_string(),
            timezone: profile.timezone.name().to_string(),
            created_at: profile.created_at,
        })
    }
}
