use chrono::NaiveDateTime;
use chrono_tz::Tz;

use super::{ApprovalStatus, CounselorProfile};
use crate::error::{ScheduleError, ScheduleResult};

/// A counselor's submission of their own profile.
#[derive(Debug, Clone)]
pub struct ProfileEdit {
    pub counselor_id: String,
    pub full_name: String,
    pub bio: String,
    pub credentials: String,
    pub specializations: Vec<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i32>,
    pub accepting_patients: bool,
    pub timezone: Tz,
}

pub fn parse_timezone(name: &str) -> ScheduleResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ScheduleError::validation(format!("Unknown timezone '{}'", name)))
}

/// Characters that structure the stored specialization list. Entries and
/// search terms never contain them, so a term can only match inside one entry.
fn is_list_syntax(c: char) -> bool {
    matches!(c, '"' | ',' | '[' | ']' | '\\') || c.is_control()
}

/// Search term for the directory's specialization filter. Blank terms mean
/// no filter.
pub fn specialization_needle(raw: &str) -> Option<String> {
    let needle: String = raw.chars().filter(|c| !is_list_syntax(*c)).collect();
    let needle = needle.trim();
    if needle.is_empty() {
        None
    } else {
        Some(needle.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProfileEdit {
    /// Trims free text, splits comma-joined specializations, drops blank and
    /// repeated ones and rejects incomplete submissions.
    pub fn normalized(mut self) -> ScheduleResult<Self> {
        self.full_name = self.full_name.trim().to_string();
        self.bio = self.bio.trim().to_string();
        self.credentials = self.credentials.trim().to_string();
        if self.full_name.is_empty() {
            return Err(ScheduleError::validation("Full name is required"));
        }
        if self.bio.is_empty() {
            return Err(ScheduleError::validation("Professional bio is required"));
        }
        if let Some(years) = self.years_experience {
            if years < 0 {
                return Err(ScheduleError::validation(
                    "Years of experience cannot be negative",
                ));
            }
        }

        let mut specializations: Vec<String> = Vec::with_capacity(self.specializations.len());
        let entries: Vec<String> = self
            .specializations
            .drain(..)
            .flat_map(|spec| spec.split(',').map(str::to_string).collect::<Vec<_>>())
            .collect();
        for spec in entries {
            let spec: String = spec.chars().filter(|c| !is_list_syntax(*c)).collect();
            let spec = spec.trim().to_string();
            if !spec.is_empty() && !specializations.contains(&spec) {
                specializations.push(spec);
            }
        }
        self.specializations = specializations;
        self.phone = non_empty(self.phone);
        self.location = non_empty(self.location);
        Ok(self)
    }
}

/// Approval status a profile carries after its owner saves it.
///
/// New profiles wait for review, rejected ones are resubmitted, anything
/// else keeps its status.
pub fn status_after_edit(existing: Option<ApprovalStatus>) -> ApprovalStatus {
    match existing {
        None | Some(ApprovalStatus::Rejected) => ApprovalStatus::Pending,
        Some(status) => status,
    }
}

/// Builds the stored profile from an edit on top of what is already stored.
pub fn apply_edit(
    existing: Option<&CounselorProfile>,
    edit: ProfileEdit,
    now: NaiveDateTime,
) -> CounselorProfile {
    CounselorProfile {
        approval_status: status_after_edit(existing.map(|p| p.approval_status)),
        created_at: existing.map_or(now, |p| p.created_at),
        id: edit.counselor_id,
        full_name: edit.full_name,
        bio: edit.bio,
        credentials: edit.credentials,
        specializations: edit.specializations,
        phone: edit.phone,
        location: edit.location,
        years_experience: edit.years_experience,
        accepting_patients: edit.accepting_patients,
        timezone: edit.timezone,
    }
}

/// Admin decision on a profile.
pub fn review(current: ApprovalStatus, decision: ApprovalStatus) -> ScheduleResult<ApprovalStatus> {
    if decision == ApprovalStatus::Pending {
        return Err(ScheduleError::validation(
            "A review must approve or reject the profile",
        ));
    }
    if current == decision {
        return Err(ScheduleError::validation(format!(
            "Profile is already {}",
            current
        )));
    }
    Ok(decision)
}
