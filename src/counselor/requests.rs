use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Deserialize)]
pub struct ViewProfileRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct ModifyProfileRequest {
    pub login_token: String,
    pub full_name: String,
    pub bio: String,
    #[serde(default)]
    pub credentials: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i32>,
    #[serde(default = "default_true")]
    pub accepting_patients: bool,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Exactly one of `day_of_week` (0 is Sunday) and `specific_date`.
#[derive(Deserialize)]
pub struct AddAvailabilityRequest {
    pub login_token: String,
    pub day_of_week: Option<i32>,
    pub specific_date: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Deserialize)]
pub struct ToggleAvailabilityRequest {
    pub login_token: String,
    pub availability_id: u64,
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct DeleteAvailabilityRequest {
    pub login_token: String,
    pub availability_id: u64,
}

#[derive(Deserialize)]
pub struct SearchAvailabilityRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    pub login_token: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct AppointActionRequest {
    pub login_token: String,
    pub appointment_id: u64,
}

#[derive(Deserialize)]
pub struct DashboardRequest {
    pub login_token: String,
}
