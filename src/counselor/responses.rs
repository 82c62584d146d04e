use serde::Serialize;

use crate::protocol::{AppointItem, CounselorItem};

#[derive(Default, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub profile: CounselorItem,
}

#[derive(Default, Serialize)]
pub struct AvailabilityItem {
    pub availability_id: u64,
    pub day_of_week: Option<i32>,
    pub specific_date: String,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

#[derive(Default, Serialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub availability: AvailabilityItem,
}

#[derive(Default, Serialize)]
pub struct SearchAvailabilityResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub availability: Vec<AvailabilityItem>,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub upcoming: Vec<AppointItem>,
    pub past: Vec<AppointItem>,
}

#[derive(Default, Serialize)]
pub struct AppointResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub appointment: AppointItem,
}

#[derive(Default, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub approval_status: String,
    pub today: Vec<AppointItem>,
    pub upcoming_count: usize,
    pub next_appointments: Vec<AppointItem>,
    pub active_windows: usize,
}

crate::impl_err_response! {
    ProfileResponse,
    AvailabilityResponse,
    SearchAvailabilityResponse,
    SearchAppointResponse,
    AppointResponse,
    DashboardResponse,
}
