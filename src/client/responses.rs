use serde::Serialize;

use crate::protocol::{AppointItem, CounselorItem};

#[derive(Default, Serialize)]
pub struct SearchCounselorResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub counselors: Vec<CounselorItem>,
}

#[derive(Default, Serialize)]
pub struct ViewCounselorResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub counselor: CounselorItem,
}

#[derive(Default, Serialize)]
pub struct SlotItem {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Default, Serialize)]
pub struct SearchSlotResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub timezone: String,
    pub slots: Vec<SlotItem>,
}

#[derive(Default, Serialize)]
pub struct AppointResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub appointment: AppointItem,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub upcoming: Vec<AppointItem>,
    pub past: Vec<AppointItem>,
}

crate::impl_err_response! {
    SearchCounselorResponse,
    ViewCounselorResponse,
    SearchSlotResponse,
    AppointResponse,
    SearchAppointResponse,
}
