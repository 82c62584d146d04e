use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchCounselorRequest {
    pub login_token: String,
    pub specialization: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ViewCounselorRequest {
    pub login_token: String,
    pub counselor_id: String,
}

#[derive(Deserialize)]
pub struct SearchSlotRequest {
    pub login_token: String,
    pub counselor_id: String,
    pub start_date: String,
    /// Defaults to `start_date`.
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub login_token: String,
    pub counselor_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelAppointRequest {
    pub login_token: String,
    pub appointment_id: u64,
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    pub login_token: String,
}
