use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchProfileRequest {
    pub login_token: String,
    /// One of `pending`, `approved`, `rejected`; defaults to `pending`.
    pub approval_status: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ReviewProfileRequest {
    pub login_token: String,
    pub counselor_id: String,
    pub approval_status: String,
}
