use serde::Serialize;

use crate::protocol::CounselorItem;

#[derive(Default, Serialize)]
pub struct SearchProfileResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub profiles: Vec<CounselorItem>,
}

#[derive(Default, Serialize)]
pub struct ReviewProfileResponse {
    pub success: bool,
    pub err: String,
    pub code: String,
    pub profile: CounselorItem,
}

crate::impl_err_response! {
    SearchProfileResponse,
    ReviewProfileResponse,
}
