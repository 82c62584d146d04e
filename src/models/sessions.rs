use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct SessionData {
    pub token_hash: String,
    pub user_id: String,
    pub login_time: NaiveDateTime,
}
