mod requests;
mod responses;

use actix_web::{post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};

use crate::{
    error::ScheduleResult,
    notify::ScheduleEvent,
    protocol::CounselorItem,
    schedule::{ApprovalStatus, Role},
    utils::{authenticate, blocking, get_page},
    AppState,
};

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_profile).service(review_profile);
}

crate::post_funcs! {
    (search_profile, "/search_profile", SearchProfileRequest, SearchProfileResponse),
    (review_profile, "/review_profile", ReviewProfileRequest, ReviewProfileResponse),
}

async fn search_profile_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchProfileRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SearchProfileResponse> {
    let info = info.into_inner();
    authenticate(&state, info.login_token, Role::Admin, now).await?;

    let status = match info.approval_status.as_deref() {
        Some(status) => status.trim().parse::<ApprovalStatus>()?,
        None => ApprovalStatus::Pending,
    };
    let page = get_page(info.first_index, info.limit);
    let store = state.store.clone();
    let profiles = blocking(move || store.profiles_by_status(status, &page)).await?;

    Ok(SearchProfileResponse {
        success: true,
        profiles: profiles.into_iter().map(CounselorItem::from).collect(),
        ..Default::default()
    })
}

async fn review_profile_impl(
    state: web::Data<AppState>,
    info: web::Json<ReviewProfileRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<ReviewProfileResponse> {
    let info = info.into_inner();
    let admin = authenticate(&state, info.login_token, Role::Admin, now).await?;

    let decision = info.approval_status.trim().parse::<ApprovalStatus>()?;
    let counselor_id = info.counselor_id;
    let store = state.store.clone();
    let profile = blocking(move || store.review_profile(&counselor_id, decision)).await?;
    tracing::info!(admin = %admin.user_id, counselor = %profile.id, status = %profile.approval_status, "profile reviewed");
    state.notifier.notify(ScheduleEvent::ProfileReviewed {
        counselor_id: profile.id.clone(),
        status: profile.approval_status,
    });

    Ok(ReviewProfileResponse {
        success: true,
        profile: profile.into(),
        ..Default::default()
    })
}
