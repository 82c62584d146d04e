mod requests;
mod responses;
mod utils;

use actix_web::{post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};

use crate::{
    error::ScheduleResult,
    notify::ScheduleEvent,
    protocol::{parties, AppointItem, SimpleResponse},
    schedule::{
        lifecycle::AppointmentAction,
        profile::{parse_timezone, ProfileEdit},
        report::{dashboard, split_agenda},
        Appointment, Identity, NewWindow, Party, Role,
    },
    utils::{authenticate, blocking, names_or_empty, parse_date_opt, parse_range},
    AppState,
};

use self::{
    requests::*,
    responses::*,
    utils::{availability_item, get_recurrence},
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_profile)
        .service(modify_profile)
        .service(add_availability)
        .service(toggle_availability)
        .service(delete_availability)
        .service(search_availability)
        .service(search_appoint)
        .service(confirm_appoint)
        .service(complete_appoint)
        .service(cancel_appoint)
        .service(dashboard_summary);
}

crate::post_funcs! {
    (view_profile, "/view_profile", ViewProfileRequest, ProfileResponse),
    (modify_profile, "/modify_profile", ModifyProfileRequest, ProfileResponse),
    (add_availability, "/add_availability", AddAvailabilityRequest, AvailabilityResponse),
    (toggle_availability, "/toggle_availability", ToggleAvailabilityRequest, AvailabilityResponse),
    (delete_availability, "/delete_availability", DeleteAvailabilityRequest, SimpleResponse),
    (search_availability, "/search_availability", SearchAvailabilityRequest, SearchAvailabilityResponse),
    (search_appoint, "/search_appoint", SearchAppointRequest, SearchAppointResponse),
    (confirm_appoint, "/confirm_appoint", AppointActionRequest, AppointResponse),
    (complete_appoint, "/complete_appoint", AppointActionRequest, AppointResponse),
    (cancel_appoint, "/cancel_appoint", AppointActionRequest, AppointResponse),
    (dashboard_summary, "/dashboard", DashboardRequest, DashboardResponse),
}

async fn view_profile_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewProfileRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<ProfileResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let store = state.store.clone();
    let profile = blocking(move || store.counselor(&counselor.user_id)).await?;

    Ok(ProfileResponse {
        success: true,
        profile: profile.into(),
        ..Default::default()
    })
}

async fn modify_profile_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyProfileRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<ProfileResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let edit = ProfileEdit {
        counselor_id: counselor.user_id,
        full_name: info.full_name,
        bio: info.bio,
        credentials: info.credentials,
        specializations: info.specializations,
        phone: info.phone,
        location: info.location,
        years_experience: info.years_experience,
        accepting_patients: info.accepting_patients,
        timezone: parse_timezone(info.timezone.trim())?,
    }
    .normalized()?;

    let store = state.store.clone();
    let profile = blocking(move || store.save_profile(edit, now)).await?;
    state.notifier.notify(ScheduleEvent::ProfileSaved {
        counselor_id: profile.id.clone(),
        status: profile.approval_status,
    });

    Ok(ProfileResponse {
        success: true,
        profile: profile.into(),
        ..Default::default()
    })
}

async fn add_availability_impl(
    state: web::Data<AppState>,
    info: web::Json<AddAvailabilityRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AvailabilityResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let window = NewWindow {
        recurrence: get_recurrence(info.day_of_week, info.specific_date.as_deref())?,
        range: parse_range(&info.start_time, &info.end_time)?,
    };

    let store = state.store.clone();
    let counselor_id = counselor.user_id.clone();
    let window = blocking(move || store.add_window(&counselor_id, window)).await?;
    state.notifier.notify(ScheduleEvent::AvailabilityChanged {
        counselor_id: counselor.user_id,
    });

    Ok(AvailabilityResponse {
        success: true,
        availability: availability_item(&window),
        ..Default::default()
    })
}

async fn toggle_availability_impl(
    state: web::Data<AppState>,
    info: web::Json<ToggleAvailabilityRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AvailabilityResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let (window_id, active) = (info.availability_id, info.is_active);
    let store = state.store.clone();
    let counselor_id = counselor.user_id.clone();
    let window = blocking(move || store.set_window_active(&counselor_id, window_id, active)).await?;
    state.notifier.notify(ScheduleEvent::AvailabilityChanged {
        counselor_id: counselor.user_id,
    });

    Ok(AvailabilityResponse {
        success: true,
        availability: availability_item(&window),
        ..Default::default()
    })
}

async fn delete_availability_impl(
    state: web::Data<AppState>,
    info: web::Json<DeleteAvailabilityRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SimpleResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let window_id = info.availability_id;
    let store = state.store.clone();
    let counselor_id = counselor.user_id.clone();
    blocking(move || store.delete_window(&counselor_id, window_id)).await?;
    state.notifier.notify(ScheduleEvent::AvailabilityChanged {
        counselor_id: counselor.user_id,
    });

    Ok(SimpleResponse::ok())
}

async fn search_availability_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchAvailabilityRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SearchAvailabilityResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let store = state.store.clone();
    let windows = blocking(move || store.windows(&counselor.user_id)).await?;

    Ok(SearchAvailabilityResponse {
        success: true,
        availability: windows.iter().map(availability_item).collect(),
        ..Default::default()
    })
}

async fn search_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchAppointRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SearchAppointResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let from = parse_date_opt(info.start_date.as_deref(), "start_date")?;
    let to = parse_date_opt(info.end_date.as_deref(), "end_date")?;
    let store = state.store.clone();
    let past_limit = state.config.past_limit;
    let (agenda, names) = blocking(move || {
        let profile = store.counselor(&counselor.user_id)?;
        let appointments = store.appointments(&Party::Counselor(profile.id.clone()), from, to)?;
        let names = store.display_names(&parties(&appointments))?;
        let local_now = profile.local_time(now);
        Ok((split_agenda(appointments, |_| local_now, past_limit), names))
    })
    .await?;

    Ok(SearchAppointResponse {
        success: true,
        upcoming: agenda.upcoming.iter().map(|a| AppointItem::new(a, &names)).collect(),
        past: agenda.past.iter().map(|a| AppointItem::new(a, &names)).collect(),
        ..Default::default()
    })
}

async fn change_status(
    state: &web::Data<AppState>,
    counselor: Identity,
    appointment_id: u64,
    action: AppointmentAction,
    now: DateTime<Utc>,
) -> ScheduleResult<AppointResponse> {
    let store = state.store.clone();
    let appointment = blocking(move || store.transition(appointment_id, &counselor, action, now)).await?;
    state
        .notifier
        .notify(ScheduleEvent::StatusChanged(appointment.clone()));

    let names = names_or_empty(state, parties(std::slice::from_ref(&appointment))).await;
    Ok(AppointResponse {
        success: true,
        appointment: AppointItem::new(&appointment, &names),
        ..Default::default()
    })
}

async fn confirm_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<AppointActionRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AppointResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;
    change_status(&state, counselor, info.appointment_id, AppointmentAction::Confirm, now).await
}

async fn complete_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<AppointActionRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AppointResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;
    change_status(&state, counselor, info.appointment_id, AppointmentAction::Complete, now).await
}

async fn cancel_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<AppointActionRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AppointResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;
    change_status(&state, counselor, info.appointment_id, AppointmentAction::Cancel, now).await
}

async fn dashboard_summary_impl(
    state: web::Data<AppState>,
    info: web::Json<DashboardRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<DashboardResponse> {
    let info = info.into_inner();
    let counselor = authenticate(&state, info.login_token, Role::Counselor, now).await?;

    let store = state.store.clone();
    let (summary, names) = blocking(move || {
        let profile = store.counselor(&counselor.user_id)?;
        let today = profile.local_time(now).date();
        let appointments = store.appointments(&Party::Counselor(profile.id.clone()), Some(today), None)?;
        let windows = store.windows(&profile.id)?;
        let summary = dashboard(&profile, &appointments, &windows, now);
        let shown: Vec<Appointment> = summary.today.iter().chain(&summary.next_open).cloned().collect();
        let names = store.display_names(&parties(&shown))?;
        Ok((summary, names))
    })
    .await?;

    Ok(DashboardResponse {
        success: true,
        approval_status: summary.approval_status.to_string(),
        today: summary.today.iter().map(|a| AppointItem::new(a, &names)).collect(),
        upcoming_count: summary.upcoming_open,
        next_appointments: summary.next_open.iter().map(|a| AppointItem::new(a, &names)).collect(),
        active_windows: summary.active_windows,
        ..Default::default()
    })
}
