mod requests;
mod responses;
mod utils;

use actix_web::{post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};

use crate::{
    error::ScheduleResult,
    notify::ScheduleEvent,
    protocol::{parties, AppointItem, CounselorItem},
    schedule::{
        booking::{BookingPolicy, BookingRequest},
        lifecycle::AppointmentAction,
        report::split_agenda,
        slots::{resolve_slots, SlotQuery},
        Party, Role,
    },
    utils::{
        authenticate, blocking, format_date, format_time, get_page, names_or_empty, parse_date,
        parse_date_opt, parse_range,
    },
    AppState,
};

use self::{
    requests::*,
    responses::*,
    utils::{counselor_zones, listed_counselor, wall_clock},
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_counselor)
        .service(view_counselor)
        .service(search_slot)
        .service(book)
        .service(cancel_appoint)
        .service(search_appoint);
}

crate::post_funcs! {
    (search_counselor, "/search_counselor", SearchCounselorRequest, SearchCounselorResponse),
    (view_counselor, "/view_counselor", ViewCounselorRequest, ViewCounselorResponse),
    (search_slot, "/search_slot", SearchSlotRequest, SearchSlotResponse),
    (book, "/book", BookRequest, AppointResponse),
    (cancel_appoint, "/cancel_appoint", CancelAppointRequest, AppointResponse),
    (search_appoint, "/search_appoint", SearchAppointRequest, SearchAppointResponse),
}

async fn search_counselor_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchCounselorRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SearchCounselorResponse> {
    let info = info.into_inner();
    authenticate(&state, info.login_token, Role::Client, now).await?;

    let page = get_page(info.first_index, info.limit);
    let specialization = info
        .specialization
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let store = state.store.clone();
    let profiles =
        blocking(move || store.search_counselors(specialization.as_deref(), &page)).await?;

    Ok(SearchCounselorResponse {
        success: true,
        counselors: profiles.into_iter().map(CounselorItem::from).collect(),
        ..Default::default()
    })
}

async fn view_counselor_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewCounselorRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<ViewCounselorResponse> {
    let info = info.into_inner();
    authenticate(&state, info.login_token, Role::Client, now).await?;

    let counselor_id = info.counselor_id;
    let store = state.store.clone();
    let profile = blocking(move || listed_counselor(store.as_ref(), &counselor_id)).await?;

    Ok(ViewCounselorResponse {
        success: true,
        counselor: profile.into(),
        ..Default::default()
    })
}

async fn search_slot_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchSlotRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SearchSlotResponse> {
    let info = info.into_inner();
    authenticate(&state, info.login_token, Role::Client, now).await?;

    let from = parse_date(&info.start_date, "start_date")?;
    let to = parse_date_opt(info.end_date.as_deref(), "end_date")?.unwrap_or(from);
    let query = SlotQuery {
        from,
        to,
        granularity: state.config.slot_length(),
        max_days: state.config.max_range_days,
    };

    let counselor_id = info.counselor_id;
    let store = state.store.clone();
    let (timezone, slots) = blocking(move || {
        let counselor = listed_counselor(store.as_ref(), &counselor_id)?;
        let windows = store.windows(&counselor.id)?;
        let booked = store.appointments(&Party::Counselor(counselor.id.clone()), Some(from), Some(to))?;
        let slots = resolve_slots(&counselor, &windows, &booked, &query, now)?;
        Ok((counselor.timezone, slots))
    })
    .await?;

    Ok(SearchSlotResponse {
        success: true,
        timezone: timezone.name().to_string(),
        slots: slots
            .iter()
            .map(|slot| SlotItem {
                date: format_date(&slot.date),
                start_time: format_time(&slot.range.start),
                end_time: format_time(&slot.range.end),
            })
            .collect(),
        ..Default::default()
    })
}

async fn book_impl(
    state: web::Data<AppState>,
    info: web::Json<BookRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AppointResponse> {
    let info = info.into_inner();
    let client = authenticate(&state, info.login_token, Role::Client, now).await?;

    let request = BookingRequest {
        counselor_id: info.counselor_id,
        client_id: client.user_id,
        date: parse_date(&info.date, "date")?,
        range: parse_range(&info.start_time, &info.end_time)?,
        notes: info
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    };
    let policy = BookingPolicy {
        auto_confirm: state.config.auto_confirm,
        granularity: state.config.slot_length(),
        now,
    };

    let store = state.store.clone();
    let appointment = blocking(move || store.book(&request, &policy)).await?;
    state
        .notifier
        .notify(ScheduleEvent::Booked(appointment.clone()));

    let names = names_or_empty(&state, parties(std::slice::from_ref(&appointment))).await;

    Ok(AppointResponse {
        success: true,
        appointment: AppointItem::new(&appointment, &names),
        ..Default::default()
    })
}

async fn cancel_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<CancelAppointRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<AppointResponse> {
    let info = info.into_inner();
    let client = authenticate(&state, info.login_token, Role::Client, now).await?;

    let appointment_id = info.appointment_id;
    let store = state.store.clone();
    let appointment = blocking(move || {
        store.transition(appointment_id, &client, AppointmentAction::Cancel, now)
    })
    .await?;
    state
        .notifier
        .notify(ScheduleEvent::StatusChanged(appointment.clone()));

    let names = names_or_empty(&state, parties(std::slice::from_ref(&appointment))).await;

    Ok(AppointResponse {
        success: true,
        appointment: AppointItem::new(&appointment, &names),
        ..Default::default()
    })
}

async fn search_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchAppointRequest>,
    now: DateTime<Utc>,
) -> ScheduleResult<SearchAppointResponse> {
    let info = info.into_inner();
    let client = authenticate(&state, info.login_token, Role::Client, now).await?;

    let store = state.store.clone();
    let past_limit = state.config.past_limit;
    let (agenda, names) = blocking(move || {
        let appointments = store.appointments(&Party::Client(client.user_id), None, None)?;
        let zones = counselor_zones(store.as_ref(), &appointments)?;
        let names = store.display_names(&parties(&appointments))?;
        let agenda = split_agenda(appointments, |a| wall_clock(&zones, a, now), past_limit);
        Ok((agenda, names))
    })
    .await?;

    Ok(SearchAppointResponse {
        success: true,
        upcoming: agenda.upcoming.iter().map(|a| AppointItem::new(a, &names)).collect(),
        past: agenda.past.iter().map(|a| AppointItem::new(a, &names)).collect(),
        ..Default::default()
    })
}
