#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    state: web::Data<AppState>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    let now = (state.clock)();
                    match [<$func_name _impl>](state, info, now).await {
                        Ok(response) => HttpResponse::Ok().json(response),
                        Err(err) => {
                            $crate::utils::log_failure(stringify!($func_name), &err);
                            HttpResponse::build(err.status_code()).json($response::err(&err))
                        }
                    }
                }
            }
        )+
    };
}

use std::collections::HashMap;

use actix_web::{error::BlockingError, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{debug, error, warn};

use crate::{
    database::Page,
    error::{ScheduleError, ScheduleResult},
    schedule::{Identity, Role, TimeRange},
    AppState,
};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

pub fn log_failure(handler: &str, err: &ScheduleError) {
    match err {
        ScheduleError::Storage(_) => error!(handler, error = %err, "request failed"),
        _ => debug!(handler, code = err.code(), error = %err, "request rejected"),
    }
}

/// Runs store work on the blocking pool.
pub async fn blocking<F, T>(f: F) -> ScheduleResult<T>
where
    F: FnOnce() -> ScheduleResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f).await.map_err(|err| match err {
        BlockingError::Error(err) => err,
        BlockingError::Canceled => ScheduleError::storage("blocking task was canceled"),
    })
}

/// Resolves the login token and checks that its owner has `role`.
pub async fn authenticate(
    state: &web::Data<AppState>,
    token: String,
    role: Role,
    now: DateTime<Utc>,
) -> ScheduleResult<Identity> {
    let store = state.store.clone();
    let ttl = state.config.session_ttl();
    let identity = blocking(move || store.identity(&token, now, ttl)).await?;
    identity.require(role)?;
    Ok(identity)
}

/// Display names for `ids`, looked up after a change has committed. A failed
/// lookup only costs the names, so the request still succeeds.
pub async fn names_or_empty(state: &web::Data<AppState>, ids: Vec<String>) -> HashMap<String, String> {
    let store = state.store.clone();
    match blocking(move || store.display_names(&ids)).await {
        Ok(names) => names,
        Err(err) => {
            warn!(error = %err, "display name lookup failed");
            HashMap::new()
        }
    }
}

pub fn parse_date(s: &str, field: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT)
        .map_err(|_| ScheduleError::validation(format!("Wrong format on '{}'", field)))
}

pub fn parse_date_opt(s: Option<&str>, field: &str) -> ScheduleResult<Option<NaiveDate>> {
    s.map(|s| parse_date(s, field)).transpose()
}

pub fn parse_time(s: &str, field: &str) -> ScheduleResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| ScheduleError::validation(format!("Wrong format on '{}'", field)))
}

pub fn parse_range(start: &str, end: &str) -> ScheduleResult<TimeRange> {
    TimeRange::new(parse_time(start, "start_time")?, parse_time(end, "end_time")?)
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FMT).to_string()
}

pub fn get_page(first_index: Option<i64>, limit: Option<i64>) -> Page {
    Page {
        first_index: first_index.unwrap_or(0).max(0),
        limit: limit.unwrap_or(30).max(0),
    }
}

pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    let escaped = s
        .as_ref()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) => get_str_pattern(s),
        None => "%".to_string(),
    }
}
