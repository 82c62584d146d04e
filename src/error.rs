use actix_web::http::StatusCode;
use thiserror::Error;

/// Failure kinds surfaced to callers.
///
/// Every variant carries a message that can be shown to the user as-is.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("The selected time is no longer available, please pick another slot")]
    SlotUnavailable,
    #[error("Cannot {action} an appointment that is {from}")]
    InvalidTransition { from: String, action: String },
    #[error("{0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

impl ScheduleError {
    pub fn unauthorized<S: ToString>(msg: S) -> Self {
        ScheduleError::Unauthorized(msg.to_string())
    }

    pub fn validation<S: ToString>(msg: S) -> Self {
        ScheduleError::Validation(msg.to_string())
    }

    pub fn not_found<S: ToString>(msg: S) -> Self {
        ScheduleError::NotFound(msg.to_string())
    }

    pub fn storage<S: ToString>(msg: S) -> Self {
        ScheduleError::Storage(msg.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::Unauthorized(_) => "unauthorized",
            ScheduleError::Validation(_) => "validation_error",
            ScheduleError::SlotUnavailable => "slot_unavailable",
            ScheduleError::InvalidTransition { .. } => "invalid_transition",
            ScheduleError::NotFound(_) => "not_found",
            ScheduleError::Storage(_) => "storage_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ScheduleError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ScheduleError::Validation(_) => StatusCode::BAD_REQUEST,
            ScheduleError::SlotUnavailable => StatusCode::CONFLICT,
            ScheduleError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ScheduleError::NotFound(_) => StatusCode::NOT_FOUND,
            ScheduleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<diesel::result::Error> for ScheduleError {
    fn from(err: diesel::result::Error) -> Self {
        ScheduleError::Storage(err.to_string())
    }
}

impl From<r2d2::Error> for ScheduleError {
    fn from(err: r2d2::Error) -> Self {
        ScheduleError::Storage(format!("DB connection: {}", err))
    }
}
