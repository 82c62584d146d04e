use super::{Appointment, AppointmentStatus, Identity, Role};
use crate::error::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Complete,
    Cancel,
}

impl AppointmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "confirm",
            AppointmentAction::Complete => "complete",
            AppointmentAction::Cancel => "cancel",
        }
    }
}

/// Next status of `appointment` when `actor` performs `action`.
///
/// Confirming and completing belong to the appointment's counselor; either
/// party may cancel. Completed and cancelled are terminal.
pub fn next_status(
    appointment: &Appointment,
    actor: &Identity,
    action: AppointmentAction,
) -> ScheduleResult<AppointmentStatus> {
    let is_counselor =
        actor.role == Role::Counselor && actor.user_id == appointment.counselor_id;
    let is_client = actor.user_id == appointment.client_id;

    let allowed = match action {
        AppointmentAction::Confirm | AppointmentAction::Complete => is_counselor,
        AppointmentAction::Cancel => is_counselor || is_client,
    };
    if !allowed {
        return Err(ScheduleError::unauthorized(format!(
            "You are not allowed to {} this appointment",
            action.as_str()
        )));
    }

    use AppointmentAction::*;
    use AppointmentStatus::*;
    match (appointment.status, action) {
        (Pending, Confirm) => Ok(Confirmed),
        (Confirmed, Complete) => Ok(Completed),
        (Pending, Cancel) | (Confirmed, Cancel) => Ok(Cancelled),
        (from, action) => Err(ScheduleError::InvalidTransition {
            from: from.to_string(),
            action: action.as_str().to_string(),
        }),
    }
}
