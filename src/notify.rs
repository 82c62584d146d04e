use tracing::info;

use crate::schedule::{Appointment, ApprovalStatus};

/// Something other parts of the platform may want to react to, such as
/// refreshing cached pages or messaging the other party.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleEvent {
    Booked(Appointment),
    StatusChanged(Appointment),
    ProfileSaved {
        counselor_id: String,
        status: ApprovalStatus,
    },
    ProfileReviewed {
        counselor_id: String,
        status: ApprovalStatus,
    },
    AvailabilityChanged {
        counselor_id: String,
    },
}

/// Receives events after their change is committed. Delivery is best effort
/// and must not fail the request.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: ScheduleEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: ScheduleEvent) {
        match event {
            ScheduleEvent::Booked(appt) => info!(
                appointment = appt.id,
                counselor = %appt.counselor_id,
                client = %appt.client_id,
                date = %appt.date,
                start = %appt.range.start,
                status = %appt.status,
                "appointment booked"
            ),
            ScheduleEvent::StatusChanged(appt) => info!(
                appointment = appt.id,
                counselor = %appt.counselor_id,
                status = %appt.status,
                "appointment status changed"
            ),
            ScheduleEvent::ProfileSaved {
                counselor_id,
                status,
            } => info!(counselor = %counselor_id, %status, "counselor profile saved"),
            ScheduleEvent::ProfileReviewed {
                counselor_id,
                status,
            } => info!(counselor = %counselor_id, %status, "counselor profile reviewed"),
            ScheduleEvent::AvailabilityChanged { counselor_id } => {
                info!(counselor = %counselor_id, "availability changed")
            }
        }
    }
}
