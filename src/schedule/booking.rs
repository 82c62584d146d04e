use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::{
    slots::{open_spans, span_slots},
    Appointment, AppointmentStatus, ApprovalStatus, AvailabilityWindow,
    CounselorProfile, TimeRange,
};
use crate::error::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub counselor_id: String,
    pub client_id: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    pub auto_confirm: bool,
    /// Length of every bookable slot.
    pub granularity: Duration,
    pub now: DateTime<Utc>,
}

impl BookingPolicy {
    pub fn initial_status(&self) -> AppointmentStatus {
        if self.auto_confirm {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        }
    }
}

/// Decides whether `request` may be committed against the counselor's
/// current windows and the appointments already on that date.
///
/// Stores call this after locking the counselor, so `booked` is the state the
/// insert will land on.
pub fn check_booking(
    counselor: &CounselorProfile,
    windows: &[AvailabilityWindow],
    booked: &[Appointment],
    request: &BookingRequest,
    policy: &BookingPolicy,
) -> ScheduleResult<()> {
    if counselor.approval_status != ApprovalStatus::Approved {
        return Err(ScheduleError::not_found("No such counselor"));
    }
    if !counselor.accepting_patients {
        return Err(ScheduleError::validation(
            "This counselor is not accepting new clients",
        ));
    }
    if request.client_id == counselor.id {
        return Err(ScheduleError::validation(
            "You cannot book an appointment with yourself",
        ));
    }
    if request.range.start >= request.range.end {
        return Err(ScheduleError::validation(
            "Start time must be earlier than end time",
        ));
    }
    let starts_at = request.date.and_time(request.range.start);
    if starts_at < counselor.local_time(policy.now) {
        return Err(ScheduleError::validation(
            "Appointments cannot be booked in the past",
        ));
    }
    if !counselor.exists_locally(starts_at) {
        return Err(ScheduleError::validation(
            "The selected time does not exist on the counselor's clock",
        ));
    }
    let spans = open_spans(windows, request.date);
    let span = spans
        .iter()
        .find(|span| span.contains(&request.range))
        .ok_or_else(|| {
            ScheduleError::validation("The selected time is outside the counselor's availability")
        })?;
    if !span_slots(span, request.date, policy.granularity).contains(&request.range) {
        return Err(ScheduleError::validation(
            "The selected time is not one of the offered slots",
        ));
    }
    let conflict = booked.iter().any(|a| {
        a.counselor_id == counselor.id
            && a.date == request.date
            && a.status.holds_slot()
            && a.range.overlaps(&request.range)
    });
    if conflict {
        return Err(ScheduleError::SlotUnavailable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{fixtures::*, Recurrence};
    use chrono::Weekday;

    fn monday_windows() -> Vec<AvailabilityWindow> {
        vec![window(1, "c1", Recurrence::Weekly(Weekday::Mon), range((9, 0), (10, 0)))]
    }

    fn request(start: (u32, u32), end: (u32, u32)) -> BookingRequest {
        BookingRequest {
            counselor_id: "c1".to_string(),
            client_id: "u1".to_string(),
            date: monday(),
            range: range(start, end),
            notes: None,
        }
    }

    fn policy() -> BookingPolicy {
        BookingPolicy {
            auto_confirm: false,
            granularity: Duration::minutes(30),
            now: utc(monday(), 6, 0),
        }
    }

    #[test]
    fn slot_inside_free_window_is_accepted() {
        let ok = check_booking(&counselor("c1"), &monday_windows(), &[], &request((9, 0), (9, 30)), &policy());
        assert!(ok.is_ok());
        assert_eq!(policy().initial_status(), AppointmentStatus::Pending);
    }

    #[test]
    fn slot_outside_windows_is_a_validation_error() {
        let err = check_booking(&counselor("c1"), &monday_windows(), &[], &request((10, 0), (10, 30)), &policy())
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");

        let straddling = check_booking(&counselor("c1"), &monday_windows(), &[], &request((9, 45), (10, 15)), &policy())
            .unwrap_err();
        assert_eq!(straddling.code(), "validation_error");
    }

    #[test]
    fn overlap_with_held_appointment_is_slot_unavailable() {
        let booked = vec![appointment(7, "c1", monday(), range((9, 15), (9, 45)), AppointmentStatus::Pending)];
        let err = check_booking(&counselor("c1"), &monday_windows(), &booked, &request((9, 30), (10, 0)), &policy())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::SlotUnavailable));
    }

    #[test]
    fn cancelled_appointment_frees_its_time() {
        let booked = vec![appointment(7, "c1", monday(), range((9, 0), (9, 30)), AppointmentStatus::Cancelled)];
        assert!(check_booking(&counselor("c1"), &monday_windows(), &booked, &request((9, 0), (9, 30)), &policy()).is_ok());
    }

    #[test]
    fn unapproved_counselor_is_not_found() {
        let mut c = counselor("c1");
        c.approval_status = ApprovalStatus::Pending;
        let err = check_booking(&c, &monday_windows(), &[], &request((9, 0), (9, 30)), &policy()).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn closed_counselor_and_self_booking_are_rejected() {
        let mut c = counselor("c1");
        c.accepting_patients = false;
        let err = check_booking(&c, &monday_windows(), &[], &request((9, 0), (9, 30)), &policy()).unwrap_err();
        assert_eq!(err.code(), "validation_error");

        let mut own = request((9, 0), (9, 30));
        own.client_id = "c1".to_string();
        let err = check_booking(&counselor("c1"), &monday_windows(), &[], &own, &policy()).unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn past_slot_is_rejected() {
        let late = BookingPolicy {
            auto_confirm: true,
            now: utc(monday(), 9, 10),
            ..policy()
        };
        let err = check_booking(&counselor("c1"), &monday_windows(), &[], &request((9, 0), (9, 30)), &late).unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(late.initial_status(), AppointmentStatus::Confirmed);
    }

    #[test]
    fn only_whole_slots_can_be_booked() {
        let day = vec![window(1, "c1", Recurrence::Weekly(Weekday::Mon), range((9, 0), (17, 0)))];

        let misaligned = check_booking(&counselor("c1"), &day, &[], &request((9, 10), (9, 40)), &policy()).unwrap_err();
        assert_eq!(misaligned.code(), "validation_error");

        let whole_day = check_booking(&counselor("c1"), &day, &[], &request((10, 0), (17, 0)), &policy()).unwrap_err();
        assert_eq!(whole_day.code(), "validation_error");

        let short = check_booking(&counselor("c1"), &day, &[], &request((9, 0), (9, 15)), &policy()).unwrap_err();
        assert_eq!(short.code(), "validation_error");

        assert!(check_booking(&counselor("c1"), &day, &[], &request((16, 30), (17, 0)), &policy()).is_ok());
    }

    #[test]
    fn slots_step_from_the_merged_span_start() {
        let windows = vec![
            window(1, "c1", Recurrence::Weekly(Weekday::Mon), range((9, 15), (10, 0))),
            window(2, "c1", Recurrence::Once(monday()), range((10, 0), (11, 0))),
        ];
        assert!(check_booking(&counselor("c1"), &windows, &[], &request((9, 45), (10, 15)), &policy()).is_ok());
        assert!(check_booking(&counselor("c1"), &windows, &[], &request((10, 0), (10, 30)), &policy()).is_err());
    }

    #[test]
    fn skipped_wall_clock_time_cannot_be_booked() {
        let mut c = counselor("c1");
        c.timezone = chrono_tz::America::New_York;
        let spring_forward = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let windows = vec![window(1, "c1", Recurrence::Once(spring_forward), range((1, 0), (4, 0)))];
        let at = |start, end| BookingRequest {
            date: spring_forward,
            ..request(start, end)
        };
        let early = BookingPolicy {
            now: utc(spring_forward, 0, 0),
            ..policy()
        };

        let err = check_booking(&c, &windows, &[], &at((2, 0), (2, 30)), &early).unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(check_booking(&c, &windows, &[], &at((3, 0), (3, 30)), &early).is_ok());
    }
}
