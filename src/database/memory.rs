//! Mutex-backed store used by the test suite.
//!
//! The single lock plays the role of the counselor row lock: every method
//! reads and writes under it, so the same rule checks run against a
//! consistent view exactly as they do inside a database transaction.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use super::{check_session_age, hash_token, BookingStore, Page};
use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::{
        availability::{check_new_window, check_toggle, sort_windows},
        booking::{check_booking, BookingPolicy, BookingRequest},
        lifecycle::{next_status, AppointmentAction},
        profile::{apply_edit, review, specialization_needle, ProfileEdit},
        Appointment, ApprovalStatus, AvailabilityWindow, CounselorProfile, Identity, NewWindow,
        Party, Role,
    },
};

#[derive(Default)]
struct State {
    sessions: Vec<(String, String, NaiveDateTime)>,
    users: HashMap<String, (String, Role)>,
    counselors: BTreeMap<String, CounselorProfile>,
    windows: Vec<AvailabilityWindow>,
    appointments: Vec<Appointment>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn counselor(&self, counselor_id: &str) -> ScheduleResult<&CounselorProfile> {
        self.counselors
            .get(counselor_id)
            .ok_or_else(|| ScheduleError::not_found("No such counselor"))
    }

    fn windows_of(&self, counselor_id: &str) -> Vec<AvailabilityWindow> {
        let mut windows: Vec<AvailabilityWindow> = self
            .windows
            .iter()
            .filter(|w| w.counselor_id == counselor_id)
            .cloned()
            .collect();
        sort_windows(&mut windows);
        windows
    }

    fn window_index(&self, counselor_id: &str, window_id: u64) -> ScheduleResult<usize> {
        self.windows
            .iter()
            .position(|w| w.id == window_id && w.counselor_id == counselor_id)
            .ok_or_else(|| ScheduleError::not_found("No such availability window"))
    }
}

fn paged(profiles: Vec<CounselorProfile>, page: &Page) -> Vec<CounselorProfile> {
    profiles
        .into_iter()
        .skip(page.first_index.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    names_down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ScheduleResult<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ScheduleError::storage("store lock poisoned"))
    }

    /// Registers a user the way the identity provider would and returns a
    /// login token for them.
    pub fn add_user(&self, user_id: &str, full_name: &str, role: Role, login_time: NaiveDateTime) -> String {
        let token = format!("token-{}", user_id);
        let mut state = self.state.lock().unwrap();
        state
            .users
            .insert(user_id.to_string(), (full_name.to_string(), role));
        state
            .sessions
            .push((hash_token(&token), user_id.to_string(), login_time));
        token
    }

    /// Stores a counselor profile verbatim, bypassing review.
    pub fn put_counselor(&self, profile: CounselorProfile) {
        let mut state = self.state.lock().unwrap();
        state.counselors.insert(profile.id.clone(), profile);
    }

    pub fn all_appointments(&self) -> Vec<Appointment> {
        self.state.lock().unwrap().appointments.clone()
    }

    /// Makes every later `display_names` call fail with a storage error.
    pub fn break_name_lookup(&self) {
        self.names_down.store(true, Ordering::SeqCst);
    }
}

impl BookingStore for MemoryStore {
    fn identity(&self, token: &str, now: DateTime<Utc>, ttl: Duration) -> ScheduleResult<Identity> {
        let state = self.lock()?;
        let digest = hash_token(token);
        let (_, user_id, login_time) = state
            .sessions
            .iter()
            .filter(|(hash, _, _)| *hash == digest)
            .max_by_key(|(_, _, time)| *time)
            .ok_or_else(|| ScheduleError::unauthorized("You are not logged in"))?;
        check_session_age(*login_time, now, ttl)?;
        let (_, role) = state
            .users
            .get(user_id)
            .ok_or_else(|| ScheduleError::unauthorized("You are not logged in"))?;
        Ok(Identity {
            user_id: user_id.clone(),
            role: *role,
        })
    }

    fn display_names(&self, user_ids: &[String]) -> ScheduleResult<HashMap<String, String>> {
        if self.names_down.load(Ordering::SeqCst) {
            return Err(ScheduleError::storage("profile lookup unavailable"));
        }
        let state = self.lock()?;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|(name, _)| (id.clone(), name.clone())))
            .collect())
    }

    fn counselor(&self, counselor_id: &str) -> ScheduleResult<CounselorProfile> {
        self.lock()?.counselor(counselor_id).map(Clone::clone)
    }

    fn search_counselors(
        &self,
        specialization: Option<&str>,
        page: &Page,
    ) -> ScheduleResult<Vec<CounselorProfile>> {
        let state = self.lock()?;
        let needle = specialization
            .and_then(specialization_needle)
            .map(|n| n.to_lowercase());
        let mut listed: Vec<CounselorProfile> = state
            .counselors
            .values()
            .filter(|p| p.is_listed())
            .filter(|p| match &needle {
                Some(needle) => p
                    .specializations
                    .iter()
                    .any(|s| s.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paged(listed, page))
    }

    fn profiles_by_status(
        &self,
        status: ApprovalStatus,
        page: &Page,
    ) -> ScheduleResult<Vec<CounselorProfile>> {
        let state = self.lock()?;
        let mut matching: Vec<CounselorProfile> = state
            .counselors
            .values()
            .filter(|p| p.approval_status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.created_at);
        Ok(paged(matching, page))
    }

    fn save_profile(&self, edit: ProfileEdit, now: DateTime<Utc>) -> ScheduleResult<CounselorProfile> {
        let mut state = self.lock()?;
        match state.users.get_mut(&edit.counselor_id) {
            Some((name, _)) => *name = edit.full_name.clone(),
            None => return Err(ScheduleError::not_found("No such user")),
        }
        let profile = apply_edit(state.counselors.get(&edit.counselor_id), edit, now.naive_utc());
        state.counselors.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn review_profile(
        &self,
        counselor_id: &str,
        decision: ApprovalStatus,
    ) -> ScheduleResult<CounselorProfile> {
        let mut state = self.lock()?;
        let profile = state
            .counselors
            .get_mut(counselor_id)
            .ok_or_else(|| ScheduleError::not_found("No such counselor"))?;
        profile.approval_status = review(profile.approval_status, decision)?;
        Ok(profile.clone())
    }

    fn windows(&self, counselor_id: &str) -> ScheduleResult<Vec<AvailabilityWindow>> {
        Ok(self.lock()?.windows_of(counselor_id))
    }

    fn add_window(&self, counselor_id: &str, window: NewWindow) -> ScheduleResult<AvailabilityWindow> {
        let mut state = self.lock()?;
        state.counselor(counselor_id)?;
        check_new_window(&state.windows_of(counselor_id), &window)?;
        let created = AvailabilityWindow {
            id: state.next_id(),
            counselor_id: counselor_id.to_string(),
            recurrence: window.recurrence,
            range: window.range,
            active: true,
        };
        state.windows.push(created.clone());
        Ok(created)
    }

    fn set_window_active(
        &self,
        counselor_id: &str,
        window_id: u64,
        active: bool,
    ) -> ScheduleResult<AvailabilityWindow> {
        let mut state = self.lock()?;
        state.counselor(counselor_id)?;
        let index = state.window_index(counselor_id, window_id)?;
        check_toggle(&state.windows_of(counselor_id), &state.windows[index], active)?;
        state.windows[index].active = active;
        Ok(state.windows[index].clone())
    }

    fn delete_window(&self, counselor_id: &str, window_id: u64) -> ScheduleResult<()> {
        let mut state = self.lock()?;
        state.counselor(counselor_id)?;
        let index = state.window_index(counselor_id, window_id)?;
        state.windows.remove(index);
        Ok(())
    }

    fn appointments(
        &self,
        party: &Party,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ScheduleResult<Vec<Appointment>> {
        let state = self.lock()?;
        let mut found: Vec<Appointment> = state
            .appointments
            .iter()
            .filter(|a| match party {
                Party::Counselor(id) => a.counselor_id == *id,
                Party::Client(id) => a.client_id == *id,
            })
            .filter(|a| from.map_or(true, |from| a.date >= from))
            .filter(|a| to.map_or(true, |to| a.date <= to))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.date, a.range.start, a.id));
        Ok(found)
    }

    fn book(&self, request: &BookingRequest, policy: &BookingPolicy) -> ScheduleResult<Appointment> {
        let mut state = self.lock()?;
        let counselor = state.counselor(&request.counselor_id)?.clone();
        let windows = state.windows_of(&request.counselor_id);
        check_booking(&counselor, &windows, &state.appointments, request, policy)?;

        let stamp = policy.now.naive_utc();
        let appointment = Appointment {
            id: state.next_id(),
            counselor_id: request.counselor_id.clone(),
            client_id: request.client_id.clone(),
            date: request.date,
            range: request.range,
            status: policy.initial_status(),
            notes: request.notes.clone(),
            created_at: stamp,
            updated_at: stamp,
        };
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    fn transition(
        &self,
        appointment_id: u64,
        actor: &Identity,
        action: AppointmentAction,
        now: DateTime<Utc>,
    ) -> ScheduleResult<Appointment> {
        let mut state = self.lock()?;
        let appointment = state
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| ScheduleError::not_found("No such appointment"))?;
        appointment.status = next_status(appointment, actor, action)?;
        appointment.updated_at = now.naive_utc();
        Ok(appointment.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    use chrono::Weekday;
    use proptest::prelude::*;

    use super::*;
    use crate::schedule::{
        fixtures::*,
        slots::{resolve_slots, SlotQuery},
        AppointmentStatus, Recurrence, TimeRange,
    };

    fn store_with_monday_hour() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_counselor(counselor("c1"));
        store
            .add_window(
                "c1",
                NewWindow {
                    recurrence: Recurrence::Weekly(Weekday::Mon),
                    range: range((9, 0), (10, 0)),
                },
            )
            .unwrap();
        store
    }

    fn booking(client: &str, r: TimeRange) -> BookingRequest {
        BookingRequest {
            counselor_id: "c1".to_string(),
            client_id: client.to_string(),
            date: monday(),
            range: r,
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
    fn monday_scenario_end_to_end() {
        let store = store_with_monday_hour();
        let query = SlotQuery {
            from: monday(),
            to: monday(),
            granularity: Duration::minutes(30),
            max_days: 31,
        };
        let counselor = store.counselor("c1").unwrap();
        let windows = store.windows("c1").unwrap();
        let booked = store.appointments(&Party::Counselor("c1".to_string()), Some(monday()), Some(monday())).unwrap();
        let slots = resolve_slots(&counselor, &windows, &booked, &query, policy().now).unwrap();
        assert_eq!(
            slots.iter().map(|s| s.range.start).collect::<Vec<_>>(),
            vec![time(9, 0), time(9, 30)]
        );

        let first = store.book(&booking("u1", range((9, 0), (9, 30))), &policy()).unwrap();
        assert_eq!(first.status, AppointmentStatus::Pending);

        let second = store.book(&booking("u2", range((9, 0), (9, 30))), &policy()).unwrap_err();
        assert!(matches!(second, ScheduleError::SlotUnavailable));
    }

    #[test]
    fn concurrent_bookings_for_one_slot_admit_exactly_one() {
        let store = Arc::new(store_with_monday_hour());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.book(&booking(&format!("u{}", i), range((9, 0), (9, 30))), &policy())
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ScheduleError::SlotUnavailable)));
    }

    #[test]
    fn cancelled_booking_frees_the_slot() {
        let store = store_with_monday_hour();
        let first = store.book(&booking("u1", range((9, 0), (9, 30))), &policy()).unwrap();
        let client = Identity {
            user_id: "u1".to_string(),
            role: Role::Client,
        };
        store
            .transition(first.id, &client, AppointmentAction::Cancel, policy().now)
            .unwrap();

        assert!(store.book(&booking("u2", range((9, 0), (9, 30))), &policy()).is_ok());
    }

    #[test]
    fn completed_appointment_cannot_be_cancelled() {
        let store = store_with_monday_hour();
        let appt = store.book(&booking("u1", range((9, 0), (9, 30))), &policy()).unwrap();
        let counselor = Identity {
            user_id: "c1".to_string(),
            role: Role::Counselor,
        };
        store.transition(appt.id, &counselor, AppointmentAction::Confirm, policy().now).unwrap();
        store.transition(appt.id, &counselor, AppointmentAction::Complete, policy().now).unwrap();

        let err = store
            .transition(appt.id, &counselor, AppointmentAction::Cancel, policy().now)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTransition { .. }));
        assert_eq!(
            store.all_appointments()[0].status,
            AppointmentStatus::Completed
        );
    }

    #[test]
    fn deactivated_window_blocks_booking() {
        let store = store_with_monday_hour();
        let window = store.windows("c1").unwrap().remove(0);
        store.set_window_active("c1", window.id, false).unwrap();

        let err = store.book(&booking("u1", range((9, 0), (9, 30))), &policy()).unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn windows_of_other_counselors_are_not_found() {
        let store = store_with_monday_hour();
        store.put_counselor(counselor("c2"));
        let window = store.windows("c1").unwrap().remove(0);

        assert_eq!(store.delete_window("c2", window.id).unwrap_err().code(), "not_found");
        assert!(store.delete_window("c1", window.id).is_ok());
        assert!(store.windows("c1").unwrap().is_empty());
    }

    #[test]
    fn expired_or_unknown_tokens_are_unauthorized() {
        let store = MemoryStore::new();
        let login = monday().and_time(time(8, 0));
        let token = store.add_user("u1", "Sam", Role::Client, login);

        let who = store.identity(&token, utc(monday(), 8, 30), Duration::hours(1)).unwrap();
        assert_eq!(who.role, Role::Client);
        assert_eq!(
            store.identity(&token, utc(monday(), 10, 0), Duration::hours(1)).unwrap_err().code(),
            "unauthorized"
        );
        assert_eq!(
            store.identity("nope", utc(monday(), 8, 30), Duration::hours(1)).unwrap_err().code(),
            "unauthorized"
        );
    }

    #[test]
    fn specialization_filter_stays_inside_one_entry() {
        let store = MemoryStore::new();
        let mut grief = counselor("c1");
        grief.specializations = vec!["Grief".to_string(), "Trauma".to_string()];
        store.put_counselor(grief);
        store.put_counselor(counselor("c2"));
        let page = Page { first_index: 0, limit: 30 };

        assert_eq!(store.search_counselors(Some(","), &page).unwrap().len(), 2);
        assert_eq!(store.search_counselors(Some("  "), &page).unwrap().len(), 2);
        assert!(store.search_counselors(Some("Grief\",\"Trauma"), &page).unwrap().is_empty());
        let found = store.search_counselors(Some("\"trauma\""), &page).unwrap();
        assert_eq!(found.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["c1"]);
    }

    #[test]
    fn off_grid_requests_leave_the_slots_free() {
        let store = MemoryStore::new();
        store.put_counselor(counselor("c1"));
        store
            .add_window(
                "c1",
                NewWindow {
                    recurrence: Recurrence::Weekly(Weekday::Mon),
                    range: range((9, 0), (17, 0)),
                },
            )
            .unwrap();

        let misaligned = store.book(&booking("u1", range((9, 10), (9, 40))), &policy()).unwrap_err();
        assert_eq!(misaligned.code(), "validation_error");
        let afternoon = store.book(&booking("u2", range((10, 0), (17, 0))), &policy()).unwrap_err();
        assert_eq!(afternoon.code(), "validation_error");
        assert!(store.all_appointments().is_empty());

        let query = SlotQuery {
            from: monday(),
            to: monday(),
            granularity: Duration::minutes(30),
            max_days: 31,
        };
        let counselor = store.counselor("c1").unwrap();
        let windows = store.windows("c1").unwrap();
        let slots = resolve_slots(&counselor, &windows, &[], &query, policy().now).unwrap();
        assert_eq!(slots.len(), 16);
        assert!(store.book(&booking("u3", range((9, 0), (9, 30))), &policy()).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn held_appointments_never_overlap(
            requests in proptest::collection::vec((0u32..32, 0usize..3, 0usize..3), 1..40)
        ) {
            let store = MemoryStore::new();
            store.put_counselor(counselor("c1"));
            store.add_window("c1", NewWindow {
                recurrence: Recurrence::Weekly(Weekday::Mon),
                range: range((9, 0), (17, 0)),
            }).unwrap();
            let counselor_actor = Identity { user_id: "c1".to_string(), role: Role::Counselor };

            for (i, (offset, length, action)) in requests.into_iter().enumerate() {
                // mixed slot lengths so grids of different sizes compete for the same time
                let minutes = [15u32, 30, 60][length];
                let start = 9 * 60 + offset * 15;
                let end = start + minutes;
                if end > 17 * 60 {
                    continue;
                }
                let r = range((start / 60, start % 60), (end / 60, end % 60));
                let policy = BookingPolicy {
                    granularity: Duration::minutes(i64::from(minutes)),
                    ..policy()
                };
                if let Ok(appt) = store.book(&booking(&format!("u{}", i), r), &policy) {
                    // sprinkle in cancellations so freed time gets reused
                    if action == 0 {
                        store.transition(appt.id, &counselor_actor, AppointmentAction::Cancel, policy.now).unwrap();
                    }
                }
            }

            let held: Vec<Appointment> = store
                .all_appointments()
                .into_iter()
                .filter(|a| a.status.holds_slot())
                .collect();
            for (i, a) in held.iter().enumerate() {
                for b in &held[i + 1..] {
                    prop_assert!(!(a.date == b.date && a.range.overlaps(&b.range)));
                }
            }
        }
    }
}
