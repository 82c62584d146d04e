use crate::{
    error::{ScheduleError, ScheduleResult},
    models::availability::{weekday_from_number, weekday_to_number},
    schedule::{AvailabilityWindow, Recurrence},
    utils::{format_date, format_time, parse_date},
};

use super::responses::AvailabilityItem;

pub fn get_recurrence(day_of_week: Option<i32>, specific_date: Option<&str>) -> ScheduleResult<Recurrence> {
    match (day_of_week, specific_date) {
        (Some(day), None) => weekday_from_number(day)
            .map(Recurrence::Weekly)
            .ok_or_else(|| ScheduleError::validation("Wrong value on 'day_of_week'")),
        (None, Some(date)) => parse_date(date, "specific_date").map(Recurrence::Once),
        _ => Err(ScheduleError::validation(
            "Give either 'day_of_week' or 'specific_date'",
        )),
    }
}

pub fn availability_item(window: &AvailabilityWindow) -> AvailabilityItem {
    let (day_of_week, specific_date) = match window.recurrence {
        Recurrence::Weekly(day) => (Some(weekday_to_number(day)), String::new()),
        Recurrence::Once(date) => (None, format_date(&date)),
    };
    AvailabilityItem {
        availability_id: window.id,
        day_of_week,
        specific_date,
        start_time: format_time(&window.range.start),
        end_time: format_time(&window.range.end),
        is_active: window.active,
    }
}
