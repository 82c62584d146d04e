use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::{AvailabilityWindow, Recurrence, TimeRange},
    schema::counselor_availability,
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use std::convert::TryFrom;

#[derive(Queryable)]
pub struct WindowData {
    pub id: u64,
    pub counselor_id: String,
    pub day_of_week: Option<i32>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

#[derive(Insertable)]
#[table_name = "counselor_availability"]
pub struct NewWindowData {
    pub counselor_id: String,
    pub day_of_week: Option<i32>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

/// Stored day numbers count from Sunday = 0.
pub fn weekday_from_number(day: i32) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn weekday_to_number(day: Weekday) -> i32 {
    day.num_days_from_sunday() as i32
}

impl TryFrom<WindowData> for AvailabilityWindow {
    type Error = ScheduleError;

    fn try_from(data: WindowData) -> ScheduleResult<Self> {
        let recurrence = match (data.day_of_week, data.specific_date) {
            (Some(day), None) => Recurrence::Weekly(weekday_from_number(day).ok_or_else(|| {
                ScheduleError::storage(format!("window {} has day_of_week {}", data.id, day))
            })?),
            (None, Some(date)) => Recurrence::Once(date),
            _ => {
                return Err(ScheduleError::storage(format!(
                    "window {} must have exactly one of day_of_week and specific_date",
                    data.id
                )))
            }
        };
        let range = TimeRange::new(data.start_time, data.end_time)
            .map_err(|_| ScheduleError::storage(format!("window {} has an empty range", data.id)))?;

        Ok(AvailabilityWindow {
            id: data.id,
            counselor_id: data.counselor_id,
            recurrence,
            range,
            active: data.is_active,
        })
    }
}

impl NewWindowData {
    pub fn new(counselor_id: String, recurrence: Recurrence, range: TimeRange) -> Self {
        let (day_of_week, specific_date) = match recurrence {
            Recurrence::Weekly(day) => (Some(weekday_to_number(day)), None),
            Recurrence::Once(date) => (None, Some(date)),
        };
        Self {
            counselor_id,
            day_of_week,
            specific_date,
            start_time: range.start,
            end_time: range.end,
            is_active: true,
        }
    }
}
