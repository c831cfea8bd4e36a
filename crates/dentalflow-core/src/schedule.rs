//! Appointment scheduling: day views, time ordering and display.

use chrono::{NaiveDate, TimeZone};

use crate::models::{local_date, Appointment};
use crate::validation::is_valid_time;

/// Appointments on `day` in time zone `tz`, ignoring time of day.
pub fn for_day<Tz: TimeZone>(appointments: &[Appointment], day: NaiveDate, tz: &Tz) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| local_date(&a.date, tz) == Some(day))
        .cloned()
        .collect()
}

/// Order by "HH:MM". Zero-padded 24-hour strings sort chronologically.
pub fn sort_by_time(appointments: &[Appointment]) -> Vec<Appointment> {
    let mut sorted = appointments.to_vec();
    sorted.sort_by(|a, b| a.time.cmp(&b.time));
    sorted
}

/// The day's appointments in time order.
pub fn daily_schedule<Tz: TimeZone>(
    appointments: &[Appointment],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<Appointment> {
    sort_by_time(&for_day(appointments, day, tz))
}

/// Number of appointments on `day`.
pub fn count_for_day<Tz: TimeZone>(appointments: &[Appointment], day: NaiveDate, tz: &Tz) -> usize {
    appointments
        .iter()
        .filter(|a| local_date(&a.date, tz) == Some(day))
        .count()
}

/// "14:00" -> "2:00 PM", "00:15" -> "12:15 AM".
///
/// Input that is not "H:MM"/"HH:MM" is returned unchanged.
pub fn format_display_time(time: &str) -> String {
    if !is_valid_time(time) {
        return time.to_string();
    }
    let Some((hour, minute)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(hour) = hour.parse::<u32>() else {
        return time.to_string();
    };

    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{} {}", display_hour, minute, suffix)
}

/// Newest appointments go first.
pub fn add(appointments: &[Appointment], appointment: Appointment) -> Vec<Appointment> {
    let mut updated = Vec::with_capacity(appointments.len() + 1);
    updated.push(appointment);
    updated.extend(appointments.iter().cloned());
    updated
}

/// Replace the appointment with the same id. `None` if there is none.
pub fn update(appointments: &[Appointment], appointment: Appointment) -> Option<Vec<Appointment>> {
    let position = appointments.iter().position(|a| a.id == appointment.id)?;
    let mut updated = appointments.to_vec();
    updated[position] = appointment;
    Some(updated)
}

pub fn remove(appointments: &[Appointment], id: &str) -> Vec<Appointment> {
    appointments.iter().filter(|a| a.id != id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appt(id: &str, date: &str, time: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_id: "1".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            reason: "Check-up".to_string(),
        }
    }

    fn june_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_sort_by_time() {
        let list = vec![
            appt("a", "2024-06-10", "14:00"),
            appt("b", "2024-06-10", "09:05"),
        ];
        let times: Vec<_> = sort_by_time(&list).into_iter().map(|a| a.time).collect();
        assert_eq!(times, vec!["09:05", "14:00"]);
    }

    #[test]
    fn test_for_day_ignores_time_of_day() {
        let list = vec![
            appt("a", "2024-06-10T18:30:00Z", "10:00"),
            appt("b", "2024-06-10", "11:00"),
            appt("c", "2024-06-11T00:00:00Z", "09:00"),
        ];
        let ids: Vec<_> = for_day(&list, june_10(), &Utc).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(count_for_day(&list, june_10(), &Utc), 2);
    }

    #[test]
    fn test_daily_schedule() {
        let list = vec![
            appt("late", "2024-06-10", "16:45"),
            appt("other", "2024-06-12", "08:00"),
            appt("early", "2024-06-10", "08:30"),
        ];
        let ids: Vec<_> = daily_schedule(&list, june_10(), &Utc)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_format_display_time() {
        assert_eq!(format_display_time("14:00"), "2:00 PM");
        assert_eq!(format_display_time("00:15"), "12:15 AM");
        assert_eq!(format_display_time("12:30"), "12:30 PM");
        assert_eq!(format_display_time("09:05"), "9:05 AM");
        assert_eq!(format_display_time("23:59"), "11:59 PM");
    }

    #[test]
    fn test_format_display_time_passthrough() {
        assert_eq!(format_display_time("noon"), "noon");
        assert_eq!(format_display_time("xx:15"), "xx:15");
        assert_eq!(format_display_time("25:00"), "25:00");
        assert_eq!(format_display_time("9:75"), "9:75");
    }

    #[test]
    fn test_add_update_remove() {
        let list = vec![appt("a", "2024-06-10", "10:00")];
        let list = add(&list, appt("b", "2024-06-10", "11:00"));
        assert_eq!(list[0].id, "b");

        let list = update(&list, appt("a", "2024-06-11", "12:00")).unwrap();
        assert_eq!(list[1].date, "2024-06-11");
        assert!(update(&list, appt("zz", "2024-06-11", "12:00")).is_none());

        let list = remove(&list, "b");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "a");
    }
}
