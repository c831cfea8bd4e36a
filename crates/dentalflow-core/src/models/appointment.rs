//! Appointment models.

use serde::{Deserialize, Serialize};

/// A scheduled visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Timestamp-derived id
    pub id: String,
    /// Patient id. May dangle after the patient is deleted.
    pub patient_id: String,
    /// Calendar date (ISO-8601 date or timestamp)
    pub date: String,
    /// Zero-padded 24-hour "HH:MM"
    pub time: String,
    /// Reason for the visit
    pub reason: String,
}

impl Appointment {
    /// Create a new appointment with a fresh id.
    pub fn new(patient_id: String, date: String, time: String, reason: String) -> Self {
        Self {
            id: super::new_id("appt"),
            patient_id,
            date,
            time,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appointment() {
        let appt = Appointment::new(
            "1".into(),
            "2024-06-10".into(),
            "09:05".into(),
            "Routine check-up".into(),
        );
        assert!(appt.id.starts_with("appt-"));
        let json = serde_json::to_string(&appt).unwrap();
        assert!(json.contains("\"patientId\":\"1\""));
    }
}
