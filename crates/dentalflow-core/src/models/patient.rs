//! Patient models.

use serde::{Deserialize, Serialize};

/// Placeholder stored when no medical history is given.
pub const NO_MEDICAL_HISTORY: &str = "None.";

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Timestamp-derived id, immutable
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Allergies, chronic conditions, etc.
    #[serde(default = "default_medical_history")]
    pub medical_history: String,
    /// Last time the record (or visit) was updated. Older records call it `lastAppointment`.
    #[serde(default, alias = "lastAppointment")]
    pub last_updated: String,
    /// Current treatment plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
}

fn default_medical_history() -> String {
    NO_MEDICAL_HISTORY.to_string()
}

impl Patient {
    /// Create a new patient with a fresh id, stamped now.
    pub fn new(name: String, phone: String) -> Self {
        Self {
            id: super::new_id("p"),
            name,
            phone,
            medical_history: default_medical_history(),
            last_updated: chrono::Utc::now().to_rfc3339(),
            treatment: None,
        }
    }

    /// Set medical history, falling back to the placeholder when blank.
    pub fn with_medical_history(mut self, history: Option<String>) -> Self {
        self.medical_history = match history {
            Some(h) if !h.trim().is_empty() => h,
            _ => default_medical_history(),
        };
        self
    }

    /// Check whether anything is recorded beyond the placeholder.
    pub fn has_medical_history(&self) -> bool {
        self.medical_history != NO_MEDICAL_HISTORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient() {
        let patient = Patient::new("Alice Johnson".into(), "555-0101".into());
        assert_eq!(patient.name, "Alice Johnson");
        assert!(patient.id.starts_with("p-"));
        assert_eq!(patient.medical_history, "None.");
        assert!(!patient.has_medical_history());
    }

    #[test]
    fn test_blank_history_defaults() {
        let patient = Patient::new("Bob".into(), "555-0102".into())
            .with_medical_history(Some("   ".into()));
        assert_eq!(patient.medical_history, "None.");

        let patient = patient.with_medical_history(Some("Allergic to penicillin.".into()));
        assert!(patient.has_medical_history());
    }

    #[test]
    fn test_legacy_last_appointment_field() {
        let json = r#"{
            "id": "1",
            "name": "Alice Johnson",
            "phone": "555-0101",
            "lastAppointment": "2024-05-20T10:00:00Z"
        }"#;
        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.last_updated, "2024-05-20T10:00:00Z");
        assert_eq!(patient.medical_history, "None.");
        assert_eq!(patient.treatment, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let patient = Patient::new("Alice".into(), "555-0101".into());
        let json = serde_json::to_string(&patient).unwrap();
        assert!(json.contains("\"medicalHistory\""));
        assert!(json.contains("\"lastUpdated\""));
        assert!(!json.contains("treatment"));
    }
}
