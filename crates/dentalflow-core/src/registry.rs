//! Patient registry operations.

use crate::models::{Billing, Patient};

/// Label shown when an appointment or bill points at a patient that no longer exists.
pub const UNKNOWN_PATIENT: &str = "Unknown Patient";

/// Case-insensitive substring search on patient name.
///
/// An empty term returns every patient. Input order is preserved.
pub fn search(patients: &[Patient], term: &str) -> Vec<Patient> {
    let needle = term.to_lowercase();
    patients
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Remove a patient along with all of their billing records.
///
/// Appointments are left alone.
pub fn delete_cascade(
    patients: &[Patient],
    billing: &[Billing],
    patient_id: &str,
) -> (Vec<Patient>, Vec<Billing>) {
    let patients = patients
        .iter()
        .filter(|p| p.id != patient_id)
        .cloned()
        .collect();
    let billing = billing
        .iter()
        .filter(|b| b.patient_id != patient_id)
        .cloned()
        .collect();
    (patients, billing)
}

/// Replace the patient with the same id, or add it at the front.
pub fn upsert(patients: &[Patient], patient: Patient) -> Vec<Patient> {
    if patients.iter().any(|p| p.id == patient.id) {
        patients
            .iter()
            .map(|p| if p.id == patient.id { patient.clone() } else { p.clone() })
            .collect()
    } else {
        let mut updated = Vec::with_capacity(patients.len() + 1);
        updated.push(patient);
        updated.extend(patients.iter().cloned());
        updated
    }
}

/// Find a patient by id.
pub fn find<'a>(patients: &'a [Patient], patient_id: &str) -> Option<&'a Patient> {
    patients.iter().find(|p| p.id == patient_id)
}

/// Display name for a patient id.
pub fn patient_name<'a>(patients: &'a [Patient], patient_id: &str) -> &'a str {
    find(patients, patient_id)
        .map(|p| p.name.as_str())
        .unwrap_or(UNKNOWN_PATIENT)
}
