//! Form input and field validation.
//!
//! Each form collects every failing field so a front end can show the
//! messages inline. Any error blocks submission.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{local_date, Appointment, Billing, Patient};

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failed fields of one form submission.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Message for a field, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern is valid")
    })
}

/// Check a 24-hour "H:MM"/"HH:MM" time.
pub fn is_valid_time(time: &str) -> bool {
    time_pattern().is_match(time)
}

/// Zero-pad a valid time to "HH:MM" so that string order is time order.
fn pad_time(time: &str) -> String {
    match time.split_once(':') {
        Some((hour, minute)) if hour.len() == 1 => format!("0{}:{}", hour, minute),
        _ => time.to_string(),
    }
}

fn check_date(errors: &mut ValidationErrors, field: &str, value: &str, required: &str) {
    if value.trim().is_empty() {
        errors.push(field, required);
    } else if local_date(value, &Utc).is_none() {
        errors.push(field, "Please enter a valid date.");
    }
}

/// Patient add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub phone: String,
    pub medical_history: Option<String>,
    /// Picked date. `None` stamps the record with the current time.
    pub last_updated: Option<String>,
    pub treatment: Option<String>,
}

impl PatientForm {
    /// Prefill the form from an existing record.
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            phone: patient.phone.clone(),
            medical_history: Some(patient.medical_history.clone()),
            last_updated: Some(patient.last_updated.clone()),
            treatment: patient.treatment.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if !min_chars(&self.name, 2) {
            errors.push("name", "Name must be at least 2 characters.");
        }
        if !min_chars(&self.phone, 10) {
            errors.push("phone", "Phone number seems too short.");
        }
        if let Some(date) = &self.last_updated {
            check_date(&mut errors, "last_updated", date, "A date is required.");
        }
        errors.into_result()
    }

    /// Build a patient. Editing keeps `existing_id`; otherwise a new id is assigned.
    pub fn build(self, existing_id: Option<&str>) -> Result<Patient, ValidationErrors> {
        self.validate()?;
        let mut patient = Patient::new(self.name, self.phone).with_medical_history(self.medical_history);
        if let Some(id) = existing_id {
            patient.id = id.to_string();
        }
        if let Some(date) = self.last_updated {
            patient.last_updated = date;
        }
        patient.treatment = self.treatment.filter(|t| !t.trim().is_empty());
        Ok(patient)
    }
}

/// Billing entry form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingForm {
    pub service: String,
    pub cost: f64,
    pub paid_amount: Option<f64>,
}

impl BillingForm {
    /// The form an existing record would have been entered through.
    pub fn from_billing(record: &Billing) -> Self {
        Self {
            service: record.service.clone(),
            cost: record.cost,
            paid_amount: Some(record.paid_amount),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if !min_chars(&self.service, 3) {
            errors.push("service", "Service description is too short.");
        }
        if !(self.cost > 0.0 && self.cost.is_finite()) {
            errors.push("cost", "Cost must be a positive number.");
        }
        if let Some(paid) = self.paid_amount {
            if !(paid >= 0.0 && paid.is_finite()) {
                errors.push("paid_amount", "Paid amount cannot be negative.");
            }
        }
        errors.into_result()
    }

    /// Build a billing record for `patient_id`, dated now.
    pub fn build(self, patient_id: &str) -> Result<Billing, ValidationErrors> {
        self.validate()?;
        Ok(Billing::new(
            patient_id.to_string(),
            self.service,
            self.cost,
            self.paid_amount.unwrap_or(0.0),
        ))
    }
}

/// Appointment scheduling form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl AppointmentForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.patient_id.is_empty() {
            errors.push("patient_id", "Please select a patient.");
        }
        check_date(&mut errors, "date", &self.date, "Please select a date.");
        if !is_valid_time(&self.time) {
            errors.push("time", "Please enter a valid time (HH:MM).");
        }
        if !min_chars(&self.reason, 3) {
            errors.push("reason", "Reason must be at least 3 characters.");
        }
        errors.into_result()
    }

    /// Build an appointment. Editing keeps `existing_id`.
    pub fn build(self, existing_id: Option<&str>) -> Result<Appointment, ValidationErrors> {
        self.validate()?;
        let mut appointment =
            Appointment::new(self.patient_id, self.date, pad_time(&self.time), self.reason);
        if let Some(id) = existing_id {
            appointment.id = id.to_string();
        }
        Ok(appointment)
    }
}
