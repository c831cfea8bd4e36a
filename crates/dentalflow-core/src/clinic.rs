//! The clinic session: current records plus the store they are mirrored to.
//!
//! Every mutation builds new lists through the pure ledger, registry and
//! schedule functions, swaps them in, then writes the touched collections
//! back. A failed write is logged and reported on the returned [`Notice`];
//! the in-memory change is kept either way.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dashboard::DashboardSummary;
use crate::ledger::{self, Summary};
use crate::models::{Appointment, Billing, Patient};
use crate::payment::{PaymentError, UpiPaymentRequest};
use crate::registry;
use crate::schedule;
use crate::seed;
use crate::store::{self, KeyValueStore, APPOINTMENTS_KEY, BILLING_KEY, PATIENTS_KEY};
use crate::validation::{AppointmentForm, BillingForm, PatientForm, ValidationErrors};

/// Clinic errors.
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Billing record not found: {0}")]
    BillingNotFound(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("Billing id already in use: {0}")]
    DuplicateBillingId(String),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

pub type ClinicResult<T> = Result<T, ClinicError>;

/// Tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Destructive,
}

/// Confirmation of a completed mutation, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
    /// Set when the change could not be written to the store.
    pub persist_warning: Option<String>,
}

impl Notice {
    fn success(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            kind: NoticeKind::Success,
            persist_warning: None,
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            ..Self::success(title, description)
        }
    }

    fn with_warning(mut self, warning: Option<String>) -> Self {
        self.persist_warning = warning;
        self
    }
}

/// One practice's records for the lifetime of a session.
pub struct Clinic<S: KeyValueStore> {
    store: S,
    patients: Vec<Patient>,
    billing: Vec<Billing>,
    appointments: Vec<Appointment>,
}

impl<S: KeyValueStore> Clinic<S> {
    /// Load all collections, using seed data for any that are missing or unreadable.
    pub fn open(store: S) -> Self {
        let patients = store::load_collection(&store, PATIENTS_KEY, seed::patients);
        let billing = store::load_collection(&store, BILLING_KEY, seed::billing);
        let appointments = store::load_collection(&store, APPOINTMENTS_KEY, seed::appointments);
        tracing::info!(
            patients = patients.len(),
            billing = billing.len(),
            appointments = appointments.len(),
            "clinic opened"
        );
        Self {
            store,
            patients,
            billing,
            appointments,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn billing(&self) -> &[Billing] {
        &self.billing
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn write(&mut self, keys: &[&str]) -> Option<String> {
        let mut failures = Vec::new();
        for key in keys {
            let result = match *key {
                PATIENTS_KEY => store::save_collection(&mut self.store, key, &self.patients),
                BILLING_KEY => store::save_collection(&mut self.store, key, &self.billing),
                _ => store::save_collection(&mut self.store, key, &self.appointments),
            };
            if let Err(e) = result {
                tracing::warn!(key, error = %e, "failed to persist collection");
                failures.push(format!("{}: {}", key, e));
            }
        }

        if failures.is_empty() {
            None
        } else {
            Some(format!("Changes are not saved yet ({})", failures.join("; ")))
        }
    }

    /// Write every collection, e.g. to materialize seed data.
    pub fn save_all(&mut self) -> Option<String> {
        self.write(&[PATIENTS_KEY, BILLING_KEY, APPOINTMENTS_KEY])
    }

    // =========================================================================
    // Patients
    // =========================================================================

    pub fn find_patient(&self, patient_id: &str) -> Option<&Patient> {
        registry::find(&self.patients, patient_id)
    }

    fn require_patient(&self, patient_id: &str) -> ClinicResult<&Patient> {
        self.find_patient(patient_id)
            .ok_or_else(|| ClinicError::PatientNotFound(patient_id.to_string()))
    }

    /// Name for display, "Unknown Patient" if the id dangles.
    pub fn patient_name(&self, patient_id: &str) -> &str {
        registry::patient_name(&self.patients, patient_id)
    }

    pub fn search_patients(&self, term: &str) -> Vec<Patient> {
        registry::search(&self.patients, term)
    }

    pub fn add_patient(&mut self, form: PatientForm) -> ClinicResult<(Patient, Notice)> {
        let patient = form.build(None)?;
        self.patients = registry::upsert(&self.patients, patient.clone());
        tracing::info!(patient_id = %patient.id, "patient added");

        let warning = self.write(&[PATIENTS_KEY]);
        let notice = Notice::success(
            "Patient Added",
            format!("{} has been successfully added to the system.", patient.name),
        );
        Ok((patient, notice.with_warning(warning)))
    }

    pub fn update_patient(
        &mut self,
        patient_id: &str,
        form: PatientForm,
    ) -> ClinicResult<(Patient, Notice)> {
        self.require_patient(patient_id)?;
        let patient = form.build(Some(patient_id))?;
        self.patients = registry::upsert(&self.patients, patient.clone());
        tracing::info!(patient_id, "patient updated");

        let warning = self.write(&[PATIENTS_KEY]);
        let notice = Notice::success(
            "Patient Updated",
            format!("{}'s record has been successfully updated.", patient.name),
        );
        Ok((patient, notice.with_warning(warning)))
    }

    /// Delete a patient and their billing. Their appointments stay and show as "Unknown Patient".
    pub fn delete_patient(&mut self, patient_id: &str) -> ClinicResult<Notice> {
        self.require_patient(patient_id)?;
        let (patients, billing) = registry::delete_cascade(&self.patients, &self.billing, patient_id);
        let removed_bills = self.billing.len() - billing.len();
        self.patients = patients;
        self.billing = billing;

        let orphaned = self
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .count();
        tracing::info!(patient_id, removed_bills, orphaned, "patient deleted");

        let warning = self.write(&[PATIENTS_KEY, BILLING_KEY]);
        let notice = Notice::destructive(
            "Patient Deleted",
            "The patient record has been successfully removed.",
        );
        Ok(notice.with_warning(warning))
    }

    // =========================================================================
    // Billing
    // =========================================================================

    /// A patient's billing, newest first.
    pub fn billing_for_patient(&self, patient_id: &str) -> Vec<Billing> {
        ledger::sort_by_date_desc(&ledger::filter_by_patient(&self.billing, patient_id))
    }

    /// All billing, newest first.
    pub fn billing_history(&self) -> Vec<Billing> {
        ledger::sort_by_date_desc(&self.billing)
    }

    pub fn summary(&self) -> Summary {
        ledger::summarize(&self.billing)
    }

    pub fn patient_summary(&self, patient_id: &str) -> Summary {
        ledger::summarize(&ledger::filter_by_patient(&self.billing, patient_id))
    }

    /// Totals for bills created on `day` in `tz`.
    pub fn day_summary<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Summary {
        ledger::summarize(&ledger::filter_by_day(&self.billing, day, tz))
    }

    fn find_billing(&self, billing_id: &str) -> ClinicResult<&Billing> {
        self.billing
            .iter()
            .find(|b| b.id == billing_id)
            .ok_or_else(|| ClinicError::BillingNotFound(billing_id.to_string()))
    }

    fn billing_updated(&mut self) -> Notice {
        let warning = self.write(&[BILLING_KEY]);
        Notice::success(
            "Billing Updated",
            "The patient's billing information has been updated.",
        )
        .with_warning(warning)
    }

    pub fn add_billing(
        &mut self,
        patient_id: &str,
        form: BillingForm,
    ) -> ClinicResult<(Billing, Notice)> {
        self.require_patient(patient_id)?;
        let entry = form.build(patient_id)?;
        self.billing = ledger::add_entry(&self.billing, entry.clone());
        tracing::info!(billing_id = %entry.id, patient_id, status = %entry.status(), "billing entry added");
        Ok((entry, self.billing_updated()))
    }

    /// Settle a bill in full. Nothing verifies that money actually arrived.
    pub fn mark_billing_paid(&mut self, billing_id: &str) -> ClinicResult<(Billing, Notice)> {
        let settled = ledger::mark_fully_paid(self.find_billing(billing_id)?);
        self.update_billing(settled.clone())
            .map(|notice| (settled, notice))
    }

    /// Replace one record by id. The record must pass the billing form rules
    /// and belong to a known patient.
    pub fn update_billing(&mut self, record: Billing) -> ClinicResult<Notice> {
        BillingForm::from_billing(&record).validate()?;
        self.require_patient(&record.patient_id)?;
        let billing_id = record.id.clone();
        self.billing = ledger::update_one(&self.billing, record)
            .ok_or_else(|| ClinicError::BillingNotFound(billing_id.clone()))?;
        tracing::info!(billing_id = %billing_id, "billing entry updated");
        Ok(self.billing_updated())
    }

    /// Replace all of one patient's records.
    ///
    /// Every record must pass the billing form rules, and no id may repeat or
    /// already belong to another patient.
    pub fn replace_patient_billing(
        &mut self,
        patient_id: &str,
        records: Vec<Billing>,
    ) -> ClinicResult<Notice> {
        self.require_patient(patient_id)?;
        let mut seen = HashSet::new();
        for record in &records {
            BillingForm::from_billing(record).validate()?;
            let taken = self
                .billing
                .iter()
                .any(|b| b.id == record.id && b.patient_id != patient_id);
            if taken || !seen.insert(record.id.as_str()) {
                return Err(ClinicError::DuplicateBillingId(record.id.clone()));
            }
        }

        self.billing = ledger::replace_all_for_patient(&self.billing, patient_id, records);
        tracing::info!(patient_id, "patient billing replaced");
        Ok(self.billing_updated())
    }

    pub fn remove_billing(&mut self, billing_id: &str) -> ClinicResult<Notice> {
        self.find_billing(billing_id)?;
        self.billing = ledger::remove_entry(&self.billing, billing_id);
        tracing::info!(billing_id, "billing entry removed");
        Ok(self.billing_updated())
    }

    /// Payment request for what is still owed on a bill.
    pub fn payment_request(
        &self,
        billing_id: &str,
        payee_id: &str,
        payee_name: &str,
    ) -> ClinicResult<UpiPaymentRequest> {
        let bill = self.find_billing(billing_id)?;
        Ok(UpiPaymentRequest::for_bill(bill, payee_id, payee_name)?)
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    /// Appointments on `day` in `tz`, in time order.
    pub fn daily_schedule<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<Appointment> {
        schedule::daily_schedule(&self.appointments, day, tz)
    }

    /// Appointments whose patient no longer exists.
    pub fn orphaned_appointments(&self) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|a| self.find_patient(&a.patient_id).is_none())
            .cloned()
            .collect()
    }

    pub fn schedule_appointment(
        &mut self,
        form: AppointmentForm,
    ) -> ClinicResult<(Appointment, Notice)> {
        form.validate()?;
        self.require_patient(&form.patient_id)?;
        let appointment = form.build(None)?;
        self.appointments = schedule::add(&self.appointments, appointment.clone());
        tracing::info!(appointment_id = %appointment.id, "appointment scheduled");

        let warning = self.write(&[APPOINTMENTS_KEY]);
        let notice = Notice::success(
            "Appointment Scheduled",
            "The appointment has been successfully added to the schedule.",
        );
        Ok((appointment, notice.with_warning(warning)))
    }

    pub fn update_appointment(
        &mut self,
        appointment_id: &str,
        form: AppointmentForm,
    ) -> ClinicResult<(Appointment, Notice)> {
        form.validate()?;
        self.require_patient(&form.patient_id)?;
        let appointment = form.build(Some(appointment_id))?;
        self.appointments = schedule::update(&self.appointments, appointment.clone())
            .ok_or_else(|| ClinicError::AppointmentNotFound(appointment_id.to_string()))?;
        tracing::info!(appointment_id, "appointment updated");

        let warning = self.write(&[APPOINTMENTS_KEY]);
        let notice = Notice::success(
            "Appointment Updated",
            "The appointment has been successfully updated.",
        );
        Ok((appointment, notice.with_warning(warning)))
    }

    pub fn delete_appointment(&mut self, appointment_id: &str) -> ClinicResult<Notice> {
        if !self.appointments.iter().any(|a| a.id == appointment_id) {
            return Err(ClinicError::AppointmentNotFound(appointment_id.to_string()));
        }
        self.appointments = schedule::remove(&self.appointments, appointment_id);
        tracing::info!(appointment_id, "appointment deleted");

        let warning = self.write(&[APPOINTMENTS_KEY]);
        let notice = Notice::destructive(
            "Appointment Deleted",
            "The appointment has been removed from the schedule.",
        );
        Ok(notice.with_warning(warning))
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DashboardSummary {
        DashboardSummary::compute(&self.patients, &self.billing, &self.appointments, now)
    }
}
