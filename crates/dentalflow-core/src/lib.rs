//! DentalFlow Core Library
//!
//! Local-first records for a single dental practice: patients, per-patient
//! billing ledgers and appointment scheduling.
//!
//! # Architecture
//!
//! ```text
//!   KeyValueStore (SQLite kv_store / memory)
//!         │  load (seed fallback)          ▲ save (warn on failure)
//!         ▼                                │
//!   ┌──────────────────── Clinic session ──────────────────────┐
//!   │  patients            billing             appointments    │
//!   │     │                   │                     │          │
//!   │  registry            ledger               schedule       │
//!   │  (search, cascade)   (status, totals)     (day, time)    │
//!   └───────────────────────────┬──────────────────────────────┘
//!                               │
//!                 Dashboard · UPI payment QR · FFI / CLI
//! ```
//!
//! # Core Principle
//!
//! **Payment status is always derived** from cost and paid amount. It is never
//! entered by hand and never trusted when read back from storage.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Billing, Appointment)
//! - [`ledger`]: Billing status, totals, filters and trends
//! - [`registry`]: Patient search and cascade delete
//! - [`schedule`]: Day views and time formatting for appointments
//! - [`validation`]: Form inputs and field rules
//! - [`store`] / [`db`]: Key-value persistence (SQLite)
//! - [`payment`]: UPI payment requests and QR codes
//! - [`clinic`]: The session tying it together

pub mod clinic;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod ledger;
pub mod models;
pub mod payment;
pub mod registry;
pub mod schedule;
pub mod seed;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use clinic::{Clinic, ClinicError, ClinicResult, Notice, NoticeKind};
pub use config::ClinicConfig;
pub use dashboard::DashboardSummary;
pub use db::Database;
pub use ledger::Summary;
pub use models::{Appointment, Billing, Patient, PaymentStatus};
pub use payment::UpiPaymentRequest;
pub use store::{KeyValueStore, MemoryStore};
pub use validation::{AppointmentForm, BillingForm, PatientForm, ValidationErrors};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DentalFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payment error: {0}")]
    PaymentError(String),
}

impl From<db::DbError> for DentalFlowError {
    fn from(e: db::DbError) -> Self {
        DentalFlowError::DatabaseError(e.to_string())
    }
}

impl From<ClinicError> for DentalFlowError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::Validation(errors) => DentalFlowError::InvalidInput(errors.to_string()),
            dup @ ClinicError::DuplicateBillingId(_) => DentalFlowError::InvalidInput(dup.to_string()),
            ClinicError::Payment(e) => DentalFlowError::PaymentError(e.to_string()),
            other => DentalFlowError::NotFound(other.to_string()),
        }
    }
}

impl From<payment::PaymentError> for DentalFlowError {
    fn from(e: payment::PaymentError) -> Self {
        DentalFlowError::PaymentError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DentalFlowError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DentalFlowError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_day(day: &str) -> Result<NaiveDate, DentalFlowError> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| DentalFlowError::InvalidInput(format!("invalid date: {}", day)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a clinic database at the given path.
///
/// Payee settings come from the environment.
#[uniffi::export]
pub fn open_clinic(path: String) -> Result<Arc<DentalFlowCore>, DentalFlowError> {
    let config = ClinicConfig {
        db_path: path.into(),
        ..ClinicConfig::from_env()
    };
    let db = Database::open(&config.db_path)?;
    Ok(Arc::new(DentalFlowCore::new(db, config)))
}

/// Create an in-memory clinic (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<DentalFlowCore>, DentalFlowError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(DentalFlowCore::new(db, ClinicConfig::default())))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe clinic wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DentalFlowCore {
    clinic: Arc<Mutex<Clinic<Database>>>,
    config: ClinicConfig,
}

impl DentalFlowCore {
    fn new(db: Database, config: ClinicConfig) -> Self {
        Self {
            clinic: Arc::new(Mutex::new(Clinic::open(db))),
            config,
        }
    }

    fn render_request(&self, request: UpiPaymentRequest) -> Result<FfiPaymentRequest, DentalFlowError> {
        Ok(FfiPaymentRequest {
            uri: request.to_uri(),
            qr_image_url: request.qr_image_url(self.config.qr_size),
            qr_svg: request.qr_svg()?,
            amount: request.amount,
        })
    }
}

#[uniffi::export]
impl DentalFlowCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// List patients whose name contains `term` (case-insensitive).
    pub fn search_patients(&self, term: String) -> Result<Vec<FfiPatient>, DentalFlowError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic.search_patients(&term).into_iter().map(Into::into).collect())
    }

    /// Add a patient.
    pub fn add_patient(&self, form: FfiPatientForm) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        let (_, notice) = clinic.add_patient(form.into())?;
        Ok(notice.into())
    }

    /// Edit a patient.
    pub fn update_patient(
        &self,
        patient_id: String,
        form: FfiPatientForm,
    ) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        let (_, notice) = clinic.update_patient(&patient_id, form.into())?;
        Ok(notice.into())
    }

    /// Delete a patient and their billing.
    pub fn delete_patient(&self, patient_id: String) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        Ok(clinic.delete_patient(&patient_id)?.into())
    }

    // =========================================================================
    // Billing Operations
    // =========================================================================

    /// A patient's billing, newest first.
    pub fn patient_billing(&self, patient_id: String) -> Result<Vec<FfiBilling>, DentalFlowError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic
            .billing_for_patient(&patient_id)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// All billing, newest first.
    pub fn billing_history(&self) -> Result<Vec<FfiBilling>, DentalFlowError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic.billing_history().into_iter().map(Into::into).collect())
    }

    /// Add a billing entry for a patient.
    pub fn add_billing(
        &self,
        patient_id: String,
        service: String,
        cost: f64,
        paid_amount: Option<f64>,
    ) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        let form = BillingForm {
            service,
            cost,
            paid_amount,
        };
        let (_, notice) = clinic.add_billing(&patient_id, form)?;
        Ok(notice.into())
    }

    /// Mark a bill as paid in full.
    pub fn mark_billing_paid(&self, billing_id: String) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        let (_, notice) = clinic.mark_billing_paid(&billing_id)?;
        Ok(notice.into())
    }

    /// Delete a billing entry.
    pub fn remove_billing(&self, billing_id: String) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        Ok(clinic.remove_billing(&billing_id)?.into())
    }

    /// Totals across all billing, or one patient's when `patient_id` is set.
    pub fn billing_summary(&self, patient_id: Option<String>) -> Result<FfiSummary, DentalFlowError> {
        let clinic = self.clinic.lock()?;
        let summary = match patient_id {
            Some(id) => clinic.patient_summary(&id),
            None => clinic.summary(),
        };
        Ok(summary.into())
    }

    /// UPI payment request for what is still owed on a bill.
    pub fn payment_request(&self, billing_id: String) -> Result<FfiPaymentRequest, DentalFlowError> {
        let clinic = self.clinic.lock()?;
        let request =
            clinic.payment_request(&billing_id, &self.config.payee_id, &self.config.payee_name)?;
        self.render_request(request)
    }

    /// The clinic's general scan-to-pay code; the payer enters the amount.
    pub fn clinic_payment_request(&self) -> Result<FfiPaymentRequest, DentalFlowError> {
        let request = UpiPaymentRequest::for_clinic(&self.config.payee_id, &self.config.payee_name);
        self.render_request(request)
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// Appointments on a "YYYY-MM-DD" local day, in time order.
    pub fn daily_schedule(&self, day: String) -> Result<Vec<FfiAppointment>, DentalFlowError> {
        let day = parse_day(&day)?;
        let clinic = self.clinic.lock()?;
        Ok(clinic
            .daily_schedule(day, &Local)
            .into_iter()
            .map(|a| {
                let patient_name = clinic.patient_name(&a.patient_id).to_string();
                FfiAppointment::from_appointment(a, patient_name)
            })
            .collect())
    }

    /// Schedule an appointment.
    pub fn schedule_appointment(
        &self,
        form: FfiAppointmentForm,
    ) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        let (_, notice) = clinic.schedule_appointment(form.into())?;
        Ok(notice.into())
    }

    /// Edit an appointment.
    pub fn update_appointment(
        &self,
        appointment_id: String,
        form: FfiAppointmentForm,
    ) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        let (_, notice) = clinic.update_appointment(&appointment_id, form.into())?;
        Ok(notice.into())
    }

    /// Cancel an appointment.
    pub fn delete_appointment(&self, appointment_id: String) -> Result<FfiNotice, DentalFlowError> {
        let mut clinic = self.clinic.lock()?;
        Ok(clinic.delete_appointment(&appointment_id)?.into())
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Dashboard figures as of now, local time.
    pub fn dashboard(&self) -> Result<FfiDashboard, DentalFlowError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic.dashboard(&Local::now()).into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub medical_history: String,
    pub last_updated: String,
    pub treatment: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            phone: patient.phone,
            medical_history: patient.medical_history,
            last_updated: patient.last_updated,
            treatment: patient.treatment,
        }
    }
}

/// FFI-safe patient form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub name: String,
    pub phone: String,
    pub medical_history: Option<String>,
    pub last_updated: Option<String>,
    pub treatment: Option<String>,
}

impl From<FfiPatientForm> for PatientForm {
    fn from(form: FfiPatientForm) -> Self {
        PatientForm {
            name: form.name,
            phone: form.phone,
            medical_history: form.medical_history,
            last_updated: form.last_updated,
            treatment: form.treatment,
        }
    }
}

/// FFI-safe billing record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBilling {
    pub id: String,
    pub patient_id: String,
    pub service: String,
    pub cost: f64,
    pub paid_amount: f64,
    pub amount_due: f64,
    pub status: String,
    pub date: String,
}

impl From<Billing> for FfiBilling {
    fn from(bill: Billing) -> Self {
        let status = bill.status().label().to_string();
        let amount_due = bill.amount_due();
        Self {
            id: bill.id,
            patient_id: bill.patient_id,
            service: bill.service,
            cost: bill.cost,
            paid_amount: bill.paid_amount,
            amount_due,
            status,
            date: bill.date,
        }
    }
}

/// FFI-safe billing totals.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSummary {
    pub total_billed: f64,
    pub total_paid: f64,
    pub total_due: f64,
}

impl From<Summary> for FfiSummary {
    fn from(summary: Summary) -> Self {
        Self {
            total_billed: summary.total_billed,
            total_paid: summary.total_paid,
            total_due: summary.total_due,
        }
    }
}

/// FFI-safe payment request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPaymentRequest {
    pub uri: String,
    pub qr_image_url: String,
    pub qr_svg: String,
    pub amount: Option<f64>,
}

/// FFI-safe appointment, with the patient's display name resolved.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub date: String,
    pub time: String,
    pub display_time: String,
    pub reason: String,
}

impl FfiAppointment {
    fn from_appointment(appointment: Appointment, patient_name: String) -> Self {
        Self {
            display_time: schedule::format_display_time(&appointment.time),
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name,
            date: appointment.date,
            time: appointment.time,
            reason: appointment.reason,
        }
    }
}

/// FFI-safe appointment form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentForm {
    pub patient_id: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl From<FfiAppointmentForm> for AppointmentForm {
    fn from(form: FfiAppointmentForm) -> Self {
        AppointmentForm {
            patient_id: form.patient_id,
            date: form.date,
            time: form.time,
            reason: form.reason,
        }
    }
}

/// FFI-safe notice.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotice {
    pub title: String,
    pub description: String,
    pub destructive: bool,
    pub persist_warning: Option<String>,
}

impl From<Notice> for FfiNotice {
    fn from(notice: Notice) -> Self {
        Self {
            title: notice.title,
            description: notice.description,
            destructive: notice.kind == NoticeKind::Destructive,
            persist_warning: notice.persist_warning,
        }
    }
}

/// FFI-safe monthly total.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMonthlyTotal {
    pub label: String,
    pub total: f64,
}

/// FFI-safe dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub total_patients: u32,
    pub monthly_revenue: f64,
    pub todays_appointments: u32,
    pub billing_trend: Vec<FfiMonthlyTotal>,
}

impl From<DashboardSummary> for FfiDashboard {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total_patients: summary.total_patients as u32,
            monthly_revenue: summary.monthly_revenue,
            todays_appointments: summary.todays_appointments as u32,
            billing_trend: summary
                .billing_trend
                .into_iter()
                .map(|m| FfiMonthlyTotal {
                    label: m.label,
                    total: m.total,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_patient_lifecycle() {
        let core = open_clinic_in_memory().unwrap();
        assert_eq!(core.search_patients(String::new()).unwrap().len(), 5);

        let notice = core
            .add_patient(FfiPatientForm {
                name: "Jane Doe".into(),
                phone: "555-999-9999".into(),
                medical_history: None,
                last_updated: None,
                treatment: None,
            })
            .unwrap();
        assert_eq!(notice.title, "Patient Added");
        assert!(!notice.destructive);

        let found = core.search_patients("jane".into()).unwrap();
        assert_eq!(found.len(), 1);

        let notice = core.delete_patient(found[0].id.clone()).unwrap();
        assert!(notice.destructive);
        assert!(core.search_patients("jane".into()).unwrap().is_empty());
    }

    #[test]
    fn test_ffi_errors_map() {
        let core = open_clinic_in_memory().unwrap();
        let err = core.delete_patient("ghost".into()).unwrap_err();
        assert!(matches!(err, DentalFlowError::NotFound(_)));

        let err = core
            .add_billing("1".into(), "X".into(), -5.0, None)
            .unwrap_err();
        assert!(matches!(err, DentalFlowError::InvalidInput(_)));

        let err = core.daily_schedule("June 10th".into()).unwrap_err();
        assert!(matches!(err, DentalFlowError::InvalidInput(_)));
    }

    #[test]
    fn test_ffi_payment_request() {
        let core = open_clinic_in_memory().unwrap();
        let request = core.payment_request("b5".into()).unwrap();
        assert_eq!(request.amount, Some(150.0));
        assert!(request.uri.starts_with("upi://pay?pa=clinic%40upi&pn=DentalFlow&am=150.00"));
        assert!(request.qr_svg.contains("<svg"));

        let err = core.payment_request("b1".into()).unwrap_err();
        assert!(matches!(err, DentalFlowError::PaymentError(_)));
    }

    #[test]
    fn test_ffi_clinic_payment_request() {
        let core = open_clinic_in_memory().unwrap();
        let request = core.clinic_payment_request().unwrap();
        assert_eq!(request.amount, None);
        assert_eq!(request.uri, "upi://pay?pa=clinic%40upi&pn=DentalFlow");
        assert!(request.qr_image_url.contains("size=250x250"));
    }

    #[test]
    fn test_ffi_billing_and_summary() {
        let core = open_clinic_in_memory().unwrap();
        core.mark_billing_paid("b2".into()).unwrap();

        let bills = core.patient_billing("2".into()).unwrap();
        assert_eq!(bills[0].status, "Paid");
        assert_eq!(bills[0].amount_due, 0.0);

        let summary = core.billing_summary(None).unwrap();
        assert_eq!(summary.total_billed, 1225.0);
        assert_eq!(summary.total_due, summary.total_billed - summary.total_paid);
    }

    #[test]
    fn test_ffi_schedule_display() {
        let core = open_clinic_in_memory().unwrap();
        let day = core.daily_schedule("2024-06-10".into()).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].display_time, "9:30 AM");
        assert_eq!(day[1].display_time, "2:00 PM");
        assert_eq!(day[0].patient_name, "Alice Johnson");
    }
}
