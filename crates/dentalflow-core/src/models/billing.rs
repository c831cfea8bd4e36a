//! Billing models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Payment status of a billing record.
///
/// Always derived from cost and paid amount, never chosen directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    Paid,
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    /// Display label, as persisted.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }

    /// Whether a payment request can still be raised.
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One invoiceable service line for a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "BillingRecord", into = "BillingRecord")]
pub struct Billing {
    /// Timestamp-derived id, immutable
    pub id: String,
    /// Owning patient id
    pub patient_id: String,
    /// Service description
    pub service: String,
    /// Amount billed
    pub cost: f64,
    /// Amount received so far
    pub paid_amount: f64,
    /// Creation timestamp (RFC 3339)
    pub date: String,
}

impl Billing {
    /// Create a new billing record for a patient, dated now.
    pub fn new(patient_id: String, service: String, cost: f64, paid_amount: f64) -> Self {
        Self {
            id: super::new_id("b"),
            patient_id,
            service,
            cost,
            paid_amount,
            date: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Status derived from cost and paid amount.
    pub fn status(&self) -> PaymentStatus {
        crate::ledger::derive_status(self.cost, self.paid_amount)
    }

    /// Amount still owed.
    pub fn amount_due(&self) -> f64 {
        self.cost - self.paid_amount
    }
}

/// Persisted shape of a billing record.
///
/// Older data has no `paidAmount` and an independently chosen `status`, where
/// "Paid" meant settled in full. Such records are migrated on read: a missing
/// paid amount becomes the cost for "Paid" and zero otherwise. Once an amount
/// is present the stored status is ignored, so the derived status always
/// matches the amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    pub id: String,
    pub patient_id: String,
    pub service: String,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    pub date: String,
}

impl From<BillingRecord> for Billing {
    fn from(record: BillingRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            service: record.service,
            cost: record.cost,
            paid_amount: match (record.paid_amount, record.status) {
                (Some(paid), _) => paid,
                (None, Some(PaymentStatus::Paid)) => record.cost,
                (None, _) => 0.0,
            },
            date: record.date,
        }
    }
}

impl From<Billing> for BillingRecord {
    fn from(billing: Billing) -> Self {
        let status = billing.status();
        Self {
            id: billing.id,
            patient_id: billing.patient_id,
            service: billing.service,
            cost: billing.cost,
            paid_amount: Some(billing.paid_amount),
            status: Some(status),
            date: billing.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_billing_status() {
        let bill = Billing::new("1".into(), "Cavity Filling".into(), 250.0, 0.0);
        assert!(bill.id.starts_with("b-"));
        assert_eq!(bill.status(), PaymentStatus::Unpaid);
        assert_eq!(bill.amount_due(), 250.0);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(PaymentStatus::PartiallyPaid.to_string(), "Partially Paid");
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PartiallyPaid).unwrap(),
            "\"Partially Paid\""
        );
        assert!(PaymentStatus::Unpaid.is_outstanding());
        assert!(!PaymentStatus::Paid.is_outstanding());
    }

    fn legacy(status: &str) -> Billing {
        let json = format!(
            r#"{{"id":"b1","patientId":"1","service":"Routine Check-up & Cleaning","cost":150,"status":"{}","date":"2024-05-20T10:00:00Z"}}"#,
            status
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_legacy_paid_record_is_settled() {
        let bill = legacy("Paid");
        assert_eq!(bill.paid_amount, 150.0);
        assert_eq!(bill.status(), PaymentStatus::Paid);
        assert_eq!(bill.amount_due(), 0.0);
    }

    #[test]
    fn test_legacy_unsettled_records_read_as_unpaid() {
        for status in ["Unpaid", "Partially Paid"] {
            let bill = legacy(status);
            assert_eq!(bill.paid_amount, 0.0, "{}", status);
            assert_eq!(bill.status(), PaymentStatus::Unpaid);
        }
    }

    #[test]
    fn test_stored_status_ignored_when_amount_present() {
        let json = r#"{"id":"b2","patientId":"2","service":"Root Canal","cost":450,"paidAmount":0,"status":"Paid","date":"2024-05-21T10:00:00Z"}"#;
        let bill: Billing = serde_json::from_str(json).unwrap();
        assert_eq!(bill.status(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_serialized_status_is_derived() {
        let mut bill = Billing::new("1".into(), "Teeth Whitening".into(), 300.0, 100.0);
        bill.id = "b5".into();
        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["status"], "Partially Paid");
        assert_eq!(json["paidAmount"], 100.0);
        assert_eq!(json["patientId"], "1");
    }
}
