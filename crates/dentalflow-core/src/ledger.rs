//! Billing ledger: payment status, totals and list operations over billing records.
//!
//! Everything here is pure. Callers own the lists and persist the results.

use std::ops::Add;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{local_date, Billing, PaymentStatus};

/// Months shown in the dashboard billing trend.
pub const TREND_MONTHS: u32 = 6;

/// Derive payment status from the billed and received amounts.
pub fn derive_status(cost: f64, paid_amount: f64) -> PaymentStatus {
    if paid_amount >= cost {
        PaymentStatus::Paid
    } else if paid_amount > 0.0 {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Unpaid
    }
}

/// Aggregate totals over a set of billing records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_billed: f64,
    pub total_paid: f64,
    pub total_due: f64,
}

impl Add for Summary {
    type Output = Summary;

    fn add(self, other: Summary) -> Summary {
        Summary {
            total_billed: self.total_billed + other.total_billed,
            total_paid: self.total_paid + other.total_paid,
            total_due: self.total_due + other.total_due,
        }
    }
}

/// Sum billed and paid amounts. Due is always billed minus paid.
pub fn summarize(records: &[Billing]) -> Summary {
    let (billed, paid) = records
        .iter()
        .fold((0.0, 0.0), |(billed, paid), b| (billed + b.cost, paid + b.paid_amount));

    Summary {
        total_billed: billed,
        total_paid: paid,
        total_due: billed - paid,
    }
}

/// Records created on `day` in time zone `tz`, ignoring time of day.
pub fn filter_by_day<Tz: TimeZone>(records: &[Billing], day: NaiveDate, tz: &Tz) -> Vec<Billing> {
    records
        .iter()
        .filter(|b| local_date(&b.date, tz) == Some(day))
        .cloned()
        .collect()
}

/// Records belonging to one patient.
pub fn filter_by_patient(records: &[Billing], patient_id: &str) -> Vec<Billing> {
    records
        .iter()
        .filter(|b| b.patient_id == patient_id)
        .cloned()
        .collect()
}

/// A copy of `record` settled in full.
pub fn mark_fully_paid(record: &Billing) -> Billing {
    Billing {
        paid_amount: record.cost,
        ..record.clone()
    }
}

/// Append a new entry.
pub fn add_entry(records: &[Billing], entry: Billing) -> Vec<Billing> {
    let mut updated = records.to_vec();
    updated.push(entry);
    updated
}

/// Drop the entry with `id`.
pub fn remove_entry(records: &[Billing], id: &str) -> Vec<Billing> {
    records.iter().filter(|b| b.id != id).cloned().collect()
}

/// Replace every record of one patient with `patient_records`.
///
/// Other patients' records keep their order and come first.
pub fn replace_all_for_patient(
    records: &[Billing],
    patient_id: &str,
    patient_records: Vec<Billing>,
) -> Vec<Billing> {
    let mut updated: Vec<Billing> = records
        .iter()
        .filter(|b| b.patient_id != patient_id)
        .cloned()
        .collect();
    updated.extend(
        patient_records
            .into_iter()
            .map(|b| Billing { patient_id: patient_id.to_string(), ..b }),
    );
    updated
}

/// Replace the single record whose id matches `record.id`.
///
/// Returns `None` when no record has that id.
pub fn update_one(records: &[Billing], record: Billing) -> Option<Vec<Billing>> {
    let position = records.iter().position(|b| b.id == record.id)?;
    let mut updated = records.to_vec();
    updated[position] = record;
    Some(updated)
}

/// Billing history order: newest first.
///
/// Records with unparseable dates sink to the end, keeping their relative order.
pub fn sort_by_date_desc(records: &[Billing]) -> Vec<Billing> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|b| std::cmp::Reverse(DateTime::parse_from_rfc3339(&b.date).ok()));
    sorted
}

fn same_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

/// Money received on records dated in the same calendar month as `now`.
pub fn monthly_revenue<Tz: TimeZone>(records: &[Billing], now: &DateTime<Tz>) -> f64 {
    let tz = now.timezone();
    let today = now.date_naive();
    records
        .iter()
        .filter(|b| local_date(&b.date, &tz).is_some_and(|d| same_month(d, today)))
        .map(|b| b.paid_amount)
        .sum()
}

/// Amount billed in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// Short month name, e.g. "Jan"
    pub label: String,
    /// First day of the month
    pub month: NaiveDate,
    /// Sum of costs billed that month
    pub total: f64,
}

/// Billed totals for the last `months` calendar months, oldest first, ending with `now`'s month.
pub fn billing_trend<Tz: TimeZone>(
    records: &[Billing],
    now: &DateTime<Tz>,
    months: u32,
) -> Vec<MonthlyTotal> {
    let tz = now.timezone();
    let today = now.date_naive();
    let current = today.with_day(1).unwrap_or(today);
    let dated: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter_map(|b| local_date(&b.date, &tz).map(|d| (d, b.cost)))
        .collect();

    (0..months)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .map(|month| MonthlyTotal {
            label: month.format("%b").to_string(),
            month,
            total: dated
                .iter()
                .filter(|(d, _)| same_month(*d, month))
                .map(|(_, cost)| cost)
                .sum(),
        })
        .collect()
}

/// Fixed display formatting for amounts.
pub fn format_amount(amount: f64) -> String {
    format!("₹{:.2}", amount)
}
