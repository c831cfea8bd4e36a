//! Practice dashboard figures.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::ledger::{self, MonthlyTotal, TREND_MONTHS};
use crate::models::{Appointment, Billing, Patient};
use crate::schedule;

/// Headline numbers for the practice, as of a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_patients: usize,
    /// Money received on bills dated this month
    pub monthly_revenue: f64,
    pub todays_appointments: usize,
    /// Billed per month, oldest first
    pub billing_trend: Vec<MonthlyTotal>,
}

impl DashboardSummary {
    pub fn compute<Tz: TimeZone>(
        patients: &[Patient],
        billing: &[Billing],
        appointments: &[Appointment],
        now: &DateTime<Tz>,
    ) -> Self {
        Self {
            total_patients: patients.len(),
            monthly_revenue: ledger::monthly_revenue(billing, now),
            todays_appointments: schedule::count_for_day(
                appointments,
                now.date_naive(),
                &now.timezone(),
            ),
            billing_trend: ledger::billing_trend(billing, now, TREND_MONTHS),
        }
    }
}
