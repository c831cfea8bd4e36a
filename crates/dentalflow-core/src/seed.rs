//! Starter records used when nothing has been persisted yet.

use crate::models::{Appointment, Billing, Patient};

fn patient(id: &str, name: &str, phone: &str, history: &str, updated: &str, treatment: &str) -> Patient {
    Patient {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        medical_history: history.to_string(),
        last_updated: updated.to_string(),
        treatment: Some(treatment.to_string()),
    }
}

fn bill(id: &str, patient_id: &str, service: &str, cost: f64, paid: f64, date: &str) -> Billing {
    Billing {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        service: service.to_string(),
        cost,
        paid_amount: paid,
        date: date.to_string(),
    }
}

fn appointment(id: &str, patient_id: &str, date: &str, time: &str, reason: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        reason: reason.to_string(),
    }
}

pub fn patients() -> Vec<Patient> {
    vec![
        patient(
            "1",
            "Alice Johnson",
            "555-0101",
            "No known allergies. History of seasonal asthma.",
            "2024-05-20T10:00:00Z",
            "Standard cleaning and check-up.",
        ),
        patient(
            "2",
            "Bob Williams",
            "555-0102",
            "Allergic to penicillin.",
            "2024-05-18T14:30:00Z",
            "Follow-up for wisdom tooth extraction.",
        ),
        patient(
            "3",
            "Charlie Brown",
            "555-0103",
            "None.",
            "2024-04-30T09:00:00Z",
            "Awaiting consultation for braces.",
        ),
        patient(
            "4",
            "Diana Miller",
            "555-0104",
            "History of migraines. Sensitive to bright lights.",
            "2024-06-01T11:00:00Z",
            "Post-whitening sensitivity check.",
        ),
        patient(
            "5",
            "Ethan Davis",
            "555-0105",
            "Lactose intolerant.",
            "2024-06-05T16:00:00Z",
            "None.",
        ),
    ]
}

pub fn billing() -> Vec<Billing> {
    vec![
        bill("b1", "1", "Routine Check-up & Cleaning", 150.0, 150.0, "2024-05-20T10:00:00Z"),
        bill("b2", "2", "Wisdom Tooth Extraction", 450.0, 0.0, "2024-05-18T14:30:00Z"),
        bill("b3", "3", "Cavity Filling", 250.0, 250.0, "2024-04-30T09:00:00Z"),
        bill("b4", "1", "X-Ray", 75.0, 75.0, "2023-11-15T10:00:00Z"),
        bill("b5", "4", "Teeth Whitening", 300.0, 150.0, "2024-06-01T11:00:00Z"),
    ]
}

pub fn appointments() -> Vec<Appointment> {
    vec![
        appointment("appt-1", "1", "2024-06-10", "09:30", "Six-month check-up"),
        appointment("appt-2", "2", "2024-06-10", "14:00", "Extraction follow-up"),
        appointment("appt-3", "4", "2024-06-12", "11:15", "Sensitivity review"),
    ]
}
