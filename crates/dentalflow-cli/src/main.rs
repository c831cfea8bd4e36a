use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use dentalflow_core::{
    ledger::format_amount, schedule::format_display_time, AppointmentForm, BillingForm, Billing,
    Clinic, ClinicConfig, Database, Notice, PatientForm, UpiPaymentRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dentalflow")]
#[command(about = "DentalFlow dental practice records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients
    Patients {
        /// Only names containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a patient
    AddPatient {
        name: String,
        phone: String,
        /// Medical history notes
        #[arg(long)]
        history: Option<String>,
        /// Current treatment plan
        #[arg(long)]
        treatment: Option<String>,
    },
    /// Delete a patient and their billing records
    DeletePatient { patient_id: String },
    /// Show billing, newest first
    Billing {
        /// Only this patient's records
        #[arg(long)]
        patient: Option<String>,
    },
    /// Add a billing entry
    AddBilling {
        patient_id: String,
        service: String,
        cost: f64,
        /// Amount already received
        #[arg(long)]
        paid: Option<f64>,
    },
    /// Mark a bill as paid in full
    MarkPaid { billing_id: String },
    /// Show the schedule for a day
    Appointments {
        /// Day to show (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Schedule an appointment
    Schedule {
        patient_id: String,
        /// YYYY-MM-DD
        date: String,
        /// HH:MM, 24-hour
        time: String,
        reason: String,
    },
    /// Cancel an appointment
    Cancel { appointment_id: String },
    /// Practice overview
    Dashboard,
    /// Print a UPI payment link and QR, for a bill or the clinic's general scan-to-pay code
    Pay {
        /// Bill to collect; omit for a code where the payer enters the amount
        billing_id: Option<String>,
        /// Write the QR code as SVG to this file
        #[arg(long)]
        svg: Option<std::path::PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dentalflow_core=info".parse()?)
                .add_directive("dentalflow=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClinicConfig::from_env();
    tracing::debug!(
        db = %config.db_path.display(),
        payee_id = %config.payee_id,
        qr_size = config.qr_size,
        "configuration resolved"
    );

    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let mut clinic = Clinic::open(db);

    match cli.command {
        Commands::Patients { search } => {
            let patients = clinic.search_patients(search.as_deref().unwrap_or(""));
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "{}  {}  {}  (updated {})",
                    patient.id, patient.name, patient.phone, patient.last_updated
                );
            }
        }
        Commands::AddPatient {
            name,
            phone,
            history,
            treatment,
        } => {
            let form = PatientForm {
                name,
                phone,
                medical_history: history,
                last_updated: None,
                treatment,
            };
            let (patient, notice) = clinic.add_patient(form)?;
            report(&notice);
            println!("ID: {}", patient.id);
        }
        Commands::DeletePatient { patient_id } => {
            report(&clinic.delete_patient(&patient_id)?);
        }
        Commands::Billing { patient } => {
            let (records, summary) = match &patient {
                Some(id) => (clinic.billing_for_patient(id), clinic.patient_summary(id)),
                None => (clinic.billing_history(), clinic.summary()),
            };
            for bill in &records {
                print_bill(bill, clinic.patient_name(&bill.patient_id));
            }
            println!(
                "Billed {}  Paid {}  Due {}",
                format_amount(summary.total_billed),
                format_amount(summary.total_paid),
                format_amount(summary.total_due)
            );
        }
        Commands::AddBilling {
            patient_id,
            service,
            cost,
            paid,
        } => {
            let form = BillingForm {
                service,
                cost,
                paid_amount: paid,
            };
            let (bill, notice) = clinic.add_billing(&patient_id, form)?;
            report(&notice);
            print_bill(&bill, clinic.patient_name(&bill.patient_id));
        }
        Commands::MarkPaid { billing_id } => {
            let (bill, notice) = clinic.mark_billing_paid(&billing_id)?;
            report(&notice);
            print_bill(&bill, clinic.patient_name(&bill.patient_id));
        }
        Commands::Appointments { date } => {
            let day = date.unwrap_or_else(|| Local::now().date_naive());
            let appointments = clinic.daily_schedule(day, &Local);
            if appointments.is_empty() {
                println!("No appointments on {}.", day);
            }
            for appt in appointments {
                println!(
                    "{:>8}  {}  {}  [{}]",
                    format_display_time(&appt.time),
                    clinic.patient_name(&appt.patient_id),
                    appt.reason,
                    appt.id
                );
            }
        }
        Commands::Schedule {
            patient_id,
            date,
            time,
            reason,
        } => {
            let form = AppointmentForm {
                patient_id,
                date,
                time,
                reason,
            };
            let (appt, notice) = clinic.schedule_appointment(form)?;
            report(&notice);
            println!("ID: {}", appt.id);
        }
        Commands::Cancel { appointment_id } => {
            report(&clinic.delete_appointment(&appointment_id)?);
        }
        Commands::Dashboard => {
            let summary = clinic.dashboard(&Local::now());
            println!("Patients:              {}", summary.total_patients);
            println!("Revenue this month:    {}", format_amount(summary.monthly_revenue));
            println!("Appointments today:    {}", summary.todays_appointments);
            println!("Billed per month:");
            for month in summary.billing_trend {
                println!("  {}  {}", month.label, format_amount(month.total));
            }
        }
        Commands::Pay { billing_id, svg } => {
            let request = match billing_id {
                Some(id) => clinic.payment_request(&id, &config.payee_id, &config.payee_name)?,
                None => UpiPaymentRequest::for_clinic(&config.payee_id, &config.payee_name),
            };
            match request.amount {
                Some(amount) => println!("Amount: {}", format_amount(amount)),
                None => println!("Pay {} ({})", config.payee_name, config.payee_id),
            }
            println!("{}", request.to_uri());
            println!("{}", request.qr_image_url(config.qr_size));
            if let Some(path) = svg {
                std::fs::write(&path, request.qr_svg()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("QR code written to {}", path.display());
            }
        }
    }

    Ok(())
}

fn report(notice: &Notice) {
    println!("{}: {}", notice.title, notice.description);
    if let Some(warning) = &notice.persist_warning {
        eprintln!("warning: {}", warning);
    }
}

fn print_bill(bill: &Billing, patient_name: &str) {
    println!(
        "{}  {}  {}  {}  cost {}  paid {}  [{}]",
        bill.id,
        bill.date,
        patient_name,
        bill.service,
        format_amount(bill.cost),
        format_amount(bill.paid_amount),
        bill.status()
    );
}
