//! Runtime configuration.
//!
//! Resolved once at startup and passed into the session, so nothing reads the
//! process environment while handling a request.

use std::path::PathBuf;

use crate::payment::DEFAULT_QR_SIZE;

pub const DB_PATH_VAR: &str = "DENTALFLOW_DB";
pub const UPI_ID_VAR: &str = "DENTALFLOW_UPI_ID";
pub const PAYEE_NAME_VAR: &str = "DENTALFLOW_PAYEE_NAME";
pub const QR_SIZE_VAR: &str = "DENTALFLOW_QR_SIZE";

const DEFAULT_DB_PATH: &str = "dentalflow.db";
const DEFAULT_UPI_ID: &str = "clinic@upi";
const DEFAULT_PAYEE_NAME: &str = "DentalFlow";

/// Clinic configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicConfig {
    /// SQLite file holding the persisted collections
    pub db_path: PathBuf,
    /// UPI address payments are requested to
    pub payee_id: String,
    /// Payee name shown in the payer's app
    pub payee_name: String,
    /// QR image edge in pixels
    pub qr_size: u32,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            payee_id: DEFAULT_UPI_ID.to_string(),
            payee_name: DEFAULT_PAYEE_NAME.to_string(),
            qr_size: DEFAULT_QR_SIZE,
        }
    }
}

impl ClinicConfig {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from a variable lookup. Blank values and an unparseable QR size fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let qr_size = match get(QR_SIZE_VAR).map(|v| v.parse::<u32>()) {
            Some(Ok(size)) if size > 0 => size,
            Some(_) => {
                tracing::warn!(var = QR_SIZE_VAR, "ignoring invalid QR size");
                defaults.qr_size
            }
            None => defaults.qr_size,
        };

        Self {
            db_path: get(DB_PATH_VAR).map(PathBuf::from).unwrap_or(defaults.db_path),
            payee_id: get(UPI_ID_VAR).unwrap_or(defaults.payee_id),
            payee_name: get(PAYEE_NAME_VAR).unwrap_or(defaults.payee_name),
            qr_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClinicConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClinicConfig::default());
        assert_eq!(config.qr_size, 250);
    }

    #[test]
    fn test_overrides() {
        let config = ClinicConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, "/tmp/clinic.db"),
            (UPI_ID_VAR, "dr@okaxis"),
            (PAYEE_NAME_VAR, "Dr. Smile"),
            (QR_SIZE_VAR, "300"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/clinic.db"));
        assert_eq!(config.payee_id, "dr@okaxis");
        assert_eq!(config.payee_name, "Dr. Smile");
        assert_eq!(config.qr_size, 300);
    }

    #[test]
    fn test_blank_and_invalid_fall_back() {
        let config = ClinicConfig::from_lookup(lookup(&[(UPI_ID_VAR, "  "), (QR_SIZE_VAR, "big")]));
        assert_eq!(config.payee_id, "clinic@upi");
        assert_eq!(config.qr_size, 250);
    }
}
