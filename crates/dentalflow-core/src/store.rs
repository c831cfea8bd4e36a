//! Persistence bridge between in-memory collections and a key-value store.
//!
//! Each collection lives under a fixed key as a JSON array. Reads never fail:
//! a missing or unreadable collection falls back to the caller's default.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::db::{Database, DbError};

pub const PATIENTS_KEY: &str = "patients";
pub const BILLING_KEY: &str = "billing";
pub const APPOINTMENTS_KEY: &str = "appointments";

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Text storage keyed by collection name.
pub trait KeyValueStore {
    /// Serialized text for `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the text for `key`.
    fn save(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

impl KeyValueStore for Database {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get_value(key)?)
    }

    fn save(&mut self, key: &str, value: &str) -> StoreResult<()> {
        Ok(self.put_value(key, value)?)
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-existing values, e.g. data written by an older version.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Decode a JSON array into records.
pub fn decode<T: DeserializeOwned>(text: &str) -> StoreResult<Vec<T>> {
    Ok(serde_json::from_str(text)?)
}

/// Encode records as a JSON array.
pub fn encode<T: Serialize>(items: &[T]) -> StoreResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Load a collection, using `fallback` when it is absent or unreadable.
pub fn load_collection<S, T, F>(store: &S, key: &str, fallback: F) -> Vec<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    match store.load(key) {
        Ok(Some(text)) => match decode(&text) {
            Ok(items) => {
                tracing::debug!(key, "loaded persisted collection");
                items
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "could not parse persisted collection, using seed data");
                fallback()
            }
        },
        Ok(None) => {
            tracing::debug!(key, "nothing persisted, using seed data");
            fallback()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read persisted collection, using seed data");
            fallback()
        }
    }
}

/// Encode and write a collection.
pub fn save_collection<S, T>(store: &mut S, key: &str, items: &[T]) -> StoreResult<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let text = encode(items)?;
    store.save(key, &text)?;
    tracing::debug!(key, count = items.len(), "saved collection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Billing, Patient, PaymentStatus};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn load(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }

        fn save(&mut self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let mut store = MemoryStore::new();
        let bills = crate::seed::billing();
        save_collection(&mut store, BILLING_KEY, &bills).unwrap();

        let loaded: Vec<Billing> = load_collection(&store, BILLING_KEY, Vec::new);
        assert_eq!(loaded, bills);
    }

    #[test]
    fn test_database_round_trip() {
        let mut db = Database::open_in_memory().unwrap();
        let patients = crate::seed::patients();
        save_collection(&mut db, PATIENTS_KEY, &patients).unwrap();

        let loaded: Vec<Patient> = load_collection(&db, PATIENTS_KEY, Vec::new);
        assert_eq!(loaded, patients);
    }

    #[test]
    fn test_missing_key_uses_fallback() {
        let store = MemoryStore::new();
        let loaded: Vec<Patient> = load_collection(&store, PATIENTS_KEY, crate::seed::patients);
        assert_eq!(loaded.len(), 5);
    }

    #[test]
    fn test_corrupt_value_uses_fallback() {
        let store = MemoryStore::with_entries([(PATIENTS_KEY, "{not json")]);
        let loaded: Vec<Patient> = load_collection(&store, PATIENTS_KEY, crate::seed::patients);
        assert_eq!(loaded, crate::seed::patients());
    }

    #[test]
    fn test_read_failure_uses_fallback() {
        let loaded: Vec<Billing> = load_collection(&BrokenStore, BILLING_KEY, crate::seed::billing);
        assert_eq!(loaded.len(), 5);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let result = save_collection(&mut BrokenStore, BILLING_KEY, &crate::seed::billing());
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_legacy_billing_is_default_filled() {
        let legacy = r#"[
            {"id":"b1","patientId":"1","service":"Routine Check-up & Cleaning","cost":150,"status":"Paid","date":"2024-05-20T10:00:00Z"},
            {"id":"b5","patientId":"4","service":"Teeth Whitening","cost":300,"status":"Partially Paid","date":"2024-06-01T11:00:00Z"}
        ]"#;
        let store = MemoryStore::with_entries([(BILLING_KEY, legacy)]);
        let loaded: Vec<Billing> = load_collection(&store, BILLING_KEY, Vec::new);

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].paid_amount, 150.0);
        assert_eq!(loaded[0].status(), PaymentStatus::Paid);
        assert_eq!(loaded[1].paid_amount, 0.0);
        assert_eq!(loaded[1].status(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_saved_layout_is_camel_case() {
        let mut store = MemoryStore::new();
        save_collection(&mut store, BILLING_KEY, &crate::seed::billing()).unwrap();
        let text = store.get(BILLING_KEY).unwrap();
        assert!(text.contains("\"patientId\""));
        assert!(text.contains("\"paidAmount\""));
        assert!(text.contains("\"status\":\"Partially Paid\""));
    }
}
