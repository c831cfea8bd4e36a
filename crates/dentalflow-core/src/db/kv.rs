//! Key-value database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

impl Database {
    /// Get the stored value for a key.
    pub fn get_value(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Insert or overwrite the value for a key.
    pub fn put_value(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert_eq!(db.get_value("billing").unwrap(), None);
    }

    #[test]
    fn test_put_and_overwrite() {
        let db = setup_db();

        db.put_value("billing", "[]").unwrap();
        assert_eq!(db.get_value("billing").unwrap(), Some("[]".to_string()));

        db.put_value("billing", r#"[{"id":"b1"}]"#).unwrap();
        assert_eq!(
            db.get_value("billing").unwrap(),
            Some(r#"[{"id":"b1"}]"#.to_string())
        );
    }
}
