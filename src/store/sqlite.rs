//! SQLite-backed reminder store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};
use tracing::debug;

use super::schema::{apply_schema, read_schema_version};
use super::{Reminder, StoreError};

/// Append-only reminder log.
///
/// Thread-safe via an internal `Mutex<Connection>`; the turn loop and the
/// CLI share one instance behind an `Arc`.
pub struct ReminderStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for ReminderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ReminderStore {
    /// Open (or create) the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory or database cannot be created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        debug!("opened reminder store at {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if SQLite cannot initialise.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Database file path, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Schema version stamped in the database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on query failure.
    pub fn schema_version(&self) -> Result<Option<u32>, StoreError> {
        let conn = self.lock()?;
        Ok(read_schema_version(&conn)?)
    }

    /// Append a reminder and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails.
    pub fn add(&self, fire_spec: &str, message: &str) -> Result<Reminder, StoreError> {
        let conn = self.lock()?;
        let created_at = now_epoch_secs();
        conn.execute(
            "INSERT INTO reminders (time_text, message, created_at) VALUES (?1, ?2, ?3)",
            params![fire_spec, message, created_at as i64],
        )?;
        let id = conn.last_insert_rowid();
        debug!("stored reminder {id}");
        Ok(Reminder {
            id,
            fire_spec: fire_spec.to_owned(),
            message: message.to_owned(),
            created_at,
        })
    }

    /// All reminders in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on query failure.
    pub fn list(&self) -> Result<Vec<Reminder>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, time_text, message, created_at FROM reminders ORDER BY id ASC")?;
        let rows = stmt.query_map([], row_to_reminder)?;

        let mut reminders = Vec::new();
        for r in rows {
            reminders.push(r?);
        }
        Ok(reminders)
    }

    /// Number of stored reminders.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on query failure.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM reminders", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    let created_at: i64 = row.get(3)?;
    Ok(Reminder {
        id: row.get(0)?,
        fire_spec: row.get(1)?,
        message: row.get(2)?,
        created_at: u64::try_from(created_at).unwrap_or(0),
    })
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::store::DB_FILENAME;
    use std::sync::Arc;

    #[test]
    fn add_then_list_in_insertion_order() {
        let store = ReminderStore::open_in_memory().unwrap();
        let first = store.add("3 pm", "call mom").unwrap();
        let second = store.add("9 am", "water plants").unwrap();
        assert!(second.id > first.id);

        let all = store.list().unwrap();
        assert_eq!(all, vec![first, second]);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn created_at_is_stamped() {
        let store = ReminderStore::open_in_memory().unwrap();
        let reminder = store.add("noon", "lunch").unwrap();
        assert!(reminder.created_at > 0);
        assert_eq!(store.list().unwrap()[0].created_at, reminder.created_at);
    }

    #[test]
    fn rows_survive_reopen() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join(DB_FILENAME);

        {
            let store = ReminderStore::open(&path).unwrap();
            store.add("7 am", "stretch").unwrap();
        }

        let store = ReminderStore::open(&path).unwrap();
        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].fire_spec, "7 am");
        assert_eq!(all[0].message, "stretch");
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.schema_version().unwrap(), Some(1));
    }

    #[test]
    fn unparseable_time_text_is_stored_verbatim() {
        let store = ReminderStore::open_in_memory().unwrap();
        store.add("whenever", "someday").unwrap();
        assert_eq!(store.list().unwrap()[0].fire_spec, "whenever");
    }

    #[test]
    fn concurrent_appends_all_land() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.add("9 am", &format!("task {i}")).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count().unwrap(), 4);
    }
}
