//! SQLite DDL for the reminder log.

use rusqlite::Connection;

/// Current schema version stamped into `schema_meta`.
pub(crate) const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reminders (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    time_text  TEXT NOT NULL,
    message    TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT 0
);
"#;

/// Apply the schema and seed the version row on a fresh database.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

/// Returns `None` if the version row is missing or unreadable.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_meta WHERE key = 'schema_version'")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().ok())
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_schema_creates_tables() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        apply_schema(&conn).expect("apply_schema");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .expect("prepare")
            .query_map([], |row| row.get(0))
            .expect("query")
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"reminders".to_owned()));
        assert!(tables.contains(&"schema_meta".to_owned()));
    }

    #[test]
    fn apply_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        apply_schema(&conn).expect("first");
        apply_schema(&conn).expect("second");
        assert_eq!(
            read_schema_version(&conn).expect("version"),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }

    #[test]
    fn missing_version_reads_as_none() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch("CREATE TABLE schema_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);")
            .expect("create");
        assert_eq!(read_schema_version(&conn).expect("read"), None);
    }
}
