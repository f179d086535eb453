//! Key-value storage on SQLite
//!
//! The web client kept its state in `localStorage`; the desktop client keeps the
//! same keys and JSON values in a single `local_storage` table so data written
//! by either side can be read by the other.

use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;

pub const KEY_THEME: &str = "theme";
pub const KEY_USER_STATS: &str = "iceq_user_stats";
pub const KEY_FAVORITE_BOOKS: &str = "favoriteBooks";
pub const KEY_USER_RATINGS: &str = "userRatings";
pub const KEY_GENERATED_TEST: &str = "iceq_generated_test";
pub const KEY_CURRENT_TEST: &str = "iceq_current_test";
pub const KEY_TEST_FOR_EDIT: &str = "iceq_test_for_edit";

/// Opens (or creates) the store file and makes sure the table exists.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// In-memory store, used by tests and as a fallback when the file cannot be opened.
pub fn init_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;
    Ok(())
}

pub fn get_item(key: &str, conn: &Connection) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_item(key: &str, value: &str, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn remove_item(key: &str, conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
    Ok(())
}

pub fn clear(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM local_storage", ())?;
    Ok(())
}

pub fn keys(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT key FROM local_storage ORDER BY key")?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_item() {
        let conn = init_in_memory().unwrap();
        set_item(KEY_THEME, "light", &conn).unwrap();

        assert_eq!(get_item(KEY_THEME, &conn).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_set_item_overwrites() {
        let conn = init_in_memory().unwrap();
        set_item(KEY_THEME, "light", &conn).unwrap();
        set_item(KEY_THEME, "dark", &conn).unwrap();

        assert_eq!(get_item(KEY_THEME, &conn).unwrap().as_deref(), Some("dark"));
        assert_eq!(keys(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_key_is_none() {
        let conn = init_in_memory().unwrap();
        assert_eq!(get_item("nope", &conn).unwrap(), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let conn = init_in_memory().unwrap();
        set_item(KEY_CURRENT_TEST, "{}", &conn).unwrap();
        set_item(KEY_GENERATED_TEST, "{}", &conn).unwrap();

        remove_item(KEY_CURRENT_TEST, &conn).unwrap();
        assert_eq!(keys(&conn).unwrap(), vec![KEY_GENERATED_TEST.to_string()]);

        clear(&conn).unwrap();
        assert!(keys(&conn).unwrap().is_empty());
    }
}
