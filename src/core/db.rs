use crate::core::error;
use crate::core::schemas;
use crate::core::store::Store;
use rusqlite::{Connection, OptionalExtension};
use std::fs;

pub fn db_connect(db_path: &str) -> Result<Connection, error::PlushyError> {
    db_connect_pooled(db_path, 5)
}

pub fn db_connect_pooled(
    db_path: &str,
    busy_timeout_secs: u32,
) -> Result<Connection, error::PlushyError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(u64::from(busy_timeout_secs)))
        .map_err(error::PlushyError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::PlushyError::RusqliteError)?;
    Ok(conn)
}

/// Create the data directory and bring the inventory schema up to date.
pub fn initialize_inventory_db(store: &Store) -> Result<(), error::PlushyError> {
    fs::create_dir_all(store.root()).map_err(error::PlushyError::IoError)?;
    let conn = db_connect(&store.db_path().to_string_lossy())?;
    ensure_schema(&conn)
}

pub fn ensure_schema(conn: &Connection) -> Result<(), error::PlushyError> {
    conn.execute(schemas::INVENTORY_DB_SCHEMA_META, [])?;

    let current: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(error::PlushyError::RusqliteError)?;

    let current_version: u32 = current
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0);

    if current_version >= schemas::INVENTORY_SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute(schemas::INVENTORY_DB_SCHEMA_CATEGORIES, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_FABRICS, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_COLORS, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_BAGS, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_INDEX_BAGS_CATEGORY, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_INDEX_BAGS_FABRIC, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_INDEX_BAGS_COLOR, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_INDEX_BAGS_PRICE, [])?;
    conn.execute(schemas::INVENTORY_DB_SCHEMA_INDEX_COLORS_ORDER, [])?;

    conn.execute(
        "INSERT INTO meta(key, value) VALUES('schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [schemas::INVENTORY_SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}
