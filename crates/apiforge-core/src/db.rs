use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

use crate::config::project_dirs;

/// Returns the path to the apiforge database.
/// Location: `~/.local/share/apiforge/apiforge.db` (XDG-compliant)
pub fn db_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("apiforge.db"))
}

/// Opens (or creates) the SQLite database and returns the connection.
/// Enables WAL mode for better concurrent read performance.
pub fn open_db() -> Result<Connection> {
    let path = db_path()?;
    let conn = Connection::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Entries cascade with their action / datasource
    conn.pragma_update(None, "foreign_keys", "ON")?;

    tracing::debug!(path = %path.display(), "opened database");
    Ok(conn)
}

/// Open an in-memory database for testing.
pub fn open_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}
