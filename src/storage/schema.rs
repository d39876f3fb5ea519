//! Database schema for the feedback store.
//!
//! Creates the `Feedback` table from the bundled `sql/database.sql` script.

use crate::error::Result;
use rusqlite::Connection;

/// Schema creation script
pub const SCHEMA_SQL: &str = include_str!("../../sql/database.sql");

/// Run the schema script on an open connection
///
/// Safe to call multiple times (uses IF NOT EXISTS).
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    tracing::info!("Feedback database schema initialized");
    Ok(())
}
