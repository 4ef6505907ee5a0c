use rusqlite::Connection;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::StoreError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slot, remembered with the path it was opened for.
thread_local! {
    static DB_CONN: RefCell<Option<(PathBuf, Connection)>> = RefCell::new(None);
}

#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provides a mutable connection to the closure, opening one for this
    /// thread on first use.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                let stale = !matches!(slot.as_ref(), Some((p, _)) if *p == self.path);
                if stale {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| StoreError::DbError(format!("Open DB failed: {e}")))?;
                    *slot = Some((self.path.clone(), conn));
                }
                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(StoreError::InternalError),
                }
            })
            .map_err(|_| StoreError::InternalError)?
    }
}

/// Applies the embedded schema. Safe to run against an existing database.
pub fn init_db(db: &Database) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| StoreError::DbError(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    info!("✅ Database ready at {}", db.path().display());
    Ok(())
}
