//! SQLite-backed entity store for panchayaths, field agents and their records.
//!
//! The database lives at `~/.panchayath/panchayath.db` unless the config
//! names another path. Every screen reads and writes through `AgentDb`;
//! the methods here bind parameters and decode rows into typed records and
//! carry no business rules beyond that.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

pub mod types;
pub use types::*;

mod agents;
mod daily_notes;
mod hierarchy;
mod officers;
mod panchayaths;
mod roles;
mod teams;
mod testimonials;
mod todos;

pub use panchayaths::PanchayathDependents;

pub struct AgentDb {
    conn: Connection,
}

impl AgentDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DbError::from)?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT").map_err(DbError::from)?;
                Ok(val)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    log::error!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    /// Open (or create) the database and apply the schema.
    ///
    /// `path_override` comes from the config; `None` uses
    /// `~/.panchayath/panchayath.db`.
    pub fn open(path_override: Option<&Path>) -> Result<Self, DbError> {
        let path = match path_override {
            Some(p) => p.to_path_buf(),
            None => Self::db_path()?,
        };
        Self::open_at(path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        log::info!("Opened database at {}", path.display());
        Ok(Self { conn })
    }

    /// Open a database at an explicit path in read-only mode. Used by the
    /// export binary so it can run alongside the desktop app.
    pub fn open_readonly_at(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.panchayath/panchayath.db`.
    pub fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".panchayath").join("panchayath.db"))
    }
}


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;

    #[test]
    fn test_open_creates_schema() {
        let db = test_db();
        let count: i64 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM panchayaths", [], |row| row.get(0))
            .expect("panchayaths table should exist");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = test_db();
        let err = db.conn_ref().execute(
            "INSERT INTO coordinators (id, panchayath_id, name, mobile_number, ward, created_at, updated_at)
             VALUES ('c1', 'missing', 'Asha', '9876543210', 1, 'x', 'x')",
            [],
        );
        assert!(err.is_err(), "orphan coordinator must be rejected");
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = test_db();
        let result: Result<(), DbError> = db.with_transaction(|tx| {
            panchayath(tx, "p1", "Kadirur", 5);
            Err(DbError::Migration("forced".to_string()))
        });
        assert!(result.is_err());
        assert!(db.get_panchayath("p1").unwrap().is_none());
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = test_db();
        let result: Result<(), DbError> = db.with_transaction(|tx| {
            panchayath(tx, "p1", "Kadirur", 5);
            Ok(())
        });
        assert!(result.is_ok());
        assert!(db.get_panchayath("p1").unwrap().is_some());
    }
}
