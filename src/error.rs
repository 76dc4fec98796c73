//! Error types for service operations
//!
//! Errors are classified by what the user can do about them:
//! - Validation: fix the form input and resubmit
//! - Conflict: the record clashes with an existing one (mobile, ward, name)
//! - NotFound / NotRegistered: the referenced record does not exist
//! - Internal: store or configuration failure, logged with a generic message

use thiserror::Error;

use crate::db::DbError;

/// Error type for everything above the `db` layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("This mobile number is already registered in {table}")]
    DuplicateMobile { table: String },

    #[error("That ward already has a coordinator in this panchayath")]
    WardTaken,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot delete {entity}: {detail}")]
    HasDependents { entity: &'static str, detail: String },

    #[error("Mobile number {0} is not registered")]
    NotRegistered(String),

    #[error("Database error: {0}")]
    Db(DbError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            AppError::Validation(_) => ErrorType::Validation,
            AppError::DuplicateMobile { .. }
            | AppError::WardTaken
            | AppError::Conflict(_)
            | AppError::HasDependents { .. } => ErrorType::Conflict,
            AppError::NotFound { .. } | AppError::NotRegistered(_) => ErrorType::NotFound,
            AppError::Db(_) | AppError::Config(_) => ErrorType::Internal,
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Correct the highlighted fields and submit again.",
            AppError::DuplicateMobile { .. } => {
                "Use a different mobile number or edit the existing record."
            }
            AppError::WardTaken => "Pick another ward or edit the existing coordinator.",
            AppError::Conflict(_) => "Choose a different name.",
            AppError::NotFound { .. } => "Refresh the list; the record may have been deleted.",
            AppError::HasDependents { .. } => "Reassign or delete the dependent records first.",
            AppError::NotRegistered(_) => "Ask an administrator to register this mobile number.",
            AppError::Db(_) => "Try again. If the problem persists, restart the app.",
            AppError::Config(_) => "Check your configuration in ~/.panchayath/config.json",
        }
    }
}

/// Map a SQLite constraint message to a user-facing error.
///
/// SQLite reports unique violations as
/// `UNIQUE constraint failed: <table>.<column>[, <table>.<column>...]`.
pub fn classify_constraint(message: &str) -> Option<AppError> {
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let (table, column) = first.split_once('.')?;

    match (table, column) {
        (_, "mobile_number") => Some(AppError::DuplicateMobile {
            table: table.to_string(),
        }),
        ("coordinators", "panchayath_id") | ("coordinators", "ward") => Some(AppError::WardTaken),
        ("teams", "name") => Some(AppError::Conflict("A team with this name".to_string())),
        ("team_members", _) => Some(AppError::Conflict(
            "A member with this mobile number in the team".to_string(),
        )),
        ("supervisor_wards", _) => Some(AppError::validation("Each ward may only be listed once")),
        _ => None,
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        if let DbError::Sqlite(rusqlite::Error::SqliteFailure(code, Some(msg))) = &err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                if let Some(mapped) = classify_constraint(msg) {
                    return mapped;
                }
            }
        }
        AppError::Db(err)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::from(DbError::from(err))
    }
}

/// Serializable error representation for IPC
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub message: String,
    pub error_type: ErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

impl From<&AppError> for CommandError {
    fn from(err: &AppError) -> Self {
        let error_type = err.error_type();
        let message = match error_type {
            ErrorType::Internal => {
                log::error!("{err}");
                "Something went wrong. Please try again.".to_string()
            }
            _ => err.to_string(),
        };
        CommandError {
            message,
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        CommandError::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mobile_names_table() {
        let err = classify_constraint("UNIQUE constraint failed: coordinators.mobile_number").unwrap();
        assert!(matches!(&err, AppError::DuplicateMobile { table } if table == "coordinators"));
        assert!(err.to_string().contains("coordinators"));
    }

    #[test]
    fn test_classify_composite_ward_key() {
        let err = classify_constraint(
            "UNIQUE constraint failed: coordinators.panchayath_id, coordinators.ward",
        )
        .unwrap();
        assert!(matches!(err, AppError::WardTaken));
    }

    #[test]
    fn test_classify_unknown_is_none() {
        assert!(classify_constraint("NOT NULL constraint failed: pros.name").is_none());
        assert!(classify_constraint("UNIQUE constraint failed: todos.id").is_none());
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = AppError::Db(DbError::Migration("boom".to_string()));
        let cmd = CommandError::from(&err);
        assert_eq!(cmd.error_type, ErrorType::Internal);
        assert!(!cmd.message.contains("boom"));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let cmd = CommandError::from(AppError::validation("Name is required"));
        assert_eq!(cmd.message, "Name is required");
        assert_eq!(cmd.error_type, ErrorType::Validation);
    }

    #[test]
    fn test_real_constraint_violation_is_classified() {
        let db = crate::db::test_utils::test_db();
        crate::db::test_utils::panchayath(&db, "p1", "Kadirur", 5);
        let insert = "INSERT INTO coordinators (id, panchayath_id, name, mobile_number, ward, created_at, updated_at)
                      VALUES (?1, 'p1', 'Asha', '9876543210', ?2, 'x', 'x')";
        db.conn_ref().execute(insert, rusqlite::params!["c1", 1]).unwrap();
        let raw = db
            .conn_ref()
            .execute(insert, rusqlite::params!["c2", 2])
            .unwrap_err();
        let err = AppError::from(raw);
        assert!(matches!(&err, AppError::DuplicateMobile { table } if table == "coordinators"));
    }
}
