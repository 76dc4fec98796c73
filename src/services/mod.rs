// Service layer: business rules between the IPC commands and `AgentDb`.
//
// Every function takes the database handle explicitly and returns
// `AppError`, so commands, the export binary and tests share one code path.

pub mod daily_notes;
pub mod hierarchy;
pub mod identity;
pub mod panchayaths;
pub mod performance;
pub mod roles;
pub mod teams;
pub mod testimonials;
pub mod todos;

use crate::db::{AgentDb, DbPanchayath};
use crate::error::AppError;

/// Load a panchayath or fail with `NotFound`.
pub(crate) fn require_panchayath(db: &AgentDb, id: &str) -> Result<DbPanchayath, AppError> {
    db.get_panchayath(id)?
        .ok_or_else(|| AppError::not_found("Panchayath", id))
}

/// Reject destructive calls the UI has not confirmed.
pub(crate) fn require_confirmation(confirmed: bool) -> Result<(), AppError> {
    if confirmed {
        Ok(())
    } else {
        Err(AppError::validation("Deletion must be confirmed"))
    }
}
