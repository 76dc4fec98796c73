// Panchayath service: create/update/delete with ward-count and dependent checks.

use crate::db::{AgentDb, DbPanchayath};
use crate::error::AppError;
use crate::forms::{ward_options, PanchayathForm};
use crate::util::{new_id, now_rfc3339};

use super::{require_confirmation, require_panchayath};

pub fn create_panchayath(
    db: &AgentDb,
    form: &PanchayathForm,
    created_by: Option<&str>,
) -> Result<DbPanchayath, AppError> {
    let form = form.validate()?;
    let now = now_rfc3339();
    let row = DbPanchayath {
        id: new_id(),
        name: form.name,
        number_of_wards: form.number_of_wards,
        created_by: created_by.map(str::to_string),
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_panchayath(&row)?;
    log::info!("Created panchayath '{}' with {} wards", row.name, row.number_of_wards);
    Ok(row)
}

/// Rename a panchayath or change its ward count. The ward count cannot drop
/// below the highest ward an agent is assigned to.
pub fn update_panchayath(
    db: &AgentDb,
    id: &str,
    form: &PanchayathForm,
) -> Result<DbPanchayath, AppError> {
    let form = form.validate()?;
    let existing = require_panchayath(db, id)?;

    if let Some(max) = db.max_ward_in_use(id)? {
        if form.number_of_wards < max {
            return Err(AppError::validation(format!(
                "Ward {max} is still in use; the panchayath needs at least {max} wards"
            )));
        }
    }

    let row = DbPanchayath {
        name: form.name,
        number_of_wards: form.number_of_wards,
        updated_at: now_rfc3339(),
        ..existing
    };
    db.update_panchayath(&row)?;
    Ok(row)
}

pub fn get_panchayath(db: &AgentDb, id: &str) -> Result<DbPanchayath, AppError> {
    require_panchayath(db, id)
}

pub fn list_panchayaths(db: &AgentDb) -> Result<Vec<DbPanchayath>, AppError> {
    Ok(db.get_all_panchayaths()?)
}

/// Ward choices for role forms scoped to this panchayath.
pub fn panchayath_ward_options(db: &AgentDb, id: &str) -> Result<Vec<u32>, AppError> {
    Ok(ward_options(require_panchayath(db, id)?.number_of_wards))
}

/// Delete an empty panchayath. Refused while any agent still belongs to it.
pub fn delete_panchayath(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    let existing = require_panchayath(db, id)?;

    let deps = db.count_panchayath_dependents(id)?;
    if deps.total() > 0 {
        return Err(AppError::HasDependents {
            entity: "panchayath",
            detail: format!(
                "{} coordinators, {} supervisors, {} group leaders and {} PROs still belong to {}",
                deps.coordinators, deps.supervisors, deps.group_leaders, deps.pros, existing.name
            ),
        });
    }

    db.delete_panchayath(id)?;
    log::info!("Deleted panchayath '{}'", existing.name);
    Ok(())
}
