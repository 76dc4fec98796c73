// Role service: create/update/delete for coordinators, supervisors, group
// leaders and PROs, plus the parent pickers the role forms load.
//
// Order of checks on every write: form validation, parent existence and
// scope, cross-table mobile uniqueness, then the insert. Store constraint
// failures that slip past the pre-checks are classified by `AppError::from`.

use crate::db::{AgentDb, DbCoordinator, DbGroupLeader, DbPro, DbSupervisor};
use crate::error::AppError;
use crate::forms::{CoordinatorForm, GroupLeaderForm, ProForm, SupervisorForm};
use crate::util::{new_id, now_rfc3339};

use super::{require_confirmation, require_panchayath};

/// Fail with `DuplicateMobile` naming the table that already holds `mobile`.
/// Admin team members are checked after the four role tables, matching the
/// sign-in precedence. `exclude_id` is the row being edited.
pub fn ensure_mobile_free(
    db: &AgentDb,
    mobile: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let (table, holder) = match db.find_mobile_owner(mobile, exclude_id)? {
        Some(owner) => (owner.role.table(), owner.id),
        None => match db.get_team_member_by_mobile(mobile)? {
            Some(member) if exclude_id != Some(member.id.as_str()) => ("team_members", member.id),
            _ => return Ok(()),
        },
    };
    log::info!("Rejected mobile {} already held in {} by {}", mobile, table, holder);
    Err(AppError::DuplicateMobile {
        table: table.to_string(),
    })
}

fn ensure_same_panchayath(
    parent_label: &str,
    parent_panchayath: &str,
    panchayath_id: &str,
) -> Result<(), AppError> {
    if parent_panchayath != panchayath_id {
        return Err(AppError::validation(format!(
            "The selected {parent_label} belongs to a different panchayath"
        )));
    }
    Ok(())
}

// =============================================================================
// Coordinators
// =============================================================================

fn ensure_ward_free(
    db: &AgentDb,
    panchayath_id: &str,
    ward: u32,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let taken = db
        .get_coordinators_for_panchayath(panchayath_id)?
        .into_iter()
        .any(|c| c.ward == ward && exclude_id != Some(c.id.as_str()));
    if taken {
        return Err(AppError::WardTaken);
    }
    Ok(())
}

pub fn create_coordinator(db: &AgentDb, form: &CoordinatorForm) -> Result<DbCoordinator, AppError> {
    let panchayath = require_panchayath(db, form.panchayath_id.trim())?;
    let form = form.validate(panchayath.number_of_wards)?;
    ensure_ward_free(db, &form.panchayath_id, form.ward, None)?;
    ensure_mobile_free(db, &form.mobile_number, None)?;

    let now = now_rfc3339();
    let row = DbCoordinator {
        id: new_id(),
        panchayath_id: form.panchayath_id,
        name: form.name,
        mobile_number: form.mobile_number,
        ward: form.ward,
        rating: form.rating,
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_coordinator(&row)?;
    log::info!("Created coordinator {} for ward {}", row.id, row.ward);
    Ok(row)
}

pub fn update_coordinator(
    db: &AgentDb,
    id: &str,
    form: &CoordinatorForm,
) -> Result<DbCoordinator, AppError> {
    let existing = get_coordinator(db, id)?;
    let panchayath = require_panchayath(db, form.panchayath_id.trim())?;
    let form = form.validate(panchayath.number_of_wards)?;

    if form.panchayath_id != existing.panchayath_id
        && db.count_supervisors_for_coordinator(id)? > 0
    {
        return Err(AppError::validation(
            "Move this coordinator's supervisors before changing panchayath",
        ));
    }
    ensure_ward_free(db, &form.panchayath_id, form.ward, Some(id))?;
    ensure_mobile_free(db, &form.mobile_number, Some(id))?;

    let row = DbCoordinator {
        panchayath_id: form.panchayath_id,
        name: form.name,
        mobile_number: form.mobile_number,
        ward: form.ward,
        rating: form.rating,
        updated_at: now_rfc3339(),
        ..existing
    };
    db.update_coordinator(&row)?;
    Ok(row)
}

pub fn get_coordinator(db: &AgentDb, id: &str) -> Result<DbCoordinator, AppError> {
    db.get_coordinator(id)?
        .ok_or_else(|| AppError::not_found("Coordinator", id))
}

pub fn list_coordinators(db: &AgentDb, panchayath_id: &str) -> Result<Vec<DbCoordinator>, AppError> {
    Ok(db.get_coordinators_for_panchayath(panchayath_id)?)
}

pub fn delete_coordinator(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    let existing = get_coordinator(db, id)?;
    let supervisors = db.count_supervisors_for_coordinator(id)?;
    if supervisors > 0 {
        return Err(AppError::HasDependents {
            entity: "coordinator",
            detail: format!("{} still has {} supervisors", existing.name, supervisors),
        });
    }
    db.delete_coordinator(id)?;
    Ok(())
}

// =============================================================================
// Supervisors
// =============================================================================

fn load_supervisor_parent(
    db: &AgentDb,
    form: &SupervisorForm,
) -> Result<SupervisorForm, AppError> {
    let panchayath = require_panchayath(db, form.panchayath_id.trim())?;
    let form = form.validate(panchayath.number_of_wards)?;
    let coordinator = get_coordinator(db, &form.coordinator_id)?;
    ensure_same_panchayath("coordinator", &coordinator.panchayath_id, &form.panchayath_id)?;
    Ok(form)
}

pub fn create_supervisor(db: &AgentDb, form: &SupervisorForm) -> Result<DbSupervisor, AppError> {
    let form = load_supervisor_parent(db, form)?;
    ensure_mobile_free(db, &form.mobile_number, None)?;

    let now = now_rfc3339();
    let row = DbSupervisor {
        id: new_id(),
        panchayath_id: form.panchayath_id,
        coordinator_id: form.coordinator_id,
        name: form.name,
        mobile_number: form.mobile_number,
        wards: form.wards,
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_supervisor(&row)?;
    log::info!("Created supervisor {} covering wards {:?}", row.id, row.wards);
    Ok(row)
}

/// Update a supervisor. Dropping a ward that one of its group leaders works
/// in is refused.
pub fn update_supervisor(
    db: &AgentDb,
    id: &str,
    form: &SupervisorForm,
) -> Result<DbSupervisor, AppError> {
    let existing = get_supervisor(db, id)?;
    let form = load_supervisor_parent(db, form)?;

    let leaders: Vec<DbGroupLeader> = db
        .get_group_leaders_for_panchayath(&existing.panchayath_id)?
        .into_iter()
        .filter(|g| g.supervisor_id == id)
        .collect();
    if form.panchayath_id != existing.panchayath_id && !leaders.is_empty() {
        return Err(AppError::validation(
            "Move this supervisor's group leaders before changing panchayath",
        ));
    }
    if let Some(orphan) = leaders.iter().find(|g| !form.wards.contains(&g.ward)) {
        return Err(AppError::validation(format!(
            "Ward {} is still worked by group leader {}",
            orphan.ward, orphan.name
        )));
    }
    ensure_mobile_free(db, &form.mobile_number, Some(id))?;

    let row = DbSupervisor {
        panchayath_id: form.panchayath_id,
        coordinator_id: form.coordinator_id,
        name: form.name,
        mobile_number: form.mobile_number,
        wards: form.wards,
        updated_at: now_rfc3339(),
        ..existing
    };
    db.update_supervisor(&row)?;
    Ok(row)
}

pub fn get_supervisor(db: &AgentDb, id: &str) -> Result<DbSupervisor, AppError> {
    db.get_supervisor(id)?
        .ok_or_else(|| AppError::not_found("Supervisor", id))
}

pub fn list_supervisors(db: &AgentDb, panchayath_id: &str) -> Result<Vec<DbSupervisor>, AppError> {
    Ok(db.get_supervisors_for_panchayath(panchayath_id)?)
}

pub fn delete_supervisor(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    let existing = get_supervisor(db, id)?;
    let leaders = db.count_group_leaders_for_supervisor(id)?;
    if leaders > 0 {
        return Err(AppError::HasDependents {
            entity: "supervisor",
            detail: format!("{} still has {} group leaders", existing.name, leaders),
        });
    }
    db.delete_supervisor(id)?;
    Ok(())
}

// =============================================================================
// Group leaders
// =============================================================================

fn load_group_leader_parent(
    db: &AgentDb,
    form: &GroupLeaderForm,
) -> Result<GroupLeaderForm, AppError> {
    let panchayath = require_panchayath(db, form.panchayath_id.trim())?;
    let form = form.validate(panchayath.number_of_wards)?;
    let supervisor = get_supervisor(db, &form.supervisor_id)?;
    ensure_same_panchayath("supervisor", &supervisor.panchayath_id, &form.panchayath_id)?;
    if !supervisor.covers_ward(form.ward) {
        return Err(AppError::validation(format!(
            "Supervisor {} does not cover ward {}",
            supervisor.name, form.ward
        )));
    }
    Ok(form)
}

pub fn create_group_leader(db: &AgentDb, form: &GroupLeaderForm) -> Result<DbGroupLeader, AppError> {
    let form = load_group_leader_parent(db, form)?;
    ensure_mobile_free(db, &form.mobile_number, None)?;

    let now = now_rfc3339();
    let row = DbGroupLeader {
        id: new_id(),
        panchayath_id: form.panchayath_id,
        supervisor_id: form.supervisor_id,
        name: form.name,
        mobile_number: form.mobile_number,
        ward: form.ward,
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_group_leader(&row)?;
    Ok(row)
}

/// Update a group leader. Its ward is fixed while PROs work under it.
pub fn update_group_leader(
    db: &AgentDb,
    id: &str,
    form: &GroupLeaderForm,
) -> Result<DbGroupLeader, AppError> {
    let existing = get_group_leader(db, id)?;
    let form = load_group_leader_parent(db, form)?;

    let moved = form.ward != existing.ward || form.panchayath_id != existing.panchayath_id;
    if moved && db.count_pros_for_group_leader(id)? > 0 {
        return Err(AppError::validation(
            "Move this group leader's PROs before changing ward",
        ));
    }
    ensure_mobile_free(db, &form.mobile_number, Some(id))?;

    let row = DbGroupLeader {
        panchayath_id: form.panchayath_id,
        supervisor_id: form.supervisor_id,
        name: form.name,
        mobile_number: form.mobile_number,
        ward: form.ward,
        updated_at: now_rfc3339(),
        ..existing
    };
    db.update_group_leader(&row)?;
    Ok(row)
}

pub fn get_group_leader(db: &AgentDb, id: &str) -> Result<DbGroupLeader, AppError> {
    db.get_group_leader(id)?
        .ok_or_else(|| AppError::not_found("Group leader", id))
}

pub fn list_group_leaders(
    db: &AgentDb,
    panchayath_id: &str,
) -> Result<Vec<DbGroupLeader>, AppError> {
    Ok(db.get_group_leaders_for_panchayath(panchayath_id)?)
}

pub fn delete_group_leader(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    let existing = get_group_leader(db, id)?;
    let pros = db.count_pros_for_group_leader(id)?;
    if pros > 0 {
        return Err(AppError::HasDependents {
            entity: "group leader",
            detail: format!("{} still has {} PROs", existing.name, pros),
        });
    }
    db.delete_group_leader(id)?;
    Ok(())
}

// =============================================================================
// PROs
// =============================================================================

fn load_pro_parent(db: &AgentDb, form: &ProForm) -> Result<ProForm, AppError> {
    let panchayath = require_panchayath(db, form.panchayath_id.trim())?;
    let form = form.validate(panchayath.number_of_wards)?;
    let leader = get_group_leader(db, &form.group_leader_id)?;
    ensure_same_panchayath("group leader", &leader.panchayath_id, &form.panchayath_id)?;
    if leader.ward != form.ward {
        return Err(AppError::validation(format!(
            "Group leader {} works in ward {}, not ward {}",
            leader.name, leader.ward, form.ward
        )));
    }
    Ok(form)
}

pub fn create_pro(db: &AgentDb, form: &ProForm) -> Result<DbPro, AppError> {
    let form = load_pro_parent(db, form)?;
    ensure_mobile_free(db, &form.mobile_number, None)?;

    let now = now_rfc3339();
    let row = DbPro {
        id: new_id(),
        panchayath_id: form.panchayath_id,
        group_leader_id: form.group_leader_id,
        name: form.name,
        mobile_number: form.mobile_number,
        ward: form.ward,
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_pro(&row)?;
    Ok(row)
}

pub fn update_pro(db: &AgentDb, id: &str, form: &ProForm) -> Result<DbPro, AppError> {
    let existing = get_pro(db, id)?;
    let form = load_pro_parent(db, form)?;
    ensure_mobile_free(db, &form.mobile_number, Some(id))?;

    let row = DbPro {
        panchayath_id: form.panchayath_id,
        group_leader_id: form.group_leader_id,
        name: form.name,
        mobile_number: form.mobile_number,
        ward: form.ward,
        updated_at: now_rfc3339(),
        ..existing
    };
    db.update_pro(&row)?;
    Ok(row)
}

pub fn get_pro(db: &AgentDb, id: &str) -> Result<DbPro, AppError> {
    db.get_pro(id)?.ok_or_else(|| AppError::not_found("PRO", id))
}

pub fn list_pros(db: &AgentDb, panchayath_id: &str) -> Result<Vec<DbPro>, AppError> {
    Ok(db.get_pros_for_panchayath(panchayath_id)?)
}

pub fn delete_pro(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    get_pro(db, id)?;
    db.delete_pro(id)?;
    Ok(())
}

// =============================================================================
// Parent pickers
// =============================================================================

/// Coordinators a new supervisor can report to.
pub fn coordinator_options(db: &AgentDb, panchayath_id: &str) -> Result<Vec<DbCoordinator>, AppError> {
    require_panchayath(db, panchayath_id)?;
    Ok(db.get_coordinators_for_panchayath(panchayath_id)?)
}

/// Supervisors a group leader in `ward` can report to.
pub fn supervisor_options(
    db: &AgentDb,
    panchayath_id: &str,
    ward: u32,
) -> Result<Vec<DbSupervisor>, AppError> {
    require_panchayath(db, panchayath_id)?;
    Ok(db.get_supervisors_covering_ward(panchayath_id, ward)?)
}

/// Group leaders a PRO in `ward` can report to.
pub fn group_leader_options(
    db: &AgentDb,
    panchayath_id: &str,
    ward: u32,
) -> Result<Vec<DbGroupLeader>, AppError> {
    require_panchayath(db, panchayath_id)?;
    Ok(db.get_group_leaders_in_ward(panchayath_id, ward)?)
}
