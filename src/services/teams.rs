// Admin teams, their members, and officers.

use crate::db::{AgentDb, DbOfficer, DbTeam, DbTeamMember};
use crate::error::AppError;
use crate::forms::validate_mobile;
use crate::util::{clean_name, new_id, non_empty, now_rfc3339};

use super::require_confirmation;

fn required_name(value: &str) -> Result<String, AppError> {
    let name = clean_name(value);
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    Ok(name)
}

pub fn create_team(db: &AgentDb, name: &str, description: Option<&str>) -> Result<DbTeam, AppError> {
    let team = DbTeam {
        id: new_id(),
        name: required_name(name)?,
        description: non_empty(description),
        created_at: now_rfc3339(),
    };
    db.insert_team(&team)?;
    Ok(team)
}

pub fn list_teams(db: &AgentDb) -> Result<Vec<DbTeam>, AppError> {
    Ok(db.get_teams()?)
}

/// Delete a team along with its member list.
pub fn delete_team(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    if !db.delete_team(id)? {
        return Err(AppError::not_found("Team", id));
    }
    Ok(())
}

pub fn add_team_member(
    db: &AgentDb,
    team_id: &str,
    name: &str,
    mobile: &str,
    role: Option<&str>,
) -> Result<DbTeamMember, AppError> {
    if !db.get_teams()?.iter().any(|t| t.id == team_id) {
        return Err(AppError::not_found("Team", team_id));
    }
    let name = required_name(name)?;
    let mobile_number = validate_mobile(mobile)?;
    super::roles::ensure_mobile_free(db, &mobile_number, None)?;
    let member = DbTeamMember {
        id: new_id(),
        team_id: team_id.to_string(),
        name,
        mobile_number,
        role: non_empty(role),
        created_at: now_rfc3339(),
    };
    db.insert_team_member(&member)?;
    Ok(member)
}

pub fn list_team_members(db: &AgentDb, team_id: &str) -> Result<Vec<DbTeamMember>, AppError> {
    Ok(db.get_team_members(team_id)?)
}

pub fn remove_team_member(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    if !db.delete_team_member(id)? {
        return Err(AppError::not_found("Team member", id));
    }
    Ok(())
}

pub fn add_officer(
    db: &AgentDb,
    name: &str,
    mobile: &str,
    designation: Option<&str>,
) -> Result<DbOfficer, AppError> {
    let now = now_rfc3339();
    let officer = DbOfficer {
        id: new_id(),
        name: required_name(name)?,
        mobile_number: validate_mobile(mobile)?,
        designation: non_empty(designation),
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_officer(&officer)?;
    Ok(officer)
}

pub fn list_officers(db: &AgentDb) -> Result<Vec<DbOfficer>, AppError> {
    Ok(db.get_officers()?)
}

pub fn delete_officer(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    if !db.delete_officer(id)? {
        return Err(AppError::not_found("Officer", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_team_name_conflict() {
        let db = test_db();
        create_team(&db, "Field Office", None).unwrap();
        let err = create_team(&db, "Field Office", Some("again")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_members_cascade_with_team() {
        let db = test_db();
        let team = create_team(&db, "Field Office", None).unwrap();
        add_team_member(&db, &team.id, "Ravi", "9123456789", Some("clerk")).unwrap();
        assert!(add_team_member(&db, "ghost", "Ravi", "9123456789", None).is_err());
        assert!(add_team_member(&db, &team.id, "Ravi", "12345", None).is_err());

        delete_team(&db, &team.id, true).unwrap();
        assert!(list_team_members(&db, &team.id).unwrap().is_empty());
        assert!(db.get_team_member_by_mobile("9123456789").unwrap().is_none());
    }

    #[test]
    fn test_member_mobile_must_be_unused() {
        let db = test_db();
        crate::db::test_utils::panchayath(&db, "p1", "Kadirur", 5);
        crate::db::test_utils::coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let team = create_team(&db, "Field Office", None).unwrap();

        let err = add_team_member(&db, &team.id, "Asha", "9876543210", None).unwrap_err();
        assert!(matches!(&err, AppError::DuplicateMobile { table } if table == "coordinators"));

        add_team_member(&db, &team.id, "Ravi", "9123456789", None).unwrap();
        let err = add_team_member(&db, &team.id, "Ravi K", "9123456789", None).unwrap_err();
        assert!(matches!(&err, AppError::DuplicateMobile { table } if table == "team_members"));
        assert_eq!(list_team_members(&db, &team.id).unwrap().len(), 1);
    }

    #[test]
    fn test_officers_crud() {
        let db = test_db();
        let officer = add_officer(&db, "Meera", "9000011111", Some("Secretary")).unwrap();
        assert_eq!(list_officers(&db).unwrap().len(), 1);
        assert!(delete_officer(&db, &officer.id, false).is_err());
        delete_officer(&db, &officer.id, true).unwrap();
        assert!(list_officers(&db).unwrap().is_empty());
    }
}
