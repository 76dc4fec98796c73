// Identity service: resolve a mobile number to a registered user and keep
// the session in step.

use serde::Serialize;

use crate::db::AgentDb;
use crate::error::AppError;
use crate::forms::validate_mobile;
use crate::session::{CurrentUser, SessionStore, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Registered { user: CurrentUser },
    NotRegistered,
}

/// Search coordinator, supervisor, group leader, PRO, then admin team
/// member tables. The first match wins.
pub fn lookup(db: &AgentDb, mobile: &str) -> Result<LookupOutcome, AppError> {
    let mobile = validate_mobile(mobile)?;

    if let Some(agent) = db.find_mobile_owner(&mobile, None)? {
        return Ok(LookupOutcome::Registered {
            user: CurrentUser {
                id: agent.id,
                role: UserRole::from(agent.role),
                name: agent.name,
                mobile_number: agent.mobile_number,
                panchayath_id: Some(agent.panchayath_id),
            },
        });
    }

    if let Some(member) = db.get_team_member_by_mobile(&mobile)? {
        return Ok(LookupOutcome::Registered {
            user: CurrentUser {
                id: member.id,
                role: UserRole::Admin,
                name: member.name,
                mobile_number: member.mobile_number,
                panchayath_id: None,
            },
        });
    }

    Ok(LookupOutcome::NotRegistered)
}

/// Look up `mobile` and persist the match as the current user.
pub fn sign_in(
    db: &AgentDb,
    session: &mut SessionStore,
    mobile: &str,
) -> Result<CurrentUser, AppError> {
    match lookup(db, mobile)? {
        LookupOutcome::Registered { user } => {
            session.sign_in(user.clone()).map_err(AppError::Config)?;
            Ok(user)
        }
        LookupOutcome::NotRegistered => Err(AppError::NotRegistered(mobile.trim().to_string())),
    }
}

pub fn sign_out(session: &mut SessionStore) -> Result<(), AppError> {
    session.sign_out().map_err(AppError::Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{coordinator, panchayath, supervisor, test_db};
    use crate::db::{DbTeam, DbTeamMember};

    fn add_admin(db: &AgentDb, mobile: &str) {
        db.insert_team(&DbTeam {
            id: "t1".into(),
            name: "Office".into(),
            description: None,
            created_at: "2024-01-01T00:00:00Z".into(),
        })
        .unwrap();
        db.insert_team_member(&DbTeamMember {
            id: "m1".into(),
            team_id: "t1".into(),
            name: "Admin".into(),
            mobile_number: mobile.into(),
            role: None,
            created_at: "2024-01-01T00:00:00Z".into(),
        })
        .unwrap();
    }

    #[test]
    fn test_lookup_resolves_role() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let c = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        supervisor(&db, "s1", &c, "Biju", "9876543211", &[2]);

        match lookup(&db, "9876543211").unwrap() {
            LookupOutcome::Registered { user } => {
                assert_eq!(user.role, UserRole::Supervisor);
                assert_eq!(user.panchayath_id.as_deref(), Some("p1"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(lookup(&db, "9000000000").unwrap(), LookupOutcome::NotRegistered);
    }

    #[test]
    fn test_agent_tables_take_precedence_over_admins() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        add_admin(&db, "9876543210");
        add_admin_only(&db);

        match lookup(&db, "9876543210").unwrap() {
            LookupOutcome::Registered { user } => assert_eq!(user.role, UserRole::Coordinator),
            other => panic!("unexpected {other:?}"),
        }
        match lookup(&db, "9123456789").unwrap() {
            LookupOutcome::Registered { user } => assert_eq!(user.role, UserRole::Admin),
            other => panic!("unexpected {other:?}"),
        }
    }

    fn add_admin_only(db: &AgentDb) {
        db.insert_team_member(&DbTeamMember {
            id: "m2".into(),
            team_id: "t1".into(),
            name: "Clerk".into(),
            mobile_number: "9123456789".into(),
            role: Some("clerk".into()),
            created_at: "2024-01-02T00:00:00Z".into(),
        })
        .unwrap();
    }

    #[test]
    fn test_sign_in_persists_and_sign_out_clears() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut session = SessionStore::open(path.clone());

        assert!(matches!(
            sign_in(&db, &mut session, "9000000000"),
            Err(AppError::NotRegistered(_))
        ));
        assert!(session.current().is_none());

        let user = sign_in(&db, &mut session, "9876543210").unwrap();
        assert_eq!(SessionStore::open(path.clone()).current(), Some(&user));

        sign_out(&mut session).unwrap();
        assert!(SessionStore::open(path).current().is_none());
    }
}
