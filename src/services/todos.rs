// Todos service: admin task list with status transitions and reassignment.

use serde::Deserialize;

use crate::db::{AgentDb, DbTodo, TodoStatus};
use crate::error::AppError;
use crate::util::{new_id, non_empty, now_rfc3339};

use super::require_confirmation;

/// Who a todo is handed to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Reassignment {
    Coordinator(String),
    Supervisor(String),
    Unassigned,
}

fn require_todo(db: &AgentDb, id: &str) -> Result<DbTodo, AppError> {
    db.get_todo(id)?.ok_or_else(|| AppError::not_found("Todo", id))
}

pub fn create_todo(
    db: &AgentDb,
    text: &str,
    assigned_to: Option<&str>,
) -> Result<DbTodo, AppError> {
    let text = non_empty(Some(text)).ok_or_else(|| AppError::validation("Task text is required"))?;
    let todo = DbTodo {
        id: new_id(),
        text,
        status: TodoStatus::Pending,
        remarks: None,
        created_at: now_rfc3339(),
        finished_at: None,
        assigned_to: non_empty(assigned_to),
        reassigned_to_coordinator: None,
        reassigned_to_supervisor: None,
    };
    db.insert_todo(&todo)?;
    Ok(todo)
}

pub fn list_todos(db: &AgentDb, status: Option<TodoStatus>) -> Result<Vec<DbTodo>, AppError> {
    Ok(db.get_todos(status)?)
}

/// Move a todo to `status`. Completing stamps `finished_at`; any other status
/// clears it.
pub fn set_todo_status(db: &AgentDb, id: &str, status: TodoStatus) -> Result<DbTodo, AppError> {
    let mut todo = require_todo(db, id)?;
    if todo.status == status {
        return Ok(todo);
    }
    todo.finished_at = match status {
        TodoStatus::Completed => Some(now_rfc3339()),
        TodoStatus::Pending | TodoStatus::InProgress => None,
    };
    todo.status = status;
    db.update_todo(&todo)?;
    log::info!("Todo {} is now {}", id, status.as_str());
    Ok(todo)
}

pub fn set_todo_remarks(db: &AgentDb, id: &str, remarks: Option<&str>) -> Result<DbTodo, AppError> {
    let mut todo = require_todo(db, id)?;
    todo.remarks = non_empty(remarks);
    db.update_todo(&todo)?;
    Ok(todo)
}

/// Hand a todo to a coordinator or supervisor. The target must exist; a
/// todo points at one agent at a time.
pub fn reassign_todo(db: &AgentDb, id: &str, to: &Reassignment) -> Result<DbTodo, AppError> {
    let mut todo = require_todo(db, id)?;
    match to {
        Reassignment::Coordinator(cid) => {
            db.get_coordinator(cid)?
                .ok_or_else(|| AppError::not_found("Coordinator", cid.as_str()))?;
            todo.reassigned_to_coordinator = Some(cid.clone());
            todo.reassigned_to_supervisor = None;
        }
        Reassignment::Supervisor(sid) => {
            db.get_supervisor(sid)?
                .ok_or_else(|| AppError::not_found("Supervisor", sid.as_str()))?;
            todo.reassigned_to_coordinator = None;
            todo.reassigned_to_supervisor = Some(sid.clone());
        }
        Reassignment::Unassigned => {
            todo.reassigned_to_coordinator = None;
            todo.reassigned_to_supervisor = None;
        }
    }
    db.update_todo(&todo)?;
    Ok(todo)
}

pub fn delete_todo(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    if !db.delete_todo(id)? {
        return Err(AppError::not_found("Todo", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{coordinator, panchayath, supervisor, test_db};

    #[test]
    fn test_create_requires_text() {
        let db = test_db();
        assert!(create_todo(&db, "   ", None).is_err());
        let todo = create_todo(&db, "Collect ward survey", Some("admin")).unwrap();
        assert_eq!(todo.status, TodoStatus::Pending);
        assert_eq!(list_todos(&db, Some(TodoStatus::Pending)).unwrap().len(), 1);
    }

    #[test]
    fn test_complete_then_reopen() {
        let db = test_db();
        let todo = create_todo(&db, "Collect ward survey", None).unwrap();

        let done = set_todo_status(&db, &todo.id, TodoStatus::Completed).unwrap();
        assert!(done.finished_at.is_some());
        assert!(list_todos(&db, Some(TodoStatus::Pending)).unwrap().is_empty());

        let reopened = set_todo_status(&db, &todo.id, TodoStatus::InProgress).unwrap();
        assert!(reopened.finished_at.is_none());
        assert_eq!(db.get_todo(&todo.id).unwrap().unwrap().status, TodoStatus::InProgress);
    }

    #[test]
    fn test_reassign_validates_target() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let c = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        supervisor(&db, "s1", &c, "Biju", "9876543211", &[2]);
        let todo = create_todo(&db, "Collect ward survey", None).unwrap();

        assert!(matches!(
            reassign_todo(&db, &todo.id, &Reassignment::Coordinator("ghost".into())),
            Err(AppError::NotFound { .. })
        ));
        let to_coord = reassign_todo(&db, &todo.id, &Reassignment::Coordinator("c1".into())).unwrap();
        assert_eq!(to_coord.reassigned_to_coordinator.as_deref(), Some("c1"));

        let to_sup = reassign_todo(&db, &todo.id, &Reassignment::Supervisor("s1".into())).unwrap();
        assert_eq!(to_sup.reassigned_to_coordinator, None);
        assert_eq!(to_sup.reassigned_to_supervisor.as_deref(), Some("s1"));
    }

    #[test]
    fn test_remarks_and_delete() {
        let db = test_db();
        let todo = create_todo(&db, "Collect ward survey", None).unwrap();
        let with = set_todo_remarks(&db, &todo.id, Some(" waiting on ward 3 ")).unwrap();
        assert_eq!(with.remarks.as_deref(), Some("waiting on ward 3"));

        delete_todo(&db, &todo.id, true).unwrap();
        assert!(matches!(
            set_todo_status(&db, &todo.id, TodoStatus::Completed),
            Err(AppError::NotFound { .. })
        ));
    }
}
