use rusqlite::{params, Row};

use super::*;

impl AgentDb {
    // =========================================================================
    // Todos (admin task management)
    // =========================================================================

    pub fn insert_todo(&self, t: &DbTodo) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO todos (
                id, text, status, remarks, created_at, finished_at, assigned_to,
                reassigned_to_coordinator, reassigned_to_supervisor
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                t.id,
                t.text,
                t.status.as_str(),
                t.remarks,
                t.created_at,
                t.finished_at,
                t.assigned_to,
                t.reassigned_to_coordinator,
                t.reassigned_to_supervisor,
            ],
        )?;
        Ok(())
    }

    /// Overwrite every mutable column of a todo.
    pub fn update_todo(&self, t: &DbTodo) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE todos SET
                text = ?2, status = ?3, remarks = ?4, finished_at = ?5, assigned_to = ?6,
                reassigned_to_coordinator = ?7, reassigned_to_supervisor = ?8
             WHERE id = ?1",
            params![
                t.id,
                t.text,
                t.status.as_str(),
                t.remarks,
                t.finished_at,
                t.assigned_to,
                t.reassigned_to_coordinator,
                t.reassigned_to_supervisor,
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get_todo(&self, id: &str) -> Result<Option<DbTodo>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, status, remarks, created_at, finished_at, assigned_to,
                    reassigned_to_coordinator, reassigned_to_supervisor
             FROM todos WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_todo_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Todos, newest first, optionally filtered by status.
    pub fn get_todos(&self, status: Option<TodoStatus>) -> Result<Vec<DbTodo>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, status, remarks, created_at, finished_at, assigned_to,
                    reassigned_to_coordinator, reassigned_to_supervisor
             FROM todos
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, id",
        )?;
        let rows = stmt.query_map(params![status.map(|s| s.as_str())], Self::map_todo_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_todo(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_todo_row(row: &Row) -> rusqlite::Result<DbTodo> {
        let status: String = row.get(2)?;
        Ok(DbTodo {
            id: row.get(0)?,
            text: row.get(1)?,
            status: TodoStatus::from_str_lossy(&status),
            remarks: row.get(3)?,
            created_at: row.get(4)?,
            finished_at: row.get(5)?,
            assigned_to: row.get(6)?,
            reassigned_to_coordinator: row.get(7)?,
            reassigned_to_supervisor: row.get(8)?,
        })
    }
}
