use rusqlite::{params, OptionalExtension, Row};

use super::*;

impl AgentDb {
    // =========================================================================
    // Admin teams
    // =========================================================================

    pub fn insert_team(&self, t: &DbTeam) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO teams (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![t.id, t.name, t.description, t.created_at],
        )?;
        Ok(())
    }

    pub fn get_teams(&self) -> Result<Vec<DbTeam>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description, created_at FROM teams ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(DbTeam {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a team; its members cascade.
    pub fn delete_team(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn insert_team_member(&self, m: &DbTeamMember) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO team_members (id, team_id, name, mobile_number, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![m.id, m.team_id, m.name, m.mobile_number, m.role, m.created_at],
        )?;
        Ok(())
    }

    pub fn get_team_members(&self, team_id: &str) -> Result<Vec<DbTeamMember>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, team_id, name, mobile_number, role, created_at
             FROM team_members WHERE team_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![team_id], Self::map_team_member_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// First admin team member registered under `mobile`, if any.
    pub fn get_team_member_by_mobile(&self, mobile: &str) -> Result<Option<DbTeamMember>, DbError> {
        let member = self
            .conn
            .query_row(
                "SELECT id, team_id, name, mobile_number, role, created_at
                 FROM team_members WHERE mobile_number = ?1
                 ORDER BY created_at LIMIT 1",
                params![mobile],
                Self::map_team_member_row,
            )
            .optional()?;
        Ok(member)
    }

    pub fn delete_team_member(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM team_members WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_team_member_row(row: &Row) -> rusqlite::Result<DbTeamMember> {
        Ok(DbTeamMember {
            id: row.get(0)?,
            team_id: row.get(1)?,
            name: row.get(2)?,
            mobile_number: row.get(3)?,
            role: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
