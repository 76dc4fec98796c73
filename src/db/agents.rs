use rusqlite::{params, OptionalExtension, Row};

use super::*;

impl AgentDb {
    // =========================================================================
    // Cross-role lookups
    // =========================================================================

    /// Find which role table already holds `mobile`, checking tables in
    /// coordinator → supervisor → group leader → PRO order.
    ///
    /// `exclude_id` skips the row being edited so an unchanged mobile does not
    /// collide with itself.
    pub fn find_mobile_owner(
        &self,
        mobile: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<AgentRecord>, DbError> {
        for role in AgentRole::ALL {
            if let Some(agent) = self.get_agent_by_mobile(role, mobile)? {
                if exclude_id.is_some_and(|id| id == agent.id) {
                    continue;
                }
                return Ok(Some(agent));
            }
        }
        Ok(None)
    }

    /// Look up one role table by mobile number.
    pub fn get_agent_by_mobile(
        &self,
        role: AgentRole,
        mobile: &str,
    ) -> Result<Option<AgentRecord>, DbError> {
        let sql = format!(
            "SELECT id, name, mobile_number, panchayath_id FROM {} WHERE mobile_number = ?1",
            role.table()
        );
        let agent = self
            .conn
            .query_row(&sql, params![mobile], |row| Self::map_agent_row(row, role))
            .optional()?;
        Ok(agent)
    }

    /// Every registered agent across the four role tables, optionally scoped
    /// to one panchayath. Ordered by role, then name.
    pub fn get_all_agents(&self, panchayath_id: Option<&str>) -> Result<Vec<AgentRecord>, DbError> {
        let mut agents = Vec::new();
        for role in AgentRole::ALL {
            let sql = format!(
                "SELECT id, name, mobile_number, panchayath_id FROM {}
                 WHERE (?1 IS NULL OR panchayath_id = ?1)
                 ORDER BY name COLLATE NOCASE, id",
                role.table()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params![panchayath_id], |row| Self::map_agent_row(row, role))?;
            for row in rows {
                agents.push(row?);
            }
        }
        Ok(agents)
    }

    fn map_agent_row(row: &Row, role: AgentRole) -> rusqlite::Result<AgentRecord> {
        Ok(AgentRecord {
            id: row.get(0)?,
            role,
            name: row.get(1)?,
            mobile_number: row.get(2)?,
            panchayath_id: row.get(3)?,
        })
    }
}
