use rusqlite::{params, Row};

use super::*;

impl AgentDb {
    pub fn insert_officer(&self, o: &DbOfficer) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO officers (id, name, mobile_number, designation, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                o.id,
                o.name,
                o.mobile_number,
                o.designation,
                o.created_at,
                o.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_officers(&self) -> Result<Vec<DbOfficer>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, mobile_number, designation, created_at, updated_at
             FROM officers ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map([], Self::map_officer_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_officer(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM officers WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_officer_row(row: &Row) -> rusqlite::Result<DbOfficer> {
        Ok(DbOfficer {
            id: row.get(0)?,
            name: row.get(1)?,
            mobile_number: row.get(2)?,
            designation: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
