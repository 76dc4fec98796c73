use rusqlite::{params, Row};

use super::*;

/// Child-row counts that block deleting a panchayath.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanchayathDependents {
    pub coordinators: usize,
    pub supervisors: usize,
    pub group_leaders: usize,
    pub pros: usize,
}

impl PanchayathDependents {
    pub fn total(&self) -> usize {
        self.coordinators + self.supervisors + self.group_leaders + self.pros
    }
}

impl AgentDb {
    // =========================================================================
    // Panchayaths
    // =========================================================================

    pub fn insert_panchayath(&self, p: &DbPanchayath) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO panchayaths (id, name, number_of_wards, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                p.id,
                p.name,
                p.number_of_wards,
                p.created_by,
                p.created_at,
                p.updated_at
            ],
        )?;
        Ok(())
    }

    /// Update name and ward count. Returns `false` when no row matched.
    pub fn update_panchayath(&self, p: &DbPanchayath) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE panchayaths SET name = ?2, number_of_wards = ?3, updated_at = ?4
             WHERE id = ?1",
            params![p.id, p.name, p.number_of_wards, p.updated_at],
        )?;
        Ok(rows > 0)
    }

    pub fn get_panchayath(&self, id: &str) -> Result<Option<DbPanchayath>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, number_of_wards, created_by, created_at, updated_at
             FROM panchayaths WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_panchayath_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All panchayaths, ordered by name.
    pub fn get_all_panchayaths(&self) -> Result<Vec<DbPanchayath>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, number_of_wards, created_by, created_at, updated_at
             FROM panchayaths ORDER BY name COLLATE NOCASE, id",
        )?;
        let rows = stmt.query_map([], Self::map_panchayath_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_panchayath_dependents(&self, id: &str) -> Result<PanchayathDependents, DbError> {
        let count = |table: &str| -> Result<usize, DbError> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE panchayath_id = ?1"),
                params![id],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };
        Ok(PanchayathDependents {
            coordinators: count("coordinators")?,
            supervisors: count("supervisors")?,
            group_leaders: count("group_leaders")?,
            pros: count("pros")?,
        })
    }

    /// Highest ward referenced by any role row of the panchayath, if any.
    pub fn max_ward_in_use(&self, id: &str) -> Result<Option<u32>, DbError> {
        let max: Option<u32> = self.conn.query_row(
            "SELECT MAX(ward) FROM (
                SELECT ward FROM coordinators WHERE panchayath_id = ?1
                UNION ALL
                SELECT sw.ward FROM supervisor_wards sw
                    JOIN supervisors s ON s.id = sw.supervisor_id
                    WHERE s.panchayath_id = ?1
                UNION ALL
                SELECT ward FROM group_leaders WHERE panchayath_id = ?1
                UNION ALL
                SELECT ward FROM pros WHERE panchayath_id = ?1
            )",
            params![id],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    pub fn delete_panchayath(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM panchayaths WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_panchayath_row(row: &Row) -> rusqlite::Result<DbPanchayath> {
        Ok(DbPanchayath {
            id: row.get(0)?,
            name: row.get(1)?,
            number_of_wards: row.get(2)?,
            created_by: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
