use rusqlite::{params, Row};

use super::*;

const SUPERVISOR_COLUMNS: &str = "s.id, s.panchayath_id, s.coordinator_id, s.name, s.mobile_number,
     (SELECT group_concat(sw.ward) FROM supervisor_wards sw WHERE sw.supervisor_id = s.id),
     s.created_at, s.updated_at";

impl AgentDb {
    // =========================================================================
    // Coordinators
    // =========================================================================

    pub fn insert_coordinator(&self, c: &DbCoordinator) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO coordinators (
                id, panchayath_id, name, mobile_number, ward, rating, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                c.id,
                c.panchayath_id,
                c.name,
                c.mobile_number,
                c.ward,
                c.rating,
                c.created_at,
                c.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn update_coordinator(&self, c: &DbCoordinator) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE coordinators SET
                panchayath_id = ?2, name = ?3, mobile_number = ?4, ward = ?5,
                rating = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                c.id,
                c.panchayath_id,
                c.name,
                c.mobile_number,
                c.ward,
                c.rating,
                c.updated_at
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get_coordinator(&self, id: &str) -> Result<Option<DbCoordinator>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, name, mobile_number, ward, rating, created_at, updated_at
             FROM coordinators WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_coordinator_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Coordinators of a panchayath, ordered by ward.
    pub fn get_coordinators_for_panchayath(
        &self,
        panchayath_id: &str,
    ) -> Result<Vec<DbCoordinator>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, name, mobile_number, ward, rating, created_at, updated_at
             FROM coordinators WHERE panchayath_id = ?1 ORDER BY ward, name",
        )?;
        let rows = stmt.query_map(params![panchayath_id], Self::map_coordinator_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_supervisors_for_coordinator(&self, coordinator_id: &str) -> Result<usize, DbError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM supervisors WHERE coordinator_id = ?1",
            params![coordinator_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    pub fn delete_coordinator(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM coordinators WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_coordinator_row(row: &Row) -> rusqlite::Result<DbCoordinator> {
        Ok(DbCoordinator {
            id: row.get(0)?,
            panchayath_id: row.get(1)?,
            name: row.get(2)?,
            mobile_number: row.get(3)?,
            ward: row.get(4)?,
            rating: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    // =========================================================================
    // Supervisors (+ supervisor_wards)
    // =========================================================================

    /// Insert a supervisor together with its ward rows in one transaction.
    pub fn insert_supervisor(&self, s: &DbSupervisor) -> Result<(), DbError> {
        self.with_transaction(|db| {
            db.conn.execute(
                "INSERT INTO supervisors (
                    id, panchayath_id, coordinator_id, name, mobile_number, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    s.id,
                    s.panchayath_id,
                    s.coordinator_id,
                    s.name,
                    s.mobile_number,
                    s.created_at,
                    s.updated_at
                ],
            )?;
            db.replace_supervisor_wards(&s.id, &s.wards)
        })
    }

    /// Update a supervisor and replace its ward set in one transaction.
    pub fn update_supervisor(&self, s: &DbSupervisor) -> Result<bool, DbError> {
        self.with_transaction(|db| {
            let rows = db.conn.execute(
                "UPDATE supervisors SET
                    panchayath_id = ?2, coordinator_id = ?3, name = ?4, mobile_number = ?5,
                    updated_at = ?6
                 WHERE id = ?1",
                params![
                    s.id,
                    s.panchayath_id,
                    s.coordinator_id,
                    s.name,
                    s.mobile_number,
                    s.updated_at
                ],
            )?;
            if rows == 0 {
                return Ok(false);
            }
            db.replace_supervisor_wards(&s.id, &s.wards)?;
            Ok(true)
        })
    }

    fn replace_supervisor_wards(&self, supervisor_id: &str, wards: &[u32]) -> Result<(), DbError> {
        self.conn.execute(
            "DELETE FROM supervisor_wards WHERE supervisor_id = ?1",
            params![supervisor_id],
        )?;
        for ward in wards {
            self.conn.execute(
                "INSERT OR IGNORE INTO supervisor_wards (supervisor_id, ward) VALUES (?1, ?2)",
                params![supervisor_id, ward],
            )?;
        }
        Ok(())
    }

    pub fn get_supervisor(&self, id: &str) -> Result<Option<DbSupervisor>, DbError> {
        let sql = format!("SELECT {SUPERVISOR_COLUMNS} FROM supervisors s WHERE s.id = ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], Self::map_supervisor_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Supervisors of a panchayath in creation order.
    pub fn get_supervisors_for_panchayath(
        &self,
        panchayath_id: &str,
    ) -> Result<Vec<DbSupervisor>, DbError> {
        let sql = format!(
            "SELECT {SUPERVISOR_COLUMNS} FROM supervisors s
             WHERE s.panchayath_id = ?1 ORDER BY s.created_at, s.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![panchayath_id], Self::map_supervisor_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_supervisors_for_coordinator(
        &self,
        coordinator_id: &str,
    ) -> Result<Vec<DbSupervisor>, DbError> {
        let sql = format!(
            "SELECT {SUPERVISOR_COLUMNS} FROM supervisors s
             WHERE s.coordinator_id = ?1 ORDER BY s.created_at, s.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![coordinator_id], Self::map_supervisor_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Supervisors of a panchayath whose ward set contains `ward`.
    pub fn get_supervisors_covering_ward(
        &self,
        panchayath_id: &str,
        ward: u32,
    ) -> Result<Vec<DbSupervisor>, DbError> {
        let sql = format!(
            "SELECT {SUPERVISOR_COLUMNS} FROM supervisors s
             WHERE s.panchayath_id = ?1
               AND EXISTS (SELECT 1 FROM supervisor_wards w
                           WHERE w.supervisor_id = s.id AND w.ward = ?2)
             ORDER BY s.created_at, s.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![panchayath_id, ward], Self::map_supervisor_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_group_leaders_for_supervisor(&self, supervisor_id: &str) -> Result<usize, DbError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM group_leaders WHERE supervisor_id = ?1",
            params![supervisor_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// Delete a supervisor; its ward rows cascade.
    pub fn delete_supervisor(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM supervisors WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_supervisor_row(row: &Row) -> rusqlite::Result<DbSupervisor> {
        let wards: Option<String> = row.get(5)?;
        Ok(DbSupervisor {
            id: row.get(0)?,
            panchayath_id: row.get(1)?,
            coordinator_id: row.get(2)?,
            name: row.get(3)?,
            mobile_number: row.get(4)?,
            wards: parse_ward_list(wards.as_deref()),
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    // =========================================================================
    // Group leaders
    // =========================================================================

    pub fn insert_group_leader(&self, g: &DbGroupLeader) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO group_leaders (
                id, panchayath_id, supervisor_id, name, mobile_number, ward, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                g.id,
                g.panchayath_id,
                g.supervisor_id,
                g.name,
                g.mobile_number,
                g.ward,
                g.created_at,
                g.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn update_group_leader(&self, g: &DbGroupLeader) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE group_leaders SET
                panchayath_id = ?2, supervisor_id = ?3, name = ?4, mobile_number = ?5,
                ward = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                g.id,
                g.panchayath_id,
                g.supervisor_id,
                g.name,
                g.mobile_number,
                g.ward,
                g.updated_at
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get_group_leader(&self, id: &str) -> Result<Option<DbGroupLeader>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, supervisor_id, name, mobile_number, ward, created_at, updated_at
             FROM group_leaders WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_group_leader_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_group_leaders_for_panchayath(
        &self,
        panchayath_id: &str,
    ) -> Result<Vec<DbGroupLeader>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, supervisor_id, name, mobile_number, ward, created_at, updated_at
             FROM group_leaders WHERE panchayath_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![panchayath_id], Self::map_group_leader_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_group_leaders_in_ward(
        &self,
        panchayath_id: &str,
        ward: u32,
    ) -> Result<Vec<DbGroupLeader>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, supervisor_id, name, mobile_number, ward, created_at, updated_at
             FROM group_leaders WHERE panchayath_id = ?1 AND ward = ?2 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![panchayath_id, ward], Self::map_group_leader_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_pros_for_group_leader(&self, group_leader_id: &str) -> Result<usize, DbError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pros WHERE group_leader_id = ?1",
            params![group_leader_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    pub fn delete_group_leader(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM group_leaders WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_group_leader_row(row: &Row) -> rusqlite::Result<DbGroupLeader> {
        Ok(DbGroupLeader {
            id: row.get(0)?,
            panchayath_id: row.get(1)?,
            supervisor_id: row.get(2)?,
            name: row.get(3)?,
            mobile_number: row.get(4)?,
            ward: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    // =========================================================================
    // PROs
    // =========================================================================

    pub fn insert_pro(&self, p: &DbPro) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO pros (
                id, panchayath_id, group_leader_id, name, mobile_number, ward, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                p.id,
                p.panchayath_id,
                p.group_leader_id,
                p.name,
                p.mobile_number,
                p.ward,
                p.created_at,
                p.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn update_pro(&self, p: &DbPro) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE pros SET
                panchayath_id = ?2, group_leader_id = ?3, name = ?4, mobile_number = ?5,
                ward = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                p.id,
                p.panchayath_id,
                p.group_leader_id,
                p.name,
                p.mobile_number,
                p.ward,
                p.updated_at
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get_pro(&self, id: &str) -> Result<Option<DbPro>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, group_leader_id, name, mobile_number, ward, created_at, updated_at
             FROM pros WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_pro_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_pros_for_panchayath(&self, panchayath_id: &str) -> Result<Vec<DbPro>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, panchayath_id, group_leader_id, name, mobile_number, ward, created_at, updated_at
             FROM pros WHERE panchayath_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![panchayath_id], Self::map_pro_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_pro(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM pros WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_pro_row(row: &Row) -> rusqlite::Result<DbPro> {
        Ok(DbPro {
            id: row.get(0)?,
            panchayath_id: row.get(1)?,
            group_leader_id: row.get(2)?,
            name: row.get(3)?,
            mobile_number: row.get(4)?,
            ward: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;

    #[test]
    fn test_supervisor_wards_roundtrip_through_join_table() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        supervisor(&db, "s1", &asha, "Biju", "9876543211", &[3, 2]);

        let biju = db.get_supervisor("s1").unwrap().expect("supervisor");
        assert_eq!(biju.wards, vec![2, 3]);
        assert!(biju.covers_ward(3));
        assert!(!biju.covers_ward(4));
    }

    #[test]
    fn test_supervisor_update_replaces_wards() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let mut biju = supervisor(&db, "s1", &asha, "Biju", "9876543211", &[2, 3]);

        biju.wards = vec![5];
        assert!(db.update_supervisor(&biju).unwrap());
        assert_eq!(db.get_supervisor("s1").unwrap().unwrap().wards, vec![5]);
    }

    #[test]
    fn test_failed_supervisor_insert_leaves_no_orphan_wards() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let biju = supervisor(&db, "s1", &asha, "Biju", "9876543211", &[2]);

        // Same id again: the supervisor row fails, nothing else is written.
        let mut dup = biju.clone();
        dup.mobile_number = "9000000000".to_string();
        dup.wards = vec![4];
        assert!(db.insert_supervisor(&dup).is_err());

        let wards: i64 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM supervisor_wards", [], |r| r.get(0))
            .unwrap();
        assert_eq!(wards, 1);
    }

    #[test]
    fn test_supervisors_covering_ward() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        supervisor(&db, "s1", &asha, "Biju", "9876543211", &[2, 3]);
        supervisor(&db, "s2", &asha, "Chitra", "9876543212", &[4]);

        let covering: Vec<String> = db
            .get_supervisors_covering_ward("p1", 3)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(covering, vec!["Biju"]);
    }

    #[test]
    fn test_delete_supervisor_cascades_wards() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        supervisor(&db, "s1", &asha, "Biju", "9876543211", &[2, 3]);

        assert!(db.delete_supervisor("s1").unwrap());
        let wards: i64 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM supervisor_wards", [], |r| r.get(0))
            .unwrap();
        assert_eq!(wards, 0);
    }

    #[test]
    fn test_child_counts() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let biju = supervisor(&db, "s1", &asha, "Biju", "9876543211", &[2]);
        let chandran = group_leader(&db, "g1", &biju, "Chandran", "9876543212", 2);
        pro(&db, "r1", &chandran, "Divya", "9876543213");

        assert_eq!(db.count_supervisors_for_coordinator("c1").unwrap(), 1);
        assert_eq!(db.count_group_leaders_for_supervisor("s1").unwrap(), 1);
        assert_eq!(db.count_pros_for_group_leader("g1").unwrap(), 1);
        assert_eq!(db.get_group_leaders_in_ward("p1", 2).unwrap().len(), 1);
        assert!(db.get_group_leaders_in_ward("p1", 3).unwrap().is_empty());
    }
}
