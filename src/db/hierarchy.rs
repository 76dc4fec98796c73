use rusqlite::{params, Row};

use super::*;

impl AgentDb {
    // =========================================================================
    // Hierarchy sources
    // =========================================================================

    /// Rows from `hierarchy_view`, optionally restricted to one panchayath.
    ///
    /// Row order decides first-seen order in the card builders: coordinators
    /// by ward, then each level by name.
    pub fn get_hierarchy_rows(&self, panchayath_id: Option<&str>) -> Result<Vec<HierarchyRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT panchayath_id,
                    coordinator_id, coordinator_name, coordinator_mobile, coordinator_ward,
                    coordinator_rating,
                    supervisor_id, supervisor_name, supervisor_mobile, supervisor_wards,
                    group_leader_id, group_leader_name, group_leader_mobile, group_leader_ward,
                    pro_id, pro_name, pro_mobile, pro_ward
             FROM hierarchy_view
             WHERE (?1 IS NULL OR panchayath_id = ?1)
             ORDER BY panchayath_id, coordinator_ward, coordinator_name,
                      supervisor_name, group_leader_ward, group_leader_name, pro_name",
        )?;
        let rows = stmt.query_map(params![panchayath_id], Self::map_hierarchy_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Per-table fetch of one panchayath and everything under it.
    pub fn get_panchayath_nested(&self, panchayath_id: &str) -> Result<Option<PanchayathNested>, DbError> {
        let Some(panchayath) = self.get_panchayath(panchayath_id)? else {
            return Ok(None);
        };
        Ok(Some(PanchayathNested {
            coordinators: self.get_coordinators_for_panchayath(panchayath_id)?,
            supervisors: self.get_supervisors_for_panchayath(panchayath_id)?,
            group_leaders: self.get_group_leaders_for_panchayath(panchayath_id)?,
            pros: self.get_pros_for_panchayath(panchayath_id)?,
            panchayath,
        }))
    }

    fn map_hierarchy_row(row: &Row) -> rusqlite::Result<HierarchyRow> {
        let wards: Option<String> = row.get(9)?;
        Ok(HierarchyRow {
            panchayath_id: row.get(0)?,
            coordinator_id: row.get(1)?,
            coordinator_name: row.get(2)?,
            coordinator_mobile: row.get(3)?,
            coordinator_ward: row.get(4)?,
            coordinator_rating: row.get(5)?,
            supervisor_id: row.get(6)?,
            supervisor_name: row.get(7)?,
            supervisor_mobile: row.get(8)?,
            supervisor_wards: parse_ward_list(wards.as_deref()),
            group_leader_id: row.get(10)?,
            group_leader_name: row.get(11)?,
            group_leader_mobile: row.get(12)?,
            group_leader_ward: row.get(13)?,
            pro_id: row.get(14)?,
            pro_name: row.get(15)?,
            pro_mobile: row.get(16)?,
            pro_ward: row.get(17)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;

    #[test]
    fn test_view_emits_one_row_per_chain() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let asha = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let biju = supervisor(&db, "s1", &asha, "Biju", "9876543211", &[2, 3]);
        let chandran = group_leader(&db, "g1", &biju, "Chandran", "9876543212", 2);
        pro(&db, "r1", &chandran, "Divya", "9876543213");
        pro(&db, "r2", &chandran, "Eby", "9876543214");

        let rows = db.get_hierarchy_rows(Some("p1")).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.coordinator_ward == Some(2)));
        assert_eq!(rows[0].supervisor_wards, vec![2, 3]);
        assert_eq!(rows[0].pro_name.as_deref(), Some("Divya"));
        assert_eq!(rows[1].pro_name.as_deref(), Some("Eby"));
    }

    #[test]
    fn test_view_keeps_childless_coordinator() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);

        let rows = db.get_hierarchy_rows(Some("p1")).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].supervisor_name.is_none());
        assert!(rows[0].supervisor_wards.is_empty());
    }

    #[test]
    fn test_nested_fetch_missing_panchayath() {
        let db = test_db();
        assert!(db.get_panchayath_nested("nope").unwrap().is_none());
    }
}
