use rusqlite::{params, Row};

use super::*;

impl AgentDb {
    // =========================================================================
    // Daily notes
    // =========================================================================

    /// Insert the note for `(mobile_number, date)` or overwrite the existing
    /// one. Returns the stored row (keeping the original id on update).
    pub fn save_daily_note(&self, note: &DbDailyNote) -> Result<DbDailyNote, DbError> {
        let updated = self.conn.execute(
            "UPDATE daily_notes SET activity = ?3, is_leave = ?4, updated_at = ?5
             WHERE mobile_number = ?1 AND date = ?2",
            params![
                note.mobile_number,
                note.date,
                note.activity,
                note.is_leave as i32,
                note.updated_at
            ],
        )?;
        if updated == 0 {
            self.conn.execute(
                "INSERT INTO daily_notes (id, mobile_number, date, activity, is_leave, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    note.id,
                    note.mobile_number,
                    note.date,
                    note.activity,
                    note.is_leave as i32,
                    note.created_at,
                    note.updated_at
                ],
            )?;
        }
        self.get_daily_note(&note.mobile_number, &note.date)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_daily_note(&self, mobile: &str, date: &str) -> Result<Option<DbDailyNote>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mobile_number, date, activity, is_leave, created_at, updated_at
             FROM daily_notes WHERE mobile_number = ?1 AND date = ?2
             ORDER BY updated_at DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![mobile, date], Self::map_daily_note_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Notes for one agent dated on or after `since` (`YYYY-MM-DD`), newest first.
    pub fn get_notes_for_mobile_since(
        &self,
        mobile: &str,
        since: &str,
    ) -> Result<Vec<DbDailyNote>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mobile_number, date, activity, is_leave, created_at, updated_at
             FROM daily_notes
             WHERE mobile_number = ?1 AND date >= ?2
             ORDER BY date DESC, updated_at DESC",
        )?;
        let rows = stmt.query_map(params![mobile, since], Self::map_daily_note_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every note dated on or after `since`, newest first. Used for the
    /// panchayath-wide performance report.
    pub fn get_notes_since(&self, since: &str) -> Result<Vec<DbDailyNote>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mobile_number, date, activity, is_leave, created_at, updated_at
             FROM daily_notes WHERE date >= ?1
             ORDER BY mobile_number, date DESC, updated_at DESC",
        )?;
        let rows = stmt.query_map(params![since], Self::map_daily_note_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All notes for one date, for the admin overview.
    pub fn get_notes_for_date(&self, date: &str) -> Result<Vec<DbDailyNote>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mobile_number, date, activity, is_leave, created_at, updated_at
             FROM daily_notes WHERE date = ?1 ORDER BY mobile_number",
        )?;
        let rows = stmt.query_map(params![date], Self::map_daily_note_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_daily_note(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM daily_notes WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn map_daily_note_row(row: &Row) -> rusqlite::Result<DbDailyNote> {
        Ok(DbDailyNote {
            id: row.get(0)?,
            mobile_number: row.get(1)?,
            date: row.get(2)?,
            activity: row.get(3)?,
            is_leave: row.get::<_, i32>(4)? != 0,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;

    fn note(id: &str, date: &str, is_leave: bool) -> DbDailyNote {
        DbDailyNote {
            id: id.to_string(),
            mobile_number: "9876543210".to_string(),
            date: date.to_string(),
            activity: if is_leave { String::new() } else { "House visits".to_string() },
            is_leave,
            created_at: "2025-03-01T08:00:00+00:00".to_string(),
            updated_at: "2025-03-01T08:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_save_overwrites_same_day() {
        let db = test_db();
        db.save_daily_note(&note("n1", "2025-03-01", false)).unwrap();
        let stored = db.save_daily_note(&note("n2", "2025-03-01", true)).unwrap();

        assert_eq!(stored.id, "n1", "existing row keeps its id");
        assert!(stored.is_leave);
        assert_eq!(db.get_notes_for_date("2025-03-01").unwrap().len(), 1);
    }

    #[test]
    fn test_notes_since_are_newest_first() {
        let db = test_db();
        db.save_daily_note(&note("n1", "2025-02-01", false)).unwrap();
        db.save_daily_note(&note("n2", "2025-03-02", true)).unwrap();
        db.save_daily_note(&note("n3", "2025-03-03", false)).unwrap();

        let dates: Vec<String> = db
            .get_notes_for_mobile_since("9876543210", "2025-03-01")
            .unwrap()
            .into_iter()
            .map(|n| n.date)
            .collect();
        assert_eq!(dates, vec!["2025-03-03", "2025-03-02"]);
    }
}
