use rusqlite::{params, Row};

use super::*;

impl AgentDb {
    pub fn insert_testimonial(&self, t: &DbTestimonial) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO testimonial_responses (
                id, agent_mobile, respondent_name, respondent_mobile, score, comment, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                t.id,
                t.agent_mobile,
                t.respondent_name,
                t.respondent_mobile,
                t.score,
                t.comment,
                t.created_at
            ],
        )?;
        Ok(())
    }

    /// Responses, newest first, optionally for one agent.
    pub fn get_testimonials(&self, agent_mobile: Option<&str>) -> Result<Vec<DbTestimonial>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, agent_mobile, respondent_name, respondent_mobile, score, comment, created_at
             FROM testimonial_responses
             WHERE (?1 IS NULL OR agent_mobile = ?1)
             ORDER BY created_at DESC, id",
        )?;
        let rows = stmt.query_map(params![agent_mobile], Self::map_testimonial_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn map_testimonial_row(row: &Row) -> rusqlite::Result<DbTestimonial> {
        Ok(DbTestimonial {
            id: row.get(0)?,
            agent_mobile: row.get(1)?,
            respondent_name: row.get(2)?,
            respondent_mobile: row.get(3)?,
            score: row.get(4)?,
            comment: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
