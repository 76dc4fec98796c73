// Daily notes service: one note per agent per day.

use crate::db::{AgentDb, DbDailyNote};
use crate::error::AppError;
use crate::forms::{validate_mobile, DailyNoteForm};
use crate::util::{lookback_start, new_id, now_rfc3339, parse_date};

use super::require_confirmation;

/// Save the note for `(mobile, date)`, replacing any earlier note for that
/// day. Only registered field agents can log notes.
pub fn save_daily_note(db: &AgentDb, form: &DailyNoteForm) -> Result<DbDailyNote, AppError> {
    let form = form.validate()?;
    if db.find_mobile_owner(&form.mobile_number, None)?.is_none() {
        return Err(AppError::NotRegistered(form.mobile_number));
    }

    let now = now_rfc3339();
    let note = DbDailyNote {
        id: new_id(),
        mobile_number: form.mobile_number,
        date: form.date,
        activity: form.activity,
        is_leave: form.is_leave,
        created_at: now.clone(),
        updated_at: now,
    };
    let stored = db.save_daily_note(&note)?;
    log::debug!(
        "Saved {} note for {} on {}",
        if stored.is_leave { "leave" } else { "activity" },
        stored.mobile_number,
        stored.date
    );
    Ok(stored)
}

pub fn get_daily_note(
    db: &AgentDb,
    mobile: &str,
    date: &str,
) -> Result<Option<DbDailyNote>, AppError> {
    let mobile = validate_mobile(mobile)?;
    Ok(db.get_daily_note(&mobile, date.trim())?)
}

/// Notes for one agent within the last `lookback_days`, newest first.
pub fn recent_notes(
    db: &AgentDb,
    mobile: &str,
    lookback_days: u32,
) -> Result<Vec<DbDailyNote>, AppError> {
    let mobile = validate_mobile(mobile)?;
    Ok(db.get_notes_for_mobile_since(&mobile, &lookback_start(lookback_days))?)
}

/// Every agent's note for one day.
pub fn notes_for_date(db: &AgentDb, date: &str) -> Result<Vec<DbDailyNote>, AppError> {
    let date = parse_date(date)
        .ok_or_else(|| AppError::validation("Date must be in YYYY-MM-DD format"))?
        .format("%Y-%m-%d")
        .to_string();
    Ok(db.get_notes_for_date(&date)?)
}

pub fn delete_daily_note(db: &AgentDb, id: &str, confirmed: bool) -> Result<(), AppError> {
    require_confirmation(confirmed)?;
    if !db.delete_daily_note(id)? {
        return Err(AppError::not_found("Daily note", id));
    }
    Ok(())
}
