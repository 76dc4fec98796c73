//! Activity analysis over daily notes.
//!
//! All functions that take a note slice expect it sorted by `date`
//! descending (newest first), which is how `get_notes_*` return them.
//! Dates are `YYYY-MM-DD` strings and compare lexically.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::{AgentRecord, AgentRole, DbDailyNote};

/// Leave days in a row counting back from the most recent note. The run
/// stops at the first note that is not a leave.
pub fn consecutive_leave_days(notes: &[DbDailyNote]) -> u32 {
    notes.iter().take_while(|n| n.is_leave).count() as u32
}

/// Date of the most recent note that is not a leave.
pub fn last_activity_date(notes: &[DbDailyNote]) -> Option<&str> {
    notes
        .iter()
        .find(|n| !n.is_leave)
        .map(|n| n.date.as_str())
}

pub fn is_inactive(consecutive_leave_days: u32, threshold: u32) -> bool {
    consecutive_leave_days >= threshold
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub role: AgentRole,
    pub name: String,
    pub mobile: String,
    pub panchayath_id: String,
    pub notes_logged: u32,
    pub active_days: u32,
    pub leave_days: u32,
    pub consecutive_leave_days: u32,
    pub last_activity_date: Option<String>,
    pub inactive: bool,
}

pub fn agent_performance(
    agent: &AgentRecord,
    notes: &[DbDailyNote],
    threshold: u32,
) -> AgentPerformance {
    let leave_days = notes.iter().filter(|n| n.is_leave).count() as u32;
    let streak = consecutive_leave_days(notes);
    AgentPerformance {
        role: agent.role,
        name: agent.name.clone(),
        mobile: agent.mobile_number.clone(),
        panchayath_id: agent.panchayath_id.clone(),
        notes_logged: notes.len() as u32,
        active_days: notes.len() as u32 - leave_days,
        leave_days,
        consecutive_leave_days: streak,
        last_activity_date: last_activity_date(notes).map(str::to_string),
        inactive: is_inactive(streak, threshold),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub since: String,
    pub threshold: u32,
    pub total_agents: usize,
    pub inactive_agents: usize,
    pub agents: Vec<AgentPerformance>,
}

/// Join `agents` with their notes by mobile number and rate each one.
///
/// `notes` may be in any order and may include notes of unregistered
/// mobiles, which are ignored. Inactive agents sort first, then by longest
/// leave streak, then by name.
pub fn build_report(
    agents: &[AgentRecord],
    notes: &[DbDailyNote],
    since: &str,
    threshold: u32,
) -> PerformanceReport {
    let mut by_mobile: HashMap<&str, Vec<DbDailyNote>> = HashMap::new();
    for note in notes.iter().filter(|n| n.date.as_str() >= since) {
        by_mobile
            .entry(note.mobile_number.as_str())
            .or_default()
            .push(note.clone());
    }
    for list in by_mobile.values_mut() {
        list.sort_by(|a, b| b.date.cmp(&a.date));
    }

    let mut rated: Vec<AgentPerformance> = agents
        .iter()
        .map(|a| {
            let own = by_mobile
                .get(a.mobile_number.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            agent_performance(a, own, threshold)
        })
        .collect();

    rated.sort_by(|a, b| {
        b.inactive
            .cmp(&a.inactive)
            .then(b.consecutive_leave_days.cmp(&a.consecutive_leave_days))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    PerformanceReport {
        since: since.to_string(),
        threshold,
        total_agents: rated.len(),
        inactive_agents: rated.iter().filter(|a| a.inactive).count(),
        agents: rated,
    }
}
