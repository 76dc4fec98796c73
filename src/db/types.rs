//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// The four field-agent roles, parent to child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Coordinator,
    Supervisor,
    GroupLeader,
    Pro,
}

impl AgentRole {
    /// Role tables in identity-lookup precedence.
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Coordinator,
        AgentRole::Supervisor,
        AgentRole::GroupLeader,
        AgentRole::Pro,
    ];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "coordinators",
            AgentRole::Supervisor => "supervisors",
            AgentRole::GroupLeader => "group_leaders",
            AgentRole::Pro => "pros",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "coordinator",
            AgentRole::Supervisor => "supervisor",
            AgentRole::GroupLeader => "group_leader",
            AgentRole::Pro => "pro",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "Coordinator",
            AgentRole::Supervisor => "Supervisor",
            AgentRole::GroupLeader => "Group Leader",
            AgentRole::Pro => "PRO",
        }
    }
}

/// A row from the `panchayaths` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbPanchayath {
    pub id: String,
    pub name: String,
    pub number_of_wards: u32,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `coordinators` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbCoordinator {
    pub id: String,
    pub panchayath_id: String,
    pub name: String,
    pub mobile_number: String,
    pub ward: u32,
    /// 0..=10 when rated.
    pub rating: Option<u8>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `supervisors` table joined with its `supervisor_wards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSupervisor {
    pub id: String,
    pub panchayath_id: String,
    pub coordinator_id: String,
    pub name: String,
    pub mobile_number: String,
    /// Ascending, de-duplicated.
    pub wards: Vec<u32>,
    pub created_at: String,
    pub updated_at: String,
}

impl DbSupervisor {
    pub fn covers_ward(&self, ward: u32) -> bool {
        self.wards.contains(&ward)
    }
}

/// A row from the `group_leaders` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbGroupLeader {
    pub id: String,
    pub panchayath_id: String,
    pub supervisor_id: String,
    pub name: String,
    pub mobile_number: String,
    pub ward: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `pros` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbPro {
    pub id: String,
    pub panchayath_id: String,
    pub group_leader_id: String,
    pub name: String,
    pub mobile_number: String,
    pub ward: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `daily_notes` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbDailyNote {
    pub id: String,
    pub mobile_number: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub activity: String,
    pub is_leave: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `officers` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbOfficer {
    pub id: String,
    pub name: String,
    pub mobile_number: String,
    pub designation: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `teams` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTeam {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// A row from `team_members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTeamMember {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub mobile_number: String,
    pub role: Option<String>,
    pub created_at: String,
}

/// Lifecycle of an admin task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    /// String label for SQL storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }

    /// Parse from SQL string. Unknown values read as pending.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "in_progress" => TodoStatus::InProgress,
            "completed" => TodoStatus::Completed,
            _ => TodoStatus::Pending,
        }
    }
}

/// A row from the `todos` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTodo {
    pub id: String,
    pub text: String,
    pub status: TodoStatus,
    pub remarks: Option<String>,
    pub created_at: String,
    pub finished_at: Option<String>,
    pub assigned_to: Option<String>,
    pub reassigned_to_coordinator: Option<String>,
    pub reassigned_to_supervisor: Option<String>,
}

/// A row from `testimonial_responses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTestimonial {
    pub id: String,
    pub agent_mobile: String,
    pub respondent_name: String,
    pub respondent_mobile: Option<String>,
    /// 1..=5.
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

/// A row from `hierarchy_view`: one full ancestor chain per row.
///
/// Every field below the coordinator may be `None` when that branch has no
/// deeper entity. The name-keyed card builder also tolerates a missing
/// coordinator name, which the view itself never produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyRow {
    pub panchayath_id: String,
    pub coordinator_id: Option<String>,
    pub coordinator_name: Option<String>,
    pub coordinator_mobile: Option<String>,
    pub coordinator_ward: Option<u32>,
    pub coordinator_rating: Option<u8>,
    pub supervisor_id: Option<String>,
    pub supervisor_name: Option<String>,
    pub supervisor_mobile: Option<String>,
    pub supervisor_wards: Vec<u32>,
    pub group_leader_id: Option<String>,
    pub group_leader_name: Option<String>,
    pub group_leader_mobile: Option<String>,
    pub group_leader_ward: Option<u32>,
    pub pro_id: Option<String>,
    pub pro_name: Option<String>,
    pub pro_mobile: Option<String>,
    pub pro_ward: Option<u32>,
}

/// Per-table fetch of one panchayath, the graph builder's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanchayathNested {
    pub panchayath: DbPanchayath,
    pub coordinators: Vec<DbCoordinator>,
    pub supervisors: Vec<DbSupervisor>,
    pub group_leaders: Vec<DbGroupLeader>,
    pub pros: Vec<DbPro>,
}

/// Role-agnostic view of any registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub role: AgentRole,
    pub name: String,
    pub mobile_number: String,
    pub panchayath_id: String,
}

/// Parse a `group_concat` ward list (e.g. `"3,2"`) into sorted wards.
///
/// Entries that are not positive integers are logged and skipped.
pub fn parse_ward_list(raw: Option<&str>) -> Vec<u32> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let mut wards: Vec<u32> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u32>() {
            Ok(w) if w >= 1 => Some(w),
            _ => {
                log::warn!("Skipping malformed supervisor ward entry '{}'", s);
                None
            }
        })
        .collect();
    wards.sort_unstable();
    wards.dedup();
    wards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ward_list_sorts_and_dedupes() {
        assert_eq!(parse_ward_list(Some("3,2,3")), vec![2, 3]);
        assert_eq!(parse_ward_list(Some("")), Vec::<u32>::new());
        assert_eq!(parse_ward_list(None), Vec::<u32>::new());
    }

    #[test]
    fn test_parse_ward_list_skips_malformed() {
        assert_eq!(parse_ward_list(Some("1,x,0,4")), vec![1, 4]);
    }

    #[test]
    fn test_todo_status_roundtrip_labels() {
        for status in [TodoStatus::Pending, TodoStatus::InProgress, TodoStatus::Completed] {
            assert_eq!(TodoStatus::from_str_lossy(status.as_str()), status);
        }
        assert_eq!(TodoStatus::from_str_lossy("bogus"), TodoStatus::Pending);
    }
}
