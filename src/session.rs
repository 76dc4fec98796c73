//! Signed-in user, persisted across restarts.
//!
//! The session file is a JSON object with a single `currentUser` key. A
//! missing or unreadable file means nobody is signed in. There is no
//! credential involved: identity is the mobile-number lookup in
//! `services::identity`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::AgentRole;

pub const SESSION_KEY: &str = "currentUser";

/// Which tier of the identity lookup matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Coordinator,
    Supervisor,
    GroupLeader,
    Pro,
    Admin,
}

impl From<AgentRole> for UserRole {
    fn from(role: AgentRole) -> Self {
        match role {
            AgentRole::Coordinator => UserRole::Coordinator,
            AgentRole::Supervisor => UserRole::Supervisor,
            AgentRole::GroupLeader => UserRole::GroupLeader,
            AgentRole::Pro => UserRole::Pro,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub role: UserRole,
    pub name: String,
    pub mobile_number: String,
    /// Set for field agents; admins are not tied to a panchayath.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panchayath_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "currentUser")]
    current_user: Option<CurrentUser>,
}

pub struct SessionStore {
    path: PathBuf,
    current: Option<CurrentUser>,
}

impl SessionStore {
    /// Open the store at `path` and load whatever user it holds.
    pub fn open(path: PathBuf) -> Self {
        let current = read_session(&path);
        Self { path, current }
    }

    /// Default location: `~/.panchayath/session.json`.
    pub fn default_path() -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Could not find home directory")?;
        Ok(home.join(".panchayath").join("session.json"))
    }

    pub fn current(&self) -> Option<&CurrentUser> {
        self.current.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `user` as the signed-in user.
    pub fn sign_in(&mut self, user: CurrentUser) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create session dir: {}", e))?;
            }
        }
        let file = SessionFile {
            current_user: Some(user.clone()),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| format!("Failed to serialize session: {}", e))?;
        fs::write(&self.path, content).map_err(|e| format!("Failed to write session: {}", e))?;
        log::info!("Signed in {} ({:?})", user.name, user.role);
        self.current = Some(user);
        Ok(())
    }

    /// Forget the signed-in user, on disk and in memory.
    pub fn sign_out(&mut self) -> Result<(), String> {
        self.current = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to clear session: {}", e)),
        }
    }
}

fn read_session(path: &Path) -> Option<CurrentUser> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<SessionFile>(&content) {
        Ok(file) => file.current_user,
        Err(e) => {
            log::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}
