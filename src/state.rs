use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::db::AgentDb;
use crate::error::AppError;
use crate::session::SessionStore;
use crate::types::Config;

/// Application state shared by every command.
pub struct AppState {
    pub config: Mutex<Config>,
    pub db: Mutex<Option<AgentDb>>,
    pub session: Mutex<SessionStore>,
}

impl AppState {
    /// Load config, open the database and restore the session from the
    /// default locations under `~/.panchayath/`.
    pub fn new() -> Self {
        let config = load_config().unwrap_or_else(|e| {
            log::error!("{e}. Falling back to default configuration.");
            Config::default()
        });

        let db = match AgentDb::open(config.database_path.as_deref()) {
            Ok(db) => Some(db),
            Err(e) => {
                log::warn!("Failed to open database: {e}. Data features disabled.");
                None
            }
        };

        let session_path = SessionStore::default_path().unwrap_or_else(|e| {
            log::warn!("{e}. Session will not survive restarts.");
            PathBuf::from("session.json")
        });

        Self::from_parts(config, db, SessionStore::open(session_path))
    }

    pub fn from_parts(config: Config, db: Option<AgentDb>, session: SessionStore) -> Self {
        Self {
            config: Mutex::new(config),
            db: Mutex::new(db),
            session: Mutex::new(session),
        }
    }

    /// Snapshot of the current config.
    pub fn config(&self) -> Result<Config, AppError> {
        self.config
            .lock()
            .map(|c| c.clone())
            .map_err(|_| AppError::Config("Lock poisoned".to_string()))
    }

    /// Run `f` against the open database.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&AgentDb) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let guard = self
            .db
            .lock()
            .map_err(|_| AppError::Config("Lock poisoned".to_string()))?;
        let db = guard
            .as_ref()
            .ok_or_else(|| AppError::Config("Database not available".to_string()))?;
        f(db)
    }

    /// Run `f` against the session store.
    pub fn with_session<T>(
        &self,
        f: impl FnOnce(&mut SessionStore) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AppError::Config("Lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the canonical config file path (~/.panchayath/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".panchayath").join("config.json"))
}

/// Create or update config.json.
///
/// Clones the in-memory config, applies the mutator, writes it to disk and
/// only then replaces the in-memory copy.
pub fn create_or_update_config(
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, String> {
    let path = config_path()?;
    update_config_at(state, &path, mutator)
}

fn update_config_at(
    state: &AppState,
    path: &Path,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, String> {
    let mut guard = state.config.lock().map_err(|_| "Lock poisoned")?;

    let mut config = guard.clone();
    mutator(&mut config);

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;

    *guard = config.clone();

    Ok(config)
}

/// Load configuration from ~/.panchayath/config.json.
///
/// A missing file yields the defaults; a file that fails to parse is an error.
pub fn load_config() -> Result<Config, String> {
    load_config_from(&config_path()?)
}

fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Reload configuration from disk
pub fn reload_config(state: &AppState) -> Result<Config, String> {
    let config = load_config()?;
    let mut guard = state.config.lock().map_err(|_| "Lock poisoned")?;
    *guard = config.clone();
    Ok(config)
}
