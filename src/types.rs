use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::hierarchy::GraphLayout;

/// Configuration stored in ~/.panchayath/config.json
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Overrides `~/.panchayath/panchayath.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Consecutive leave days at which an agent is reported inactive.
    #[serde(default = "default_inactivity_threshold")]
    pub inactivity_threshold_days: u32,
    /// How far back the performance report reads daily notes.
    #[serde(default = "default_activity_lookback")]
    pub activity_lookback_days: u32,
    #[serde(default)]
    pub graph_layout: GraphLayout,
}

fn default_inactivity_threshold() -> u32 {
    3
}

fn default_activity_lookback() -> u32 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            inactivity_threshold_days: default_inactivity_threshold(),
            activity_lookback_days: default_activity_lookback(),
            graph_layout: GraphLayout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.inactivity_threshold_days, 3);
        assert_eq!(config.activity_lookback_days, 30);
        assert!(config.database_path.is_none());
        assert_eq!(config.graph_layout, GraphLayout::default());
    }

    #[test]
    fn test_partial_graph_layout() {
        let config: Config =
            serde_json::from_str(r#"{"inactivityThresholdDays": 5, "graphLayout": {"spacing": 300}}"#)
                .unwrap();
        assert_eq!(config.inactivity_threshold_days, 5);
        assert_eq!(config.graph_layout.spacing, 300.0);
        assert_eq!(config.graph_layout.level_gap, GraphLayout::default().level_gap);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("inactivityThresholdDays"));
        assert!(json.contains("proSpacing"));
        assert!(!json.contains("databasePath"));
    }
}
