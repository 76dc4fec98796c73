// Performance service: rate every registered agent from recent daily notes.

use crate::db::AgentDb;
use crate::error::AppError;
use crate::forms::validate_mobile;
use crate::performance::{agent_performance, build_report, AgentPerformance, PerformanceReport};
use crate::types::Config;
use crate::util::lookback_start;

/// Report for all agents, optionally scoped to one panchayath.
pub fn performance_report(
    db: &AgentDb,
    config: &Config,
    panchayath_id: Option<&str>,
) -> Result<PerformanceReport, AppError> {
    if let Some(id) = panchayath_id {
        super::require_panchayath(db, id)?;
    }
    let since = lookback_start(config.activity_lookback_days);
    let agents = db.get_all_agents(panchayath_id)?;
    let notes = db.get_notes_since(&since)?;
    let report = build_report(&agents, &notes, &since, config.inactivity_threshold_days);
    log::info!(
        "Performance report since {}: {} agents, {} inactive",
        since,
        report.total_agents,
        report.inactive_agents
    );
    Ok(report)
}

/// Rating for the agent registered under `mobile`.
pub fn agent_report(db: &AgentDb, config: &Config, mobile: &str) -> Result<AgentPerformance, AppError> {
    let mobile = validate_mobile(mobile)?;
    let agent = db
        .find_mobile_owner(&mobile, None)?
        .ok_or_else(|| AppError::NotRegistered(mobile.clone()))?;
    let notes =
        db.get_notes_for_mobile_since(&mobile, &lookback_start(config.activity_lookback_days))?;
    Ok(agent_performance(&agent, &notes, config.inactivity_threshold_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{coordinator, panchayath, test_db};
    use crate::db::DbDailyNote;
    use crate::util::{date_days_before, now_rfc3339};

    fn leave(db: &AgentDb, mobile: &str, days_ago: u32, is_leave: bool) {
        let date = date_days_before(chrono::Local::now().date_naive(), days_ago);
        db.save_daily_note(&DbDailyNote {
            id: format!("{mobile}-{days_ago}"),
            mobile_number: mobile.to_string(),
            date,
            activity: if is_leave { String::new() } else { "Ward visit".into() },
            is_leave,
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
        })
        .unwrap();
    }

    #[test]
    fn test_three_leave_days_marks_inactive() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        coordinator(&db, "c1", "p1", "Asha", "9876543210", 1);
        coordinator(&db, "c2", "p1", "Bindu", "9876543211", 2);
        for days_ago in 0..3 {
            leave(&db, "9876543210", days_ago, true);
        }
        leave(&db, "9876543210", 3, false);
        leave(&db, "9876543211", 0, true);

        let report = performance_report(&db, &Config::default(), Some("p1")).unwrap();
        assert_eq!(report.total_agents, 2);
        assert_eq!(report.inactive_agents, 1);
        assert_eq!(report.agents[0].name, "Asha");
        assert_eq!(report.agents[0].consecutive_leave_days, 3);

        let bindu = agent_report(&db, &Config::default(), "9876543211").unwrap();
        assert!(!bindu.inactive);
    }

    #[test]
    fn test_threshold_comes_from_config() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        coordinator(&db, "c1", "p1", "Asha", "9876543210", 1);
        leave(&db, "9876543210", 0, true);

        let config = Config {
            inactivity_threshold_days: 1,
            ..Config::default()
        };
        assert!(agent_report(&db, &config, "9876543210").unwrap().inactive);
        assert!(matches!(
            agent_report(&db, &config, "9999999999"),
            Err(AppError::NotRegistered(_))
        ));
    }
}
