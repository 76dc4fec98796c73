pub mod db;
pub mod error;
pub mod forms;
pub mod hierarchy;
mod migrations;
pub mod performance;
pub mod services;
pub mod session;
pub mod state;
pub mod types;
pub mod util;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod notification;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;

    use state::AppState;
    use tauri::Manager;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let state = Arc::new(AppState::new());
            if let Ok(session) = state.session.lock() {
                match session.current() {
                    Some(user) => log::info!("Restored session for {} ({:?})", user.name, user.role),
                    None => log::info!("No signed-in user"),
                }
            }
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Config + session
            commands::get_config,
            commands::reload_configuration,
            commands::update_inactivity_threshold,
            commands::get_current_user,
            commands::sign_in,
            commands::sign_out,
            commands::lookup_mobile,
            // Panchayaths
            commands::get_panchayaths,
            commands::get_panchayath,
            commands::create_panchayath,
            commands::update_panchayath,
            commands::delete_panchayath,
            commands::get_ward_options,
            // Roles
            commands::get_coordinators,
            commands::create_coordinator,
            commands::update_coordinator,
            commands::delete_coordinator,
            commands::get_supervisors,
            commands::create_supervisor,
            commands::update_supervisor,
            commands::delete_supervisor,
            commands::get_group_leaders,
            commands::create_group_leader,
            commands::update_group_leader,
            commands::delete_group_leader,
            commands::get_pros,
            commands::create_pro,
            commands::update_pro,
            commands::delete_pro,
            commands::get_coordinator_options,
            commands::get_supervisor_options,
            commands::get_group_leader_options,
            // Hierarchy
            commands::get_hierarchy_cards,
            commands::get_hierarchy_forest,
            commands::get_hierarchy_graph,
            // Daily notes + performance
            commands::save_daily_note,
            commands::get_recent_notes,
            commands::get_notes_for_date,
            commands::delete_daily_note,
            commands::get_performance_report,
            commands::get_agent_performance,
            // Todos
            commands::get_todos,
            commands::create_todo,
            commands::set_todo_status,
            commands::set_todo_remarks,
            commands::reassign_todo,
            commands::delete_todo,
            // Teams + officers
            commands::get_teams,
            commands::create_team,
            commands::delete_team,
            commands::get_team_members,
            commands::add_team_member,
            commands::remove_team_member,
            commands::get_officers,
            commands::add_officer,
            commands::delete_officer,
            // Testimonials
            commands::submit_testimonial,
            commands::get_testimonials,
            commands::get_testimonial_analytics,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
