use std::sync::Arc;

use tauri::{AppHandle, State};

use crate::db::{
    AgentDb, DbCoordinator, DbDailyNote, DbGroupLeader, DbOfficer, DbPanchayath, DbPro,
    DbSupervisor, DbTeam, DbTeamMember, DbTestimonial, DbTodo, TodoStatus,
};
use crate::error::{AppError, CommandError};
use crate::forms::{
    CoordinatorForm, DailyNoteForm, GroupLeaderForm, PanchayathForm, ProForm, SupervisorForm,
    TestimonialForm,
};
use crate::hierarchy::{CardKey, CardTree, HierarchyGraph, SupervisorAttachment};
use crate::performance::{AgentPerformance, PerformanceReport};
use crate::services;
use crate::services::identity::LookupOutcome;
use crate::services::testimonials::TestimonialAnalytics;
use crate::services::todos::Reassignment;
use crate::session::CurrentUser;
use crate::state::{create_or_update_config, reload_config, AppState};
use crate::types::Config;

type CmdResult<T> = Result<T, CommandError>;

/// Run database work on the blocking pool so the webview stays responsive.
async fn run_db<T, F>(state: &Arc<AppState>, f: F) -> CmdResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AgentDb, &Config) -> Result<T, AppError> + Send + 'static,
{
    let state = state.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let config = state.config()?;
        state.with_db(|db| f(db, &config))
    })
    .await
    .map_err(|e| CommandError::from(AppError::Config(format!("Worker task failed: {}", e))))?
    .map_err(CommandError::from)
}

/// Like `run_db`, for reads that back a view: a failure also raises a
/// native notification naming the view.
async fn fetch<T, F>(app: &AppHandle, state: &Arc<AppState>, view: &str, f: F) -> CmdResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AgentDb, &Config) -> Result<T, AppError> + Send + 'static,
{
    let result = run_db(state, f).await;
    if let Err(ref e) = result {
        crate::notification::notify_fetch_failed(app, view, &e.message);
    }
    result
}

// =============================================================================
// Config + session
// =============================================================================

#[tauri::command]
pub fn get_config(state: State<Arc<AppState>>) -> CmdResult<Config> {
    Ok(state.config()?)
}

/// Reload configuration from disk
#[tauri::command]
pub fn reload_configuration(state: State<Arc<AppState>>) -> CmdResult<Config> {
    reload_config(&state).map_err(|e| AppError::Config(e).into())
}

#[tauri::command]
pub fn update_inactivity_threshold(
    state: State<Arc<AppState>>,
    days: u32,
) -> CmdResult<Config> {
    if days == 0 {
        return Err(AppError::validation("Threshold must be at least 1 day").into());
    }
    create_or_update_config(&state, |c| c.inactivity_threshold_days = days)
        .map_err(|e| AppError::Config(e).into())
}

#[tauri::command]
pub fn get_current_user(state: State<Arc<AppState>>) -> CmdResult<Option<CurrentUser>> {
    Ok(state.with_session(|s| Ok(s.current().cloned()))?)
}

#[tauri::command]
pub async fn lookup_mobile(
    state: State<'_, Arc<AppState>>,
    mobile: String,
) -> CmdResult<LookupOutcome> {
    run_db(&state, move |db, _| services::identity::lookup(db, &mobile)).await
}

#[tauri::command]
pub async fn sign_in(state: State<'_, Arc<AppState>>, mobile: String) -> CmdResult<CurrentUser> {
    let shared = state.inner().clone();
    run_db(&state, move |db, _| {
        shared.with_session(|session| services::identity::sign_in(db, session, &mobile))
    })
    .await
}

#[tauri::command]
pub fn sign_out(state: State<Arc<AppState>>) -> CmdResult<()> {
    Ok(state.with_session(services::identity::sign_out)?)
}

// =============================================================================
// Panchayaths
// =============================================================================

#[tauri::command]
pub async fn get_panchayaths(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> CmdResult<Vec<DbPanchayath>> {
    fetch(&app, &state, "panchayaths", |db, _| {
        services::panchayaths::list_panchayaths(db)
    })
    .await
}

#[tauri::command]
pub async fn get_panchayath(
    state: State<'_, Arc<AppState>>,
    id: String,
) -> CmdResult<DbPanchayath> {
    run_db(&state, move |db, _| services::panchayaths::get_panchayath(db, &id)).await
}

#[tauri::command]
pub async fn create_panchayath(
    state: State<'_, Arc<AppState>>,
    form: PanchayathForm,
) -> CmdResult<DbPanchayath> {
    let created_by = state
        .with_session(|s| Ok(s.current().map(|u| u.id.clone())))
        .map_err(CommandError::from)?;
    run_db(&state, move |db, _| {
        services::panchayaths::create_panchayath(db, &form, created_by.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn update_panchayath(
    state: State<'_, Arc<AppState>>,
    id: String,
    form: PanchayathForm,
) -> CmdResult<DbPanchayath> {
    run_db(&state, move |db, _| {
        services::panchayaths::update_panchayath(db, &id, &form)
    })
    .await
}

#[tauri::command]
pub async fn delete_panchayath(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| {
        services::panchayaths::delete_panchayath(db, &id, confirmed)
    })
    .await
}

#[tauri::command]
pub async fn get_ward_options(
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
) -> CmdResult<Vec<u32>> {
    run_db(&state, move |db, _| {
        services::panchayaths::panchayath_ward_options(db, &panchayath_id)
    })
    .await
}

// =============================================================================
// Roles
// =============================================================================

#[tauri::command]
pub async fn get_coordinators(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
) -> CmdResult<Vec<DbCoordinator>> {
    fetch(&app, &state, "coordinators", move |db, _| {
        services::roles::list_coordinators(db, &panchayath_id)
    })
    .await
}

#[tauri::command]
pub async fn create_coordinator(
    state: State<'_, Arc<AppState>>,
    form: CoordinatorForm,
) -> CmdResult<DbCoordinator> {
    run_db(&state, move |db, _| services::roles::create_coordinator(db, &form)).await
}

#[tauri::command]
pub async fn update_coordinator(
    state: State<'_, Arc<AppState>>,
    id: String,
    form: CoordinatorForm,
) -> CmdResult<DbCoordinator> {
    run_db(&state, move |db, _| services::roles::update_coordinator(db, &id, &form)).await
}

#[tauri::command]
pub async fn delete_coordinator(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::roles::delete_coordinator(db, &id, confirmed)).await
}

#[tauri::command]
pub async fn get_supervisors(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
) -> CmdResult<Vec<DbSupervisor>> {
    fetch(&app, &state, "supervisors", move |db, _| {
        services::roles::list_supervisors(db, &panchayath_id)
    })
    .await
}

#[tauri::command]
pub async fn create_supervisor(
    state: State<'_, Arc<AppState>>,
    form: SupervisorForm,
) -> CmdResult<DbSupervisor> {
    run_db(&state, move |db, _| services::roles::create_supervisor(db, &form)).await
}

#[tauri::command]
pub async fn update_supervisor(
    state: State<'_, Arc<AppState>>,
    id: String,
    form: SupervisorForm,
) -> CmdResult<DbSupervisor> {
    run_db(&state, move |db, _| services::roles::update_supervisor(db, &id, &form)).await
}

#[tauri::command]
pub async fn delete_supervisor(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::roles::delete_supervisor(db, &id, confirmed)).await
}

#[tauri::command]
pub async fn get_group_leaders(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
) -> CmdResult<Vec<DbGroupLeader>> {
    fetch(&app, &state, "group leaders", move |db, _| {
        services::roles::list_group_leaders(db, &panchayath_id)
    })
    .await
}

#[tauri::command]
pub async fn create_group_leader(
    state: State<'_, Arc<AppState>>,
    form: GroupLeaderForm,
) -> CmdResult<DbGroupLeader> {
    run_db(&state, move |db, _| services::roles::create_group_leader(db, &form)).await
}

#[tauri::command]
pub async fn update_group_leader(
    state: State<'_, Arc<AppState>>,
    id: String,
    form: GroupLeaderForm,
) -> CmdResult<DbGroupLeader> {
    run_db(&state, move |db, _| services::roles::update_group_leader(db, &id, &form)).await
}

#[tauri::command]
pub async fn delete_group_leader(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::roles::delete_group_leader(db, &id, confirmed)).await
}

#[tauri::command]
pub async fn get_pros(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
) -> CmdResult<Vec<DbPro>> {
    fetch(&app, &state, "PROs", move |db, _| {
        services::roles::list_pros(db, &panchayath_id)
    })
    .await
}

#[tauri::command]
pub async fn create_pro(state: State<'_, Arc<AppState>>, form: ProForm) -> CmdResult<DbPro> {
    run_db(&state, move |db, _| services::roles::create_pro(db, &form)).await
}

#[tauri::command]
pub async fn update_pro(
    state: State<'_, Arc<AppState>>,
    id: String,
    form: ProForm,
) -> CmdResult<DbPro> {
    run_db(&state, move |db, _| services::roles::update_pro(db, &id, &form)).await
}

#[tauri::command]
pub async fn delete_pro(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::roles::delete_pro(db, &id, confirmed)).await
}

#[tauri::command]
pub async fn get_coordinator_options(
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
) -> CmdResult<Vec<DbCoordinator>> {
    run_db(&state, move |db, _| {
        services::roles::coordinator_options(db, &panchayath_id)
    })
    .await
}

#[tauri::command]
pub async fn get_supervisor_options(
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
    ward: u32,
) -> CmdResult<Vec<DbSupervisor>> {
    run_db(&state, move |db, _| {
        services::roles::supervisor_options(db, &panchayath_id, ward)
    })
    .await
}

#[tauri::command]
pub async fn get_group_leader_options(
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
    ward: u32,
) -> CmdResult<Vec<DbGroupLeader>> {
    run_db(&state, move |db, _| {
        services::roles::group_leader_options(db, &panchayath_id, ward)
    })
    .await
}

// =============================================================================
// Hierarchy
// =============================================================================

#[tauri::command]
pub async fn get_hierarchy_cards(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
    mode: Option<CardKey>,
) -> CmdResult<CardTree> {
    fetch(&app, &state, "hierarchy", move |db, _| {
        services::hierarchy::card_tree(db, &panchayath_id, mode.unwrap_or_default())
    })
    .await
}

#[tauri::command]
pub async fn get_hierarchy_forest(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    mode: Option<CardKey>,
) -> CmdResult<Vec<CardTree>> {
    fetch(&app, &state, "hierarchy", move |db, _| {
        services::hierarchy::card_forest(db, mode.unwrap_or_default())
    })
    .await
}

#[tauri::command]
pub async fn get_hierarchy_graph(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: String,
    attachment: Option<SupervisorAttachment>,
) -> CmdResult<HierarchyGraph> {
    fetch(&app, &state, "hierarchy graph", move |db, config| {
        services::hierarchy::graph(
            db,
            &panchayath_id,
            &config.graph_layout,
            attachment.unwrap_or_default(),
        )
    })
    .await
}

// =============================================================================
// Daily notes + performance
// =============================================================================

#[tauri::command]
pub async fn save_daily_note(
    state: State<'_, Arc<AppState>>,
    form: DailyNoteForm,
) -> CmdResult<DbDailyNote> {
    run_db(&state, move |db, _| services::daily_notes::save_daily_note(db, &form)).await
}

#[tauri::command]
pub async fn get_recent_notes(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    mobile: String,
) -> CmdResult<Vec<DbDailyNote>> {
    fetch(&app, &state, "daily notes", move |db, config| {
        services::daily_notes::recent_notes(db, &mobile, config.activity_lookback_days)
    })
    .await
}

#[tauri::command]
pub async fn get_notes_for_date(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    date: String,
) -> CmdResult<Vec<DbDailyNote>> {
    fetch(&app, &state, "daily notes", move |db, _| {
        services::daily_notes::notes_for_date(db, &date)
    })
    .await
}

#[tauri::command]
pub async fn delete_daily_note(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| {
        services::daily_notes::delete_daily_note(db, &id, confirmed)
    })
    .await
}

#[tauri::command]
pub async fn get_performance_report(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    panchayath_id: Option<String>,
) -> CmdResult<PerformanceReport> {
    fetch(&app, &state, "performance report", move |db, config| {
        services::performance::performance_report(db, config, panchayath_id.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn get_agent_performance(
    state: State<'_, Arc<AppState>>,
    mobile: String,
) -> CmdResult<AgentPerformance> {
    run_db(&state, move |db, config| {
        services::performance::agent_report(db, config, &mobile)
    })
    .await
}

// =============================================================================
// Todos
// =============================================================================

#[tauri::command]
pub async fn get_todos(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    status: Option<TodoStatus>,
) -> CmdResult<Vec<DbTodo>> {
    fetch(&app, &state, "tasks", move |db, _| {
        services::todos::list_todos(db, status)
    })
    .await
}

#[tauri::command]
pub async fn create_todo(
    state: State<'_, Arc<AppState>>,
    text: String,
    assigned_to: Option<String>,
) -> CmdResult<DbTodo> {
    run_db(&state, move |db, _| {
        services::todos::create_todo(db, &text, assigned_to.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn set_todo_status(
    state: State<'_, Arc<AppState>>,
    id: String,
    status: TodoStatus,
) -> CmdResult<DbTodo> {
    run_db(&state, move |db, _| services::todos::set_todo_status(db, &id, status)).await
}

#[tauri::command]
pub async fn set_todo_remarks(
    state: State<'_, Arc<AppState>>,
    id: String,
    remarks: Option<String>,
) -> CmdResult<DbTodo> {
    run_db(&state, move |db, _| {
        services::todos::set_todo_remarks(db, &id, remarks.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn reassign_todo(
    state: State<'_, Arc<AppState>>,
    id: String,
    to: Reassignment,
) -> CmdResult<DbTodo> {
    run_db(&state, move |db, _| services::todos::reassign_todo(db, &id, &to)).await
}

#[tauri::command]
pub async fn delete_todo(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::todos::delete_todo(db, &id, confirmed)).await
}

// =============================================================================
// Teams + officers
// =============================================================================

#[tauri::command]
pub async fn get_teams(app: AppHandle, state: State<'_, Arc<AppState>>) -> CmdResult<Vec<DbTeam>> {
    fetch(&app, &state, "teams", |db, _| services::teams::list_teams(db)).await
}

#[tauri::command]
pub async fn create_team(
    state: State<'_, Arc<AppState>>,
    name: String,
    description: Option<String>,
) -> CmdResult<DbTeam> {
    run_db(&state, move |db, _| {
        services::teams::create_team(db, &name, description.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn delete_team(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::teams::delete_team(db, &id, confirmed)).await
}

#[tauri::command]
pub async fn get_team_members(
    state: State<'_, Arc<AppState>>,
    team_id: String,
) -> CmdResult<Vec<DbTeamMember>> {
    run_db(&state, move |db, _| services::teams::list_team_members(db, &team_id)).await
}

#[tauri::command]
pub async fn add_team_member(
    state: State<'_, Arc<AppState>>,
    team_id: String,
    name: String,
    mobile: String,
    role: Option<String>,
) -> CmdResult<DbTeamMember> {
    run_db(&state, move |db, _| {
        services::teams::add_team_member(db, &team_id, &name, &mobile, role.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn remove_team_member(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::teams::remove_team_member(db, &id, confirmed)).await
}

#[tauri::command]
pub async fn get_officers(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> CmdResult<Vec<DbOfficer>> {
    fetch(&app, &state, "officers", |db, _| services::teams::list_officers(db)).await
}

#[tauri::command]
pub async fn add_officer(
    state: State<'_, Arc<AppState>>,
    name: String,
    mobile: String,
    designation: Option<String>,
) -> CmdResult<DbOfficer> {
    run_db(&state, move |db, _| {
        services::teams::add_officer(db, &name, &mobile, designation.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn delete_officer(
    state: State<'_, Arc<AppState>>,
    id: String,
    confirmed: bool,
) -> CmdResult<()> {
    run_db(&state, move |db, _| services::teams::delete_officer(db, &id, confirmed)).await
}

// =============================================================================
// Testimonials
// =============================================================================

#[tauri::command]
pub async fn submit_testimonial(
    state: State<'_, Arc<AppState>>,
    form: TestimonialForm,
) -> CmdResult<DbTestimonial> {
    run_db(&state, move |db, _| {
        services::testimonials::submit_testimonial(db, &form)
    })
    .await
}

#[tauri::command]
pub async fn get_testimonials(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    agent_mobile: Option<String>,
) -> CmdResult<Vec<DbTestimonial>> {
    fetch(&app, &state, "testimonials", move |db, _| {
        services::testimonials::list_testimonials(db, agent_mobile.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn get_testimonial_analytics(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> CmdResult<TestimonialAnalytics> {
    fetch(&app, &state, "testimonial analytics", |db, _| {
        services::testimonials::testimonial_analytics(db)
    })
    .await
}
