//! Native notification wrapper
//!
//! Uses tauri-plugin-notification to surface failures that happen while a
//! view is loading data.

use tauri::AppHandle;
use tauri_plugin_notification::NotificationExt;

const MAX_BODY_CHARS: usize = 100;

/// Send a notification to the user
pub fn send_notification(app: &AppHandle, title: &str, body: &str) -> Result<(), String> {
    app.notification()
        .builder()
        .title(title)
        .body(body)
        .show()
        .map_err(|e| format!("Failed to send notification: {}", e))
}

/// Tell the user a view could not load. The view keeps what it showed before.
pub fn notify_fetch_failed(app: &AppHandle, view: &str, error: &str) {
    let title = format!("Could not load {}", view);
    let body: String = if error.chars().count() > MAX_BODY_CHARS {
        let cut: String = error.chars().take(MAX_BODY_CHARS).collect();
        format!("{}...", cut)
    } else {
        error.to_string()
    };

    if let Err(e) = send_notification(app, &title, &body) {
        log::warn!("{}", e);
    }
}
