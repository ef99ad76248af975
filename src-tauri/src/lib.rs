mod commands;
mod logging;

use commands::AppState;
use sales_report::Config;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::initialize();

    let config = Config::from_env();
    let app_state = Arc::new(AppState::new(config));

    // A failure here is not fatal: the next access retries and reports it
    match app_state.store.ensure_workbook() {
        Ok(true) => tracing::info!("New workbook at {}", app_state.store.path().display()),
        Ok(false) => tracing::info!("Using workbook {}", app_state.store.path().display()),
        Err(e) => tracing::error!("Workbook not ready: {}", e),
    }

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // Form commands
            commands::get_form_defaults,
            commands::normalize_phone,
            commands::add_other_model,
            commands::remove_other_model,
            commands::preview_report,
            // Report commands
            commands::create_report,
            commands::update_report,
            commands::delete_report,
            commands::delete_reports,
            commands::list_reports,
            commands::get_report,
            // Workbook commands
            commands::download_workbook,
            commands::download_summary,
            commands::download_report,
            commands::export_workbook,
            commands::workbook_checksum,
            commands::watch_workbook,
        ])
        .setup(|app| {
            #[cfg(debug_assertions)]
            {
                if let Some(window) = app.get_webview_window("main") {
                    window.open_devtools();
                }
            }
            Ok(())
        })
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Application exited with an error: {}", e);
        std::process::exit(1);
    }
}
