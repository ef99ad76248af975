use sales_report::catalog::{ACCESSORY_ITEMS, CHARGER_MODELS, MAX_QUANTITY, MAX_REMARKS_CHARS};
use sales_report::excel::{create_event_channel, ExcelError, WorkbookWatcher};
use sales_report::{
    Config, FormDefaults, OtherModels, ReportError, ReportId, ReportInput,
    ReportPreview, ReportStore, ReportTable, SalesReport, Status,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tauri::ipc::Response;
use tauri::{command, Emitter, State, Window};
use tokio::sync::Mutex;

pub struct AppState {
    pub config: Config,
    pub store: ReportStore,
    /// Held for every workbook access; listing may also write (id retrofit)
    pub write_lock: Mutex<()>,
    pub workbook_watcher: Mutex<Option<WorkbookWatcher>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            store: ReportStore::from_config(&config),
            config,
            write_lock: Mutex::new(()),
            workbook_watcher: Mutex::new(None),
        }
    }

    fn defaults(&self) -> FormDefaults {
        FormDefaults::new(self.config.default_salesperson.clone())
    }
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    kind: String,
    message: String,
    /// Form fields the error refers to, for highlighting
    fields: Vec<String>,
}

impl CommandError {
    fn internal(message: impl Into<String>) -> Self {
        CommandError {
            kind: "internal".to_string(),
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

impl From<ReportError> for CommandError {
    fn from(e: ReportError) -> Self {
        let fields = match &e {
            ReportError::Validation(result) => result.errors.iter().map(|err| err.field.clone()).collect(),
            _ => Vec::new(),
        };
        CommandError {
            kind: e.kind().to_string(),
            message: e.to_string(),
            fields,
        }
    }
}

impl From<ExcelError> for CommandError {
    fn from(e: ExcelError) -> Self {
        ReportError::from(e).into()
    }
}

/// Run blocking workbook I/O off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T, CommandError>
where
    F: FnOnce() -> Result<T, ReportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CommandError::internal(format!("Task join error: {}", e)))?
        .map_err(CommandError::from)
}

#[derive(Debug, Serialize)]
pub struct StatusOption {
    pub value: Status,
    pub label: &'static str,
}

/// Everything the form needs to render itself
#[derive(Debug, Serialize)]
pub struct FormSetup {
    pub salesperson: String,
    pub today: String,
    pub models: Vec<&'static str>,
    pub accessories: Vec<&'static str>,
    pub statuses: Vec<StatusOption>,
    pub max_quantity: u32,
    pub max_remarks_chars: usize,
    pub excel_path: String,
    pub sheet_name: String,
}

// Form commands

#[command]
pub fn get_form_defaults(state: State<'_, Arc<AppState>>) -> FormSetup {
    let defaults = state.defaults();

    FormSetup {
        salesperson: defaults.salesperson,
        today: defaults.today.format("%Y-%m-%d").to_string(),
        models: CHARGER_MODELS.to_vec(),
        accessories: ACCESSORY_ITEMS.to_vec(),
        statuses: Status::ALL
            .iter()
            .map(|s| StatusOption {
                value: *s,
                label: s.as_str(),
            })
            .collect(),
        max_quantity: MAX_QUANTITY,
        max_remarks_chars: MAX_REMARKS_CHARS,
        excel_path: state.store.path().display().to_string(),
        sheet_name: state.store.sheet_name().to_string(),
    }
}

/// Hyphenate the contact number as it is typed
#[command]
pub fn normalize_phone(raw: String) -> String {
    sales_report::format_phone(&raw)
}

#[command]
pub fn add_other_model(models: OtherModels, name: String, quantity: u32) -> Result<OtherModels, CommandError> {
    Ok(sales_report::add_other_model(models, &name, quantity)?)
}

#[command]
pub fn remove_other_model(models: OtherModels, index: usize) -> Result<OtherModels, CommandError> {
    Ok(sales_report::remove_other_model(models, index)?)
}

#[command]
pub fn preview_report(state: State<'_, Arc<AppState>>, input: ReportInput) -> ReportPreview {
    sales_report::preview_report(&input, &state.defaults())
}

// Report commands

#[command]
pub async fn create_report(state: State<'_, Arc<AppState>>, input: ReportInput) -> Result<SalesReport, CommandError> {
    let fields = sales_report::normalize(&input, &state.defaults())?;

    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || store.create(fields)).await
}

#[command]
pub async fn update_report(
    state: State<'_, Arc<AppState>>,
    id: ReportId,
    input: ReportInput,
) -> Result<SalesReport, CommandError> {
    let fields = sales_report::normalize(&input, &state.defaults())?;

    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || store.update(&id, fields)).await
}

#[command]
pub async fn delete_report(state: State<'_, Arc<AppState>>, id: ReportId) -> Result<(), CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || store.delete(&id)).await
}

/// Remove several reports at once; unknown ids are skipped
#[command]
pub async fn delete_reports(state: State<'_, Arc<AppState>>, ids: Vec<ReportId>) -> Result<usize, CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || store.delete_many(&ids)).await
}

/// The list view, narrowed by the search box when `query` is given
#[command]
pub async fn list_reports(state: State<'_, Arc<AppState>>, query: Option<String>) -> Result<ReportTable, CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || match query {
        Some(q) => store.list_filtered(&q),
        None => store.list(),
    })
    .await
}

#[command]
pub async fn get_report(state: State<'_, Arc<AppState>>, id: ReportId) -> Result<SalesReport, CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || store.get(&id)).await
}

// Workbook commands

/// Raw workbook bytes for the browser-side download
#[command]
pub async fn download_workbook(state: State<'_, Arc<AppState>>) -> Result<Response, CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    let bytes = run_blocking(move || store.export_bytes()).await?;
    Ok(Response::new(bytes))
}

/// Summary workbook: every record with its totals plus item totals
#[command]
pub async fn download_summary(state: State<'_, Arc<AppState>>) -> Result<Response, CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    let bytes = run_blocking(move || store.export_summary_bytes()).await?;
    Ok(Response::new(bytes))
}

/// Workbook holding the one selected report
#[command]
pub async fn download_report(state: State<'_, Arc<AppState>>, id: ReportId) -> Result<Response, CommandError> {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    let bytes = run_blocking(move || store.export_record_bytes(&id)).await?;
    Ok(Response::new(bytes))
}

/// Save a copy of the workbook where the user picked
#[command]
pub async fn export_workbook(state: State<'_, Arc<AppState>>, destination: String) -> Result<u64, CommandError> {
    let destination = PathBuf::from(destination);
    if destination.as_os_str().is_empty() {
        return Err(CommandError::internal("No destination given"));
    }

    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    run_blocking(move || store.export_to(&destination)).await
}

#[command]
pub async fn workbook_checksum(state: State<'_, Arc<AppState>>) -> Result<String, CommandError> {
    let store = state.store.clone();
    run_blocking(move || store.checksum()).await
}

/// Start or stop forwarding workbook changes to the window as
/// `workbook-changed` events
#[command]
pub async fn watch_workbook(window: Window, state: State<'_, Arc<AppState>>, enable: bool) -> Result<(), CommandError> {
    let mut watcher_guard = state.workbook_watcher.lock().await;

    if !enable {
        if watcher_guard.take().is_some() {
            tracing::info!("Stopped watching workbook");
        }
        return Ok(());
    }

    if watcher_guard.is_some() {
        return Ok(());
    }

    let (tx, rx) = create_event_channel();
    let watcher = WorkbookWatcher::start(state.store.path(), tx)?;

    // Ends once the watcher is dropped and its sender goes away
    std::thread::spawn(move || {
        while let Ok(change) = rx.recv() {
            tracing::debug!(?change, "workbook changed");
            let _ = window.emit("workbook-changed", &change);
        }
    });

    tracing::info!("Watching workbook {}", watcher.path().display());
    *watcher_guard = Some(watcher);
    Ok(())
}
