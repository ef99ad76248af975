use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the workbook location
pub const ENV_EXCEL_PATH: &str = "SR_EXCEL_PATH";
/// Environment variable overriding the sheet name
pub const ENV_SHEET_NAME: &str = "SR_SHEET_NAME";
/// Environment variable overriding the preset salesperson
pub const ENV_DEFAULT_SALESPERSON: &str = "SR_DEFAULT_SALESPERSON";

pub const DEFAULT_SHEET_NAME: &str = "Reports";
pub const DEFAULT_SALESPERSON: &str = "Kim Beomjun";
pub const DEFAULT_FILE_NAME: &str = "sales_reports.xlsx";
const APP_DIR_NAME: &str = "sales-report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub excel_path: PathBuf,
    pub sheet_name: String,
    pub default_salesperson: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let excel_path = match get(ENV_EXCEL_PATH) {
            Some(path) => {
                tracing::info!("Using workbook from {}: {}", ENV_EXCEL_PATH, path);
                PathBuf::from(path)
            }
            None => default_excel_path(),
        };

        Config {
            excel_path,
            sheet_name: get(ENV_SHEET_NAME).unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            default_salesperson: get(ENV_DEFAULT_SALESPERSON)
                .unwrap_or_else(|| DEFAULT_SALESPERSON.to_string()),
        }
    }

    pub fn excel_path(&self) -> &Path {
        &self.excel_path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// `<data dir>/sales-report/sales_reports.xlsx`, or the working directory
/// when the platform has no data directory
fn default_excel_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR_NAME).join(DEFAULT_FILE_NAME),
        None => {
            tracing::warn!("No data directory available, using working directory for the workbook");
            PathBuf::from(DEFAULT_FILE_NAME)
        }
    }
}
