use serde::{Deserialize, Serialize};

/// Represents a cell value with type information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    String(String),
    Number(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 format
    Error(String),
}

impl CellValue {
    /// Empty cells and blank strings both count as "no value"
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text shown in the list view and used for id matching
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dt.clone(),
            CellValue::Error(e) => format!("#{}", e),
        }
    }

    /// Interpret the cell as a whole, non-negative quantity
    pub fn as_quantity(&self) -> Option<u32> {
        match self {
            CellValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as u32),
            CellValue::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        }
    }
}

/// A sheet read in full: the header row plus every non-blank data row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetTable {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    /// Index of a header by exact (trimmed) text
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == header)
    }

    pub fn cell(&self, row: &[CellValue], header: &str) -> CellValue {
        self.column(header)
            .and_then(|idx| row.get(idx).cloned())
            .unwrap_or_default()
    }
}

/// Excel-specific errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcelError {
    pub message: String,
    pub error_type: ExcelErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExcelErrorType {
    FileNotFound,
    InvalidFormat,
    SheetNotFound,
    ReadError,
    WriteError,
    WatchError,
}

impl std::fmt::Display for ExcelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExcelError {}

impl ExcelError {
    pub fn new(message: impl Into<String>, error_type: ExcelErrorType) -> Self {
        ExcelError {
            message: message.into(),
            error_type,
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        ExcelError::new(format!("File not found: {}", path), ExcelErrorType::FileNotFound)
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::InvalidFormat)
    }

    pub fn sheet_not_found(sheet: &str) -> Self {
        ExcelError::new(format!("Sheet not found: {}", sheet), ExcelErrorType::SheetNotFound)
    }

    pub fn read_error(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::ReadError)
    }

    pub fn write_error(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::WriteError)
    }

    pub fn watch_error(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::WatchError)
    }
}

/// Change notification for the watched workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookChange {
    pub path: String,
    pub change_type: FileChangeType,
    pub new_checksum: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileChangeType {
    Modified,
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_numbers_without_fraction() {
        assert_eq!(CellValue::Number(3.0).display(), "3");
        assert_eq!(CellValue::Number(2.5).display(), "2.5");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_as_quantity() {
        assert_eq!(CellValue::Number(4.0).as_quantity(), Some(4));
        assert_eq!(CellValue::String(" 12 ".to_string()).as_quantity(), Some(12));
        assert_eq!(CellValue::Number(-1.0).as_quantity(), None);
        assert_eq!(CellValue::Number(1.5).as_quantity(), None);
        assert_eq!(CellValue::Empty.as_quantity(), None);
    }

    #[test]
    fn test_blank_cells() {
        assert_eq!(CellValue::default(), CellValue::Empty);
        assert!(CellValue::default().is_blank());
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::String("  ".to_string()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }
}
