use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use umya_spreadsheet::{self, new_file_empty_worksheet, reader, writer, Spreadsheet, Worksheet};

use super::types::{CellValue, ExcelError};

/// Header row index (Excel rows are 1-based)
pub const HEADER_ROW: u32 = 1;

/// Create a workbook holding one sheet with the given header row.
///
/// Fails if the file already exists; callers check first.
pub fn create_workbook(path: &Path, sheet_name: &str, headers: &[String]) -> Result<(), ExcelError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ExcelError::write_error(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    let mut book = new_file_empty_worksheet();
    let sheet = book
        .new_sheet(sheet_name)
        .map_err(|e| ExcelError::write_error(format!("Failed to create sheet '{}': {}", sheet_name, e)))?;

    for (col_idx, header) in headers.iter().enumerate() {
        sheet
            .get_cell_mut(((col_idx + 1) as u32, HEADER_ROW))
            .set_value_string(header.as_str());
    }

    save_book(&book, path)
}

/// Open a workbook for editing
pub fn open_book(path: &Path) -> Result<Spreadsheet, ExcelError> {
    if !path.exists() {
        return Err(ExcelError::file_not_found(&path.display().to_string()));
    }

    reader::xlsx::read(path)
        .map_err(|e| ExcelError::read_error(format!("Failed to open workbook: {}", e)))
}

/// Save the workbook next to the target, then rename it into place so a
/// failed write never leaves a truncated file behind.
pub fn save_book(book: &Spreadsheet, path: &Path) -> Result<(), ExcelError> {
    let tmp_path = temp_path_for(path);

    writer::xlsx::write(book, &tmp_path)
        .map_err(|e| ExcelError::write_error(format!("Failed to save workbook: {}", e)))?;

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        ExcelError::write_error(format!("Failed to replace {}: {}", path.display(), e))
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook.xlsx".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// Get the named sheet, falling back to the first sheet like the reader does
pub fn sheet_mut<'a>(book: &'a mut Spreadsheet, sheet_name: &str) -> Result<&'a mut Worksheet, ExcelError> {
    if book.get_sheet_by_name(sheet_name).is_some() {
        return book
            .get_sheet_by_name_mut(sheet_name)
            .ok_or_else(|| ExcelError::sheet_not_found(sheet_name));
    }

    book.get_sheet_collection_mut()
        .first_mut()
        .ok_or_else(|| ExcelError::sheet_not_found(sheet_name))
}

/// Map header text to its 1-based column number
pub fn header_columns(sheet: &Worksheet) -> HashMap<String, u32> {
    let highest_column = sheet.get_highest_column();
    let mut map = HashMap::new();

    for col in 1..=highest_column {
        let header = sheet.get_value((col, HEADER_ROW));
        let header = header.trim();
        if !header.is_empty() {
            map.entry(header.to_string()).or_insert(col);
        }
    }

    map
}

/// Make sure every expected header exists, appending missing ones after the
/// last used column. Returns the header map including the new columns.
pub fn ensure_headers(sheet: &mut Worksheet, expected: &[String]) -> HashMap<String, u32> {
    let mut map = header_columns(sheet);
    let mut next_col = sheet.get_highest_column() + 1;

    for header in expected {
        if map.contains_key(header) {
            continue;
        }
        sheet
            .get_cell_mut((next_col, HEADER_ROW))
            .set_value_string(header.as_str());
        map.insert(header.clone(), next_col);
        next_col += 1;
    }

    map
}

/// First data row whose cell in `column` equals `value` (trimmed)
pub fn find_row(sheet: &Worksheet, column: u32, value: &str) -> Option<u32> {
    let wanted = value.trim();
    (HEADER_ROW + 1..=sheet.get_highest_row()).find(|&row| sheet.get_value((column, row)).trim() == wanted)
}

/// Every data-row value in one column, paired with its row number
pub fn column_values(sheet: &Worksheet, column: u32) -> Vec<(u32, String)> {
    (HEADER_ROW + 1..=sheet.get_highest_row())
        .map(|row| (row, sheet.get_value((column, row))))
        .collect()
}

/// True when none of the given columns hold a value in this row
pub fn row_is_blank(sheet: &Worksheet, row: u32, columns: impl IntoIterator<Item = u32>) -> bool {
    columns
        .into_iter()
        .all(|col| sheet.get_value((col, row)).trim().is_empty())
}

/// Row number a new record should be appended at
pub fn next_row(sheet: &Worksheet) -> u32 {
    sheet.get_highest_row().max(HEADER_ROW) + 1
}

/// Write one value per column into a row
pub fn write_row(sheet: &mut Worksheet, row: u32, cells: &[(u32, CellValue)]) {
    for (col, value) in cells {
        set_cell(sheet, *col, row, value);
    }
}

fn set_cell(sheet: &mut Worksheet, col: u32, row: u32, value: &CellValue) {
    let cell = sheet.get_cell_mut((col, row));

    match value {
        CellValue::Empty => {
            cell.set_value_string("");
        }
        CellValue::String(s) => {
            cell.set_value_string(s.as_str());
        }
        CellValue::Number(n) => {
            cell.set_value_number(*n);
        }
        CellValue::Boolean(b) => {
            cell.set_value_bool(*b);
        }
        CellValue::DateTime(dt) => {
            cell.set_value_string(dt.as_str());
        }
        CellValue::Error(e) => {
            cell.set_value_string(format!("#{}", e));
        }
    }
}

/// Remove a row; rows below shift up
pub fn delete_row(sheet: &mut Worksheet, row: u32) {
    sheet.remove_row(&row, &1);
}

/// An empty workbook for building exports in memory
pub fn new_book() -> Spreadsheet {
    new_file_empty_worksheet()
}

/// Add a sheet holding a header row followed by `rows`, first column in A
pub fn add_table_sheet(
    book: &mut Spreadsheet,
    sheet_name: &str,
    headers: &[&str],
    rows: &[Vec<CellValue>],
) -> Result<(), ExcelError> {
    let sheet = book
        .new_sheet(sheet_name)
        .map_err(|e| ExcelError::write_error(format!("Failed to create sheet '{}': {}", sheet_name, e)))?;

    let header_cells: Vec<(u32, CellValue)> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| (idx as u32 + 1, CellValue::String(h.to_string())))
        .collect();
    write_row(sheet, HEADER_ROW, &header_cells);

    for (offset, values) in rows.iter().enumerate() {
        let cells: Vec<(u32, CellValue)> = values
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx as u32 + 1, v.clone()))
            .collect();
        write_row(sheet, HEADER_ROW + 1 + offset as u32, &cells);
    }

    Ok(())
}

/// Serialize a workbook without touching the disk
pub fn book_bytes(book: &Spreadsheet) -> Result<Vec<u8>, ExcelError> {
    let mut buffer = Cursor::new(Vec::new());
    writer::xlsx::write_writer(book, &mut buffer)
        .map_err(|e| ExcelError::write_error(format!("Failed to serialize workbook: {}", e)))?;
    Ok(buffer.into_inner())
}

/// Copy the workbook file to a new location
pub fn export_copy(path: &Path, destination: &Path) -> Result<u64, ExcelError> {
    if !path.exists() {
        return Err(ExcelError::file_not_found(&path.display().to_string()));
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ExcelError::write_error(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    std::fs::copy(path, destination)
        .map_err(|e| ExcelError::write_error(format!("Failed to export workbook: {}", e)))
}
