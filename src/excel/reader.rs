use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

use super::types::*;

/// Read one sheet in full.
///
/// The first row is taken as the header row. Rows whose cells are all blank
/// are dropped, which also hides the residue of rows cleared by hand in Excel.
/// When `sheet` is not present in the workbook the first sheet is used.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<SheetTable, ExcelError> {
    let display_path = path.display().to_string();

    if !path.exists() {
        return Err(ExcelError::file_not_found(&display_path));
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ExcelError::read_error(format!("Failed to open workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();

    let target_sheet = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        _ => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ExcelError::invalid_format("Workbook has no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&target_sheet)
        .map_err(|e| ExcelError::read_error(format!("Failed to read sheet '{}': {}", target_sheet, e)))?;

    let (headers, rows) = read_range(&range);

    Ok(SheetTable {
        sheet: target_sheet,
        headers,
        rows,
    })
}

/// Split a range into header texts and non-blank data rows
fn read_range(range: &Range<Data>) -> (Vec<String>, Vec<Vec<CellValue>>) {
    let (row_count, col_count) = range.get_size();
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    // Cells left of / above the used range are padded so indexes line up with
    // sheet columns.
    let total_cols = start_col as usize + col_count;
    let mut headers = Vec::with_capacity(total_cols);
    let mut rows = Vec::new();

    for row_idx in 0..row_count {
        let mut row_data = vec![CellValue::Empty; start_col as usize];
        for col_idx in 0..col_count {
            row_data.push(convert_cell_value(range.get((row_idx, col_idx))));
        }

        let absolute_row = start_row as usize + row_idx;
        if absolute_row == 0 {
            for (col_idx, cell) in row_data.iter().enumerate() {
                let text = cell.display().trim().to_string();
                headers.push(if text.is_empty() {
                    column_index_to_letter(col_idx as u32)
                } else {
                    text
                });
            }
            continue;
        }

        if row_data.iter().all(CellValue::is_blank) {
            continue;
        }
        rows.push(row_data);
    }

    // A sheet without a header row still gets letter headers
    if headers.is_empty() && total_cols > 0 {
        headers = (0..total_cols as u32).map(column_index_to_letter).collect();
    }

    (headers, rows)
}

fn convert_cell_value(cell: Option<&Data>) -> CellValue {
    let Some(data) = cell else {
        return CellValue::Empty;
    };

    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) | Data::DurationIso(text) => CellValue::String(text.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(flag) => CellValue::Boolean(*flag),
        Data::DateTime(serial) => CellValue::DateTime(format_excel_datetime(serial.as_f64())),
        Data::DateTimeIso(iso) => CellValue::DateTime(iso.clone()),
        Data::Error(err) => CellValue::Error(format!("{:?}", err)),
    }
}

/// Excel serial date (days since 1899-12-30, fraction = time of day) as
/// `YYYY-MM-DDTHH:MM:SS`
fn format_excel_datetime(serial: f64) -> String {
    let Some(epoch) = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return serial.to_string();
    };

    let millis = (serial * 86_400_000.0).round() as i64;
    let seconds = (millis + 500).div_euclid(1000);
    match epoch.checked_add_signed(chrono::Duration::seconds(seconds)) {
        Some(datetime) => datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

/// Spreadsheet column name for a 0-based index: 0 → A, 25 → Z, 26 → AA
pub fn column_index_to_letter(index: u32) -> String {
    let mut letters = Vec::new();
    let mut remaining = index as u64 + 1;

    while remaining > 0 {
        let digit = ((remaining - 1) % 26) as u8;
        letters.push(char::from(b'A' + digit));
        remaining = (remaining - 1) / 26;
    }

    letters.iter().rev().collect()
}

/// Hex SHA-256 of the file contents
pub fn compute_checksum(path: &Path) -> Result<String, ExcelError> {
    let mut file = File::open(path)
        .map_err(|e| ExcelError::read_error(format!("Cannot open {} for checksum: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| ExcelError::read_error(format!("Cannot read {} for checksum: {}", path.display(), e)))?;

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        let letters: Vec<String> = [0, 25, 26, 51, 52, 701, 702].into_iter().map(column_index_to_letter).collect();
        assert_eq!(letters, ["A", "Z", "AA", "AZ", "BA", "ZZ", "AAA"]);
    }

    #[test]
    fn test_format_excel_datetime() {
        assert_eq!(format_excel_datetime(45000.0), "2023-03-15T00:00:00");
        assert_eq!(format_excel_datetime(45000.5), "2023-03-15T12:00:00");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_sheet(Path::new("/nonexistent/reports.xlsx"), None).unwrap_err();
        assert_eq!(err.error_type, ExcelErrorType::FileNotFound);
    }

    #[test]
    fn test_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"abc").unwrap();
        let first = compute_checksum(&path).unwrap();
        assert_eq!(first, compute_checksum(&path).unwrap());
        assert_eq!(
            first,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
