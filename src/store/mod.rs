//! Workbook-backed report storage.
//!
//! Every operation opens the workbook, does its work and saves it again, so
//! edits made in Excel between calls are picked up. Callers that share one
//! store across threads serialize writes themselves.

pub mod export;
pub mod rows;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ReportError;
use crate::excel::writer::{self, HEADER_ROW};
use crate::excel::{compute_checksum, read_sheet, CellValue, ExcelError, SheetTable};
use crate::report::columns::{self, all_headers};
use crate::report::{ReportFields, ReportId, SalesReport};

/// What the list view shows: every column but the id, plus the ids in row
/// order so a selected row can be mapped back to its record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub ids: Vec<ReportId>,
    pub checksum: String,
}

impl ReportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a record in the list, if present
    pub fn position(&self, id: &ReportId) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Keep the rows whose date, site, salesperson or status contains
    /// `query`, ignoring case. A blank query keeps everything.
    pub fn filter(self, query: &str) -> ReportTable {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self;
        }

        let searched: Vec<usize> = [columns::DATE, columns::SITE, columns::SALESPERSON, columns::STATUS]
            .iter()
            .filter_map(|name| self.headers.iter().position(|h| h == name))
            .collect();

        let (rows, ids): (Vec<Vec<String>>, Vec<ReportId>) = self
            .rows
            .into_iter()
            .zip(self.ids)
            .filter(|(row, _)| {
                let haystack = searched
                    .iter()
                    .filter_map(|idx| row.get(*idx))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                haystack.contains(&query)
            })
            .unzip();

        ReportTable {
            headers: self.headers,
            rows,
            ids,
            checksum: self.checksum,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    path: PathBuf,
    sheet: String,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        ReportStore {
            path: path.into(),
            sheet: sheet.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.excel_path.clone(), config.sheet_name.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet
    }

    /// Create the workbook with a header row if it does not exist yet.
    /// Returns true when a new file was written.
    pub fn ensure_workbook(&self) -> Result<bool, ReportError> {
        if self.path.exists() {
            return Ok(false);
        }

        writer::create_workbook(&self.path, &self.sheet, &all_headers())?;
        tracing::info!("Created workbook {} (sheet '{}')", self.path.display(), self.sheet);
        Ok(true)
    }

    /// Append a new record under a freshly generated id
    pub fn create(&self, fields: ReportFields) -> Result<SalesReport, ReportError> {
        self.ensure_workbook()?;

        let mut book = writer::open_book(&self.path)?;
        let sheet = writer::sheet_mut(&mut book, &self.sheet)?;
        let header_map = writer::ensure_headers(sheet, &all_headers());
        let id_col = id_column(&header_map)?;

        let taken: HashSet<String> = writer::column_values(sheet, id_col)
            .into_iter()
            .map(|(_, v)| v.trim().to_string())
            .collect();
        let id = new_report_id(&taken);

        let mut cells = rows::field_cells(&fields);
        cells.push((columns::ID.to_string(), CellValue::String(id.to_string())));

        let row = writer::next_row(sheet);
        writer::write_row(sheet, row, &rows::resolve_columns(cells, &header_map));
        writer::save_book(&book, &self.path)?;

        tracing::info!("Created report {} at row {}", id, row);
        Ok(SalesReport { id, fields })
    }

    /// Overwrite the record with `id` in place. Nothing is written when the
    /// id is unknown.
    pub fn update(&self, id: &ReportId, fields: ReportFields) -> Result<SalesReport, ReportError> {
        self.ensure_workbook()?;

        let mut book = writer::open_book(&self.path)?;
        let sheet = writer::sheet_mut(&mut book, &self.sheet)?;
        let header_map = writer::ensure_headers(sheet, &all_headers());
        let id_col = id_column(&header_map)?;

        let row = writer::find_row(sheet, id_col, id.as_str())
            .ok_or_else(|| ReportError::NotFound(id.clone()))?;

        writer::write_row(sheet, row, &rows::resolve_columns(rows::field_cells(&fields), &header_map));
        writer::save_book(&book, &self.path)?;

        tracing::info!("Updated report {} at row {}", id, row);
        Ok(SalesReport {
            id: id.clone(),
            fields,
        })
    }

    /// Remove the record with `id`; rows below move up
    pub fn delete(&self, id: &ReportId) -> Result<(), ReportError> {
        match self.delete_many(std::slice::from_ref(id))? {
            0 => Err(ReportError::NotFound(id.clone())),
            _ => Ok(()),
        }
    }

    /// Remove every record whose id is in `ids`, returning how many rows
    /// went. Unknown ids are skipped; with no match the file is not written.
    pub fn delete_many(&self, ids: &[ReportId]) -> Result<usize, ReportError> {
        self.ensure_workbook()?;
        let wanted: HashSet<&str> = ids.iter().map(|id| id.as_str().trim()).collect();

        let mut book = writer::open_book(&self.path)?;
        let sheet = writer::sheet_mut(&mut book, &self.sheet)?;
        let id_col = id_column(&writer::header_columns(sheet))?;

        let matched: Vec<u32> = writer::column_values(sheet, id_col)
            .into_iter()
            .filter(|(_, value)| wanted.contains(value.trim()))
            .map(|(row, _)| row)
            .collect();
        if matched.is_empty() {
            return Ok(0);
        }

        // Bottom-up so earlier row numbers stay valid
        for row in matched.iter().rev() {
            writer::delete_row(sheet, *row);
        }
        writer::save_book(&book, &self.path)?;

        tracing::info!("Deleted {} report(s): rows {:?}", matched.len(), matched);
        Ok(matched.len())
    }

    /// Give every non-blank row without an id a fresh one, adding any
    /// missing columns to the header row on the way. Returns the number of
    /// ids assigned; the file is only rewritten when something changed.
    pub fn retrofit_missing_ids(&self) -> Result<usize, ReportError> {
        self.ensure_workbook()?;

        let mut book = writer::open_book(&self.path)?;
        let sheet = writer::sheet_mut(&mut book, &self.sheet)?;
        let before = writer::header_columns(sheet).len();
        let header_map = writer::ensure_headers(sheet, &all_headers());
        let headers_added = header_map.len() != before;
        let id_col = id_column(&header_map)?;

        let values = writer::column_values(sheet, id_col);
        let mut taken: HashSet<String> = values
            .iter()
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        let mut assigned = 0;
        for (row, value) in values {
            if !value.trim().is_empty() || writer::row_is_blank(sheet, row, header_map.values().copied()) {
                continue;
            }
            let id = new_report_id(&taken);
            sheet.get_cell_mut((id_col, row)).set_value_string(id.as_str());
            taken.insert(id.to_string());
            assigned += 1;
        }

        if assigned > 0 || headers_added {
            writer::save_book(&book, &self.path)?;
        }
        if assigned > 0 {
            tracing::warn!("Assigned ids to {} row(s) that had none", assigned);
        }
        if headers_added {
            tracing::info!("Added {} missing column(s) to the header row", header_map.len() - before);
        }

        Ok(assigned)
    }

    /// The list view: all records in sheet order without the id column
    pub fn list(&self) -> Result<ReportTable, ReportError> {
        let table = self.load()?;
        let id_idx = table
            .column(columns::ID)
            .ok_or_else(|| ExcelError::invalid_format(format!("Sheet '{}' has no {} column", table.sheet, columns::ID)))?;

        let headers = table
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != id_idx)
            .map(|(_, h)| h.clone())
            .collect();

        let mut rows = Vec::with_capacity(table.rows.len());
        let mut ids = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            ids.push(ReportId::new(
                row.get(id_idx).map(|c| c.display()).unwrap_or_default().trim(),
            ));
            rows.push(
                (0..table.headers.len())
                    .filter(|idx| *idx != id_idx)
                    .map(|idx| row.get(idx).map(|c| c.display()).unwrap_or_default())
                    .collect(),
            );
        }

        tracing::debug!("Listed {} report(s) from {}", rows.len(), self.path.display());
        Ok(ReportTable {
            headers,
            rows,
            ids,
            checksum: self.checksum()?,
        })
    }

    /// The list view narrowed to rows matching `query`
    pub fn list_filtered(&self, query: &str) -> Result<ReportTable, ReportError> {
        let table = self.list()?.filter(query);
        tracing::debug!("{} report(s) match '{}'", table.len(), query.trim());
        Ok(table)
    }

    /// Every record with an id, in sheet order
    pub fn records(&self) -> Result<Vec<SalesReport>, ReportError> {
        let table = self.load()?;
        let today = Local::now().date_naive();

        Ok(table
            .rows
            .iter()
            .filter_map(|row| rows::report_from_row(&table, row, today))
            .collect())
    }

    /// Load one record to fill the form for editing
    pub fn get(&self, id: &ReportId) -> Result<SalesReport, ReportError> {
        let table = self.load()?;
        let today = Local::now().date_naive();

        // Only the matching row is parsed
        table
            .rows
            .iter()
            .filter(|row| table.cell(row, columns::ID).display().trim() == id.as_str())
            .find_map(|row| rows::report_from_row(&table, row, today))
            .ok_or_else(|| ReportError::NotFound(id.clone()))
    }

    /// The workbook as it is on disk, for download
    pub fn export_bytes(&self) -> Result<Vec<u8>, ReportError> {
        self.ensure_workbook()?;
        std::fs::read(&self.path)
            .map_err(|e| ExcelError::read_error(format!("Failed to read {}: {}", self.path.display(), e)).into())
    }

    /// A separate workbook listing every record with its totals, plus
    /// charger and accessory totals across all records
    pub fn export_summary_bytes(&self) -> Result<Vec<u8>, ReportError> {
        let records = self.records()?;
        Ok(export::summary_workbook(&records)?)
    }

    /// A separate workbook holding just the record with `id`
    pub fn export_record_bytes(&self, id: &ReportId) -> Result<Vec<u8>, ReportError> {
        let report = self.get(id)?;
        Ok(export::record_workbook(&report)?)
    }

    /// Copy the workbook to `destination`, returning the bytes written
    pub fn export_to(&self, destination: &Path) -> Result<u64, ReportError> {
        self.ensure_workbook()?;
        let size = writer::export_copy(&self.path, destination)?;
        tracing::info!("Exported workbook to {} ({} bytes)", destination.display(), size);
        Ok(size)
    }

    pub fn checksum(&self) -> Result<String, ReportError> {
        Ok(compute_checksum(&self.path)?)
    }

    /// Read the sheet after making sure every row has an id
    fn load(&self) -> Result<SheetTable, ReportError> {
        self.retrofit_missing_ids()?;
        Ok(read_sheet(&self.path, Some(&self.sheet))?)
    }
}

fn id_column(header_map: &HashMap<String, u32>) -> Result<u32, ReportError> {
    header_map.get(columns::ID).copied().ok_or_else(|| {
        ExcelError::invalid_format(format!("Header row {} has no {} column", HEADER_ROW, columns::ID)).into()
    })
}

/// `SR-<timestamp>-<8 hex>`, retried until it is not already in the sheet
fn new_report_id(taken: &HashSet<String>) -> ReportId {
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let candidate = format!("SR-{}-{}", Local::now().format("%Y%m%d%H%M%S"), &suffix[..8]);
        if !taken.contains(&candidate) {
            return ReportId::new(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_id_format() {
        let id = new_report_id(&HashSet::new());
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SR");
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_report_ids_are_distinct() {
        let mut taken = HashSet::new();
        for _ in 0..50 {
            let id = new_report_id(&taken);
            assert!(taken.insert(id.to_string()));
        }
    }

    fn sample_table() -> ReportTable {
        let row = |date: &str, site: &str, person: &str, status: &str| {
            vec![date.to_string(), site.to_string(), person.to_string(), status.to_string(), "9".to_string()]
        };
        ReportTable {
            headers: vec![
                columns::DATE.to_string(),
                columns::SITE.to_string(),
                columns::SALESPERSON.to_string(),
                columns::STATUS.to_string(),
                "Model 2100A".to_string(),
            ],
            rows: vec![
                row("2025-08-26", "North Yard", "Kim", "In progress"),
                row("2025-09-01", "Harbor", "Lee", "Rejected"),
                row("2025-09-02", "South yard", "Park", "Completed"),
            ],
            ids: vec![ReportId::from("a"), ReportId::from("b"), ReportId::from("c")],
            checksum: "sum".to_string(),
        }
    }

    #[test]
    fn test_filter_matches_any_searched_column_ignoring_case() {
        let ids = |t: ReportTable| t.ids.into_iter().map(|i| i.to_string()).collect::<Vec<_>>();

        assert_eq!(ids(sample_table().filter("YARD")), vec!["a", "c"]);
        assert_eq!(ids(sample_table().filter("2025-09")), vec!["b", "c"]);
        assert_eq!(ids(sample_table().filter(" lee ")), vec!["b"]);
        assert_eq!(ids(sample_table().filter("rejected")), vec!["b"]);
        assert_eq!(ids(sample_table().filter("")), vec!["a", "b", "c"]);
        // quantity columns are not searched
        assert!(sample_table().filter("9").is_empty());
    }

    #[test]
    fn test_filter_keeps_rows_and_ids_aligned() {
        let table = sample_table().filter("park");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "South yard");
        assert_eq!(table.position(&ReportId::from("c")), Some(0));
        assert_eq!(table.checksum, "sum");
    }

    #[test]
    fn test_table_position() {
        let table = ReportTable {
            ids: vec![ReportId::from("a"), ReportId::from("b")],
            ..Default::default()
        };
        assert_eq!(table.position(&ReportId::from("b")), Some(1));
        assert_eq!(table.position(&ReportId::from("z")), None);
    }
}
