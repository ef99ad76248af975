//! Mapping between a sales report and its workbook row.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::excel::{CellValue, SheetTable};
use crate::report::columns::{self, accessory_header, model_header};
use crate::report::{
    ItemQuantity, OtherModel, OtherModels, ReportFields, ReportId, SalesReport, Status,
};
use crate::catalog::{ACCESSORY_ITEMS, CHARGER_MODELS};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Header → value for every column except the id
pub fn field_cells(fields: &ReportFields) -> Vec<(String, CellValue)> {
    let text = |s: &str| CellValue::String(s.to_string());

    let mut cells = vec![
        (columns::DATE.to_string(), text(&fields.date.format(DATE_FORMAT).to_string())),
        (columns::SALESPERSON.to_string(), text(&fields.salesperson)),
        (columns::SITE.to_string(), text(&fields.site_name)),
        (columns::CONTACT.to_string(), text(&fields.contact_name)),
        (columns::PHONE.to_string(), text(&fields.phone)),
        (columns::STATUS.to_string(), text(fields.status.as_str())),
        (columns::REASON.to_string(), text(&fields.reason)),
        (columns::REMARKS.to_string(), text(&fields.remarks)),
    ];

    for item in &fields.models {
        cells.push((model_header(&item.name), CellValue::Number(item.quantity as f64)));
    }
    for item in &fields.accessories {
        cells.push((accessory_header(&item.name), CellValue::Number(item.quantity as f64)));
    }

    let others = serde_json::to_string(&fields.other_models).unwrap_or_else(|_| "[]".to_string());
    cells.push((columns::OTHER_MODELS.to_string(), CellValue::String(others)));
    cells.push((columns::SUMMARY.to_string(), CellValue::String(fields.summary())));

    cells
}

/// Resolve header names to column numbers, dropping headers the sheet lacks
pub fn resolve_columns(cells: Vec<(String, CellValue)>, header_map: &HashMap<String, u32>) -> Vec<(u32, CellValue)> {
    cells
        .into_iter()
        .filter_map(|(header, value)| header_map.get(&header).map(|col| (*col, value)))
        .collect()
}

/// Rebuild a report from a sheet row. Rows without an id yield `None`.
///
/// Cells edited by hand are read leniently: an unreadable date becomes
/// `today`, an unreadable quantity becomes 0 and unreadable other-model JSON
/// becomes an empty list.
pub fn report_from_row(table: &SheetTable, row: &[CellValue], today: NaiveDate) -> Option<SalesReport> {
    let id = table.cell(row, columns::ID).display().trim().to_string();
    if id.is_empty() {
        return None;
    }

    let text = |header: &str| table.cell(row, header).display().trim().to_string();
    let quantity = |header: String| table.cell(row, &header).as_quantity().unwrap_or(0);

    let models = CHARGER_MODELS
        .iter()
        .map(|name| ItemQuantity {
            name: name.to_string(),
            quantity: quantity(model_header(name)),
        })
        .collect();
    let accessories = ACCESSORY_ITEMS
        .iter()
        .map(|name| ItemQuantity {
            name: name.to_string(),
            quantity: quantity(accessory_header(name)),
        })
        .collect();

    Some(SalesReport {
        id: ReportId::new(id),
        fields: ReportFields {
            date: parse_date(&table.cell(row, columns::DATE)).unwrap_or(today),
            salesperson: text(columns::SALESPERSON),
            site_name: text(columns::SITE),
            contact_name: text(columns::CONTACT),
            phone: text(columns::PHONE),
            status: Status::from_label(&text(columns::STATUS)),
            reason: text(columns::REASON),
            remarks: text(columns::REMARKS),
            models,
            accessories,
            other_models: parse_other_models(&text(columns::OTHER_MODELS)),
        },
    })
}

/// Dates are stored as text, but Excel may have turned them into real dates
fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    let text = cell.display();
    let date_part = text.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

/// Accepts `[{"name": .., "quantity": ..}]` and the older `[["name", qty]]` form
fn parse_other_models(text: &str) -> OtherModels {
    if text.is_empty() {
        return OtherModels::new();
    }

    if let Ok(models) = serde_json::from_str::<OtherModels>(text) {
        return models;
    }

    match serde_json::from_str::<Vec<(String, u32)>>(text) {
        Ok(pairs) => pairs
            .into_iter()
            .map(|(name, quantity)| OtherModel { name, quantity })
            .collect::<Vec<_>>()
            .into(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable other-model list '{}': {}", text, e);
            OtherModels::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn table_with(headers: &[&str]) -> SheetTable {
        SheetTable {
            sheet: "Reports".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn test_row_without_id_is_skipped() {
        let table = table_with(&[columns::ID, columns::SITE]);
        let row = vec![CellValue::Empty, CellValue::String("Site".into())];
        assert!(report_from_row(&table, &row, today()).is_none());
    }

    #[test]
    fn test_lenient_parsing() {
        let table = table_with(&[
            columns::ID,
            columns::DATE,
            columns::STATUS,
            "Model 2100A",
            columns::OTHER_MODELS,
        ]);
        let row = vec![
            CellValue::Number(7.0),
            CellValue::String("not a date".into()),
            CellValue::String("Completed".into()),
            CellValue::String("lots".into()),
            CellValue::String("{broken".into()),
        ];

        let report = report_from_row(&table, &row, today()).unwrap();
        assert_eq!(report.id.as_str(), "7");
        assert_eq!(report.fields.date, today());
        assert_eq!(report.fields.status, Status::Completed);
        assert_eq!(report.fields.models[0].quantity, 0);
        assert!(report.fields.other_models.is_empty());
    }

    #[test]
    fn test_dates_from_excel_datetime_cells() {
        let cell = CellValue::DateTime("2024-05-06T00:00:00".into());
        assert_eq!(parse_date(&cell), NaiveDate::from_ymd_opt(2024, 5, 6));
    }

    #[test]
    fn test_other_models_formats() {
        let current = parse_other_models(r#"[{"name":"A","quantity":2}]"#);
        assert_eq!(current.total(), 2);

        let legacy = parse_other_models(r#"[["B", 3], ["C", 1]]"#);
        assert_eq!(legacy.len(), 2);
        assert_eq!(legacy.total(), 4);
    }
}
