//! Derived workbooks built from stored reports: a summary across all
//! records and a sheet-per-section copy of one record.

use std::collections::BTreeMap;

use crate::excel::writer;
use crate::excel::{CellValue, ExcelError};
use crate::report::columns;
use crate::report::{ItemQuantity, SalesReport};

pub const LIST_SHEET: &str = "Reports";
pub const CHARGER_TOTALS_SHEET: &str = "Charger totals";
pub const ACCESSORY_TOTALS_SHEET: &str = "Accessory totals";

pub const DETAILS_SHEET: &str = "Details";
pub const QUANTITIES_SHEET: &str = "Quantities";
pub const OTHER_MODELS_SHEET: &str = "Other models";

pub const CHARGER_TOTAL: &str = "Charger total";
pub const ACCESSORY_TOTAL: &str = "Accessory total";
pub const OTHER_TOTAL: &str = "Other total";

fn text(value: impl Into<String>) -> CellValue {
    CellValue::String(value.into())
}

fn number(value: impl Into<f64>) -> CellValue {
    CellValue::Number(value.into())
}

/// Date through remarks, in column order
fn basic_fields(report: &SalesReport) -> [(&'static str, String); 8] {
    let f = &report.fields;
    [
        (columns::DATE, f.date.format("%Y-%m-%d").to_string()),
        (columns::SALESPERSON, f.salesperson.clone()),
        (columns::SITE, f.site_name.clone()),
        (columns::CONTACT, f.contact_name.clone()),
        (columns::PHONE, f.phone.clone()),
        (columns::STATUS, f.status.as_str().to_string()),
        (columns::REASON, f.reason.clone()),
        (columns::REMARKS, f.remarks.clone()),
    ]
}

/// Quantity per item name across all records, sorted by name
pub fn item_totals<'a, F>(records: &'a [SalesReport], items: F) -> BTreeMap<String, u64>
where
    F: Fn(&'a SalesReport) -> &'a [ItemQuantity],
{
    let mut totals = BTreeMap::new();
    for record in records {
        for item in items(record) {
            *totals.entry(item.name.clone()).or_insert(0u64) += u64::from(item.quantity);
        }
    }
    totals
}

fn totals_rows(totals: &BTreeMap<String, u64>) -> Vec<Vec<CellValue>> {
    totals
        .iter()
        .map(|(name, qty)| vec![text(name.as_str()), CellValue::Number(*qty as f64)])
        .collect()
}

/// One list row per record with its three totals, plus catalog-wide
/// charger and accessory totals on their own sheets.
pub fn summary_workbook(records: &[SalesReport]) -> Result<Vec<u8>, ExcelError> {
    let headers = [
        columns::ID,
        columns::DATE,
        columns::SALESPERSON,
        columns::SITE,
        columns::CONTACT,
        columns::PHONE,
        columns::STATUS,
        columns::REASON,
        columns::REMARKS,
        CHARGER_TOTAL,
        ACCESSORY_TOTAL,
        OTHER_TOTAL,
    ];

    let list: Vec<Vec<CellValue>> = records
        .iter()
        .map(|record| {
            let mut row = vec![text(record.id.as_str())];
            row.extend(basic_fields(record).into_iter().map(|(_, value)| text(value)));
            row.push(number(record.fields.models_total()));
            row.push(number(record.fields.accessories_total()));
            row.push(number(record.fields.other_models.total()));
            row
        })
        .collect();

    let chargers = item_totals(records, |r| r.fields.models.as_slice());
    let accessories = item_totals(records, |r| r.fields.accessories.as_slice());

    let mut book = writer::new_book();
    writer::add_table_sheet(&mut book, LIST_SHEET, &headers, &list)?;
    writer::add_table_sheet(&mut book, CHARGER_TOTALS_SHEET, &["Item", "Quantity"], &totals_rows(&chargers))?;
    writer::add_table_sheet(&mut book, ACCESSORY_TOTALS_SHEET, &["Item", "Quantity"], &totals_rows(&accessories))?;

    tracing::debug!("Built summary workbook for {} record(s)", records.len());
    writer::book_bytes(&book)
}

/// A single record split into basic info, quantities and, when there are
/// any, the hand-entered models.
pub fn record_workbook(report: &SalesReport) -> Result<Vec<u8>, ExcelError> {
    let mut details = vec![vec![text(columns::ID), text(report.id.as_str())]];
    details.extend(
        basic_fields(report)
            .into_iter()
            .map(|(label, value)| vec![text(label), text(value)]),
    );

    let quantities: Vec<Vec<CellValue>> = report
        .fields
        .models
        .iter()
        .map(|item| ("Charger", item))
        .chain(report.fields.accessories.iter().map(|item| ("Accessory", item)))
        .map(|(group, item)| vec![text(group), text(item.name.as_str()), number(item.quantity)])
        .collect();

    let mut book = writer::new_book();
    writer::add_table_sheet(&mut book, DETAILS_SHEET, &["Field", "Value"], &details)?;
    writer::add_table_sheet(&mut book, QUANTITIES_SHEET, &["Category", "Item", "Quantity"], &quantities)?;

    if !report.fields.other_models.is_empty() {
        let others: Vec<Vec<CellValue>> = report
            .fields
            .other_models
            .iter()
            .map(|m| vec![text(m.name.as_str()), number(m.quantity)])
            .collect();
        writer::add_table_sheet(&mut book, OTHER_MODELS_SHEET, &["Model", "Quantity"], &others)?;
    }

    writer::book_bytes(&book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{model_quantities, ReportFields, ReportId, Status};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn report(id: &str, models: &[(&str, u32)]) -> SalesReport {
        let values: HashMap<String, u32> = models.iter().map(|(n, q)| (n.to_string(), *q)).collect();
        SalesReport {
            id: ReportId::from(id),
            fields: ReportFields {
                date: NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
                salesperson: "Kim".to_string(),
                site_name: "Depot".to_string(),
                contact_name: String::new(),
                phone: String::new(),
                status: Status::InProgress,
                reason: String::new(),
                remarks: String::new(),
                models: model_quantities(&values),
                accessories: Vec::new(),
                other_models: Default::default(),
            },
        }
    }

    #[test]
    fn test_item_totals_are_summed_and_sorted() {
        let records = vec![
            report("a", &[("3050A", 2), ("1100A", 1)]),
            report("b", &[("3050A", u32::MAX), ("1100A", 4)]),
        ];

        let totals = item_totals(&records, |r| r.fields.models.as_slice());

        let names: Vec<&String> = totals.keys().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(totals["1100A"], 5);
        assert_eq!(totals["3050A"], u64::from(u32::MAX) + 2);
        assert_eq!(totals["2100A"], 0);
    }

    #[test]
    fn test_record_workbook_skips_empty_other_models() {
        let bytes = record_workbook(&report("a", &[("2100A", 1)])).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.xlsx");
        std::fs::write(&path, bytes).unwrap();

        let details = crate::excel::read_sheet(&path, Some(DETAILS_SHEET)).unwrap();
        assert_eq!(details.sheet, DETAILS_SHEET);
        assert_eq!(details.rows.len(), 9);
        // falls back to the first sheet when the name is absent
        let fallback = crate::excel::read_sheet(&path, Some(OTHER_MODELS_SHEET)).unwrap();
        assert_eq!(fallback.sheet, DETAILS_SHEET);
    }
}
