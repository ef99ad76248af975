use serde::{Deserialize, Serialize};

use super::types::{FormDefaults, ItemQuantity, OtherModels, ReportFields, ReportInput};
use super::validator::{validate_input, ValidationError, ValidationWarning};
use super::{apply_defaults, columns};

/// Shown when nothing has a quantity
pub const EMPTY_SUMMARY: &str = "(no quantities)";

/// One line of the preview table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub label: String,
    pub value: String,
}

/// What the record would look like if saved now
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPreview {
    pub rows: Vec<PreviewRow>,
    pub summary: String,
    pub models_total: u32,
    pub accessories_total: u32,
    pub other_models_total: u32,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// `"name x qty"` for every non-zero entry, catalog order first, then the
/// hand-entered models, followed by the grand total.
pub fn build_summary(models: &[ItemQuantity], accessories: &[ItemQuantity], others: &OtherModels) -> String {
    let mut parts = Vec::new();
    let mut total = 0u32;

    for item in models.iter().chain(accessories) {
        if item.quantity > 0 {
            parts.push(format!("{} x {}", item.name, item.quantity));
            total = total.saturating_add(item.quantity);
        }
    }
    for other in others {
        parts.push(format!("{} x {}", other.name, other.quantity));
        total = total.saturating_add(other.quantity);
    }

    if parts.is_empty() {
        return EMPTY_SUMMARY.to_string();
    }

    format!("{}  | total {}", parts.join(", "), total)
}

/// Build the preview for the current form values. Never fails: validation
/// problems are listed alongside the preview instead.
pub fn preview_report(input: &ReportInput, defaults: &FormDefaults) -> ReportPreview {
    let validation = validate_input(input);
    let fields = apply_defaults(input, defaults);

    ReportPreview {
        rows: preview_rows(&fields),
        summary: fields.summary(),
        models_total: fields.models_total(),
        accessories_total: fields.accessories_total(),
        other_models_total: fields.other_models.total(),
        errors: validation.errors,
        warnings: validation.warnings,
    }
}

fn preview_rows(fields: &ReportFields) -> Vec<PreviewRow> {
    let row = |label: &str, value: String| PreviewRow {
        label: label.to_string(),
        value,
    };

    let mut rows = vec![
        row(columns::DATE, fields.date.format("%Y-%m-%d").to_string()),
        row(columns::SALESPERSON, fields.salesperson.clone()),
        row(columns::SITE, fields.site_name.clone()),
        row(columns::CONTACT, fields.contact_name.clone()),
        row(columns::PHONE, fields.phone.clone()),
        row(columns::STATUS, fields.status.as_str().to_string()),
    ];
    if !fields.reason.is_empty() {
        rows.push(row(columns::REASON, fields.reason.clone()));
    }
    if !fields.remarks.is_empty() {
        rows.push(row(columns::REMARKS, fields.remarks.clone()));
    }

    rows
}
