//! Workbook column headers for a sales report.

use crate::catalog::{ACCESSORY_ITEMS, CHARGER_MODELS};

pub const ID: &str = "ID";
pub const DATE: &str = "Date";
pub const SALESPERSON: &str = "Salesperson";
pub const SITE: &str = "Site";
pub const CONTACT: &str = "Contact";
pub const PHONE: &str = "Phone";
pub const STATUS: &str = "Status";
pub const REASON: &str = "Reason";
pub const REMARKS: &str = "Remarks";
pub const OTHER_MODELS: &str = "Other models (JSON)";
pub const SUMMARY: &str = "Summary";

pub fn model_header(name: &str) -> String {
    format!("Model {}", name)
}

pub fn accessory_header(name: &str) -> String {
    format!("Accessory {}", name)
}

/// Full header row in column order
pub fn all_headers() -> Vec<String> {
    let mut headers: Vec<String> = [ID, DATE, SALESPERSON, SITE, CONTACT, PHONE, STATUS, REASON, REMARKS]
        .iter()
        .map(|h| h.to_string())
        .collect();
    headers.extend(CHARGER_MODELS.iter().map(|m| model_header(m)));
    headers.extend(ACCESSORY_ITEMS.iter().map(|a| accessory_header(a)));
    headers.push(OTHER_MODELS.to_string());
    headers.push(SUMMARY.to_string());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_row_layout() {
        let headers = all_headers();
        assert_eq!(headers[0], ID);
        assert_eq!(headers.len(), 9 + CHARGER_MODELS.len() + ACCESSORY_ITEMS.len() + 2);
        assert!(headers.contains(&"Model 3050B".to_string()));
        assert!(headers.contains(&"Accessory Canopy (fast)".to_string()));
        assert_eq!(headers.last().map(String::as_str), Some(SUMMARY));
    }
}
