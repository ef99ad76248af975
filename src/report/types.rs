use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::catalog::{ACCESSORY_ITEMS, CHARGER_MODELS};

/// System-assigned report identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn new(id: impl Into<String>) -> Self {
        ReportId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(s: &str) -> Self {
        ReportId(s.to_string())
    }
}

/// Progress of the sale at the site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    InProgress,
    Completed,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::InProgress, Status::Completed, Status::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProgress => "In progress",
            Status::Completed => "Completed",
            Status::Rejected => "Rejected",
        }
    }

    /// Parse a stored status cell; anything unrecognised is In progress
    pub fn from_label(s: &str) -> Self {
        match s.trim() {
            "Completed" | "completed" => Status::Completed,
            "Rejected" | "rejected" => Status::Rejected,
            _ => Status::InProgress,
        }
    }
}

/// Quantity of one catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantity {
    pub name: String,
    pub quantity: u32,
}

/// A model outside the catalog, entered by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherModel {
    pub name: String,
    pub quantity: u32,
}

/// Ordered list of hand-entered models
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtherModels(Vec<OtherModel>);

impl OtherModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OtherModel> {
        self.0.iter()
    }

    pub fn total(&self) -> u32 {
        self.0.iter().fold(0u32, |acc, m| acc.saturating_add(m.quantity))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Append without checks; `report::add_other_model` is the validated path
    pub(crate) fn push(&mut self, model: OtherModel) {
        self.0.push(model);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<OtherModel> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }
}

impl From<Vec<OtherModel>> for OtherModels {
    fn from(models: Vec<OtherModel>) -> Self {
        OtherModels(models)
    }
}

impl<'a> IntoIterator for &'a OtherModels {
    type Item = &'a OtherModel;
    type IntoIter = std::slice::Iter<'a, OtherModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Raw form values as submitted by the page; nothing here is trusted yet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInput {
    pub date: Option<NaiveDate>,
    pub salesperson: String,
    pub site_name: String,
    pub contact_name: String,
    pub phone: String,
    pub status: Status,
    pub reason: String,
    pub remarks: String,
    pub models: HashMap<String, u32>,
    pub accessories: HashMap<String, u32>,
    pub other_models: OtherModels,
}

/// Values applied when the form leaves a field empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    pub salesperson: String,
    pub today: NaiveDate,
}

impl FormDefaults {
    pub fn new(salesperson: impl Into<String>) -> Self {
        FormDefaults {
            salesperson: salesperson.into(),
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// Normalized, validated report content (everything but the id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    pub date: NaiveDate,
    pub salesperson: String,
    pub site_name: String,
    pub contact_name: String,
    pub phone: String,
    pub status: Status,
    pub reason: String,
    pub remarks: String,
    /// Every catalog model in catalog order, zeros included
    pub models: Vec<ItemQuantity>,
    /// Every catalog accessory in catalog order, zeros included
    pub accessories: Vec<ItemQuantity>,
    pub other_models: OtherModels,
}

impl ReportFields {
    pub fn models_total(&self) -> u32 {
        saturating_total(&self.models)
    }

    pub fn accessories_total(&self) -> u32 {
        saturating_total(&self.accessories)
    }

    pub fn summary(&self) -> String {
        super::preview::build_summary(&self.models, &self.accessories, &self.other_models)
    }
}

/// A stored sales report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub id: ReportId,
    #[serde(flatten)]
    pub fields: ReportFields,
}

/// Sum of the quantities, pinned at `u32::MAX` instead of overflowing
pub fn saturating_total(items: &[ItemQuantity]) -> u32 {
    items.iter().fold(0u32, |acc, item| acc.saturating_add(item.quantity))
}

/// Build catalog-ordered quantities from a name → quantity map
pub fn catalog_quantities(catalog: &[&str], values: &HashMap<String, u32>) -> Vec<ItemQuantity> {
    catalog
        .iter()
        .map(|name| ItemQuantity {
            name: name.to_string(),
            quantity: values.get(*name).copied().unwrap_or(0),
        })
        .collect()
}

pub fn model_quantities(values: &HashMap<String, u32>) -> Vec<ItemQuantity> {
    catalog_quantities(CHARGER_MODELS, values)
}

pub fn accessory_quantities(values: &HashMap<String, u32>) -> Vec<ItemQuantity> {
    catalog_quantities(ACCESSORY_ITEMS, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_labels() {
        for status in Status::ALL {
            assert_eq!(Status::from_label(status.as_str()), status);
        }
        assert_eq!(Status::from_label(""), Status::InProgress);
    }

    #[test]
    fn test_catalog_quantities_fill_missing_with_zero() {
        let values = HashMap::from([("3050A".to_string(), 2)]);
        let models = model_quantities(&values);
        assert_eq!(models.len(), CHARGER_MODELS.len());
        assert_eq!(models[0].name, "2100A");
        assert_eq!(models[0].quantity, 0);
        assert_eq!(models.iter().find(|m| m.name == "3050A").unwrap().quantity, 2);
    }

    #[test]
    fn test_totals_saturate() {
        let others = OtherModels::from(vec![
            OtherModel {
                name: "A".to_string(),
                quantity: u32::MAX,
            },
            OtherModel {
                name: "B".to_string(),
                quantity: 5,
            },
        ]);
        assert_eq!(others.total(), u32::MAX);

        let values = HashMap::from([("2100A".to_string(), u32::MAX), ("1100A".to_string(), 1)]);
        assert_eq!(saturating_total(&model_quantities(&values)), u32::MAX);
    }

    #[test]
    fn test_report_input_accepts_partial_json() {
        let input: ReportInput =
            serde_json::from_str(r#"{"site_name":"Plant 3","status":"rejected"}"#).unwrap();
        assert_eq!(input.site_name, "Plant 3");
        assert_eq!(input.status, Status::Rejected);
        assert!(input.date.is_none());
        assert!(input.other_models.is_empty());
    }
}
