use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

use super::phone::{format_phone, strip_digits};
use super::types::{ReportInput, Status};
use crate::catalog::{is_accessory_item, is_charger_model, MAX_QUANTITY, MAX_REMARKS_CHARS};

/// A single validation error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub error_type: ValidationErrorType,
}

/// Types of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorType {
    MissingRequired,
    OutOfRange,
    PatternMismatch,
    InvalidValue,
    TooLong,
}

/// A validation warning (less severe than error)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

/// Result of validating a form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Single error, for checks made outside `validate_input`
    pub fn single(field: &str, message: impl Into<String>, error_type: ValidationErrorType) -> Self {
        ValidationResult {
            is_valid: false,
            errors: vec![ValidationError {
                field: field.to_string(),
                message: message.into(),
                error_type,
            }],
            warnings: Vec::new(),
        }
    }

    /// One line per error, for notices and logs
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            return "Input is valid".to_string();
        }
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Hyphenated numbers the formatter can produce for a complete number
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(02-\d{3,4}-\d{4}|\d{3}-\d{3,4}-\d{4}|\d{4}-\d{4})$")
            .expect("phone pattern is a valid regex")
    })
}

/// Validate raw form values.
///
/// Blank salesperson and missing date are not errors: they are defaulted
/// during normalization.
pub fn validate_input(input: &ReportInput) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if input.site_name.trim().is_empty() {
        errors.push(missing("site_name", "Site name is required"));
    }

    if input.status == Status::Rejected && input.reason.trim().is_empty() {
        errors.push(missing("reason", "A reason is required when the status is Rejected"));
    } else if input.status != Status::Rejected && !input.reason.trim().is_empty() {
        warnings.push(ValidationWarning {
            field: "reason".to_string(),
            message: "Reason is only kept for rejected reports".to_string(),
        });
    }

    let remarks_len = input.remarks.trim().chars().count();
    if remarks_len > MAX_REMARKS_CHARS {
        errors.push(ValidationError {
            field: "remarks".to_string(),
            message: format!("Remarks are {} characters, the limit is {}", remarks_len, MAX_REMARKS_CHARS),
            error_type: ValidationErrorType::TooLong,
        });
    }

    if let Some(error) = validate_phone(&input.phone) {
        errors.push(error);
    }

    validate_quantities("models", &input.models, is_charger_model, &mut errors);
    validate_quantities("accessories", &input.accessories, is_accessory_item, &mut errors);

    for (idx, model) in input.other_models.iter().enumerate() {
        let field = format!("other_models[{}]", idx);
        if model.name.trim().is_empty() {
            errors.push(missing(&field, "Other model name is required"));
        }
        if model.quantity == 0 || model.quantity > MAX_QUANTITY {
            errors.push(out_of_range(&field, &model.name, model.quantity, 1));
        }
    }

    let any_quantity = input.models.values().chain(input.accessories.values()).any(|q| *q > 0)
        || !input.other_models.is_empty();
    if !any_quantity {
        warnings.push(ValidationWarning {
            field: "models".to_string(),
            message: "No quantities entered".to_string(),
        });
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Phone is optional; when given it must be a complete number
fn validate_phone(raw: &str) -> Option<ValidationError> {
    let digits = strip_digits(raw);
    if digits.is_empty() {
        return None;
    }

    let formatted = format_phone(raw);
    if !(8..=11).contains(&digits.len()) || !phone_pattern().is_match(&formatted) {
        return Some(ValidationError {
            field: "phone".to_string(),
            message: format!("Contact number '{}' is incomplete or too long", raw.trim()),
            error_type: ValidationErrorType::PatternMismatch,
        });
    }

    None
}

fn validate_quantities(
    field: &str,
    values: &HashMap<String, u32>,
    known: fn(&str) -> bool,
    errors: &mut Vec<ValidationError>,
) {
    // Sorted so messages come out in a stable order
    let mut names: Vec<&String> = values.keys().collect();
    names.sort();

    for name in names {
        let quantity = values[name];
        if !known(name) {
            errors.push(ValidationError {
                field: format!("{}.{}", field, name),
                message: format!("Unknown item '{}'", name),
                error_type: ValidationErrorType::InvalidValue,
            });
        } else if quantity > MAX_QUANTITY {
            errors.push(out_of_range(&format!("{}.{}", field, name), name, quantity, 0));
        }
    }
}

fn missing(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
        error_type: ValidationErrorType::MissingRequired,
    }
}

fn out_of_range(field: &str, name: &str, quantity: u32, min: u32) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: format!(
            "Quantity {} for '{}' must be between {} and {}",
            quantity, name, min, MAX_QUANTITY
        ),
        error_type: ValidationErrorType::OutOfRange,
    }
}
