//! Sales report model and the pure form rules: phone hyphenation,
//! validation, defaults and preview.

pub mod columns;
pub mod phone;
pub mod preview;
pub mod types;
pub mod validator;

pub use phone::{format_phone, strip_digits};
pub use preview::{build_summary, preview_report, PreviewRow, ReportPreview};
pub use types::*;
pub use validator::{
    validate_input, ValidationError, ValidationErrorType, ValidationResult, ValidationWarning,
};

use crate::catalog::MAX_QUANTITY;
use crate::error::ReportError;

/// Apply defaults and formatting without rejecting anything.
///
/// Missing date becomes today, a blank salesperson becomes the preset one,
/// text is trimmed, the phone is hyphenated and the reason is dropped unless
/// the report is rejected.
pub fn apply_defaults(input: &ReportInput, defaults: &FormDefaults) -> ReportFields {
    let salesperson = match input.salesperson.trim() {
        "" => defaults.salesperson.clone(),
        name => name.to_string(),
    };

    let reason = if input.status == Status::Rejected {
        input.reason.trim().to_string()
    } else {
        String::new()
    };

    let other_models: OtherModels = input
        .other_models
        .iter()
        .map(|m| OtherModel {
            name: m.name.trim().to_string(),
            quantity: m.quantity,
        })
        .collect::<Vec<_>>()
        .into();

    ReportFields {
        date: input.date.unwrap_or(defaults.today),
        salesperson,
        site_name: input.site_name.trim().to_string(),
        contact_name: input.contact_name.trim().to_string(),
        phone: format_phone(&input.phone),
        status: input.status,
        reason,
        remarks: input.remarks.trim().to_string(),
        models: model_quantities(&input.models),
        accessories: accessory_quantities(&input.accessories),
        other_models,
    }
}

/// Turn form values into a record ready to save, or the list of problems
pub fn normalize(input: &ReportInput, defaults: &FormDefaults) -> Result<ReportFields, ReportError> {
    let validation = validate_input(input);
    if !validation.is_valid {
        return Err(ReportError::Validation(validation));
    }

    Ok(apply_defaults(input, defaults))
}

/// Append a hand-entered model after checking its name and quantity
pub fn add_other_model(
    mut models: OtherModels,
    name: &str,
    quantity: u32,
) -> Result<OtherModels, ReportError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ReportError::Validation(ValidationResult::single(
            "other_model_name",
            "Enter a model name",
            ValidationErrorType::MissingRequired,
        )));
    }
    if quantity == 0 || quantity > MAX_QUANTITY {
        return Err(ReportError::Validation(ValidationResult::single(
            "other_model_quantity",
            format!("Quantity must be between 1 and {}", MAX_QUANTITY),
            ValidationErrorType::OutOfRange,
        )));
    }

    models.push(OtherModel {
        name: name.to_string(),
        quantity,
    });
    Ok(models)
}

/// Remove the hand-entered model at `index`
pub fn remove_other_model(mut models: OtherModels, index: usize) -> Result<OtherModels, ReportError> {
    match models.remove_at(index) {
        Some(_) => Ok(models),
        None => Err(ReportError::Validation(ValidationResult::single(
            "other_models",
            format!("No other model at position {}", index + 1),
            ValidationErrorType::InvalidValue,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn defaults() -> FormDefaults {
        FormDefaults {
            salesperson: "Kim Beomjun".to_string(),
            today: NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
        }
    }

    #[test]
    fn test_normalize_applies_defaults() {
        let input = ReportInput {
            site_name: "  Harbor depot ".to_string(),
            salesperson: "   ".to_string(),
            phone: "01012345678".to_string(),
            reason: "stale".to_string(),
            models: HashMap::from([("2100A".to_string(), 1), ("3050A".to_string(), 1)]),
            accessories: HashMap::from([("I-bollard".to_string(), 2)]),
            other_models: OtherModels::from(vec![OtherModel {
                name: " X ".to_string(),
                quantity: 3,
            }]),
            ..Default::default()
        };

        let fields = normalize(&input, &defaults()).unwrap();

        assert_eq!(fields.date, NaiveDate::from_ymd_opt(2025, 8, 26).unwrap());
        assert_eq!(fields.salesperson, "Kim Beomjun");
        assert_eq!(fields.site_name, "Harbor depot");
        assert_eq!(fields.phone, "010-1234-5678");
        assert_eq!(fields.reason, "");
        assert_eq!(fields.models_total(), 2);
        assert_eq!(fields.accessories_total(), 2);
        assert_eq!(fields.other_models.total(), 3);
        assert_eq!(fields.other_models.iter().next().unwrap().name, "X");
    }

    #[test]
    fn test_normalize_rejects_invalid_input() {
        let err = normalize(&ReportInput::default(), &defaults()).unwrap_err();
        match err {
            ReportError::Validation(result) => {
                assert!(!result.is_valid);
                assert_eq!(result.errors[0].field, "site_name");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_add_and_remove_other_models() {
        let models = add_other_model(OtherModels::new(), "EV-9", 2).unwrap();
        let models = add_other_model(models, " EV-10 ", 1).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models.total(), 3);

        let models = remove_other_model(models, 0).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models.iter().next().unwrap().name, "EV-10");
    }

    #[test]
    fn test_add_other_model_rejects_bad_entries() {
        assert!(matches!(
            add_other_model(OtherModels::new(), " ", 1),
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            add_other_model(OtherModels::new(), "EV-9", 0),
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            add_other_model(OtherModels::new(), "EV-9", MAX_QUANTITY + 1),
            Err(ReportError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_out_of_range() {
        let err = remove_other_model(OtherModels::new(), 0).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
