use thiserror::Error;

use crate::excel::ExcelError;
use crate::report::{ReportId, ValidationResult};

/// Errors surfaced by report operations
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{}", .0.summary())]
    Validation(ValidationResult),

    #[error("Report not found: {0}")]
    NotFound(ReportId),

    #[error(transparent)]
    Io(#[from] ExcelError),
}

impl ReportError {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "validation",
            ReportError::NotFound(_) => "not_found",
            ReportError::Io(_) => "io",
        }
    }
}
