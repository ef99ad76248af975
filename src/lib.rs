//! Sales report entry backed by a single Excel workbook.
//!
//! The form rules (phone hyphenation, validation, preview) live in
//! [`report`]; persistence lives in [`store`] on top of the [`excel`]
//! helpers.

pub mod catalog;
pub mod config;
pub mod error;
pub mod excel;
pub mod report;
pub mod store;

pub use config::Config;
pub use error::ReportError;
pub use report::{
    add_other_model, apply_defaults, format_phone, normalize, preview_report, remove_other_model,
    FormDefaults, OtherModel, OtherModels, ReportFields, ReportId, ReportInput, ReportPreview,
    SalesReport, Status,
};
pub use store::{ReportStore, ReportTable};
