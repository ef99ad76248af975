//! Excel workbook access.
//!
//! This module provides:
//! - Reading a sheet with its header row (calamine)
//! - Editing rows in place and saving atomically (umya-spreadsheet)
//! - File change detection for the workbook

pub mod reader;
pub mod types;
pub mod watcher;
pub mod writer;

// Re-export commonly used types and functions
pub use reader::{compute_checksum, read_sheet};
pub use types::*;
pub use watcher::{create_event_channel, WorkbookWatcher};
