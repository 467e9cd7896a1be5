//! Adapters for the locale files and the translation sheet.

pub mod excel_read;
pub mod excel_write;
pub mod locale_files;
pub mod range;
pub mod store;
pub mod workbook;

pub use range::SheetRange;
pub use store::{MemoryStore, TableStore, ValueInputMode};
pub use workbook::WorkbookStore;
