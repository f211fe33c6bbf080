//! Sheet module for geocols
//!
//! Provides a small tabular model with named columns, xlsx loading through
//! calamine, xlsx writing through rust_xlsxwriter (with per-column font
//! highlighting), and an inspector that reads font colors back out of a
//! written workbook.
//!
//! # Examples
//!
//! ## Naming columns from a header row
//!
//! ```
//! use geocols_sheet::Sheet;
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Sample", "SiO2"],
//!     vec!["GR-01", "72.1"],
//! ]);
//!
//! sheet.name_columns_by_row(0).unwrap();
//! assert_eq!(sheet.row_count(), 1);
//! assert!(sheet.has_column("SiO2"));
//! ```
//!
//! ## Highlighting trailing columns on export
//!
//! ```no_run
//! use geocols_sheet::{ColumnHighlight, Sheet, XlsxWriteOptions};
//!
//! let sheet = Sheet::from_columns(&["Sample", "Notes"], Vec::new()).unwrap();
//! let options = XlsxWriteOptions::default().with_highlight(ColumnHighlight {
//!     first_col: 1,
//!     last_col: 1,
//!     font_color: 0xFF0000,
//! });
//! sheet.save_as_xlsx_with("out.xlsx", &options).unwrap();
//! ```

mod a1_notation;
mod cell;
mod error;
mod sheet;
mod styles;
mod xlsx;

/// Re-export A1 helpers.
pub use a1_notation::{column_letters, parse_a1};
/// Re-export cell value type.
pub use cell::{serial_to_datetime, CellValue};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export style inspection.
pub use styles::{inspect_font_colors, FontColorMap};
/// Re-export XLSX options and helpers.
pub use xlsx::{xlsx_sheet_names, ColumnHighlight, XlsxReadOptions, XlsxWriteOptions};
