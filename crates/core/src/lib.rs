//! # geocols-core
//!
//! Column reconciliation for geochemical sample tables.
//!
//! This crate provides:
//! - The reference schema of expected columns
//! - Reconciliation of a table's columns against the schema
//! - Materialization of the reconciled table
//! - Export with extra columns flagged by font color
//! - Session state for interactive front ends
//!
//! ```
//! use geocols_core::{reconcile, ReferenceSchema};
//!
//! let schema = ReferenceSchema::from_columns(["Sample", "SiO2"]);
//! let rec = reconcile(&["SiO2", "Lab"], &schema, None).unwrap();
//! assert_eq!(rec.missing, vec!["Sample"]);
//! assert_eq!(rec.final_order, vec!["Sample", "SiO2", "Lab"]);
//! ```

/// Runtime settings.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Two-pass annotated export.
pub mod export;
/// Applying a reconciliation to a table.
pub mod materialize;
/// Column reconciliation.
pub mod reconcile;
/// Reference schema of expected columns.
pub mod schema;
/// Interactive session state.
pub mod session;

/// Re-export settings.
pub use config::{parse_hex_color, Settings};
/// Re-export core error types.
pub use error::{GeoError, GeoResult, ReconcileError};
/// Re-export export entry points.
pub use export::{export, output_file_name, read_output, ExportOptions, ExportReport};
pub use materialize::materialize;
/// Re-export reconciliation types.
pub use reconcile::{reconcile, ColumnClass, Reconciliation};
pub use schema::{ReferenceSchema, DEFAULT_COLUMNS};
pub use session::{Download, Session, Upload};
