//! Apply a [`Reconciliation`] to a loaded table.

use crate::error::{GeoError, GeoResult};
use crate::reconcile::Reconciliation;
use geocols_sheet::{CellValue, Sheet};
use tracing::debug;

/// Produce a new table with exactly `final_order` as its columns.
///
/// Missing columns are created full height with null values; row order is
/// preserved. The source table is left untouched.
///
/// # Errors
///
/// - `GeoError::Schema` when the final order names a column that is neither in
///   the table nor scheduled as missing.
/// - `GeoError::InvariantViolation` when a table column is absent from the
///   final order without being listed as dropped, or when the table has no
///   named header.
pub fn materialize(table: &Sheet, reconciliation: &Reconciliation) -> GeoResult<Sheet> {
    let names = table.column_names().ok_or_else(|| {
        GeoError::InvariantViolation("table has no header row".to_string())
    })?;

    for name in names {
        let accounted = reconciliation.final_order.contains(name)
            || reconciliation.dropped.contains(name);
        if !accounted {
            return Err(GeoError::InvariantViolation(format!(
                "column '{name}' is not part of the reconciliation"
            )));
        }
    }

    for name in &reconciliation.final_order {
        if !table.has_column(name) && !reconciliation.missing.contains(name) {
            return Err(GeoError::Schema(name.clone()));
        }
    }

    let mut working = table.clone();
    for name in &reconciliation.missing {
        if working.has_column(name) {
            return Err(GeoError::InvariantViolation(format!(
                "column '{name}' is listed as missing but present in the table"
            )));
        }
        working.column_append_named(name, vec![CellValue::Null; working.row_count()])?;
    }
    working.select_columns(&reconciliation.final_order)?;

    debug!(
        rows = working.row_count(),
        cols = working.col_count(),
        created = reconciliation.missing.len(),
        "materialized table"
    );
    Ok(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;
    use crate::schema::ReferenceSchema;

    fn table() -> Sheet {
        let mut sheet = Sheet::from_data(vec![
            vec!["Unknown1", "SiO2", "Sample"],
            vec!["x", "72.1", "GR-01"],
            vec!["y", "70.4", "GR-02"],
        ]);
        sheet.name_columns_by_row(0).unwrap();
        sheet
    }

    #[test]
    fn test_materialize_orders_and_fills() {
        let schema = ReferenceSchema::from_columns(["Sample", "SiO2", "Al2O3"]);
        let table = table();
        let names = table.column_names().unwrap().clone();
        let rec = reconcile(&names, &schema, None).unwrap();

        let out = materialize(&table, &rec).unwrap();
        assert_eq!(
            out.column_names().unwrap(),
            &vec!["Sample", "SiO2", "Al2O3", "Unknown1"]
        );
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get(1, 0).unwrap().as_str(), "GR-02");
        assert!(out.get(0, 2).unwrap().is_null());
        assert_eq!(out.get(0, 3).unwrap().as_str(), "x");

        // source untouched
        assert_eq!(table.col_count(), 3);
    }

    #[test]
    fn test_unknown_final_column_is_schema_error() {
        let rec = Reconciliation {
            missing: vec![],
            extra: vec![],
            dropped: vec![],
            final_order: vec![
                "Unknown1".into(),
                "SiO2".into(),
                "Sample".into(),
                "Zr".into(),
            ],
        };
        let err = materialize(&table(), &rec).unwrap_err();
        assert!(matches!(err, GeoError::Schema(name) if name == "Zr"));
    }

    #[test]
    fn test_unaccounted_column_is_invariant_violation() {
        let rec = Reconciliation {
            missing: vec![],
            extra: vec![],
            dropped: vec![],
            final_order: vec!["SiO2".into(), "Sample".into()],
        };
        let err = materialize(&table(), &rec).unwrap_err();
        assert!(matches!(err, GeoError::InvariantViolation(_)));
    }

    #[test]
    fn test_dropped_columns_are_removed() {
        let rec = Reconciliation {
            missing: vec![],
            extra: vec!["Unknown1".into()],
            dropped: vec!["SiO2".into()],
            final_order: vec!["Sample".into(), "Unknown1".into()],
        };
        let out = materialize(&table(), &rec).unwrap();
        assert_eq!(out.column_names().unwrap(), &vec!["Sample", "Unknown1"]);
    }
}
