//! Column reconciliation against the reference schema.
//!
//! Given the columns of a loaded table, the reference schema and an optional
//! user-chosen order, [`reconcile`] decides which columns must be created
//! empty, which are extras to append and flag, and the final column order.

use crate::error::ReconcileError;
use crate::schema::ReferenceSchema;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Classification of a column name relative to a table and the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnClass {
    /// In the table and in the schema.
    Known,
    /// In the table but not in the schema.
    Extra,
    /// In the schema (or chosen order) but not in the table.
    Missing,
}

impl fmt::Display for ColumnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnClass::Known => write!(f, "known"),
            ColumnClass::Extra => write!(f, "extra"),
            ColumnClass::Missing => write!(f, "missing"),
        }
    }
}

/// Outcome of reconciling a table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Ordered columns to create with empty values.
    pub missing: Vec<String>,
    /// Table columns outside the schema, in first-seen table order.
    pub extra: Vec<String>,
    /// Known table columns the chosen order leaves out; removed from the output.
    pub dropped: Vec<String>,
    /// Output column order: chosen order followed by the extras.
    pub final_order: Vec<String>,
}

impl Reconciliation {
    /// Classify a column of the union of table and output columns.
    #[must_use]
    pub fn classify(&self, name: &str) -> Option<ColumnClass> {
        if self.missing.iter().any(|c| c == name) {
            Some(ColumnClass::Missing)
        } else if self.extra.iter().any(|c| c == name) {
            Some(ColumnClass::Extra)
        } else if self.final_order.iter().any(|c| c == name)
            || self.dropped.iter().any(|c| c == name)
        {
            Some(ColumnClass::Known)
        } else {
            None
        }
    }

    /// Every output column with its class, in final order, then dropped columns.
    #[must_use]
    pub fn classes(&self) -> IndexMap<String, ColumnClass> {
        self.final_order
            .iter()
            .chain(&self.dropped)
            .filter_map(|name| self.classify(name).map(|class| (name.clone(), class)))
            .collect()
    }

    /// 1-based inclusive column span of the extra columns, if any.
    ///
    /// Extras are always the trailing columns of the final order.
    #[must_use]
    pub fn extra_span(&self) -> Option<RangeInclusive<usize>> {
        if self.extra.is_empty() {
            return None;
        }
        let last = self.final_order.len();
        Some(last - self.extra.len() + 1..=last)
    }

    /// True when no column is created or removed.
    ///
    /// The output may still reorder the table, and extras stay flagged at the end.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.missing.is_empty() && self.dropped.is_empty()
    }
}

/// Reconcile `actual` table columns against `schema`.
///
/// With no `chosen` order the full schema order is used. Entries of `chosen`
/// must belong to the schema; repeated entries keep their first position.
/// Schema columns absent from `chosen` are not created, and known table
/// columns absent from `chosen` are reported in `dropped`.
pub fn reconcile<S: AsRef<str>>(
    actual: &[S],
    schema: &ReferenceSchema,
    chosen: Option<&[String]>,
) -> Result<Reconciliation, ReconcileError> {
    let mut seen = HashSet::with_capacity(actual.len());
    for name in actual {
        if !seen.insert(name.as_ref()) {
            return Err(ReconcileError::DuplicateColumn(name.as_ref().to_string()));
        }
    }

    let order: IndexSet<&str> = match chosen {
        Some(chosen) => {
            let mut order = IndexSet::with_capacity(chosen.len());
            for name in chosen {
                if !schema.contains(name) {
                    return Err(ReconcileError::NotInSchema(name.clone()));
                }
                if !order.insert(name.as_str()) {
                    warn!(column = %name, "column repeated in chosen order; keeping first position");
                }
            }
            order
        }
        None => schema.columns().collect(),
    };

    let missing: Vec<String> = order
        .iter()
        .filter(|name| !seen.contains(**name))
        .map(|name| (*name).to_string())
        .collect();

    let mut extra = Vec::new();
    let mut dropped = Vec::new();
    for name in actual {
        let name = name.as_ref();
        if !schema.contains(name) {
            extra.push(name.to_string());
        } else if !order.contains(name) {
            dropped.push(name.to_string());
        }
    }

    if !dropped.is_empty() {
        warn!(columns = ?dropped, "known columns left out of the chosen order will be dropped");
    }

    let final_order: Vec<String> = order
        .iter()
        .map(|name| (*name).to_string())
        .chain(extra.iter().cloned())
        .collect();

    debug!(
        missing = missing.len(),
        extra = extra.len(),
        dropped = dropped.len(),
        columns = final_order.len(),
        "reconciled columns"
    );

    Ok(Reconciliation {
        missing,
        extra,
        dropped,
        final_order,
    })
}
