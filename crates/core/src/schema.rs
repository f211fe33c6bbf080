//! Reference schema of canonical geochemical column names.

use crate::error::{GeoError, GeoResult};
use indexmap::IndexSet;
use std::path::Path;
use tracing::{debug, info};

/// Canonical column vocabulary: sample metadata, major oxides, trace elements.
pub const DEFAULT_COLUMNS: &[&str] = &[
    // sample metadata
    "Sample", "Pluton", "Group", "Rock_type", "Observation", "Tectonic_setting", "Location_notes",
    "Age", "Reference", "Colour", "Symbol", "Size",
    // major oxides
    "SiO2", "TiO2", "Al2O3", "FeO", "FeOt", "Fe2O3", "Fe2O3t", "MnO", "MgO", "CaO", "K2O", "Na2O",
    "P2O5", "Total", "H2Ot", "LOI",
    // trace elements
    "Li", "Be", "B", "Sc", "V", "Cr", "Ni", "Cu", "Zn", "Rb", "Sr", "Y", "Zr", "Nb", "Cs", "Ba",
    "La", "Ce", "Pr", "Nd", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf",
    "Ta", "Pb", "Th", "U", "Co", "Mo", "W", "Ga", "Ge", "As", "In", "Sn", "Sb", "Cd",
];

/// Ordered, duplicate-free set of reference column names.
///
/// Membership tests treat it as a set; iteration yields the default output
/// order. Labels added at runtime are appended and never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSchema {
    columns: IndexSet<String>,
    base_len: usize,
}

impl ReferenceSchema {
    /// The built-in geochemical schema.
    #[must_use]
    pub fn canonical() -> Self {
        Self::from_columns(DEFAULT_COLUMNS.iter().copied())
    }

    /// Build a schema from an ordered list; repeated names keep their first position.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: IndexSet<String> = columns.into_iter().map(Into::into).collect();
        let base_len = columns.len();
        Self { columns, base_len }
    }

    /// Load a schema from a JSON array or a YAML list of column names.
    pub fn load(path: &Path) -> GeoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let columns: Vec<String> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            _ => {
                return Err(GeoError::config(format!(
                    "unsupported schema file '{}': expected .json, .yaml or .yml",
                    path.display()
                )))
            }
        };
        if columns.is_empty() {
            return Err(GeoError::config(format!(
                "schema file '{}' lists no columns",
                path.display()
            )));
        }
        let schema = Self::from_columns(columns);
        info!(path = %path.display(), columns = schema.len(), "loaded reference schema");
        Ok(schema)
    }

    /// Append a user-defined label.
    ///
    /// Returns `Ok(false)` when the label is already part of the schema.
    pub fn add_label(&mut self, label: &str) -> GeoResult<bool> {
        let label = label.trim();
        if label.is_empty() {
            return Err(GeoError::InvalidLabel("label is empty".to_string()));
        }
        let added = self.columns.insert(label.to_string());
        debug!(label, added, "add label");
        Ok(added)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Columns in default order, runtime labels last.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Labels appended after construction, in insertion order.
    pub fn custom_labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().skip(self.base_len).map(String::as_str)
    }

    /// Position of a column in the default order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The full default order as owned strings.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.columns.iter().cloned().collect()
    }
}

impl Default for ReferenceSchema {
    fn default() -> Self {
        Self::canonical()
    }
}
