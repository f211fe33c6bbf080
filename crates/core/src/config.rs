//! Runtime settings.
//!
//! Settings come from a YAML or JSON file; every field has a default so an
//! empty or partial file is valid.

use crate::error::{GeoError, GeoResult};
use crate::schema::ReferenceSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "GEOCOLS_CONFIG";

/// Default suffix inserted before the extension of exported files.
pub const DEFAULT_SUFFIX: &str = "_modified";

/// Default font color for extra-column cells.
pub const DEFAULT_EXTRA_FONT_COLOR: &str = "FF0000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inserted between the upload's stem and its extension.
    pub suffix: String,
    /// Font color (hex `RRGGBB`) for data cells of extra columns.
    pub extra_font_color: String,
    /// Directory the exported workbook is written to.
    pub output_dir: PathBuf,
    /// Optional replacement for the built-in reference schema.
    pub schema_file: Option<PathBuf>,
    /// Labels appended to the reference schema at session start.
    pub labels: Vec<String>,
    /// Replace an existing output file (with a warning) instead of failing.
    pub overwrite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            extra_font_color: DEFAULT_EXTRA_FONT_COLOR.to_string(),
            output_dir: PathBuf::from("."),
            schema_file: None,
            labels: Vec::new(),
            overwrite: true,
        }
    }
}

impl Settings {
    /// Load settings from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> GeoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml" | "yml") => {
                if content.trim().is_empty() {
                    Settings::default()
                } else {
                    serde_yaml::from_str(&content)?
                }
            }
            _ => {
                return Err(GeoError::config(format!(
                    "unsupported settings file '{}': expected .json, .yaml or .yml",
                    path.display()
                )))
            }
        };
        settings.font_color()?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Resolve settings: explicit path, then `$GEOCOLS_CONFIG`, then the user
    /// config file if it exists, then defaults.
    pub fn discover(explicit: Option<&Path>) -> GeoResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        if let Some(path) = default_config_path().filter(|p| p.is_file()) {
            return Self::load(&path);
        }
        debug!("no settings file found; using defaults");
        Ok(Self::default())
    }

    /// The configured extra-column font color as 0xRRGGBB.
    pub fn font_color(&self) -> GeoResult<u32> {
        parse_hex_color(&self.extra_font_color)
    }

    /// Build the session schema: the schema file (or the built-in list) plus labels.
    pub fn schema(&self) -> GeoResult<ReferenceSchema> {
        let mut schema = match &self.schema_file {
            Some(path) => ReferenceSchema::load(path)?,
            None => ReferenceSchema::canonical(),
        };
        for label in &self.labels {
            schema.add_label(label)?;
        }
        Ok(schema)
    }
}

/// `<config_dir>/geocols/config.yaml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("geocols");
        p.push("config.yaml");
        p
    })
}

/// Parse `RRGGBB`, `#RRGGBB` or `0xRRGGBB`.
pub fn parse_hex_color(value: &str) -> GeoResult<u32> {
    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    // from_str_radix alone would take a leading sign
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GeoError::config(format!("invalid color '{value}': expected RRGGBB")));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|_| GeoError::config(format!("invalid color '{value}': expected RRGGBB")))
}
