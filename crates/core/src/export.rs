//! Export of a reconciled table with extra columns flagged by font color.
//!
//! Export runs in two passes over a staging file in the output directory:
//! the materialized table is written with the extra columns' data cells in
//! the flag color, then the staging file is reopened and checked (header,
//! row count, exact set of colored cells). Only a file that passed both
//! passes is moved to its final name; the staging file is removed on every
//! other exit path.

use crate::config::{Settings, DEFAULT_SUFFIX};
use crate::error::{GeoError, GeoResult};
use crate::materialize::materialize;
use crate::reconcile::Reconciliation;
use geocols_sheet::{
    column_letters, inspect_font_colors, xlsx_sheet_names, ColumnHighlight, Sheet,
    XlsxReadOptions, XlsxWriteOptions,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Options controlling where and how the export is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub suffix: String,
    /// Font color (0xRRGGBB) for extra-column data cells.
    pub font_color: u32,
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            suffix: DEFAULT_SUFFIX.to_string(),
            font_color: 0xFF0000,
            overwrite: true,
        }
    }
}

impl ExportOptions {
    pub fn from_settings(settings: &Settings) -> GeoResult<Self> {
        Ok(Self {
            output_dir: settings.output_dir.clone(),
            suffix: settings.suffix.clone(),
            font_color: settings.font_color()?,
            overwrite: settings.overwrite,
        })
    }
}

/// What a completed export produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: usize,
    /// 1-based inclusive column range of the flagged extra columns.
    pub extra_columns: Option<(usize, usize)>,
    pub styled_cells: usize,
}

impl ExportReport {
    /// File name component of the output path.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Spreadsheet-style label of the flagged range, e.g. `BS2:BT40`.
    #[must_use]
    pub fn extra_range_label(&self) -> Option<String> {
        let (first, last) = self.extra_columns?;
        if self.rows == 0 {
            return None;
        }
        Some(format!(
            "{}2:{}{}",
            column_letters(first - 1),
            column_letters(last - 1),
            self.rows + 1
        ))
    }
}

/// Derive the output file name: `name.xlsx` -> `name_modified.xlsx`.
///
/// Directory components of the upload name are discarded.
#[must_use]
pub fn output_file_name(upload_name: &str, suffix: &str) -> String {
    let base = Path::new(upload_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| upload_name.to_string());

    match base.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &base[..dot], suffix, &base[dot..]),
        _ => format!("{base}{suffix}"),
    }
}

/// Materialize `table` per `reconciliation` and write it under the derived name.
pub fn export(
    table: &Sheet,
    reconciliation: &Reconciliation,
    upload_name: &str,
    options: &ExportOptions,
) -> GeoResult<ExportReport> {
    let materialized = materialize(table, reconciliation)?;

    let target = options
        .output_dir
        .join(output_file_name(upload_name, &options.suffix));
    if target.exists() {
        if !options.overwrite {
            return Err(GeoError::OutputExists(target));
        }
        warn!(path = %target.display(), "output file exists and will be replaced");
    }

    let highlight = reconciliation.extra_span().map(|span| ColumnHighlight {
        first_col: span.start() - 1,
        last_col: span.end() - 1,
        font_color: options.font_color,
    });
    let mut write_options = XlsxWriteOptions::default();
    if let Some(highlight) = highlight {
        write_options = write_options.with_highlight(highlight);
    }

    let staging = tempfile::Builder::new()
        .prefix(".geocols-")
        .suffix(".xlsx")
        .tempfile_in(&options.output_dir)?
        .into_temp_path();

    materialized.save_as_xlsx_with(&staging, &write_options)?;
    debug!(path = %staging.display(), "wrote staging workbook");

    let styled_cells = verify_written(&staging, &materialized, highlight)?;

    persist_output(staging, &target, options.overwrite)?;

    let report = ExportReport {
        path: target,
        columns: reconciliation.final_order.clone(),
        rows: materialized.row_count(),
        extra_columns: reconciliation
            .extra_span()
            .map(|span| (*span.start(), *span.end())),
        styled_cells,
    };
    info!(
        path = %report.path.display(),
        rows = report.rows,
        columns = report.columns.len(),
        styled = report.styled_cells,
        "export complete"
    );
    Ok(report)
}

/// Move a verified staging file to `target`.
///
/// Without `overwrite` the move fails if `target` appeared since the early
/// existence check; the staging file is removed either way.
fn persist_output(staging: TempPath, target: &Path, overwrite: bool) -> GeoResult<()> {
    let persisted = if overwrite {
        staging.persist(target)
    } else {
        staging.persist_noclobber(target)
    };
    persisted.map_err(|e| {
        if !overwrite && e.error.kind() == io::ErrorKind::AlreadyExists {
            GeoError::OutputExists(target.to_path_buf())
        } else {
            GeoError::Io(e.error)
        }
    })
}

/// Reopen a written workbook and check it against the table and highlight plan.
///
/// Returns the number of colored cells.
fn verify_written(
    path: &Path,
    expected: &Sheet,
    highlight: Option<ColumnHighlight>,
) -> GeoResult<usize> {
    let sheet_names = xlsx_sheet_names(path)?;
    let first = sheet_names
        .first()
        .ok_or_else(|| GeoError::verify("written workbook has no sheets"))?;
    let loaded = Sheet::from_xlsx_sheet_with_options(
        path,
        first,
        XlsxReadOptions::default().with_headers(true),
    )?;

    if loaded.column_names() != expected.column_names() {
        return Err(GeoError::verify(format!(
            "header mismatch: wrote {:?}, read back {:?}",
            expected.column_names(),
            loaded.column_names()
        )));
    }

    // Trailing rows without any value are not stored in the file
    let rows_ok = loaded.row_count() <= expected.row_count()
        && expected
            .rows()
            .skip(loaded.row_count())
            .all(|row| row.iter().all(|cell| cell.is_null()));
    if !rows_ok {
        return Err(GeoError::verify(format!(
            "row count mismatch: wrote {}, read back {}",
            expected.row_count(),
            loaded.row_count()
        )));
    }

    let colors = inspect_font_colors(path)?;
    let Some(highlight) = highlight else {
        if colors.is_empty() {
            return Ok(0);
        }
        return Err(GeoError::verify(format!(
            "{} unexpected colored cells",
            colors.len()
        )));
    };

    let expected_cells = expected.row_count() * (highlight.last_col - highlight.first_col + 1);
    for row in 1..=expected.row_count() {
        for col in highlight.first_col..=highlight.last_col {
            if colors.get(&(row, col)) != Some(&highlight.font_color) {
                return Err(GeoError::verify(format!(
                    "cell {}{} is not flagged",
                    column_letters(col),
                    row + 1
                )));
            }
        }
    }
    if colors.len() != expected_cells {
        return Err(GeoError::verify(format!(
            "expected {expected_cells} colored cells, found {}",
            colors.len()
        )));
    }

    Ok(expected_cells)
}

/// Read the bytes of an exported file, e.g. to hand to a download surface.
pub fn read_output(report: &ExportReport) -> GeoResult<Vec<u8>> {
    Ok(std::fs::read(&report.path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("rocks.xlsx", "_modified"), "rocks_modified.xlsx");
        assert_eq!(output_file_name("a.b.xlsx", "_modified"), "a.b_modified.xlsx");
        assert_eq!(output_file_name("rocks", "_modified"), "rocks_modified");
        assert_eq!(output_file_name(".hidden", "_x"), ".hidden_x");
        assert_eq!(
            output_file_name("/data/in/rocks.xlsx", "_modified"),
            "rocks_modified.xlsx"
        );
    }

    fn staging_in(dir: &Path) -> TempPath {
        let staging = tempfile::Builder::new()
            .prefix(".geocols-")
            .tempfile_in(dir)
            .unwrap()
            .into_temp_path();
        std::fs::write(&staging, b"new").unwrap();
        staging
    }

    #[test]
    fn test_persist_without_overwrite_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rocks_modified.xlsx");
        std::fs::write(&target, b"keep me").unwrap();

        let staging = staging_in(dir.path());
        let staging_path = staging.to_path_buf();
        let err = persist_output(staging, &target, false).unwrap_err();

        assert!(matches!(err, GeoError::OutputExists(ref p) if p == &target));
        assert_eq!(std::fs::read(&target).unwrap(), b"keep me");
        assert!(!staging_path.exists());
    }

    #[test]
    fn test_persist_output_moves_staging() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rocks_modified.xlsx");

        persist_output(staging_in(dir.path()), &target, false).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");

        persist_output(staging_in(dir.path()), &target, true).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_extra_range_label() {
        let report = ExportReport {
            path: PathBuf::from("out_modified.xlsx"),
            columns: vec![],
            rows: 39,
            extra_columns: Some((71, 72)),
            styled_cells: 78,
        };
        assert_eq!(report.extra_range_label().as_deref(), Some("BS2:BT40"));
        assert_eq!(report.file_name(), "out_modified.xlsx");
    }
}
