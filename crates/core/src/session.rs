//! Interactive session state.
//!
//! A [`Session`] owns everything one user works with: the (label-extended)
//! reference schema, the uploaded workbook, the loaded sheet and the chosen
//! column order. Each method is one user action; an action that fails leaves
//! the state it found untouched.

use crate::error::{GeoError, GeoResult, ReconcileError};
use crate::export::{export, read_output, ExportOptions, ExportReport};
use crate::materialize::materialize;
use crate::reconcile::{reconcile, Reconciliation};
use crate::schema::ReferenceSchema;
use geocols_sheet::{xlsx_sheet_names, Sheet, XlsxReadOptions};
use std::path::{Path, PathBuf};
use tracing::info;

/// Workbook selected by the user.
#[derive(Debug, Clone)]
pub struct Upload {
    pub path: PathBuf,
    /// Name the output file is derived from.
    pub display_name: String,
    pub sheet_names: Vec<String>,
}

/// A file ready to be handed to a download surface.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Session {
    schema: ReferenceSchema,
    upload: Option<Upload>,
    table: Option<Sheet>,
    chosen_order: Option<Vec<String>>,
    last_export: Option<ExportReport>,
}

impl Session {
    #[must_use]
    pub fn new(schema: ReferenceSchema) -> Self {
        Self {
            schema,
            upload: None,
            table: None,
            chosen_order: None,
            last_export: None,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &ReferenceSchema {
        &self.schema
    }

    #[must_use]
    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }

    #[must_use]
    pub fn table(&self) -> Option<&Sheet> {
        self.table.as_ref()
    }

    /// The order the next reconciliation will use (explicit or schema default).
    #[must_use]
    pub fn effective_order(&self) -> Vec<String> {
        self.chosen_order
            .clone()
            .unwrap_or_else(|| self.schema.to_vec())
    }

    #[must_use]
    pub fn chosen_order(&self) -> Option<&[String]> {
        self.chosen_order.as_deref()
    }

    #[must_use]
    pub fn last_export(&self) -> Option<&ExportReport> {
        self.last_export.as_ref()
    }

    /// Open a workbook and load its first sheet.
    ///
    /// `display_name` defaults to the file name of `path`.
    pub fn open(&mut self, path: &Path, display_name: Option<&str>) -> GeoResult<&[String]> {
        let sheet_names = xlsx_sheet_names(path)?;
        let first = sheet_names
            .first()
            .cloned()
            .ok_or(GeoError::NotLoaded("sheet"))?;
        let table = load_sheet(path, &first)?;

        let display_name = display_name.map(str::to_string).unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.xlsx".to_string())
        });
        info!(path = %path.display(), sheets = sheet_names.len(), "opened workbook");

        self.table = Some(table);
        self.last_export = None;
        let upload = self.upload.insert(Upload {
            path: path.to_path_buf(),
            display_name,
            sheet_names,
        });
        Ok(upload.sheet_names.as_slice())
    }

    /// Load another sheet of the open workbook, replacing the current table.
    pub fn select_sheet(&mut self, name: &str) -> GeoResult<&Sheet> {
        let upload = self.upload.as_ref().ok_or(GeoError::NotLoaded("workbook"))?;
        let table = load_sheet(&upload.path, name)?;
        self.last_export = None;
        let table = self.table.insert(table);
        Ok(&*table)
    }

    /// Set an explicit column order (multiselect result).
    pub fn set_order(&mut self, order: Vec<String>) -> GeoResult<()> {
        if let Some(name) = order.iter().find(|name| !self.schema.contains(name)) {
            return Err(ReconcileError::NotInSchema(name.clone()).into());
        }
        self.chosen_order = Some(order);
        Ok(())
    }

    /// Select every schema column in default order ("mark all").
    pub fn select_all(&mut self) {
        self.chosen_order = Some(self.schema.to_vec());
    }

    /// Return to the schema default order.
    pub fn clear_order(&mut self) {
        self.chosen_order = None;
    }

    /// Move one entry of the current order to a new position (drag and drop).
    pub fn move_column(&mut self, from: usize, to: usize) -> GeoResult<()> {
        let mut order = self.effective_order();
        if from >= order.len() || to >= order.len() {
            return Err(GeoError::Position {
                index: from.max(to),
                len: order.len(),
            });
        }
        let item = order.remove(from);
        order.insert(to, item);
        self.chosen_order = Some(order);
        Ok(())
    }

    /// Add a user label to the session schema.
    ///
    /// An explicit order gains the new label at its end so it can be arranged.
    pub fn add_label(&mut self, label: &str) -> GeoResult<bool> {
        let added = self.schema.add_label(label)?;
        if added {
            if let Some(order) = self.chosen_order.as_mut() {
                order.push(label.trim().to_string());
            }
        }
        Ok(added)
    }

    /// Reconcile the loaded table against the session schema and order.
    pub fn reconcile(&self) -> GeoResult<Reconciliation> {
        let table = self.table.as_ref().ok_or(GeoError::NotLoaded("sheet"))?;
        let names = table
            .column_names()
            .ok_or_else(|| GeoError::InvariantViolation("table has no header row".to_string()))?;
        Ok(reconcile(names, &self.schema, self.chosen_order.as_deref())?)
    }

    /// The reconciled table as it would be exported, cut to its first `rows` rows.
    pub fn preview(&self, rows: usize) -> GeoResult<Sheet> {
        let table = self.table.as_ref().ok_or(GeoError::NotLoaded("sheet"))?;
        let mut preview = materialize(table, &self.reconcile()?)?;
        preview.data_mut().truncate(rows);
        Ok(preview)
    }

    /// Reconcile, materialize and export the loaded table.
    pub fn save(&mut self, options: &ExportOptions) -> GeoResult<&ExportReport> {
        let upload = self.upload.as_ref().ok_or(GeoError::NotLoaded("workbook"))?;
        let table = self.table.as_ref().ok_or(GeoError::NotLoaded("sheet"))?;
        let reconciliation = self.reconcile()?;
        let report = export(table, &reconciliation, &upload.display_name, options)?;
        let report = self.last_export.insert(report);
        Ok(&*report)
    }

    /// Bytes and name of the last exported file.
    pub fn download(&self) -> GeoResult<Download> {
        let report = self
            .last_export
            .as_ref()
            .ok_or(GeoError::NotLoaded("export"))?;
        Ok(Download {
            file_name: report.file_name(),
            bytes: read_output(report)?,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ReferenceSchema::canonical())
    }
}

fn load_sheet(path: &Path, name: &str) -> GeoResult<Sheet> {
    let sheet = Sheet::from_xlsx_sheet_with_options(
        path,
        name,
        XlsxReadOptions::default().with_headers(true),
    )?;
    info!(
        sheet = name,
        rows = sheet.row_count(),
        cols = sheet.col_count(),
        "loaded sheet"
    );
    Ok(sheet)
}
